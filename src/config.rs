use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{PadError, Result};

pub const DEFAULT_ADDR: &str = "127.0.0.1:7878";
pub const DEFAULT_MODELS_DIR: &str = "trained_models";
pub const DEFAULT_CANVAS_SIZE: u32 = 280;
/// Largest accepted canvas side; 4096² RGBA is 64 MiB per copy.
pub const MAX_CANVAS_SIZE: u32 = 4096;
pub const DEFAULT_STROKE_WIDTH: f32 = 12.0;
pub const DEFAULT_REMOTE_URL: &str = "https://letterandtextrecognition.loca.lt/predict";

/// Where predictions are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Load a graph model from `models_dir` and run it in-process.
    Local,
    /// POST the flattened drawing to `remote_url`.
    Remote,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local"  => Ok(Backend::Local),
            "remote" => Ok(Backend::Remote),
            other    => Err(format!("expected 'local' or 'remote', got '{}'", other)),
        }
    }
}

/// Runtime settings for the pad server.
///
/// Every field has a default; each can be overridden with a `PAD_*`
/// environment variable.
#[derive(Debug, Clone)]
pub struct PadConfig {
    pub addr: String,
    pub models_dir: PathBuf,
    /// Side length of the square backing buffer, in pixels.
    pub canvas_size: u32,
    /// Stroke width in logical (CSS) pixels.
    pub stroke_width: f32,
    pub backend: Backend,
    pub remote_url: String,
    pub remote_timeout: Option<Duration>,
}

impl Default for PadConfig {
    fn default() -> Self {
        PadConfig {
            addr:           DEFAULT_ADDR.to_owned(),
            models_dir:     PathBuf::from(DEFAULT_MODELS_DIR),
            canvas_size:    DEFAULT_CANVAS_SIZE,
            stroke_width:   DEFAULT_STROKE_WIDTH,
            backend:        Backend::Local,
            remote_url:     DEFAULT_REMOTE_URL.to_owned(),
            remote_timeout: None,
        }
    }
}

impl PadConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<PadConfig> {
        PadConfig::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup. Missing keys keep
    /// their defaults; present but malformed keys are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<PadConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = PadConfig::default();

        if let Some(addr) = lookup("PAD_ADDR") {
            cfg.addr = addr;
        }
        if let Some(dir) = lookup("PAD_MODELS_DIR") {
            cfg.models_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup("PAD_CANVAS_SIZE") {
            let size: u32 = parse_key("PAD_CANVAS_SIZE", &raw)?;
            if size == 0 || size > MAX_CANVAS_SIZE {
                return Err(config_error(
                    "PAD_CANVAS_SIZE",
                    &format!("must be between 1 and {}", MAX_CANVAS_SIZE),
                ));
            }
            cfg.canvas_size = size;
        }
        if let Some(raw) = lookup("PAD_STROKE_WIDTH") {
            let width: f32 = parse_key("PAD_STROKE_WIDTH", &raw)?;
            if width.is_nan() || width <= 0.0 {
                return Err(config_error("PAD_STROKE_WIDTH", "must be a positive number"));
            }
            cfg.stroke_width = width;
        }
        if let Some(raw) = lookup("PAD_BACKEND") {
            cfg.backend = parse_key("PAD_BACKEND", &raw)?;
        }
        if let Some(url) = lookup("PAD_REMOTE_URL") {
            cfg.remote_url = url;
        }
        if let Some(raw) = lookup("PAD_REMOTE_TIMEOUT_SECS") {
            let secs: u64 = parse_key("PAD_REMOTE_TIMEOUT_SECS", &raw)?;
            cfg.remote_timeout = Some(Duration::from_secs(secs));
        }

        Ok(cfg)
    }
}

fn parse_key<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| config_error(key, &e.to_string()))
}

fn config_error(key: &str, reason: &str) -> PadError {
    PadError::Config { key: key.to_owned(), reason: reason.to_owned() }
}
