use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, PadError>;

/// Every failure the pad can run into, from config parsing to a remote
/// endpoint returning garbage.
#[derive(Error, Debug)]
pub enum PadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A model file exists but is not a valid graph-model document.
    #[error("malformed model file: {0}")]
    ModelFormat(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("unknown model '{0}'")]
    UnknownModel(String),

    #[error("invalid model registry: {0}")]
    InvalidRegistry(String),

    /// The loaded model does not fit the descriptor it was loaded for.
    #[error("model '{model}' shape mismatch: {reason}")]
    ModelShape { model: String, reason: String },

    #[error("predicted class index {index} has no label ({len} labels)")]
    LabelIndex { index: usize, len: usize },

    #[error("model produced an empty output vector")]
    EmptyOutput,

    /// Overflowing weights can push a logit to infinity, which turns every
    /// softmax probability into NaN.
    #[error("model output is not finite at index {index}")]
    NonFiniteOutput { index: usize },

    #[error("remote prediction failed: {0}")]
    Remote(String),

    #[error("invalid configuration for {key}: {reason}")]
    Config { key: String, reason: String },

    #[error("upload rejected: {0}")]
    Upload(String),
}

impl From<ureq::Error> for PadError {
    fn from(e: ureq::Error) -> Self {
        PadError::Remote(e.to_string())
    }
}
