//! The model registry: one descriptor per selectable model, keyed by
//! [`ModelId`], checked once at startup.

pub mod labels;

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PadError, Result};
use labels::{CIFAR10_LABELS, DIGIT_LABELS, EMNIST_BYCLASS_LABELS, FASHION_MNIST_LABELS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelId {
    #[serde(rename = "mnist")]
    Mnist,
    #[serde(rename = "emnist")]
    Emnist,
    #[serde(rename = "fashion-mnist")]
    FashionMnist,
    #[serde(rename = "cifar-10")]
    Cifar10,
}

impl ModelId {
    pub const ALL: [ModelId; 4] = [ModelId::Mnist, ModelId::Emnist, ModelId::FashionMnist, ModelId::Cifar10];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::Mnist        => "mnist",
            ModelId::Emnist       => "emnist",
            ModelId::FashionMnist => "fashion-mnist",
            ModelId::Cifar10      => "cifar-10",
        }
    }

    /// Tab caption shown in the model selector.
    pub fn title(&self) -> &'static str {
        match self {
            ModelId::Mnist        => "Mnist",
            ModelId::Emnist       => "Emnist",
            ModelId::FashionMnist => "Fashion Mnist",
            ModelId::Cifar10      => "Cifar-10",
        }
    }
}

impl Default for ModelId {
    fn default() -> Self {
        ModelId::Mnist
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = PadError;

    fn from_str(s: &str) -> Result<Self> {
        ModelId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s.trim())
            .ok_or_else(|| PadError::UnknownModel(s.to_owned()))
    }
}

/// Everything needed to feed a drawing to one model and read its answer.
#[derive(Debug, Clone)]
pub struct ModelDescriptor {
    pub id: ModelId,
    /// Graph-model JSON file.
    pub path: PathBuf,
    /// 1 for grayscale models, 3 for RGB.
    pub channels: usize,
    /// Side length of the square input the model expects.
    pub size: u32,
    pub labels: Vec<String>,
    /// Mirror the drawing left-to-right before anything else. The EMNIST
    /// model was trained on transposed glyphs and needs this.
    pub flip_horizontal: bool,
    pub description: String,
    /// Test accuracy in percent, shown next to the description.
    pub accuracy: f64,
}

impl ModelDescriptor {
    /// Length of the flattened input tensor.
    pub fn input_len(&self) -> usize {
        self.channels * (self.size as usize) * (self.size as usize)
    }
}

#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: Vec<ModelDescriptor>,
}

impl ModelRegistry {
    /// Builds a registry from explicit descriptors. Call `validate()` before
    /// serving with it.
    pub fn new(models: Vec<ModelDescriptor>) -> ModelRegistry {
        ModelRegistry { models }
    }

    /// The four built-in models, each expected at `<models_dir>/<id>.json`.
    pub fn builtin<P: AsRef<Path>>(models_dir: P) -> ModelRegistry {
        let dir = models_dir.as_ref();
        let entry = |id: ModelId, channels: usize, size: u32, labels: &[&str], flip: bool, description: &str, accuracy: f64| {
            ModelDescriptor {
                id,
                path: dir.join(format!("{}.json", id.as_str())),
                channels,
                size,
                labels: labels.iter().map(|s| s.to_string()).collect(),
                flip_horizontal: flip,
                description: description.to_owned(),
                accuracy,
            }
        };

        ModelRegistry::new(vec![
            entry(
                ModelId::Mnist, 1, 28, &DIGIT_LABELS, false,
                "Our most accurate vision model capable of recognizing complex or stylized handwritten digits.",
                99.70,
            ),
            entry(
                ModelId::Emnist, 1, 28, &EMNIST_BYCLASS_LABELS, true,
                "A neural network with good accuracy for handwritten digits and letters.",
                86.66,
            ),
            entry(
                ModelId::FashionMnist, 1, 28, &FASHION_MNIST_LABELS, false,
                "A neural network for recognizing clothing items.",
                92.67,
            ),
            entry(
                ModelId::Cifar10, 3, 32, &CIFAR10_LABELS, false,
                "A neural network for recognizing different objects.",
                80.83,
            ),
        ])
    }

    pub fn get(&self, id: ModelId) -> Result<&ModelDescriptor> {
        self.models
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| PadError::UnknownModel(id.to_string()))
    }

    /// Resolves a raw identifier (form field, query string) to a descriptor.
    pub fn lookup(&self, raw: &str) -> Result<&ModelDescriptor> {
        self.get(raw.parse()?)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelDescriptor> {
        self.models.iter()
    }

    /// Rejects registries that could never produce a sensible prediction.
    pub fn validate(&self) -> Result<()> {
        if self.models.is_empty() {
            return Err(invalid("no models registered".into()));
        }
        let mut seen = HashSet::new();
        for m in &self.models {
            if !seen.insert(m.id) {
                return Err(invalid(format!("'{}' registered twice", m.id)));
            }
            if m.channels != 1 && m.channels != 3 {
                return Err(invalid(format!("'{}' has {} channels, expected 1 or 3", m.id, m.channels)));
            }
            if m.size == 0 {
                return Err(invalid(format!("'{}' has a zero input size", m.id)));
            }
            if m.labels.is_empty() {
                return Err(invalid(format!("'{}' has an empty label table", m.id)));
            }
            let distinct: HashSet<&str> = m.labels.iter().map(String::as_str).collect();
            if distinct.len() != m.labels.len() {
                return Err(invalid(format!("'{}' has duplicate labels", m.id)));
            }
        }
        Ok(())
    }

    /// Ids whose model file is not present on disk. Not fatal: models load
    /// lazily at prediction time.
    pub fn missing_files(&self) -> Vec<ModelId> {
        self.models.iter().filter(|m| !m.path.is_file()).map(|m| m.id).collect()
    }
}

fn invalid(reason: String) -> PadError {
    PadError::InvalidRegistry(reason)
}
