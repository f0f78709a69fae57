//! Turning a drawing into a label: the `Classifier` seam and the pieces
//! shared by both backends.

pub mod local;
pub mod remote;

use std::fmt;

use log::error;
use serde::Serialize;

use crate::activation::activation::softmax;
use crate::canvas::Canvas;
use crate::error::{PadError, Result};
use crate::registry::ModelDescriptor;

pub use local::LocalClassifier;
pub use remote::RemoteClassifier;

/// The one message users see when a prediction fails, whatever the cause.
pub const MODEL_ERROR_MESSAGE: &str = "Error running model";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub label: String,
    /// Probability of `label` in [0, 1]. The remote endpoint does not
    /// report one.
    pub confidence: Option<f64>,
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.confidence {
            Some(p) => write!(f, "{} ({:.2}%)", self.label, p * 100.0),
            None    => f.write_str(&self.label),
        }
    }
}

pub trait Classifier: Send + Sync {
    fn classify(&self, canvas: &Canvas, model: &ModelDescriptor) -> Result<Prediction>;

    /// Short name for logs and the page footer.
    fn name(&self) -> &'static str;
}

/// Index of the largest value; ties go to the lowest index. `None` for an
/// empty slice.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Picks the winning class from a model output and names it.
///
/// When `already_normalized` is false the raw output is passed through
/// softmax first, so the reported confidence is always a probability.
/// Outputs that are not finite after that step are rejected.
pub fn interpret_output(output: &[f64], labels: &[String], already_normalized: bool) -> Result<Prediction> {
    let probs = if already_normalized { output.to_vec() } else { softmax(output) };
    if let Some(index) = probs.iter().position(|p| !p.is_finite()) {
        return Err(PadError::NonFiniteOutput { index });
    }
    let index = argmax(&probs).ok_or(PadError::EmptyOutput)?;
    let label = labels
        .get(index)
        .ok_or(PadError::LabelIndex { index, len: labels.len() })?;
    Ok(Prediction { label: label.clone(), confidence: Some(probs[index]) })
}

/// Runs a classifier and renders the outcome for the user. Failures of any
/// kind are logged and collapse to [`MODEL_ERROR_MESSAGE`].
pub fn run_prediction(classifier: &dyn Classifier, canvas: &Canvas, model: &ModelDescriptor) -> String {
    match classifier.classify(canvas, model) {
        Ok(prediction) => prediction.to_string(),
        Err(e) => {
            error!("{} prediction with model '{}' failed: {}", classifier.name(), model.id, e);
            MODEL_ERROR_MESSAGE.to_owned()
        }
    }
}
