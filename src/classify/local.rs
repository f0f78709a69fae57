use log::debug;

use crate::canvas::Canvas;
use crate::classify::{interpret_output, Classifier, Prediction};
use crate::error::{PadError, Result};
use crate::network::GraphModel;
use crate::preprocess::prepare;
use crate::registry::ModelDescriptor;

/// Runs graph models in-process. The model file is read on every call, so
/// swapping a file on disk takes effect on the next prediction.
#[derive(Debug, Default, Clone)]
pub struct LocalClassifier;

impl LocalClassifier {
    pub fn new() -> LocalClassifier {
        LocalClassifier
    }
}

/// Checks that a loaded model accepts the descriptor's tensor and has one
/// output per label.
pub fn check_model_fits(model: &GraphModel, descriptor: &ModelDescriptor) -> Result<()> {
    let shape_error = |reason: String| PadError::ModelShape { model: descriptor.id.to_string(), reason };

    if model.input_size() != descriptor.input_len() {
        return Err(shape_error(format!(
            "expects {} inputs, preprocessing produces {} ({}x{}x{})",
            model.input_size(), descriptor.input_len(), descriptor.channels, descriptor.size, descriptor.size
        )));
    }
    if model.output_size() != descriptor.labels.len() {
        return Err(shape_error(format!(
            "has {} outputs but {} labels are registered",
            model.output_size(), descriptor.labels.len()
        )));
    }
    Ok(())
}

impl Classifier for LocalClassifier {
    fn classify(&self, canvas: &Canvas, descriptor: &ModelDescriptor) -> Result<Prediction> {
        let model = GraphModel::load_json(&descriptor.path)?;
        check_model_fits(&model, descriptor)?;

        let tensor = prepare(canvas, descriptor);
        debug!("model '{}' input tensor shape {:?}", descriptor.id, tensor.shape());

        // Standard layout, so iteration order is the flattened CHW order.
        let input: Vec<f64> = tensor.iter().map(|&v| v as f64).collect();
        let output = model.forward(&input);
        interpret_output(&output, &descriptor.labels, model.ends_with_softmax())
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::ActivationFunction;
    use crate::canvas::surface::{Point, BLACK};
    use crate::layers::dense::Layer;
    use crate::math::matrix::Matrix;
    use crate::registry::{ModelId, ModelRegistry};

    /// A 28x28 -> 10 model whose class 1 fires on ink in the top half and
    /// class 0 on ink in the bottom half.
    fn halves_model() -> GraphModel {
        let mut weights = Matrix::zeros(784, 10);
        for row in 0..28 {
            for col in 0..28 {
                let class = if row < 14 { 1 } else { 0 };
                weights.data[row * 28 + col][class] = 1.0;
            }
        }
        GraphModel::new(vec![Layer::new(weights, Matrix::zeros(1, 10), ActivationFunction::Identity)])
    }

    fn descriptor_at(path: std::path::PathBuf) -> ModelDescriptor {
        let mut d = ModelRegistry::builtin("unused").get(ModelId::Mnist).unwrap().clone();
        d.path = path;
        d
    }

    fn temp_model_path(tag: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("sketchpad-local-{}-{}.json", tag, std::process::id()))
    }

    #[test]
    fn classifies_ink_position() {
        let path = temp_model_path("halves");
        halves_model().save_json(&path).unwrap();
        let descriptor = descriptor_at(path.clone());

        let mut canvas = Canvas::new(280, 280);
        canvas.stroke_segment(Point::new(40.0, 60.0), Point::new(240.0, 60.0), 20.0, BLACK);
        let p = LocalClassifier::new().classify(&canvas, &descriptor).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(p.label, "1");
        assert!(p.confidence.unwrap() > 0.99);
    }

    #[test]
    fn shape_mismatch_is_reported() {
        let mut model = halves_model();
        model.layers[0].weights = Matrix::zeros(784, 5);
        model.layers[0].biases = Matrix::zeros(1, 5);
        let descriptor = descriptor_at("unused.json".into());
        assert!(matches!(check_model_fits(&model, &descriptor), Err(PadError::ModelShape { .. })));

        let small = GraphModel::new(vec![Layer::new(Matrix::zeros(10, 10), Matrix::zeros(1, 10), ActivationFunction::Identity)]);
        assert!(check_model_fits(&small, &descriptor).is_err());
    }

    #[test]
    fn missing_model_file_is_an_error() {
        let descriptor = descriptor_at(temp_model_path("absent"));
        assert!(LocalClassifier::new().classify(&Canvas::new(28, 28), &descriptor).is_err());
    }
}
