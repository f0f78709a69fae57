use std::path::Path;

use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{PadError, Result};
use crate::layers::dense::Layer;
use crate::network::metadata::ModelMetadata;

/// An inference-only serialized network: an ordered stack of dense layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphModel {
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub metadata: Option<ModelMetadata>,
}

impl GraphModel {
    pub fn new(layers: Vec<Layer>) -> GraphModel {
        GraphModel { layers, metadata: None }
    }

    /// Forward pass over a flattened input vector.
    pub fn forward(&self, input: &[f64]) -> Vec<f64> {
        let mut current = input.to_vec();
        for layer in &self.layers {
            current = layer.feed_from(current);
        }
        current
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, Layer::input_size)
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, Layer::size)
    }

    /// True when the final layer already produces a probability vector.
    pub fn ends_with_softmax(&self) -> bool {
        matches!(self.layers.last().map(|l| &l.activation), Some(ActivationFunction::Softmax))
    }

    /// Checks that the layer stack is non-empty and that every layer's shape
    /// chains into the next.
    pub fn check_consistency(&self) -> std::result::Result<(), String> {
        if self.layers.is_empty() {
            return Err("model has no layers".into());
        }
        for (i, layer) in self.layers.iter().enumerate() {
            if let Some(problem) = layer.shape_problem() {
                return Err(format!("layer {}: {}", i, problem));
            }
        }
        for (i, pair) in self.layers.windows(2).enumerate() {
            if pair[0].size() != pair[1].input_size() {
                return Err(format!(
                    "layer {} outputs {} values but layer {} expects {}",
                    i, pair[0].size(), i + 1, pair[1].input_size()
                ));
            }
        }
        Ok(())
    }

    /// Serializes the model to a pretty-printed JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a model from a JSON file and checks its layer shapes.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<GraphModel> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let model: GraphModel = serde_json::from_reader(reader)?;
        model.check_consistency().map_err(|reason| PadError::ModelShape {
            model: path.display().to_string(),
            reason,
        })?;
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::matrix::Matrix;

    fn two_layer() -> GraphModel {
        GraphModel::new(vec![
            Layer::new(
                Matrix::from_data(vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]]),
                Matrix::row(vec![0.0, 0.0]),
                ActivationFunction::ReLU,
            ),
            Layer::new(
                Matrix::from_data(vec![vec![1.0, 0.0, 2.0], vec![0.0, 1.0, 0.0]]),
                Matrix::row(vec![0.0, 0.0, 0.0]),
                ActivationFunction::Identity,
            ),
        ])
    }

    #[test]
    fn sizes_and_forward() {
        let model = two_layer();
        assert_eq!(model.input_size(), 3);
        assert_eq!(model.output_size(), 3);
        assert!(!model.ends_with_softmax());
        assert_eq!(model.forward(&[1.0, 2.0, 0.0]), vec![1.0, 2.0, 2.0]);
    }

    #[test]
    fn broken_chain_is_rejected() {
        let mut model = two_layer();
        model.layers[1].weights = Matrix::zeros(4, 3);
        assert!(model.check_consistency().is_err());
        assert!(GraphModel::new(vec![]).check_consistency().is_err());
    }

    #[test]
    fn json_round_trip_through_disk() {
        let path = std::env::temp_dir().join(format!("sketchpad-net-{}.json", std::process::id()));
        let model = two_layer();
        model.save_json(&path).unwrap();
        let loaded = GraphModel::load_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, model);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = GraphModel::load_json("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, PadError::Io(_)));
    }
}
