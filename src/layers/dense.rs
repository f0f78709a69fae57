use serde::{Serialize, Deserialize};

use crate::{math::matrix::Matrix, activation::activation::ActivationFunction};

/// One fully-connected layer of a graph model: `a = f(xW + b)`.
///
/// `weights` is `(input_size, size)`, `biases` is `(1, size)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer{
    pub weights: Matrix,
    pub biases: Matrix,
    pub activation: ActivationFunction
}

impl Layer {
    pub fn new(weights: Matrix, biases: Matrix, activation: ActivationFunction) -> Layer {
        Layer { weights, biases, activation }
    }

    pub fn input_size(&self) -> usize {
        self.weights.rows
    }

    pub fn size(&self) -> usize {
        self.weights.cols
    }

    pub fn feed_from(&self, input: Vec<f64>) -> Vec<f64> {
        let z = Matrix::row(input) * &self.weights + self.biases.clone();
        self.activation.apply(&z.data[0])
    }

    /// Describes the first inconsistency between the weight and bias shapes,
    /// if any.
    pub fn shape_problem(&self) -> Option<String> {
        if !self.weights.is_well_formed() {
            return Some("weights rows/cols do not match their data".into());
        }
        if !self.biases.is_well_formed() {
            return Some("biases rows/cols do not match their data".into());
        }
        if self.biases.rows != 1 || self.biases.cols != self.weights.cols {
            return Some(format!(
                "biases are {}x{}, expected 1x{}",
                self.biases.rows, self.biases.cols, self.weights.cols
            ));
        }
        None
    }
}
