pub mod error;
pub mod config;
pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod canvas;
pub mod registry;
pub mod preprocess;
pub mod classify;

// Convenience re-exports
pub use error::{PadError, Result};
pub use config::{Backend, PadConfig};
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use layers::dense::Layer;
pub use network::{GraphModel, ModelMetadata};
pub use canvas::{Canvas, CanvasGeometry, DrawingSession, InputEvent, Phase, PointerAction, StrokeStyle};
pub use registry::{ModelDescriptor, ModelId, ModelRegistry};
pub use classify::{Classifier, LocalClassifier, Prediction, RemoteClassifier, MODEL_ERROR_MESSAGE};
