pub mod metadata;
pub mod network;

pub use network::GraphModel;
pub use metadata::ModelMetadata;
