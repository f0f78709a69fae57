use serde::{Deserialize, Serialize};

/// Optional annotations attached to a saved graph model.
/// All fields are Option<> so bare models deserialize cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ModelMetadata {
    pub description: Option<String>,
    /// Class labels recorded by whoever exported the file. Informational
    /// only; predictions are always named from the registry's label table.
    pub output_labels: Option<Vec<String>>,
}
