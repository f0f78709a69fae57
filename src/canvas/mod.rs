pub mod input;
pub mod session;
pub mod surface;

pub use input::{CanvasGeometry, InputEvent, Phase, PointerAction, TouchPoint};
pub use session::{DrawingSession, StrokeStyle};
pub use surface::{Canvas, Point};
