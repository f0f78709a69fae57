use serde::{Deserialize, Serialize};

use crate::canvas::surface::Point;

/// One finger of a touch event, in client (viewport) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub client_x: f32,
    pub client_y: f32,
}

/// A pointer event as reported by the browser, mouse or touch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum InputEvent {
    Mouse { client_x: f32, client_y: f32 },
    /// `touches` is empty for `touchend`.
    Touch { touches: Vec<TouchPoint> },
}

impl InputEvent {
    /// Client coordinates of the event. Touch events use their first touch
    /// point and have none once the last finger lifts.
    pub fn client_point(&self) -> Option<(f32, f32)> {
        match self {
            InputEvent::Mouse { client_x, client_y } => Some((*client_x, *client_y)),
            InputEvent::Touch { touches } => touches.first().map(|t| (t.client_x, t.client_y)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// mousedown / touchstart
    Down,
    /// mousemove / touchmove
    Move,
    /// mouseup / touchend
    Up,
    /// mouseleave
    Leave,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerAction {
    pub phase: Phase,
    pub input: InputEvent,
}

/// The canvas element's CSS bounding rectangle plus the device pixel ratio,
/// as seen by the browser when the events were captured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasGeometry {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default = "default_dpr")]
    pub device_pixel_ratio: f32,
}

fn default_dpr() -> f32 {
    1.0
}

impl CanvasGeometry {
    /// Geometry of a canvas shown at its natural size at the page origin.
    pub fn identity(width: u32, height: u32) -> CanvasGeometry {
        CanvasGeometry {
            left: 0.0,
            top: 0.0,
            width: width as f32,
            height: height as f32,
            device_pixel_ratio: 1.0,
        }
    }

    /// CSS-pixel to buffer-pixel factors. When the rectangle is degenerate
    /// the device pixel ratio is the only scale we know.
    pub fn scale(&self, buffer_width: u32, buffer_height: u32) -> (f32, f32) {
        let dpr = if self.device_pixel_ratio > 0.0 { self.device_pixel_ratio } else { 1.0 };
        let sx = if self.width > 0.0 { buffer_width as f32 / self.width } else { dpr };
        let sy = if self.height > 0.0 { buffer_height as f32 / self.height } else { dpr };
        (sx, sy)
    }

    /// Maps client coordinates to backing-buffer coordinates.
    pub fn to_buffer(&self, client: (f32, f32), buffer_width: u32, buffer_height: u32) -> Point {
        let (sx, sy) = self.scale(buffer_width, buffer_height);
        Point::new((client.0 - self.left) * sx, (client.1 - self.top) * sy)
    }
}
