use image::Rgba;
use log::debug;

use crate::canvas::input::{CanvasGeometry, Phase, PointerAction};
use crate::canvas::surface::{Canvas, Point, BLACK};

/// Line style applied to every stroke. Caps and joins are always round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    /// Width in logical (CSS) pixels; scaled to buffer pixels when drawn.
    pub width: f32,
    pub color: Rgba<u8>,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        StrokeStyle { width: 12.0, color: BLACK }
    }
}

/// Owns the canvas and the in-progress stroke. Pointer handlers receive the
/// session instead of touching shared globals.
#[derive(Debug, Clone)]
pub struct DrawingSession {
    canvas: Canvas,
    style: StrokeStyle,
    drawing: bool,
    /// Last point of the current path, if the path has been anchored.
    last: Option<Point>,
}

impl DrawingSession {
    pub fn new(canvas: Canvas, style: StrokeStyle) -> DrawingSession {
        DrawingSession { canvas, style, drawing: false, last: None }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    pub fn style(&self) -> StrokeStyle {
        self.style
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    /// Applies one pointer action. Returns true when a segment was rendered.
    pub fn apply(&mut self, geometry: &CanvasGeometry, action: &PointerAction) -> bool {
        let (bw, bh) = (self.canvas.width(), self.canvas.height());
        let point = action.input.client_point().map(|c| geometry.to_buffer(c, bw, bh));

        match action.phase {
            Phase::Down => {
                self.drawing = true;
                self.last = point;
                false
            }
            Phase::Move if self.drawing => {
                let Some(to) = point else { return false };
                let rendered = match self.last {
                    Some(from) => {
                        let (sx, sy) = geometry.scale(bw, bh);
                        let width = self.style.width * (sx + sy) / 2.0;
                        self.canvas.stroke_segment(from, to, width, self.style.color);
                        true
                    }
                    None => false,
                };
                self.last = Some(to);
                rendered
            }
            Phase::Move => false,
            Phase::Up | Phase::Leave => {
                self.stop();
                false
            }
        }
    }

    /// Applies a batch of actions in order; returns how many segments were
    /// rendered.
    pub fn apply_batch(&mut self, geometry: &CanvasGeometry, actions: &[PointerAction]) -> usize {
        let rendered = actions.iter().filter(|a| self.apply(geometry, a)).count();
        debug!("applied {} pointer actions, {} segments rendered", actions.len(), rendered);
        rendered
    }

    /// Ends the current path.
    pub fn stop(&mut self) {
        self.drawing = false;
        self.last = None;
    }

    /// Clears the canvas to white and ends any in-progress path.
    pub fn clear(&mut self) {
        self.stop();
        self.canvas.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::input::InputEvent;

    fn mouse(phase: Phase, x: f32, y: f32) -> PointerAction {
        PointerAction { phase, input: InputEvent::Mouse { client_x: x, client_y: y } }
    }

    fn session() -> (DrawingSession, CanvasGeometry) {
        let style = StrokeStyle { width: 4.0, color: BLACK };
        (DrawingSession::new(Canvas::new(50, 50), style), CanvasGeometry::identity(50, 50))
    }

    #[test]
    fn moves_without_press_draw_nothing() {
        let (mut s, g) = session();
        assert!(!s.apply(&g, &mouse(Phase::Move, 10.0, 10.0)));
        assert!(!s.apply(&g, &mouse(Phase::Move, 40.0, 40.0)));
        assert!(s.canvas().is_blank());
    }

    #[test]
    fn press_move_release_draws_one_stroke() {
        let (mut s, g) = session();
        let rendered = s.apply_batch(&g, &[
            mouse(Phase::Down, 10.0, 25.0),
            mouse(Phase::Move, 25.0, 25.0),
            mouse(Phase::Move, 40.0, 25.0),
            mouse(Phase::Up, 40.0, 25.0),
            mouse(Phase::Move, 40.0, 45.0),
        ]);
        assert_eq!(rendered, 2);
        assert!(!s.is_drawing());
        assert_eq!(*s.canvas().pixels().get_pixel(30, 25), BLACK);
        // The move after release must not extend the path downward.
        assert_ne!(*s.canvas().pixels().get_pixel(40, 40), BLACK);
    }

    #[test]
    fn leave_ends_the_stroke() {
        let (mut s, g) = session();
        s.apply(&g, &mouse(Phase::Down, 5.0, 5.0));
        s.apply(&g, &mouse(Phase::Leave, 5.0, 5.0));
        assert!(!s.apply(&g, &mouse(Phase::Move, 45.0, 45.0)));
        assert!(s.canvas().is_blank());
    }

    #[test]
    fn touch_down_without_point_anchors_on_first_move() {
        let (mut s, g) = session();
        s.apply(&g, &PointerAction { phase: Phase::Down, input: InputEvent::Touch { touches: vec![] } });
        assert!(s.is_drawing());
        assert!(!s.apply(&g, &mouse(Phase::Move, 10.0, 10.0)));
        assert!(s.apply(&g, &mouse(Phase::Move, 20.0, 10.0)));
    }

    #[test]
    fn stroke_width_follows_display_scale() {
        // Buffer shown at half size: each CSS pixel covers two buffer pixels.
        let mut s = DrawingSession::new(Canvas::new(100, 100), StrokeStyle { width: 10.0, color: BLACK });
        let g = CanvasGeometry { left: 0.0, top: 0.0, width: 50.0, height: 50.0, device_pixel_ratio: 1.0 };
        s.apply(&g, &mouse(Phase::Down, 10.0, 25.0));
        s.apply(&g, &mouse(Phase::Move, 40.0, 25.0));
        // Line runs at buffer y=50 with a 20-pixel width.
        assert_eq!(*s.canvas().pixels().get_pixel(50, 59), BLACK);
        assert_ne!(*s.canvas().pixels().get_pixel(50, 62), BLACK);
    }

    #[test]
    fn clear_repaints_white_and_stops() {
        let (mut s, g) = session();
        s.apply(&g, &mouse(Phase::Down, 10.0, 10.0));
        s.apply(&g, &mouse(Phase::Move, 30.0, 30.0));
        s.clear();
        assert!(s.canvas().is_blank());
        assert!(!s.is_drawing());
    }
}
