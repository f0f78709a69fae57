use std::sync::{Arc, Mutex};

use sketchpad::{
    Backend, Canvas, Classifier, DrawingSession, LocalClassifier, ModelId, ModelRegistry,
    PadConfig, RemoteClassifier, StrokeStyle,
};

// ---------------------------------------------------------------------------
// Flash messages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum FlashKind { Success, Error }

#[derive(Debug, Clone)]
pub struct FlashMessage {
    pub kind: FlashKind,
    pub text: String,
}

impl FlashMessage {
    pub fn success(text: impl Into<String>) -> Self {
        FlashMessage { kind: FlashKind::Success, text: text.into() }
    }
    pub fn error(text: impl Into<String>) -> Self {
        FlashMessage { kind: FlashKind::Error, text: text.into() }
    }
}

// ---------------------------------------------------------------------------
// Main state struct
// ---------------------------------------------------------------------------

pub struct PadState {
    /// The drawing: canvas, stroke style and in-progress path.
    pub session:    DrawingSession,
    /// Validated model descriptors.
    pub registry:   ModelRegistry,
    /// Backend every prediction goes through.
    pub classifier: Arc<dyn Classifier>,
    /// Model tab currently selected.
    pub selected:   ModelId,
    /// Rendered result of the last prediction, cleared with the canvas.
    pub prediction: Option<String>,
    /// One-shot flash message for the next page render.
    pub flash:      Option<FlashMessage>,
}

impl PadState {
    pub fn new(config: &PadConfig, registry: ModelRegistry) -> Self {
        let classifier: Arc<dyn Classifier> = match config.backend {
            Backend::Local  => Arc::new(LocalClassifier::new()),
            Backend::Remote => Arc::new(RemoteClassifier::new(config.remote_url.clone(), config.remote_timeout)),
        };
        let style = StrokeStyle { width: config.stroke_width, ..StrokeStyle::default() };

        PadState {
            session:    DrawingSession::new(Canvas::new(config.canvas_size, config.canvas_size), style),
            registry,
            classifier,
            selected:   ModelId::default(),
            prediction: None,
            flash:      None,
        }
    }

    /// Takes and returns the current flash message, clearing it.
    pub fn take_flash(&mut self) -> Option<FlashMessage> {
        self.flash.take()
    }
}

/// Shared state handed to every handler.
pub type SharedState = Arc<Mutex<PadState>>;

/// Locks the shared state, recovering the guard if a handler thread
/// panicked while holding it.
pub fn lock(state: &SharedState) -> std::sync::MutexGuard<'_, PadState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
