use std::io::{Cursor, Read};

use log::{debug, warn};
use serde::Deserialize;
use tiny_http::{Request, Response};

use sketchpad::{CanvasGeometry, ModelId, PointerAction};

use crate::render::{html_escape, render_page};
use crate::state::{lock, FlashKind, FlashMessage, PadState, SharedState};
use crate::util::form::{form_get, parse_form};

/// Pointer batches are small; anything bigger is not from our page.
const MAX_EVENTS_BODY: u64 = 1 << 20;

/// Body of `POST /pad/events`.
#[derive(Debug, Deserialize)]
pub struct EventBatch {
    pub geometry: CanvasGeometry,
    pub actions:  Vec<PointerAction>,
}

// ---------------------------------------------------------------------------
// GET /  and  GET /?model=ID
// ---------------------------------------------------------------------------

pub fn handle_get(query: &str, state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut st = lock(&state);

    let pairs = parse_form(query);
    if let Some(raw) = form_get(&pairs, "model") {
        select_model(&mut st, raw);
    }

    crate::routes::html_response(build_page(&mut st))
}

/// Switches the selected model to `raw`. Unknown ids leave the selection
/// alone and queue an error flash; returns whether the switch happened.
pub fn select_model(st: &mut PadState, raw: &str) -> bool {
    match st.registry.lookup(raw).map(|m| m.id) {
        Ok(id) => {
            st.selected = id;
            true
        }
        Err(e) => {
            warn!("{}", e);
            st.flash = Some(FlashMessage::error(format!("Unknown model '{}'.", raw)));
            false
        }
    }
}

// ---------------------------------------------------------------------------
// POST /pad/events
// ---------------------------------------------------------------------------

pub fn handle_events(request: &mut Request, state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut body = Vec::new();
    if let Err(e) = request.as_reader().take(MAX_EVENTS_BODY).read_to_end(&mut body) {
        return crate::routes::bad_request(&format!("could not read body: {}", e));
    }

    let batch: EventBatch = match serde_json::from_slice(&body) {
        Ok(b)  => b,
        Err(e) => return crate::routes::bad_request(&format!("malformed event batch: {}", e)),
    };

    let mut st = lock(&state);
    st.session.apply_batch(&batch.geometry, &batch.actions);
    crate::routes::no_content()
}

// ---------------------------------------------------------------------------
// POST /pad/clear
// ---------------------------------------------------------------------------

pub fn handle_clear(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut st = lock(&state);
    st.session.clear();
    st.prediction = None;
    debug!("canvas cleared");
    crate::routes::redirect("/")
}

// ---------------------------------------------------------------------------
// GET /pad/canvas.png
// ---------------------------------------------------------------------------

pub fn handle_canvas_png(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let canvas = lock(&state).session.canvas().clone();
    match canvas.to_png() {
        Ok(png) => crate::routes::png_response(png),
        Err(e)  => crate::routes::server_error(&format!("could not encode canvas: {}", e)),
    }
}

// ---------------------------------------------------------------------------
// Page builder
// ---------------------------------------------------------------------------

pub fn build_page(st: &mut PadState) -> String {
    let flash = st.take_flash().map(flash_html).unwrap_or_default();
    let tabs  = model_tabs(st.selected);
    let about = st.registry.get(st.selected)
        .map(|m| format!(
            "<p>{}</p><p class=\"accuracy\">Accuracy: {:.2}%</p>",
            html_escape(&m.description), m.accuracy
        ))
        .unwrap_or_default();
    let prediction = st.prediction.as_deref()
        .map(|p| format!("<div class=\"prediction\">Predicted: {}</div>", html_escape(p)))
        .unwrap_or_default();

    let canvas = st.session.canvas();
    let (size, stroke) = (canvas.width(), st.session.style().width);

    render_page(size, stroke, |tmpl| {
        tmpl
            .replace("{{FLASH}}", &flash)
            .replace("{{MODEL_TABS}}", &tabs)
            .replace("{{MODEL_ABOUT}}", &about)
            .replace("{{SELECTED_MODEL}}", st.selected.as_str())
            .replace("{{PREDICTION}}", &prediction)
            .replace("{{BACKEND}}", st.classifier.name())
    })
}

fn model_tabs(selected: ModelId) -> String {
    ModelId::ALL.iter().map(|id| {
        let active = if *id == selected { " active" } else { "" };
        format!(
            "<a class=\"tab{}\" href=\"/?model={}\">{}</a>",
            active, id.as_str(), html_escape(id.title())
        )
    }).collect::<Vec<_>>().join("\n")
}

fn flash_html(flash: FlashMessage) -> String {
    let class = match flash.kind {
        FlashKind::Success => "flash flash-success",
        FlashKind::Error   => "flash flash-error",
    };
    format!("<div class=\"{}\">{}</div>", class, html_escape(&flash.text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketchpad::{ModelRegistry, PadConfig, Phase};

    fn state() -> PadState {
        let cfg = PadConfig { canvas_size: 40, ..PadConfig::default() };
        PadState::new(&cfg, ModelRegistry::builtin("unused"))
    }

    #[test]
    fn page_shows_selected_model_and_prediction() {
        let mut st = state();
        st.selected = ModelId::Cifar10;
        st.prediction = Some("cat (51.20%)".into());
        let html = build_page(&mut st);
        assert!(html.contains("Predicted: cat (51.20%)"));
        assert!(html.contains("recognizing different objects"));
        assert!(html.contains("Accuracy: 80.83%"));
        assert!(html.contains("class=\"tab active\" href=\"/?model=cifar-10\""));
    }

    #[test]
    fn unknown_model_keeps_selection_and_flashes() {
        let mut st = state();
        assert!(select_model(&mut st, "fashion-mnist"));
        assert_eq!(st.selected, ModelId::FashionMnist);
        assert!(st.flash.is_none());

        assert!(!select_model(&mut st, "svhn"));
        assert_eq!(st.selected, ModelId::FashionMnist);
        assert!(build_page(&mut st).contains("Unknown model &#39;svhn&#39;."));
    }

    #[test]
    fn flash_is_shown_once() {
        let mut st = state();
        st.flash = Some(FlashMessage::error("bad <file>"));
        assert!(build_page(&mut st).contains("bad &lt;file&gt;"));
        assert!(!build_page(&mut st).contains("bad &lt;file&gt;"));
    }

    #[test]
    fn event_batch_json_drives_the_session() {
        let json = r#"{
            "geometry": {"left": 10, "top": 10, "width": 40, "height": 40, "device_pixel_ratio": 2},
            "actions": [
                {"phase": "down", "input": {"kind": "mouse", "client_x": 15, "client_y": 30}},
                {"phase": "move", "input": {"kind": "mouse", "client_x": 45, "client_y": 30}},
                {"phase": "up",   "input": {"kind": "mouse", "client_x": 45, "client_y": 30}}
            ]
        }"#;
        let batch: EventBatch = serde_json::from_str(json).unwrap();
        assert_eq!(batch.actions[0].phase, Phase::Down);

        let mut st = state();
        assert_eq!(st.session.apply_batch(&batch.geometry, &batch.actions), 1);
        assert!(!st.session.canvas().is_blank());
    }
}
