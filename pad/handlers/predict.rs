use std::io::{Cursor, Read};

use log::info;
use tiny_http::{Request, Response};

use sketchpad::classify::run_prediction;

use crate::handlers::pad::{build_page, select_model};
use crate::state::{lock, FlashMessage, SharedState};
use crate::util::form::{form_get, parse_form};

// ---------------------------------------------------------------------------
// POST /pad/predict
// ---------------------------------------------------------------------------

/// Classifies the current drawing with the submitted model (or the selected
/// one) and renders the page with the result.
///
/// The state lock is released while the classifier runs so a slow remote
/// endpoint does not freeze drawing. Overlapping predictions are not
/// coalesced; whichever finishes last is shown.
pub fn handle_predict(request: &mut Request, state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut body = String::new();
    let _ = request.as_reader().take(4096).read_to_string(&mut body);
    let pairs = parse_form(&body);

    let (canvas, descriptor, classifier) = {
        let mut st = lock(&state);
        if let Some(raw) = form_get(&pairs, "model") {
            if !select_model(&mut st, raw) {
                return crate::routes::html_response(build_page(&mut st));
            }
        }
        let descriptor = match st.registry.get(st.selected) {
            Ok(d)  => d.clone(),
            Err(e) => {
                st.flash = Some(FlashMessage::error(e.to_string()));
                return crate::routes::html_response(build_page(&mut st));
            }
        };
        (st.session.canvas().clone(), descriptor, st.classifier.clone())
    };

    let result = run_prediction(classifier.as_ref(), &canvas, &descriptor);
    info!("prediction with '{}': {}", descriptor.id, result);

    let mut st = lock(&state);
    st.prediction = Some(result);
    crate::routes::html_response(build_page(&mut st))
}
