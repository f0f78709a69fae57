use std::io::Cursor;
use log::debug;
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::state::SharedState;
use crate::handlers;

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// Builds a header from ASCII name/value pairs. Every caller passes static
/// strings or server-generated paths, so this cannot fail.
fn header(name: &str, value: &str) -> Header {
    Header::from_bytes(name.as_bytes(), value.as_bytes()).unwrap()
}

fn bytes_response(status: u16, content_type: &str, bytes: Vec<u8>) -> Response<Cursor<Vec<u8>>> {
    let len = bytes.len();
    Response::new(
        StatusCode(status),
        vec![
            header("Content-Type", content_type),
            header("Cache-Control", "no-store"),
        ],
        Cursor::new(bytes),
        Some(len),
        None,
    )
}

pub fn html_response(body: String) -> Response<Cursor<Vec<u8>>> {
    bytes_response(200, "text/html; charset=utf-8", body.into_bytes())
}

pub fn png_response(bytes: Vec<u8>) -> Response<Cursor<Vec<u8>>> {
    bytes_response(200, "image/png", bytes)
}

pub fn no_content() -> Response<Cursor<Vec<u8>>> {
    Response::new(StatusCode(204), vec![], Cursor::new(Vec::new()), Some(0), None)
}

pub fn redirect(location: &str) -> Response<Cursor<Vec<u8>>> {
    Response::new(
        StatusCode(303),
        vec![
            header("Location", location),
            header("Content-Length", "0"),
        ],
        Cursor::new(Vec::new()),
        Some(0),
        None,
    )
}

pub fn bad_request(msg: &str) -> Response<Cursor<Vec<u8>>> {
    bytes_response(400, "text/plain; charset=utf-8", msg.as_bytes().to_vec())
}

pub fn server_error(msg: &str) -> Response<Cursor<Vec<u8>>> {
    bytes_response(500, "text/plain; charset=utf-8", msg.as_bytes().to_vec())
}

pub fn not_found() -> Response<Cursor<Vec<u8>>> {
    bytes_response(404, "text/plain", b"404 Not Found".to_vec())
}

/// Value of a request header, or an empty string.
pub fn header_value(request: &Request, name: &'static str) -> String {
    request.headers().iter()
        .find(|h| h.field.equiv(name))
        .map(|h| h.value.as_str().to_owned())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Request dispatcher
// ---------------------------------------------------------------------------

/// Dispatches incoming requests to the appropriate handler.
///
/// Handlers receive a `&mut Request` so the dispatcher keeps ownership and
/// responds at the end.
pub fn dispatch(mut request: Request, state: SharedState) {
    let method = request.method().clone();
    let url    = request.url().to_owned();

    let (path, query) = match url.find('?') {
        Some(pos) => (url[..pos].to_owned(), url[pos + 1..].to_owned()),
        None      => (url.clone(), String::new()),
    };
    debug!("{} {}", method, url);

    let response = match (method, path.as_str()) {
        // ── Page ─────────────────────────────────────────────────────────
        (Method::Get,  "/")               => handlers::pad::handle_get(&query, state),

        // ── Drawing surface ─────────────────────────────────────────────
        (Method::Post, "/pad/events")     => handlers::pad::handle_events(&mut request, state),
        (Method::Post, "/pad/clear")      => handlers::pad::handle_clear(state),
        (Method::Get,  "/pad/canvas.png") => handlers::pad::handle_canvas_png(state),
        (Method::Post, "/pad/upload")     => handlers::upload::handle_upload(&mut request, state),

        // ── Inference ────────────────────────────────────────────────────
        (Method::Post, "/pad/predict")    => handlers::predict::handle_predict(&mut request, state),

        // ── 404 ──────────────────────────────────────────────────────────
        _ => not_found(),
    };

    let _ = request.respond(response);
}
