use std::io::{Cursor, Read};

use log::{info, warn};
use tiny_http::{Request, Response};

use sketchpad::{Canvas, PadError};

use crate::state::{lock, FlashMessage, SharedState};
use crate::util::multipart::{extract_boundary, file_part};

/// Largest accepted upload, in bytes.
pub const MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;

// ---------------------------------------------------------------------------
// POST /pad/upload
// ---------------------------------------------------------------------------

/// Replaces the drawing with an uploaded image, fitted and centred.
pub fn handle_upload(request: &mut Request, state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let content_type = crate::routes::header_value(request, "Content-Type");

    let bytes = read_upload(request, &content_type);

    let mut st = lock(&state);
    let outcome = bytes.and_then(|b| {
        st.session.stop();
        apply_upload(st.session.canvas_mut(), &b)
    });
    match outcome {
        Ok(()) => {
            info!("uploaded image drawn onto the canvas");
            st.prediction = None;
            st.flash = Some(FlashMessage::success("Image loaded onto the canvas."));
        }
        Err(e) => {
            warn!("upload rejected: {}", e);
            st.flash = Some(FlashMessage::error(format!("Could not use the uploaded file: {}", e)));
        }
    }
    crate::routes::redirect("/")
}

fn read_upload(request: &mut Request, content_type: &str) -> Result<Vec<u8>, PadError> {
    let boundary = extract_boundary(content_type)
        .ok_or_else(|| PadError::Upload("expected a multipart/form-data request".into()))?;

    let mut body = Vec::new();
    request.as_reader().take(MAX_UPLOAD_BYTES + 1).read_to_end(&mut body)?;
    if body.len() as u64 > MAX_UPLOAD_BYTES {
        return Err(PadError::Upload(format!("file exceeds {} bytes", MAX_UPLOAD_BYTES)));
    }

    extract_image(&body, &boundary)
}

/// Pulls the image bytes out of a multipart body.
pub fn extract_image(body: &[u8], boundary: &str) -> Result<Vec<u8>, PadError> {
    match file_part(body, boundary, "image_file") {
        Some(part) if !part.data.is_empty() => Ok(part.data.to_vec()),
        _ => Err(PadError::Upload("no image file was uploaded".into())),
    }
}

/// Decodes an uploaded image straight onto a canvas.
pub fn apply_upload(canvas: &mut Canvas, bytes: &[u8]) -> Result<(), PadError> {
    let img = image::load_from_memory(bytes)?;
    canvas.draw_image_fitted(&img);
    Ok(())
}
