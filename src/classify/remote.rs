use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::ColorType;
use log::{debug, info};
use serde::Serialize;
use serde_json::Value;

use crate::canvas::surface::encode_png;
use crate::canvas::Canvas;
use crate::classify::{Classifier, Prediction};
use crate::error::{PadError, Result};
use crate::preprocess::flatten_onto_white;
use crate::registry::ModelDescriptor;

/// JSON body the prediction endpoint expects.
#[derive(Debug, Serialize)]
pub struct PredictRequest {
    /// `data:image/png;base64,...`
    pub image: String,
}

/// Sends the drawing to an HTTP prediction endpoint.
///
/// The drawing is only flattened onto white and PNG-encoded: no flip, no
/// resize, no inversion. Model selection is the server's business, so the
/// descriptor is ignored. One attempt, no retries.
pub struct RemoteClassifier {
    endpoint: String,
    agent: ureq::Agent,
}

impl RemoteClassifier {
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> RemoteClassifier {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        RemoteClassifier { endpoint: endpoint.into(), agent: builder.build() }
    }
}

/// Flattens the canvas and wraps it as a PNG data URL.
pub fn build_request(canvas: &Canvas) -> Result<PredictRequest> {
    let rgb = flatten_onto_white(canvas.pixels(), false);
    let png = encode_png(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)?;
    Ok(PredictRequest { image: format!("data:image/png;base64,{}", STANDARD.encode(png)) })
}

/// Pulls the `prediction` field out of the endpoint's reply. Strings are
/// used verbatim; any other JSON value is shown as JSON.
pub fn parse_response(body: &Value) -> Result<Prediction> {
    let label = match body.get("prediction") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => {
            return Err(PadError::Remote(format!("response has no 'prediction' field: {}", body)))
        }
        Some(other) => other.to_string(),
    };
    Ok(Prediction { label, confidence: None })
}

impl Classifier for RemoteClassifier {
    fn classify(&self, canvas: &Canvas, _model: &ModelDescriptor) -> Result<Prediction> {
        let request = build_request(canvas)?;
        debug!("posting {} byte payload to {}", request.image.len(), self.endpoint);

        let response = self.agent.post(&self.endpoint).send_json(&request)?;
        let body: Value = response
            .into_json()
            .map_err(|e| PadError::Remote(format!("unreadable response body: {}", e)))?;
        info!("remote endpoint replied: {}", body);
        parse_response(&body)
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::surface::{Point, BLACK};
    use serde_json::json;

    #[test]
    fn request_is_a_png_data_url_of_the_flattened_canvas() {
        let mut canvas = Canvas::new(30, 20);
        canvas.stroke_segment(Point::new(0.0, 0.0), Point::new(5.0, 0.0), 2.0, BLACK);
        let req = build_request(&canvas).unwrap();

        let encoded = req.image.strip_prefix("data:image/png;base64,").unwrap();
        let png = STANDARD.decode(encoded).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (30, 20));
        assert_eq!(decoded.get_pixel(1, 0).0, [0, 0, 0]);
        // Not mirrored.
        assert_eq!(decoded.get_pixel(28, 0).0, [255, 255, 255]);

        let body = serde_json::to_value(&req).unwrap();
        assert!(body.get("image").is_some());
    }

    #[test]
    fn prediction_field_is_read() {
        assert_eq!(parse_response(&json!({"prediction": "B"})).unwrap().label, "B");
        assert_eq!(parse_response(&json!({"prediction": 7})).unwrap().label, "7");
        assert_eq!(parse_response(&json!({"prediction": ["A", 0.9]})).unwrap().label, r#"["A",0.9]"#);
    }

    #[test]
    fn missing_prediction_is_an_error() {
        assert!(matches!(parse_response(&json!({"error": "busy"})), Err(PadError::Remote(_))));
        assert!(parse_response(&json!({"prediction": null})).is_err());
    }
}
