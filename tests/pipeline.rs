use std::path::PathBuf;

use image::{DynamicImage, Rgba, RgbaImage};

use sketchpad::classify::{run_prediction, Classifier};
use sketchpad::preprocess::prepare;
use sketchpad::{
    ActivationFunction, Canvas, CanvasGeometry, DrawingSession, GraphModel, InputEvent, Layer,
    LocalClassifier, Matrix, ModelId, ModelRegistry, Phase, PointerAction, StrokeStyle,
    MODEL_ERROR_MESSAGE,
};

/// A fresh directory under the system temp dir, unique per test.
fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("sketchpad-it-{}-{}", tag, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// 784 -> 10 model with zero weights and a bias that favours class 3.
fn biased_digit_model() -> GraphModel {
    let mut bias = vec![0.0; 10];
    bias[3] = 2.0;
    GraphModel::new(vec![Layer::new(Matrix::zeros(784, 10), Matrix::row(bias), ActivationFunction::Identity)])
}

fn mouse(phase: Phase, x: f32, y: f32) -> PointerAction {
    PointerAction { phase, input: InputEvent::Mouse { client_x: x, client_y: y } }
}

#[test]
fn blank_canvas_still_yields_label_and_confidence() {
    let dir = scratch_dir("blank");
    let registry = ModelRegistry::builtin(&dir);
    registry.validate().unwrap();
    let mnist = registry.get(ModelId::Mnist).unwrap();
    biased_digit_model().save_json(&mnist.path).unwrap();

    let canvas = Canvas::new(280, 280);
    let tensor = prepare(&canvas, mnist);
    assert!(tensor.iter().all(|&v| v == 0.0));

    let prediction = LocalClassifier::new().classify(&canvas, mnist).unwrap();
    assert_eq!(prediction.label, "3");
    let expected = 2.0_f64.exp() / (2.0_f64.exp() + 9.0);
    assert!((prediction.confidence.unwrap() - expected).abs() < 1e-9);

    let shown = run_prediction(&LocalClassifier::new(), &canvas, mnist);
    assert_eq!(shown, format!("3 ({:.2}%)", expected * 100.0));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_model_shows_the_generic_error() {
    let dir = scratch_dir("missing");
    let registry = ModelRegistry::builtin(&dir);
    let cifar = registry.get(ModelId::Cifar10).unwrap();
    let shown = run_prediction(&LocalClassifier::new(), &Canvas::new(64, 64), cifar);
    assert_eq!(shown, MODEL_ERROR_MESSAGE);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn model_with_wrong_label_count_is_rejected() {
    let dir = scratch_dir("labels");
    let registry = ModelRegistry::builtin(&dir);
    // A 10-output model registered under the 62-class EMNIST table.
    let emnist = registry.get(ModelId::Emnist).unwrap();
    biased_digit_model().save_json(&emnist.path).unwrap();
    assert!(LocalClassifier::new().classify(&Canvas::new(28, 28), emnist).is_err());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn drawn_stroke_reaches_the_model_input() {
    let registry = ModelRegistry::builtin("unused");
    let mnist = registry.get(ModelId::Mnist).unwrap();

    // 280-pixel buffer displayed at 140 CSS pixels, offset on the page.
    let geometry = CanvasGeometry { left: 20.0, top: 40.0, width: 140.0, height: 140.0, device_pixel_ratio: 2.0 };
    let mut session = DrawingSession::new(Canvas::new(280, 280), StrokeStyle::default());
    let rendered = session.apply_batch(&geometry, &[
        mouse(Phase::Down, 30.0, 110.0),
        mouse(Phase::Move, 90.0, 110.0),
        mouse(Phase::Move, 150.0, 110.0),
        mouse(Phase::Up, 150.0, 110.0),
    ]);
    assert_eq!(rendered, 2);

    // Stroke sits on buffer row 140, i.e. tensor row 14.
    let tensor = prepare(session.canvas(), mnist);
    assert_eq!(tensor[[0, 0, 14, 14]], 1.0);
    assert_eq!(tensor[[0, 0, 2, 14]], 0.0);
}

#[test]
fn uploaded_non_square_image_is_fitted_not_stretched() {
    let mut canvas = Canvas::new(100, 100);
    let tall = DynamicImage::ImageRgba8(RgbaImage::from_pixel(40, 80, Rgba([10, 20, 30, 255])));
    canvas.draw_image_fitted(&tall);

    // 40x80 -> 50x100 centred horizontally: columns 25..75.
    assert_eq!(canvas.pixels().get_pixel(10, 50).0, [255, 255, 255, 255]);
    assert_eq!(canvas.pixels().get_pixel(50, 50).0, [10, 20, 30, 255]);
    assert_eq!(canvas.pixels().get_pixel(50, 0).0, [10, 20, 30, 255]);
    assert_eq!(canvas.pixels().get_pixel(50, 99).0, [10, 20, 30, 255]);
    assert_eq!(canvas.pixels().get_pixel(90, 50).0, [255, 255, 255, 255]);
}
