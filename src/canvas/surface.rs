use std::io::Cursor;

use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ColorType, DynamicImage, ImageEncoder, Rgba, RgbaImage};

use crate::error::Result;

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// A point in backing-buffer pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Point {
        Point { x, y }
    }
}

/// The pixel surface strokes are rendered onto. Only rasterized pixels are
/// kept; there is no path history.
#[derive(Debug, Clone)]
pub struct Canvas {
    pixels: RgbaImage,
}

impl Canvas {
    /// An opaque white canvas of `width × height` pixels.
    pub fn new(width: u32, height: u32) -> Canvas {
        Canvas { pixels: RgbaImage::from_pixel(width, height, WHITE) }
    }

    pub fn from_image(pixels: RgbaImage) -> Canvas {
        Canvas { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Repaints the whole buffer opaque white. Inference assumes a white
    /// background, so this never clears to transparent.
    pub fn clear(&mut self) {
        for p in self.pixels.pixels_mut() {
            *p = WHITE;
        }
    }

    /// True when every pixel is opaque white.
    pub fn is_blank(&self) -> bool {
        self.pixels.pixels().all(|p| *p == WHITE)
    }

    /// Paints every pixel whose centre lies within `width / 2` of the
    /// segment `a → b`. Distance-to-segment coverage gives round caps, and
    /// consecutive segments sharing an endpoint get round joins for free.
    pub fn stroke_segment(&mut self, a: Point, b: Point, width: f32, color: Rgba<u8>) {
        let radius = (width / 2.0).max(0.5);
        let (w, h) = (self.pixels.width() as f32, self.pixels.height() as f32);
        if w == 0.0 || h == 0.0 {
            return;
        }

        let min_x = (a.x.min(b.x) - radius).floor().max(0.0);
        let max_x = (a.x.max(b.x) + radius).ceil().min(w - 1.0);
        let min_y = (a.y.min(b.y) - radius).floor().max(0.0);
        let max_y = (a.y.max(b.y) + radius).ceil().min(h - 1.0);
        if min_x > max_x || min_y > max_y {
            return;
        }

        let r2 = radius * radius;
        for y in min_y as u32..=max_y as u32 {
            for x in min_x as u32..=max_x as u32 {
                let c = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                if distance_sq_to_segment(c, a, b) <= r2 {
                    self.pixels.put_pixel(x, y, color);
                }
            }
        }
    }

    /// Replaces the drawing with `img`, scaled to fit while keeping its
    /// aspect ratio and centred on a white background. Never crops and
    /// never stretches.
    pub fn draw_image_fitted(&mut self, img: &DynamicImage) {
        self.clear();
        let src = img.to_rgba8();
        let (cw, ch) = (self.width(), self.height());
        let (iw, ih) = src.dimensions();
        if iw == 0 || ih == 0 || cw == 0 || ch == 0 {
            return;
        }

        let (dw, dh, ox, oy) = fit_centered(iw, ih, cw, ch);
        let scaled = imageops::resize(&src, dw, dh, FilterType::Triangle);
        imageops::overlay(&mut self.pixels, &scaled, ox, oy);
    }

    /// PNG-encodes the current buffer.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        encode_png(self.pixels.as_raw(), self.width(), self.height(), ColorType::Rgba8)
    }
}

/// Encodes raw pixel bytes as PNG.
pub fn encode_png(raw: &[u8], width: u32, height: u32, color: ColorType) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    PngEncoder::new(&mut out).write_image(raw, width, height, color)?;
    Ok(out.into_inner())
}

/// Size and offset of an `iw × ih` image fitted inside a `cw × ch` canvas:
/// `scale = min(cw/iw, ch/ih)`, centred. Returns `(width, height, x, y)`.
pub fn fit_centered(iw: u32, ih: u32, cw: u32, ch: u32) -> (u32, u32, i64, i64) {
    let scale = (cw as f64 / iw as f64).min(ch as f64 / ih as f64);
    let dw = ((iw as f64 * scale).round() as u32).clamp(1, cw);
    let dh = ((ih as f64 * scale).round() as u32).clamp(1, ch);
    let ox = ((cw - dw) / 2) as i64;
    let oy = ((ch - dh) / 2) as i64;
    (dw, dh, ox, oy)
}

fn distance_sq_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (qx, qy) = (a.x + t * dx, a.y + t * dy);
    (p.x - qx) * (p.x - qx) + (p.y - qy) * (p.y - qy)
}
