//! Canvas → model input.
//!
//! The steps, in order:
//! 1. optional horizontal flip, then flatten transparency onto white
//! 2. luminance grayscale (1-channel models only)
//! 3. nearest-neighbour resize to the model's square size
//! 4. scale to [0, 1]
//! 5. invert (1 channel) or ImageNet mean/std normalize (3 channels)
//! 6. HWC → CHW with a leading batch dimension of 1

use image::{imageops, GrayImage, ImageBuffer, Luma, Pixel, Rgb, RgbImage, RgbaImage};
use ndarray::Array4;

use crate::canvas::Canvas;
use crate::registry::ModelDescriptor;

pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Mirrors the image if asked, then composites every pixel over opaque
/// white and drops alpha.
pub fn flatten_onto_white(src: &RgbaImage, flip_horizontal: bool) -> RgbImage {
    let mirrored;
    let src = if flip_horizontal {
        mirrored = imageops::flip_horizontal(src);
        &mirrored
    } else {
        src
    };

    RgbImage::from_fn(src.width(), src.height(), |x, y| {
        let [r, g, b, a] = src.get_pixel(x, y).0;
        let alpha = a as f32 / 255.0;
        let over = |c: u8| (c as f32 * alpha + 255.0 * (1.0 - alpha)).round() as u8;
        Rgb([over(r), over(g), over(b)])
    })
}

/// `round(0.299 R + 0.587 G + 0.114 B)`, computed in thousandths so exact
/// halves always round up.
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let y = 299 * r as u32 + 587 * g as u32 + 114 * b as u32;
    ((y + 500) / 1000) as u8
}

pub fn to_grayscale(src: &RgbImage) -> GrayImage {
    GrayImage::from_fn(src.width(), src.height(), |x, y| {
        let [r, g, b] = src.get_pixel(x, y).0;
        Luma([luminance(r, g, b)])
    })
}

/// Nearest-neighbour resize to `size × size` without corner alignment:
/// destination pixel `d` samples source `min(floor(d * src / size), src - 1)`
/// on each axis.
pub fn resize_nearest<P>(src: &ImageBuffer<P, Vec<u8>>, size: u32) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8>,
{
    let (sw, sh) = src.dimensions();
    if sw == 0 || sh == 0 {
        return ImageBuffer::new(size, size);
    }
    let pick = |d: u32, src_len: u32| -> u32 {
        let s = (d as u64 * src_len as u64 / size as u64) as u32;
        s.min(src_len - 1)
    };
    ImageBuffer::from_fn(size, size, |x, y| *src.get_pixel(pick(x, sw), pick(y, sh)))
}

/// Scales a grayscale image to [0, 1] and inverts it so strokes are bright
/// on a dark background. Shape `(1, 1, h, w)`.
pub fn gray_tensor(img: &GrayImage) -> Array4<f32> {
    let (w, h) = img.dimensions();
    Array4::from_shape_fn((1, 1, h as usize, w as usize), |(_, _, j, i)| {
        let v = img.get_pixel(i as u32, j as u32).0[0] as f32 / 255.0;
        1.0 - v
    })
}

/// Scales an RGB image to [0, 1] and normalizes each channel with the
/// ImageNet statistics. Shape `(1, 3, h, w)`.
pub fn rgb_tensor(img: &RgbImage) -> Array4<f32> {
    let (w, h) = img.dimensions();
    // Note the order of the index tuple: (batch, channel, row, column).
    Array4::from_shape_fn((1, 3, h as usize, w as usize), |(_, c, j, i)| {
        let v = img.get_pixel(i as u32, j as u32).0[c] as f32 / 255.0;
        (v - IMAGENET_MEAN[c]) / IMAGENET_STD[c]
    })
}

/// Runs the whole pipeline for one model.
pub fn prepare(canvas: &Canvas, model: &ModelDescriptor) -> Array4<f32> {
    let rgb = flatten_onto_white(canvas.pixels(), model.flip_horizontal);
    if model.channels == 1 {
        gray_tensor(&resize_nearest(&to_grayscale(&rgb), model.size))
    } else {
        rgb_tensor(&resize_nearest(&rgb, model.size))
    }
}
