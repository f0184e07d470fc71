//! Derived images: a downscaled copy for display and a square thumbnail on a
//! white canvas. Both are encoded as WebP and computed from the decoded RGB
//! original. CPU-bound; call from `spawn_blocking`.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use crate::errors::ServiceError;

pub const MAX_WIDTH: u32 = 1920;
pub const MAX_HEIGHT: u32 = 1080;
pub const CROP_SIZE: u32 = 600;
const CANVAS: Rgb<u8> = Rgb([255, 255, 255]);

/// Encoded derivatives of one upload.
#[derive(Debug, Default)]
pub struct Derived {
    pub processed: Option<Vec<u8>>,
    pub cropped: Option<Vec<u8>>,
}

/// Largest size that fits in `max_w`×`max_h` with the same aspect ratio.
/// Never upscales.
pub fn fit_within(width: u32, height: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if width == 0 || height == 0 || (width <= max_w && height <= max_h) {
        return (width, height);
    }
    let scale = f64::min(max_w as f64 / width as f64, max_h as f64 / height as f64);
    let w = ((width as f64 * scale).round() as u32).clamp(1, max_w);
    let h = ((height as f64 * scale).round() as u32).clamp(1, max_h);
    (w, h)
}

fn downscale(img: &RgbImage, max_w: u32, max_h: u32) -> RgbImage {
    let (w, h) = fit_within(img.width(), img.height(), max_w, max_h);
    if (w, h) == img.dimensions() {
        return img.clone();
    }
    imageops::resize(img, w, h, FilterType::Lanczos3)
}

pub fn compress(img: &RgbImage) -> RgbImage {
    downscale(img, MAX_WIDTH, MAX_HEIGHT)
}

/// Fit into `CROP_SIZE`² and center on a white square.
pub fn crop_to_canvas(img: &RgbImage) -> RgbImage {
    let fitted = downscale(img, CROP_SIZE, CROP_SIZE);
    let mut canvas = RgbImage::from_pixel(CROP_SIZE, CROP_SIZE, CANVAS);
    let x = (CROP_SIZE - fitted.width()) / 2;
    let y = (CROP_SIZE - fitted.height()) / 2;
    imageops::overlay(&mut canvas, &fitted, x as i64, y as i64);
    canvas
}

pub fn encode_webp(img: RgbImage) -> Result<Vec<u8>, ServiceError> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::WebP)
        .map_err(|e| ServiceError::Image(e.to_string()))?;
    Ok(buf.into_inner())
}

/// Decode `bytes` and produce the requested derivatives.
pub fn process(bytes: &[u8], compress_image: bool, crop_image: bool) -> Result<Derived, ServiceError> {
    let rgb = image::load_from_memory(bytes)
        .map_err(|e| ServiceError::Image(format!("cannot decode image: {e}")))?
        .to_rgb8();
    let processed = if compress_image { Some(encode_webp(compress(&rgb))?) } else { None };
    let cropped = if crop_image { Some(encode_webp(crop_to_canvas(&rgb))?) } else { None };
    Ok(Derived { processed, cropped })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([200, 30, 30]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img).write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn fit_never_upscales() {
        assert_eq!(fit_within(800, 600, MAX_WIDTH, MAX_HEIGHT), (800, 600));
        assert_eq!(fit_within(1920, 1080, MAX_WIDTH, MAX_HEIGHT), (1920, 1080));
    }

    #[test]
    fn fit_keeps_aspect_ratio() {
        assert_eq!(fit_within(3840, 2160, MAX_WIDTH, MAX_HEIGHT), (1920, 1080));
        assert_eq!(fit_within(4000, 1000, MAX_WIDTH, MAX_HEIGHT), (1920, 480));
        assert_eq!(fit_within(1000, 4000, MAX_WIDTH, MAX_HEIGHT), (270, 1080));
        assert_eq!(fit_within(1200, 900, CROP_SIZE, CROP_SIZE), (600, 450));
        assert_eq!(fit_within(10000, 1, CROP_SIZE, CROP_SIZE), (600, 1));
    }

    #[test]
    fn crop_is_square_with_white_border() {
        let wide = RgbImage::from_pixel(1200, 600, Rgb([0, 0, 0]));
        let out = crop_to_canvas(&wide);
        assert_eq!(out.dimensions(), (CROP_SIZE, CROP_SIZE));
        // 1200x600 -> 600x300 centered: rows 0..150 are canvas
        assert_eq!(out.get_pixel(300, 10), &CANVAS);
        assert_eq!(out.get_pixel(300, 300), &Rgb([0, 0, 0]));
        assert_eq!(out.get_pixel(300, 590), &CANVAS);

        let small = RgbImage::from_pixel(100, 100, Rgb([0, 0, 0]));
        let out = crop_to_canvas(&small);
        assert_eq!(out.dimensions(), (CROP_SIZE, CROP_SIZE));
        assert_eq!(out.get_pixel(0, 0), &CANVAS);
        assert_eq!(out.get_pixel(300, 300), &Rgb([0, 0, 0]));
    }

    #[test]
    fn process_produces_requested_webp_outputs() {
        let bytes = png_bytes(64, 32);
        let derived = process(&bytes, true, false).unwrap();
        assert!(derived.cropped.is_none());
        let processed = image::load_from_memory(derived.processed.as_deref().unwrap()).unwrap();
        assert_eq!((processed.width(), processed.height()), (64, 32));

        let derived = process(&bytes, false, true).unwrap();
        let cropped = image::load_from_memory(derived.cropped.as_deref().unwrap()).unwrap();
        assert_eq!((cropped.width(), cropped.height()), (CROP_SIZE, CROP_SIZE));
    }

    #[test]
    fn garbage_is_an_image_error() {
        assert!(matches!(process(b"not an image", true, true), Err(ServiceError::Image(_))));
    }
}
