//! JPEG encoding: flatten transparency onto white and emit an RGB JPEG.
//!
//! JPEG has no alpha channel, so any transparency in the rendered pixmap has
//! to be resolved before encoding. Pixels are composited onto an opaque white
//! background using their alpha as the blend weight — the same result a
//! browser shows for a transparent image on a white page. Formats without
//! alpha convert straight to RGB.

use crate::error::Svg2JpegError;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbImage, RgbaImage};
use resvg::tiny_skia::Pixmap;
use std::io::Cursor;
use tracing::debug;

/// Convert the renderer's premultiplied pixmap into a straight-alpha image.
pub fn pixmap_to_image(pixmap: &Pixmap) -> Result<DynamicImage, Svg2JpegError> {
    let mut data = Vec::with_capacity(pixmap.pixels().len() * 4);
    for px in pixmap.pixels() {
        let c = px.demultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    let rgba = RgbaImage::from_raw(pixmap.width(), pixmap.height(), data)
        .ok_or_else(|| Svg2JpegError::Internal("pixel buffer size mismatch".into()))?;
    Ok(DynamicImage::ImageRgba8(rgba))
}

/// Produce an opaque RGB image suitable for JPEG encoding.
///
/// Any pixel format carrying an alpha channel is composited onto white;
/// everything else converts directly to RGB.
pub fn flatten_to_rgb(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    let mut rgb = RgbImage::new(rgba.width(), rgba.height());
    for (out, px) in rgb.pixels_mut().zip(rgba.pixels()) {
        let a = px[3] as u32;
        for ch in 0..3 {
            // c·a + 255·(1−a), rounded
            out[ch] = ((px[ch] as u32 * a + 255 * (255 - a) + 127) / 255) as u8;
        }
    }
    rgb
}

/// Encode an RGB image as a baseline JPEG at the given quality (0–100).
pub fn encode_jpeg(rgb: &RgbImage, quality: u8) -> Result<Vec<u8>, Svg2JpegError> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut buf), quality);
    rgb.write_with_encoder(encoder)
        .map_err(|e| Svg2JpegError::EncodeFailed {
            detail: e.to_string(),
        })?;

    debug!("Encoded JPEG → {} bytes at quality {}", buf.len(), quality);
    Ok(buf)
}
