//! # Carrier Images
//!
//! Loading carriers from any format the `image` crate understands, writing
//! stego images back out as PNG, and composing the fixed-size canvas used
//! for template exports.

use std::io::Cursor;
use std::path::Path;

use base64::{engine::general_purpose, Engine as _};
use image::{imageops, ImageFormat, Rgba};
use serde::{Deserialize, Serialize};

use super::error::{Result, StegoError};
use super::steganography::RasterImage;

/// Decode an image (PNG, JPEG, ...) from memory into an RGBA8 buffer.
pub fn load_carrier(bytes: &[u8]) -> Result<RasterImage> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(StegoError::CarrierLoad)
}

/// Decode an image file into an RGBA8 buffer.
pub fn open_carrier<P: AsRef<Path>>(path: P) -> Result<RasterImage> {
    image::open(path)
        .map(|img| img.to_rgba8())
        .map_err(StegoError::CarrierLoad)
}

/// Encode an image as PNG bytes. PNG is the only output format since any
/// lossy format would destroy the hidden bits.
pub fn to_png_bytes(image: &RasterImage) -> Result<Vec<u8>> {
    let mut output_bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut output_bytes), ImageFormat::Png)
        .map_err(StegoError::ImageWrite)?;
    Ok(output_bytes)
}

/// Write an image to `path` as PNG regardless of the file extension.
pub fn save_png<P: AsRef<Path>>(image: &RasterImage, path: P) -> Result<()> {
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(StegoError::ImageWrite)
}

/// Wrap PNG bytes in a `data:` URL, ready for a download link.
pub fn to_data_url(png_bytes: &[u8]) -> String {
    format!(
        "data:image/png;base64,{}",
        general_purpose::STANDARD.encode(png_bytes)
    )
}

/// Canvas settings for exports that have no caller-supplied carrier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Side length of the square canvas in pixels.
    pub size: u32,
    /// RGBA fill colour.
    pub background: [u8; 4],
    /// Largest share of the canvas side the icon may cover (0.0 - 1.0).
    pub icon_scale: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            size: 300,
            background: [255, 255, 255, 255],
            icon_scale: 0.6,
        }
    }
}

/// Build a square canvas and draw `icon` centred on it.
///
/// The icon is shrunk (never enlarged) to fit within `icon_scale` of the
/// canvas side, keeping its aspect ratio.
pub fn compose_canvas(icon: Option<&RasterImage>, config: &CanvasConfig) -> RasterImage {
    let size = config.size;
    let mut canvas = RasterImage::from_pixel(size, size, Rgba(config.background));

    let Some(icon) = icon else {
        return canvas;
    };
    let (icon_width, icon_height) = icon.dimensions();
    if icon_width == 0 || icon_height == 0 || size == 0 {
        return canvas;
    }

    let max_side = (size as f32 * config.icon_scale.clamp(0.0, 1.0)).max(1.0);
    let scale = (max_side / icon_width.max(icon_height) as f32).min(1.0);
    let width = ((icon_width as f32 * scale).round() as u32).clamp(1, size);
    let height = ((icon_height as f32 * scale).round() as u32).clamp(1, size);

    let x = i64::from((size - width) / 2);
    let y = i64::from((size - height) / 2);

    if (width, height) == (icon_width, icon_height) {
        imageops::overlay(&mut canvas, icon, x, y);
    } else {
        let resized = imageops::resize(icon, width, height, imageops::FilterType::Triangle);
        imageops::overlay(&mut canvas, &resized, x, y);
    }

    canvas
}
