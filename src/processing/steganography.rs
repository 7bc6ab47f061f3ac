//! # LSB Container Codec
//!
//! Hides an opaque byte payload inside the pixels of an RGBA raster and
//! recovers it byte for byte.
//!
//! ## Encoding Process
//! 1. Check that header and payload fit in the carrier; nothing is written otherwise
//! 2. Write the format header into the first pixels
//! 3. Write the payload into the following pixels, in row-major order
//!
//! ## Decoding Process
//! 1. Read and validate the header
//! 2. Check the declared length against what the image can hold
//! 3. Read exactly that many bytes back
//!
//! See [`ContainerFormat`] for the per-layout bit placement. The image must
//! stay lossless between encode and decode (PNG); any lossy re-encoding
//! destroys the payload.

use image::RgbaImage;
use log::{debug, warn};

use super::error::{Result, StegoError};
use super::format::{ContainerFormat, MAGIC_LEN, RGB_LSB_HEADER_PIXELS};

/// Straight (non-premultiplied) RGBA8 pixel buffer.
pub type RasterImage = RgbaImage;

/// Number of pixels in an image.
pub fn pixel_count(image: &RasterImage) -> usize {
    image.width() as usize * image.height() as usize
}

/// Hide `payload` in `carrier` and return the stego image.
///
/// # Errors
/// - [`StegoError::CapacityExceeded`] if header plus payload do not fit.
///   The carrier is left untouched in that case.
pub fn encode(
    mut carrier: RasterImage,
    payload: &[u8],
    format: &ContainerFormat,
) -> Result<RasterImage> {
    embed(&mut carrier, payload, format)?;
    Ok(carrier)
}

/// In-place variant of [`encode`].
pub fn embed(carrier: &mut RasterImage, payload: &[u8], format: &ContainerFormat) -> Result<()> {
    let available_pixels = pixel_count(carrier);
    let needed_pixels = format
        .required_pixels(payload.len())
        .unwrap_or(usize::MAX);

    if needed_pixels > available_pixels {
        return Err(StegoError::CapacityExceeded {
            needed_pixels,
            available_pixels,
        });
    }

    debug!(
        "Embedding {} bytes as {} into {}x{} carrier ({} of {} pixels)",
        payload.len(),
        format,
        carrier.width(),
        carrier.height(),
        needed_pixels,
        available_pixels
    );

    match format {
        ContainerFormat::RgbLsb => embed_rgb_lsb(carrier, payload),
        ContainerFormat::AlphaMagic { magic } => embed_alpha_magic(carrier, payload, magic),
    }

    Ok(())
}

/// Recover the payload hidden in `image` with `format`.
///
/// Never mutates the image, so decoding the same image twice yields the
/// same bytes.
///
/// # Errors
/// - [`StegoError::FormatMismatch`] if the header is missing or invalid
/// - [`StegoError::TruncatedPayload`] if the declared length runs past the image
pub fn decode(image: &RasterImage, format: &ContainerFormat) -> Result<Vec<u8>> {
    let result = match format {
        ContainerFormat::RgbLsb => extract_rgb_lsb(image, format),
        ContainerFormat::AlphaMagic { magic } => extract_alpha_magic(image, format, magic),
    };

    match &result {
        Ok(payload) => debug!("Extracted {} bytes as {}", payload.len(), format),
        Err(e) => warn!("Decoding {} failed: {}", format, e),
    }

    result
}

/// Split bytes into bits, most significant bit first.
fn payload_bits(payload: &[u8]) -> impl Iterator<Item = u8> + '_ {
    payload
        .iter()
        .flat_map(|&byte| (0..8).rev().map(move |shift| (byte >> shift) & 1))
}

fn embed_rgb_lsb(carrier: &mut RasterImage, payload: &[u8]) {
    // required_pixels() bounds payload.len() * 8 to u32
    let bit_count = (payload.len() * 8) as u32;
    let mut pixels = carrier.pixels_mut();

    for (i, pixel) in pixels.by_ref().take(RGB_LSB_HEADER_PIXELS).enumerate() {
        let bit = ((bit_count >> (31 - i)) & 1) as u8;
        pixel.0[0] = (pixel.0[0] & 0xFE) | bit;
        // Header marker, ignored by the decoder
        pixel.0[1] = pixel.0[1].saturating_sub(1);
    }

    let mut bits = payload_bits(payload);

    'outer: for pixel in pixels {
        // Alpha (channel 3) is left as is
        for channel in 0..3 {
            match bits.next() {
                Some(bit) => pixel.0[channel] = (pixel.0[channel] & 0xFE) | bit,
                None => break 'outer,
            }
        }
    }
}

fn extract_rgb_lsb(image: &RasterImage, format: &ContainerFormat) -> Result<Vec<u8>> {
    let total = pixel_count(image);
    if total < RGB_LSB_HEADER_PIXELS {
        return Err(StegoError::FormatMismatch(format!(
            "image has {total} pixels, fewer than the {RGB_LSB_HEADER_PIXELS}-pixel header"
        )));
    }

    let mut pixels = image.pixels();
    let bit_count = pixels
        .by_ref()
        .take(RGB_LSB_HEADER_PIXELS)
        .fold(0u32, |acc, pixel| (acc << 1) | u32::from(pixel.0[0] & 1)) as usize;

    if bit_count % 8 != 0 {
        return Err(StegoError::FormatMismatch(format!(
            "declared bit count {bit_count} is not a whole number of bytes"
        )));
    }

    let declared = bit_count / 8;
    let available = format.capacity(total).unwrap_or(0);
    if declared > available {
        return Err(StegoError::TruncatedPayload {
            declared,
            available,
        });
    }

    let mut payload = Vec::with_capacity(declared);
    let mut current = 0u8;
    let mut filled = 0;

    let bits = pixels
        .flat_map(|pixel| [pixel.0[0] & 1, pixel.0[1] & 1, pixel.0[2] & 1])
        .take(bit_count);

    for bit in bits {
        current = (current << 1) | bit;
        filled += 1;
        if filled == 8 {
            payload.push(current);
            current = 0;
            filled = 0;
        }
    }

    Ok(payload)
}

fn embed_alpha_magic(carrier: &mut RasterImage, payload: &[u8], magic: &[u8; MAGIC_LEN]) {
    // required_pixels() bounds payload.len() to u32
    let length = (payload.len() as u32).to_le_bytes();
    let bytes = magic.iter().chain(length.iter()).chain(payload.iter());

    for (pixel, &byte) in carrier.pixels_mut().zip(bytes) {
        pixel.0[3] = byte;
    }
}

fn extract_alpha_magic(
    image: &RasterImage,
    format: &ContainerFormat,
    magic: &[u8; MAGIC_LEN],
) -> Result<Vec<u8>> {
    let total = pixel_count(image);
    let header = format.header_pixels();
    if total < header {
        return Err(StegoError::FormatMismatch(format!(
            "image has {total} pixels, fewer than the {header}-pixel header"
        )));
    }

    let mut alpha = image.pixels().map(|pixel| pixel.0[3]);

    let found: Vec<u8> = alpha.by_ref().take(MAGIC_LEN).collect();
    if found[..] != magic[..] {
        return Err(StegoError::FormatMismatch(format!(
            "expected magic '{}', found {:02x?}",
            String::from_utf8_lossy(magic),
            found
        )));
    }

    let mut length = [0u8; 4];
    for (slot, byte) in length.iter_mut().zip(alpha.by_ref()) {
        *slot = byte;
    }

    let declared = u32::from_le_bytes(length) as usize;
    let available = format.capacity(total).unwrap_or(0);
    if declared > available {
        return Err(StegoError::TruncatedPayload {
            declared,
            available,
        });
    }

    Ok(alpha.take(declared).collect())
}
