//! # Byte-Level Pipeline
//!
//! Convenience wrappers that go straight from image file bytes to PNG bytes,
//! for callers that never need to touch the pixel buffer.

use log::info;

use super::carrier::{compose_canvas, load_carrier, to_png_bytes, CanvasConfig};
use super::error::Result;
use super::format::ContainerFormat;
use super::steganography::{decode, encode, RasterImage};

/// Hide `payload` in an image given as encoded bytes (any readable format).
///
/// # Returns
/// - `Ok(Vec<u8>)`: PNG bytes of the stego image
///
/// # Errors
/// - [`StegoError::CarrierLoad`](super::StegoError::CarrierLoad) if the image cannot be decoded
/// - [`StegoError::CapacityExceeded`](super::StegoError::CapacityExceeded) if the payload does not fit
///
/// # Example
/// ```ignore
/// let photo = std::fs::read("carrier.jpg")?;
/// let png = embed_payload_bytes(&photo, b"Nom;Cout\n", &ContainerFormat::RgbLsb)?;
/// std::fs::write("export.png", png)?;
/// ```
pub fn embed_payload_bytes(
    image_bytes: &[u8],
    payload: &[u8],
    format: &ContainerFormat,
) -> Result<Vec<u8>> {
    let carrier = load_carrier(image_bytes)?;
    let stego = encode(carrier, payload, format)?;
    let png = to_png_bytes(&stego)?;

    info!(
        "Hid {} bytes in {}x{} image ({})",
        payload.len(),
        stego.width(),
        stego.height(),
        format
    );
    Ok(png)
}

/// Recover the payload from encoded image bytes.
pub fn extract_payload_bytes(image_bytes: &[u8], format: &ContainerFormat) -> Result<Vec<u8>> {
    let image = load_carrier(image_bytes)?;
    let payload = decode(&image, format)?;

    info!("Recovered {} bytes ({})", payload.len(), format);
    Ok(payload)
}

/// Draw the optional icon on a fresh canvas, then hide `payload` in it.
pub fn embed_in_canvas(
    icon: Option<&RasterImage>,
    payload: &[u8],
    format: &ContainerFormat,
    canvas: &CanvasConfig,
) -> Result<RasterImage> {
    encode(compose_canvas(icon, canvas), payload, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::StegoError;
    use image::Rgba;

    #[test]
    fn test_bytes_round_trip() {
        let carrier = RasterImage::from_pixel(64, 64, Rgba([12, 34, 56, 255]));
        let carrier_png = to_png_bytes(&carrier).unwrap();
        let payload = b"Nom de l'offre;Cout Total\nCopieur A;1200\n";

        for format in [ContainerFormat::RgbLsb, ContainerFormat::alpha_magic()] {
            let stego_png = embed_payload_bytes(&carrier_png, payload, &format).unwrap();
            assert_eq!(extract_payload_bytes(&stego_png, &format).unwrap(), payload);
        }
    }

    #[test]
    fn test_invalid_carrier_bytes() {
        let err = embed_payload_bytes(b"GIF89a?", b"x", &ContainerFormat::RgbLsb).unwrap_err();
        assert!(matches!(err, StegoError::CarrierLoad(_)));

        let err = extract_payload_bytes(&[], &ContainerFormat::alpha_magic()).unwrap_err();
        assert!(matches!(err, StegoError::CarrierLoad(_)));
    }

    #[test]
    fn test_canvas_export() {
        let icon = RasterImage::from_pixel(32, 32, Rgba([200, 0, 0, 255]));
        let canvas = CanvasConfig::default();
        let format = ContainerFormat::alpha_magic();

        let stego = embed_in_canvas(Some(&icon), br#"{"a":1}"#, &format, &canvas).unwrap();

        assert_eq!(stego.dimensions(), (300, 300));
        assert_eq!(decode(&stego, &format).unwrap(), br#"{"a":1}"#);
    }
}
