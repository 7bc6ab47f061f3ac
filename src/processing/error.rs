//! # Codec Errors
//!
//! Typed failures returned by the container codec. Callers decide how to
//! present them; nothing here is retried.

/// Errors that can occur while hiding or recovering a payload.
#[derive(Debug, thiserror::Error)]
pub enum StegoError {
    /// The payload (plus the format header) does not fit in the carrier.
    #[error("payload needs {needed_pixels} pixels but the carrier only has {available_pixels}")]
    CapacityExceeded {
        needed_pixels: usize,
        available_pixels: usize,
    },

    /// The carrier image could not be decoded.
    #[error("failed to load carrier image: {0}")]
    CarrierLoad(#[source] image::ImageError),

    /// The image does not carry a container of the requested format.
    #[error("not a valid container: {0}")]
    FormatMismatch(String),

    /// The declared payload length runs past the end of the image.
    #[error("declared payload of {declared} bytes exceeds the {available} bytes the image can hold")]
    TruncatedPayload { declared: usize, available: usize },

    /// Serializing the stego image to PNG failed.
    #[error("failed to write PNG: {0}")]
    ImageWrite(#[source] image::ImageError),
}

pub type Result<T> = std::result::Result<T, StegoError>;
