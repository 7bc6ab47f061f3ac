//! # Container Formats
//!
//! The two layouts a payload can be hidden with, and the capacity arithmetic
//! shared by the encoder and decoder.
//!
//! ## RGB LSB (`rgb_lsb`)
//! - Pixels 0..32: red-channel LSB holds the payload length **in bits**,
//!   32-bit big-endian. The green channel is darkened by one as a visual
//!   marker (not read back).
//! - Pixels 32..: payload bits, MSB first, one bit in each of the R, G and B
//!   LSBs. Alpha is never touched.
//!
//! ## Alpha magic (`alpha_magic`)
//! - Pixels 0..8: the 8-byte magic, one full byte per alpha channel.
//! - Pixels 8..12: payload length **in bytes**, 32-bit little-endian.
//! - Pixels 12..: one payload byte per alpha channel. R, G and B are never touched.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length of the alpha-magic identification string.
pub const MAGIC_LEN: usize = 8;

/// Magic used by contract and template exports.
pub const DEFAULT_MAGIC: [u8; MAGIC_LEN] = *b"CONTPICK";

/// Header size of the RGB LSB layout (one length bit per pixel).
pub const RGB_LSB_HEADER_PIXELS: usize = 32;

/// Header size of the alpha-magic layout (magic + 4 length bytes).
pub const ALPHA_MAGIC_HEADER_PIXELS: usize = MAGIC_LEN + 4;

/// How a payload is laid out inside the carrier's pixels.
///
/// Always chosen explicitly by the caller; a decoder never guesses the format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    /// One bit in each RGB channel LSB, bit-count header in red LSBs.
    RgbLsb,
    /// One byte per alpha channel, tagged with a magic string.
    AlphaMagic { magic: [u8; MAGIC_LEN] },
}

impl ContainerFormat {
    /// Alpha-magic layout tagged with [`DEFAULT_MAGIC`].
    pub fn alpha_magic() -> Self {
        Self::AlphaMagic {
            magic: DEFAULT_MAGIC,
        }
    }

    /// Pixels consumed by the header before the first payload bit.
    pub fn header_pixels(&self) -> usize {
        match self {
            Self::RgbLsb => RGB_LSB_HEADER_PIXELS,
            Self::AlphaMagic { .. } => ALPHA_MAGIC_HEADER_PIXELS,
        }
    }

    /// Payload bits stored in each pixel after the header.
    pub fn bits_per_pixel(&self) -> usize {
        match self {
            Self::RgbLsb => 3,
            Self::AlphaMagic { .. } => 8,
        }
    }

    /// Largest payload the 32-bit length field can describe.
    pub fn max_payload_len(&self) -> usize {
        match self {
            Self::RgbLsb => u32::MAX as usize / 8,
            Self::AlphaMagic { .. } => u32::MAX as usize,
        }
    }

    /// Pixels a carrier needs to hold `payload_len` bytes, header included.
    ///
    /// Returns `None` when the length cannot be represented in the header.
    pub fn required_pixels(&self, payload_len: usize) -> Option<usize> {
        if payload_len > self.max_payload_len() {
            return None;
        }
        let bits = payload_len.checked_mul(8)?;
        let body = bits.div_ceil(self.bits_per_pixel());
        self.header_pixels().checked_add(body)
    }

    /// Maximum payload bytes a carrier of `pixel_count` pixels can hold.
    ///
    /// Returns `None` when not even the header fits.
    pub fn capacity(&self, pixel_count: usize) -> Option<usize> {
        let body = pixel_count.checked_sub(self.header_pixels())?;
        let bytes = body.saturating_mul(self.bits_per_pixel()) / 8;
        Some(bytes.min(self.max_payload_len()))
    }
}

impl Default for ContainerFormat {
    fn default() -> Self {
        Self::alpha_magic()
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RgbLsb => write!(f, "rgb_lsb"),
            Self::AlphaMagic { magic } => {
                write!(f, "alpha_magic({})", String::from_utf8_lossy(magic))
            }
        }
    }
}

/// Format selector without parameters, as written in config files and on
/// the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatVariant {
    RgbLsb,
    #[default]
    AlphaMagic,
}

impl FormatVariant {
    /// Build the full format; `magic` is only used by the alpha layout.
    pub fn with_magic(self, magic: [u8; MAGIC_LEN]) -> ContainerFormat {
        match self {
            Self::RgbLsb => ContainerFormat::RgbLsb,
            Self::AlphaMagic => ContainerFormat::AlphaMagic { magic },
        }
    }
}

impl FromStr for FormatVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "rgb_lsb" | "rgb" => Ok(Self::RgbLsb),
            "alpha_magic" | "alpha" => Ok(Self::AlphaMagic),
            other => Err(format!(
                "unknown container format '{other}' (expected rgb_lsb or alpha_magic)"
            )),
        }
    }
}

/// Parse a magic string; it must be exactly [`MAGIC_LEN`] ASCII bytes.
pub fn magic_from_str(text: &str) -> Result<[u8; MAGIC_LEN], String> {
    if !text.is_ascii() {
        return Err(format!("magic '{text}' must be ASCII"));
    }
    text.as_bytes()
        .try_into()
        .map_err(|_| format!("magic '{text}' must be exactly {MAGIC_LEN} bytes long"))
}
