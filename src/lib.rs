//! # stego-container
//!
//! Hides contract and template exports (CSV, JSON) inside PNG images and
//! recovers them exactly.
//!
//! ```ignore
//! use stego_container::{decode, encode, ContainerFormat, RasterImage};
//!
//! let carrier = RasterImage::new(50, 50);
//! let stego = encode(carrier, b"OK", &ContainerFormat::RgbLsb)?;
//! assert_eq!(decode(&stego, &ContainerFormat::RgbLsb)?, b"OK");
//! ```

pub mod common;
pub mod processing;

pub use processing::{decode, encode, ContainerFormat, RasterImage, StegoError};
