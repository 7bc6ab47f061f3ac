//! # Image Processing and Steganography
//!
//! Hides opaque payloads (CSV exports, JSON templates) inside PNG images and
//! reads them back. The codec is stateless: every call gets its carrier and
//! payload explicitly.
//!
//! - [`format`]: container layouts and capacity arithmetic
//! - [`steganography`]: pixel-level `encode` / `decode`
//! - [`carrier`]: image loading, PNG output, export canvas
//! - [`capacity`]: capacity reports
//! - [`pipeline`]: bytes-in / bytes-out helpers

pub mod capacity;
pub mod carrier;
pub mod error;
pub mod format;
pub mod pipeline;
pub mod steganography;

// Re-export main types and functions for convenience
pub use capacity::CapacityReport;
pub use carrier::{compose_canvas, load_carrier, open_carrier, save_png, to_data_url, to_png_bytes, CanvasConfig};
pub use error::StegoError;
pub use format::{ContainerFormat, FormatVariant, DEFAULT_MAGIC};
pub use pipeline::{embed_in_canvas, embed_payload_bytes, extract_payload_bytes};
pub use steganography::{decode, embed, encode, RasterImage};
