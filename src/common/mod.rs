//! # Common Components
//!
//! Shared utilities used by the library, the command-line tool and the web server.
//!
//! ## Modules
//!
//! - [`config`]: Configuration parsing utilities
//! - [`export`]: Export envelope and comparison CSV for hidden payloads
//! - [`logging`]: Logger setup for the binaries

pub mod config;
pub mod export;
pub mod logging;
