//! # Configuration Utilities
//!
//! TOML configuration shared by the command-line tool and the web server.

use anyhow::{anyhow, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::processing::carrier::CanvasConfig;
use crate::processing::format::{magic_from_str, ContainerFormat, FormatVariant, DEFAULT_MAGIC};

/// Load a TOML configuration file and deserialize it into the specified type.
///
/// # Arguments
/// - `path`: Path to the TOML configuration file
///
/// # Returns
/// - `Ok(T)`: Successfully loaded and parsed configuration
/// - `Err`: File I/O or parsing error
///
/// # Example
/// ```ignore
/// let config: StegoConfig = load_config("config/stego.toml")?;
/// ```
pub fn load_config<T, P>(path: P) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let content = fs::read_to_string(path)?;
    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StegoConfig {
    pub format: FormatConfig,
    pub canvas: CanvasConfig,
    pub server: ServerConfig,
}

impl StegoConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        load_config(path)
    }

    /// Load `path` if given and present, otherwise fall back to defaults.
    ///
    /// A file that exists but fails to parse is still an error.
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) if Path::new(path).exists() => Self::from_file(path),
            Some(path) => {
                warn!("Config file {} not found, using defaults", path);
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }
}

/// Which container layout to use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    pub variant: FormatVariant,
    /// Exactly 8 ASCII characters; only checked when `alpha_magic` is used.
    pub magic: String,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            variant: FormatVariant::default(),
            magic: String::from_utf8_lossy(&DEFAULT_MAGIC).into_owned(),
        }
    }
}

impl FormatConfig {
    /// The configured format.
    pub fn to_format(&self) -> Result<ContainerFormat> {
        self.resolve(None)
    }

    /// Format for a request that may pick another layout than the configured
    /// one. The configured magic is used whenever the result is `alpha_magic`.
    pub fn resolve(&self, requested: Option<FormatVariant>) -> Result<ContainerFormat> {
        match requested.unwrap_or(self.variant) {
            FormatVariant::RgbLsb => Ok(ContainerFormat::RgbLsb),
            FormatVariant::AlphaMagic => {
                let magic = magic_from_str(&self.magic).map_err(|e| anyhow!(e))?;
                Ok(ContainerFormat::AlphaMagic { magic })
            }
        }
    }
}

/// HTTP surface settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address (e.g., "127.0.0.1:3000")
    pub address: String,
    /// Upper bound on a multipart request body
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:3000".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}
