//! # Capacity Reports
//!
//! Summary of how much a carrier can hold under a format, printed by the
//! `capacity` command and returned by `/api/capacity`.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::format::ContainerFormat;
use super::steganography::RasterImage;

/// How much of a carrier a payload would use under a given format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityReport {
    pub format: String,
    pub width: u32,
    pub height: u32,
    pub pixel_count: usize,
    pub header_pixels: usize,
    /// Maximum payload bytes; 0 when not even the header fits.
    pub capacity_bytes: usize,
    pub header_fits: bool,

    // Filled in when a payload length was given
    pub payload_bytes: Option<usize>,
    pub required_pixels: Option<usize>,
    pub utilization_percent: Option<f64>,
}

impl CapacityReport {
    pub fn new(
        width: u32,
        height: u32,
        format: &ContainerFormat,
        payload_len: Option<usize>,
    ) -> Self {
        let pixels = width as usize * height as usize;
        let capacity = format.capacity(pixels);

        let mut report = Self {
            format: format.to_string(),
            width,
            height,
            pixel_count: pixels,
            header_pixels: format.header_pixels(),
            capacity_bytes: capacity.unwrap_or(0),
            header_fits: capacity.is_some(),
            payload_bytes: None,
            required_pixels: None,
            utilization_percent: None,
        };

        if let Some(len) = payload_len {
            report.payload_bytes = Some(len);
            report.required_pixels = format.required_pixels(len);
            if pixels > 0 {
                report.utilization_percent = report
                    .required_pixels
                    .map(|needed| needed as f64 / pixels as f64 * 100.0);
            }
        }

        report
    }

    pub fn for_image(
        image: &RasterImage,
        format: &ContainerFormat,
        payload_len: Option<usize>,
    ) -> Self {
        Self::new(image.width(), image.height(), format, payload_len)
    }

    /// Whether the payload (or an empty one if none was given) fits.
    pub fn fits(&self) -> bool {
        let needed = match self.payload_bytes {
            Some(_) => self.required_pixels,
            None => Some(self.header_pixels),
        };
        needed.is_some_and(|needed| needed <= self.pixel_count)
    }

    /// Write the report as pretty-printed JSON.
    pub fn export_to_json<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json_string = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json_string.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_for_rgb_lsb() {
        let report = CapacityReport::new(50, 50, &ContainerFormat::RgbLsb, Some(2));

        assert_eq!(report.pixel_count, 2500);
        assert_eq!(report.header_pixels, 32);
        assert_eq!(report.capacity_bytes, (2500 - 32) * 3 / 8);
        assert_eq!(report.required_pixels, Some(38));
        assert!(report.header_fits);
        assert!(report.fits());
        assert!((report.utilization_percent.unwrap() - 1.52).abs() < 1e-9);
    }

    #[test]
    fn test_report_without_payload() {
        let report = CapacityReport::new(300, 300, &ContainerFormat::alpha_magic(), None);

        assert_eq!(report.capacity_bytes, 90_000 - 12);
        assert_eq!(report.payload_bytes, None);
        assert_eq!(report.utilization_percent, None);
        assert!(report.fits());
    }

    #[test]
    fn test_report_when_header_does_not_fit() {
        let report = CapacityReport::new(5, 2, &ContainerFormat::RgbLsb, Some(1));

        assert!(!report.header_fits);
        assert_eq!(report.capacity_bytes, 0);
        assert!(!report.fits());
        assert!(!CapacityReport::new(5, 2, &ContainerFormat::RgbLsb, None).fits());
    }

    #[test]
    fn test_report_serializes_format_name() {
        let report = CapacityReport::new(10, 10, &ContainerFormat::alpha_magic(), Some(3));
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["format"], "alpha_magic(CONTPICK)");
        assert_eq!(json["required_pixels"], 15);
    }

    #[test]
    fn test_export_to_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = CapacityReport::new(50, 50, &ContainerFormat::RgbLsb, Some(100));

        report.export_to_json(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let restored: CapacityReport = serde_json::from_str(&written).unwrap();
        assert_eq!(restored, report);
    }
}
