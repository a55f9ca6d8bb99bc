//! User-facing compression settings

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Accepted Draco compression levels
pub const DRACO_LEVEL_RANGE: RangeInclusive<u8> = 1..=9;
/// Accepted JPEG quality values
pub const JPEG_QUALITY_RANGE: RangeInclusive<u8> = 1..=100;

/// Compression settings snapshot taken when an export starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionOptions {
    /// Enable Draco mesh compression
    pub draco_enabled: bool,
    /// Draco compression level (1-9)
    pub draco_level: u8,
    /// Re-encode textures as JPEG instead of PNG
    pub jpeg_enabled: bool,
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
    /// Bundle the output files into a ZIP archive
    pub zip_enabled: bool,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            draco_enabled: true,
            draco_level: 5,
            jpeg_enabled: true,
            jpeg_quality: 75,
            zip_enabled: false,
        }
    }
}

impl CompressionOptions {
    /// Reject values outside their documented ranges
    ///
    /// Levels are checked even when the corresponding stage is disabled.
    pub fn validate(&self) -> Result<()> {
        if !DRACO_LEVEL_RANGE.contains(&self.draco_level) {
            return Err(Error::InvalidOptions {
                field: "draco_level",
                value: self.draco_level as i64,
                expected: "1..=9",
            });
        }

        if !JPEG_QUALITY_RANGE.contains(&self.jpeg_quality) {
            return Err(Error::InvalidOptions {
                field: "jpeg_quality",
                value: self.jpeg_quality as i64,
                expected: "1..=100",
            });
        }

        Ok(())
    }

    /// Validate and return the options unchanged
    pub fn validated(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CompressionOptions::default();
        assert!(options.draco_enabled);
        assert_eq!(options.draco_level, 5);
        assert!(options.jpeg_enabled);
        assert_eq!(options.jpeg_quality, 75);
        assert!(!options.zip_enabled);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_draco_level_bounds() {
        for level in [1, 9] {
            let options = CompressionOptions { draco_level: level, ..Default::default() };
            assert!(options.validate().is_ok());
        }
        for level in [0, 10, 255] {
            let options = CompressionOptions { draco_level: level, ..Default::default() };
            let err = options.validate().unwrap_err();
            assert!(matches!(err, Error::InvalidOptions { field: "draco_level", .. }));
        }
    }

    #[test]
    fn test_jpeg_quality_bounds() {
        for quality in [1, 100] {
            let options = CompressionOptions { jpeg_quality: quality, ..Default::default() };
            assert!(options.validate().is_ok());
        }
        for quality in [0, 101] {
            let options = CompressionOptions { jpeg_quality: quality, ..Default::default() };
            let err = options.validate().unwrap_err();
            assert!(matches!(err, Error::InvalidOptions { field: "jpeg_quality", .. }));
        }
    }

    #[test]
    fn test_disabled_stage_still_checked() {
        let options = CompressionOptions {
            draco_enabled: false,
            draco_level: 0,
            ..Default::default()
        };
        assert!(options.validated().is_err());
    }
}
