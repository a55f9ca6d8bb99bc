//! Texture records: file references or decoded 8-bit rasters

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One texture referenced by an exported material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextureRecord {
    /// Image backed by a file on disk; pixels are read by the backend
    FileRef {
        /// Absolute, normalized path
        path: PathBuf,
        /// Logical image name
        name: String,
    },
    /// Image embedded in the scene, decoded to 8 bits per channel
    PackedRaster(PackedRaster),
}

impl TextureRecord {
    /// Logical image name
    pub fn name(&self) -> &str {
        match self {
            TextureRecord::FileRef { name, .. } => name,
            TextureRecord::PackedRaster(raster) => &raster.name,
        }
    }

    pub fn is_packed(&self) -> bool {
        matches!(self, TextureRecord::PackedRaster(_))
    }
}

/// Row-major (height, width, channels) 8-bit raster
///
/// Fields are private so that `data.len() == width * height * channels`
/// holds for every value of this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackedRaster {
    name: String,
    width: u32,
    height: u32,
    channels: u8,
    data: Vec<u8>,
}

impl PackedRaster {
    /// Build a raster, checking the channel count and buffer length
    pub fn new(name: impl Into<String>, width: u32, height: u32, channels: u8, data: Vec<u8>) -> Result<Self> {
        let name = name.into();

        if !(1..=4).contains(&channels) {
            return Err(Error::malformed_image(
                name,
                format!("channel count {} outside 1..=4", channels),
            ));
        }

        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(Error::malformed_image(
                name,
                format!(
                    "expected {} bytes for {}x{}x{}, got {}",
                    expected, width, height, channels, data.len()
                ),
            ));
        }

        Ok(Self { name, width, height, channels, data })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}
