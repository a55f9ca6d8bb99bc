//! PNG / JPEG encoding of texture records

use crate::textures::{TextureError, TextureResult};
use gltfcomp_core::{PackedRaster, TextureRecord};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GrayAlphaImage, GrayImage, RgbImage, RgbaImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Output image format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG format (lossless, keeps alpha)
    Png,
    /// JPEG format (lossy, alpha dropped)
    Jpeg { quality: u8 },
}

impl ImageFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg { .. } => "jpg",
        }
    }

    /// MIME type declared in the glTF image entry
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg { .. } => "image/jpeg",
        }
    }
}

/// Writes texture records to image files
#[derive(Debug, Clone, Copy)]
pub struct TextureEncoder {
    format: ImageFormat,
}

impl TextureEncoder {
    pub fn new(format: ImageFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Encode one record to `output_path`
    ///
    /// File references are decoded from disk first.
    pub fn encode(&self, record: &TextureRecord, output_path: &Path) -> TextureResult<()> {
        let img = match record {
            TextureRecord::FileRef { path, .. } => image::open(path)?,
            TextureRecord::PackedRaster(raster) => raster_to_image(raster)?,
        };
        self.write_image(img, output_path)
    }

    /// Write image to file
    fn write_image(&self, img: DynamicImage, output_path: &Path) -> TextureResult<()> {
        match self.format {
            ImageFormat::Png => {
                img.save_with_format(output_path, image::ImageFormat::Png)?;
            }
            ImageFormat::Jpeg { quality } => {
                // JPEG has no alpha channel
                let img = if img.color().has_color() {
                    DynamicImage::ImageRgb8(img.to_rgb8())
                } else {
                    DynamicImage::ImageLuma8(img.to_luma8())
                };
                let writer = BufWriter::new(File::create(output_path)?);
                img.write_with_encoder(JpegEncoder::new_with_quality(writer, quality))?;
            }
        }
        Ok(())
    }
}

/// Wrap an 8-bit raster in the matching image buffer type
pub fn raster_to_image(raster: &PackedRaster) -> TextureResult<DynamicImage> {
    let (width, height) = (raster.width(), raster.height());
    let data = raster.data().to_vec();
    let invalid = || TextureError::InvalidDimensions { width, height };

    let img = match raster.channels() {
        1 => DynamicImage::ImageLuma8(GrayImage::from_raw(width, height, data).ok_or_else(invalid)?),
        2 => DynamicImage::ImageLumaA8(GrayAlphaImage::from_raw(width, height, data).ok_or_else(invalid)?),
        3 => DynamicImage::ImageRgb8(RgbImage::from_raw(width, height, data).ok_or_else(invalid)?),
        4 => DynamicImage::ImageRgba8(RgbaImage::from_raw(width, height, data).ok_or_else(invalid)?),
        other => return Err(TextureError::UnsupportedChannels(other)),
    };
    Ok(img)
}
