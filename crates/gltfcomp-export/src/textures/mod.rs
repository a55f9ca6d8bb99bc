//! Texture resolution and encoding
//!
//! [`TextureResolver`] turns a material's image inputs into texture records
//! (file references or decoded 8-bit rasters). [`TextureEncoder`] writes those
//! records out as PNG or JPEG for the glTF backend.

mod encode;
mod resolver;

pub use encode::{ImageFormat, TextureEncoder};
pub use resolver::{decode_packed, normalize_path, TextureResolver};

use thiserror::Error;

/// Texture encoding errors
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Unsupported channel count: {0}")]
    UnsupportedChannels(u8),
}

pub type TextureResult<T> = Result<T, TextureError>;
