//! gltfcomp Core Library
//!
//! This crate provides the export data model, the compression settings and
//! the backend contract shared by all gltfcomp components.

pub mod backend;
pub mod error;
pub mod material;
pub mod mesh;
pub mod options;
pub mod package;
pub mod texture;
pub mod types;

pub use backend::{BackendReport, CompressionBackend};
pub use error::{Error, Result, ResultExt};
pub use material::{MaterialRecord, DEFAULT_METALLIC, DEFAULT_ROUGHNESS};
pub use mesh::{IndexedMesh, LoopAttribute, MeshVertex};
pub use options::CompressionOptions;
pub use package::{MeshExportRecord, SceneExportPackage};
pub use texture::{PackedRaster, TextureRecord};
pub use types::{BoundingBox, Vec3};

