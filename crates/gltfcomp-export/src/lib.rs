//! gltfcomp Export Pipeline
//!
//! Extracts scene objects into a compression-ready package and hands it to a
//! compression backend:
//! - geometry: triangulation and split normals
//! - dedup: corner deduplication into indexed meshes
//! - materials / textures: PBR descriptors and their image inputs
//! - orchestrator: per-object pipeline and the single backend call
//! - gltf: reference glTF 2.0 backend (JSON + BIN, GLB, ZIP)

pub mod dedup;
pub mod geometry;
pub mod gltf;
pub mod logging;
pub mod materials;
pub mod orchestrator;
pub mod scene;
pub mod textures;

pub use dedup::{deduplicate, reindex};
pub use geometry::{GeometryNormalizer, NormalizeOptions, NormalizedGeometry};
pub use gltf::{GltfBackend, GltfOptions};
pub use materials::{CollectedMaterial, MaterialCollector};
pub use orchestrator::{ExportOrchestrator, ExportRequest, ExportSummary, PackageStats};
pub use scene::{InMemoryScene, SceneError, SceneSource};
pub use textures::{ImageFormat, TextureEncoder, TextureResolver};
