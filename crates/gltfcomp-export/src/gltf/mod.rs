//! glTF 2.0 backend
//!
//! Writes a [`SceneExportPackage`](gltfcomp_core::SceneExportPackage) as
//! glTF 2.0 (JSON + BIN, or GLB), with textures re-encoded next to it.

mod archive;
mod exporter;

pub use archive::{bundle, ArchiveError, ZipWriter};
pub use exporter::{GltfBackend, GltfError, GltfOptions, GltfResult};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// glTF 2.0 root structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gltf {
    pub asset: Asset,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub scenes: Vec<Scene>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub nodes: Vec<Node>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub meshes: Vec<Mesh>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub materials: Vec<Material>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub textures: Vec<Texture>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub images: Vec<Image>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub samplers: Vec<Sampler>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub accessors: Vec<Accessor>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub buffer_views: Vec<BufferView>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub buffers: Vec<Buffer>,
}

/// glTF asset metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
}

/// glTF scene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub nodes: Vec<usize>,
}

/// glTF node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh: Option<usize>,
}

/// glTF mesh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mesh {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub primitives: Vec<Primitive>,
}

/// glTF mesh primitive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Primitive {
    pub attributes: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indices: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<u32>,
}

/// glTF material
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "pbrMetallicRoughness")]
    pub pbr_metallic_roughness: Option<PbrMetallicRoughness>,
}

/// PBR metallic roughness material
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PbrMetallicRoughness {
    #[serde(skip_serializing_if = "Option::is_none", rename = "baseColorFactor")]
    pub base_color_factor: Option<[f32; 4]>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "baseColorTexture")]
    pub base_color_texture: Option<TextureInfo>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "metallicFactor")]
    pub metallic_factor: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "roughnessFactor")]
    pub roughness_factor: Option<f32>,
}

/// Reference from a material to a texture
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TextureInfo {
    pub index: usize,
}

/// glTF texture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Texture {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampler: Option<usize>,
    pub source: usize,
}

/// glTF image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none", rename = "mimeType")]
    pub mime_type: Option<String>,
}

/// glTF texture sampler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sampler {
    #[serde(rename = "magFilter")]
    pub mag_filter: u32,
    #[serde(rename = "minFilter")]
    pub min_filter: u32,
    #[serde(rename = "wrapS")]
    pub wrap_s: u32,
    #[serde(rename = "wrapT")]
    pub wrap_t: u32,
}

impl Default for Sampler {
    fn default() -> Self {
        Self {
            mag_filter: FILTER_LINEAR,
            min_filter: FILTER_LINEAR_MIPMAP_LINEAR,
            wrap_s: WRAP_REPEAT,
            wrap_t: WRAP_REPEAT,
        }
    }
}

/// glTF accessor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Accessor {
    #[serde(skip_serializing_if = "Option::is_none", rename = "bufferView")]
    pub buffer_view: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "byteOffset")]
    pub byte_offset: Option<usize>,
    #[serde(rename = "componentType")]
    pub component_type: u32,
    pub count: usize,
    #[serde(rename = "type")]
    pub accessor_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<Vec<f32>>,
}

/// glTF buffer view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BufferView {
    pub buffer: usize,
    #[serde(skip_serializing_if = "Option::is_none", rename = "byteOffset")]
    pub byte_offset: Option<usize>,
    #[serde(rename = "byteLength")]
    pub byte_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<u32>,
}

/// glTF buffer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Buffer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(rename = "byteLength")]
    pub byte_length: usize,
}

// glTF component type constants
pub const COMPONENT_TYPE_UNSIGNED_INT: u32 = 5125;
pub const COMPONENT_TYPE_FLOAT: u32 = 5126;

// glTF buffer view target constants
pub const TARGET_ARRAY_BUFFER: u32 = 34962;
pub const TARGET_ELEMENT_ARRAY_BUFFER: u32 = 34963;

// glTF primitive mode constants
pub const MODE_TRIANGLES: u32 = 4;

// glTF sampler constants
pub const FILTER_LINEAR: u32 = 9729;
pub const FILTER_LINEAR_MIPMAP_LINEAR: u32 = 9987;
pub const WRAP_REPEAT: u32 = 10497;
