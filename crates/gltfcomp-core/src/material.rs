//! Material descriptors handed to the compression backend

use serde::{Deserialize, Serialize};

/// Metallic factor used when a material has no metallic input
pub const DEFAULT_METALLIC: f32 = 0.0;
/// Roughness factor used when a material has no roughness input
pub const DEFAULT_ROUGHNESS: f32 = 0.5;

/// PBR metallic-roughness material of one mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRecord {
    /// Material name, unique within a mesh's material list
    pub name: String,
    /// Linear RGB base color, each channel in [0, 1]
    pub base_color: [f32; 3],
    /// Metallic factor in [0, 1]
    pub metallic: f32,
    /// Roughness factor in [0, 1]
    pub roughness: f32,
    /// Indices into [`SceneExportPackage::textures`](crate::SceneExportPackage),
    /// in the material's image input order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub textures: Vec<usize>,
}

impl MaterialRecord {
    /// Create a material record, clamping every factor into [0, 1]
    pub fn new(name: impl Into<String>, base_color: [f32; 3], metallic: f32, roughness: f32) -> Self {
        Self {
            name: name.into(),
            base_color: base_color.map(|c| c.clamp(0.0, 1.0)),
            metallic: metallic.clamp(0.0, 1.0),
            roughness: roughness.clamp(0.0, 1.0),
            textures: Vec::new(),
        }
    }

    /// Base color as a glTF RGBA factor (opaque)
    pub fn base_color_factor(&self) -> [f32; 4] {
        [self.base_color[0], self.base_color[1], self.base_color[2], 1.0]
    }
}
