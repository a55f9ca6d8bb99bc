//! The package handed to a compression backend once per export

use crate::material::MaterialRecord;
use crate::mesh::IndexedMesh;
use crate::texture::TextureRecord;
use serde::{Deserialize, Serialize};

/// Everything exported for one scene object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshExportRecord {
    /// Scene object name, unique per exported object
    pub object_name: String,
    /// Name of the object's mesh data
    pub local_name: String,
    pub mesh: IndexedMesh,
    /// Materials in slot order
    pub materials: Vec<MaterialRecord>,
}

/// Complete export payload for one invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneExportPackage {
    pub meshes: Vec<MeshExportRecord>,
    /// Textures of all meshes, flattened in mesh then material order
    pub textures: Vec<TextureRecord>,
}

impl SceneExportPackage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Append one object's record together with the textures its materials use
    ///
    /// `textures` are the object's own textures; material texture indices are
    /// relative to that slice and get rebased onto the package list here.
    pub fn push_object(&mut self, mut record: MeshExportRecord, textures: Vec<TextureRecord>) {
        let base = self.textures.len();
        for material in &mut record.materials {
            for index in &mut material.textures {
                *index += base;
            }
        }
        self.textures.extend(textures);
        self.meshes.push(record);
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.mesh.triangle_count()).sum()
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.mesh.vertex_count()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::PackedRaster;

    fn record(name: &str, texture_indices: Vec<usize>) -> MeshExportRecord {
        let mut material = MaterialRecord::new(format!("{}_mat", name), [1.0, 1.0, 1.0], 0.0, 0.5);
        material.textures = texture_indices;
        MeshExportRecord {
            object_name: name.to_string(),
            local_name: name.to_string(),
            mesh: IndexedMesh::default(),
            materials: vec![material],
        }
    }

    fn raster(name: &str) -> TextureRecord {
        TextureRecord::PackedRaster(PackedRaster::new(name, 1, 1, 1, vec![0]).unwrap())
    }

    #[test]
    fn test_push_object_rebases_texture_indices() {
        let mut package = SceneExportPackage::new();
        package.push_object(record("A", vec![0, 1]), vec![raster("a0"), raster("a1")]);
        package.push_object(record("B", vec![0]), vec![raster("b0")]);

        assert_eq!(package.meshes.len(), 2);
        assert_eq!(package.textures.len(), 3);
        assert_eq!(package.meshes[0].materials[0].textures, vec![0, 1]);
        assert_eq!(package.meshes[1].materials[0].textures, vec![2]);
        assert_eq!(package.textures[2].name(), "b0");
    }

    #[test]
    fn test_empty_package() {
        let package = SceneExportPackage::new();
        assert!(package.is_empty());
        assert_eq!(package.triangle_count(), 0);
        assert_eq!(package.vertex_count(), 0);
    }
}
