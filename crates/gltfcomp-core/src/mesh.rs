//! Per-corner attribute tuples and the indexed mesh built from them

use crate::types::BoundingBox;
use serde::{Deserialize, Serialize};

/// One triangle corner (loop) as produced by triangulation
///
/// The UV is `None` for every corner of a mesh without a UV channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoopAttribute {
    /// Index into the source mesh's position array
    pub position_index: u32,
    /// Split (per-corner) normal
    pub normal: [f32; 3],
    /// Texture coordinate from the active UV channel
    pub uv: Option<[f32; 2]>,
}

/// A deduplicated vertex of an [`IndexedMesh`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshVertex {
    /// Index of the source position this vertex was built from
    pub position_index: u32,
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: Option<[f32; 2]>,
}

impl MeshVertex {
    /// The corner tuple this vertex represents
    pub fn to_loop(&self) -> LoopAttribute {
        LoopAttribute {
            position_index: self.position_index,
            normal: self.normal,
            uv: self.uv,
        }
    }
}

/// Compact indexed triangle mesh
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexedMesh {
    /// Unique vertices in first-seen order
    pub vertices: Vec<MeshVertex>,
    /// Triangle list, three entries per triangle
    pub indices: Vec<u32>,
}

impl IndexedMesh {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Whether the mesh carries a UV attribute
    pub fn has_uvs(&self) -> bool {
        self.vertices.first().is_some_and(|v| v.uv.is_some())
    }

    /// Bounds of the referenced positions
    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.vertices.iter().map(|v| &v.position))
    }

    /// Check the structural invariants of an indexed mesh
    ///
    /// Returns a description of the first violation found.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.indices.len() % 3 != 0 {
            return Err(format!(
                "index count {} is not a multiple of 3",
                self.indices.len()
            ));
        }

        let vertex_count = self.vertices.len();
        if let Some((pos, index)) = self
            .indices
            .iter()
            .enumerate()
            .find(|(_, i)| **i as usize >= vertex_count)
        {
            return Err(format!(
                "index {} at position {} exceeds vertex count {}",
                index, pos, vertex_count
            ));
        }

        let has_uvs = self.has_uvs();
        if self.vertices.iter().any(|v| v.uv.is_some() != has_uvs) {
            return Err("UV attribute present on only some vertices".to_string());
        }

        Ok(())
    }
}
