//! Attribute deduplication
//!
//! Collapses identical corner tuples into a single vertex and builds the
//! index buffer. Floats are compared by bit pattern, so `-0.0` and `0.0`
//! stay distinct and NaN payloads only merge with themselves.

use crate::geometry::NormalizedGeometry;
use gltfcomp_core::{IndexedMesh, LoopAttribute, MeshVertex};
use std::collections::HashMap;

/// Hashable identity of a corner tuple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct VertexKey {
    position_index: u32,
    normal: [u32; 3],
    uv: Option<[u32; 2]>,
}

impl From<&LoopAttribute> for VertexKey {
    fn from(corner: &LoopAttribute) -> Self {
        Self {
            position_index: corner.position_index,
            normal: corner.normal.map(f32::to_bits),
            uv: corner.uv.map(|uv| uv.map(f32::to_bits)),
        }
    }
}

/// Build an indexed mesh from triangle-ordered corners
///
/// Vertices appear in first-seen order and the index buffer follows corner
/// order one-to-one, so triangle order and winding are preserved. Degenerate
/// triangles are kept.
pub fn deduplicate(geometry: &NormalizedGeometry<'_>) -> IndexedMesh {
    build(geometry.corners.iter().map(|corner| MeshVertex {
        position_index: corner.position_index,
        position: geometry.positions[corner.position_index as usize],
        normal: corner.normal,
        uv: corner.uv,
    }))
}

/// Re-run deduplication over an already indexed mesh
///
/// On deduplicator output this returns an identical mesh. Every index of
/// `mesh` must be in range (see [`IndexedMesh::validate`]).
pub fn reindex(mesh: &IndexedMesh) -> IndexedMesh {
    build(mesh.indices.iter().map(|&i| mesh.vertices[i as usize]))
}

fn build<I>(corners: I) -> IndexedMesh
where
    I: ExactSizeIterator<Item = MeshVertex>,
{
    let mut seen: HashMap<VertexKey, u32> = HashMap::with_capacity(corners.len());
    let mut vertices = Vec::new();
    let mut indices = Vec::with_capacity(corners.len());

    for vertex in corners {
        let index = *seen.entry(VertexKey::from(&vertex.to_loop())).or_insert_with(|| {
            vertices.push(vertex);
            (vertices.len() - 1) as u32
        });
        indices.push(index);
    }

    IndexedMesh { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POSITIONS: [[f32; 3]; 4] = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
    ];

    fn corner(position_index: u32, normal: [f32; 3], uv: Option<[f32; 2]>) -> LoopAttribute {
        LoopAttribute { position_index, normal, uv }
    }

    fn geometry(corners: Vec<LoopAttribute>) -> NormalizedGeometry<'static> {
        NormalizedGeometry {
            positions: &POSITIONS,
            corners,
        }
    }

    #[test]
    fn test_shared_corners_merge() {
        let up = [0.0, 0.0, 1.0];
        let mesh = deduplicate(&geometry(vec![
            corner(0, up, None),
            corner(1, up, None),
            corner(2, up, None),
            corner(0, up, None),
            corner(2, up, None),
            corner(3, up, None),
        ]));

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.vertices[2].position, [1.0, 1.0, 0.0]);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_differing_normal_splits_vertex() {
        let mesh = deduplicate(&geometry(vec![
            corner(0, [0.0, 0.0, 1.0], None),
            corner(1, [0.0, 0.0, 1.0], None),
            corner(2, [0.0, 0.0, 1.0], None),
            corner(0, [1.0, 0.0, 0.0], None),
            corner(2, [1.0, 0.0, 0.0], None),
            corner(3, [1.0, 0.0, 0.0], None),
        ]));
        assert_eq!(mesh.vertex_count(), 6);
    }

    #[test]
    fn test_differing_uv_splits_vertex() {
        let up = [0.0, 0.0, 1.0];
        let mesh = deduplicate(&geometry(vec![
            corner(0, up, Some([0.0, 0.0])),
            corner(1, up, Some([1.0, 0.0])),
            corner(2, up, Some([1.0, 1.0])),
            corner(0, up, Some([0.5, 0.0])),
            corner(2, up, Some([1.0, 1.0])),
            corner(3, up, Some([0.0, 1.0])),
        ]));
        assert_eq!(mesh.vertex_count(), 5);
        assert_eq!(mesh.indices, vec![0, 1, 2, 3, 2, 4]);
        assert!(mesh.has_uvs());
    }

    #[test]
    fn test_signed_zero_is_distinct() {
        let mesh = deduplicate(&geometry(vec![
            corner(0, [0.0, 0.0, 1.0], None),
            corner(0, [-0.0, 0.0, 1.0], None),
            corner(0, [0.0, 0.0, 1.0], None),
        ]));
        assert_eq!(mesh.vertex_count(), 2);
        assert_eq!(mesh.indices, vec![0, 1, 0]);
    }

    #[test]
    fn test_degenerate_triangle_preserved() {
        let up = [0.0, 0.0, 1.0];
        let mesh = deduplicate(&geometry(vec![
            corner(1, up, None),
            corner(1, up, None),
            corner(1, up, None),
        ]));
        assert_eq!(mesh.vertex_count(), 1);
        assert_eq!(mesh.indices, vec![0, 0, 0]);
    }

    #[test]
    fn test_empty_geometry() {
        let mesh = deduplicate(&geometry(Vec::new()));
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
    }

    #[test]
    fn test_reindex_is_identity() {
        let up = [0.0, 0.0, 1.0];
        let mesh = deduplicate(&geometry(vec![
            corner(3, up, Some([0.0, 1.0])),
            corner(0, up, Some([0.0, 0.0])),
            corner(1, up, Some([1.0, 0.0])),
            corner(1, up, Some([1.0, 0.0])),
            corner(2, up, Some([1.0, 1.0])),
            corner(3, up, Some([0.0, 1.0])),
        ]));
        assert_eq!(reindex(&mesh), mesh);
    }

    #[test]
    fn test_reindex_merges_duplicates() {
        let v = MeshVertex {
            position_index: 0,
            position: [0.0, 0.0, 0.0],
            normal: [0.0, 0.0, 1.0],
            uv: None,
        };
        let redundant = IndexedMesh {
            vertices: vec![v, v],
            indices: vec![0, 1, 1],
        };
        let mesh = reindex(&redundant);
        assert_eq!(mesh.vertex_count(), 1);
        assert_eq!(mesh.indices, vec![0, 0, 0]);
    }
}
