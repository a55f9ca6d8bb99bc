//! Geometry normalization
//!
//! Turns an evaluated polygon mesh into a triangle-only corner stream: every
//! polygon is triangulated, and every emitted corner carries its position
//! index, split normal and (when present) UV.

mod normals;
mod triangulate;

pub use normals::{newell_normal, split_normals};
pub use triangulate::triangulate;

use crate::scene::PolygonMesh;
use gltfcomp_core::{Error, LoopAttribute, Result, Vec3};
use tracing::trace;

/// Triangulated corner stream of one mesh
///
/// `corners` holds three entries per triangle, in emission order. Position
/// indices refer to `positions`, which is borrowed from the source mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedGeometry<'a> {
    pub positions: &'a [[f32; 3]],
    pub corners: Vec<LoopAttribute>,
}

impl<'a> NormalizedGeometry<'a> {
    pub fn empty(positions: &'a [[f32; 3]]) -> Self {
        Self {
            positions,
            corners: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.corners.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.corners.len() / 3
    }

    pub fn has_uvs(&self) -> bool {
        self.corners.first().is_some_and(|c| c.uv.is_some())
    }
}

/// Normalization settings
#[derive(Debug, Clone, Copy)]
pub struct NormalizeOptions {
    /// Use custom split normals when the mesh carries them
    pub use_custom_normals: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            use_custom_normals: true,
        }
    }
}

/// Produces triangulated, per-corner geometry from polygon meshes
#[derive(Debug, Clone, Default)]
pub struct GeometryNormalizer {
    options: NormalizeOptions,
}

impl GeometryNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: NormalizeOptions) -> Self {
        Self { options }
    }

    /// Normalize one object's mesh
    ///
    /// Fails with [`Error::MalformedMesh`] when a polygon has fewer than three
    /// corners, references a missing position, or a per-loop stream does not
    /// match the loop count. An empty mesh yields empty geometry.
    pub fn normalize<'a>(&self, object_name: &str, mesh: &'a PolygonMesh) -> Result<NormalizedGeometry<'a>> {
        if mesh.is_empty() {
            return Ok(NormalizedGeometry::empty(&mesh.positions));
        }

        validate(object_name, mesh)?;

        let face_normals: Vec<Vec3> = mesh
            .polygons
            .iter()
            .map(|p| newell_normal(&normals::corner_points(mesh, &p.vertices)))
            .collect();

        let loop_normals = match (&mesh.custom_normals, self.options.use_custom_normals) {
            (Some(custom), true) => custom.clone(),
            _ => split_normals(mesh, &face_normals),
        };

        let mut corners = Vec::with_capacity(mesh.loop_count() * 3);
        let mut loop_start = 0usize;

        for (polygon, face_normal) in mesh.polygons.iter().zip(&face_normals) {
            let points = normals::corner_points(mesh, &polygon.vertices);

            for triangle in triangulate(&points, *face_normal) {
                for corner in triangle {
                    let loop_index = loop_start + corner;
                    corners.push(LoopAttribute {
                        position_index: polygon.vertices[corner],
                        normal: loop_normals[loop_index],
                        uv: mesh.uvs.as_ref().map(|uvs| uvs[loop_index]),
                    });
                }
            }

            loop_start += polygon.vertices.len();
        }

        trace!(
            object = object_name,
            polygons = mesh.polygons.len(),
            triangles = corners.len() / 3,
            "Normalized geometry"
        );

        Ok(NormalizedGeometry {
            positions: &mesh.positions,
            corners,
        })
    }
}

fn validate(object_name: &str, mesh: &PolygonMesh) -> Result<()> {
    let position_count = mesh.positions.len();

    for (i, polygon) in mesh.polygons.iter().enumerate() {
        if polygon.vertices.len() < 3 {
            return Err(Error::malformed_mesh(
                object_name,
                format!("polygon {} has {} corners", i, polygon.vertices.len()),
            ));
        }
        if let Some(&bad) = polygon.vertices.iter().find(|&&v| v as usize >= position_count) {
            return Err(Error::malformed_mesh(
                object_name,
                format!("polygon {} references vertex {} of {}", i, bad, position_count),
            ));
        }
    }

    let loop_count = mesh.loop_count();
    if let Some(uvs) = &mesh.uvs {
        if uvs.len() != loop_count {
            return Err(Error::malformed_mesh(
                object_name,
                format!("UV layer has {} entries for {} loops", uvs.len(), loop_count),
            ));
        }
    }
    if let Some(normals) = &mesh.custom_normals {
        if normals.len() != loop_count {
            return Err(Error::malformed_mesh(
                object_name,
                format!("custom normals have {} entries for {} loops", normals.len(), loop_count),
            ));
        }
    }

    Ok(())
}
