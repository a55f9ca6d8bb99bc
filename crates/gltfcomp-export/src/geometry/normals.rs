//! Face and split (per-corner) normals

use crate::scene::PolygonMesh;
use gltfcomp_core::Vec3;

/// Newell normal of a polygon outline, normalized
///
/// Robust for non-planar and concave outlines. Degenerate outlines give `ZERO`.
pub fn newell_normal(points: &[Vec3]) -> Vec3 {
    let n = points.len();
    let mut normal = Vec3::ZERO;
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        normal.x += (p.y - q.y) * (p.z + q.z);
        normal.y += (p.z - q.z) * (p.x + q.x);
        normal.z += (p.x - q.x) * (p.y + q.y);
    }
    normal.normalize()
}

/// Interior angle at corner `i` of an outline
fn corner_angle(points: &[Vec3], i: usize) -> f32 {
    let n = points.len();
    let prev = points[(i + n - 1) % n];
    let next = points[(i + 1) % n];
    (prev - points[i]).angle_between(&(next - points[i]))
}

/// Compute one normal per polygon corner
///
/// Flat polygons use their face normal on every corner. Smooth polygons use
/// the angle-weighted average of the face normals of all smooth polygons
/// sharing the vertex. Indices must already be validated.
pub fn split_normals(mesh: &PolygonMesh, face_normals: &[Vec3]) -> Vec<[f32; 3]> {
    let mut vertex_normals = vec![Vec3::ZERO; mesh.positions.len()];

    for (polygon, face_normal) in mesh.polygons.iter().zip(face_normals) {
        if !polygon.smooth {
            continue;
        }
        let points = corner_points(mesh, &polygon.vertices);
        for (i, &v) in polygon.vertices.iter().enumerate() {
            vertex_normals[v as usize] += *face_normal * corner_angle(&points, i);
        }
    }

    let mut normals = Vec::with_capacity(mesh.loop_count());
    for (polygon, face_normal) in mesh.polygons.iter().zip(face_normals) {
        for &v in &polygon.vertices {
            let normal = if polygon.smooth {
                let averaged = vertex_normals[v as usize].normalize();
                if averaged == Vec3::ZERO { *face_normal } else { averaged }
            } else {
                *face_normal
            };
            normals.push(normal.to_array());
        }
    }
    normals
}

pub(crate) fn corner_points(mesh: &PolygonMesh, vertices: &[u32]) -> Vec<Vec3> {
    vertices
        .iter()
        .map(|&v| Vec3::from(mesh.positions[v as usize]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Polygon;

    fn approx(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn test_newell_normal_ccw_square() {
        let points: Vec<Vec3> = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]]
            .into_iter()
            .map(Vec3::from)
            .collect();
        assert!(approx(newell_normal(&points).to_array(), [0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_newell_normal_degenerate() {
        let points: Vec<Vec3> = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]
            .into_iter()
            .map(Vec3::from)
            .collect();
        assert_eq!(newell_normal(&points), Vec3::ZERO);
    }

    fn folded_mesh(smooth: bool) -> PolygonMesh {
        // Two triangles hinged on the edge 0-1: one in the XY plane, one in the XZ plane
        let make = |v: [u32; 3]| if smooth { Polygon::smooth(v) } else { Polygon::flat(v) };
        PolygonMesh::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            vec![make([0, 1, 2]), make([1, 0, 3])],
        )
    }

    fn face_normals(mesh: &PolygonMesh) -> Vec<Vec3> {
        mesh.polygons
            .iter()
            .map(|p| newell_normal(&corner_points(mesh, &p.vertices)))
            .collect()
    }

    #[test]
    fn test_flat_split_normals() {
        let mesh = folded_mesh(false);
        let normals = split_normals(&mesh, &face_normals(&mesh));

        assert_eq!(normals.len(), 6);
        for n in &normals[..3] {
            assert!(approx(*n, [0.0, 0.0, 1.0]));
        }
        for n in &normals[3..] {
            assert!(approx(*n, [0.0, 1.0, 0.0]));
        }
    }

    #[test]
    fn test_smooth_split_normals_shared_vertices() {
        let mesh = folded_mesh(true);
        let normals = split_normals(&mesh, &face_normals(&mesh));

        // Vertex 0 appears at loop 0 and loop 4, vertex 1 at loop 1 and loop 3
        assert!(approx(normals[0], normals[4]));
        assert!(approx(normals[1], normals[3]));

        let s = std::f32::consts::FRAC_1_SQRT_2;
        assert!(approx(normals[0], [0.0, s, s]));

        // Unshared vertex keeps its face normal
        assert!(approx(normals[2], [0.0, 0.0, 1.0]));
    }
}
