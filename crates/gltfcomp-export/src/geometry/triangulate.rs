//! Deterministic polygon triangulation
//!
//! Polygons are projected onto the plane of their normal and ear-clipped.
//! Ears are emitted as `(previous, current, next)` corner triples, so every
//! triangle keeps the polygon's winding.

use gltfcomp_core::Vec3;

/// Triangulate one polygon given its corner positions and normal
///
/// Returns corner indices (into `points`) three per triangle. A polygon with
/// fewer than three corners yields nothing.
pub fn triangulate(points: &[Vec3], normal: Vec3) -> Vec<[usize; 3]> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }
    if n == 3 {
        return vec![[0, 1, 2]];
    }

    let projected = project(points, normal);
    let area = signed_area(&projected);
    if area == 0.0 || !area.is_finite() {
        return fan(&(0..n).collect::<Vec<_>>());
    }
    let orientation = area.signum();

    let mut remaining: Vec<usize> = (0..n).collect();
    let mut triangles = Vec::with_capacity(n - 2);

    while remaining.len() > 3 {
        let m = remaining.len();
        let ear = (0..m).find(|&i| {
            let a = remaining[(i + m - 1) % m];
            let b = remaining[i];
            let c = remaining[(i + 1) % m];
            is_ear(&projected, &remaining, a, b, c, orientation)
        });

        match ear {
            Some(i) => {
                let a = remaining[(i + m - 1) % m];
                let b = remaining[i];
                let c = remaining[(i + 1) % m];
                triangles.push([a, b, c]);
                remaining.remove(i);
            }
            None => {
                // Self-intersecting or degenerate outline
                triangles.extend(fan(&remaining));
                return triangles;
            }
        }
    }

    triangles.push([remaining[0], remaining[1], remaining[2]]);
    triangles
}

/// Fan around the first corner, preserving order
fn fan(corners: &[usize]) -> Vec<[usize; 3]> {
    (1..corners.len().saturating_sub(1))
        .map(|k| [corners[0], corners[k], corners[k + 1]])
        .collect()
}

/// Drop the dominant axis of `normal`
fn project(points: &[Vec3], normal: Vec3) -> Vec<[f32; 2]> {
    let (ax, ay, az) = (normal.x.abs(), normal.y.abs(), normal.z.abs());
    points
        .iter()
        .map(|p| {
            if az >= ax && az >= ay {
                [p.x, p.y]
            } else if ay >= ax {
                [p.z, p.x]
            } else {
                [p.y, p.z]
            }
        })
        .collect()
}

fn signed_area(points: &[[f32; 2]]) -> f32 {
    let n = points.len();
    let twice: f32 = (0..n)
        .map(|i| {
            let p = points[i];
            let q = points[(i + 1) % n];
            p[0] * q[1] - q[0] * p[1]
        })
        .sum();
    twice * 0.5
}

fn cross(o: [f32; 2], a: [f32; 2], b: [f32; 2]) -> f32 {
    (a[0] - o[0]) * (b[1] - o[1]) - (a[1] - o[1]) * (b[0] - o[0])
}

fn is_ear(points: &[[f32; 2]], remaining: &[usize], a: usize, b: usize, c: usize, orientation: f32) -> bool {
    let (pa, pb, pc) = (points[a], points[b], points[c]);

    // Reflex or collinear corner
    if cross(pa, pb, pc) * orientation <= 0.0 {
        return false;
    }

    !remaining
        .iter()
        .filter(|&&i| i != a && i != b && i != c)
        .any(|&i| {
            let p = points[i];
            cross(pa, pb, p) * orientation >= 0.0
                && cross(pb, pc, p) * orientation >= 0.0
                && cross(pc, pa, p) * orientation >= 0.0
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[[f32; 3]]) -> Vec<Vec3> {
        raw.iter().copied().map(Vec3::from).collect()
    }

    fn area_3d(points: &[Vec3], tri: [usize; 3], normal: Vec3) -> f32 {
        let ab = points[tri[1]] - points[tri[0]];
        let ac = points[tri[2]] - points[tri[0]];
        ab.cross(&ac).dot(&normal) * 0.5
    }

    #[test]
    fn test_triangle_passthrough() {
        let points = pts(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        assert_eq!(triangulate(&points, Vec3::UP), vec![[0, 1, 2]]);
    }

    #[test]
    fn test_too_few_corners() {
        let points = pts(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
        assert!(triangulate(&points, Vec3::UP).is_empty());
    }

    #[test]
    fn test_quad_two_triangles() {
        let points = pts(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]]);
        let tris = triangulate(&points, Vec3::UP);
        assert_eq!(tris.len(), 2);
        for tri in &tris {
            assert!(area_3d(&points, *tri, Vec3::UP) > 0.0);
        }
    }

    #[test]
    fn test_concave_polygon() {
        // Arrow shape with a reflex corner at index 3
        let points = pts(&[
            [0.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [2.0, 2.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 2.0, 0.0],
        ]);
        let tris = triangulate(&points, Vec3::UP);
        assert_eq!(tris.len(), 3);

        let total: f32 = tris.iter().map(|t| area_3d(&points, *t, Vec3::UP)).sum();
        assert!((total - 3.0).abs() < 1e-5);
        for tri in &tris {
            assert!(area_3d(&points, *tri, Vec3::UP) > 0.0);
        }
    }

    #[test]
    fn test_clockwise_polygon_keeps_winding() {
        let points = pts(&[[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0], [1.0, 0.0, 0.0]]);
        let down = Vec3::new(0.0, 0.0, -1.0);
        let tris = triangulate(&points, down);
        assert_eq!(tris.len(), 2);
        for tri in &tris {
            assert!(area_3d(&points, *tri, down) > 0.0);
        }
    }

    #[test]
    fn test_vertical_polygon() {
        let points = pts(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0], [0.0, 0.0, 1.0]]);
        let normal = Vec3::new(0.0, -1.0, 0.0);
        let tris = triangulate(&points, normal);
        assert_eq!(tris.len(), 2);
        for tri in &tris {
            assert!(area_3d(&points, *tri, normal) > 0.0);
        }
    }

    #[test]
    fn test_degenerate_polygon_falls_back_to_fan() {
        let points = pts(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [3.0, 0.0, 0.0]]);
        let tris = triangulate(&points, Vec3::UP);
        assert_eq!(tris, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_deterministic() {
        let points = pts(&[
            [0.0, 0.0, 0.0],
            [3.0, 0.0, 0.0],
            [3.0, 1.0, 0.0],
            [1.5, 0.5, 0.0],
            [0.0, 1.0, 0.0],
            [-1.0, 0.5, 0.0],
        ]);
        assert_eq!(triangulate(&points, Vec3::UP), triangulate(&points, Vec3::UP));
    }
}
