//! Ray-mesh intersection against the interaction proxy.
//!
//! Brute force Moller-Trumbore over every triangle. Garment proxies are a
//! few thousand triangles, cheap enough to run every frame.

use glam::Vec3;

use crate::types::Ray;

/// Epsilon for floating point comparisons in ray intersection
const EPSILON: f32 = 1e-6;

/// Result of a ray-triangle intersection test
#[derive(Debug, Clone, Copy)]
pub struct TriangleHit {
    /// Distance along the ray to the intersection point
    pub t: f32,
    /// Barycentric weight of vertex 1
    pub u: f32,
    /// Barycentric weight of vertex 2
    pub v: f32,
}

/// Moller-Trumbore ray-triangle intersection.
///
/// Triangles are double sided: garment shells are open meshes and the
/// pointer may reach the inside of a sleeve.
pub fn ray_triangle_intersection(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<TriangleHit> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let pvec = ray.direction.cross(edge2);
    let det = edge1.dot(pvec);

    // Ray parallel to the triangle plane
    if det.abs() < EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let tvec = ray.origin - v0;

    let u = tvec.dot(pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let qvec = tvec.cross(edge1);
    let v = ray.direction.dot(qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(qvec) * inv_det;
    if t < EPSILON {
        return None;
    }

    Some(TriangleHit { t, u, v })
}

/// Geometric normal of a counter-clockwise triangle
pub fn face_normal(v0: Vec3, v1: Vec3, v2: Vec3) -> Vec3 {
    (v1 - v0).cross(v2 - v0).normalize_or_zero()
}

/// Triangle soup used for picking
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionMesh {
    pub positions: Vec<Vec3>,
    /// Triangle indices (3 per triangle), all in range of `positions`
    pub indices: Vec<u32>,
}

impl CollisionMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.triangle_count() == 0
    }

    pub fn triangle_positions(&self, tri_index: usize) -> (Vec3, Vec3, Vec3) {
        let base = tri_index * 3;
        (
            self.positions[self.indices[base] as usize],
            self.positions[self.indices[base + 1] as usize],
            self.positions[self.indices[base + 2] as usize],
        )
    }

    /// Append another mesh, offsetting its indices
    pub fn append(&mut self, positions: impl IntoIterator<Item = Vec3>, indices: &[u32]) {
        let offset = self.positions.len() as u32;
        self.positions.extend(positions);
        self.indices.extend(indices.iter().map(|i| i + offset));
    }
}

/// Closest intersection with a [`CollisionMesh`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshHit {
    /// Distance along the ray
    pub t: f32,
    pub point: Vec3,
    /// Unit geometric normal of the hit triangle (counter-clockwise winding)
    pub face_normal: Vec3,
    pub triangle: usize,
}

/// Cast a ray against a mesh and return the closest hit.
pub fn raycast_mesh(ray: &Ray, mesh: &CollisionMesh) -> Option<MeshHit> {
    let mut closest: Option<(TriangleHit, usize)> = None;

    for tri_index in 0..mesh.triangle_count() {
        let (v0, v1, v2) = mesh.triangle_positions(tri_index);
        if let Some(hit) = ray_triangle_intersection(ray, v0, v1, v2) {
            let nearer = closest.is_none_or(|(prev, _)| hit.t < prev.t);
            if nearer {
                closest = Some((hit, tri_index));
            }
        }
    }

    closest.map(|(hit, triangle)| {
        let (v0, v1, v2) = mesh.triangle_positions(triangle);
        MeshHit {
            t: hit.t,
            point: ray.at(hit.t),
            face_normal: face_normal(v0, v1, v2),
            triangle,
        }
    })
}
