//! Decal orientation from surface normals.
//!
//! A decal is a projection box whose local +Z axis is driven into the
//! surface. Given the hit normal we build an orthonormal basis around it,
//! spin it about the normal by the layer's `rotation_z`, and hand the result
//! to the renderer as XYZ Euler angles.
//!
//! Two corrections are folded in:
//! - The Euler X angle gets an extra half turn ([`TEXTURE_FLIP_CORRECTION`])
//!   so textures read upright after projection.
//! - Surfaces facing away from +Z (the back of the garment) get a mirror
//!   factor of -1 on the decal's X scale so text does not read backwards.

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Quat, Vec3};

use crate::constants::{
    DEPTH_BIAS_BASE, GIMBAL_EPSILON, MIN_NORMAL_LENGTH_SQUARED, SINGULARITY_THRESHOLD,
    TEXTURE_FLIP_CORRECTION,
};
use crate::types::Layer;

/// Result of the orientation solve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecalOrientation {
    /// XYZ Euler angles, radians, including the texture flip correction
    pub rotation: Vec3,
    /// -1 on back-facing surfaces, +1 otherwise
    pub mirror: f32,
}

impl DecalOrientation {
    /// Orientation used when nothing is known about the surface
    pub const IDENTITY: Self = Self {
        rotation: Vec3::ZERO,
        mirror: 1.0,
    };

    /// The final rotation as a quaternion
    pub fn quat(&self) -> Quat {
        euler_xyz_to_quat(self.rotation)
    }

    /// The rotation before the texture flip correction. Its local +Z axis
    /// is the (normalized) surface normal.
    pub fn surface_quat(&self) -> Quat {
        euler_xyz_to_quat(self.rotation - Vec3::new(TEXTURE_FLIP_CORRECTION, 0.0, 0.0))
    }
}

/// Orthonormal basis with the normal as its Z column.
///
/// World up is used as the reference axis unless the normal is nearly
/// parallel to it, in which case +Z takes over.
pub fn surface_basis(normal: Vec3) -> Mat3 {
    let z = normal.normalize();
    let up = if z.dot(Vec3::Y).abs() > SINGULARITY_THRESHOLD {
        Vec3::Z
    } else {
        Vec3::Y
    };
    let x = up.cross(z).normalize();
    let y = z.cross(x);
    Mat3::from_cols(x, y, z)
}

/// Mirror factor for the decal's X scale
pub fn mirror_sign(normal: Vec3) -> f32 {
    if normal.z < 0.0 { -1.0 } else { 1.0 }
}

/// Solve the decal rotation for a surface normal and a user spin (radians).
///
/// Normals that are zero or non-finite have no defined basis; they yield the
/// spin alone with no mirror.
pub fn solve_orientation(normal: Vec3, spin: f32) -> DecalOrientation {
    let spin_quat = Quat::from_rotation_z(spin);

    if !normal.is_finite() || normal.length_squared() < MIN_NORMAL_LENGTH_SQUARED {
        tracing::debug!("Degenerate surface normal {normal:?}, using spin only");
        let rotation = quat_to_euler_xyz(spin_quat);
        return DecalOrientation {
            rotation: rotation + Vec3::new(TEXTURE_FLIP_CORRECTION, 0.0, 0.0),
            mirror: 1.0,
        };
    }

    let base = Quat::from_mat3(&surface_basis(normal));
    let rotation = quat_to_euler_xyz((base * spin_quat).normalize());

    DecalOrientation {
        rotation: rotation + Vec3::new(TEXTURE_FLIP_CORRECTION, 0.0, 0.0),
        mirror: mirror_sign(normal),
    }
}

/// Decompose a rotation into intrinsic XYZ Euler angles (R = Rx * Ry * Rz).
///
/// Y is taken from `atan2` rather than `asin` so it stays consistent with
/// the other two columns when the rotation is close to gimbal lock.
pub fn quat_to_euler_xyz(q: Quat) -> Vec3 {
    let m = Mat3::from_quat(q);
    // m_rc is row r, column c
    let m11 = m.x_axis.x;
    let m12 = m.y_axis.x;
    let m13 = m.z_axis.x;
    let m22 = m.y_axis.y;
    let m23 = m.z_axis.y;
    let m32 = m.y_axis.z;
    let m33 = m.z_axis.z;

    let cos_y = m23.hypot(m33);
    let y = m13.atan2(cos_y);
    if cos_y > GIMBAL_EPSILON {
        Vec3::new((-m23).atan2(m33), y, (-m12).atan2(m11))
    } else {
        // X and Z rotate about the same axis; fold everything into X
        Vec3::new(m32.atan2(m22), y, 0.0)
    }
}

/// Inverse of [`quat_to_euler_xyz`]
pub fn euler_xyz_to_quat(euler: Vec3) -> Quat {
    Quat::from_rotation_x(euler.x) * Quat::from_rotation_y(euler.y) * Quat::from_rotation_z(euler.z)
}

/// Depth bias for the layer at `index`; later layers win the depth test.
pub fn depth_bias(index: usize) -> f32 {
    DEPTH_BIAS_BASE - index as f32
}

/// Scale of the projection box: mirror and flips on X/Y, constant depth.
pub fn decal_scale(scale: f32, mirror: f32, flip_x: bool, flip_y: bool, depth: f32) -> Vec3 {
    let fx = if flip_x { -1.0 } else { 1.0 };
    let fy = if flip_y { -1.0 } else { 1.0 };
    Vec3::new(scale * mirror * fx, scale * fy, depth)
}

/// Everything the renderer needs to build or update one decal mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecalTransform {
    pub position: Vec3,
    /// XYZ Euler angles, radians
    pub rotation: Vec3,
    pub scale: Vec3,
    /// Polygon offset; more negative draws on top
    pub depth_bias: f32,
}

impl DecalTransform {
    /// Transform for a layer at a (possibly live) surface point
    pub fn at_surface(layer: &Layer, position: Vec3, normal: Vec3, index: usize, depth: f32) -> Self {
        let orientation = solve_orientation(normal, layer.rotation_z);
        Self {
            position,
            rotation: orientation.rotation,
            scale: decal_scale(
                layer.scale,
                orientation.mirror,
                layer.flip_x,
                layer.flip_y,
                depth,
            ),
            depth_bias: depth_bias(index),
        }
    }

    /// Model matrix in proxy-local space
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            euler_xyz_to_quat(self.rotation),
            self.position,
        )
    }
}

/// Build the decal transform for a stored layer.
///
/// Layers without a normal fall back to their stored Euler rotation and no
/// mirror.
pub fn decal_transform(layer: &Layer, index: usize, depth: f32) -> DecalTransform {
    match layer.normal {
        Some(normal) => DecalTransform::at_surface(layer, layer.position, normal, index, depth),
        None => DecalTransform {
            position: layer.position,
            rotation: layer.rotation,
            scale: decal_scale(layer.scale, 1.0, layer.flip_x, layer.flip_y, depth),
            depth_bias: depth_bias(index),
        },
    }
}

/// GPU-ready decal instance (column-major model matrix plus depth bias)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DecalInstance {
    pub model: [[f32; 4]; 4],
    pub depth_bias: f32,
    pub _padding: [f32; 3],
}

impl From<&DecalTransform> for DecalInstance {
    fn from(transform: &DecalTransform) -> Self {
        Self {
            model: transform.model_matrix().to_cols_array_2d(),
            depth_bias: transform.depth_bias,
            _padding: [0.0; 3],
        }
    }
}
