use std::f32::consts::PI;

/// Above this |normal . up| the world up axis is swapped for +Z.
pub const SINGULARITY_THRESHOLD: f32 = 0.99;

/// Extra rotation about local X applied after Euler decomposition so the
/// decal texture reads upright.
pub const TEXTURE_FLIP_CORRECTION: f32 = PI;

/// Below this cos(Y) the XYZ Euler decomposition is treated as gimbal locked.
pub const GIMBAL_EPSILON: f32 = 1e-5;

/// Normals shorter than this are treated as missing.
pub const MIN_NORMAL_LENGTH_SQUARED: f32 = 1e-12;

/// Depth bias for layer `i` is `DEPTH_BIAS_BASE - i`.
pub const DEPTH_BIAS_BASE: f32 = -1.0;

/// Depth bias of the placement ghost, above every real layer.
pub const GHOST_DEPTH_BIAS: f32 = -1000.0;

/// A pointer-down grabs a layer when it lands within `scale * factor` of
/// its position.
pub const GRAB_RADIUS_FACTOR: f32 = 0.75;

/// Source references with this prefix are transient handles owned by a
/// single layer.
pub const TRANSIENT_SOURCE_PREFIX: &str = "blob:";
