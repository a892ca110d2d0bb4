use std::fmt;
use std::str::FromStr;

use atelier_ipc::{LayerInfo, LayerKind, TransformPatch};
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::TRANSIENT_SOURCE_PREFIX;

/// Unique layer identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(Uuid);

impl LayerId {
    /// Generate a fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an id received from the UI
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for LayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for LayerId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Opaque reference to a layer's image content (URL, path or handle)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceRef(String);

impl SourceRef {
    pub fn new(source: impl Into<String>) -> Self {
        Self(source.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Transient handles are owned by the layer and must be released with it
    pub fn is_transient(&self) -> bool {
        self.0.starts_with(TRANSIENT_SOURCE_PREFIX)
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceRef {
    fn from(source: &str) -> Self {
        Self::new(source)
    }
}

impl From<String> for SourceRef {
    fn from(source: String) -> Self {
        Self(source)
    }
}

/// A placed image decal.
///
/// `position` and `normal` live in the interaction proxy's local space so
/// the decal follows the garment when it is moved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    #[serde(default)]
    pub kind: LayerKind,
    pub source: SourceRef,
    pub position: Vec3,
    /// Euler XYZ rotation used when no surface normal is known
    #[serde(default)]
    pub rotation: Vec3,
    /// Spin about the decal's own axis, radians
    #[serde(default)]
    pub rotation_z: f32,
    /// Uniform scale (world units per decal edge)
    pub scale: f32,
    /// Surface normal at the placement point
    #[serde(default)]
    pub normal: Option<Vec3>,
    #[serde(default)]
    pub flip_x: bool,
    #[serde(default)]
    pub flip_y: bool,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
}

fn default_visible() -> bool {
    true
}

impl Layer {
    /// Create a visible, unlocked layer with a fresh id
    pub fn new(source: SourceRef, kind: LayerKind, position: Vec3, scale: f32) -> Self {
        Self {
            id: LayerId::new(),
            kind,
            source,
            position,
            rotation: Vec3::ZERO,
            rotation_z: 0.0,
            scale,
            normal: None,
            flip_x: false,
            flip_y: false,
            visible: true,
            locked: false,
        }
    }

    /// Describe what makes the stored transform unusable, if anything
    pub fn transform_error(&self) -> Option<&'static str> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            Some("scale must be finite and positive")
        } else if !self.position.is_finite() {
            Some("position must be finite")
        } else if !self.rotation.is_finite() || !self.rotation_z.is_finite() {
            Some("rotation must be finite")
        } else if self.normal.is_some_and(|n| !n.is_finite()) {
            Some("normal must be finite")
        } else {
            None
        }
    }

    /// Snapshot for the layer panel
    pub fn to_info(&self, z_index: usize) -> LayerInfo {
        LayerInfo {
            id: self.id.to_string(),
            kind: self.kind,
            source: self.source.to_string(),
            position: self.position.to_array(),
            rotation_z: self.rotation_z,
            scale: self.scale,
            normal: self.normal.map(|n| n.to_array()),
            flip_x: self.flip_x,
            flip_y: self.flip_y,
            visible: self.visible,
            locked: self.locked,
            z_index,
        }
    }
}

/// Partial transform update. Fields left as `None` are not touched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayerTransform {
    pub position: Option<Vec3>,
    pub rotation: Option<Vec3>,
    pub rotation_z: Option<f32>,
    pub scale: Option<f32>,
    pub normal: Option<Vec3>,
    pub flip_x: Option<bool>,
    pub flip_y: Option<bool>,
}

impl LayerTransform {
    /// Position and normal from a surface hit (the drag commit payload)
    pub fn placement(position: Vec3, normal: Vec3) -> Self {
        Self {
            position: Some(position),
            normal: Some(normal),
            ..Default::default()
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn with_rotation_z(mut self, rotation_z: f32) -> Self {
        self.rotation_z = Some(rotation_z);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl From<TransformPatch> for LayerTransform {
    fn from(patch: TransformPatch) -> Self {
        Self {
            position: patch.position.map(Vec3::from_array),
            rotation: None,
            rotation_z: patch.rotation_z,
            scale: patch.scale,
            normal: patch.normal.map(Vec3::from_array),
            flip_x: patch.flip_x,
            flip_y: patch.flip_y,
        }
    }
}

/// A half-line in 3D
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
}

impl Ray {
    /// Build a ray, normalizing the direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Express the ray in another frame. The direction is re-normalized, so
    /// distances along the result are in the target frame's units.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        Self::new(
            matrix.transform_point3(self.origin),
            matrix.transform_vector3(self.direction),
        )
    }
}
