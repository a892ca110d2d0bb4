//! Layer snapshot types shared with the panel UI.

use serde::{Deserialize, Serialize};

/// What a layer's source content is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    #[default]
    Image,
    Text,
}

/// Read-only view of a placed layer for the layer panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerInfo {
    pub id: String,
    pub kind: LayerKind,
    /// Opaque image reference (URL or handle)
    pub source: String,
    pub position: [f32; 3],
    /// Spin about the decal's own axis, radians
    pub rotation_z: f32,
    pub scale: f32,
    pub normal: Option<[f32; 3]>,
    pub flip_x: bool,
    pub flip_y: bool,
    pub visible: bool,
    pub locked: bool,
    /// Position in the layer sequence (higher renders nearer)
    pub z_index: usize,
}

/// Partial transform sent by panel controls. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation_z: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flip_x: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flip_y: Option<bool>,
}
