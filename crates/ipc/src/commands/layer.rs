//! Layer panel commands.

use serde::{Deserialize, Serialize};

use crate::types::{LayerKind, TransformPatch};

/// Commands issued by the layer panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LayerCommand {
    /// Add a layer immediately; placement resolves from the view centre
    Add { source: String, kind: LayerKind },
    Remove { id: String },
    UpdateTransform { id: String, patch: TransformPatch },
    ToggleVisibility { id: String },
    ToggleLock { id: String },
    /// Change selection (`None` clears it)
    SetActive { id: Option<String> },
}
