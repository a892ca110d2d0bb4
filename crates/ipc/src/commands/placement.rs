//! Ghost placement commands.

use serde::{Deserialize, Serialize};

use crate::types::LayerKind;

/// Two-phase placement: show a ghost preview, then confirm with a click.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlacementCommand {
    /// Start previewing a new layer under the pointer
    Begin { source: String, kind: LayerKind },
    /// Confirm at the given viewport position (NDC)
    Confirm { x: f32, y: f32 },
    Cancel,
}
