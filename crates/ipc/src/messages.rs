//! Main IPC message enums for communication between the engine and UI.

use serde::{Deserialize, Serialize};

use crate::commands::{LayerCommand, PlacementCommand};
use crate::input::PointerEvent;
use crate::types::{ExportSummary, LayerInfo};

/// Messages from the engine to the panel UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EngineToUi {
    /// Full layer list after any change
    LayersChanged { layers: Vec<LayerInfo> },

    /// Active layer changed
    SelectionChanged { active_id: Option<String> },

    /// A drag started (`Some`) or ended (`None`)
    DragStateChanged { dragging_id: Option<String> },

    /// Ghost placement started or finished
    PlacementChanged { pending: bool },

    /// Decals hidden because the camera entered the garment
    DecalsHidden { hidden: bool },

    /// Composite export finished
    ExportFinished(ExportSummary),

    /// Error notification
    Error { code: String, message: String },
}

/// Messages from the panel UI to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum UiToEngine {
    /// Viewport pointer input
    Pointer(PointerEvent),

    /// Layer panel commands
    LayerCommand(LayerCommand),

    /// Ghost placement flow
    PlacementCommand(PlacementCommand),

    /// Camera moved (orbit controls live outside the engine)
    CameraMoved {
        position: [f32; 3],
        target: [f32; 3],
    },
}
