//! Export-related types for IPC messages.

use serde::{Deserialize, Serialize};

/// Which composite to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExportKind {
    /// Full resolution print file
    #[default]
    PrintFile,
    /// Small square preview for the design gallery
    Thumbnail,
}

/// Summary of a finished export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSummary {
    pub kind: ExportKind,
    pub width: u32,
    pub height: u32,
    /// Encoded PNG size in bytes
    pub byte_len: usize,
    /// Number of layers that made it into the composite
    pub layer_count: usize,
}
