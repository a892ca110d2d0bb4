//! Command types for IPC messages.

mod layer;
mod placement;

pub use layer::*;
pub use placement::*;
