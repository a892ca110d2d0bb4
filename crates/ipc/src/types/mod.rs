//! Type definitions for IPC messages.

mod export;
mod layer;

pub use export::*;
pub use layer::*;
