//! IPC message protocol for Atelier
//!
//! Defines all message types exchanged between the decal engine and the
//! panel UI.

pub mod commands;
pub mod error;
pub mod input;
pub mod messages;
pub mod types;

pub use commands::*;
pub use error::*;
pub use input::*;
pub use messages::*;
pub use types::*;

/// Serialize an engine message for the UI.
pub fn encode_engine_message(message: &EngineToUi) -> Result<String, IpcError> {
    Ok(serde_json::to_string(message)?)
}

/// Parse a message sent by the UI.
pub fn decode_ui_message(json: &str) -> Result<UiToEngine, IpcError> {
    if json.trim().is_empty() {
        return Err(IpcError::InvalidFormat("empty message".to_string()));
    }
    Ok(serde_json::from_str(json)?)
}
