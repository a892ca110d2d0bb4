use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DesignError;
use crate::layer_store::LayerStore;
use crate::types::Layer;

/// Current design document format
pub const DESIGN_FORMAT_VERSION: u32 = 1;

/// A saved design: the product it was made for and its layers in z-order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignDocument {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    pub layers: Vec<Layer>,
}

impl DesignDocument {
    pub fn new(product_id: Option<String>, layers: Vec<Layer>) -> Self {
        Self {
            version: DESIGN_FORMAT_VERSION,
            product_id,
            layers,
        }
    }

    /// Snapshot the layers of a store
    pub fn from_store(store: &LayerStore, product_id: Option<String>) -> Self {
        Self::new(product_id, store.layers().to_vec())
    }

    pub fn to_json(&self) -> Result<String, DesignError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, DesignError> {
        let document: Self = serde_json::from_str(json)?;
        if document.version != DESIGN_FORMAT_VERSION {
            return Err(DesignError::UnsupportedVersion(document.version));
        }
        for layer in &document.layers {
            if let Some(reason) = layer.transform_error() {
                return Err(DesignError::InvalidLayer {
                    id: layer.id,
                    reason,
                });
            }
        }
        debug!("Parsed design with {} layers", document.layers.len());
        Ok(document)
    }
}
