use thiserror::Error;

use crate::types::LayerId;

/// Failure to produce a single source image
#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("Failed to read image {source_ref}: {error}")]
    Io {
        source_ref: String,
        #[source]
        error: std::io::Error,
    },
    #[error("Failed to decode image {source_ref}: {error}")]
    Decode {
        source_ref: String,
        #[source]
        error: image::ImageError,
    },
    #[error("Image not found: {0}")]
    NotFound(String),
}

/// Errors from composite exports
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Nothing to export: no visible layers")]
    EmptyExport,
    #[error("None of the visible layer images could be loaded")]
    NoImagesLoaded,
    #[error("Failed to serialize composite: {0}")]
    Serialization(String),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl ExportError {
    /// Stable code used in UI error messages
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyExport => "export_empty",
            Self::NoImagesLoaded => "export_no_images",
            Self::Serialization(_) => "export_serialization",
            Self::Image(_) => "export_image",
        }
    }
}

/// Errors from upload optimization
#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error("Failed to decode upload: {0}")]
    Decode(#[source] image::ImageError),
    #[error("Failed to encode optimized image: {0}")]
    Encode(#[source] image::ImageError),
}

/// Errors from design document (de)serialization
#[derive(Debug, Error)]
pub enum DesignError {
    #[error("Invalid design JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported design version: {0}")]
    UnsupportedVersion(u32),
    #[error("Invalid layer {id}: {reason}")]
    InvalidLayer { id: LayerId, reason: &'static str },
}

/// Errors from loading the garment model
#[derive(Debug, Error)]
pub enum MeshLoadError {
    #[error("Failed to load model {path}: {message}")]
    Load { path: String, message: String },
    #[error("Model {0} contains none of the target meshes")]
    NoTargetMeshes(String),
}

/// Errors from UI commands
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Invalid layer id: {0}")]
    InvalidLayerId(String),
    #[error("Unknown layer: {0}")]
    UnknownLayer(LayerId),
    #[error("No garment surface loaded")]
    NoSurface,
}

impl CommandError {
    /// Stable code used in UI error messages
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidLayerId(_) => "invalid_layer_id",
            Self::UnknownLayer(_) => "unknown_layer",
            Self::NoSurface => "no_surface",
        }
    }
}
