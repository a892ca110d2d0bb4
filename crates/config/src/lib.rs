//! Shared configuration for Atelier
//!
//! This crate provides the single source of truth for product selection,
//! layer defaults, and export/upload limits shared by the decal engine and
//! the command line front-end.

mod product;

pub use product::*;

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable pointing at a JSON configuration file
pub const CONFIG_PATH_ENV: &str = "ATELIER_CONFIG";

/// Environment variable selecting the active product by id
pub const PRODUCT_ENV: &str = "ATELIER_PRODUCT";

/// Default uniform decal scale for new layers
pub const DEFAULT_LAYER_SCALE: f32 = 0.2;

/// Smallest scale the panel controls allow
pub const MIN_LAYER_SCALE: f32 = 0.05;

/// Largest scale the panel controls allow
pub const MAX_LAYER_SCALE: f32 = 0.5;

/// Provisional position (chest) used until a placement ray resolves
pub const DEFAULT_SPAWN_POSITION: [f32; 3] = [0.0, 0.2, 0.15];

/// Constant projection depth so decals do not stretch on curved cloth
pub const DEFAULT_DECAL_DEPTH: f32 = 0.15;

/// Minimum edge of the print canvas in pixels
pub const DEFAULT_PRINT_MIN_SIZE: u32 = 2000;

/// Maximum edge of the print canvas in pixels
pub const DEFAULT_PRINT_MAX_SIZE: u32 = 4000;

/// Maximum upscale factor applied to source images in the print file
pub const DEFAULT_PRINT_MAX_UPSCALE: f32 = 3.0;

/// Edge of the square thumbnail canvas in pixels
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 800;

/// Fraction of the thumbnail covered by the largest image
pub const DEFAULT_THUMBNAIL_FILL: f32 = 0.8;

/// Uploads larger than this (either edge) are downscaled
pub const DEFAULT_UPLOAD_MAX_DIMENSION: u32 = 2048;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    #[error("Invalid layer defaults: {0}")]
    InvalidLayerDefaults(String),

    #[error("Invalid print area for product {0}")]
    InvalidPrintArea(String),
}

/// Defaults and limits for placed layers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerDefaults {
    /// Scale assigned to new layers
    pub scale: f32,
    /// Lower bound for scale updates
    pub min_scale: f32,
    /// Upper bound for scale updates
    pub max_scale: f32,
    /// Provisional position for layers added before placement resolves
    pub spawn_position: [f32; 3],
    /// Depth of the decal projection box
    pub decal_depth: f32,
}

impl Default for LayerDefaults {
    fn default() -> Self {
        Self {
            scale: DEFAULT_LAYER_SCALE,
            min_scale: MIN_LAYER_SCALE,
            max_scale: MAX_LAYER_SCALE,
            spawn_position: DEFAULT_SPAWN_POSITION,
            decal_depth: DEFAULT_DECAL_DEPTH,
        }
    }
}

impl LayerDefaults {
    /// Clamp a requested scale into the allowed range. The lower bound wins
    /// if the limits are inverted.
    pub fn clamp_scale(&self, scale: f32) -> f32 {
        scale.min(self.max_scale).max(self.min_scale)
    }

    /// Scales must be finite and positive, with `min_scale <= scale <= max_scale`
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !positive(self.scale) || !positive(self.min_scale) || !positive(self.max_scale) {
            return Err(ConfigError::InvalidLayerDefaults(format!(
                "scales must be finite and positive (scale {}, min {}, max {})",
                self.scale, self.min_scale, self.max_scale
            )));
        }
        if self.min_scale > self.max_scale {
            return Err(ConfigError::InvalidLayerDefaults(format!(
                "min_scale {} exceeds max_scale {}",
                self.min_scale, self.max_scale
            )));
        }
        if !(self.min_scale..=self.max_scale).contains(&self.scale) {
            return Err(ConfigError::InvalidLayerDefaults(format!(
                "scale {} outside {}..={}",
                self.scale, self.min_scale, self.max_scale
            )));
        }
        if !positive(self.decal_depth) || !self.spawn_position.iter().all(|v| v.is_finite()) {
            return Err(ConfigError::InvalidLayerDefaults(
                "decal_depth must be positive and spawn_position finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Resolution envelope for composite exports
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Print canvas edge floor
    pub print_min_size: u32,
    /// Print canvas edge ceiling used to derive the image scale
    pub print_max_size: u32,
    /// Upscale cap for small source images
    pub print_max_upscale: f32,
    /// Thumbnail canvas edge
    pub thumbnail_size: u32,
    /// Fraction of the thumbnail covered by the largest image
    pub thumbnail_fill: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            print_min_size: DEFAULT_PRINT_MIN_SIZE,
            print_max_size: DEFAULT_PRINT_MAX_SIZE,
            print_max_upscale: DEFAULT_PRINT_MAX_UPSCALE,
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
            thumbnail_fill: DEFAULT_THUMBNAIL_FILL,
        }
    }
}

/// Limits applied to uploaded images before they become layers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Longest allowed edge in pixels
    pub max_dimension: u32,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_UPLOAD_MAX_DIMENSION,
        }
    }
}

/// Complete studio configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Product catalogue
    pub products: Vec<ProductConfig>,
    /// Id of the active product
    pub active_product: String,
    pub layers: LayerDefaults,
    pub export: ExportConfig,
    pub upload: UploadConfig,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            products: builtin_products(),
            active_product: DEFAULT_PRODUCT_ID.to_string(),
            layers: LayerDefaults::default(),
            export: ExportConfig::default(),
            upload: UploadConfig::default(),
        }
    }
}

impl StudioConfig {
    /// Parse a configuration from JSON. Missing fields fall back to defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the active product exists and every limit is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.product()?;
        self.layers.validate()?;
        if let Some(product) = self
            .products
            .iter()
            .find(|product| product.print_area.is_some_and(|area| !area.is_valid()))
        {
            return Err(ConfigError::InvalidPrintArea(product.id.clone()));
        }
        Ok(())
    }

    /// Load a configuration file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        tracing::debug!("Loaded studio config from {}", path.display());
        Self::from_json_str(&json)
    }

    /// Build the configuration from the environment.
    ///
    /// `ATELIER_CONFIG` names a JSON file to load, `ATELIER_PRODUCT`
    /// overrides the active product. Without either, defaults are used.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load(path)?,
            Err(_) => Self::default(),
        };

        if let Ok(product_id) = std::env::var(PRODUCT_ENV) {
            config.select_product(&product_id)?;
        }

        Ok(config)
    }

    /// The active product
    pub fn product(&self) -> Result<&ProductConfig, ConfigError> {
        self.find_product(&self.active_product)
            .ok_or_else(|| ConfigError::UnknownProduct(self.active_product.clone()))
    }

    /// Look up a product by id
    pub fn find_product(&self, id: &str) -> Option<&ProductConfig> {
        self.products.iter().find(|product| product.id == id)
    }

    /// Switch the active product
    pub fn select_product(&mut self, id: &str) -> Result<(), ConfigError> {
        if self.find_product(id).is_none() {
            return Err(ConfigError::UnknownProduct(id.to_string()));
        }
        self.active_product = id.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StudioConfig::default();
        assert_eq!(config.active_product, DEFAULT_PRODUCT_ID);
        assert_eq!(config.layers.scale, DEFAULT_LAYER_SCALE);
        assert_eq!(config.export.print_min_size, DEFAULT_PRINT_MIN_SIZE);
        assert_eq!(config.upload.max_dimension, DEFAULT_UPLOAD_MAX_DIMENSION);
        assert!(config.product().is_ok());
    }

    #[test]
    fn test_clamp_scale() {
        let defaults = LayerDefaults::default();
        assert_eq!(defaults.clamp_scale(0.01), MIN_LAYER_SCALE);
        assert_eq!(defaults.clamp_scale(2.0), MAX_LAYER_SCALE);
        assert_eq!(defaults.clamp_scale(0.3), 0.3);
    }

    #[test]
    fn test_clamp_scale_with_inverted_limits_does_not_panic() {
        let defaults = LayerDefaults {
            min_scale: 0.5,
            max_scale: 0.1,
            ..Default::default()
        };
        assert_eq!(defaults.clamp_scale(0.3), 0.5);
        assert!(defaults.validate().is_err());
    }

    #[test]
    fn test_inverted_scale_limits_rejected() {
        let result =
            StudioConfig::from_json_str(r#"{ "layers": { "min_scale": 0.5, "max_scale": 0.1 } }"#);
        assert!(matches!(result, Err(ConfigError::InvalidLayerDefaults(_))));
    }

    #[test]
    fn test_non_positive_default_scale_rejected() {
        for json in [
            r#"{ "layers": { "scale": 0.0 } }"#,
            r#"{ "layers": { "scale": -0.5 } }"#,
            r#"{ "layers": { "min_scale": -1.0 } }"#,
            r#"{ "layers": { "scale": 0.9 } }"#,
        ] {
            assert!(
                matches!(
                    StudioConfig::from_json_str(json),
                    Err(ConfigError::InvalidLayerDefaults(_))
                ),
                "{json} was accepted"
            );
        }
    }

    #[test]
    fn test_invalid_print_area_rejected() {
        let mut config = StudioConfig::default();
        config.products[0].print_area = Some(PrintArea {
            min_x: 0.3,
            max_x: -0.3,
            min_y: -0.1,
            max_y: 0.3,
            max_scale: 0.3,
        });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPrintArea(id)) if id == DEFAULT_PRODUCT_ID
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            StudioConfig::from_json_str(r#"{ "export": { "thumbnail_size": 512 } }"#).unwrap();
        assert_eq!(config.export.thumbnail_size, 512);
        assert_eq!(config.export.print_max_size, DEFAULT_PRINT_MAX_SIZE);
        assert_eq!(config.layers, LayerDefaults::default());
    }

    #[test]
    fn test_unknown_active_product_rejected() {
        let result = StudioConfig::from_json_str(r#"{ "active_product": "hoodie" }"#);
        assert!(matches!(result, Err(ConfigError::UnknownProduct(id)) if id == "hoodie"));
    }

    #[test]
    fn test_select_product() {
        let mut config = StudioConfig::default();
        assert!(config.select_product("missing").is_err());
        assert_eq!(config.active_product, DEFAULT_PRODUCT_ID);
        assert!(config.select_product(DEFAULT_PRODUCT_ID).is_ok());
    }
}
