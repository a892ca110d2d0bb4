//! Product catalogue: which garment model is loaded and which of its
//! sub-meshes form the surface decals may be placed on.

use serde::{Deserialize, Serialize};

/// Identifier of the product used when nothing else is selected
pub const DEFAULT_PRODUCT_ID: &str = "tshirt-classic";

/// A customizable product (one garment model)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductConfig {
    /// Stable product identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Path of the garment model handed to the asset loader
    pub model_path: String,
    /// Names of the sub-meshes merged into the interaction proxy.
    ///
    /// This is an explicit allow-list: seams, collars and trim meshes are
    /// excluded simply by not being listed.
    pub target_meshes: Vec<String>,
    /// Initial camera position in world space
    pub camera_position: [f32; 3],
    /// Printable region decals are kept inside, if the product has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub print_area: Option<PrintArea>,
}

/// Printable rectangle on the garment, in proxy-local X/Y
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrintArea {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
    /// Largest decal scale that fits the area
    pub max_scale: f32,
}

impl PrintArea {
    /// Finite bounds in order and a positive scale cap
    pub fn is_valid(&self) -> bool {
        [self.min_x, self.max_x, self.min_y, self.max_y, self.max_scale]
            .iter()
            .all(|v| v.is_finite())
            && self.min_x <= self.max_x
            && self.min_y <= self.max_y
            && self.max_scale > 0.0
    }
}

impl ProductConfig {
    /// Check whether a named sub-mesh belongs to the interaction surface
    pub fn is_target_mesh(&self, name: &str) -> bool {
        self.target_meshes.iter().any(|target| target == name)
    }

    /// The classic t-shirt shipped with the studio
    pub fn tshirt_classic() -> Self {
        Self {
            id: DEFAULT_PRODUCT_ID.to_string(),
            name: "Classic Cotton T-Shirt".to_string(),
            model_path: "/t-shirt.glb".to_string(),
            target_meshes: ["Object_2", "Object_3", "Object_4", "Object_5"]
                .iter()
                .map(|name| name.to_string())
                .collect(),
            camera_position: [0.0, 0.0, 1.5],
            print_area: None,
        }
    }
}

impl Default for ProductConfig {
    fn default() -> Self {
        Self::tshirt_classic()
    }
}

/// Built-in product catalogue
pub fn builtin_products() -> Vec<ProductConfig> {
    vec![ProductConfig::tshirt_classic()]
}
