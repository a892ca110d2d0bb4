//! Atelier decal engine - placement, orientation and compositing of decals
//!
//! This crate holds everything between the renderer and the UI panel:
//! - [`orientation`] - Surface normal to decal rotation with mirror correction
//! - [`layer_store`] - Authoritative layer list, selection, lock and drag flags
//! - [`interaction`] - Merged proxy of the printable sub-meshes
//! - [`raycast`] - Ray-triangle intersection against the proxy
//! - [`picker`] - Pointer ray to surface hit and nearest-layer lookup
//! - [`drag`] - Drag lifecycle with per-frame visuals and a single commit
//! - [`placement`] - Spawn-on-add and click-to-place with a ghost preview
//! - [`constraints`] - Print area clamping and print size estimates
//! - [`export`] - Print file and thumbnail compositing
//! - [`optimize`] - Upload downscaling
//! - [`design`] - Versioned design documents
//! - [`studio`] - Message-driven session wiring it all together
//!
//! The crate does not depend on a renderer. Decal meshes are created by the
//! host from [`DecalTransform`]s and updated through [`LiveDecals`].

pub mod camera;
pub mod constants;
pub mod constraints;
pub mod design;
pub mod drag;
pub mod error;
pub mod export;
pub mod interaction;
pub mod layer_store;
pub mod optimize;
pub mod orientation;
pub mod picker;
pub mod placement;
pub mod raycast;
pub mod studio;
pub mod types;

pub use camera::*;
pub use constants::*;
pub use constraints::*;
pub use design::*;
pub use drag::*;
pub use error::*;
pub use export::*;
pub use interaction::*;
pub use layer_store::*;
pub use optimize::*;
pub use orientation::*;
pub use picker::*;
pub use placement::*;
pub use raycast::*;
pub use studio::*;
pub use types::*;
