//! Drag controller.
//!
//! While a layer is dragged the pointer is re-projected onto the garment
//! once per frame and the decal mesh is moved directly through
//! [`LiveDecals`]. The store is not touched until release, when the last
//! successful hit is committed exactly once. Frames where the pointer
//! misses the garment keep the previous hit.

use glam::{Vec2, Vec3};
use tracing::{debug, trace};

use crate::camera::Camera;
use crate::constraints::{PrintArea, clamp_layer_transform};
use crate::interaction::InteractionProxy;
use crate::layer_store::{LayerStore, UpdateOutcome};
use crate::orientation::DecalTransform;
use crate::picker::{find_grab_target, pick_surface};
use crate::types::{LayerId, LayerTransform};

/// Renderer-side decal meshes that can be moved without a rebuild
pub trait LiveDecals {
    /// Move a layer's decal mesh to a new transform
    fn set_live_transform(&mut self, id: LayerId, transform: &DecalTransform);

    /// Show the placement ghost at a transform, or hide it with `None`
    fn set_ghost(&mut self, _transform: Option<&DecalTransform>) {}
}

/// Last surface hit of a drag, in proxy-local space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StagedHit {
    pub position: Vec3,
    pub normal: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        id: LayerId,
        /// `None` until the first frame with a hit
        staged: Option<StagedHit>,
    },
}

/// Result of ending a drag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragRelease {
    pub id: LayerId,
    /// Store outcome of the commit, `None` if no frame ever hit
    pub commit: Option<UpdateOutcome>,
}

#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
    pointer: Option<Vec2>,
    decal_depth: f32,
    print_area: Option<PrintArea>,
}

impl DragController {
    pub fn new(decal_depth: f32) -> Self {
        Self {
            state: DragState::Idle,
            pointer: None,
            decal_depth,
            print_area: None,
        }
    }

    /// Keep dragged decals inside a print area
    pub fn with_print_area(mut self, print_area: Option<PrintArea>) -> Self {
        self.print_area = print_area;
        self
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn dragging_id(&self) -> Option<LayerId> {
        match self.state {
            DragState::Dragging { id, .. } => Some(id),
            DragState::Idle => None,
        }
    }

    /// Pointer pressed over the viewport.
    ///
    /// Resolves the surface point under the pointer and starts dragging the
    /// layer within reach of it. A drag already in progress is released
    /// first.
    pub fn pointer_down(
        &mut self,
        ndc: Vec2,
        camera: &Camera,
        proxy: &InteractionProxy,
        store: &mut LayerStore,
    ) -> Option<LayerId> {
        self.pointer = Some(ndc);
        let pick = pick_surface(&camera.ray_from_ndc(ndc), proxy)?;
        let id = find_grab_target(pick.local_point, store.layers())?.id;
        self.begin(id, store).then_some(id)
    }

    /// Start dragging a specific layer (for hosts that hit-test decal
    /// meshes themselves). Locked or unknown layers are refused.
    pub fn begin(&mut self, id: LayerId, store: &mut LayerStore) -> bool {
        if self.is_dragging() {
            self.finish(store);
        }
        if !store.begin_drag(id) {
            return false;
        }
        debug!("Drag started on layer {}", id);
        self.state = DragState::Dragging { id, staged: None };
        true
    }

    /// Record the latest pointer position. Work happens in [`Self::tick`].
    pub fn pointer_move(&mut self, ndc: Vec2) {
        self.pointer = Some(ndc);
    }

    /// Per-frame update. Returns whether the live decal was moved.
    pub fn tick(
        &mut self,
        camera: &Camera,
        proxy: &InteractionProxy,
        store: &LayerStore,
        live: &mut impl LiveDecals,
    ) -> bool {
        let DragState::Dragging { id, staged } = &mut self.state else {
            return false;
        };
        let Some(ndc) = self.pointer else {
            return false;
        };
        let Some(pick) = pick_surface(&camera.ray_from_ndc(ndc), proxy) else {
            trace!("Drag frame missed the surface");
            return false;
        };
        let (Some(layer), Some(index)) = (store.get(*id), store.index_of(*id)) else {
            return false;
        };

        let position = match &self.print_area {
            Some(area) => clamp_layer_transform(pick.local_point, layer.scale, area).position,
            None => pick.local_point,
        };
        let transform = DecalTransform::at_surface(
            layer,
            position,
            pick.local_normal,
            index,
            self.decal_depth,
        );
        live.set_live_transform(*id, &transform);
        *staged = Some(StagedHit {
            position,
            normal: pick.local_normal,
        });
        true
    }

    /// Pointer released: commit and end the drag.
    pub fn pointer_up(&mut self, store: &mut LayerStore) -> Option<DragRelease> {
        self.finish(store)
    }

    /// End the drag from a safety net (pointer left, focus lost). Commits the
    /// same way as a release.
    pub fn cancel(&mut self, store: &mut LayerStore) -> Option<DragRelease> {
        self.finish(store)
    }

    fn finish(&mut self, store: &mut LayerStore) -> Option<DragRelease> {
        let DragState::Dragging { id, staged } = std::mem::take(&mut self.state) else {
            return None;
        };

        let commit = staged.map(|hit| {
            store.update_transform(id, LayerTransform::placement(hit.position, hit.normal))
        });
        store.end_drag();
        debug!("Drag ended on layer {} ({:?})", id, commit);
        Some(DragRelease { id, commit })
    }
}
