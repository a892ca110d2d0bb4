//! Authoritative layer list.
//!
//! The store owns every [`Layer`] plus the session flags around them: the
//! active (selected) layer, the layer being dragged, and a pending
//! placement awaiting a click. List order is z-order; later layers render
//! nearer the viewer.
//!
//! Mutations that change layer data bump [`LayerStore::revision`]. The
//! renderer and UI use it to tell when a snapshot is stale. Selection and
//! drag flags do not count as data changes.

use atelier_config::LayerDefaults;
use atelier_ipc::{LayerInfo, LayerKind};
use glam::Vec3;
use tracing::{debug, info, warn};

use crate::types::{Layer, LayerId, LayerTransform, SourceRef};

/// Frees transient resources (object URLs, GPU textures) tied to a source
pub trait ResourceReleaser {
    fn release(&mut self, source: &SourceRef);
}

/// Releaser for hosts that own no transient resources
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReleaser;

impl ResourceReleaser for NoopReleaser {
    fn release(&mut self, _source: &SourceRef) {}
}

/// Outcome of [`LayerStore::update_transform`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied,
    /// The layer is locked; nothing changed
    Locked,
    /// No layer with that id
    Missing,
}

/// A layer waiting for its placement click
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Placement {
    #[default]
    NoPending,
    Pending { source: SourceRef, kind: LayerKind },
}

impl Placement {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}

pub struct LayerStore {
    layers: Vec<Layer>,
    active: Option<LayerId>,
    dragging: Option<LayerId>,
    placement: Placement,
    revision: u64,
    defaults: LayerDefaults,
    releaser: Box<dyn ResourceReleaser>,
}

impl std::fmt::Debug for LayerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerStore")
            .field("layer_count", &self.layers.len())
            .field("active", &self.active)
            .field("dragging", &self.dragging)
            .field("placement", &self.placement)
            .field("revision", &self.revision)
            .finish()
    }
}

impl Default for LayerStore {
    fn default() -> Self {
        Self::new(LayerDefaults::default())
    }
}

impl LayerStore {
    pub fn new(defaults: LayerDefaults) -> Self {
        Self::with_releaser(defaults, NoopReleaser)
    }

    pub fn with_releaser(defaults: LayerDefaults, releaser: impl ResourceReleaser + 'static) -> Self {
        Self {
            layers: Vec::new(),
            active: None,
            dragging: None,
            placement: Placement::NoPending,
            revision: 0,
            defaults,
            releaser: Box::new(releaser),
        }
    }

    pub fn defaults(&self) -> &LayerDefaults {
        &self.defaults
    }

    /// Layers in z-order
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    /// Position of a layer in z-order
    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|layer| layer.id == id)
    }

    pub fn active(&self) -> Option<LayerId> {
        self.active
    }

    pub fn active_layer(&self) -> Option<&Layer> {
        self.active.and_then(|id| self.get(id))
    }

    pub fn dragging(&self) -> Option<LayerId> {
        self.dragging
    }

    pub fn is_dragging(&self, id: LayerId) -> bool {
        self.dragging == Some(id)
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    /// Counter bumped on every layer data change
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Panel snapshot of all layers
    pub fn snapshot(&self) -> Vec<LayerInfo> {
        self.layers
            .iter()
            .enumerate()
            .map(|(index, layer)| layer.to_info(index))
            .collect()
    }

    /// Append a layer and make it active.
    ///
    /// Without an initial position the configured spawn position is used
    /// until placement resolves.
    pub fn add_layer(&mut self, source: SourceRef, initial_position: Option<Vec3>) -> LayerId {
        self.add_layer_of_kind(source, LayerKind::Image, initial_position)
    }

    pub fn add_layer_of_kind(
        &mut self,
        source: SourceRef,
        kind: LayerKind,
        initial_position: Option<Vec3>,
    ) -> LayerId {
        let position =
            initial_position.unwrap_or_else(|| Vec3::from_array(self.defaults.spawn_position));
        let layer = Layer::new(source, kind, position, self.defaults.scale);
        self.push_layer(layer)
    }

    fn push_layer(&mut self, layer: Layer) -> LayerId {
        let id = layer.id;
        debug!("Adding layer {} ({})", id, layer.source);
        self.layers.push(layer);
        self.active = Some(id);
        self.bump();
        id
    }

    /// Remove a layer, releasing its transient source if nothing else uses it.
    ///
    /// If the removed layer was active, selection falls back to the last
    /// remaining layer. Returns the removed layer.
    pub fn remove_layer(&mut self, id: LayerId) -> Option<Layer> {
        let index = self.index_of(id)?;
        let layer = self.layers.remove(index);

        if self.active == Some(id) {
            self.active = self.layers.last().map(|l| l.id);
        }
        if self.dragging == Some(id) {
            self.dragging = None;
        }
        self.release_if_unreferenced(&layer.source);
        self.bump();
        debug!("Removed layer {}", id);
        Some(layer)
    }

    /// Merge a partial transform into a layer. Locked layers are untouched.
    ///
    /// Non-finite vectors and non-positive scales in the update are ignored
    /// field by field. The revision only moves when a value actually changed.
    pub fn update_transform(&mut self, id: LayerId, transform: LayerTransform) -> UpdateOutcome {
        let Some(layer) = self.layers.iter_mut().find(|layer| layer.id == id) else {
            debug!("Transform update for unknown layer {}", id);
            return UpdateOutcome::Missing;
        };
        if layer.locked {
            debug!("Transform update for locked layer {} skipped", id);
            return UpdateOutcome::Locked;
        }

        let mut changed = false;
        if let Some(position) = transform.position.filter(|p| p.is_finite()) {
            changed |= set_if_changed(&mut layer.position, position);
        }
        if let Some(rotation) = transform.rotation.filter(|r| r.is_finite()) {
            changed |= set_if_changed(&mut layer.rotation, rotation);
        }
        if let Some(rotation_z) = transform.rotation_z.filter(|r| r.is_finite()) {
            changed |= set_if_changed(&mut layer.rotation_z, rotation_z);
        }
        match transform.scale {
            Some(scale) if scale.is_finite() && scale > 0.0 => {
                changed |= set_if_changed(&mut layer.scale, scale);
            }
            Some(scale) => warn!("Ignoring invalid scale {} for layer {}", scale, id),
            None => {}
        }
        if let Some(normal) = transform.normal.filter(|n| n.is_finite()) {
            changed |= set_if_changed(&mut layer.normal, Some(normal));
        }
        if let Some(flip_x) = transform.flip_x {
            changed |= set_if_changed(&mut layer.flip_x, flip_x);
        }
        if let Some(flip_y) = transform.flip_y {
            changed |= set_if_changed(&mut layer.flip_y, flip_y);
        }

        if changed {
            self.bump();
        }
        UpdateOutcome::Applied
    }

    /// Flip visibility. Hidden layers are skipped by rendering and export.
    pub fn toggle_visibility(&mut self, id: LayerId) -> Option<bool> {
        let layer = self.layers.iter_mut().find(|layer| layer.id == id)?;
        layer.visible = !layer.visible;
        let visible = layer.visible;
        self.bump();
        Some(visible)
    }

    /// Flip the lock flag. A lock taken mid-drag does not cancel the drag,
    /// it only makes the eventual commit a no-op.
    pub fn toggle_lock(&mut self, id: LayerId) -> Option<bool> {
        let layer = self.layers.iter_mut().find(|layer| layer.id == id)?;
        layer.locked = !layer.locked;
        let locked = layer.locked;
        self.bump();
        Some(locked)
    }

    /// Change the selection. Unknown ids clear it.
    pub fn set_active(&mut self, id: Option<LayerId>) {
        self.active = id.filter(|id| self.get(*id).is_some());
    }

    /// Start dragging a layer. Ignored for locked or unknown layers.
    ///
    /// Starting a drag also selects the layer and moves the dragging flag
    /// off any other layer.
    pub fn begin_drag(&mut self, id: LayerId) -> bool {
        match self.get(id) {
            Some(layer) if !layer.locked => {
                self.dragging = Some(id);
                self.active = Some(id);
                true
            }
            Some(_) => {
                debug!("Drag on locked layer {} ignored", id);
                false
            }
            None => false,
        }
    }

    pub fn end_drag(&mut self) {
        self.dragging = None;
    }

    /// Stage a layer for click-to-place, replacing any earlier pending one.
    pub fn set_pending(&mut self, source: SourceRef, kind: LayerKind) {
        let previous = std::mem::replace(&mut self.placement, Placement::Pending { source, kind });
        if let Placement::Pending { source, .. } = previous {
            self.release_if_unreferenced(&source);
        }
    }

    /// Abandon the pending placement
    pub fn cancel_pending(&mut self) {
        if let Placement::Pending { source, .. } = std::mem::take(&mut self.placement) {
            self.release_if_unreferenced(&source);
        }
    }

    /// Turn the pending placement into a real layer at a surface point.
    pub fn confirm_pending(&mut self, position: Vec3, normal: Option<Vec3>) -> Option<LayerId> {
        let Placement::Pending { source, kind } = std::mem::take(&mut self.placement) else {
            return None;
        };
        let mut layer = Layer::new(source, kind, position, self.defaults.scale);
        layer.normal = normal.filter(|n| n.is_finite());
        let id = self.push_layer(layer);
        info!("Placed layer {} at {:?}", id, position);
        Some(id)
    }

    /// Replace the whole layer list (design load).
    ///
    /// Layers with duplicate ids or unusable transforms are dropped.
    /// Selection moves to the last layer; drag and pending placement are
    /// cleared.
    pub fn replace_all(&mut self, layers: Vec<Layer>) {
        let old = std::mem::take(&mut self.layers);
        for layer in layers {
            if self.get(layer.id).is_some() {
                warn!("Dropping layer with duplicate id {}", layer.id);
                continue;
            }
            if let Some(reason) = layer.transform_error() {
                warn!("Dropping layer {}: {}", layer.id, reason);
                continue;
            }
            self.layers.push(layer);
        }

        for layer in &old {
            self.release_if_unreferenced(&layer.source);
        }
        self.cancel_pending();
        self.dragging = None;
        self.active = self.layers.last().map(|l| l.id);
        self.bump();
        info!("Loaded {} layers", self.layers.len());
    }

    fn release_if_unreferenced(&mut self, source: &SourceRef) {
        if !source.is_transient() {
            return;
        }
        let in_use = self.layers.iter().any(|l| &l.source == source)
            || matches!(&self.placement, Placement::Pending { source: s, .. } if s == source);
        if !in_use {
            debug!("Releasing transient source {}", source);
            self.releaser.release(source);
        }
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

/// Store `value` in `slot`, reporting whether it differed
fn set_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}
