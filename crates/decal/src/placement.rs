//! Layer placement.
//!
//! Two flows put a layer on the garment:
//! - [`spawn_layer`] adds it immediately and drops it where the view center
//!   hits the surface.
//! - Click-to-place stages it as pending in the store. A ghost preview
//!   follows the pointer until [`PlacementController::confirm_at`] turns it
//!   into a real layer.

use atelier_config::LayerDefaults;
use atelier_ipc::LayerKind;
use glam::{Vec2, Vec3};
use tracing::debug;

use crate::camera::Camera;
use crate::constants::GHOST_DEPTH_BIAS;
use crate::drag::LiveDecals;
use crate::interaction::InteractionProxy;
use crate::layer_store::LayerStore;
use crate::orientation::{DecalTransform, decal_scale, solve_orientation};
use crate::picker::pick_surface;
use crate::types::{LayerId, LayerTransform, SourceRef};

/// Add a layer and place it where the view center meets the garment.
///
/// Without a proxy, or when the center ray misses, the layer keeps the
/// configured spawn position and has no normal.
pub fn spawn_layer(
    store: &mut LayerStore,
    camera: &Camera,
    proxy: Option<&InteractionProxy>,
    source: SourceRef,
    kind: LayerKind,
) -> LayerId {
    let id = store.add_layer_of_kind(source, kind, None);

    let pick = proxy.and_then(|proxy| pick_surface(&camera.center_ray(), proxy));
    match pick {
        Some(pick) => {
            store.update_transform(
                id,
                LayerTransform::placement(pick.local_point, pick.local_normal),
            );
            debug!("Spawned layer {} on surface at {:?}", id, pick.local_point);
        }
        None => debug!("Spawn ray missed, layer {} stays at default position", id),
    }
    id
}

/// Ghost decal shown while a placement is pending
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GhostPreview {
    pub transform: DecalTransform,
}

impl GhostPreview {
    /// Ghost at a surface point with no spin, at the default layer scale
    pub fn at(position: Vec3, normal: Vec3, defaults: &LayerDefaults) -> Self {
        let orientation = solve_orientation(normal, 0.0);
        Self {
            transform: DecalTransform {
                position,
                rotation: orientation.rotation,
                scale: decal_scale(
                    defaults.scale,
                    orientation.mirror,
                    false,
                    false,
                    defaults.decal_depth,
                ),
                depth_bias: GHOST_DEPTH_BIAS,
            },
        }
    }
}

/// Tracks the pointer for click-to-place and drives the ghost preview
#[derive(Debug, Clone, Default)]
pub struct PlacementController {
    pointer: Option<Vec2>,
    ghost: Option<GhostPreview>,
}

impl PlacementController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer_move(&mut self, ndc: Vec2) {
        self.pointer = Some(ndc);
    }

    /// Current ghost, `None` while hidden
    pub fn ghost(&self) -> Option<&GhostPreview> {
        self.ghost.as_ref()
    }

    /// Per-frame update of the ghost. It is shown only while a placement is
    /// pending and the pointer is over the garment.
    pub fn tick(
        &mut self,
        camera: &Camera,
        proxy: Option<&InteractionProxy>,
        store: &LayerStore,
        live: &mut impl LiveDecals,
    ) {
        let ghost = match (store.placement().is_pending(), self.pointer, proxy) {
            (true, Some(ndc), Some(proxy)) => pick_surface(&camera.ray_from_ndc(ndc), proxy)
                .map(|pick| GhostPreview::at(pick.local_point, pick.local_normal, store.defaults())),
            _ => None,
        };

        if ghost != self.ghost {
            live.set_ghost(ghost.as_ref().map(|g| &g.transform));
            self.ghost = ghost;
        }
    }

    /// Confirm the pending placement at a viewport point.
    ///
    /// A miss leaves the placement pending. The ghost is left to the next
    /// [`Self::tick`] or [`Self::clear`].
    pub fn confirm_at(
        &mut self,
        ndc: Vec2,
        camera: &Camera,
        proxy: &InteractionProxy,
        store: &mut LayerStore,
    ) -> Option<LayerId> {
        if !store.placement().is_pending() {
            return None;
        }
        let Some(pick) = pick_surface(&camera.ray_from_ndc(ndc), proxy) else {
            debug!("Placement click missed the garment");
            return None;
        };
        store.confirm_pending(pick.local_point, Some(pick.local_normal))
    }

    /// Forget the ghost (placement cancelled or confirmed elsewhere)
    pub fn clear(&mut self, live: &mut impl LiveDecals) {
        if self.ghost.take().is_some() {
            live.set_ghost(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::NamedMesh;

    #[derive(Default)]
    struct GhostRecorder {
        ghosts: Vec<Option<DecalTransform>>,
    }

    impl LiveDecals for GhostRecorder {
        fn set_live_transform(&mut self, _id: LayerId, _transform: &DecalTransform) {}

        fn set_ghost(&mut self, transform: Option<&DecalTransform>) {
            self.ghosts.push(transform.copied());
        }
    }

    fn plane_proxy() -> InteractionProxy {
        let mesh = NamedMesh::new(
            "Object_2",
            vec![
                Vec3::new(-1.0, -1.0, 0.0),
                Vec3::new(1.0, -1.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(-1.0, 1.0, 0.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
        );
        InteractionProxy::merge([&mesh]).unwrap()
    }

    #[test]
    fn test_spawn_on_surface() {
        let proxy = plane_proxy();
        let mut store = LayerStore::default();
        let id = spawn_layer(
            &mut store,
            &Camera::default(),
            Some(&proxy),
            SourceRef::from("a.png"),
            LayerKind::Image,
        );

        let layer = store.get(id).unwrap();
        assert!(layer.position.length() < 1e-4);
        assert!((layer.normal.unwrap() - Vec3::Z).length() < 1e-5);
        assert_eq!(store.active(), Some(id));
    }

    #[test]
    fn test_spawn_miss_keeps_default_position() {
        let proxy = plane_proxy();
        let mut camera = Camera::default();
        camera.set_pose(Vec3::new(0.0, 5.0, 1.5), Vec3::new(0.0, 5.0, 0.0));

        let mut store = LayerStore::default();
        let id = spawn_layer(&mut store, &camera, Some(&proxy), SourceRef::from("a.png"), LayerKind::Image);
        let layer = store.get(id).unwrap();
        assert_eq!(layer.position, Vec3::new(0.0, 0.2, 0.15));
        assert_eq!(layer.normal, None);

        let id = spawn_layer(&mut store, &camera, None, SourceRef::from("b.png"), LayerKind::Text);
        assert_eq!(store.get(id).unwrap().kind, LayerKind::Text);
    }

    #[test]
    fn test_ghost_follows_pointer_and_hides_on_miss() {
        let proxy = plane_proxy();
        let camera = Camera::default();
        let mut store = LayerStore::default();
        let mut placement = PlacementController::new();
        let mut live = GhostRecorder::default();

        // Nothing pending: no ghost
        placement.pointer_move(Vec2::ZERO);
        placement.tick(&camera, Some(&proxy), &store, &mut live);
        assert!(placement.ghost().is_none());
        assert!(live.ghosts.is_empty());

        store.set_pending(SourceRef::from("a.png"), LayerKind::Image);
        placement.tick(&camera, Some(&proxy), &store, &mut live);
        let ghost = placement.ghost().unwrap();
        assert_eq!(ghost.transform.depth_bias, GHOST_DEPTH_BIAS);
        assert!((ghost.transform.scale.x - 0.2).abs() < 1e-6);
        assert_eq!(live.ghosts.len(), 1);

        // Same pointer, same ghost: no redundant update
        placement.tick(&camera, Some(&proxy), &store, &mut live);
        assert_eq!(live.ghosts.len(), 1);

        // Pointer off the garment hides it
        placement.pointer_move(Vec2::new(0.99, 0.99));
        let mut far = camera;
        far.set_pose(Vec3::new(0.0, 0.0, 0.5), Vec3::ZERO);
        far.fov_y = 2.5;
        placement.tick(&far, Some(&proxy), &store, &mut live);
        assert!(placement.ghost().is_none());
        assert_eq!(live.ghosts.last(), Some(&None));
    }

    #[test]
    fn test_confirm_at() {
        let proxy = plane_proxy();
        let camera = Camera::default();
        let mut store = LayerStore::default();
        let mut placement = PlacementController::new();

        assert!(placement.confirm_at(Vec2::ZERO, &camera, &proxy, &mut store).is_none());

        store.set_pending(SourceRef::from("a.png"), LayerKind::Image);
        let mut off = camera;
        off.set_pose(Vec3::new(0.0, 5.0, 1.5), Vec3::new(0.0, 5.0, 0.0));
        assert!(placement.confirm_at(Vec2::ZERO, &off, &proxy, &mut store).is_none());
        assert!(store.placement().is_pending());

        let id = placement.confirm_at(Vec2::ZERO, &camera, &proxy, &mut store).unwrap();
        assert!(!store.placement().is_pending());
        assert!((store.get(id).unwrap().normal.unwrap() - Vec3::Z).length() < 1e-5);
    }
}
