//! Studio session: the decal engine behind a message interface.
//!
//! The host forwards [`UiToEngine`] messages to [`Studio::handle`] and calls
//! [`Studio::frame`] once per rendered frame. Both return the
//! [`EngineToUi`] notifications the panel needs. Decal meshes are driven
//! through the host's [`LiveDecals`] implementation during drags and rebuilt
//! from [`Studio::decal_transforms`] whenever the layer list changes.

use atelier_config::{ConfigError, ProductConfig, StudioConfig};
use atelier_ipc::{
    EngineToUi, ExportKind, IpcError, LayerCommand, MouseButton, PlacementCommand, PointerEvent,
    UiToEngine, decode_ui_message, encode_engine_message,
};
use glam::{Mat4, Vec2, Vec3};
use tracing::{debug, info, warn};

use crate::camera::Camera;
use crate::constraints::clamp_layer_transform;
use crate::design::DesignDocument;
use crate::drag::{DragController, LiveDecals};
use crate::error::{CommandError, ExportError, MeshLoadError};
use crate::export::{Composite, ImageLoader, export_composite};
use crate::interaction::{InteractionProxy, MeshSource, NamedMesh};
use crate::layer_store::{LayerStore, ResourceReleaser, UpdateOutcome};
use crate::orientation::{DecalInstance, DecalTransform, decal_transform};
use crate::placement::{PlacementController, spawn_layer};
use crate::types::{LayerId, LayerTransform};

/// Session flags compared before and after each message
#[derive(Debug, Clone, Copy, PartialEq)]
struct Marks {
    revision: u64,
    active: Option<LayerId>,
    dragging: Option<LayerId>,
    pending: bool,
}

#[derive(Debug)]
pub struct Studio {
    config: StudioConfig,
    product: ProductConfig,
    store: LayerStore,
    camera: Camera,
    proxy: Option<InteractionProxy>,
    drag: DragController,
    placement: PlacementController,
    decals_hidden: bool,
}

impl Studio {
    pub fn new(config: StudioConfig) -> Result<Self, ConfigError> {
        let store = LayerStore::new(config.layers);
        Self::with_store(config, store)
    }

    /// Session whose store frees transient sources through `releaser`
    pub fn with_releaser(
        config: StudioConfig,
        releaser: impl ResourceReleaser + 'static,
    ) -> Result<Self, ConfigError> {
        let store = LayerStore::with_releaser(config.layers, releaser);
        Self::with_store(config, store)
    }

    fn with_store(config: StudioConfig, store: LayerStore) -> Result<Self, ConfigError> {
        config.validate()?;
        let product = config.product()?.clone();
        info!("Studio session for product {}", product.id);
        Ok(Self {
            camera: Camera::for_product(&product),
            drag: DragController::new(config.layers.decal_depth)
                .with_print_area(product.print_area),
            placement: PlacementController::new(),
            proxy: None,
            decals_hidden: false,
            store,
            product,
            config,
        })
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn product(&self) -> &ProductConfig {
        &self.product
    }

    pub fn store(&self) -> &LayerStore {
        &self.store
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn proxy(&self) -> Option<&InteractionProxy> {
        self.proxy.as_ref()
    }

    pub fn placement(&self) -> &PlacementController {
        &self.placement
    }

    pub fn dragging(&self) -> Option<LayerId> {
        self.drag.dragging_id()
    }

    pub fn decals_hidden(&self) -> bool {
        self.decals_hidden
    }

    /// Build the interaction proxy from the loaded model's sub-meshes
    pub fn set_target_meshes(&mut self, meshes: &[NamedMesh]) -> Result<(), MeshLoadError> {
        self.proxy = Some(InteractionProxy::from_product(meshes, &self.product)?);
        Ok(())
    }

    /// Load the product model through `source` and build the proxy
    pub async fn load_product(&mut self, source: &impl MeshSource) -> Result<(), MeshLoadError> {
        let meshes = source.load_meshes(&self.product.model_path).await?;
        self.set_target_meshes(&meshes)
    }

    /// Move the garment in the world
    pub fn set_proxy_transform(&mut self, world_from_local: Mat4) -> bool {
        match &mut self.proxy {
            Some(proxy) => proxy.set_transform(world_from_local),
            None => false,
        }
    }

    /// Handle one UI message
    pub fn handle(&mut self, message: UiToEngine, live: &mut impl LiveDecals) -> Vec<EngineToUi> {
        let before = self.marks();
        let mut events = Vec::new();

        let result = match message {
            UiToEngine::Pointer(event) => {
                self.handle_pointer(event);
                Ok(())
            }
            UiToEngine::LayerCommand(command) => self.handle_layer_command(command),
            UiToEngine::PlacementCommand(command) => self.handle_placement_command(command, live),
            UiToEngine::CameraMoved { position, target } => {
                self.camera
                    .set_pose(Vec3::from_array(position), Vec3::from_array(target));
                Ok(())
            }
        };

        if let Err(e) = result {
            warn!("Command failed: {}", e);
            events.push(EngineToUi::Error {
                code: e.code().to_string(),
                message: e.to_string(),
            });
        }
        events.extend(self.changes(before));
        events
    }

    /// Decode, handle and encode in one step for string transports
    pub fn handle_raw(
        &mut self,
        raw: &str,
        live: &mut impl LiveDecals,
    ) -> Result<Vec<String>, IpcError> {
        let message = decode_ui_message(raw)?;
        self.handle(message, live)
            .iter()
            .map(encode_engine_message)
            .collect()
    }

    /// Per-frame work: live drag visuals, ghost preview and the camera
    /// inside check.
    pub fn frame(&mut self, live: &mut impl LiveDecals) -> Vec<EngineToUi> {
        if let Some(proxy) = &self.proxy {
            self.drag.tick(&self.camera, proxy, &self.store, live);
        }
        self.placement
            .tick(&self.camera, self.proxy.as_ref(), &self.store, live);

        let hidden = self
            .proxy
            .as_ref()
            .is_some_and(|proxy| proxy.contains_world_point(self.camera.position));
        if hidden == self.decals_hidden {
            return Vec::new();
        }
        self.decals_hidden = hidden;
        debug!("Decals hidden: {}", hidden);
        vec![EngineToUi::DecalsHidden { hidden }]
    }

    /// Transforms of every visible layer, for (re)building decal meshes.
    /// Empty while the camera is inside the garment.
    pub fn decal_transforms(&self) -> Vec<(LayerId, DecalTransform)> {
        if self.decals_hidden {
            return Vec::new();
        }
        let depth = self.config.layers.decal_depth;
        self.store
            .layers()
            .iter()
            .enumerate()
            .filter(|(_, layer)| layer.visible)
            .map(|(index, layer)| (layer.id, decal_transform(layer, index, depth)))
            .collect()
    }

    pub fn decal_instances(&self) -> Vec<DecalInstance> {
        self.decal_transforms()
            .iter()
            .map(|(_, transform)| DecalInstance::from(transform))
            .collect()
    }

    pub fn save_design(&self) -> DesignDocument {
        DesignDocument::from_store(&self.store, Some(self.product.id.clone()))
    }

    /// Replace the session's layers with a saved design
    pub fn load_design(&mut self, document: DesignDocument) -> Vec<EngineToUi> {
        if let Some(product_id) = document.product_id.as_deref().filter(|id| *id != self.product.id) {
            warn!(
                "Design was made for {}, loading onto {}",
                product_id, self.product.id
            );
        }
        let before = self.marks();
        self.drag.cancel(&mut self.store);
        self.store.replace_all(document.layers);
        self.changes(before)
    }

    /// Composite the visible layers
    pub async fn export(
        &self,
        kind: ExportKind,
        loader: &impl ImageLoader,
    ) -> Result<Composite, ExportError> {
        export_composite(kind, self.store.layers(), loader, &self.config.export).await
    }

    /// Panel notification for a finished export
    pub fn export_event(result: &Result<Composite, ExportError>) -> EngineToUi {
        match result {
            Ok(composite) => EngineToUi::ExportFinished(composite.summary()),
            Err(e) => EngineToUi::Error {
                code: e.code().to_string(),
                message: e.to_string(),
            },
        }
    }

    fn handle_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down {
                button: MouseButton::Left,
                x,
                y,
            } => {
                let ndc = Vec2::new(x, y);
                self.drag.pointer_move(ndc);
                self.placement.pointer_move(ndc);
                let Some(proxy) = &self.proxy else {
                    return;
                };
                if self.store.placement().is_pending() {
                    self.placement
                        .confirm_at(ndc, &self.camera, proxy, &mut self.store);
                } else {
                    self.drag
                        .pointer_down(ndc, &self.camera, proxy, &mut self.store);
                }
            }
            PointerEvent::Down { .. } => {}
            PointerEvent::Move { x, y } => {
                let ndc = Vec2::new(x, y);
                self.drag.pointer_move(ndc);
                self.placement.pointer_move(ndc);
            }
            _ if event.ends_drag() => {
                if let Some(release) = self.drag.pointer_up(&mut self.store) {
                    debug!("Drag on {} ended by {:?}", release.id, event);
                }
            }
            _ => {}
        }
    }

    /// Pull a panel edit of position or scale back inside the product's print area
    fn constrain_to_print_area(&self, id: LayerId, transform: &mut LayerTransform) {
        let Some(area) = &self.product.print_area else {
            return;
        };
        if transform.position.is_none() && transform.scale.is_none() {
            return;
        }
        let Some(layer) = self.store.get(id) else {
            return;
        };

        let position = transform
            .position
            .filter(|position| position.is_finite())
            .unwrap_or(layer.position);
        let scale = transform
            .scale
            .filter(|scale| scale.is_finite() && *scale > 0.0)
            .unwrap_or(layer.scale);
        let clamped = clamp_layer_transform(position, scale, area);
        transform.position = Some(clamped.position);
        transform.scale = Some(clamped.scale);
    }

    fn handle_layer_command(&mut self, command: LayerCommand) -> Result<(), CommandError> {
        match command {
            LayerCommand::Add { source, kind } => {
                spawn_layer(
                    &mut self.store,
                    &self.camera,
                    self.proxy.as_ref(),
                    source.into(),
                    kind,
                );
            }
            LayerCommand::Remove { id } => {
                let id = parse_id(&id)?;
                if self.drag.dragging_id() == Some(id) {
                    self.drag.cancel(&mut self.store);
                }
                self.store
                    .remove_layer(id)
                    .ok_or(CommandError::UnknownLayer(id))?;
            }
            LayerCommand::UpdateTransform { id, patch } => {
                let id = parse_id(&id)?;
                let mut transform = LayerTransform::from(patch);
                transform.scale = transform
                    .scale
                    .map(|scale| self.config.layers.clamp_scale(scale));
                self.constrain_to_print_area(id, &mut transform);
                match self.store.update_transform(id, transform) {
                    UpdateOutcome::Applied | UpdateOutcome::Locked => {}
                    UpdateOutcome::Missing => return Err(CommandError::UnknownLayer(id)),
                }
            }
            LayerCommand::ToggleVisibility { id } => {
                let id = parse_id(&id)?;
                self.store
                    .toggle_visibility(id)
                    .ok_or(CommandError::UnknownLayer(id))?;
            }
            LayerCommand::ToggleLock { id } => {
                let id = parse_id(&id)?;
                self.store
                    .toggle_lock(id)
                    .ok_or(CommandError::UnknownLayer(id))?;
            }
            LayerCommand::SetActive { id } => {
                let id = id.as_deref().map(parse_id).transpose()?;
                self.store.set_active(id);
            }
        }
        Ok(())
    }

    fn handle_placement_command(
        &mut self,
        command: PlacementCommand,
        live: &mut impl LiveDecals,
    ) -> Result<(), CommandError> {
        match command {
            PlacementCommand::Begin { source, kind } => {
                self.store.set_pending(source.into(), kind);
            }
            PlacementCommand::Confirm { x, y } => {
                let proxy = self.proxy.as_ref().ok_or(CommandError::NoSurface)?;
                if self
                    .placement
                    .confirm_at(Vec2::new(x, y), &self.camera, proxy, &mut self.store)
                    .is_some()
                {
                    self.placement.clear(live);
                }
            }
            PlacementCommand::Cancel => {
                self.store.cancel_pending();
                self.placement.clear(live);
            }
        }
        Ok(())
    }

    fn marks(&self) -> Marks {
        Marks {
            revision: self.store.revision(),
            active: self.store.active(),
            dragging: self.store.dragging(),
            pending: self.store.placement().is_pending(),
        }
    }

    fn changes(&self, before: Marks) -> Vec<EngineToUi> {
        let after = self.marks();
        let mut events = Vec::new();
        if after.revision != before.revision {
            events.push(EngineToUi::LayersChanged {
                layers: self.store.snapshot(),
            });
        }
        if after.active != before.active {
            events.push(EngineToUi::SelectionChanged {
                active_id: after.active.map(|id| id.to_string()),
            });
        }
        if after.dragging != before.dragging {
            events.push(EngineToUi::DragStateChanged {
                dragging_id: after.dragging.map(|id| id.to_string()),
            });
        }
        if after.pending != before.pending {
            events.push(EngineToUi::PlacementChanged {
                pending: after.pending,
            });
        }
        events
    }
}

fn parse_id(id: &str) -> Result<LayerId, CommandError> {
    LayerId::parse(id).ok_or_else(|| CommandError::InvalidLayerId(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Layer, SourceRef};
    use atelier_ipc::{LayerKind, TransformPatch};

    #[derive(Default)]
    struct NullDecals;

    impl LiveDecals for NullDecals {
        fn set_live_transform(&mut self, _id: LayerId, _transform: &DecalTransform) {}
    }

    fn quad() -> NamedMesh {
        NamedMesh::new(
            "Object_2",
            vec![
                Vec3::new(-1.0, -1.0, 0.0),
                Vec3::new(1.0, -1.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(-1.0, 1.0, 0.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
        )
    }

    fn studio() -> Studio {
        let mut studio = Studio::new(StudioConfig::default()).unwrap();
        studio.set_target_meshes(&[quad()]).unwrap();
        studio
    }

    fn add(studio: &mut Studio, source: &str) -> LayerId {
        studio.handle(
            UiToEngine::LayerCommand(LayerCommand::Add {
                source: source.to_string(),
                kind: LayerKind::Image,
            }),
            &mut NullDecals,
        );
        studio.store().active().unwrap()
    }

    #[test]
    fn test_new_rejects_unknown_product() {
        let config = StudioConfig {
            active_product: "hoodie".to_string(),
            ..Default::default()
        };
        assert!(Studio::new(config).is_err());
    }

    #[test]
    fn test_add_emits_layers_and_selection() {
        let mut studio = studio();
        let events = studio.handle(
            UiToEngine::LayerCommand(LayerCommand::Add {
                source: "logo.png".to_string(),
                kind: LayerKind::Image,
            }),
            &mut NullDecals,
        );

        assert!(matches!(&events[0], EngineToUi::LayersChanged { layers } if layers.len() == 1));
        assert!(matches!(&events[1], EngineToUi::SelectionChanged { active_id: Some(_) }));
        // Spawned on the surface under the view center
        let layer = &studio.store().layers()[0];
        assert!(layer.normal.is_some());
    }

    #[test]
    fn test_update_transform_clamps_scale() {
        let mut studio = studio();
        let id = add(&mut studio, "logo.png");
        studio.handle(
            UiToEngine::LayerCommand(LayerCommand::UpdateTransform {
                id: id.to_string(),
                patch: TransformPatch {
                    scale: Some(2.0),
                    ..Default::default()
                },
            }),
            &mut NullDecals,
        );
        assert_eq!(studio.store().get(id).unwrap().scale, 0.5);
    }

    #[test]
    fn test_bad_ids_report_errors() {
        let mut studio = studio();
        let events = studio.handle(
            UiToEngine::LayerCommand(LayerCommand::Remove {
                id: "nope".to_string(),
            }),
            &mut NullDecals,
        );
        assert!(matches!(&events[..], [EngineToUi::Error { code, .. }] if code == "invalid_layer_id"));

        let events = studio.handle(
            UiToEngine::LayerCommand(LayerCommand::ToggleLock {
                id: LayerId::new().to_string(),
            }),
            &mut NullDecals,
        );
        assert!(matches!(&events[..], [EngineToUi::Error { code, .. }] if code == "unknown_layer"));
    }

    #[test]
    fn test_drag_through_messages() {
        let mut studio = studio();
        let id = add(&mut studio, "logo.png");

        let events = studio.handle(
            UiToEngine::Pointer(PointerEvent::Down {
                button: MouseButton::Left,
                x: 0.0,
                y: 0.0,
            }),
            &mut NullDecals,
        );
        assert!(events.contains(&EngineToUi::DragStateChanged {
            dragging_id: Some(id.to_string())
        }));

        studio.handle(
            UiToEngine::Pointer(PointerEvent::Move { x: 0.2, y: 0.1 }),
            &mut NullDecals,
        );
        assert!(studio.frame(&mut NullDecals).is_empty());

        let events = studio.handle(UiToEngine::Pointer(PointerEvent::Blur), &mut NullDecals);
        assert!(matches!(&events[0], EngineToUi::LayersChanged { .. }));
        assert!(events.contains(&EngineToUi::DragStateChanged { dragging_id: None }));
        assert!(studio.store().get(id).unwrap().position.x > 0.0);
    }

    #[test]
    fn test_right_button_does_not_drag() {
        let mut studio = studio();
        add(&mut studio, "logo.png");
        studio.handle(
            UiToEngine::Pointer(PointerEvent::Down {
                button: MouseButton::Right,
                x: 0.0,
                y: 0.0,
            }),
            &mut NullDecals,
        );
        assert_eq!(studio.dragging(), None);
    }

    #[test]
    fn test_placement_flow() {
        let mut studio = studio();
        let events = studio.handle(
            UiToEngine::PlacementCommand(PlacementCommand::Begin {
                source: "logo.png".to_string(),
                kind: LayerKind::Image,
            }),
            &mut NullDecals,
        );
        assert_eq!(events, vec![EngineToUi::PlacementChanged { pending: true }]);

        // A click on the garment places the layer instead of dragging
        let events = studio.handle(
            UiToEngine::Pointer(PointerEvent::Down {
                button: MouseButton::Left,
                x: 0.1,
                y: 0.1,
            }),
            &mut NullDecals,
        );
        assert!(events.contains(&EngineToUi::PlacementChanged { pending: false }));
        assert_eq!(studio.store().len(), 1);
        assert_eq!(studio.dragging(), None);
    }

    #[test]
    fn test_confirm_without_surface() {
        let mut studio = Studio::new(StudioConfig::default()).unwrap();
        studio.handle(
            UiToEngine::PlacementCommand(PlacementCommand::Begin {
                source: "logo.png".to_string(),
                kind: LayerKind::Image,
            }),
            &mut NullDecals,
        );
        let events = studio.handle(
            UiToEngine::PlacementCommand(PlacementCommand::Confirm { x: 0.0, y: 0.0 }),
            &mut NullDecals,
        );
        assert!(matches!(&events[..], [EngineToUi::Error { code, .. }] if code == "no_surface"));
    }

    #[test]
    fn test_camera_inside_hides_decals() {
        let mut studio = studio();
        add(&mut studio, "logo.png");
        assert_eq!(studio.decal_transforms().len(), 1);

        studio.handle(
            UiToEngine::CameraMoved {
                position: [0.0, 0.0, 0.0],
                target: [0.0, 0.0, -1.0],
            },
            &mut NullDecals,
        );
        assert_eq!(
            studio.frame(&mut NullDecals),
            vec![EngineToUi::DecalsHidden { hidden: true }]
        );
        assert!(studio.decal_transforms().is_empty());

        studio.camera_mut().set_pose(Vec3::new(0.0, 0.0, 1.5), Vec3::ZERO);
        assert_eq!(
            studio.frame(&mut NullDecals),
            vec![EngineToUi::DecalsHidden { hidden: false }]
        );
    }

    #[test]
    fn test_hidden_layers_skip_decals() {
        let mut studio = studio();
        let a = add(&mut studio, "a.png");
        add(&mut studio, "b.png");
        studio.handle(
            UiToEngine::LayerCommand(LayerCommand::ToggleVisibility { id: a.to_string() }),
            &mut NullDecals,
        );

        let transforms = studio.decal_transforms();
        assert_eq!(transforms.len(), 1);
        // Depth bias follows z-order index, not visible index
        assert_eq!(transforms[0].1.depth_bias, -2.0);
        assert_eq!(studio.decal_instances().len(), 1);
    }

    #[test]
    fn test_design_roundtrip_through_session() {
        let mut studio = studio();
        add(&mut studio, "a.png");
        add(&mut studio, "b.png");
        let saved = studio.save_design();
        assert_eq!(saved.product_id.as_deref(), Some("tshirt-classic"));

        let mut other = Studio::new(StudioConfig::default()).unwrap();
        let events = other.load_design(saved.clone());
        assert!(matches!(&events[0], EngineToUi::LayersChanged { layers } if layers.len() == 2));
        assert_eq!(other.store().layers(), studio.store().layers());
    }

    #[test]
    fn test_handle_raw() {
        let mut studio = studio();
        let replies = studio
            .handle_raw(
                r#"{"type":"PlacementCommand","data":{"Begin":{"source":"a.png","kind":"image"}}}"#,
                &mut NullDecals,
            )
            .unwrap();
        assert_eq!(replies, vec![r#"{"type":"PlacementChanged","data":{"pending":true}}"#]);
        assert!(studio.handle_raw("", &mut NullDecals).is_err());
    }

    fn chest_studio() -> Studio {
        let mut config = StudioConfig::default();
        config.products[0].print_area = Some(atelier_config::PrintArea {
            min_x: -0.2,
            max_x: 0.2,
            min_y: -0.1,
            max_y: 0.3,
            max_scale: 0.3,
        });
        let mut studio = Studio::new(config).unwrap();
        studio.set_target_meshes(&[quad()]).unwrap();
        studio
    }

    fn update(studio: &mut Studio, id: LayerId, patch: TransformPatch) {
        studio.handle(
            UiToEngine::LayerCommand(LayerCommand::UpdateTransform {
                id: id.to_string(),
                patch,
            }),
            &mut NullDecals,
        );
    }

    #[test]
    fn test_new_rejects_inverted_scale_limits() {
        let mut config = StudioConfig::default();
        config.layers.min_scale = 0.6;
        assert!(matches!(
            Studio::new(config),
            Err(ConfigError::InvalidLayerDefaults(_))
        ));
    }

    #[test]
    fn test_panel_edits_stay_inside_print_area() {
        let mut studio = chest_studio();
        let id = add(&mut studio, "logo.png");

        update(
            &mut studio,
            id,
            TransformPatch {
                position: Some([0.9, 0.1, 0.0]),
                ..Default::default()
            },
        );
        let layer = studio.store().get(id).unwrap();
        assert!((layer.position.x - 0.1).abs() < 1e-6);
        assert!((layer.position.y - 0.1).abs() < 1e-6);

        // A larger decal caps at the area limit and moves further in
        update(
            &mut studio,
            id,
            TransformPatch {
                scale: Some(0.45),
                ..Default::default()
            },
        );
        let layer = studio.store().get(id).unwrap();
        assert!((layer.scale - 0.3).abs() < 1e-6);
        assert!((layer.position.x - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_drag_commit_stays_inside_print_area() {
        let mut studio = chest_studio();
        let id = add(&mut studio, "logo.png");

        studio.handle(
            UiToEngine::Pointer(PointerEvent::Down {
                button: MouseButton::Left,
                x: 0.0,
                y: 0.0,
            }),
            &mut NullDecals,
        );
        studio.handle(
            UiToEngine::Pointer(PointerEvent::Move { x: 0.5, y: -0.5 }),
            &mut NullDecals,
        );
        studio.frame(&mut NullDecals);
        studio.handle(
            UiToEngine::Pointer(PointerEvent::Up {
                button: MouseButton::Left,
                x: 0.5,
                y: -0.5,
            }),
            &mut NullDecals,
        );

        // Lower right of the quad, pulled back to the area corner
        let layer = studio.store().get(id).unwrap();
        assert!((layer.position.x - 0.1).abs() < 1e-6);
        assert!(layer.position.y.abs() < 1e-6);
    }

    #[test]
    fn test_leave_and_other_buttons_end_drag() {
        let mut studio = studio();
        add(&mut studio, "logo.png");
        let grab = PointerEvent::Down {
            button: MouseButton::Left,
            x: 0.0,
            y: 0.0,
        };

        studio.handle(UiToEngine::Pointer(grab), &mut NullDecals);
        assert!(studio.dragging().is_some());
        let events = studio.handle(UiToEngine::Pointer(PointerEvent::Leave), &mut NullDecals);
        assert!(events.contains(&EngineToUi::DragStateChanged { dragging_id: None }));

        studio.handle(UiToEngine::Pointer(grab), &mut NullDecals);
        studio.handle(
            UiToEngine::Pointer(PointerEvent::Up {
                button: MouseButton::Right,
                x: 0.0,
                y: 0.0,
            }),
            &mut NullDecals,
        );
        assert_eq!(studio.dragging(), None);
    }

    #[test]
    fn test_load_design_drops_unusable_scale() {
        let mut studio = studio();
        let good = Layer::new(SourceRef::from("a.png"), LayerKind::Image, Vec3::ZERO, 0.2);
        let bad = Layer::new(SourceRef::from("b.png"), LayerKind::Image, Vec3::ZERO, -0.5);
        let document = DesignDocument::new(None, vec![good.clone(), bad]);

        studio.load_design(document);
        assert_eq!(studio.store().layers().len(), 1);
        assert_eq!(studio.store().layers()[0].id, good.id);
        assert!(studio.store().layers().iter().all(|layer| layer.scale > 0.0));
    }
}
