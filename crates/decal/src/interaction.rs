//! Interaction proxy: the printable part of the garment as one mesh.
//!
//! Garment models arrive as several named sub-meshes (body panels, sleeves,
//! collar, seams). Only the sub-meshes on the product's allow-list are
//! merged, with their node transforms baked in, into a single
//! [`CollisionMesh`]. Picking runs against this proxy and decal positions
//! are stored in its local frame.

use atelier_config::ProductConfig;
use glam::{Mat3, Mat4, Vec3};
use tracing::{info, warn};

use crate::error::MeshLoadError;
use crate::raycast::CollisionMesh;

/// One named sub-mesh of a loaded model
#[derive(Debug, Clone, PartialEq)]
pub struct NamedMesh {
    pub name: String,
    pub positions: Vec<Vec3>,
    /// Triangle list indices. Empty means the positions are a triangle list.
    pub indices: Vec<u32>,
    /// Node transform relative to the model root
    pub transform: Mat4,
}

impl NamedMesh {
    pub fn new(name: impl Into<String>, positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            positions,
            indices,
            transform: Mat4::IDENTITY,
        }
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    /// Triangle indices, generated for non-indexed meshes. `None` when the
    /// index data cannot describe triangles over these positions.
    fn triangle_indices(&self) -> Option<Vec<u32>> {
        let indices: Vec<u32> = if self.indices.is_empty() {
            (0..self.positions.len() as u32).collect()
        } else {
            self.indices.clone()
        };
        let count = self.positions.len() as u32;
        if indices.len() % 3 != 0 || indices.iter().any(|&i| i >= count) {
            return None;
        }
        Some(indices)
    }
}

/// Loads the sub-meshes of a garment model
#[allow(async_fn_in_trait)]
pub trait MeshSource {
    async fn load_meshes(&self, model_path: &str) -> Result<Vec<NamedMesh>, MeshLoadError>;
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Bounds of this box after an affine transform
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        let corners = (0..8).map(|i| {
            let pick = |bit: usize, lo: f32, hi: f32| if i & bit == 0 { lo } else { hi };
            matrix.transform_point3(Vec3::new(
                pick(1, self.min.x, self.max.x),
                pick(2, self.min.y, self.max.y),
                pick(4, self.min.z, self.max.z),
            ))
        });
        // Eight corners, never empty
        Self::from_points(corners).unwrap_or(*self)
    }
}

/// Merged, pickable garment surface
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionProxy {
    mesh: CollisionMesh,
    bounds: Aabb,
    world_from_local: Mat4,
    local_from_world: Mat4,
}

impl InteractionProxy {
    /// Merge the allow-listed sub-meshes of a product.
    pub fn from_product(meshes: &[NamedMesh], product: &ProductConfig) -> Result<Self, MeshLoadError> {
        Self::merge(meshes.iter().filter(|m| product.is_target_mesh(&m.name)))
            .ok_or_else(|| MeshLoadError::NoTargetMeshes(product.model_path.clone()))
    }

    /// Merge meshes with their transforms baked. Meshes with broken index
    /// data are skipped. Returns `None` if nothing usable remains.
    pub fn merge<'a>(meshes: impl IntoIterator<Item = &'a NamedMesh>) -> Option<Self> {
        let mut merged = CollisionMesh::default();
        let mut names = Vec::new();

        for mesh in meshes {
            let Some(indices) = mesh.triangle_indices() else {
                warn!("Skipping mesh {} with invalid index data", mesh.name);
                continue;
            };
            merged.append(
                mesh.positions.iter().map(|p| mesh.transform.transform_point3(*p)),
                &indices,
            );
            names.push(mesh.name.as_str());
        }

        if merged.is_empty() {
            return None;
        }
        let bounds = Aabb::from_points(merged.positions.iter().copied())?;
        info!(
            "Interaction proxy from [{}]: {} triangles",
            names.join(", "),
            merged.triangle_count()
        );

        Some(Self {
            mesh: merged,
            bounds,
            world_from_local: Mat4::IDENTITY,
            local_from_world: Mat4::IDENTITY,
        })
    }

    pub fn mesh(&self) -> &CollisionMesh {
        &self.mesh
    }

    /// Bounds in the proxy's local frame
    pub fn local_bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn world_bounds(&self) -> Aabb {
        self.bounds.transformed(&self.world_from_local)
    }

    pub fn world_from_local(&self) -> Mat4 {
        self.world_from_local
    }

    pub fn local_from_world(&self) -> Mat4 {
        self.local_from_world
    }

    /// Place the garment in the world. Singular transforms are rejected.
    pub fn set_transform(&mut self, world_from_local: Mat4) -> bool {
        if world_from_local.determinant().abs() < f32::EPSILON {
            warn!("Ignoring singular proxy transform");
            return false;
        }
        self.world_from_local = world_from_local;
        self.local_from_world = world_from_local.inverse();
        true
    }

    /// Maps local normals to world normals (inverse transpose)
    pub fn normal_matrix(&self) -> Mat3 {
        Mat3::from_mat4(self.local_from_world).transpose()
    }

    /// Whether a world-space point is inside the garment bounds
    pub fn contains_world_point(&self, point: Vec3) -> bool {
        self.bounds.contains(self.local_from_world.transform_point3(point))
    }
}
