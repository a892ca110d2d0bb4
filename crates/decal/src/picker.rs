use glam::Vec3;

use crate::constants::GRAB_RADIUS_FACTOR;
use crate::interaction::InteractionProxy;
use crate::raycast::raycast_mesh;
use crate::types::{Layer, Ray};

/// A resolved point on the garment surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePick {
    pub world_point: Vec3,
    /// Hit point in the proxy's local frame (what layers store)
    pub local_point: Vec3,
    /// Unit face normal in the proxy's local frame
    pub local_normal: Vec3,
    /// Unit face normal in world space
    pub world_normal: Vec3,
    pub triangle: usize,
    /// World distance from the ray origin
    pub distance: f32,
}

/// Intersect a world-space ray with the interaction proxy.
///
/// Returns `None` on a miss; callers keep whatever state they had.
pub fn pick_surface(ray: &Ray, proxy: &InteractionProxy) -> Option<SurfacePick> {
    let local_ray = ray.transformed(&proxy.local_from_world());
    let hit = raycast_mesh(&local_ray, proxy.mesh())?;

    let world_point = proxy.world_from_local().transform_point3(hit.point);
    let world_normal = (proxy.normal_matrix() * hit.face_normal).normalize_or_zero();

    Some(SurfacePick {
        world_point,
        local_point: hit.point,
        local_normal: hit.face_normal,
        world_normal: if world_normal == Vec3::ZERO {
            hit.face_normal
        } else {
            world_normal
        },
        triangle: hit.triangle,
        distance: world_point.distance(ray.origin),
    })
}

/// Visible, unlocked layer whose position is nearest to `point`. Ties go to
/// the earlier layer.
pub fn find_nearest(point: Vec3, layers: &[Layer]) -> Option<&Layer> {
    nearest_by(point, layers.iter().filter(|layer| is_grabbable(layer)))
}

/// Layer a pointer-down at `point` grabs: the nearest visible, unlocked
/// layer within reach of its own footprint.
pub fn find_grab_target(point: Vec3, layers: &[Layer]) -> Option<&Layer> {
    nearest_by(
        point,
        layers.iter().filter(|layer| {
            is_grabbable(layer) && layer.position.distance(point) <= layer.scale * GRAB_RADIUS_FACTOR
        }),
    )
}

fn is_grabbable(layer: &Layer) -> bool {
    layer.visible && !layer.locked
}

fn nearest_by<'a>(point: Vec3, layers: impl Iterator<Item = &'a Layer>) -> Option<&'a Layer> {
    let mut best: Option<(&Layer, f32)> = None;
    for layer in layers {
        let distance = layer.position.distance_squared(point);
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((layer, distance));
        }
    }
    best.map(|(layer, _)| layer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::NamedMesh;
    use crate::types::SourceRef;
    use atelier_ipc::LayerKind;
    use glam::Mat4;

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

    fn layer_at(position: Vec3) -> Layer {
        Layer::new(SourceRef::from("a.png"), LayerKind::Image, position, 0.2)
    }

    #[test]
    fn test_pick_surface_hit() {
        let proxy = plane_proxy();
        let ray = Ray::new(Vec3::new(0.3, -0.2, 2.0), Vec3::NEG_Z);
        let pick = pick_surface(&ray, &proxy).unwrap();

        assert!((pick.world_point - Vec3::new(0.3, -0.2, 0.0)).length() < 1e-5);
        assert_eq!(pick.world_point, pick.local_point);
        assert!((pick.world_normal - Vec3::Z).length() < 1e-5);
        assert!((pick.distance - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_pick_surface_miss() {
        let proxy = plane_proxy();
        let ray = Ray::new(Vec3::new(3.0, 0.0, 2.0), Vec3::NEG_Z);
        assert!(pick_surface(&ray, &proxy).is_none());
    }

    #[test]
    fn test_pick_surface_transformed_proxy() {
        let mut proxy = plane_proxy();
        proxy.set_transform(
            Mat4::from_translation(Vec3::new(0.0, 0.0, -1.0))
                * Mat4::from_rotation_y(std::f32::consts::FRAC_PI_2),
        );

        // Local +Z now faces world +X; the plane sits at x = 0, z = -1
        let ray = Ray::new(Vec3::new(2.0, 0.1, -1.2), Vec3::NEG_X);
        let pick = pick_surface(&ray, &proxy).unwrap();
        assert!((pick.world_point - Vec3::new(0.0, 0.1, -1.2)).length() < 1e-4);
        assert!((pick.world_normal - Vec3::X).length() < 1e-4);
        assert!((pick.local_normal - Vec3::Z).length() < 1e-4);
        // Local point: undo translation, then rotate back
        assert!((pick.local_point - Vec3::new(0.2, 0.1, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_find_nearest_tie_goes_to_first() {
        let layers = vec![
            layer_at(Vec3::new(-1.0, 0.0, 0.0)),
            layer_at(Vec3::new(1.0, 0.0, 0.0)),
            layer_at(Vec3::new(0.0, 3.0, 0.0)),
        ];
        let nearest = find_nearest(Vec3::ZERO, &layers).unwrap();
        assert_eq!(nearest.id, layers[0].id);

        let nearest = find_nearest(Vec3::new(0.0, 2.0, 0.0), &layers).unwrap();
        assert_eq!(nearest.id, layers[2].id);

        assert!(find_nearest(Vec3::ZERO, &[]).is_none());
    }

    #[test]
    fn test_find_nearest_skips_locked_and_hidden() {
        let mut layers = vec![
            layer_at(Vec3::ZERO),
            layer_at(Vec3::new(0.01, 0.0, 0.0)),
            layer_at(Vec3::new(5.0, 0.0, 0.0)),
        ];
        layers[0].locked = true;
        layers[1].visible = false;

        let nearest = find_nearest(Vec3::ZERO, &layers).unwrap();
        assert_eq!(nearest.id, layers[2].id);

        layers[2].locked = true;
        assert!(find_nearest(Vec3::ZERO, &layers).is_none());
    }

    #[test]
    fn test_grab_target_respects_reach_and_flags() {
        let mut layers = vec![layer_at(Vec3::ZERO), layer_at(Vec3::new(0.5, 0.0, 0.0))];

        // Within 0.75 * 0.2 of the first layer
        let grabbed = find_grab_target(Vec3::new(0.1, 0.0, 0.0), &layers).unwrap();
        assert_eq!(grabbed.id, layers[0].id);

        // Between the two, out of reach of both
        assert!(find_grab_target(Vec3::new(0.25, 0.0, 0.0), &layers).is_none());

        layers[0].locked = true;
        assert!(find_grab_target(Vec3::new(0.1, 0.0, 0.0), &layers).is_none());

        layers[1].visible = false;
        assert!(find_grab_target(Vec3::new(0.5, 0.0, 0.0), &layers).is_none());
    }
}
