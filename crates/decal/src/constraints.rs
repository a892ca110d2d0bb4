use glam::Vec3;

pub use atelier_config::PrintArea;

/// Position and scale after clamping into a [`PrintArea`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClampedTransform {
    pub position: Vec3,
    pub scale: f32,
}

/// Keep a decal's square footprint inside the print area.
///
/// Scale is capped first so the footprint is known, then the center is
/// limited to where both edges stay inside. Z is left alone. When the area
/// is narrower than the decal the center pins to the lower limit.
pub fn clamp_layer_transform(position: Vec3, scale: f32, area: &PrintArea) -> ClampedTransform {
    let scale = scale.min(area.max_scale);
    let half = scale / 2.0;

    let x = (area.min_x + half).max(position.x.min(area.max_x - half));
    let y = (area.min_y + half).max(position.y.min(area.max_y - half));

    ClampedTransform {
        position: Vec3::new(x, y, position.z),
        scale,
    }
}

/// Printed edge length in centimeters (1 scene unit = 1 m), one decimal.
pub fn print_size_cm(scale: f32) -> (f32, f32) {
    let size = (scale * 1000.0).round() / 10.0;
    (size, size)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHEST: PrintArea = PrintArea {
        min_x: -0.2,
        max_x: 0.2,
        min_y: -0.1,
        max_y: 0.3,
        max_scale: 0.3,
    };

    #[test]
    fn test_inside_is_unchanged() {
        let clamped = clamp_layer_transform(Vec3::new(0.0, 0.1, 0.15), 0.1, &CHEST);
        assert_eq!(clamped.position, Vec3::new(0.0, 0.1, 0.15));
        assert_eq!(clamped.scale, 0.1);
    }

    #[test]
    fn test_edges_pulled_inside() {
        let clamped = clamp_layer_transform(Vec3::new(0.5, -0.5, 0.2), 0.1, &CHEST);
        assert!((clamped.position.x - 0.15).abs() < 1e-6);
        assert!((clamped.position.y - -0.05).abs() < 1e-6);
        assert_eq!(clamped.position.z, 0.2);
    }

    #[test]
    fn test_scale_capped_before_position() {
        let clamped = clamp_layer_transform(Vec3::new(0.2, 0.0, 0.0), 0.8, &CHEST);
        assert_eq!(clamped.scale, 0.3);
        assert!((clamped.position.x - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_area_smaller_than_decal() {
        let narrow = PrintArea {
            min_x: 0.0,
            max_x: 0.1,
            ..CHEST
        };
        let clamped = clamp_layer_transform(Vec3::new(0.05, 0.1, 0.0), 0.3, &narrow);
        assert!((clamped.position.x - 0.15).abs() < 1e-6);
    }

    #[test]
    fn test_print_size_cm() {
        assert_eq!(print_size_cm(0.15), (15.0, 15.0));
        assert_eq!(print_size_cm(0.2), (20.0, 20.0));
        assert_eq!(print_size_cm(0.1234), (12.3, 12.3));
    }
}
