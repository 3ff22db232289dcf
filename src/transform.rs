// src/transform.rs
// Mapping between physical simulation coordinates and surface pixels.
// The pivot sits at the centre of the surface, the half-width spans `limit` physical units,
// and y is flipped because physical "up" is towards smaller pixel rows.

use crate::viewport::Viewport;

/// A point in surface pixel coordinates.
pub type ScreenPoint = (f64, f64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransform {
    pub scale: f64,          // Pixels per physical unit
    pub origin: ScreenPoint, // Pixel position of the pivot
}

impl CoordinateTransform {
    /// `scale = (w / 2) / limit`, `origin = (w / 2, h / 2)`.
    pub fn for_viewport(viewport: Viewport, limit: f64) -> Self {
        let w = viewport.width as f64;
        let h = viewport.height as f64;
        Self {
            scale: (w / 2.0) / limit,
            origin: (w / 2.0, h / 2.0),
        }
    }

    pub fn physical_to_screen(&self, (x, y): (f64, f64)) -> ScreenPoint {
        (x * self.scale + self.origin.0, -y * self.scale + self.origin.1)
    }

    pub fn screen_to_physical(&self, (sx, sy): ScreenPoint) -> (f64, f64) {
        ((sx - self.origin.0) / self.scale, -(sy - self.origin.1) / self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_point() {
        let transform = CoordinateTransform::for_viewport(Viewport::square(400), 2.0);
        assert_eq!(transform.scale, 100.0);
        assert_eq!(transform.origin, (200.0, 200.0));
        assert_eq!(transform.physical_to_screen((1.0, -2.0)), (300.0, 400.0));
    }

    #[test]
    fn test_pivot_maps_to_origin() {
        let transform = CoordinateTransform::for_viewport(Viewport::square(500), 2.5);
        assert_eq!(transform.physical_to_screen((0.0, 0.0)), (250.0, 250.0));
    }

    #[test]
    fn test_round_trip_within_tolerance() {
        let transform = CoordinateTransform::for_viewport(Viewport::square(733), 3.7);
        for &p in &[(0.3, -1.9), (-3.7, 3.7), (1e-6, -2.25), (0.0, 0.0)] {
            let back = transform.screen_to_physical(transform.physical_to_screen(p));
            assert!((back.0 - p.0).abs() < 1e-9 && (back.1 - p.1).abs() < 1e-9);
        }
    }
}
