/// Camera snapshot: position, look-at target and viewport size
use nalgebra::{Point2, Point3, Vector3};

use crate::math::{rotation, WORLD_UP};

/// Viewport size in pixels (or character cells for the terminal host).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point2<f64> {
        Point2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// An immutable camera value.
///
/// Moving the camera always produces a new `Camera`; nothing mutates one in
/// place, so a frame can hold on to its snapshot while the next one is built.
/// `position == target` is allowed but degenerate: the projection falls back
/// to identity rotation and unit scale for it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Point3<f64>,
    pub target: Point3<f64>,
    pub viewport: Viewport,
}

impl Camera {
    pub fn new(position: Point3<f64>, target: Point3<f64>, viewport: Viewport) -> Self {
        Self {
            position,
            target,
            viewport,
        }
    }

    /// Place the camera at `target + offset`.
    pub fn framing(target: Point3<f64>, offset: Vector3<f64>, viewport: Viewport) -> Self {
        Self::new(target + offset, target, viewport)
    }

    pub fn with_position(&self, position: Point3<f64>) -> Self {
        Self { position, ..*self }
    }

    pub fn with_target(&self, target: Point3<f64>) -> Self {
        Self { target, ..*self }
    }

    pub fn with_viewport(&self, viewport: Viewport) -> Self {
        Self { viewport, ..*self }
    }

    /// Vector from the camera to the look-at target.
    pub fn look(&self) -> Vector3<f64> {
        self.target - self.position
    }

    pub fn distance(&self) -> f64 {
        self.look().norm()
    }

    pub fn is_degenerate(&self) -> bool {
        self.look().norm_squared() < crate::math::DIRECTION_EPSILON
    }

    /// Rotate the position around the vertical axis through the target.
    pub fn orbit(&self, angle: f64) -> Self {
        let offset = self.position - self.target;
        let position = self.target + rotation(&WORLD_UP, angle) * offset;
        self.with_position(position)
    }

    /// Scale the camera's distance from the target by `factor`.
    pub fn zoom(&self, factor: f64) -> Self {
        let offset = self.position - self.target;
        self.with_position(self.target + offset * factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn camera() -> Camera {
        Camera::framing(
            Point3::new(149_500.0, 168_462.9, 80.0),
            Vector3::new(0.0, -100.0, 100.0),
            Viewport::new(800.0, 600.0),
        )
    }

    #[test]
    fn test_camera_creation() {
        let camera = camera();
        assert!((camera.position - Point3::new(149_500.0, 168_362.9, 180.0)).norm() < 1e-6);
        assert!((camera.distance() - 100.0 * 2f64.sqrt()).abs() < 1e-6);
        assert_eq!(camera.viewport.center(), Point2::new(400.0, 300.0));
        assert!(!camera.is_degenerate());
    }

    #[test]
    fn test_orbit_returns_new_camera_at_same_distance() {
        let camera = camera();
        let moved = camera.orbit(PI / 2.0);

        assert_ne!(moved.position, camera.position);
        assert_eq!(moved.target, camera.target);
        assert!((moved.distance() - camera.distance()).abs() < 1e-6);
        // height is preserved by a rotation about the vertical axis
        assert!((moved.position.z - camera.position.z).abs() < 1e-9);
        // south of the target rotates to east of it
        assert!((moved.position.x - (camera.target.x + 100.0)).abs() < 1e-6);
    }

    #[test]
    fn test_full_orbit_returns_home() {
        let camera = camera();
        let mut moved = camera;
        for _ in 0..600 {
            moved = moved.orbit((0.6f64).to_radians());
        }
        assert!((moved.position - camera.position).norm() < 1e-6);
    }

    #[test]
    fn test_zoom_scales_distance() {
        let camera = camera();
        let closer = camera.zoom(0.5);
        assert!((closer.distance() - camera.distance() / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_camera() {
        let target = Point3::new(1.0, 2.0, 3.0);
        let camera = Camera::new(target, target, Viewport::new(10.0, 10.0));
        assert!(camera.is_degenerate());
        assert_eq!(camera.orbit(1.0), camera);
    }
}
