/// Camera-to-viewport projection with roll stabilization
use std::f64::consts::PI;

use nalgebra::{Point2, Point3, Rotation2, Rotation3, Vector2, Vector3};

use crate::camera::Camera;
use crate::geometry::Ring;
use crate::math::{
    angle_between, rotation, signed_angle_2d, DIRECTION_EPSILON, FORWARD, SCREEN_UP, WORLD_UP,
};

/// Distance above the target of the point used to pin screen "up".
pub const DEFAULT_ROLL_REFERENCE_OFFSET: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionSettings {
    pub roll_reference_offset: f64,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            roll_reference_offset: DEFAULT_ROLL_REFERENCE_OFFSET,
        }
    }
}

/// Hooks into the intermediate stages of [`ProjectionTransform::project_observed`].
pub trait ProjectionObserver {
    /// Point in the camera frame, after translation and orientation.
    fn after_rotation(&mut self, _world: &Point3<f64>, _oriented: &Vector3<f64>) {}

    /// Flattened point after roll correction, before scaling.
    fn after_roll(&mut self, _world: &Point3<f64>, _rolled: &Vector2<f64>) {}
}

/// Observer that forwards every stage to `log::trace!`.
#[derive(Debug, Default)]
pub struct TraceObserver;

impl ProjectionObserver for TraceObserver {
    fn after_rotation(&mut self, world: &Point3<f64>, oriented: &Vector3<f64>) {
        log::trace!("rotate {world:?} -> {oriented:?}");
    }

    fn after_roll(&mut self, world: &Point3<f64>, rolled: &Vector2<f64>) {
        log::trace!("roll {world:?} -> {rolled:?}");
    }
}

struct Unobserved;

impl ProjectionObserver for Unobserved {}

/// World-to-viewport mapping for one camera snapshot.
///
/// Everything is computed once from the camera; [`project`](Self::project)
/// is then a pure function of its input.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionTransform {
    camera: Camera,
    orientation: Rotation3<f64>,
    roll: Rotation2<f64>,
    scale: f64,
    center: Vector2<f64>,
}

/// Build the projection for `camera` with default settings.
pub fn build_transform(camera: &Camera) -> ProjectionTransform {
    ProjectionTransform::with_settings(camera, ProjectionSettings::default())
}

impl ProjectionTransform {
    pub fn new(camera: &Camera) -> Self {
        build_transform(camera)
    }

    pub fn with_settings(camera: &Camera, settings: ProjectionSettings) -> Self {
        let orientation = orientation_towards(&camera.look());

        // The orientation alone leaves the roll around the view axis free.
        // Pin it by making a point straight above the target render straight
        // above the screen center.
        let reference = camera.target + WORLD_UP * settings.roll_reference_offset;
        let oriented = orientation * (reference - camera.position);
        let flattened = Vector2::new(oriented.x, oriented.y);
        let roll = Rotation2::new(signed_angle_2d(&flattened, &SCREEN_UP));

        let distance = camera.distance();
        let scale = if distance * distance < DIRECTION_EPSILON {
            1.0
        } else {
            camera.viewport.width / distance
        };

        log::debug!(
            "projection for camera at {:?}: roll {:.4} rad, scale {:.4}",
            camera.position,
            roll.angle(),
            scale
        );

        Self {
            camera: *camera,
            orientation,
            roll,
            scale,
            center: camera.viewport.center().coords,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Viewport units per world unit.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn project(&self, point: &Point3<f64>) -> Point2<f64> {
        self.project_observed(point, &mut Unobserved)
    }

    pub fn project_observed(
        &self,
        point: &Point3<f64>,
        observer: &mut dyn ProjectionObserver,
    ) -> Point2<f64> {
        let oriented = self.orientation * (point - self.camera.position);
        observer.after_rotation(point, &oriented);

        let rolled = self.roll * Vector2::new(oriented.x, oriented.y);
        observer.after_roll(point, &rolled);

        Point2::from(rolled * self.scale + self.center)
    }

    pub fn project_ring(&self, ring: &Ring) -> Vec<Point2<f64>> {
        ring.iter().map(|p| self.project(p)).collect()
    }
}

/// Rotation taking the direction `look` onto [`FORWARD`].
fn orientation_towards(look: &Vector3<f64>) -> Rotation3<f64> {
    if look.norm_squared() < DIRECTION_EPSILON {
        return Rotation3::identity();
    }

    let direction = look.normalize();
    let axis = direction.cross(&FORWARD);
    let angle = angle_between(&direction, &FORWARD);
    if axis.norm_squared() < DIRECTION_EPSILON && angle > PI / 2.0 {
        // Looking against the forward axis: any half turn about a
        // perpendicular axis works, identity would mirror the view.
        return rotation(&Vector3::x(), PI);
    }
    rotation(&axis, angle)
}
