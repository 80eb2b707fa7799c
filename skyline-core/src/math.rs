/// Vector and rotation primitives shared by the projection and depth code
use nalgebra::{Rotation2, Rotation3, SVector, Unit, Vector2, Vector3};

/// Squared lengths below this are treated as having no direction.
pub const DIRECTION_EPSILON: f64 = 1e-12;

/// Canonical forward axis the camera's look direction is rotated onto.
pub const FORWARD: Vector3<f64> = Vector3::new(0.0, 0.0, 1.0);

/// World vertical axis (map x/y on the ground, z up).
pub const WORLD_UP: Vector3<f64> = Vector3::new(0.0, 0.0, 1.0);

/// "Up" on screen; viewport y grows downwards.
pub const SCREEN_UP: Vector2<f64> = Vector2::new(0.0, -1.0);

/// Unsigned angle in `[0, π]` between two vectors of any dimension.
///
/// A zero-length input has no direction and yields `0.0`. The cosine is
/// clamped before `acos` so nearly (anti)parallel inputs never produce NaN.
pub fn angle_between<const D: usize>(a: &SVector<f64, D>, b: &SVector<f64, D>) -> f64 {
    let la = a.norm_squared();
    let lb = b.norm_squared();
    if la < DIRECTION_EPSILON || lb < DIRECTION_EPSILON {
        return 0.0;
    }

    let cosine = (a.dot(b) / (la * lb).sqrt()).clamp(-1.0, 1.0);
    cosine.acos()
}

/// Signed angle that rotates `from` onto `to`, counter-clockwise positive in
/// a y-up frame. Shares the zero-length fallback of [`angle_between`].
pub fn signed_angle_2d(from: &Vector2<f64>, to: &Vector2<f64>) -> f64 {
    let angle = angle_between(from, to);
    let cross = from.x * to.y - from.y * to.x;
    if cross < 0.0 {
        -angle
    } else {
        angle
    }
}

/// Right-handed rotation of `angle` radians around `axis`.
///
/// An axis of near-zero length gives the identity.
pub fn rotation(axis: &Vector3<f64>, angle: f64) -> Rotation3<f64> {
    if axis.norm_squared() < DIRECTION_EPSILON {
        return Rotation3::identity();
    }
    Rotation3::from_axis_angle(&Unit::new_normalize(*axis), angle)
}

pub fn rotate_2d(v: &Vector2<f64>, angle: f64) -> Vector2<f64> {
    Rotation2::new(angle) * v
}
