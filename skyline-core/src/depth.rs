/// Painter's-algorithm ordering of rings relative to the camera
use nalgebra::{distance, Point3};

use crate::geometry::{PlaneCollection, Ring};

/// Distance from `eye` to the farthest vertex of `ring`; `0.0` when empty.
pub fn depth_metric(ring: &Ring, eye: &Point3<f64>) -> f64 {
    ring.iter().map(|p| distance(eye, p)).fold(0.0, f64::max)
}

/// Rings in drawing order: farthest first, nearest last.
///
/// Rings with equal depth keep their collection order. Interpenetrating
/// shapes cannot be resolved at this granularity.
pub fn order_for_painting<'a>(planes: &'a PlaneCollection, eye: &Point3<f64>) -> Vec<&'a Ring> {
    order_by_depth(planes.iter(), |ring| *ring, eye)
}

/// Stable back-to-front sort of anything that carries a ring.
pub fn order_by_depth<T, I, F>(items: I, ring_of: F, eye: &Point3<f64>) -> Vec<T>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> &Ring,
{
    let mut keyed: Vec<(f64, T)> = items
        .into_iter()
        .map(|item| (depth_metric(ring_of(&item), eye), item))
        .collect();
    // sort_by is stable; reversed comparison puts the farthest first
    keyed.sort_by(|(a, _), (b, _)| b.total_cmp(a));
    keyed.into_iter().map(|(_, item)| item).collect()
}
