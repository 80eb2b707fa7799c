/// Drawing surface boundary, per-class drawing policy and frame painting
use nalgebra::Point2;
use serde::Deserialize;

use crate::depth::order_by_depth;
use crate::geometry::{PlaneCollection, Ring};
use crate::projection::ProjectionTransform;

/// 2D path-drawing target supplied by the host.
pub trait Surface {
    /// Wipe the whole viewport before a new frame.
    fn clear(&mut self);

    /// Style used by the following `stroke`/`fill` calls.
    fn set_style(&mut self, style: &Style);

    fn begin_path(&mut self);
    fn move_to(&mut self, point: Point2<f64>);
    fn line_to(&mut self, point: Point2<f64>);
    /// Join the current subpath back to its first point.
    fn close_path(&mut self);
    fn stroke(&mut self);
    fn fill(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    /// `#rrggbb` form understood by canvas contexts.
    pub fn to_css(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub stroke: Color,
    pub fill: Color,
    pub line_width: f64,
}

/// What happens to a ring's path once it has been traced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Finalize {
    Stroke,
    FillAndStroke,
}

impl Finalize {
    pub fn apply(self, surface: &mut dyn Surface) {
        match self {
            Finalize::Stroke => surface.stroke(),
            Finalize::FillAndStroke => {
                surface.fill();
                surface.stroke();
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryClass {
    /// Building bodies: outlines only.
    Building,
    /// Roof faces: filled, then outlined.
    Roof,
}

impl GeometryClass {
    pub fn default_finalize(self) -> Finalize {
        match self {
            GeometryClass::Building => Finalize::Stroke,
            GeometryClass::Roof => Finalize::FillAndStroke,
        }
    }

    pub fn default_style(self) -> Style {
        match self {
            GeometryClass::Building => Style {
                stroke: Color(0x66, 0x66, 0x99),
                fill: Color(0xff, 0xff, 0xff),
                line_width: 0.2,
            },
            GeometryClass::Roof => Style {
                stroke: Color(0x66, 0x66, 0xaa),
                fill: Color(0x8d, 0xb6, 0x3c),
                line_width: 0.5,
            },
        }
    }
}

/// A set of rings sharing one drawing policy.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub class: GeometryClass,
    pub finalize: Finalize,
    pub style: Style,
    pub planes: PlaneCollection,
}

impl Layer {
    pub fn new(class: GeometryClass, planes: PlaneCollection) -> Self {
        Self {
            class,
            finalize: class.default_finalize(),
            style: class.default_style(),
            planes,
        }
    }

    pub fn with_style(self, style: Style) -> Self {
        Self { style, ..self }
    }

    pub fn with_finalize(self, finalize: Finalize) -> Self {
        Self { finalize, ..self }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub drawn: usize,
    pub skipped: usize,
}

/// Draw every ring of every layer back to front.
///
/// Rings of all layers are ordered together, so a near building body still
/// covers a far roof. Equal depths keep layer order, then ring order.
pub fn paint_frame(
    surface: &mut dyn Surface,
    transform: &ProjectionTransform,
    layers: &[Layer],
) -> FrameStats {
    surface.clear();

    let eye = transform.camera().position;
    let entries = layers
        .iter()
        .enumerate()
        .flat_map(|(index, layer)| layer.planes.iter().map(move |ring| (index, ring)));
    let ordered = order_by_depth(entries, |(_, ring)| *ring, &eye);

    let mut stats = FrameStats::default();
    let mut current_layer = None;
    for (index, ring) in ordered {
        if ring.is_empty() {
            stats.skipped += 1;
            continue;
        }
        let layer = &layers[index];
        if current_layer != Some(index) {
            surface.set_style(&layer.style);
            current_layer = Some(index);
        }
        trace_ring(surface, transform, ring);
        layer.finalize.apply(surface);
        stats.drawn += 1;
    }

    log::trace!("painted {} rings, skipped {}", stats.drawn, stats.skipped);
    stats
}

/// Trace one non-empty ring as a closed path.
fn trace_ring(surface: &mut dyn Surface, transform: &ProjectionTransform, ring: &Ring) {
    let points = ring.points();
    surface.begin_path();
    surface.move_to(transform.project(&points[0]));
    for point in &points[1..] {
        surface.line_to(transform.project(point));
    }
    surface.close_path();
}


#[cfg(test)]
mod tests {
    use super::testing::{Call, RecordingSurface};
    use super::*;
    use crate::camera::{Camera, Viewport};
    use crate::projection::build_transform;
    use nalgebra::{Point3, Vector3};
    use pretty_assertions::assert_eq;

    fn camera() -> Camera {
        Camera::framing(
            Point3::origin(),
            Vector3::new(0.0, -100.0, 100.0),
            Viewport::new(400.0, 300.0),
        )
    }

    fn square(y: f64, z: f64) -> Ring {
        Ring::new(vec![
            Point3::new(-5.0, y, z),
            Point3::new(5.0, y, z),
            Point3::new(5.0, y + 10.0, z),
            Point3::new(-5.0, y + 10.0, z),
        ])
    }

    #[test]
    fn test_finalize_policies() {
        let mut surface = RecordingSurface::default();
        Finalize::Stroke.apply(&mut surface);
        assert_eq!(surface.calls, vec![Call::Stroke]);

        let mut surface = RecordingSurface::default();
        Finalize::FillAndStroke.apply(&mut surface);
        assert_eq!(surface.calls, vec![Call::Fill, Call::Stroke]);
    }

    #[test]
    fn test_color_css() {
        assert_eq!(Color(0x8d, 0xb6, 0x3c).to_css(), "#8db63c");
    }

    #[test]
    fn test_ring_traced_as_closed_path() {
        let camera = camera();
        let transform = build_transform(&camera);
        let ring = square(0.0, 0.0);
        let layers = vec![Layer::new(GeometryClass::Building, PlaneCollection::from_rings(vec![ring.clone()]))];

        let mut surface = RecordingSurface::default();
        let stats = paint_frame(&mut surface, &transform, &layers);
        assert_eq!(stats, FrameStats { drawn: 1, skipped: 0 });

        let projected = transform.project_ring(&ring);
        let expected = vec![
            Call::Clear,
            Call::SetStyle(GeometryClass::Building.default_style()),
            Call::BeginPath,
            Call::MoveTo(projected[0]),
            Call::LineTo(projected[1]),
            Call::LineTo(projected[2]),
            Call::LineTo(projected[3]),
            Call::ClosePath,
            Call::Stroke,
        ];
        assert_eq!(surface.calls, expected);
    }

    #[test]
    fn test_explicitly_closed_ring_is_traced_as_given() {
        let transform = build_transform(&camera());
        let mut points = square(0.0, 0.0).points().to_vec();
        points.push(points[0]);
        let layers = vec![Layer::new(GeometryClass::Roof, PlaneCollection::from_rings(vec![Ring::new(points)]))];

        let mut surface = RecordingSurface::default();
        paint_frame(&mut surface, &transform, &layers);

        let traced: Vec<&Call> = surface
            .calls
            .iter()
            .skip_while(|c| **c != Call::BeginPath)
            .collect();
        assert_eq!(traced.len(), 1 + 1 + 4 + 1 + 2);
        assert_eq!(surface.count(&Call::ClosePath), 1);
        assert_eq!(
            traced[traced.len() - 3..].to_vec(),
            vec![&Call::ClosePath, &Call::Fill, &Call::Stroke]
        );
    }

    #[test]
    fn test_empty_rings_never_reach_the_surface() {
        let transform = build_transform(&camera());
        let layers = vec![Layer::new(
            GeometryClass::Roof,
            PlaneCollection::from_rings(vec![Ring::default(), square(0.0, 10.0), Ring::default()]),
        )];

        let mut surface = RecordingSurface::default();
        let stats = paint_frame(&mut surface, &transform, &layers);
        assert_eq!(stats, FrameStats { drawn: 1, skipped: 2 });
        assert_eq!(surface.count(&Call::BeginPath), 1);
        assert_eq!(surface.count(&Call::Fill), 1);
    }

    #[test]
    fn test_layers_are_interleaved_by_depth() {
        let camera = camera();
        let transform = build_transform(&camera);
        // the camera sits south (negative y) of the origin
        let near_wall = square(-20.0, 0.0);
        let far_roof = square(40.0, 30.0);
        let layers = vec![
            Layer::new(GeometryClass::Building, PlaneCollection::from_rings(vec![near_wall])),
            Layer::new(GeometryClass::Roof, PlaneCollection::from_rings(vec![far_roof])),
        ];

        let mut surface = RecordingSurface::default();
        paint_frame(&mut surface, &transform, &layers);

        let styles: Vec<Style> = surface
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::SetStyle(style) => Some(*style),
                _ => None,
            })
            .collect();
        assert_eq!(
            styles,
            vec![GeometryClass::Roof.default_style(), GeometryClass::Building.default_style()]
        );
        assert_eq!(surface.calls.last(), Some(&Call::Stroke));
    }

    #[test]
    fn test_style_set_once_per_run_of_layer() {
        let transform = build_transform(&camera());
        let planes = PlaneCollection::from_rings(vec![square(0.0, 0.0), square(30.0, 0.0), square(60.0, 0.0)]);
        let layers = vec![Layer::new(GeometryClass::Building, planes).with_finalize(Finalize::FillAndStroke)];

        let mut surface = RecordingSurface::default();
        paint_frame(&mut surface, &transform, &layers);
        let style_calls = surface.calls.iter().filter(|c| matches!(c, Call::SetStyle(_))).count();
        assert_eq!(style_calls, 1);
        assert_eq!(surface.count(&Call::Fill), 3);
    }
}
