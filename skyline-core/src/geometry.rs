/// Geometry primitives: rings, polygons and the flat plane collection
use nalgebra::{Point2, Point3};

/// A closed boundary of one polygon face.
///
/// The closing vertex does not have to repeat the first one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ring {
    points: Vec<Point3<f64>>,
}

impl Ring {
    pub fn new(points: Vec<Point3<f64>>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point3<f64>> {
        self.points.iter()
    }
}

impl FromIterator<Point3<f64>> for Ring {
    fn from_iter<I: IntoIterator<Item = Point3<f64>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Outer boundary at index 0, holes after it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    pub rings: Vec<Ring>,
}

impl Polygon {
    pub fn new(rings: Vec<Ring>) -> Self {
        Self { rings }
    }

    pub fn exterior(&self) -> Option<&Ring> {
        self.rings.first()
    }

    pub fn holes(&self) -> &[Ring] {
        self.rings.get(1..).unwrap_or(&[])
    }
}

/// One ingested geometry record.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Polygon(Polygon),
    MultiPolygon(Vec<Polygon>),
    /// Any other shape; carries the source type name for diagnostics.
    Unsupported(String),
}

/// Flat, unordered set of rings that depth ordering works on.
///
/// Extraction flattens every ring, holes included, so a hole is ordered and
/// drawn as an independent shape. That is a known approximation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlaneCollection {
    rings: Vec<Ring>,
}

impl PlaneCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rings(rings: Vec<Ring>) -> Self {
        Self { rings }
    }

    /// Collect the rings of every polygon and multi-polygon; other shapes are
    /// skipped.
    pub fn extract<'a, I>(geometries: I) -> Self
    where
        I: IntoIterator<Item = &'a Geometry>,
    {
        let mut planes = Self::new();
        for geometry in geometries {
            match geometry {
                Geometry::Polygon(polygon) => planes.add_polygon(polygon),
                Geometry::MultiPolygon(polygons) => {
                    for polygon in polygons {
                        planes.add_polygon(polygon);
                    }
                }
                Geometry::Unsupported(kind) => {
                    log::debug!("skipping unsupported geometry type {kind}");
                }
            }
        }
        planes
    }

    pub fn add_ring(&mut self, ring: Ring) {
        self.rings.push(ring);
    }

    pub fn add_polygon(&mut self, polygon: &Polygon) {
        self.rings.extend(polygon.rings.iter().cloned());
    }

    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    pub fn len(&self) -> usize {
        self.rings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Ring> {
        self.rings.iter()
    }

    pub fn bounds(&self) -> Option<Bounds3> {
        Bounds3::from_points(self.rings.iter().flat_map(Ring::iter))
    }
}

impl FromIterator<Ring> for PlaneCollection {
    fn from_iter<I: IntoIterator<Item = Ring>>(iter: I) -> Self {
        Self::from_rings(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a PlaneCollection {
    type Item = &'a Ring;
    type IntoIter = std::slice::Iter<'a, Ring>;

    fn into_iter(self) -> Self::IntoIter {
        self.rings.iter()
    }
}

/// Axis-aligned extent of a set of points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds3 {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Bounds3 {
    /// `None` when there are no points.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point3<f64>>,
    {
        let mut points = points.into_iter();
        let first = *points.next()?;
        Some(points.fold(Self { min: first, max: first }, |bounds, p| bounds.including(p)))
    }

    pub fn including(&self, p: &Point3<f64>) -> Self {
        Self {
            min: self.min.inf(p),
            max: self.max.sup(p),
        }
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }
}

/// Wall and roof faces of an extruded footprint.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Building {
    pub walls: Vec<Polygon>,
    pub roof: Polygon,
}

/// Extrude a ground footprint from `base` up to `base + height`.
///
/// Produces one quad per footprint edge and a roof ring at the top. A
/// repeated closing vertex in `footprint` is ignored.
pub fn extrude_footprint(footprint: &[Point2<f64>], base: f64, height: f64) -> Building {
    let mut corners = footprint;
    if corners.len() > 1 && corners.first() == corners.last() {
        corners = &corners[..corners.len() - 1];
    }
    if corners.is_empty() {
        return Building::default();
    }

    let top = base + height;
    let walls = corners
        .iter()
        .zip(corners.iter().cycle().skip(1))
        .map(|(a, b)| {
            Polygon::new(vec![Ring::new(vec![
                Point3::new(a.x, a.y, base),
                Point3::new(b.x, b.y, base),
                Point3::new(b.x, b.y, top),
                Point3::new(a.x, a.y, top),
            ])])
        })
        .collect();
    let roof = Polygon::new(vec![corners
        .iter()
        .map(|c| Point3::new(c.x, c.y, top))
        .collect()]);

    Building { walls, roof }
}
