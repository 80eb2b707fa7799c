/// GeoJSON ingestion: FeatureCollection of (multi)polygons with 3D positions
use std::fs;
use std::path::Path;

use nalgebra::Point3;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::geometry::{Geometry, Polygon, Ring};

#[derive(Deserialize)]
struct RawCollection {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    features: Vec<RawFeature>,
}

#[derive(Deserialize)]
struct RawFeature {
    geometry: Option<RawGeometry>,
}

#[derive(Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

type RawPosition = Vec<f64>;
type RawRing = Vec<RawPosition>;

/// Parse a FeatureCollection document.
///
/// Only a document that is not a FeatureCollection is an error. Features
/// with malformed coordinates are dropped with a warning, features without
/// geometry are ignored and non-polygonal types come back as
/// [`Geometry::Unsupported`].
pub fn parse_feature_collection(text: &str) -> Result<Vec<Geometry>> {
    let collection: RawCollection = serde_json::from_str(text)?;
    if collection.kind != "FeatureCollection" {
        return Err(Error::NotAFeatureCollection(collection.kind));
    }

    let mut geometries = Vec::with_capacity(collection.features.len());
    for (index, feature) in collection.features.into_iter().enumerate() {
        let Some(raw) = feature.geometry else {
            continue;
        };
        match convert(raw) {
            Ok(geometry) => geometries.push(geometry),
            Err(e) => log::warn!("skipping feature {index}: {e}"),
        }
    }

    log::debug!("parsed {} geometries", geometries.len());
    Ok(geometries)
}

pub fn read_feature_collection(path: &Path) -> Result<Vec<Geometry>> {
    let text = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_feature_collection(&text)
}

fn convert(raw: RawGeometry) -> Result<Geometry> {
    match raw.kind.as_str() {
        "Polygon" => {
            let rings: Vec<RawRing> = serde_json::from_value(raw.coordinates)?;
            Ok(Geometry::Polygon(polygon(rings)?))
        }
        "MultiPolygon" => {
            let polygons: Vec<Vec<RawRing>> = serde_json::from_value(raw.coordinates)?;
            let polygons = polygons.into_iter().map(polygon).collect::<Result<_>>()?;
            Ok(Geometry::MultiPolygon(polygons))
        }
        _ => Ok(Geometry::Unsupported(raw.kind)),
    }
}

fn polygon(rings: Vec<RawRing>) -> Result<Polygon> {
    let rings = rings.iter().map(|r| ring(r)).collect::<Result<_>>()?;
    Ok(Polygon::new(rings))
}

fn ring(positions: &[RawPosition]) -> Result<Ring> {
    positions.iter().map(|p| position(p)).collect()
}

fn position(p: &[f64]) -> Result<Point3<f64>> {
    match *p {
        [x, y] => Ok(Point3::new(x, y, 0.0)),
        [x, y, z, ..] => Ok(Point3::new(x, y, z)),
        _ => Err(Error::InvalidPosition(p.len())),
    }
}
