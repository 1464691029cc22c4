//! Province boundaries and point-in-polygon tests.
//!
//! Coordinates follow GeoJSON order: `[longitude, latitude]`.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

use super::GeoError;

/// Axis-aligned box used to skip polygons that cannot contain a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    fn empty() -> Self {
        Self {
            min_lon: f64::INFINITY,
            min_lat: f64::INFINITY,
            max_lon: f64::NEG_INFINITY,
            max_lat: f64::NEG_INFINITY,
        }
    }

    fn extend(&mut self, lon: f64, lat: f64) {
        self.min_lon = self.min_lon.min(lon);
        self.min_lat = self.min_lat.min(lat);
        self.max_lon = self.max_lon.max(lon);
        self.max_lat = self.max_lat.max(lat);
    }

    fn merge(&mut self, other: &BoundingBox) {
        self.extend(other.min_lon, other.min_lat);
        self.extend(other.max_lon, other.max_lat);
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }
}

/// One polygon: an exterior ring and any number of holes.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    exterior: Vec<(f64, f64)>,
    holes: Vec<Vec<(f64, f64)>>,
    bbox: BoundingBox,
}

impl Polygon {
    pub fn new(exterior: Vec<(f64, f64)>, holes: Vec<Vec<(f64, f64)>>) -> Self {
        let mut bbox = BoundingBox::empty();
        for &(lon, lat) in &exterior {
            bbox.extend(lon, lat);
        }
        Self {
            exterior,
            holes,
            bbox,
        }
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.bbox.contains(lon, lat)
            && ring_contains(&self.exterior, lon, lat)
            && !self.holes.iter().any(|h| ring_contains(h, lon, lat))
    }
}

/// Even-odd ray casting. Rings may or may not repeat their first vertex.
fn ring_contains(ring: &[(f64, f64)], lon: f64, lat: f64) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];
        if (yi > lat) != (yj > lat) && lon < (xj - xi) * (lat - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// A named province made of one or more polygons.
#[derive(Debug, Clone, PartialEq)]
pub struct Province {
    pub name: String,
    polygons: Vec<Polygon>,
    bbox: BoundingBox,
}

impl Province {
    pub fn new(name: impl Into<String>, polygons: Vec<Polygon>) -> Self {
        let mut bbox = BoundingBox::empty();
        for p in &polygons {
            bbox.merge(p.bbox());
        }
        Self {
            name: name.into(),
            polygons,
            bbox,
        }
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.bbox.contains(lon, lat) && self.polygons.iter().any(|p| p.contains(lon, lat))
    }
}

/// All province boundaries, searched in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProvinceIndex {
    provinces: Vec<Province>,
}

#[derive(Deserialize)]
struct RawCollection {
    #[serde(default)]
    features: Vec<RawFeature>,
}

#[derive(Deserialize)]
struct RawFeature {
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    geometry: Option<RawGeometry>,
}

#[derive(Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

type RawRing = Vec<Vec<f64>>;

impl ProvinceIndex {
    pub fn new(provinces: Vec<Province>) -> Self {
        Self { provinces }
    }

    /// Read a GeoJSON `FeatureCollection` from disk.
    pub fn from_file<P: AsRef<Path>>(path: P, name_property: &str) -> Result<Self, GeoError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| GeoError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_geojson(&text, name_property)
    }

    /// Parse a GeoJSON `FeatureCollection`. The province name is read from
    /// `name_property`; features without it, or with a geometry other than
    /// `Polygon`/`MultiPolygon`, are skipped.
    pub fn from_geojson(text: &str, name_property: &str) -> Result<Self, GeoError> {
        let collection: RawCollection = serde_json::from_str(text)?;
        let mut provinces = Vec::with_capacity(collection.features.len());
        let mut skipped = 0usize;

        for feature in collection.features {
            let name = feature
                .properties
                .as_ref()
                .and_then(|p| p.get(name_property))
                .and_then(Value::as_str)
                .map(str::to_string);
            let (Some(name), Some(geometry)) = (name, feature.geometry) else {
                skipped += 1;
                continue;
            };
            let polygons = match geometry.kind.as_str() {
                "Polygon" => {
                    let rings: Vec<RawRing> = serde_json::from_value(geometry.coordinates)?;
                    vec![build_polygon(rings)?]
                }
                "MultiPolygon" => {
                    let parts: Vec<Vec<RawRing>> = serde_json::from_value(geometry.coordinates)?;
                    parts
                        .into_iter()
                        .map(build_polygon)
                        .collect::<Result<Vec<_>, _>>()?
                }
                _ => {
                    skipped += 1;
                    continue;
                }
            };
            provinces.push(Province::new(name, polygons));
        }

        if skipped > 0 {
            log::warn!("Skipped {} boundary features without a usable name or polygon", skipped);
        }
        if provinces.is_empty() {
            return Err(GeoError::NoPolygons);
        }
        Ok(Self { provinces })
    }

    /// Name of the first province containing the point.
    pub fn locate(&self, lat: f64, lon: f64) -> Option<&str> {
        self.provinces
            .iter()
            .find(|p| p.contains(lon, lat))
            .map(|p| p.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.provinces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.provinces.is_empty()
    }
}

fn build_polygon(rings: Vec<RawRing>) -> Result<Polygon, GeoError> {
    let mut rings = rings.into_iter().map(to_ring);
    let exterior = rings.next().ok_or_else(|| {
        GeoError::InvalidGeometry("polygon without an exterior ring".to_string())
    })??;
    let holes = rings.collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(exterior, holes))
}

fn to_ring(raw: RawRing) -> Result<Vec<(f64, f64)>, GeoError> {
    raw.into_iter()
        .map(|pos| match pos.as_slice() {
            [lon, lat, ..] => Ok((*lon, *lat)),
            _ => Err(GeoError::InvalidGeometry(format!(
                "position with {} coordinates",
                pos.len()
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, size: f64) -> Vec<(f64, f64)> {
        vec![
            (x0, y0),
            (x0 + size, y0),
            (x0 + size, y0 + size),
            (x0, y0 + size),
            (x0, y0),
        ]
    }

    #[test]
    fn test_ring_contains() {
        let ring = square(0.0, 0.0, 2.0);
        assert!(ring_contains(&ring, 1.0, 1.0));
        assert!(!ring_contains(&ring, 3.0, 1.0));
        assert!(!ring_contains(&ring, 1.0, -0.5));
    }

    #[test]
    fn test_polygon_hole_excludes_point() {
        let polygon = Polygon::new(square(0.0, 0.0, 4.0), vec![square(1.0, 1.0, 2.0)]);
        assert!(polygon.contains(0.5, 0.5));
        assert!(!polygon.contains(2.0, 2.0));
    }

    #[test]
    fn test_bbox_of_province_spans_parts() {
        let province = Province::new(
            "A",
            vec![
                Polygon::new(square(0.0, 0.0, 1.0), vec![]),
                Polygon::new(square(5.0, 5.0, 1.0), vec![]),
            ],
        );
        assert!(province.contains(5.5, 5.5));
        assert!(!province.contains(3.0, 3.0));
    }

    #[test]
    fn test_parse_feature_collection() {
        let text = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"NAME_1": "Alpha"},
                 "geometry": {"type": "Polygon",
                   "coordinates": [[[100,10],[102,10],[102,12],[100,12],[100,10]]]}},
                {"type": "Feature", "properties": {"NAME_1": "Beta"},
                 "geometry": {"type": "MultiPolygon",
                   "coordinates": [[[[103,10,0],[104,10,0],[104,11,0],[103,10,0]]],
                                   [[[105,15],[106,15],[106,16],[105,16]]]]}},
                {"type": "Feature", "properties": {"other": "x"},
                 "geometry": {"type": "Point", "coordinates": [1, 2]}}
            ]
        }"#;
        let index = ProvinceIndex::from_geojson(text, "NAME_1").unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.locate(11.0, 101.0), Some("Alpha"));
        assert_eq!(index.locate(15.5, 105.5), Some("Beta"));
        assert_eq!(index.locate(0.0, 0.0), None);
    }

    #[test]
    fn test_first_match_wins() {
        let index = ProvinceIndex::new(vec![
            Province::new("First", vec![Polygon::new(square(0.0, 0.0, 2.0), vec![])]),
            Province::new("Second", vec![Polygon::new(square(0.0, 0.0, 2.0), vec![])]),
        ]);
        assert_eq!(index.locate(1.0, 1.0), Some("First"));
    }

    #[test]
    fn test_collection_without_polygons_is_error() {
        let err = ProvinceIndex::from_geojson(r#"{"features": []}"#, "NAME_1").unwrap_err();
        assert!(matches!(err, GeoError::NoPolygons));
    }
}
