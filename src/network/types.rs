//! Core feature types for the distribution network
//!
//! Poles are point features, branches and trunks are (multi-part) polylines.
//! Geometry serializes in GeoJSON shape so network snapshots can be exchanged
//! as plain JSON.

use crate::error::{Result, VerifyError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

/// A 2D point in the working collections' coordinate system
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Point {
    fn from(c: [f64; 2]) -> Self {
        Self { x: c[0], y: c[1] }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// A line geometry, possibly made of several parts
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub parts: Vec<Vec<Point>>,
}

impl Polyline {
    pub fn single(points: Vec<Point>) -> Self {
        Self { parts: vec![points] }
    }

    pub fn multi(parts: Vec<Vec<Point>>) -> Self {
        Self { parts }
    }

    pub fn is_multipart(&self) -> bool {
        self.parts.len() > 1
    }

    /// Total number of vertices across all parts
    pub fn vertex_count(&self) -> usize {
        self.parts.iter().map(Vec::len).sum()
    }

    /// Bounding box [min_x, min_y, max_x, max_y], `None` when there are no vertices
    pub fn bounds(&self) -> Option<[f64; 4]> {
        let mut iter = self.parts.iter().flatten();
        let first = iter.next()?;
        let init = [first.x, first.y, first.x, first.y];
        Some(iter.fold(init, |b, p| {
            [b[0].min(p.x), b[1].min(p.y), b[2].max(p.x), b[3].max(p.y)]
        }))
    }
}

/// Geometry kind a collection declares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryKind {
    Point,
    Line,
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryKind::Point => write!(f, "Point"),
            GeometryKind::Line => write!(f, "Line"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawGeometry", into = "RawGeometry")]
pub enum Geometry {
    Point(Point),
    Line(Polyline),
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::Line(_) => GeometryKind::Line,
        }
    }

    pub fn as_point(&self) -> Option<Point> {
        match self {
            Geometry::Point(p) => Some(*p),
            Geometry::Line(_) => None,
        }
    }

    pub fn as_polyline(&self) -> Option<&Polyline> {
        match self {
            Geometry::Line(l) => Some(l),
            Geometry::Point(_) => None,
        }
    }

    /// Bounding box [min_x, min_y, max_x, max_y]
    pub fn bounds(&self) -> Option<[f64; 4]> {
        match self {
            Geometry::Point(p) => Some([p.x, p.y, p.x, p.y]),
            Geometry::Line(l) => l.bounds(),
        }
    }
}

/// GeoJSON-shaped wire form of `Geometry`
#[derive(Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
enum RawGeometry {
    Point(Point),
    LineString(Vec<Point>),
    MultiLineString(Vec<Vec<Point>>),
}

impl From<RawGeometry> for Geometry {
    fn from(raw: RawGeometry) -> Self {
        match raw {
            RawGeometry::Point(p) => Geometry::Point(p),
            RawGeometry::LineString(points) => Geometry::Line(Polyline::single(points)),
            RawGeometry::MultiLineString(parts) => Geometry::Line(Polyline::multi(parts)),
        }
    }
}

impl From<Geometry> for RawGeometry {
    fn from(geometry: Geometry) -> Self {
        match geometry {
            Geometry::Point(p) => RawGeometry::Point(p),
            Geometry::Line(mut line) if line.parts.len() == 1 => {
                RawGeometry::LineString(line.parts.remove(0))
            }
            Geometry::Line(line) => RawGeometry::MultiLineString(line.parts),
        }
    }
}

/// Attribute value: free text, number or null
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Text(String),
    Number(f64),
    Null,
}

/// Exact i64 value of a whole number inside the i64 range
fn integral(n: f64) -> Option<i64> {
    // 2^63 itself is out of range; -2^63 is not
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    (n.is_finite() && n.fract() == 0.0 && n >= -LIMIT && n < LIMIT).then(|| n as i64)
}

impl AttrValue {
    /// Text rendering of the value; integral numbers print without a fraction
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            AttrValue::Text(s) => Some(Cow::Borrowed(s.as_str())),
            AttrValue::Number(n) => match integral(*n) {
                Some(i) => Some(Cow::Owned(i.to_string())),
                None => Some(Cow::Owned(n.to_string())),
            },
            AttrValue::Null => None,
        }
    }

    /// Integer reading of the value (numbers must be integral, text must parse)
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Number(n) => integral(*n),
            AttrValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<f64> for AttrValue {
    fn from(n: f64) -> Self {
        AttrValue::Number(n)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: i64,
    pub geometry: Geometry,
    #[serde(default)]
    pub attributes: IndexMap<String, AttrValue>,
}

impl Feature {
    pub fn new(id: i64, geometry: Geometry) -> Self {
        Self {
            id,
            geometry,
            attributes: IndexMap::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attr(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    /// Attribute as text; missing and null read as the empty string
    pub fn attr_text(&self, name: &str) -> Cow<'_, str> {
        self.attr(name)
            .and_then(AttrValue::as_text)
            .unwrap_or(Cow::Borrowed(""))
    }
}

/// An ordered set of features sharing one declared geometry kind ("layer")
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "LayerRecord", into = "LayerRecord")]
pub struct FeatureCollection {
    name: String,
    kind: GeometryKind,
    features: Vec<Feature>,
    positions: HashMap<i64, usize>,
}

#[derive(Serialize, Deserialize)]
struct LayerRecord {
    name: String,
    geometry_kind: GeometryKind,
    #[serde(default)]
    features: Vec<Feature>,
}

impl From<LayerRecord> for FeatureCollection {
    fn from(r: LayerRecord) -> Self {
        FeatureCollection::new(r.name, r.geometry_kind, r.features)
    }
}

impl From<FeatureCollection> for LayerRecord {
    fn from(c: FeatureCollection) -> Self {
        LayerRecord {
            name: c.name,
            geometry_kind: c.kind,
            features: c.features,
        }
    }
}

impl FeatureCollection {
    pub fn new(name: impl Into<String>, kind: GeometryKind, features: Vec<Feature>) -> Self {
        let mut positions = HashMap::with_capacity(features.len());
        for (pos, f) in features.iter().enumerate() {
            // First occurrence wins for duplicated ids
            positions.entry(f.id).or_insert(pos);
        }
        Self {
            name: name.into(),
            kind,
            features,
            positions,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> GeometryKind {
        self.kind
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Feature> {
        self.positions.get(&id).map(|&pos| &self.features[pos])
    }

    /// Check the declared kind and every member's geometry against `expected`
    pub fn ensure_kind(&self, expected: GeometryKind) -> Result<()> {
        if self.kind != expected {
            return Err(VerifyError::GeometryKindMismatch {
                layer: self.name.clone(),
                expected,
                found: self.kind,
            });
        }
        if let Some(f) = self.features.iter().find(|f| f.geometry.kind() != expected) {
            return Err(VerifyError::MixedGeometry {
                layer: self.name.clone(),
                feature_id: f.id,
                expected,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_json_shape() {
        let json = r#"{"type":"MultiLineString","coordinates":[[[0,0],[1,0]],[[2,0],[3,1]]]}"#;
        let g: Geometry = serde_json::from_str(json).unwrap();
        let line = g.as_polyline().unwrap();
        assert!(line.is_multipart());
        assert_eq!(line.vertex_count(), 4);
        assert_eq!(line.bounds(), Some([0.0, 0.0, 3.0, 1.0]));

        let p: Geometry = serde_json::from_str(r#"{"type":"Point","coordinates":[10.5,2]}"#).unwrap();
        assert_eq!(p.as_point(), Some(Point::new(10.5, 2.0)));
    }

    #[test]
    fn test_attr_values() {
        let f: Feature = serde_json::from_str(
            r#"{"id":3,"geometry":{"type":"Point","coordinates":[0,0]},
                "attributes":{"DENUM":12,"TIP_CIR":"JT+BR","fid":"7","X":null}}"#,
        )
        .unwrap();
        assert_eq!(f.attr_text("DENUM"), "12");
        assert_eq!(f.attr_text("TIP_CIR"), "JT+BR");
        assert_eq!(f.attr_text("X"), "");
        assert_eq!(f.attr_text("MISSING"), "");
        assert_eq!(f.attr("fid").and_then(AttrValue::as_i64), Some(7));
        assert_eq!(f.attr("X").and_then(AttrValue::as_i64), None);
    }

    #[test]
    fn test_numbers_outside_i64_range() {
        let big = AttrValue::Number(1e20);
        assert_eq!(big.as_i64(), None);
        assert_eq!(big.as_text().as_deref(), Some("100000000000000000000"));

        let top = AttrValue::Number(9_223_372_036_854_775_808.0);
        assert_eq!(top.as_i64(), None);
        assert_ne!(top.as_text().as_deref(), Some("9223372036854775807"));

        let bottom = AttrValue::Number(-9_223_372_036_854_775_808.0);
        assert_eq!(bottom.as_i64(), Some(i64::MIN));
        assert_eq!(AttrValue::Number(2.5).as_text().as_deref(), Some("2.5"));
        assert_eq!(AttrValue::Number(2.5).as_i64(), None);
    }

    #[test]
    fn test_ensure_kind() {
        let poles = FeatureCollection::new(
            "STALP_JT",
            GeometryKind::Point,
            vec![Feature::new(1, Geometry::Point(Point::new(0.0, 0.0)))],
        );
        assert!(poles.ensure_kind(GeometryKind::Point).is_ok());
        assert!(matches!(
            poles.ensure_kind(GeometryKind::Line),
            Err(VerifyError::GeometryKindMismatch { .. })
        ));

        let mixed = FeatureCollection::new(
            "TRONSON_JT",
            GeometryKind::Line,
            vec![Feature::new(4, Geometry::Point(Point::new(0.0, 0.0)))],
        );
        assert!(matches!(
            mixed.ensure_kind(GeometryKind::Line),
            Err(VerifyError::MixedGeometry { feature_id: 4, .. })
        ));
        assert_eq!(mixed.get(4).map(|f| f.id), Some(4));
        assert!(mixed.get(5).is_none());
    }
}
