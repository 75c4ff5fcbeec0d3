//! Geometric predicates used by the rules
//!
//! Point, segment and polyline distances, vertex/endpoint extraction, length and
//! a simple self-intersection test. Everything is stateless and works in the
//! collections' shared coordinate system.

use crate::network::{Feature, FeatureCollection, Geometry, Point, Polyline, SpatialIndex};

/// Euclidean distance between two points
pub fn distance(a: Point, b: Point) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Point-to-segment minimum distance and the closest point on the segment
pub fn point_segment_distance(p: Point, a: Point, b: Point) -> (f64, Point) {
    let ab = [b.x - a.x, b.y - a.y];
    let ap = [p.x - a.x, p.y - a.y];
    let ab_len2 = ab[0] * ab[0] + ab[1] * ab[1];

    if ab_len2 < 1e-20 {
        // Degenerate segment
        return (distance(p, a), a);
    }

    let t = ((ap[0] * ab[0] + ap[1] * ab[1]) / ab_len2).clamp(0.0, 1.0);
    let closest = Point::new(a.x + t * ab[0], a.y + t * ab[1]);
    (distance(p, closest), closest)
}

/// Minimum distance from a point to a polyline, `None` when it has no vertices
pub fn point_polyline_distance(p: Point, line: &Polyline) -> Option<f64> {
    let mut min_d: Option<f64> = None;
    for part in &line.parts {
        let d = match part.len() {
            0 => continue,
            1 => distance(p, part[0]),
            _ => part
                .windows(2)
                .map(|w| point_segment_distance(p, w[0], w[1]).0)
                .fold(f64::MAX, f64::min),
        };
        min_d = Some(min_d.map_or(d, |m| m.min(d)));
    }
    min_d
}

/// Minimum distance from a point to any geometry
pub fn point_geometry_distance(p: Point, geometry: &Geometry) -> Option<f64> {
    match geometry {
        Geometry::Point(q) => Some(distance(p, *q)),
        Geometry::Line(line) => point_polyline_distance(p, line),
    }
}

/// Features of `collection` lying within `tolerance` of `point` (inclusive)
///
/// Pulls the `k` nearest bounding boxes from the index, then filters by exact
/// distance. A match outside the first `k` candidates is missed, which only
/// happens under heavy clustering around `point`.
pub fn nearest_within_tolerance<'a>(
    point: Point,
    index: &SpatialIndex,
    collection: &'a FeatureCollection,
    tolerance: f64,
    k: usize,
) -> Vec<&'a Feature> {
    index
        .nearest_neighbors(point, k)
        .into_iter()
        .filter_map(|id| collection.get(id))
        .filter(|f| {
            point_geometry_distance(point, &f.geometry).is_some_and(|d| d <= tolerance)
        })
        .collect()
}

/// Features of `collection` within `tolerance` of `point`, found by a box query
///
/// Unbounded alternative to `nearest_within_tolerance`, for places that must see
/// every touching feature (degree counting). Results ascend by id.
pub fn features_within_tolerance<'a>(
    point: Point,
    index: &SpatialIndex,
    collection: &'a FeatureCollection,
    tolerance: f64,
) -> Vec<&'a Feature> {
    let rect = [
        point.x - tolerance,
        point.y - tolerance,
        point.x + tolerance,
        point.y + tolerance,
    ];
    index
        .bounding_box_query(rect)
        .into_iter()
        .filter_map(|id| collection.get(id))
        .filter(|f| {
            point_geometry_distance(point, &f.geometry).is_some_and(|d| d <= tolerance)
        })
        .collect()
}

/// Every vertex in part order, then vertex order within each part
pub fn vertices(line: &Polyline) -> impl Iterator<Item = Point> + '_ {
    line.parts.iter().flatten().copied()
}

/// First and last vertex of a single part, `None` for an empty part
pub fn endpoints(part: &[Point]) -> Option<(Point, Point)> {
    Some((*part.first()?, *part.last()?))
}

/// Endpoint pairs of every non-empty part
pub fn part_endpoints(line: &Polyline) -> impl Iterator<Item = (Point, Point)> + '_ {
    line.parts.iter().filter_map(|part| endpoints(part))
}

/// Sum of segment lengths across all parts; points have zero length
pub fn length(geometry: &Geometry) -> f64 {
    match geometry {
        Geometry::Point(_) => 0.0,
        Geometry::Line(line) => line
            .parts
            .iter()
            .flat_map(|part| part.windows(2))
            .map(|w| distance(w[0], w[1]))
            .sum(),
    }
}

fn orientation(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn on_segment(p: Point, a: Point, b: Point) -> bool {
    orientation(a, b, p) == 0.0
        && p.x >= a.x.min(b.x)
        && p.x <= a.x.max(b.x)
        && p.y >= a.y.min(b.y)
        && p.y <= a.y.max(b.y)
}

/// Closed-segment intersection test
pub fn segments_intersect(p1: Point, p2: Point, q1: Point, q2: Point) -> bool {
    let d1 = orientation(q1, q2, p1);
    let d2 = orientation(q1, q2, p2);
    let d3 = orientation(p1, p2, q1);
    let d4 = orientation(p1, p2, q2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    on_segment(p1, q1, q2) || on_segment(p2, q1, q2) || on_segment(q1, p1, p2) || on_segment(q2, p1, p2)
}

/// True when no part crosses or overlaps itself
///
/// Consecutive segments may share their common vertex, and a closed part may
/// meet itself at the closing vertex. Parts are tested independently.
pub fn is_simple(line: &Polyline) -> bool {
    line.parts.iter().all(|part| part_is_simple(part))
}

fn part_is_simple(part: &[Point]) -> bool {
    let segments: Vec<(Point, Point)> = part
        .windows(2)
        .map(|w| (w[0], w[1]))
        .filter(|(a, b)| a != b)
        .collect();
    let n = segments.len();
    let closed = n > 2 && part.first() == part.last();

    for i in 0..n {
        for j in (i + 1)..n {
            let (p1, p2) = segments[i];
            let (q1, q2) = segments[j];
            let adjacent = j == i + 1;
            let closing = closed && i == 0 && j == n - 1;

            if adjacent {
                // Shared vertex p2 == q1; only a backtrack overlaps
                if on_segment(q2, p1, p2) || on_segment(p1, q1, q2) {
                    return false;
                }
            } else if closing {
                // Shared vertex q2 == p1
                if on_segment(q1, p1, p2) || on_segment(p2, q1, q2) {
                    return false;
                }
            } else if segments_intersect(p1, p2, q1, q2) {
                return false;
            }
        }
    }
    true
}
