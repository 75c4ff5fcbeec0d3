//! Endpoint-degree counting for line collections
//!
//! Endpoints are keyed by coordinates rounded to a fixed number of decimals and
//! counted across every part of every line. Degree 1 means dangling.

use super::distance::part_endpoints;
use crate::network::{FeatureCollection, Point};
use std::collections::HashMap;

/// Rounded coordinate key of an endpoint
pub type EndpointKey = (i64, i64);

/// Endpoint occurrence counts of one line collection
#[derive(Debug, Clone)]
pub struct EndpointDegrees {
    counts: HashMap<EndpointKey, usize>,
    scale: f64,
}

/// A degree-1 endpoint and the line that owns it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DanglingEndpoint {
    pub feature_id: i64,
    pub point: Point,
}

impl EndpointDegrees {
    pub fn from_collection(lines: &FeatureCollection, precision: u32) -> Self {
        let scale = 10f64.powi(precision as i32);
        let mut counts: HashMap<EndpointKey, usize> = HashMap::new();

        for f in lines.features() {
            let Some(line) = f.geometry.as_polyline() else {
                continue;
            };
            for (start, end) in part_endpoints(line) {
                for p in [start, end] {
                    *counts.entry(key_for(p, scale)).or_insert(0) += 1;
                }
            }
        }

        Self { counts, scale }
    }

    pub fn key(&self, p: Point) -> EndpointKey {
        key_for(p, self.scale)
    }

    /// Number of line endpoints sharing `p`'s rounded position
    pub fn degree(&self, p: Point) -> usize {
        self.counts.get(&self.key(p)).copied().unwrap_or(0)
    }

    pub fn is_dangling(&self, p: Point) -> bool {
        self.degree(p) == 1
    }

    /// Dangling endpoints in feature order, then part order (start before end)
    pub fn dangling_endpoints(&self, lines: &FeatureCollection) -> Vec<DanglingEndpoint> {
        let mut out = Vec::new();
        for f in lines.features() {
            let Some(line) = f.geometry.as_polyline() else {
                continue;
            };
            for (start, end) in part_endpoints(line) {
                for p in [start, end] {
                    if self.is_dangling(p) {
                        out.push(DanglingEndpoint {
                            feature_id: f.id,
                            point: p,
                        });
                    }
                }
            }
        }
        out
    }
}

fn key_for(p: Point, scale: f64) -> EndpointKey {
    ((p.x * scale).round() as i64, (p.y * scale).round() as i64)
}
