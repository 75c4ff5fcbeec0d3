//! R-tree spatial index over a feature collection
//!
//! Built once from a collection snapshot (bulk load), then read-only. Entries
//! carry only the feature id and its bounding box; exact geometry tests are the
//! caller's job.

use super::types::{FeatureCollection, Point};
use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// Feature bounding box entry for R-tree indexing
#[derive(Clone, Debug)]
pub struct IndexedFeature {
    pub id: i64,
    pub bounds: AABB<[f64; 2]>,
}

impl IndexedFeature {
    pub fn new(id: i64, bounds: [f64; 4]) -> Self {
        Self {
            id,
            bounds: AABB::from_corners([bounds[0], bounds[1]], [bounds[2], bounds[3]]),
        }
    }
}

impl RTreeObject for IndexedFeature {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.bounds
    }
}

impl PointDistance for IndexedFeature {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        self.bounds.distance_2(point)
    }
}

/// Frozen bounding-box index of one collection
#[derive(Debug)]
pub struct SpatialIndex {
    layer: String,
    tree: RTree<IndexedFeature>,
}

impl SpatialIndex {
    /// Index every feature that has a bounding box; features without vertices are left out
    pub fn build(collection: &FeatureCollection) -> Self {
        let entries: Vec<IndexedFeature> = collection
            .features()
            .iter()
            .filter_map(|f| match f.geometry.bounds() {
                Some(b) => Some(IndexedFeature::new(f.id, b)),
                None => {
                    tracing::debug!(
                        "[Index] {}: feature {} has no vertices, not indexed",
                        collection.name(),
                        f.id
                    );
                    None
                }
            })
            .collect();

        tracing::debug!(
            "[Index] {}: {} of {} features indexed",
            collection.name(),
            entries.len(),
            collection.len()
        );

        Self {
            layer: collection.name().to_string(),
            tree: RTree::bulk_load(entries),
        }
    }

    pub fn layer(&self) -> &str {
        &self.layer
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Up to `k` feature ids ordered by increasing bounding-box distance to `point`
    pub fn nearest_neighbors(&self, point: Point, k: usize) -> Vec<i64> {
        self.tree
            .nearest_neighbor_iter(&[point.x, point.y])
            .take(k)
            .map(|e| e.id)
            .collect()
    }

    /// Ids of features whose bounding box intersects `rect` [min_x, min_y, max_x, max_y], ascending
    pub fn bounding_box_query(&self, rect: [f64; 4]) -> Vec<i64> {
        let envelope = AABB::from_corners([rect[0], rect[1]], [rect[2], rect[3]]);
        let mut ids: Vec<i64> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|e| e.id)
            .collect();
        ids.sort_unstable();
        ids
    }
}
