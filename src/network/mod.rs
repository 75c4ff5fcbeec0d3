//! Network data model: features, collections, spatial index and store
//!
//! # Submodules
//! - `types` - Points, polylines, features and feature collections
//! - `spatial` - R-tree bounding-box index over a collection
//! - `store` - Named collection lookup used by the verifier

mod types;
mod spatial;
mod store;

pub use types::{
    AttrValue,
    Feature,
    FeatureCollection,
    Geometry,
    GeometryKind,
    Point,
    Polyline,
};

pub use spatial::{IndexedFeature, SpatialIndex};

pub use store::{FeatureStore, InMemoryStore, resolve_layer};
