//! Read-only view over the named feature collections of one network
//!
//! The rule engine only needs to look collections up by name. `InMemoryStore`
//! is the plain implementation, loadable from a JSON snapshot.

use super::types::{FeatureCollection, GeometryKind};
use crate::error::{Result, VerifyError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Minimal contract the verifier needs from the host's data layer
pub trait FeatureStore {
    fn collection(&self, name: &str) -> Option<&FeatureCollection>;
}

/// Collections kept in memory, in load order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "StoreRecord", into = "StoreRecord")]
pub struct InMemoryStore {
    layers: IndexMap<String, FeatureCollection>,
}

#[derive(Serialize, Deserialize)]
struct StoreRecord {
    layers: Vec<FeatureCollection>,
}

impl From<StoreRecord> for InMemoryStore {
    fn from(r: StoreRecord) -> Self {
        let mut store = InMemoryStore::default();
        for layer in r.layers {
            store.insert(layer);
        }
        store
    }
}

impl From<InMemoryStore> for StoreRecord {
    fn from(s: InMemoryStore) -> Self {
        StoreRecord {
            layers: s.layers.into_values().collect(),
        }
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a collection under its own name
    pub fn insert(&mut self, collection: FeatureCollection) {
        self.layers.insert(collection.name().to_string(), collection);
    }

    pub fn with(mut self, collection: FeatureCollection) -> Self {
        self.insert(collection);
        self
    }

    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.layers.keys().map(String::as_str)
    }

    /// Load a JSON network snapshot from disk
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| VerifyError::Io {
            source,
            path: path.to_path_buf(),
        })?;
        serde_json::from_str(&text).map_err(|source| VerifyError::Json {
            source,
            path: path.to_path_buf(),
        })
    }
}

impl FeatureStore for InMemoryStore {
    fn collection(&self, name: &str) -> Option<&FeatureCollection> {
        self.layers.get(name)
    }
}

/// Look up a collection and check it holds `expected` geometries
pub fn resolve_layer<'a, S: FeatureStore + ?Sized>(
    store: &'a S,
    name: &str,
    expected: GeometryKind,
) -> Result<&'a FeatureCollection> {
    let collection = store
        .collection(name)
        .ok_or_else(|| VerifyError::LayerNotFound {
            name: name.to_string(),
        })?;
    collection.ensure_kind(expected)?;
    Ok(collection)
}
