// Fixture builders shared by the verification tests
#![allow(dead_code)]

use network_verifier::network::{
    Feature, FeatureCollection, Geometry, GeometryKind, InMemoryStore, Point, Polyline,
};
use network_verifier::verify::{ErrorKind, ErrorRecord};

pub const POLES: &str = "STALP_JT";
pub const BRANCHES: &str = "BRANS_FIRI_GRPM_JT";
pub const TRUNKS: &str = "TRONSON_JT";
pub const DESIGNATIONS: &str = "LINIE_JT";

pub fn pole(id: i64, x: f64, y: f64) -> Feature {
    Feature::new(id, Geometry::Point(Point::new(x, y)))
}

pub fn line(id: i64, pts: &[(f64, f64)]) -> Feature {
    Feature::new(
        id,
        Geometry::Line(Polyline::single(
            pts.iter().map(|&(x, y)| Point::new(x, y)).collect(),
        )),
    )
}

pub struct Network {
    pub poles: Vec<Feature>,
    pub branches: Vec<Feature>,
    pub trunks: Vec<Feature>,
    pub designations: Option<Vec<&'static str>>,
}

impl Network {
    pub fn new() -> Self {
        Self {
            poles: Vec::new(),
            branches: Vec::new(),
            trunks: Vec::new(),
            designations: None,
        }
    }

    pub fn poles(mut self, poles: Vec<Feature>) -> Self {
        self.poles = poles;
        self
    }

    pub fn branches(mut self, branches: Vec<Feature>) -> Self {
        self.branches = branches;
        self
    }

    pub fn trunks(mut self, trunks: Vec<Feature>) -> Self {
        self.trunks = trunks;
        self
    }

    pub fn designations(mut self, names: Vec<&'static str>) -> Self {
        self.designations = Some(names);
        self
    }

    pub fn store(self) -> InMemoryStore {
        let mut store = InMemoryStore::new()
            .with(FeatureCollection::new(POLES, GeometryKind::Point, self.poles))
            .with(FeatureCollection::new(BRANCHES, GeometryKind::Line, self.branches))
            .with(FeatureCollection::new(TRUNKS, GeometryKind::Line, self.trunks));
        if let Some(names) = self.designations {
            let features = names
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    line(i as i64 + 1, &[(0.0, 0.0), (1.0, 0.0)]).with_attr("DENUM", *name)
                })
                .collect();
            store.insert(FeatureCollection::new(DESIGNATIONS, GeometryKind::Line, features));
        }
        store
    }
}

/// Feature ids of records of one kind, in output order
pub fn ids_of(records: &[ErrorRecord], kind: ErrorKind) -> Vec<i64> {
    records
        .iter()
        .filter(|r| r.error_kind == kind)
        .map(|r| r.feature_id)
        .collect()
}
