//! Verification data types and configuration
//!
//! Contains error records, error kinds, the case-normalised code sets and the
//! verifier configuration (layer names, attribute schema, code sets, tolerance).

use super::distance::{features_within_tolerance, nearest_within_tolerance};
use crate::error::{Result, VerifyError};
use crate::network::{Feature, FeatureCollection, Geometry, Point, SpatialIndex};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;

/// Default snapping tolerance in coordinate units
pub const DEFAULT_TOLERANCE: f64 = 0.01;

/// Smallest candidate count pulled from an index before exact distance filtering
pub const MIN_NEAREST_CANDIDATES: usize = 5;

/// Kind of inconsistency a rule reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    PoleWithoutConnection,
    BranchWithoutConnection,
    TrunkWithoutConnection,
    ClassificationMissingBr,
    ClassificationBrWithoutAdjacency,
    ClassificationMissingJt,
    ClassificationJtWithoutAdjacency,
    IncorrectTerminalClassification,
    TrunkEndWithoutPole,
    PoleMustBeTerminal,
    BranchPointWithoutClassification,
    ConductorNotBroken,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::PoleWithoutConnection => "pole without connection",
            ErrorKind::BranchWithoutConnection => "branch without connection",
            ErrorKind::TrunkWithoutConnection => "trunk without connection",
            ErrorKind::ClassificationMissingBr => "classification missing BR",
            ErrorKind::ClassificationBrWithoutAdjacency => "classification has BR without adjacency",
            ErrorKind::ClassificationMissingJt => "classification missing JT",
            ErrorKind::ClassificationJtWithoutAdjacency => "classification has JT without adjacency",
            ErrorKind::IncorrectTerminalClassification => "incorrect terminal classification on branch",
            ErrorKind::TrunkEndWithoutPole => "trunk end without pole",
            ErrorKind::PoleMustBeTerminal => "pole must be terminal type",
            ErrorKind::BranchPointWithoutClassification => "branch point without correct classification",
            ErrorKind::ConductorNotBroken => "conductor not broken",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One inconsistency found by a rule; never mutated after creation
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ErrorRecord {
    pub layer_name: String,
    pub feature_id: i64,
    pub error_kind: ErrorKind,
    pub detail: String,
    pub geometry: Geometry,
}

/// Closed set of free-text codes, compared trimmed and case-insensitively
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct CodeSet {
    codes: BTreeSet<String>,
}

fn normalize_code(code: &str) -> String {
    code.trim().to_lowercase()
}

impl CodeSet {
    pub fn from_codes(codes: &[&str]) -> Self {
        Self {
            codes: codes.iter().map(|c| normalize_code(c)).collect(),
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.codes.contains(&normalize_code(value))
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl From<Vec<String>> for CodeSet {
    fn from(codes: Vec<String>) -> Self {
        Self {
            codes: codes.iter().map(|c| normalize_code(c)).collect(),
        }
    }
}

impl From<CodeSet> for Vec<String> {
    fn from(set: CodeSet) -> Self {
        set.codes.into_iter().collect()
    }
}

/// Names of the input collections
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerNames {
    pub poles: String,
    pub branches: String,
    pub trunks: String,
    /// Auxiliary collection the reference designation is chosen from
    pub designations: String,
}

impl Default for LayerNames {
    fn default() -> Self {
        Self {
            poles: "STALP_JT".to_string(),
            branches: "BRANS_FIRI_GRPM_JT".to_string(),
            trunks: "TRONSON_JT".to_string(),
            designations: "LINIE_JT".to_string(),
        }
    }
}

/// Attribute schema shared by the three working collections
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeNames {
    pub classification: String,
    pub connection_type: String,
    pub conductor_type: String,
    pub name: String,
    pub branch_type: String,
    /// Back-reference identifier on continuity model outputs
    pub back_reference: String,
}

impl Default for AttributeNames {
    fn default() -> Self {
        Self {
            classification: "TIP_CIR".to_string(),
            connection_type: "TIP_LEG_JT".to_string(),
            conductor_type: "TIP_COND".to_string(),
            name: "DENUM".to_string(),
            branch_type: "TIP_FIRI_BR".to_string(),
            back_reference: "fid".to_string(),
        }
    }
}

/// Enumerated equipment codes the rules match against
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeSets {
    /// Branch conductor types exempt from the pole connectivity check
    pub service_only_conductors: CodeSet,
    pub terminal_connections: CodeSet,
    pub branching_connections: CodeSet,
    /// Branch types that force a terminal pole at a dangling trunk end
    pub terminal_branch_types: CodeSet,
    /// Trunk conductor types that legitimately continue past a dangling end
    pub continuing_conductors: CodeSet,
}

impl Default for CodeSets {
    fn default() -> Self {
        Self {
            service_only_conductors: CodeSet::from_codes(&["ACYABY 4x16"]),
            terminal_connections: CodeSet::from_codes(&["t", "t/d"]),
            branching_connections: CodeSet::from_codes(&["ic", "ic/d"]),
            terminal_branch_types: CodeSet::from_codes(&["bmpm", "bmpt"]),
            continuing_conductors: CodeSet::from_codes(&[
                "tyir 16al + 25al",
                "tyir 3x25al + 16al",
                "tyir 2x25al",
            ]),
        }
    }
}

/// Verifier configuration, every field defaulted
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    pub layers: LayerNames,
    pub attributes: AttributeNames,
    pub codes: CodeSets,
    pub tolerance: f64,
    /// Decimal digits endpoints are rounded to before degree counting
    pub endpoint_precision: u32,
    pub nearest_candidates: usize,
    /// Evaluate rules 1-6 on the rayon pool
    pub parallel: bool,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            layers: LayerNames::default(),
            attributes: AttributeNames::default(),
            codes: CodeSets::default(),
            tolerance: DEFAULT_TOLERANCE,
            endpoint_precision: 6,
            nearest_candidates: MIN_NEAREST_CANDIDATES,
            parallel: false,
        }
    }
}

impl VerifierConfig {
    /// Reject settings no rule can run with
    pub fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(VerifyError::InvalidTolerance(self.tolerance));
        }
        Ok(())
    }

    /// Candidate count for nearest-neighbour lookups, never below the minimum
    pub fn candidate_count(&self) -> usize {
        self.nearest_candidates.max(MIN_NEAREST_CANDIDATES)
    }

    pub fn from_json_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
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

/// Read-only inputs shared by every rule of one pass
#[derive(Clone, Copy, Debug)]
pub struct RuleContext<'a> {
    pub config: &'a VerifierConfig,
    pub tolerance: f64,
    pub poles: &'a FeatureCollection,
    pub branches: &'a FeatureCollection,
    pub trunks: &'a FeatureCollection,
    pub pole_index: &'a SpatialIndex,
    pub branch_index: &'a SpatialIndex,
    pub trunk_index: &'a SpatialIndex,
    /// Operator-selected trunk-line designation, when one was resolved
    pub designation: Option<&'a str>,
}

impl<'a> RuleContext<'a> {
    pub fn attrs(&self) -> &'a AttributeNames {
        &self.config.attributes
    }

    pub fn codes(&self) -> &'a CodeSets {
        &self.config.codes
    }

    /// Branches within tolerance of `p` among the nearest candidates
    pub fn branches_near(&self, p: Point) -> Vec<&'a Feature> {
        nearest_within_tolerance(p, self.branch_index, self.branches, self.tolerance, self.config.candidate_count())
    }

    /// Trunks within tolerance of `p` among the nearest candidates
    pub fn trunks_near(&self, p: Point) -> Vec<&'a Feature> {
        nearest_within_tolerance(p, self.trunk_index, self.trunks, self.tolerance, self.config.candidate_count())
    }

    /// Poles within tolerance of `p` among the nearest candidates
    pub fn poles_near(&self, p: Point) -> Vec<&'a Feature> {
        nearest_within_tolerance(p, self.pole_index, self.poles, self.tolerance, self.config.candidate_count())
    }

    /// Every pole within tolerance of `p`
    pub fn poles_touching(&self, p: Point) -> Vec<&'a Feature> {
        features_within_tolerance(p, self.pole_index, self.poles, self.tolerance)
    }

    /// Every trunk within tolerance of `p`
    pub fn trunks_touching(&self, p: Point) -> Vec<&'a Feature> {
        features_within_tolerance(p, self.trunk_index, self.trunks, self.tolerance)
    }

    /// Every branch within tolerance of `p`
    pub fn branches_touching(&self, p: Point) -> Vec<&'a Feature> {
        features_within_tolerance(p, self.branch_index, self.branches, self.tolerance)
    }
}
