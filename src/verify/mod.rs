//! Topology and attribute verification of the distribution network
//!
//! Uses R-tree spatial indexing for candidate lookups, tolerance-based point/line
//! predicates, endpoint-degree analysis and a fixed sequence of seven rules that
//! emit structured error records. Rules 1-6 can run on the Rayon pool.
//!
//! # Submodules
//! - `types` - Error records, code sets, configuration, rule context
//! - `distance` - Distance, vertex, length and simplicity predicates
//! - `topology` - Endpoint-degree counting
//! - `collector` - Error record accumulation
//! - `checks` - Adjacency rules (1, 2, 3, 6)
//! - `terminals` - Dangling endpoint rules (4, 5)
//! - `bridge` - External continuity model (rule 7)
//! - `runners` - Verification entry point

mod types;
mod distance;
mod topology;
mod collector;
mod checks;
mod terminals;
mod bridge;
mod runners;

pub use types::{
    AttributeNames, CodeSet, CodeSets, ErrorKind, ErrorRecord, LayerNames, RuleContext,
    VerifierConfig, DEFAULT_TOLERANCE, MIN_NEAREST_CANDIDATES,
};

pub use distance::{
    distance, endpoints, features_within_tolerance, is_simple, length,
    nearest_within_tolerance, part_endpoints, point_geometry_distance,
    point_polyline_distance, point_segment_distance, segments_intersect, vertices,
};

pub use topology::{DanglingEndpoint, EndpointDegrees, EndpointKey};

pub use collector::ErrorCollector;

pub use checks::{
    check_branch_classification, check_branching_degree, check_connectivity,
    check_trunk_classification, contains_letters, is_numeric_designation,
};

pub use terminals::{check_terminal_branches, check_trunk_ends};

pub use bridge::{
    fold_continuity_output, run_continuity_check, ContinuityModel, ContinuityOutput,
    ContinuityStatus, PrecomputedContinuity,
};

pub use runners::{
    collection_length_km, reference_designations, run_verification, NetworkLength,
    VerificationReport,
};
