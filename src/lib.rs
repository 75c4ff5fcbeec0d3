//! Topology and attribute verifier for low-voltage distribution networks
//!
//! Poles (points), service branches and trunk segments (lines) are checked for
//! disconnected poles, dangling line ends and inconsistent classification codes.
//!
//! ```ignore
//! let store = InMemoryStore::from_json_file("network.json")?;
//! let report = run_verification(&store, &VerifierConfig::default(), Some("12"), None)?;
//! println!("{} errors", report.error_count());
//! ```

pub mod error;
pub mod network;
pub mod verify;

pub use error::{Result, VerifyError};
pub use network::{Feature, FeatureCollection, FeatureStore, Geometry, GeometryKind, InMemoryStore, Point, Polyline};
pub use verify::{run_verification, ContinuityModel, ErrorKind, ErrorRecord, VerificationReport, VerifierConfig};
