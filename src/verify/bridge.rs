//! Bridge to the external conductor-break detection model (rule 7)
//!
//! The model itself is opaque: it takes poles, trunks and the operator-selected
//! designation and returns a point and a line collection. Its features are folded
//! into the pass's collector as "conductor not broken" records.

use super::collector::ErrorCollector;
use super::types::{ErrorKind, RuleContext};
use crate::error::{Result, VerifyError};
use crate::network::{AttrValue, Feature, FeatureCollection, Geometry, GeometryKind, Polyline};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Raw outputs of the continuity model
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContinuityOutput {
    /// Poles where the conductor is not broken
    pub points: FeatureCollection,
    /// Trunks where the conductor is not broken
    pub lines: FeatureCollection,
}

/// Pluggable continuity-check procedure
pub trait ContinuityModel {
    fn detect_breaks(
        &self,
        poles: &FeatureCollection,
        trunks: &FeatureCollection,
        designation: &str,
    ) -> Result<ContinuityOutput>;
}

/// Model whose outputs were computed ahead of time and saved as JSON
#[derive(Clone, Debug)]
pub struct PrecomputedContinuity {
    output: ContinuityOutput,
}

impl PrecomputedContinuity {
    pub fn new(output: ContinuityOutput) -> Self {
        Self { output }
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| VerifyError::Io {
            source,
            path: path.to_path_buf(),
        })?;
        let output = serde_json::from_str(&text).map_err(|source| VerifyError::Json {
            source,
            path: path.to_path_buf(),
        })?;
        Ok(Self { output })
    }
}

impl ContinuityModel for PrecomputedContinuity {
    fn detect_breaks(
        &self,
        _poles: &FeatureCollection,
        _trunks: &FeatureCollection,
        _designation: &str,
    ) -> Result<ContinuityOutput> {
        Ok(self.output.clone())
    }
}

/// Outcome of rule 7, distinguishing "not run" from "no violations"
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ContinuityStatus {
    Completed { point_records: usize, line_records: usize },
    Skipped { reason: String },
    Failed { reason: String },
}

impl ContinuityStatus {
    pub fn executed(&self) -> bool {
        matches!(self, ContinuityStatus::Completed { .. })
    }
}

/// Rule 7: call the model and fold its outputs; failures leave `out` untouched
pub fn run_continuity_check(
    ctx: &RuleContext,
    model: Option<&dyn ContinuityModel>,
    out: &mut ErrorCollector,
) -> ContinuityStatus {
    let Some(model) = model else {
        return skipped("no continuity model configured");
    };
    let Some(designation) = ctx.designation else {
        return skipped("no reference designation selected");
    };

    let folded = model
        .detect_breaks(ctx.poles, ctx.trunks, designation)
        .and_then(|output| fold_continuity_output(ctx, &output));

    match folded {
        Ok(records) => {
            let status = ContinuityStatus::Completed {
                point_records: records.points().len(),
                line_records: records.lines().len(),
            };
            out.merge(records);
            status
        }
        Err(e) => {
            tracing::error!("[Verify] continuity model failed: {e}");
            ContinuityStatus::Failed {
                reason: e.to_string(),
            }
        }
    }
}

fn skipped(reason: &str) -> ContinuityStatus {
    tracing::warn!("[Verify] rule 7 skipped: {reason}");
    ContinuityStatus::Skipped {
        reason: reason.to_string(),
    }
}

fn back_reference(feature: &Feature, attr: &str) -> i64 {
    feature
        .attr(attr)
        .and_then(AttrValue::as_i64)
        .unwrap_or(feature.id)
}

/// Convert model outputs into error records
pub fn fold_continuity_output(ctx: &RuleContext, output: &ContinuityOutput) -> Result<ErrorCollector> {
    for (collection, kind) in [
        (&output.points, GeometryKind::Point),
        (&output.lines, GeometryKind::Line),
    ] {
        collection
            .ensure_kind(kind)
            .map_err(|e| VerifyError::Model(format!("unexpected output shape: {e}")))?;
    }

    let back_ref = &ctx.attrs().back_reference;
    let mut records = ErrorCollector::new();

    for f in output.points.features() {
        records.add_point(
            f.geometry.clone(),
            ctx.poles.name(),
            back_reference(f, back_ref),
            ErrorKind::ConductorNotBroken,
            "Conductor is not broken at the pole",
        );
    }

    // Report against the original trunk geometry when the link resolves
    let trunk_geometry: HashMap<i64, &Geometry> = ctx
        .trunks
        .features()
        .iter()
        .map(|t| (back_reference(t, back_ref), &t.geometry))
        .collect();

    for f in output.lines.features() {
        let link = back_reference(f, back_ref);
        let geometry = match trunk_geometry.get(&link) {
            Some(g) => (*g).clone(),
            None => first_part(&f.geometry),
        };
        records.add_line(
            geometry,
            ctx.trunks.name(),
            link,
            ErrorKind::ConductorNotBroken,
            "Conductor is not broken along the trunk",
        );
    }

    Ok(records)
}

fn first_part(geometry: &Geometry) -> Geometry {
    match geometry {
        Geometry::Line(line) if line.is_multipart() => {
            Geometry::Line(Polyline::single(line.parts[0].clone()))
        }
        other => other.clone(),
    }
}
