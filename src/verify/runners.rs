//! Verification runner
//!
//! Main entry point for one verification pass:
//! - Resolve and kind-check the input collections (fail fast)
//! - Build the three spatial indices once
//! - Evaluate rules 1-6 in order, optionally on the rayon pool
//! - Run the continuity model bridge (rule 7), degrading instead of failing

use super::bridge::{run_continuity_check, ContinuityModel, ContinuityStatus};
use super::collector::ErrorCollector;
use super::distance::length;
use super::types::{ErrorRecord, RuleContext, VerifierConfig};
use super::{checks, terminals};
use crate::error::Result;
use crate::network::{resolve_layer, FeatureCollection, FeatureStore, GeometryKind, SpatialIndex};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeSet;
use std::time::Instant;

type RuleFn = fn(&RuleContext<'_>, &mut ErrorCollector);

/// Rules 1-6 in evaluation order
const RULES: [(&str, RuleFn); 6] = [
    ("connectivity", checks::check_connectivity),
    ("branch classification", checks::check_branch_classification),
    ("trunk classification", checks::check_trunk_classification),
    ("terminal branches", terminals::check_terminal_branches),
    ("trunk ends", terminals::check_trunk_ends),
    ("branching degree", checks::check_branching_degree),
];

/// Total line length of the working collections, in kilometres
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NetworkLength {
    pub branches_km: f64,
    pub trunks_km: f64,
}

/// Everything one pass hands back to the caller
#[derive(Clone, Debug, Serialize)]
pub struct VerificationReport {
    pub tolerance: f64,
    pub reference_designation: Option<String>,
    pub point_errors: Vec<ErrorRecord>,
    pub line_errors: Vec<ErrorRecord>,
    pub continuity: ContinuityStatus,
    pub network_length: NetworkLength,
}

impl VerificationReport {
    pub fn error_count(&self) -> usize {
        self.point_errors.len() + self.line_errors.len()
    }
}

/// Sorted distinct non-empty names of the designation collection, `None` if it is missing
pub fn reference_designations<S: FeatureStore + ?Sized>(
    store: &S,
    config: &VerifierConfig,
) -> Option<Vec<String>> {
    let layer = store.collection(&config.layers.designations)?;
    let names: BTreeSet<String> = layer
        .features()
        .iter()
        .map(|f| f.attr_text(&config.attributes.name).into_owned())
        .filter(|name| !name.is_empty())
        .collect();
    Some(names.into_iter().collect())
}

/// Sum of feature lengths divided by 1000 (metre coordinates)
pub fn collection_length_km(collection: &FeatureCollection) -> f64 {
    collection
        .features()
        .iter()
        .map(|f| length(&f.geometry))
        .sum::<f64>()
        / 1000.0
}

/// Check the operator's choice against the designation collection
fn resolve_designation<'d, S: FeatureStore + ?Sized>(
    store: &S,
    config: &VerifierConfig,
    designation: Option<&'d str>,
) -> std::result::Result<Option<&'d str>, String> {
    let Some(choices) = reference_designations(store, config) else {
        return Err(format!("layer '{}' not found", config.layers.designations));
    };
    match designation {
        Some(d) if !choices.iter().any(|c| c == d) => Err(format!(
            "designation '{}' not present in '{}'",
            d, config.layers.designations
        )),
        other => Ok(other),
    }
}

/// Run one full verification pass
///
/// Configuration errors (missing layer, wrong geometry kind, bad tolerance) are
/// returned before any rule runs. Rule 7 never fails the pass; its outcome is
/// reported in `VerificationReport::continuity`.
pub fn run_verification<S: FeatureStore + ?Sized>(
    store: &S,
    config: &VerifierConfig,
    designation: Option<&str>,
    model: Option<&dyn ContinuityModel>,
) -> Result<VerificationReport> {
    let start = Instant::now();
    config.validate()?;

    let poles = resolve_layer(store, &config.layers.poles, GeometryKind::Point)?;
    let branches = resolve_layer(store, &config.layers.branches, GeometryKind::Line)?;
    let trunks = resolve_layer(store, &config.layers.trunks, GeometryKind::Line)?;

    let pole_index = SpatialIndex::build(poles);
    let branch_index = SpatialIndex::build(branches);
    let trunk_index = SpatialIndex::build(trunks);

    tracing::info!(
        "[Verify] Indexed {} poles, {} branches, {} trunks in {:?} (tolerance {})",
        pole_index.len(),
        branch_index.len(),
        trunk_index.len(),
        start.elapsed(),
        config.tolerance
    );

    let resolved = resolve_designation(store, config, designation);
    let ctx = RuleContext {
        config,
        tolerance: config.tolerance,
        poles,
        branches,
        trunks,
        pole_index: &pole_index,
        branch_index: &branch_index,
        trunk_index: &trunk_index,
        designation: resolved.as_ref().ok().copied().flatten(),
    };

    let run_rule = |(i, (name, rule)): (usize, &(&str, RuleFn))| {
        let rule_start = Instant::now();
        let mut out = ErrorCollector::new();
        rule(&ctx, &mut out);
        tracing::info!(
            "[Verify] rule {} ({}) produced {} records in {:?}",
            i + 1,
            name,
            out.len(),
            rule_start.elapsed()
        );
        out
    };

    // Per-rule buffers, merged in rule order either way
    let per_rule: Vec<ErrorCollector> = if config.parallel {
        RULES.par_iter().enumerate().map(run_rule).collect()
    } else {
        RULES.iter().enumerate().map(run_rule).collect()
    };

    let mut collector = ErrorCollector::new();
    for out in per_rule {
        collector.merge(out);
    }

    let continuity = match &resolved {
        Ok(_) => run_continuity_check(&ctx, model, &mut collector),
        Err(reason) => {
            tracing::warn!("[Verify] rule 7 skipped: {reason}");
            ContinuityStatus::Skipped {
                reason: reason.clone(),
            }
        }
    };

    let network_length = NetworkLength {
        branches_km: collection_length_km(branches),
        trunks_km: collection_length_km(trunks),
    };

    let (point_errors, line_errors) = collector.finish();
    tracing::info!(
        "[Verify] Pass completed: {} point errors, {} line errors in {:?}",
        point_errors.len(),
        line_errors.len(),
        start.elapsed()
    );

    Ok(VerificationReport {
        tolerance: config.tolerance,
        reference_designation: ctx.designation.map(str::to_string),
        point_errors,
        line_errors,
        continuity,
        network_length,
    })
}
