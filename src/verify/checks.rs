//! Pole/line adjacency rules
//!
//! Rule 1 (connectivity), rule 2 (classification vs. branch adjacency),
//! rule 3 (classification vs. numeric trunk adjacency) and rule 6 (branching
//! degree vs. connection type).

use super::collector::ErrorCollector;
use super::distance::vertices;
use super::types::{ErrorKind, RuleContext};
use crate::network::{Feature, FeatureCollection};

/// True for a non-empty designation made only of digits
pub fn is_numeric_designation(value: &str) -> bool {
    !value.is_empty()
        && value.chars().all(char::is_alphanumeric)
        && !value.chars().any(char::is_alphabetic)
}

pub fn contains_letters(value: &str) -> bool {
    value.chars().any(char::is_alphabetic)
}

fn classification_has(feature: &Feature, attr: &str, marker: &str) -> bool {
    feature.attr_text(attr).to_uppercase().contains(marker)
}

/// Rule 1: poles must touch a branch or trunk; lines must touch a pole
pub fn check_connectivity(ctx: &RuleContext, out: &mut ErrorCollector) {
    for pole in ctx.poles.features() {
        let Some(pt) = pole.geometry.as_point() else {
            continue;
        };
        let snapped = !ctx.branches_near(pt).is_empty() || !ctx.trunks_near(pt).is_empty();
        if !snapped {
            out.add_point(
                pole.geometry.clone(),
                ctx.poles.name(),
                pole.id,
                ErrorKind::PoleWithoutConnection,
                format!(
                    "Not snapped to {} or {}",
                    ctx.branches.name(),
                    ctx.trunks.name()
                ),
            );
        }
    }

    let conductor_attr = &ctx.attrs().conductor_type;
    let service_only = &ctx.codes().service_only_conductors;
    check_lines_touch_poles(ctx, ctx.branches, ErrorKind::BranchWithoutConnection, out, |f| {
        service_only.contains(&f.attr_text(conductor_attr))
    });
    check_lines_touch_poles(ctx, ctx.trunks, ErrorKind::TrunkWithoutConnection, out, |_| false);
}

fn check_lines_touch_poles<F>(
    ctx: &RuleContext,
    lines: &FeatureCollection,
    kind: ErrorKind,
    out: &mut ErrorCollector,
    exempt: F,
) where
    F: Fn(&Feature) -> bool,
{
    for feat in lines.features() {
        if exempt(feat) {
            continue;
        }
        let Some(line) = feat.geometry.as_polyline() else {
            continue;
        };
        if line.vertex_count() == 0 {
            tracing::debug!("[Verify] {}: feature {} has no vertices, skipped", lines.name(), feat.id);
            continue;
        }

        // One snapped vertex is enough
        let snapped = vertices(line).any(|v| !ctx.poles_near(v).is_empty());
        if !snapped {
            out.add_line(
                feat.geometry.clone(),
                lines.name(),
                feat.id,
                kind,
                format!("Not snapped to {}", ctx.poles.name()),
            );
        }
    }
}

/// Rule 2: classification contains "BR" iff the pole touches a branch
pub fn check_branch_classification(ctx: &RuleContext, out: &mut ErrorCollector) {
    let attr = &ctx.attrs().classification;
    for pole in ctx.poles.features() {
        let Some(pt) = pole.geometry.as_point() else {
            continue;
        };
        let touches = !ctx.branches_near(pt).is_empty();
        let has_br = classification_has(pole, attr, "BR");

        if touches && !has_br {
            out.add_point(
                pole.geometry.clone(),
                ctx.poles.name(),
                pole.id,
                ErrorKind::ClassificationMissingBr,
                format!(
                    "Intersects {} but 'BR' is missing from {} ('{}')",
                    ctx.branches.name(),
                    attr,
                    pole.attr_text(attr)
                ),
            );
        }
        if !touches && has_br {
            out.add_point(
                pole.geometry.clone(),
                ctx.poles.name(),
                pole.id,
                ErrorKind::ClassificationBrWithoutAdjacency,
                format!(
                    "'BR' present in {} but no {} intersects the pole",
                    attr,
                    ctx.branches.name()
                ),
            );
        }
    }
}

/// Rule 3: classification contains "JT" iff the pole touches a numerically named trunk
pub fn check_trunk_classification(ctx: &RuleContext, out: &mut ErrorCollector) {
    let attr = &ctx.attrs().classification;
    let name_attr = &ctx.attrs().name;
    for pole in ctx.poles.features() {
        let Some(pt) = pole.geometry.as_point() else {
            continue;
        };
        let touches = ctx
            .trunks_near(pt)
            .iter()
            .any(|t| is_numeric_designation(&t.attr_text(name_attr)));
        let has_jt = classification_has(pole, attr, "JT");

        if touches && !has_jt {
            out.add_point(
                pole.geometry.clone(),
                ctx.poles.name(),
                pole.id,
                ErrorKind::ClassificationMissingJt,
                format!(
                    "Intersects {} with numeric {} but 'JT' is missing from {} ('{}')",
                    ctx.trunks.name(),
                    name_attr,
                    attr,
                    pole.attr_text(attr)
                ),
            );
        }
        if !touches && has_jt {
            out.add_point(
                pole.geometry.clone(),
                ctx.poles.name(),
                pole.id,
                ErrorKind::ClassificationJtWithoutAdjacency,
                format!(
                    "'JT' present in {} but no numeric {} intersects the pole",
                    attr,
                    ctx.trunks.name()
                ),
            );
        }
    }
}

/// Rule 6: a pole joining more than two trunks needs a branching connection type
pub fn check_branching_degree(ctx: &RuleContext, out: &mut ErrorCollector) {
    let attr = &ctx.attrs().connection_type;
    let branching = &ctx.codes().branching_connections;
    for pole in ctx.poles.features() {
        let Some(pt) = pole.geometry.as_point() else {
            continue;
        };
        let trunk_count = ctx.trunks_near(pt).len();
        if trunk_count <= 2 {
            continue;
        }
        let actual = pole.attr_text(attr);
        if !branching.contains(&actual) {
            out.add_point(
                pole.geometry.clone(),
                ctx.poles.name(),
                pole.id,
                ErrorKind::BranchPointWithoutClassification,
                format!(
                    "{} {} meet at the pole but {} is not a branching code. Actual value: `{}`",
                    trunk_count,
                    ctx.trunks.name(),
                    attr,
                    actual.trim()
                ),
            );
        }
    }
}
