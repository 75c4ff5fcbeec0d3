//! Dangling-endpoint rules
//!
//! Rule 4 checks poles sitting on terminal branch ends, rule 5 checks that every
//! dangling trunk end carries a pole and that the pole is classified as terminal
//! when a single service branch leaves it.
//!
//! The code-set conditions below are kept literal; their domain rationale has not
//! been confirmed by a network engineer.

use super::checks::contains_letters;
use super::collector::ErrorCollector;
use super::topology::EndpointDegrees;
use super::types::{ErrorKind, RuleContext};
use crate::network::Feature;
use std::collections::{HashMap, HashSet};

/// Rule 4: terminal codes are wrong on poles ending a letter-named branch
pub fn check_terminal_branches(ctx: &RuleContext, out: &mut ErrorCollector) {
    let conn_attr = &ctx.attrs().connection_type;
    let name_attr = &ctx.attrs().name;
    let terminal_codes = &ctx.codes().terminal_connections;

    let degrees = EndpointDegrees::from_collection(ctx.branches, ctx.config.endpoint_precision);
    let terminals = degrees.dangling_endpoints(ctx.branches);

    // pole id -> first offending branch id
    let mut flagged: HashMap<i64, i64> = HashMap::new();
    for end in &terminals {
        let Some(branch) = ctx.branches.get(end.feature_id) else {
            continue;
        };
        if !contains_letters(&branch.attr_text(name_attr)) {
            continue;
        }
        for pole in ctx.poles_touching(end.point) {
            if terminal_codes.contains(&pole.attr_text(conn_attr)) {
                flagged.entry(pole.id).or_insert(branch.id);
            }
        }
    }

    for pole in ctx.poles.features() {
        let Some(&branch_id) = flagged.get(&pole.id) else {
            continue;
        };
        let branch_name = ctx
            .branches
            .get(branch_id)
            .map(|b| b.attr_text(name_attr).into_owned())
            .unwrap_or_default();
        out.add_point(
            pole.geometry.clone(),
            ctx.poles.name(),
            pole.id,
            ErrorKind::IncorrectTerminalClassification,
            format!(
                "Terminal pole of {} {} ('{}', letters in {}) has {} = '{}'",
                ctx.branches.name(),
                branch_id,
                branch_name,
                name_attr,
                conn_attr,
                pole.attr_text(conn_attr).trim()
            ),
        );
    }

    tracing::debug!(
        "[Verify] rule 4: {} terminal branch endpoints, {} poles flagged",
        terminals.len(),
        flagged.len()
    );
}

/// Rule 5: dangling trunk ends need a pole, classified terminal where required
pub fn check_trunk_ends(ctx: &RuleContext, out: &mut ErrorCollector) {
    let degrees = EndpointDegrees::from_collection(ctx.trunks, ctx.config.endpoint_precision);
    let dangling = degrees.dangling_endpoints(ctx.trunks);
    let mut evaluated: HashSet<i64> = HashSet::new();

    for end in &dangling {
        let Some(trunk) = ctx.trunks.get(end.feature_id) else {
            continue;
        };
        let poles = ctx.poles_touching(end.point);
        if poles.is_empty() {
            out.add_line(
                trunk.geometry.clone(),
                ctx.trunks.name(),
                trunk.id,
                ErrorKind::TrunkEndWithoutPole,
                format!(
                    "Trunk end ({:.3}, {:.3}) has no matching {}",
                    end.point.x,
                    end.point.y,
                    ctx.poles.name()
                ),
            );
            continue;
        }
        for pole in poles {
            if evaluated.insert(pole.id) {
                check_terminal_pole(ctx, pole, out);
            }
        }
    }
}

/// Terminal classification of a pole found on a dangling trunk end
fn check_terminal_pole(ctx: &RuleContext, pole: &Feature, out: &mut ErrorCollector) {
    let attrs = ctx.attrs();
    let codes = ctx.codes();
    let Some(pt) = pole.geometry.as_point() else {
        return;
    };

    // Exactly one trunk. The pole sits on that trunk's dangling end, so a
    // second (mid-span) contact is what rules it out.
    let trunks = ctx.trunks_touching(pt);
    let [trunk] = trunks.as_slice() else {
        return;
    };

    let branches = ctx.branches_touching(pt);
    let [branch] = branches.as_slice() else {
        return;
    };
    let branch_type = branch.attr_text(&attrs.branch_type);
    if !codes.terminal_branch_types.contains(&branch_type) {
        return;
    }
    let conn = pole.attr_text(&attrs.connection_type);
    if codes.terminal_connections.contains(&conn) {
        return;
    }
    if codes.continuing_conductors.contains(&trunk.attr_text(&attrs.conductor_type)) {
        return;
    }

    out.add_point(
        pole.geometry.clone(),
        ctx.branches.name(),
        branch.id,
        ErrorKind::PoleMustBeTerminal,
        format!(
            "Pole {} intersects a single {} with {} = '{}'. {} must be a terminal code. Actual value: {}",
            pole.id,
            ctx.branches.name(),
            attrs.branch_type,
            branch_type.trim().to_uppercase(),
            attrs.connection_type,
            conn.trim().to_lowercase()
        ),
    );
}
