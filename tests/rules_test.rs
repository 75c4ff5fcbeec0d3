// Rule-by-rule behaviour on small controlled fixtures
mod common;

use common::*;
use network_verifier::verify::{run_verification, ErrorKind, VerificationReport, VerifierConfig};
use network_verifier::network::{Feature, Geometry, InMemoryStore, Point, Polyline};

fn verify(store: &InMemoryStore) -> VerificationReport {
    run_verification(store, &VerifierConfig::default(), None, None).expect("verification failed")
}

#[test]
fn test_isolated_pole_single_error() {
    let store = Network::new().poles(vec![pole(1, 10.0, 10.0)]).store();
    let report = verify(&store);

    assert_eq!(report.point_errors.len(), 1);
    assert_eq!(report.point_errors[0].error_kind, ErrorKind::PoleWithoutConnection);
    assert_eq!(report.point_errors[0].feature_id, 1);
    assert_eq!(report.point_errors[0].layer_name, POLES);
    assert!(report.line_errors.is_empty());
}

#[test]
fn test_pole_connectivity_iff_no_line_nearby() {
    let store = Network::new()
        .poles(vec![
            pole(1, 5.0, 0.0),     // on branch
            pole(2, 50.0, 20.0),   // on trunk
            pole(3, 200.0, 200.0), // isolated
            pole(4, 80.0, 20.005), // within tolerance of trunk
            pole(5, 80.0, 20.02),  // just outside
        ])
        .branches(vec![line(10, &[(0.0, 0.0), (10.0, 0.0)])])
        .trunks(vec![line(20, &[(0.0, 20.0), (100.0, 20.0)])])
        .store();
    let report = verify(&store);

    assert_eq!(ids_of(&report.point_errors, ErrorKind::PoleWithoutConnection), vec![3, 5]);
}

#[test]
fn test_tolerance_boundary_is_inclusive() {
    let mut config = VerifierConfig::default();
    config.tolerance = 0.5;

    let store = Network::new()
        .poles(vec![pole(1, 0.0, 0.5), pole(2, 0.0, -0.5000001)])
        .trunks(vec![line(20, &[(-10.0, 0.0), (10.0, 0.0)])])
        .store();
    let report = run_verification(&store, &config, None, None).unwrap();

    assert_eq!(ids_of(&report.point_errors, ErrorKind::PoleWithoutConnection), vec![2]);
}

#[test]
fn test_service_only_branch_exempt() {
    let store = Network::new()
        .branches(vec![
            line(1, &[(0.0, 0.0), (10.0, 0.0)]).with_attr("TIP_COND", "acyaby 4X16"),
            line(2, &[(0.0, 5.0), (10.0, 5.0)]).with_attr("TIP_COND", "TYIR 3x50AL"),
        ])
        .store();
    let report = verify(&store);

    assert_eq!(report.line_errors.len(), 1);
    assert_eq!(report.line_errors[0].error_kind, ErrorKind::BranchWithoutConnection);
    assert_eq!(report.line_errors[0].feature_id, 2);
}

#[test]
fn test_line_snapped_by_any_vertex() {
    let store = Network::new()
        .poles(vec![pole(1, 20.0, 0.0)])
        .trunks(vec![
            line(10, &[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]),
            line(11, &[(0.0, 50.0), (20.0, 50.0)]),
        ])
        .store();
    let report = verify(&store);

    assert_eq!(ids_of(&report.line_errors, ErrorKind::TrunkWithoutConnection), vec![11]);
}

#[test]
fn test_empty_line_is_skipped() {
    let store = Network::new()
        .poles(vec![pole(1, 0.0, 0.0)])
        .trunks(vec![line(10, &[]), line(11, &[(0.0, 0.0), (5.0, 0.0)])])
        .store();
    let report = verify(&store);

    assert!(ids_of(&report.line_errors, ErrorKind::TrunkWithoutConnection).is_empty());
    assert_eq!(ids_of(&report.line_errors, ErrorKind::TrunkEndWithoutPole), vec![11]);
}

#[test]
fn test_branch_classification_both_directions() {
    let store = Network::new()
        .poles(vec![
            pole(1, 0.0, 0.0).with_attr("TIP_CIR", "JT+BR"),
            pole(2, 10.0, 0.0).with_attr("TIP_CIR", "JT"),
            pole(3, 0.0, 20.0).with_attr("TIP_CIR", "jt br"),
            pole(4, 10.0, 20.0).with_attr("TIP_CIR", "JT"),
        ])
        .branches(vec![line(10, &[(0.0, 0.0), (10.0, 0.0)])])
        .trunks(vec![line(20, &[(0.0, 20.0), (10.0, 20.0)])])
        .store();
    let report = verify(&store);

    assert_eq!(ids_of(&report.point_errors, ErrorKind::ClassificationMissingBr), vec![2]);
    assert_eq!(ids_of(&report.point_errors, ErrorKind::ClassificationBrWithoutAdjacency), vec![3]);
}

#[test]
fn test_trunk_classification_numeric_names_only() {
    let store = Network::new()
        .poles(vec![
            pole(1, 0.0, 0.0).with_attr("TIP_CIR", ""),
            pole(2, 10.0, 0.0).with_attr("TIP_CIR", "JT"),
            pole(3, 0.0, 20.0).with_attr("TIP_CIR", "JT"),
            pole(4, 10.0, 20.0),
        ])
        .trunks(vec![
            line(20, &[(0.0, 0.0), (10.0, 0.0)]).with_attr("DENUM", 12.0),
            line(21, &[(0.0, 20.0), (10.0, 20.0)]).with_attr("DENUM", "L1"),
        ])
        .store();
    let report = verify(&store);

    assert_eq!(ids_of(&report.point_errors, ErrorKind::ClassificationMissingJt), vec![1]);
    assert_eq!(ids_of(&report.point_errors, ErrorKind::ClassificationJtWithoutAdjacency), vec![3]);
}

#[test]
fn test_terminal_classification_on_letter_branch() {
    let store = Network::new()
        .poles(vec![
            pole(1, 10.0, 0.0).with_attr("TIP_LEG_JT", "T"),
            pole(2, 30.0, 0.0).with_attr("TIP_LEG_JT", "t"),
            pole(3, 0.0, 0.0).with_attr("TIP_LEG_JT", "ic"),
            pole(4, 5.0, 0.0).with_attr("TIP_LEG_JT", "t/d"),
        ])
        .branches(vec![
            line(10, &[(0.0, 0.0), (10.0, 0.0)]).with_attr("DENUM", "A1"),
            line(11, &[(20.0, 0.0), (30.0, 0.0)]).with_attr("DENUM", "5"),
        ])
        .store();
    let report = verify(&store);

    // Pole 4 is mid-span, pole 2 ends a numeric branch, pole 3 is not terminal-coded
    assert_eq!(
        ids_of(&report.point_errors, ErrorKind::IncorrectTerminalClassification),
        vec![1]
    );
}

#[test]
fn test_shared_branch_end_is_not_terminal() {
    let store = Network::new()
        .poles(vec![pole(1, 10.0, 0.0).with_attr("TIP_LEG_JT", "t")])
        .branches(vec![
            line(10, &[(0.0, 0.0), (10.0, 0.0)]).with_attr("DENUM", "A1"),
            line(11, &[(10.0, 0.0), (20.0, 0.0)]).with_attr("DENUM", "A2"),
        ])
        .store();
    let report = verify(&store);

    assert!(ids_of(&report.point_errors, ErrorKind::IncorrectTerminalClassification).is_empty());
}

fn trunk_end_network(conn: &str, conductor: &str) -> InMemoryStore {
    Network::new()
        .poles(vec![
            pole(1, 0.0, 0.0).with_attr("TIP_LEG_JT", conn),
            pole(2, 100.0, 0.0),
            pole(3, 50.0, 0.0),
        ])
        .branches(vec![
            line(30, &[(0.0, 0.0), (0.0, -20.0)]).with_attr("TIP_FIRI_BR", "BMPM"),
        ])
        .trunks(vec![
            line(20, &[(0.0, 0.0), (100.0, 0.0)]).with_attr("TIP_COND", conductor),
            line(21, &[(100.0, 0.0), (200.0, 0.0)]).with_attr("TIP_COND", conductor),
        ])
        .store()
}

#[test]
fn test_trunk_end_without_pole() {
    let report = verify(&trunk_end_network("t", "TYIR 50AL"));

    assert_eq!(ids_of(&report.line_errors, ErrorKind::TrunkEndWithoutPole), vec![21]);
    let record = report
        .line_errors
        .iter()
        .find(|r| r.error_kind == ErrorKind::TrunkEndWithoutPole)
        .unwrap();
    assert_eq!(record.layer_name, TRUNKS);
    assert!(record.detail.contains("200.000"));
}

#[test]
fn test_dangling_trunk_pole_must_be_terminal() {
    let report = verify(&trunk_end_network("s", "TYIR 50AL"));

    let records: Vec<_> = report
        .point_errors
        .iter()
        .filter(|r| r.error_kind == ErrorKind::PoleMustBeTerminal)
        .collect();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].layer_name, BRANCHES);
    assert_eq!(records[0].feature_id, 30);
    assert!(records[0].detail.contains("BMPM"));
    assert!(records[0].detail.contains("Actual value: s"));
}

#[test]
fn test_dangling_trunk_pole_exemptions() {
    // Already terminal
    let report = verify(&trunk_end_network("T/D", "TYIR 50AL"));
    assert!(ids_of(&report.point_errors, ErrorKind::PoleMustBeTerminal).is_empty());

    // Conductor continues past the end
    let report = verify(&trunk_end_network("s", "TYIR 2x25AL"));
    assert!(ids_of(&report.point_errors, ErrorKind::PoleMustBeTerminal).is_empty());
}

#[test]
fn test_branching_degree() {
    let star = |conn: &str| {
        Network::new()
            .poles(vec![pole(1, 0.0, 0.0).with_attr("TIP_LEG_JT", conn)])
            .trunks(vec![
                line(20, &[(0.0, 0.0), (10.0, 0.0)]),
                line(21, &[(0.0, 0.0), (0.0, 10.0)]),
                line(22, &[(-10.0, 0.0), (0.0, 0.0)]),
            ])
            .store()
    };

    let report = verify(&star("t"));
    let records: Vec<_> = report
        .point_errors
        .iter()
        .filter(|r| r.error_kind == ErrorKind::BranchPointWithoutClassification)
        .collect();
    assert_eq!(records.len(), 1);
    assert!(records[0].detail.contains("`t`"));
    // The three outer ends dangle without poles
    assert_eq!(
        ids_of(&report.line_errors, ErrorKind::TrunkEndWithoutPole),
        vec![20, 21, 22]
    );

    let report = verify(&star("IC/D"));
    assert!(ids_of(&report.point_errors, ErrorKind::BranchPointWithoutClassification).is_empty());
}

#[test]
fn test_dangling_trunk_pole_touching_second_trunk_mid_span() {
    let store = Network::new()
        .poles(vec![pole(1, 0.0, 0.0).with_attr("TIP_LEG_JT", "s")])
        .branches(vec![
            line(30, &[(0.0, 0.0), (-20.0, -20.0)]).with_attr("TIP_FIRI_BR", "BMPM"),
        ])
        .trunks(vec![
            line(20, &[(0.0, 0.0), (100.0, 0.0)]).with_attr("TIP_COND", "TYIR 50AL"),
            line(40, &[(0.0, -50.0), (0.0, 50.0)]).with_attr("TIP_COND", "TYIR 50AL"),
        ])
        .store();
    let report = verify(&store);

    assert!(ids_of(&report.point_errors, ErrorKind::PoleMustBeTerminal).is_empty());
    // The pole still counts as the end of trunk 20
    assert_eq!(ids_of(&report.line_errors, ErrorKind::TrunkEndWithoutPole), vec![20, 40, 40]);
}

#[test]
fn test_dangling_trunk_pole_with_two_branches() {
    let store = Network::new()
        .poles(vec![pole(1, 0.0, 0.0).with_attr("TIP_LEG_JT", "s")])
        .branches(vec![
            line(30, &[(0.0, 0.0), (0.0, -20.0)]).with_attr("TIP_FIRI_BR", "BMPM"),
            line(31, &[(0.0, 0.0), (-20.0, 0.0)]).with_attr("TIP_FIRI_BR", "ALTUL"),
        ])
        .trunks(vec![line(20, &[(0.0, 0.0), (100.0, 0.0)]).with_attr("TIP_COND", "TYIR 50AL")])
        .store();
    let report = verify(&store);

    assert!(ids_of(&report.point_errors, ErrorKind::PoleMustBeTerminal).is_empty());
}

#[test]
fn test_multipart_trunk_joint_is_not_dangling() {
    let trunk = Feature::new(
        20,
        Geometry::Line(Polyline::multi(vec![
            vec![Point::new(0.0, 0.0), Point::new(50.0, 0.0)],
            vec![Point::new(50.0, 0.0), Point::new(100.0, 0.0)],
        ])),
    );
    let store = Network::new()
        .poles(vec![pole(1, 0.0, 0.0), pole(2, 100.0, 0.0)])
        .trunks(vec![trunk])
        .store();
    let report = verify(&store);

    assert!(ids_of(&report.line_errors, ErrorKind::TrunkEndWithoutPole).is_empty());
}
