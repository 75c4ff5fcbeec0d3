//! Append-only accumulation of error records for one verification pass

use super::types::{ErrorKind, ErrorRecord};
use crate::network::Geometry;

/// Point and line error records of one pass
#[derive(Clone, Debug, Default)]
pub struct ErrorCollector {
    points: Vec<ErrorRecord>,
    lines: Vec<ErrorRecord>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pole-centric error
    pub fn add_point(
        &mut self,
        geometry: Geometry,
        layer_name: &str,
        feature_id: i64,
        kind: ErrorKind,
        detail: impl Into<String>,
    ) {
        self.points.push(ErrorRecord {
            layer_name: layer_name.to_string(),
            feature_id,
            error_kind: kind,
            detail: detail.into(),
            geometry,
        });
    }

    /// Record a branch/trunk-centric error
    pub fn add_line(
        &mut self,
        geometry: Geometry,
        layer_name: &str,
        feature_id: i64,
        kind: ErrorKind,
        detail: impl Into<String>,
    ) {
        self.lines.push(ErrorRecord {
            layer_name: layer_name.to_string(),
            feature_id,
            error_kind: kind,
            detail: detail.into(),
            geometry,
        });
    }

    /// Append another collector's records after this one's
    pub fn merge(&mut self, other: ErrorCollector) {
        self.points.extend(other.points);
        self.lines.extend(other.lines);
    }

    pub fn len(&self) -> usize {
        self.points.len() + self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn points(&self) -> &[ErrorRecord] {
        &self.points
    }

    pub fn lines(&self) -> &[ErrorRecord] {
        &self.lines
    }

    /// Hand the two sequences over once the pass is complete
    pub fn finish(self) -> (Vec<ErrorRecord>, Vec<ErrorRecord>) {
        (self.points, self.lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Point;

    #[test]
    fn test_no_dedup_and_merge_order() {
        let g = Geometry::Point(Point::new(1.0, 2.0));
        let mut a = ErrorCollector::new();
        a.add_point(g.clone(), "STALP_JT", 1, ErrorKind::PoleWithoutConnection, "x");
        a.add_point(g.clone(), "STALP_JT", 1, ErrorKind::PoleWithoutConnection, "x");

        let mut b = ErrorCollector::new();
        b.add_point(g.clone(), "STALP_JT", 2, ErrorKind::ClassificationMissingBr, "y");
        b.add_line(g, "TRONSON_JT", 9, ErrorKind::TrunkEndWithoutPole, "z");

        a.merge(b);
        assert_eq!(a.len(), 4);
        let (points, lines) = a.finish();
        assert_eq!(points.len(), 3);
        assert_eq!(points[2].feature_id, 2);
        assert_eq!(lines[0].error_kind, ErrorKind::TrunkEndWithoutPole);
    }
}
