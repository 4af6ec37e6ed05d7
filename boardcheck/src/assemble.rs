//! Turns raw check findings into the final issue list.
//!
//! Responsibilities: dedupe candidates describing the same defect, assign
//! deterministic ids, and order the output stably so repeated runs over the
//! same board produce byte-identical results.

use std::collections::BTreeMap;

use crate::checks::IssueCandidate;
use crate::schema::{Issue, IssueKind};

/// Deterministic issue id: the kind plus the sorted related ids.
///
/// The same defect therefore keeps its id across runs and across builds,
/// which the UI relies on to key explanation caches and track user fixes.
pub fn issue_id(kind: IssueKind, related_ids: &[String]) -> String {
    if related_ids.is_empty() {
        return kind.as_str().to_string();
    }
    format!("{}:{}", kind.as_str(), related_ids.join("+"))
}

/// Deduplicate, identify, and order candidate findings.
///
/// Candidates with the same kind and the same set of related ids describe the
/// same defect; the highest-severity instance wins. The final list is sorted
/// by severity (errors first), then kind, then related ids.
pub fn assemble(candidate_lists: Vec<Vec<IssueCandidate>>) -> Vec<Issue> {
    let mut by_defect: BTreeMap<(IssueKind, Vec<String>), IssueCandidate> = BTreeMap::new();

    for candidate in candidate_lists.into_iter().flatten() {
        let mut related_ids = candidate.related_ids.clone();
        related_ids.sort();
        related_ids.dedup();
        let key = (candidate.kind, related_ids);
        let keep_new = match by_defect.get(&key) {
            Some(existing) => candidate.severity > existing.severity,
            None => true,
        };
        if keep_new {
            by_defect.insert(key, candidate);
        }
    }

    let mut issues: Vec<Issue> = by_defect
        .into_iter()
        .map(|((kind, related_ids), candidate)| Issue {
            id: issue_id(kind, &related_ids),
            kind,
            severity: candidate.severity,
            message: candidate.message,
            related_ids,
            location: candidate.location,
        })
        .collect();

    issues.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.kind.cmp(&b.kind))
            .then_with(|| a.related_ids.cmp(&b.related_ids))
    });

    debug_assert!(
        {
            let mut ids: Vec<&str> = issues.iter().map(|i| i.id.as_str()).collect();
            ids.sort();
            ids.windows(2).all(|w| w[0] != w[1])
        },
        "assembler produced duplicate issue ids"
    );

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Severity;

    fn candidate(
        kind: IssueKind,
        severity: Severity,
        related: &[&str],
        message: &str,
    ) -> IssueCandidate {
        IssueCandidate {
            kind,
            severity,
            message: message.to_string(),
            related_ids: related.iter().map(|s| s.to_string()).collect(),
            location: None,
        }
    }

    #[test]
    fn test_issue_id_is_deterministic() {
        let related = vec!["N1".to_string(), "R1".to_string()];
        assert_eq!(issue_id(IssueKind::UnconnectedNet, &related), "unconnected_net:N1+R1");
        assert_eq!(issue_id(IssueKind::BoardEdge, &[]), "board_edge");
    }

    #[test]
    fn test_dedup_same_defect() {
        // Same kind, same ids in different order: one issue.
        let issues = assemble(vec![
            vec![candidate(IssueKind::ShortCircuit, Severity::Error, &["N2", "N1"], "a")],
            vec![candidate(IssueKind::ShortCircuit, Severity::Error, &["N1", "N2"], "b")],
        ]);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].related_ids, vec!["N1".to_string(), "N2".to_string()]);
    }

    #[test]
    fn test_dedup_keeps_highest_severity() {
        let issues = assemble(vec![vec![
            candidate(IssueKind::ClearanceViolation, Severity::Info, &["R1", "R2"], "low"),
            candidate(IssueKind::ClearanceViolation, Severity::Warning, &["R1", "R2"], "high"),
            candidate(IssueKind::ClearanceViolation, Severity::Info, &["R1", "R2"], "low again"),
        ]]);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(issues[0].message, "high");
    }

    #[test]
    fn test_distinct_defects_survive() {
        let issues = assemble(vec![vec![
            candidate(IssueKind::UnconnectedNet, Severity::Error, &["N1", "R1"], "a"),
            candidate(IssueKind::UnconnectedNet, Severity::Error, &["N2", "R1"], "b"),
            candidate(IssueKind::MissingComponent, Severity::Error, &["N1"], "c"),
        ]]);
        assert_eq!(issues.len(), 3);
        let ids: Vec<&str> = issues.iter().map(|i| i.id.as_str()).collect();
        assert!(ids.contains(&"unconnected_net:N1+R1"));
        assert!(ids.contains(&"unconnected_net:N2+R1"));
        assert!(ids.contains(&"missing_component:N1"));
    }

    #[test]
    fn test_output_ordering() {
        let issues = assemble(vec![vec![
            candidate(IssueKind::ClearanceViolation, Severity::Warning, &["R1", "R2"], "w"),
            candidate(IssueKind::UnconnectedNet, Severity::Error, &["N2"], "e2"),
            candidate(IssueKind::BoardEdge, Severity::Error, &["R9"], "e1"),
            candidate(IssueKind::UnconnectedNet, Severity::Error, &["N1"], "e3"),
        ]]);
        // Errors before warnings; within a severity, kind order; within a
        // kind, related-id order.
        let ids: Vec<&str> = issues.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "unconnected_net:N1",
                "unconnected_net:N2",
                "board_edge:R9",
                "clearance_violation:R1+R2",
            ]
        );
    }
}
