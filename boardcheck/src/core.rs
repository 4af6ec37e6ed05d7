//! Engine facade: fail-fast input validation, the DRC policy, and the
//! `validate` entry point used by persistence/API layers.
//!
//! `validate` is a pure function of the board: same board in, same issues out,
//! in the same order, regardless of prior issues or call history. Defects in
//! the design itself always come back as issues; only structurally malformed
//! input is an error.

use std::collections::HashSet;

use crate::assemble::assemble;
use crate::checks::{CheckContext, CheckEngine};
use crate::connectivity::ConnectivityGraph;
use crate::schema::{Board, Design, Issue, Severity};

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("board outline must be empty or a polygon of at least 3 vertices, got {0}")]
    OutlineTooSmall(usize),
    #[error("board must have at least 1 layer")]
    NoLayers,
    #[error("duplicate component id '{0}'")]
    DuplicateComponentId(String),
    #[error("duplicate net id '{0}'")]
    DuplicateNetId(String),
}

#[derive(Debug, thiserror::Error)]
pub enum BoardCheckError {
    #[error("Invalid input: {0}")]
    Input(#[from] InputError),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Tunable thresholds for the rule checks. One policy value feeds every check
/// that needs it; checks carry no thresholds of their own.
#[derive(Clone, Debug)]
pub struct DrcPolicy {
    /// Minimum separation between electrically distinct components, in board
    /// units.
    pub min_clearance: f64,
}

impl Default for DrcPolicy {
    fn default() -> Self {
        Self { min_clearance: 1.0 }
    }
}

/// Issue counts by severity, for CLI summaries and UI badges.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct ValidationStats {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl ValidationStats {
    pub fn from_issues(issues: &[Issue]) -> Self {
        let mut stats = ValidationStats::default();
        for issue in issues {
            match issue.severity {
                Severity::Error => stats.errors += 1,
                Severity::Warning => stats.warnings += 1,
                Severity::Info => stats.infos += 1,
            }
        }
        stats
    }

    pub fn total(&self) -> usize {
        self.errors + self.warnings + self.infos
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

/// Reject structurally malformed boards before any check runs.
fn check_structure(board: &Board) -> Result<(), InputError> {
    let outline_len = board.outline.len();
    if outline_len > 0 && outline_len < 3 {
        return Err(InputError::OutlineTooSmall(outline_len));
    }
    if board.layers < 1 {
        return Err(InputError::NoLayers);
    }

    let mut component_ids = HashSet::new();
    for component in &board.components {
        if !component_ids.insert(component.id.as_str()) {
            return Err(InputError::DuplicateComponentId(component.id.clone()));
        }
    }
    let mut net_ids = HashSet::new();
    for net in &board.nets {
        if !net_ids.insert(net.id.as_str()) {
            return Err(InputError::DuplicateNetId(net.id.clone()));
        }
    }
    Ok(())
}

/// Validate a design with the default policy.
///
/// The input is never mutated; the caller decides whether to replace
/// `design.issues` with the result.
pub fn validate(design: &Design) -> Result<Vec<Issue>, BoardCheckError> {
    validate_with_policy(design, &DrcPolicy::default())
}

/// Validate a design with an explicit policy: structural input check, then
/// connectivity graph, then every rule check fanned out in parallel, then
/// assembly into the final deterministic issue list.
pub fn validate_with_policy(
    design: &Design,
    policy: &DrcPolicy,
) -> Result<Vec<Issue>, BoardCheckError> {
    let board = &design.board;
    check_structure(board)?;

    let (graph, resolution_errors) = ConnectivityGraph::build(board);
    let ctx = CheckContext {
        board,
        graph: &graph,
        resolution_errors: &resolution_errors,
        policy,
    };
    let candidates = CheckEngine::with_default_checks().run(&ctx);
    let issues = assemble(candidates);

    tracing::debug!(
        design = %design.id,
        issues = issues.len(),
        resolution_errors = resolution_errors.len(),
        "validation finished"
    );
    Ok(issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::schema::{Component, ComponentKind, Net};

    fn design_with_board(board: Board) -> Design {
        let mut design = Design::new("test");
        design.board = board;
        design
    }

    #[test]
    fn test_outline_with_two_vertices_is_rejected() {
        let board = Board {
            outline: vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)],
            ..Board::default()
        };
        let err = validate(&design_with_board(board)).unwrap_err();
        assert!(matches!(
            err,
            BoardCheckError::Input(InputError::OutlineTooSmall(2))
        ));
    }

    #[test]
    fn test_zero_layers_is_rejected() {
        let board = Board { layers: 0, ..Board::default() };
        let err = validate(&design_with_board(board)).unwrap_err();
        assert!(matches!(err, BoardCheckError::Input(InputError::NoLayers)));
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let board = Board {
            components: vec![
                Component::new("R1", ComponentKind::Resistor),
                Component::new("R1", ComponentKind::Resistor),
            ],
            ..Board::default()
        };
        assert!(matches!(
            validate(&design_with_board(board)).unwrap_err(),
            BoardCheckError::Input(InputError::DuplicateComponentId(_))
        ));

        let board = Board {
            nets: vec![Net::new("N1"), Net::new("N1")],
            ..Board::default()
        };
        assert!(matches!(
            validate(&design_with_board(board)).unwrap_err(),
            BoardCheckError::Input(InputError::DuplicateNetId(_))
        ));
    }

    #[test]
    fn test_empty_design_is_clean() {
        let issues = validate(&Design::new("empty")).unwrap();
        assert!(issues.is_empty());
    }

    #[test]
    fn test_stats() {
        let mut net = Net::new("N1");
        net.add_connection("R1", "1");
        let board = Board {
            components: vec![Component::new("R1", ComponentKind::Resistor)],
            nets: vec![net],
            ..Board::default()
        };
        let issues = validate(&design_with_board(board)).unwrap();
        let stats = ValidationStats::from_issues(&issues);
        assert!(stats.has_errors());
        // unconnected_net error plus the missing-outline warning
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.warnings, 1);
        assert_eq!(stats.total(), 2);
    }

    #[test]
    fn test_policy_threshold_changes_findings() {
        let mut n1 = Net::new("N1");
        n1.add_connection("R1", "1");
        n1.add_connection("R2", "1");
        let mut n2 = Net::new("N2");
        n2.add_connection("R3", "1");
        n2.add_connection("R4", "1");
        let board = Board {
            outline: vec![
                Point::new(0.0, 0.0),
                Point::new(100.0, 0.0),
                Point::new(100.0, 100.0),
                Point::new(0.0, 100.0),
            ],
            components: vec![
                Component::new("R1", ComponentKind::Resistor).with_position(10.0, 10.0),
                Component::new("R2", ComponentKind::Resistor).with_position(90.0, 10.0),
                Component::new("R3", ComponentKind::Resistor).with_position(10.0, 12.0),
                Component::new("R4", ComponentKind::Resistor).with_position(90.0, 12.0),
            ],
            nets: vec![n1, n2],
            ..Board::default()
        };
        let design = design_with_board(board);

        assert!(validate(&design).unwrap().is_empty());

        let strict = DrcPolicy { min_clearance: 5.0 };
        let issues = validate_with_policy(&design, &strict).unwrap();
        assert_eq!(issues.len(), 2);
        assert!(issues
            .iter()
            .all(|i| i.kind == crate::schema::IssueKind::ClearanceViolation));
    }
}
