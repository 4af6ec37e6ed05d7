//! BoardCheck - design-rule-check and connectivity analysis for PCB designs
//!
//! This library takes a board description (components, pins, nets, outline),
//! builds its electrical connectivity graph, and reports structural defects:
//! unconnected nets, short circuits, clearance violations, components off the
//! board, dangling nets, and invalid pin references.
//!
//! # Quick Start
//!
//! ```
//! use boardcheck::{validate, Design};
//! use boardcheck::schema::{Component, ComponentKind, Net};
//!
//! let mut design = Design::new("blinky");
//! design.board.components.push(Component::new("R1", ComponentKind::Resistor));
//! let mut net = Net::new("N1");
//! net.add_connection("R1", "1");
//! design.board.nets.push(net);
//!
//! for issue in validate(&design).unwrap() {
//!     println!("{}: {}", issue.severity, issue.message);
//! }
//! ```
//!
//! # Guarantees
//!
//! - **Deterministic**: the same board always yields the same issues, with the
//!   same ids, in the same order.
//! - **Collect, don't abort**: unresolvable net connections become
//!   `invalid_connection` issues; one malformed net never blocks the rest.
//! - **Pure**: `validate` holds no state and never mutates its input, so it
//!   is safe to call concurrently for different designs.

pub mod assemble;
pub mod checks;
pub mod connectivity;
pub mod core;
pub mod explain;
pub mod geometry;
pub mod schema;

// Re-export main types
pub use crate::core::{
    validate, validate_with_policy, BoardCheckError, DrcPolicy, InputError, ValidationStats,
};
pub use crate::checks::{Check, CheckContext, CheckEngine, IssueCandidate};
pub use crate::connectivity::{ConnectivityGraph, PinRef, ResolutionError, ResolutionReason};
pub use crate::schema::{
    validate_issues, Board, Component, ComponentKind, Design, Issue, IssueKind, IssueLocation,
    Net, Severity,
};

/// Parse a design from its JSON form (convenience wrapper).
pub fn parse_design(json: &str) -> Result<Design, BoardCheckError> {
    serde_json::from_str(json).map_err(|e| BoardCheckError::Parse(e.to_string()))
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        validate, validate_with_policy, Board, BoardCheckError, Design, DrcPolicy, Issue,
        IssueKind, Severity, ValidationStats,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_design_reports_parse_errors() {
        let err = parse_design("{ not json").unwrap_err();
        assert!(matches!(err, BoardCheckError::Parse(_)));

        let design = parse_design(
            r#"{"id": "d1", "name": "blinky", "board": {"outline": [], "components": [], "nets": [], "layers": 1}}"#,
        )
        .unwrap();
        assert_eq!(design.name, "blinky");
        assert!(design.issues.is_empty());
    }
}
