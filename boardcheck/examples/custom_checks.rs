//! Example: extend the engine with a project-specific check.
//! Run with: cargo run --example custom_checks

use std::sync::Arc;

use boardcheck::checks::{Check, CheckContext, CheckEngine, IssueCandidate};
use boardcheck::connectivity::ConnectivityGraph;
use boardcheck::prelude::*;
use boardcheck::schema::{Component, ComponentKind, IssueKind, Net, Severity};

/// Flags boards that use LEDs without any resistor anywhere: the classic
/// missing current-limiting-resistor mistake.
struct LedNeedsResistorCheck;

impl Check for LedNeedsResistorCheck {
    fn id(&self) -> &'static str {
        "led_needs_resistor"
    }

    fn name(&self) -> &'static str {
        "LED current-limiting resistor check"
    }

    fn check(&self, ctx: &CheckContext) -> Vec<IssueCandidate> {
        let leds: Vec<&Component> = ctx
            .board
            .components
            .iter()
            .filter(|c| c.kind == ComponentKind::Led)
            .collect();
        let has_resistor = ctx
            .board
            .components
            .iter()
            .any(|c| c.kind == ComponentKind::Resistor);

        if leds.is_empty() || has_resistor {
            return Vec::new();
        }
        vec![IssueCandidate {
            kind: IssueKind::MissingComponent,
            severity: Severity::Warning,
            message: "LEDs need a current-limiting resistor in series".to_string(),
            related_ids: leds.iter().map(|c| c.id.clone()).collect(),
            location: None,
        }]
    }
}

fn main() -> Result<(), BoardCheckError> {
    let mut design = Design::new("led-no-resistor");
    design.board.components.push(Component::new("BT1", ComponentKind::Battery));
    design.board.components.push(Component::new("LED1", ComponentKind::Led));
    let mut n1 = Net::new("N1");
    n1.add_connection("BT1", "+");
    n1.add_connection("LED1", "anode");
    design.board.nets.push(n1);
    let mut n2 = Net::new("N2");
    n2.add_connection("LED1", "cathode");
    n2.add_connection("BT1", "-");
    design.board.nets.push(n2);

    // Run the default checks plus the custom one through the same pipeline
    // the validate facade uses.
    let policy = DrcPolicy::default();
    let (graph, resolution_errors) = ConnectivityGraph::build(&design.board);
    let ctx = CheckContext {
        board: &design.board,
        graph: &graph,
        resolution_errors: &resolution_errors,
        policy: &policy,
    };

    let mut engine = CheckEngine::with_default_checks();
    engine.add_check(Arc::new(LedNeedsResistorCheck));
    println!("Registered checks:");
    for check in engine.checks() {
        println!("  {} - {}", check.id(), check.name());
    }

    let issues = boardcheck::assemble::assemble(engine.run(&ctx));
    println!("\nFound {} issue(s):", issues.len());
    for issue in &issues {
        println!("  [{}] {}", issue.severity, issue.message);
    }
    Ok(())
}
