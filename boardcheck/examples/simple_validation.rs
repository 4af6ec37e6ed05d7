//! Example: validate a design built in code (or loaded from a JSON file).
//! Run with: cargo run --example simple_validation [path/to/design.json]

use boardcheck::prelude::*;
use boardcheck::schema::{Component, ComponentKind, Net};

fn main() -> Result<(), BoardCheckError> {
    let design = match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            boardcheck::parse_design(&json)?
        }
        None => demo_design(),
    };

    let issues = validate(&design)?;
    let stats = ValidationStats::from_issues(&issues);

    println!("Validation found {} issue(s) for '{}'", issues.len(), design.name);
    for issue in &issues {
        println!("  [{}] {} ({})", issue.severity, issue.message, issue.id);
    }
    println!(
        "Summary: {} error(s), {} warning(s), {} info",
        stats.errors, stats.warnings, stats.infos
    );

    if stats.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}

/// A deliberately flawed LED circuit: the LED's cathode is left floating.
fn demo_design() -> Design {
    let mut design = Design::new("demo");
    design.board.components.push(Component::new("BT1", ComponentKind::Battery));
    design.board.components.push(Component::new("R1", ComponentKind::Resistor));
    design.board.components.push(Component::new("LED1", ComponentKind::Led));

    let mut vcc = Net::new("N1").with_name("VCC");
    vcc.add_connection("BT1", "+");
    vcc.add_connection("R1", "1");
    design.board.nets.push(vcc);

    let mut drive = Net::new("N2");
    drive.add_connection("R1", "2");
    drive.add_connection("LED1", "anode");
    design.board.nets.push(drive);

    let mut floating = Net::new("N3").with_name("GND");
    floating.add_connection("LED1", "cathode");
    design.board.nets.push(floating);

    design
}
