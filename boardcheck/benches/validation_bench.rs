use criterion::{black_box, criterion_group, criterion_main, Criterion};

use boardcheck::prelude::*;
use boardcheck::geometry::Point;
use boardcheck::schema::{Component, ComponentKind, Net};

/// A grid of resistor chains with a sprinkling of defects, sized so the
/// benchmark exercises the graph builder, every check, and the assembler.
fn synthetic_design(chains: usize) -> Design {
    let mut design = Design::new("bench");
    design.board.outline = vec![
        Point::new(0.0, 0.0),
        Point::new(1000.0, 0.0),
        Point::new(1000.0, 1000.0),
        Point::new(0.0, 1000.0),
    ];

    for chain in 0..chains {
        let y = (chain * 10 % 1000) as f64;
        for step in 0..10 {
            let id = format!("R{}_{}", chain, step);
            design.board.components.push(
                Component::new(&id, ComponentKind::Resistor)
                    .with_position((step * 100) as f64, y),
            );
            if step > 0 {
                let mut net = Net::new(format!("N{}_{}", chain, step));
                net.add_connection(&format!("R{}_{}", chain, step - 1), "2");
                net.add_connection(&id, "1");
                design.board.nets.push(net);
            }
        }
        // Every fourth chain ends in a dangling net.
        if chain % 4 == 0 {
            let mut net = Net::new(format!("N{}_tail", chain));
            net.add_connection(&format!("R{}_9", chain), "2");
            design.board.nets.push(net);
        }
    }

    design
}

fn bench_validate(c: &mut Criterion) {
    let small = synthetic_design(10);
    let large = synthetic_design(100);

    c.bench_function("validate_100_components", |b| {
        b.iter(|| validate(black_box(&small)))
    });
    c.bench_function("validate_1000_components", |b| {
        b.iter(|| validate(black_box(&large)))
    });
}

fn bench_parse_design(c: &mut Criterion) {
    let json = serde_json::to_string(&synthetic_design(10)).unwrap();
    c.bench_function("parse_design", |b| {
        b.iter(|| boardcheck::parse_design(black_box(&json)))
    });
}

criterion_group!(benches, bench_validate, bench_parse_design);
criterion_main!(benches);
