//! Design rule checks.
//!
//! Each check is a pure function of the read-only [`CheckContext`] and
//! produces candidate findings; the assembler turns candidates into final
//! issues. Checks never rely on input iteration order for correctness — any
//! order-sensitive tie-break (which net of a shorted pair comes first, which
//! shared pin names the finding) is resolved by sorting.

use std::collections::BTreeMap;
use std::sync::Arc;

use rayon::prelude::*;

use crate::connectivity::{ConnectivityGraph, PinRef, ResolutionError, ResolutionReason};
use crate::core::DrcPolicy;
use crate::geometry::{point_in_polygon, BoundingBox, Point, COINCIDENT_EPS};
use crate::schema::{Board, Component, IssueKind, IssueLocation, Severity};

/// A raw finding from one check, before dedup and id assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueCandidate {
    pub kind: IssueKind,
    pub severity: Severity,
    pub message: String,
    pub related_ids: Vec<String>,
    pub location: Option<IssueLocation>,
}

/// Shared read-only snapshot every check runs against.
pub struct CheckContext<'a> {
    pub board: &'a Board,
    pub graph: &'a ConnectivityGraph,
    pub resolution_errors: &'a [ResolutionError],
    pub policy: &'a DrcPolicy,
}

pub trait Check: Send + Sync {
    fn id(&self) -> &'static str;
    fn name(&self) -> &'static str;
    fn check(&self, ctx: &CheckContext) -> Vec<IssueCandidate>;
}

/// Registry of checks, fanned out in parallel over the shared context.
pub struct CheckEngine {
    checks: Vec<Arc<dyn Check>>,
}

impl CheckEngine {
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    pub fn with_default_checks() -> Self {
        let mut engine = Self::new();
        engine.add_check(Arc::new(UnconnectedNetCheck));
        engine.add_check(Arc::new(ShortCircuitCheck));
        engine.add_check(Arc::new(ClearanceCheck));
        engine.add_check(Arc::new(BoardEdgeCheck));
        engine.add_check(Arc::new(MissingComponentCheck));
        engine.add_check(Arc::new(InvalidConnectionCheck));
        engine
    }

    pub fn add_check(&mut self, check: Arc<dyn Check>) {
        self.checks.push(check);
    }

    pub fn checks(&self) -> impl Iterator<Item = &Arc<dyn Check>> {
        self.checks.iter()
    }

    /// Run every check against the context. Checks execute in parallel; the
    /// returned candidate lists are in registry order regardless.
    pub fn run(&self, ctx: &CheckContext) -> Vec<Vec<IssueCandidate>> {
        self.checks
            .par_iter()
            .map(|check| {
                let found = check.check(ctx);
                tracing::debug!(check = check.id(), candidates = found.len(), "check finished");
                found
            })
            .collect()
    }
}

impl Default for CheckEngine {
    fn default() -> Self {
        Self::with_default_checks()
    }
}

// Helpers

fn ordered_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Positioned components, sorted by id so pairwise reports are deterministic.
fn placed_components(board: &Board) -> Vec<(&Component, Point)> {
    let mut placed: Vec<(&Component, Point)> = board
        .components
        .iter()
        .filter_map(|c| c.position.map(|p| (c, p)))
        .collect();
    placed.sort_by(|(a, _), (b, _)| a.id.cmp(&b.id));
    placed
}

/// Net ids each component's resolved pins appear in.
fn nets_by_component<'a>(ctx: &CheckContext<'a>) -> BTreeMap<&'a str, Vec<&'a str>> {
    let mut map: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for net in &ctx.board.nets {
        for pin in ctx.graph.resolved_endpoints(&net.id) {
            if let Some(component) = ctx.board.component(&pin.component_id) {
                let entry = map.entry(component.id.as_str()).or_default();
                if !entry.contains(&net.id.as_str()) {
                    entry.push(net.id.as_str());
                }
            }
        }
    }
    map
}

// Check implementations

/// A net whose electrical node reaches fewer than 2 distinct components.
///
/// Only nets with at least one resolvable endpoint qualify; fully dangling
/// nets belong to [`MissingComponentCheck`].
pub struct UnconnectedNetCheck;

impl Check for UnconnectedNetCheck {
    fn id(&self) -> &'static str {
        "unconnected_net"
    }

    fn name(&self) -> &'static str {
        "Unconnected net check"
    }

    fn check(&self, ctx: &CheckContext) -> Vec<IssueCandidate> {
        let mut candidates = Vec::new();

        for net in &ctx.board.nets {
            if ctx.graph.resolved_endpoints(&net.id).is_empty() {
                continue;
            }
            let components = ctx.graph.components_on_node(&net.id);
            if components.len() >= 2 {
                continue;
            }

            let mut related_ids = vec![net.id.clone()];
            related_ids.extend(components.iter().cloned());
            candidates.push(IssueCandidate {
                kind: IssueKind::UnconnectedNet,
                severity: Severity::Error,
                message: format!(
                    "Net '{}' connects only {} component(s); a net needs at least 2 connected components",
                    net.label(),
                    components.len(),
                ),
                related_ids,
                location: Some(IssueLocation::Net { net_id: net.id.clone() }),
            });
        }

        candidates
    }
}

/// Two nets that are supposed to be distinct but meet: either they list the
/// same pin, or components of electrically different nodes sit at zero
/// clearance. One finding per colliding net pair, smaller id first.
pub struct ShortCircuitCheck;

impl Check for ShortCircuitCheck {
    fn id(&self) -> &'static str {
        "short_circuit"
    }

    fn name(&self) -> &'static str {
        "Short circuit check"
    }

    fn check(&self, ctx: &CheckContext) -> Vec<IssueCandidate> {
        let mut findings: BTreeMap<(String, String), IssueCandidate> = BTreeMap::new();

        // Pins listed by more than one net.
        let mut pin_nets: BTreeMap<&PinRef, Vec<&str>> = BTreeMap::new();
        for net in &ctx.board.nets {
            for pin in ctx.graph.resolved_endpoints(&net.id) {
                pin_nets.entry(pin).or_default().push(&net.id);
            }
        }
        for (pin, nets) in &pin_nets {
            for i in 0..nets.len() {
                for j in (i + 1)..nets.len() {
                    let (a, b) = ordered_pair(nets[i], nets[j]);
                    if a == b {
                        continue;
                    }
                    // First (smallest) shared pin names the finding.
                    findings
                        .entry((a.to_string(), b.to_string()))
                        .or_insert_with(|| IssueCandidate {
                            kind: IssueKind::ShortCircuit,
                            severity: Severity::Error,
                            message: format!(
                                "Short circuit: nets '{}' and '{}' share pin '{}'",
                                a, b, pin,
                            ),
                            related_ids: vec![a.to_string(), b.to_string()],
                            location: Some(IssueLocation::Pin {
                                component_id: pin.component_id.clone(),
                                pin: pin.pin.clone(),
                            }),
                        });
                }
            }
        }

        // Electrically distinct components at zero clearance.
        let placed = placed_components(ctx.board);
        let component_nets = nets_by_component(ctx);
        for i in 0..placed.len() {
            for j in (i + 1)..placed.len() {
                let (comp_a, pos_a) = placed[i];
                let (comp_b, pos_b) = placed[j];
                if pos_a.distance_to(&pos_b) >= COINCIDENT_EPS {
                    continue;
                }
                if ctx.graph.electrically_connected(&comp_a.id, &comp_b.id) {
                    continue;
                }
                let nets_a = component_nets.get(comp_a.id.as_str());
                let nets_b = component_nets.get(comp_b.id.as_str());
                let (Some(nets_a), Some(nets_b)) = (nets_a, nets_b) else {
                    continue;
                };
                for net_a in nets_a {
                    for net_b in nets_b {
                        if ctx.graph.same_node(net_a, net_b) {
                            continue;
                        }
                        let (a, b) = ordered_pair(net_a, net_b);
                        let midpoint = pos_a.midpoint(&pos_b);
                        findings
                            .entry((a.to_string(), b.to_string()))
                            .or_insert_with(|| IssueCandidate {
                                kind: IssueKind::ShortCircuit,
                                severity: Severity::Error,
                                message: format!(
                                    "Short circuit: nets '{}' and '{}' overlap where components '{}' and '{}' touch",
                                    a, b, comp_a.id, comp_b.id,
                                ),
                                related_ids: vec![a.to_string(), b.to_string()],
                                location: Some(IssueLocation::Point {
                                    x: midpoint.x,
                                    y: midpoint.y,
                                }),
                            });
                    }
                }
            }
        }

        findings.into_values().collect()
    }
}

/// Electrically distinct components closer than the policy's minimum
/// clearance. Symmetric: each pair is reported once, ids in sorted order.
pub struct ClearanceCheck;

impl Check for ClearanceCheck {
    fn id(&self) -> &'static str {
        "clearance_violation"
    }

    fn name(&self) -> &'static str {
        "Clearance check"
    }

    fn check(&self, ctx: &CheckContext) -> Vec<IssueCandidate> {
        let mut candidates = Vec::new();
        let placed = placed_components(ctx.board);

        for i in 0..placed.len() {
            for j in (i + 1)..placed.len() {
                let (comp_a, pos_a) = placed[i];
                let (comp_b, pos_b) = placed[j];
                let distance = pos_a.distance_to(&pos_b);
                // Coincident positions are a short, not a clearance finding.
                if distance < COINCIDENT_EPS || distance >= ctx.policy.min_clearance {
                    continue;
                }
                if ctx.graph.electrically_connected(&comp_a.id, &comp_b.id) {
                    continue;
                }
                let midpoint = pos_a.midpoint(&pos_b);
                candidates.push(IssueCandidate {
                    kind: IssueKind::ClearanceViolation,
                    severity: Severity::Warning,
                    message: format!(
                        "Components '{}' and '{}' are {:.2} apart; minimum clearance is {:.2}",
                        comp_a.id, comp_b.id, distance, ctx.policy.min_clearance,
                    ),
                    related_ids: vec![comp_a.id.clone(), comp_b.id.clone()],
                    location: Some(IssueLocation::Point { x: midpoint.x, y: midpoint.y }),
                });
            }
        }

        candidates
    }
}

/// Placed components outside the board outline, or a populated board with no
/// outline at all. The outline boundary itself counts as inside.
pub struct BoardEdgeCheck;

impl Check for BoardEdgeCheck {
    fn id(&self) -> &'static str {
        "board_edge"
    }

    fn name(&self) -> &'static str {
        "Board edge check"
    }

    fn check(&self, ctx: &CheckContext) -> Vec<IssueCandidate> {
        let mut candidates = Vec::new();

        if ctx.board.outline.is_empty() {
            if !ctx.board.components.is_empty() {
                candidates.push(IssueCandidate {
                    kind: IssueKind::BoardEdge,
                    severity: Severity::Warning,
                    message: "Board outline is not defined; components cannot be checked against the board edge"
                        .to_string(),
                    related_ids: Vec::new(),
                    location: None,
                });
            }
            return candidates;
        }

        let bbox = BoundingBox::from_points(&ctx.board.outline);
        for (component, position) in placed_components(ctx.board) {
            let inside_bbox = bbox.as_ref().map(|b| b.contains(&position)).unwrap_or(false);
            if inside_bbox && point_in_polygon(&position, &ctx.board.outline) {
                continue;
            }
            candidates.push(IssueCandidate {
                kind: IssueKind::BoardEdge,
                severity: Severity::Error,
                message: format!(
                    "Component '{}' at ({:.2}, {:.2}) lies outside the board outline",
                    component.id, position.x, position.y,
                ),
                related_ids: vec![component.id.clone()],
                location: Some(IssueLocation::Point { x: position.x, y: position.y }),
            });
        }

        candidates
    }
}

/// A net none of whose connection ids resolve to a real pin.
pub struct MissingComponentCheck;

impl Check for MissingComponentCheck {
    fn id(&self) -> &'static str {
        "missing_component"
    }

    fn name(&self) -> &'static str {
        "Missing component check"
    }

    fn check(&self, ctx: &CheckContext) -> Vec<IssueCandidate> {
        let mut candidates = Vec::new();

        for net in &ctx.board.nets {
            if !ctx.graph.resolved_endpoints(&net.id).is_empty() {
                continue;
            }
            candidates.push(IssueCandidate {
                kind: IssueKind::MissingComponent,
                severity: Severity::Error,
                message: format!("Net '{}' references no resolvable components", net.label()),
                related_ids: vec![net.id.clone()],
                location: Some(IssueLocation::Net { net_id: net.id.clone() }),
            });
        }

        candidates
    }
}

/// One finding per connection id the graph builder could not resolve.
pub struct InvalidConnectionCheck;

impl Check for InvalidConnectionCheck {
    fn id(&self) -> &'static str {
        "invalid_connection"
    }

    fn name(&self) -> &'static str {
        "Invalid connection check"
    }

    fn check(&self, ctx: &CheckContext) -> Vec<IssueCandidate> {
        ctx.resolution_errors
            .iter()
            .map(|error| {
                let location = match &error.reason {
                    ResolutionReason::MalformedRef => {
                        Some(IssueLocation::Net { net_id: error.net_id.clone() })
                    }
                    _ => PinRef::parse(&error.raw_id).map(|pin| IssueLocation::Pin {
                        component_id: pin.component_id,
                        pin: pin.pin,
                    }),
                };
                IssueCandidate {
                    kind: IssueKind::InvalidConnection,
                    severity: Severity::Error,
                    message: format!(
                        "Net '{}' has an invalid connection '{}': {}",
                        error.net_id, error.raw_id, error.reason,
                    ),
                    related_ids: vec![error.net_id.clone(), error.raw_id.clone()],
                    location,
                }
            })
            .collect()
    }
}
