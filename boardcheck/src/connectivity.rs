//! Connectivity graph built from a board's nets.
//!
//! The graph has one node per resolved pin reference and one node per net;
//! an edge joins a pin to each net that lists it. A union-find partition over
//! the same nodes answers "same electrical node" queries in near-constant
//! time, including the case where two nets are merged by a shared pin.
//!
//! Construction never fails: connection ids that cannot be resolved are
//! collected as [`ResolutionError`]s and left out of the graph, so one
//! malformed net cannot block validation of the rest of the design.

use std::collections::{BTreeSet, HashMap};

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;

use crate::schema::Board;

/// Address of a connection point: `(componentId, pinName)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PinRef {
    pub component_id: String,
    pub pin: String,
}

impl PinRef {
    pub fn new(component_id: impl Into<String>, pin: impl Into<String>) -> Self {
        Self {
            component_id: component_id.into(),
            pin: pin.into(),
        }
    }

    /// Split a raw `"componentId.pinName"` connection id at the first dot.
    pub fn parse(raw: &str) -> Option<PinRef> {
        let (component_id, pin) = raw.split_once('.')?;
        if component_id.is_empty() || pin.is_empty() {
            return None;
        }
        Some(PinRef::new(component_id, pin))
    }
}

impl std::fmt::Display for PinRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.component_id, self.pin)
    }
}

/// Why a connection id could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionReason {
    #[error("connection id is not of the form 'componentId.pinName'")]
    MalformedRef,
    #[error("unknown component '{component_id}'")]
    UnknownComponent { component_id: String },
    #[error("component '{component_id}' ({kind}) has no pin '{pin}'")]
    UnknownPin {
        component_id: String,
        kind: String,
        pin: String,
    },
}

/// A connection id that did not resolve to a real pin. Recovered locally into
/// an `invalid_connection` issue, never raised as a failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("net '{net_id}': cannot resolve '{raw_id}': {reason}")]
pub struct ResolutionError {
    pub net_id: String,
    pub raw_id: String,
    pub reason: ResolutionReason,
}

#[derive(Debug, Clone)]
enum NodeKind {
    Pin(PinRef),
    Net(String),
}

/// Counts reported by [`ConnectivityGraph::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct GraphStats {
    pub pin_count: usize,
    pub net_count: usize,
    pub connection_count: usize,
}

/// Undirected pin/net graph plus its electrical-node partition.
#[derive(Debug, Clone)]
pub struct ConnectivityGraph {
    graph: UnGraph<NodeKind, ()>,
    pin_indices: HashMap<PinRef, NodeIndex>,
    net_indices: HashMap<String, NodeIndex>,
    net_endpoints: HashMap<String, Vec<PinRef>>,
    partition: UnionFind<usize>,
}

impl ConnectivityGraph {
    /// Build the graph for a board, collecting resolution errors instead of
    /// aborting. The input is not mutated.
    pub fn build(board: &Board) -> (ConnectivityGraph, Vec<ResolutionError>) {
        let mut graph: UnGraph<NodeKind, ()> = UnGraph::new_undirected();
        let mut pin_indices: HashMap<PinRef, NodeIndex> = HashMap::new();
        let mut net_indices: HashMap<String, NodeIndex> = HashMap::new();
        let mut net_endpoints: HashMap<String, Vec<PinRef>> = HashMap::new();
        let mut errors = Vec::new();

        let components: HashMap<&str, &crate::schema::Component> =
            board.components.iter().map(|c| (c.id.as_str(), c)).collect();

        for net in &board.nets {
            let net_idx = *net_indices
                .entry(net.id.clone())
                .or_insert_with(|| graph.add_node(NodeKind::Net(net.id.clone())));
            let endpoints = net_endpoints.entry(net.id.clone()).or_default();

            for raw in &net.connection_ids {
                let pin_ref = match Self::resolve(raw, &components) {
                    Ok(pin_ref) => pin_ref,
                    Err(reason) => {
                        errors.push(ResolutionError {
                            net_id: net.id.clone(),
                            raw_id: raw.clone(),
                            reason,
                        });
                        continue;
                    }
                };

                let pin_idx = *pin_indices
                    .entry(pin_ref.clone())
                    .or_insert_with(|| graph.add_node(NodeKind::Pin(pin_ref.clone())));
                graph.add_edge(pin_idx, net_idx, ());
                if !endpoints.contains(&pin_ref) {
                    endpoints.push(pin_ref);
                }
            }
        }

        let mut partition = UnionFind::new(graph.node_count());
        for edge in graph.edge_indices() {
            if let Some((a, b)) = graph.edge_endpoints(edge) {
                partition.union(a.index(), b.index());
            }
        }

        tracing::debug!(
            nets = net_indices.len(),
            pins = pin_indices.len(),
            errors = errors.len(),
            "built connectivity graph"
        );

        (
            ConnectivityGraph {
                graph,
                pin_indices,
                net_indices,
                net_endpoints,
                partition,
            },
            errors,
        )
    }

    fn resolve(
        raw: &str,
        components: &HashMap<&str, &crate::schema::Component>,
    ) -> Result<PinRef, ResolutionReason> {
        let pin_ref = PinRef::parse(raw).ok_or(ResolutionReason::MalformedRef)?;
        let component = components
            .get(pin_ref.component_id.as_str())
            .ok_or_else(|| ResolutionReason::UnknownComponent {
                component_id: pin_ref.component_id.clone(),
            })?;
        if !component.pin_set().contains(&pin_ref.pin) {
            return Err(ResolutionReason::UnknownPin {
                component_id: pin_ref.component_id.clone(),
                kind: component.kind.as_str().to_string(),
                pin: pin_ref.pin.clone(),
            });
        }
        Ok(pin_ref)
    }

    /// Resolved endpoints of a net, in first-seen order without duplicates.
    pub fn resolved_endpoints(&self, net_id: &str) -> &[PinRef] {
        self.net_endpoints
            .get(net_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Distinct component ids on the electrical node a net belongs to, after
    /// union with any other nets that share a pin with it.
    pub fn components_on_node(&self, net_id: &str) -> BTreeSet<String> {
        let Some(&net_idx) = self.net_indices.get(net_id) else {
            return BTreeSet::new();
        };
        let root = self.partition.find(net_idx.index());
        self.pin_indices
            .iter()
            .filter(|(_, &idx)| self.partition.find(idx.index()) == root)
            .map(|(pin, _)| pin.component_id.clone())
            .collect()
    }

    /// Whether two nets ended up on the same electrical node.
    pub fn same_node(&self, net_a: &str, net_b: &str) -> bool {
        match (self.net_indices.get(net_a), self.net_indices.get(net_b)) {
            (Some(&a), Some(&b)) => self.partition.equiv(a.index(), b.index()),
            _ => false,
        }
    }

    /// Electrical-node roots touched by a component's resolved pins.
    pub fn component_roots(&self, component_id: &str) -> BTreeSet<usize> {
        self.pin_indices
            .iter()
            .filter(|(pin, _)| pin.component_id == component_id)
            .map(|(_, &idx)| self.partition.find(idx.index()))
            .collect()
    }

    /// Whether any pin of `a` shares an electrical node with any pin of `b`.
    /// Components with no resolved pins are connected to nothing.
    pub fn electrically_connected(&self, a: &str, b: &str) -> bool {
        let roots_a = self.component_roots(a);
        if roots_a.is_empty() {
            return false;
        }
        self.component_roots(b).iter().any(|r| roots_a.contains(r))
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            pin_count: self.pin_indices.len(),
            net_count: self.net_indices.len(),
            connection_count: self.graph.edge_count(),
        }
    }
}
