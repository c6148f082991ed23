//! The directed graph of tumor and lymph-node-level (LNL) nodes.
//!
//! A graph has one or more [`NodeKind::Tumor`] nodes (a patient can present
//! with more than one primary site) and one or more [`NodeKind::Lnl`] nodes,
//! all sharing a single state cardinality `k` (2 for binary involvement, 3
//! for healthy/micro/macro). Edges fall into three disjoint classes that the
//! rest of the engine treats very differently: tumor-to-LNL spread,
//! LNL-to-LNL spread, and growth (LNL-to-self, only present when `k == 3`).

use lymph_error::{GraphError, LymphError, LymphResult};

/// The state cardinality shared by every node in a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Healthy / involved.
    Binary,
    /// Healthy / microscopic / macroscopic.
    Trinary,
}

impl Cardinality {
    pub fn k(self) -> usize {
        match self {
            Cardinality::Binary => 2,
            Cardinality::Trinary => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Tumor,
    Lnl,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
}

/// An edge's role, which determines how [`crate::edge_tensor::edge_tensor`]
/// fills in its transition tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    TumorSpread,
    LnlSpread,
    Growth,
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub name: String,
    pub kind: EdgeKind,
    pub parent: usize,
    pub child: usize,
}

/// A directed graph of one or more tumor nodes and `L` LNL nodes.
///
/// Nodes are stored tumors-first, so a node index can be classified against
/// [`Graph::num_tumors`] without a lookup. [`Graph::find_node`] and
/// [`Graph::find_edge`] resolve names back to indices for callers that only
/// have a name (e.g. tests addressing a node by its declared label); nothing
/// inside the engine itself depends on a name round-trip, since every other
/// module is handed indices directly.
#[derive(Debug, Clone)]
pub struct Graph {
    k: Cardinality,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    num_tumors: usize,
}

/// One node's declaration: its kind, name, and the names of the nodes it
/// spreads to directly. Mirrors the construction input spec.md describes as
/// a mapping `(kind, name) -> [neighbor names]` — growth edges are never
/// listed here, they are synthesized from `k`.
pub struct NodeSpec<'a> {
    pub kind: NodeKind,
    pub name: &'a str,
    pub neighbors: &'a [&'a str],
}

impl Graph {
    /// Builds a graph from a `(kind, name) -> [neighbor names]` mapping. A
    /// graph may declare more than one tumor node (e.g. two primary sites
    /// spreading into overlapping LNLs); tumors are reordered to the front of
    /// [`Graph::nodes`] and LNLs follow, each group keeping its relative
    /// order from `specs`. A growth edge is synthesized automatically for
    /// every LNL when `k` is [`Cardinality::Trinary`], since every LNL
    /// implicitly has a growth edge to itself.
    pub fn new(k: Cardinality, specs: &[NodeSpec]) -> LymphResult<Self> {
        let mut nodes = Vec::with_capacity(specs.len());
        for spec in specs.iter().filter(|s| s.kind == NodeKind::Tumor) {
            push_node(&mut nodes, spec)?;
        }
        let num_tumors = nodes.len();
        if num_tumors == 0 {
            return Err(LymphError::InvalidArgument("graph needs at least one tumor node".into()));
        }
        for spec in specs.iter().filter(|s| s.kind == NodeKind::Lnl) {
            push_node(&mut nodes, spec)?;
        }
        if nodes.len() == num_tumors {
            return Err(LymphError::InvalidArgument("graph needs at least one LNL node".into()));
        }

        let mut edges = Vec::with_capacity(specs.iter().map(|s| s.neighbors.len()).sum());
        for spec in specs {
            let parent = nodes
                .iter()
                .position(|n| n.name == spec.name)
                .ok_or_else(|| LymphError::InvalidArgument(format!("unknown node '{}'", spec.name).into()))?;
            for &neighbor in spec.neighbors {
                let child = nodes.iter().position(|n| n.name == neighbor).ok_or_else(|| {
                    GraphError::UnknownNeighbor {
                        node: spec.name.into(),
                        neighbor: neighbor.into(),
                    }
                })?;
                if parent == child {
                    return Err(GraphError::SelfLoop { node: spec.name.into() }.into());
                }
                if edges.iter().any(|e: &Edge| e.parent == parent && e.child == child) {
                    return Err(GraphError::DuplicateNeighbor {
                        node: spec.name.into(),
                        neighbor: neighbor.into(),
                    }
                    .into());
                }
                if nodes[child].kind == NodeKind::Tumor {
                    return Err(LymphError::InvalidArgument(
                        format!("tumor node '{neighbor}' cannot be a child").into(),
                    ));
                }
                let kind = match nodes[parent].kind {
                    NodeKind::Tumor => EdgeKind::TumorSpread,
                    NodeKind::Lnl => EdgeKind::LnlSpread,
                };
                edges.push(Edge {
                    name: format!("{}_{}", spec.name, neighbor),
                    kind,
                    parent,
                    child,
                });
            }
        }

        if k == Cardinality::Trinary {
            for (idx, node) in nodes.iter().enumerate() {
                if node.kind == NodeKind::Lnl {
                    edges.push(Edge {
                        name: format!("{}_growth", node.name),
                        kind: EdgeKind::Growth,
                        parent: idx,
                        child: idx,
                    });
                }
            }
        }

        Ok(Self { k, nodes, edges, num_tumors })
    }

    pub fn k(&self) -> usize {
        self.k.k()
    }

    pub fn cardinality(&self) -> Cardinality {
        self.k
    }

    /// Indices of every tumor node, always `0..num_tumors` since tumors are
    /// reordered to the front at construction.
    pub fn tumors(&self) -> impl Iterator<Item = usize> {
        0..self.num_tumors
    }

    pub fn num_tumors(&self) -> usize {
        self.num_tumors
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Index-of-LNL position (0-based, skipping every tumor node) for a node index.
    pub fn lnl_position(&self, node_idx: usize) -> usize {
        debug_assert_eq!(self.nodes[node_idx].kind, NodeKind::Lnl);
        node_idx - self.num_tumors
    }

    pub fn num_lnls(&self) -> usize {
        self.nodes.len() - self.num_tumors
    }

    pub fn lnl_names(&self) -> impl Iterator<Item = &str> {
        self.nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Lnl)
            .map(|n| n.name.as_str())
    }

    pub fn find_node(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.name == name)
    }

    pub fn find_edge(&self, name: &str) -> Option<usize> {
        self.edges.iter().position(|e| e.name == name)
    }

    pub fn tumor_edges(&self) -> impl Iterator<Item = (usize, &Edge)> {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.kind == EdgeKind::TumorSpread)
    }

    pub fn lnl_edges(&self) -> impl Iterator<Item = (usize, &Edge)> {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.kind == EdgeKind::LnlSpread)
    }

    pub fn growth_edges(&self) -> impl Iterator<Item = (usize, &Edge)> {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.kind == EdgeKind::Growth)
    }

    /// Edges entering `lnl_node_idx`, tumor-spread and LNL-spread alike
    /// (growth edges are handled separately since they act on an already
    /// microscopic LNL rather than a healthy one).
    pub fn spread_edges_into(&self, lnl_node_idx: usize) -> impl Iterator<Item = (usize, &Edge)> {
        self.edges.iter().enumerate().filter(move |(_, e)| {
            e.child == lnl_node_idx && matches!(e.kind, EdgeKind::TumorSpread | EdgeKind::LnlSpread)
        })
    }

    pub fn growth_edge_of(&self, lnl_node_idx: usize) -> Option<(usize, &Edge)> {
        self.edges
            .iter()
            .enumerate()
            .find(|(_, e)| e.kind == EdgeKind::Growth && e.parent == lnl_node_idx)
    }
}

fn push_node(nodes: &mut Vec<Node>, spec: &NodeSpec) -> LymphResult<()> {
    if nodes.iter().any(|n| n.name == spec.name) {
        return Err(GraphError::DuplicateName { name: spec.name.into() }.into());
    }
    nodes.push(Node { name: spec.name.to_string(), kind: spec.kind });
    Ok(())
}
