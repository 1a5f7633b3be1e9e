use super::*;

/// A base graph stored as a plain list of edges.
///
/// # Examples
/// ```
/// use chprep::{graph::*, prelude::*};
///
/// let mut graph = EdgeListGraph::new(3);
/// graph.add_bidirectional_edge(0, 1, 2.0);
/// graph.add_edge(1, 2, 1.5, true, false);
///
/// assert_eq!(graph.number_of_edges(), 2);
/// assert!(!graph.all_edges().last().unwrap().backward);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EdgeListGraph {
    nodes: NumNodes,
    edges: Vec<EdgeState>,
}

impl EdgeListGraph {
    /// Creates a graph with `n` nodes and no edges
    pub fn new(n: NumNodes) -> Self {
        Self {
            nodes: n,
            edges: Vec::new(),
        }
    }

    /// Creates a graph with `n` nodes from `(u, v, distance)` triples, all traversable both ways
    pub fn from_edges<I>(n: NumNodes, edges: I) -> Self
    where
        I: IntoIterator<Item = (Node, Node, f64)>,
    {
        let mut graph = Self::new(n);
        for (u, v, distance) in edges {
            graph.add_bidirectional_edge(u, v, distance);
        }
        graph
    }

    /// Adds an edge between `u` and `v` and returns its id.
    ///
    /// # Panics
    /// Panics if `u >= n` or `v >= n`.
    pub fn add_edge(
        &mut self,
        u: Node,
        v: Node,
        distance: f64,
        forward: bool,
        backward: bool,
    ) -> EdgeId {
        assert!(u < self.nodes && v < self.nodes);

        let edge = self.edges.len() as EdgeId;
        self.edges.push(EdgeState {
            edge,
            base_node: u,
            adj_node: v,
            distance,
            forward,
            backward,
        });
        edge
    }

    /// Adds an edge traversable in both directions and returns its id
    pub fn add_bidirectional_edge(&mut self, u: Node, v: Node, distance: f64) -> EdgeId {
        self.add_edge(u, v, distance, true, true)
    }

    /// Returns the edge with id `edge`
    pub fn edge(&self, edge: EdgeId) -> &EdgeState {
        &self.edges[edge as usize]
    }
}

impl GraphNodeOrder for EdgeListGraph {
    fn number_of_nodes(&self) -> NumNodes {
        self.nodes
    }
}

impl GraphEdgeOrder for EdgeListGraph {
    fn number_of_edges(&self) -> NumEdges {
        self.edges.len() as NumEdges
    }
}

impl BaseGraph for EdgeListGraph {
    fn all_edges(&self) -> impl Iterator<Item = EdgeState> + '_ {
        self.edges.iter().copied()
    }
}

/// Weighs every edge by its distance in both directions.
///
/// Access flags are not looked at: they are honored by the consumer of the base graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistanceWeighting;

impl Weighting for DistanceWeighting {
    fn calc_edge_weight(&self, edge: &EdgeState, _reverse: bool) -> f64 {
        edge.distance
    }
}
