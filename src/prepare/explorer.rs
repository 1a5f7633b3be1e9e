use std::fmt::Display;

use super::*;
use crate::utils::bucketed::BucketedArray;

/// Which edges of a node an explorer visits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Out,
    In,
}

/// Read access to the working edge an explorer is currently positioned on.
///
/// Base and adjacent node are always reported from the perspective of the explored node: for
/// incoming edges `base_node()` is the edge's target and `adj_node()` its source.
pub trait PrepareEdgeCursor {
    /// Returns the edge at the current position.
    /// ** Panics if `next()` has not returned *true* since the last repositioning **
    fn current(&self) -> &PrepareEdge;

    /// Returns the direction this cursor explores
    fn direction(&self) -> Direction;

    /// Returns the explored node
    fn base_node(&self) -> Node {
        match self.direction() {
            Direction::Out => self.current().from,
            Direction::In => self.current().to,
        }
    }

    /// Returns the node reached via the current edge
    fn adj_node(&self) -> Node {
        match self.direction() {
            Direction::Out => self.current().to,
            Direction::In => self.current().from,
        }
    }

    fn prepare_edge(&self) -> EdgeId {
        self.current().prepare_edge
    }

    fn is_shortcut(&self) -> bool {
        self.current().is_shortcut()
    }

    fn orig_edge_key_first(&self) -> EdgeKey {
        self.current().orig_edge_key_first
    }

    fn orig_edge_key_last(&self) -> EdgeKey {
        self.current().orig_edge_key_last
    }

    fn skipped1(&self) -> EdgeId {
        self.current().skipped1
    }

    fn skipped2(&self) -> EdgeId {
        self.current().skipped2
    }

    fn weight(&self) -> f64 {
        self.current().weight
    }

    fn orig_edge_count(&self) -> u32 {
        self.current().orig_edge_count
    }
}

#[inline(always)]
fn current_index(position: usize) -> usize {
    assert!(position > 0, "explorer is not positioned on an edge");
    position - 1
}

/// Reusable cursor over the working edges of one node at a time.
///
/// # Examples
/// ```
/// use chprep::prelude::*;
///
/// let mut graph = PrepareGraph::new(3);
/// graph.add_edge(0, 1, 0, 1.0);
/// graph.add_edge(2, 1, 1, 4.0);
///
/// let mut explorer = graph.in_explorer();
/// explorer.set_base_node(1);
/// let mut adj = Vec::new();
/// while explorer.next() {
///     assert_eq!(explorer.base_node(), 1);
///     adj.push(explorer.adj_node());
/// }
/// adj.sort();
/// assert_eq!(adj, vec![0, 2]);
/// ```
#[derive(Clone)]
pub struct PrepareGraphExplorer<'a> {
    graph: &'a PrepareGraph,
    direction: Direction,
    arcs: &'a [PrepareEdgeRef],
    position: usize,
}

impl<'a> PrepareGraphExplorer<'a> {
    pub(crate) fn new(graph: &'a PrepareGraph, direction: Direction) -> Self {
        Self {
            graph,
            direction,
            arcs: &[],
            position: 0,
        }
    }

    /// Positions the cursor before the first edge of `node`
    pub fn set_base_node(&mut self, node: Node) -> &mut Self {
        let graph = self.graph;
        self.arcs = graph.arcs(node, self.direction);
        self.position = 0;
        self
    }

    /// Advances to the next edge. Returns *false* once all edges of the node were visited.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        if self.position < self.arcs.len() {
            self.position += 1;
            true
        } else {
            false
        }
    }

    /// Returns the identity of the current edge
    pub fn edge_ref(&self) -> PrepareEdgeRef {
        self.arcs[current_index(self.position)]
    }
}

impl PrepareEdgeCursor for PrepareGraphExplorer<'_> {
    fn current(&self) -> &PrepareEdge {
        self.graph.edge(self.edge_ref())
    }

    fn direction(&self) -> Direction {
        self.direction
    }
}

impl Display for PrepareGraphExplorer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.position == 0 {
            write!(f, "not_started")
        } else {
            write!(f, "{}-{}", self.base_node(), self.adj_node())
        }
    }
}

/// Cursor over the working edges of one node at a time that can update the visited edges.
pub struct PrepareGraphExplorerMut<'a> {
    graph: &'a mut PrepareGraph,
    direction: Direction,
    node: Node,
    len: usize,
    position: usize,
}

impl<'a> PrepareGraphExplorerMut<'a> {
    pub(crate) fn new(graph: &'a mut PrepareGraph, direction: Direction) -> Self {
        Self {
            graph,
            direction,
            node: INVALID_NODE,
            len: 0,
            position: 0,
        }
    }

    /// Positions the cursor before the first edge of `node`
    pub fn set_base_node(&mut self, node: Node) -> &mut Self {
        self.node = node;
        self.len = self.graph.arcs(node, self.direction).len();
        self.position = 0;
        self
    }

    /// Advances to the next edge. Returns *false* once all edges of the node were visited.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        if self.position < self.len {
            self.position += 1;
            true
        } else {
            false
        }
    }

    /// Returns the identity of the current edge
    pub fn edge_ref(&self) -> PrepareEdgeRef {
        self.graph.arcs(self.node, self.direction)[current_index(self.position)]
    }

    fn current_mut(&mut self) -> &mut PrepareEdge {
        let edge = self.edge_ref();
        self.graph.edges_mut().get_mut(edge)
    }

    /// Replaces the weight of the current edge.
    ///
    /// # Panics
    /// Panics if `weight` is not finite.
    pub fn set_weight(&mut self, weight: f64) {
        self.current_mut().set_weight(weight);
    }

    pub fn set_skipped_edges(&mut self, skipped1: EdgeId, skipped2: EdgeId) {
        self.current_mut().set_skipped_edges(skipped1, skipped2);
    }

    pub fn set_orig_edge_count(&mut self, orig_edge_count: u32) {
        self.current_mut().set_orig_edge_count(orig_edge_count);
    }
}

impl PrepareEdgeCursor for PrepareGraphExplorerMut<'_> {
    fn current(&self) -> &PrepareEdge {
        self.graph.edge(self.edge_ref())
    }

    fn direction(&self) -> Direction {
        self.direction
    }
}

impl Display for PrepareGraphExplorerMut<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.position == 0 {
            write!(f, "not_started")
        } else {
            write!(f, "{}-{}", self.base_node(), self.adj_node())
        }
    }
}

/// Reusable cursor over the original edges of one node at a time.
///
/// Edge keys are derived from the direction of traversal, so the same base edge yields different
/// keys depending on which endpoint is explored.
#[derive(Clone)]
pub struct BaseGraphExplorer<'a> {
    arcs: &'a BucketedArray<BaseEdge>,
    direction: Direction,
    edges: &'a [BaseEdge],
    position: usize,
}

impl<'a> BaseGraphExplorer<'a> {
    pub(crate) fn new(arcs: &'a BucketedArray<BaseEdge>, direction: Direction) -> Self {
        Self {
            arcs,
            direction,
            edges: &[],
            position: 0,
        }
    }

    /// Positions the cursor before the first edge of `node`
    pub fn set_base_node(&mut self, node: Node) -> &mut Self {
        let arcs = self.arcs;
        self.edges = match self.direction {
            Direction::Out => arcs.out_slice(node),
            Direction::In => arcs.in_slice(node),
        };
        self.position = 0;
        self
    }

    /// Advances to the next edge. Returns *false* once all edges of the node were visited.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        if self.position < self.edges.len() {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn current(&self) -> &BaseEdge {
        &self.edges[current_index(self.position)]
    }

    /// Returns the explored node
    pub fn base_node(&self) -> Node {
        match self.direction {
            Direction::Out => self.current().base_node,
            Direction::In => self.current().adj_node,
        }
    }

    /// Returns the node reached via the current edge
    pub fn adj_node(&self) -> Node {
        match self.direction {
            Direction::Out => self.current().adj_node,
            Direction::In => self.current().base_node,
        }
    }

    /// Returns the id of the current base edge
    pub fn edge(&self) -> EdgeId {
        self.current().edge
    }

    pub fn orig_edge_key_first(&self) -> EdgeKey {
        edge_key(self.edge(), self.base_node(), self.adj_node())
    }

    pub fn orig_edge_key_last(&self) -> EdgeKey {
        self.orig_edge_key_first()
    }
}

impl Display for BaseGraphExplorer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.position == 0 {
            write!(f, "not_started")
        } else {
            write!(f, "{}: {}-{}", self.edge(), self.base_node(), self.adj_node())
        }
    }
}
