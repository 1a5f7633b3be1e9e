/*!
# Size Traits

Minimal size information shared by all graphs of this crate: the base graph, the working graph and the
persisted shortcut graph.
*/

use std::ops::Range;

use crate::*;

/// Graphs with a fixed node set `0..n`
pub trait GraphNodeOrder {
    /// Returns `n`
    fn number_of_nodes(&self) -> NumNodes;

    /// Returns `0..n`.
    ///
    /// The range does not borrow `self`, so the graph may be mutated while iterating over it.
    fn vertices_range(&self) -> Range<Node> {
        0..self.number_of_nodes()
    }
}

/// Graphs whose edges are identified by ids `0..m`
pub trait GraphEdgeOrder {
    /// Returns `m`
    fn number_of_edges(&self) -> NumEdges;

    /// Returns `0..m`. Like [`GraphNodeOrder::vertices_range`], the range does not borrow `self`.
    fn edges_range(&self) -> Range<EdgeId> {
        0..self.number_of_edges()
    }
}
