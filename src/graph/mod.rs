/*!
# Collaborator Graphs

The preparation core reads from a *base graph*, weighs its edges with a [`Weighting`] and writes
shortcuts into a *persisted* [`ShortcutGraph`]. These are modelled as traits so that any storage
backend can be plugged in.

For tests and small in-memory use-cases this module also provides
- [`EdgeListGraph`]: a base graph given as a list of edges with distances and access flags,
- [`DistanceWeighting`]: weighs edges by their distance,
- [`MemoryChGraph`]: a heap-backed persisted graph holding original edges followed by shortcuts.
*/

use bitflags::bitflags;

use crate::{ops::*, *};

mod edge_list;
mod memory;

pub use edge_list::*;
pub use memory::*;

/// An edge of the base graph as reported by [`BaseGraph::all_edges`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeState {
    pub edge: EdgeId,
    pub base_node: Node,
    pub adj_node: Node,
    pub distance: f64,
    /// Edge may be traversed from `base_node` to `adj_node`
    pub forward: bool,
    /// Edge may be traversed from `adj_node` to `base_node`
    pub backward: bool,
}

/// The routing graph before preparation
pub trait BaseGraph: GraphNodeOrder + GraphEdgeOrder {
    /// Returns an iterator over all edges, ordered by edge id
    fn all_edges(&self) -> impl Iterator<Item = EdgeState> + '_;
}

/// Computes the weight of a base edge in a given direction.
///
/// A non-finite weight means that the edge cannot be traversed in that direction.
pub trait Weighting {
    /// Weight of `edge` when traversed from `base_node` to `adj_node` (or the opposite if `reverse`)
    fn calc_edge_weight(&self, edge: &EdgeState, reverse: bool) -> f64;
}

impl<F> Weighting for F
where
    F: Fn(&EdgeState, bool) -> f64,
{
    fn calc_edge_weight(&self, edge: &EdgeState, reverse: bool) -> f64 {
        self(edge, reverse)
    }
}

bitflags! {
    /// Directions in which a persisted shortcut may be traversed
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShortcutFlags: u8 {
        const FWD = 0b01;
        const BWD = 0b10;
        const BOTH = Self::FWD.bits() | Self::BWD.bits();
    }
}

/// The persisted graph receiving the shortcuts of a preparation run.
///
/// Edge ids `0..original_edges()` are the original edges, shortcuts are appended behind them.
pub trait ShortcutGraph: GraphNodeOrder + GraphEdgeOrder {
    /// Returns the number of original (non-shortcut) edges
    fn original_edges(&self) -> NumEdges;

    /// Appends a shortcut and returns its final id
    fn shortcut(
        &mut self,
        from: Node,
        to: Node,
        flags: ShortcutFlags,
        weight: f64,
        skipped1: EdgeId,
        skipped2: EdgeId,
    ) -> EdgeId;

    /// Returns *true* if `edge` is a shortcut
    /// ** Panics if `edge >= m` **
    fn is_shortcut(&self, edge: EdgeId) -> bool;

    /// Returns the two edges skipped by shortcut `edge`
    /// ** Panics if `edge >= m` **
    fn skipped_edges(&self, edge: EdgeId) -> (EdgeId, EdgeId);

    /// Overwrites the two edges skipped by shortcut `edge`
    /// ** Panics if `edge >= m` **
    fn set_skipped_edges(&mut self, edge: EdgeId, skipped1: EdgeId, skipped2: EdgeId);
}
