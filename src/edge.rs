use std::fmt::{Debug, Display};

use crate::Node;

/// Identifier of an edge in the base graph, the persisted graph or (temporarily) the preparation graph.
pub type EdgeId = u32;

/// We limit the number of edges to `2^32 - 1`.
pub type NumEdges = u32;

/// Edge-Value that is considered invalid, ie. *no edge*
pub const INVALID_EDGE: EdgeId = EdgeId::MAX;

/// Directional encoding of an undirected base edge.
///
/// Traversing base edge `e` from `a` to `b` yields `2e` if `a <= b` and `2e + 1` otherwise.
pub type EdgeKey = u32;

/// Computes the [`EdgeKey`] of base edge `edge` when traversed from `base_node` to `adj_node`.
///
/// # Examples
/// ```
/// use chprep::prelude::*;
///
/// assert_eq!(edge_key(3, 1, 2), 6);
/// assert_eq!(edge_key(3, 2, 1), 7);
/// ```
#[inline(always)]
pub const fn edge_key(edge: EdgeId, base_node: Node, adj_node: Node) -> EdgeKey {
    (edge << 1) | (base_node > adj_node) as EdgeKey
}

/// An original edge of the base graph as seen from one of its endpoints.
///
/// Only used to enumerate the original edges incident to a node, hence it carries no weight.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct BaseEdge {
    pub edge: EdgeId,
    pub base_node: Node,
    pub adj_node: Node,
}

impl BaseEdge {
    pub fn new(edge: EdgeId, base_node: Node, adj_node: Node) -> Self {
        Self {
            edge,
            base_node,
            adj_node,
        }
    }
}

impl Display for BaseEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}-{}", self.edge, self.base_node, self.adj_node)
    }
}

impl Debug for BaseEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <Self as Display>::fmt(self, f)
    }
}

/// Handle of a [`PrepareEdge`] within the edge slab of a
/// [`PrepareGraph`](crate::prepare::PrepareGraph).
///
/// Two handles are equal iff they refer to the very same edge. This is the notion of identity used
/// when edges are removed from adjacency buckets: distinct edges may well have identical fields
/// (the forward and backward arc of a base edge for instance).
///
/// Slots of removed edges are reused, hence a handle also carries the generation of its slot.
/// A handle kept across the removal of its edge never equals the handle of a later edge.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct PrepareEdgeRef {
    pub(crate) slot: u32,
    pub(crate) generation: u32,
}

impl PrepareEdgeRef {
    /// Returns the slot index of the referenced edge
    #[inline(always)]
    pub fn index(&self) -> usize {
        self.slot as usize
    }
}

/// A directed edge of the working graph. It is either an original edge or a shortcut.
#[derive(Clone, PartialEq)]
pub struct PrepareEdge {
    pub(crate) prepare_edge: EdgeId,
    pub(crate) from: Node,
    pub(crate) to: Node,
    pub(crate) weight: f64,
    pub(crate) orig_edge_key_first: EdgeKey,
    pub(crate) orig_edge_key_last: EdgeKey,
    pub(crate) skipped1: EdgeId,
    pub(crate) skipped2: EdgeId,
    pub(crate) orig_edge_count: u32,
}

impl PrepareEdge {
    /// Creates a non-shortcut edge for base edge `prepare_edge` directed from `from` to `to`.
    ///
    /// # Panics
    /// Panics if `weight` is not finite.
    pub fn edge(prepare_edge: EdgeId, from: Node, to: Node, weight: f64) -> Self {
        let key = edge_key(prepare_edge, from, to);
        Self::new(
            prepare_edge,
            from,
            to,
            weight,
            key,
            key,
            INVALID_EDGE,
            INVALID_EDGE,
            1,
        )
    }

    /// Creates a shortcut edge skipping `skipped1` and `skipped2`.
    ///
    /// # Panics
    /// Panics if `weight` is not finite.
    #[allow(clippy::too_many_arguments)]
    pub fn shortcut(
        prepare_edge: EdgeId,
        from: Node,
        to: Node,
        orig_edge_key_first: EdgeKey,
        orig_edge_key_last: EdgeKey,
        skipped1: EdgeId,
        skipped2: EdgeId,
        weight: f64,
        orig_edge_count: u32,
    ) -> Self {
        Self::new(
            prepare_edge,
            from,
            to,
            weight,
            orig_edge_key_first,
            orig_edge_key_last,
            skipped1,
            skipped2,
            orig_edge_count,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn new(
        prepare_edge: EdgeId,
        from: Node,
        to: Node,
        weight: f64,
        orig_edge_key_first: EdgeKey,
        orig_edge_key_last: EdgeKey,
        skipped1: EdgeId,
        skipped2: EdgeId,
        orig_edge_count: u32,
    ) -> Self {
        assert!(weight.is_finite(), "weight must be finite, got {weight}");
        Self {
            prepare_edge,
            from,
            to,
            weight,
            orig_edge_key_first,
            orig_edge_key_last,
            skipped1,
            skipped2,
            orig_edge_count,
        }
    }

    /// Returns *true* if this edge is a shortcut, ie. it skips other edges
    #[inline(always)]
    pub fn is_shortcut(&self) -> bool {
        self.skipped1 != INVALID_EDGE
    }

    pub fn prepare_edge(&self) -> EdgeId {
        self.prepare_edge
    }

    pub fn from(&self) -> Node {
        self.from
    }

    pub fn to(&self) -> Node {
        self.to
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn orig_edge_key_first(&self) -> EdgeKey {
        self.orig_edge_key_first
    }

    pub fn orig_edge_key_last(&self) -> EdgeKey {
        self.orig_edge_key_last
    }

    pub fn skipped1(&self) -> EdgeId {
        self.skipped1
    }

    pub fn skipped2(&self) -> EdgeId {
        self.skipped2
    }

    pub fn orig_edge_count(&self) -> u32 {
        self.orig_edge_count
    }

    /// Replaces the weight of this edge.
    ///
    /// # Panics
    /// Panics if `weight` is not finite.
    pub fn set_weight(&mut self, weight: f64) {
        assert!(weight.is_finite(), "weight must be finite, got {weight}");
        self.weight = weight;
    }

    pub fn set_skipped_edges(&mut self, skipped1: EdgeId, skipped2: EdgeId) {
        self.skipped1 = skipped1;
        self.skipped2 = skipped2;
    }

    pub fn set_orig_edge_count(&mut self, orig_edge_count: u32) {
        self.orig_edge_count = orig_edge_count;
    }
}

impl Display for PrepareEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{} ({}, {}) {}",
            self.from, self.to, self.orig_edge_key_first, self.orig_edge_key_last, self.weight
        )
    }
}

impl Debug for PrepareEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <Self as Display>::fmt(self, f)
    }
}
