use std::fmt::Display;

use log::{info, trace};
use smallvec::SmallVec;

use super::*;
use crate::{
    error::PrepareError,
    graph::{ShortcutFlags, ShortcutGraph},
};

/// A shortcut collected while contracting a single node
#[derive(Debug, Clone, Copy, PartialEq)]
struct Shortcut {
    prepare_edge_fwd: EdgeId,
    prepare_edge_bwd: EdgeId,
    from: Node,
    to: Node,
    skipped1: EdgeId,
    skipped2: EdgeId,
    flags: ShortcutFlags,
    weight: f64,
}

impl Display for Shortcut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let arrow = if self.flags == ShortcutFlags::BOTH {
            "<->"
        } else {
            "->"
        };
        write!(
            f,
            "{}{}{}, weight:{} ({},{})",
            self.from, arrow, self.to, self.weight, self.skipped1, self.skipped2
        )
    }
}

/// A prepare-edge id translated with the mapping known so far
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolved {
    Final(EdgeId),
    /// A shortcut that has not been persisted yet; only equal to itself
    Pending(EdgeId),
}

/// Writes the shortcuts found during contraction into a persisted [`ShortcutGraph`].
///
/// Shortcuts are collected per contracted node between [`ShortcutInserter::start_contracting_node`]
/// and [`ShortcutInserter::finish_contracting_node`]. Persisted shortcuts initially skip *temporary*
/// prepare-edge ids; [`ShortcutInserter::finish_contraction`] translates them to the final ids once
/// every node has been contracted, since a shortcut may skip another one that is persisted later.
///
/// # Examples
/// ```
/// use chprep::{graph::*, prelude::*};
///
/// let base = EdgeListGraph::from_edges(3, [(0, 1, 1.0), (1, 2, 1.0)]);
/// let mut ch = MemoryChGraph::from_base_graph(&base);
///
/// let mut inserter = ShortcutInserter::new(&mut ch);
/// inserter.start_contracting_node();
/// inserter.add_shortcut(2, INVALID_EDGE, 0, 2, 0, 1, ShortcutFlags::FWD, 2.0);
/// inserter.add_shortcut_with_update(3, 0, 2, 0, 1, 2.0);
/// assert_eq!(inserter.finish_contracting_node(), 1);
/// assert_eq!(inserter.finish_contraction(), Ok(1));
///
/// assert_eq!(ch.edge(2).flags, ShortcutFlags::BOTH);
/// ```
pub struct ShortcutInserter<'a, G>
where
    G: ShortcutGraph,
{
    graph: &'a mut G,
    orig_edges: NumEdges,
    shortcuts: SmallVec<[Shortcut; 8]>,
    shortcuts_by_prepare_edges: Vec<EdgeId>,
    collecting: bool,
    persisted: usize,
}

impl<'a, G> ShortcutInserter<'a, G>
where
    G: ShortcutGraph,
{
    /// Creates an inserter writing into `graph`.
    /// Prepare-edge ids below `graph.original_edges()` are considered final.
    pub fn new(graph: &'a mut G) -> Self {
        let orig_edges = graph.original_edges();
        Self {
            graph,
            orig_edges,
            shortcuts: SmallVec::new(),
            shortcuts_by_prepare_edges: Vec::new(),
            collecting: false,
            persisted: 0,
        }
    }

    /// Discards all collected shortcuts and starts collecting for the next node
    pub fn start_contracting_node(&mut self) {
        self.shortcuts.clear();
        self.collecting = true;
    }

    /// Returns the number of shortcuts collected for the current node
    pub fn buffered(&self) -> usize {
        self.shortcuts.len()
    }

    /// Returns the number of shortcuts persisted so far
    pub fn persisted(&self) -> usize {
        self.persisted
    }

    /// Collects a shortcut without looking for a matching one
    #[allow(clippy::too_many_arguments)]
    pub fn add_shortcut(
        &mut self,
        prepare_edge_fwd: EdgeId,
        prepare_edge_bwd: EdgeId,
        from: Node,
        to: Node,
        skipped1: EdgeId,
        skipped2: EdgeId,
        flags: ShortcutFlags,
        weight: f64,
    ) {
        debug_assert!(self.collecting, "no node is being contracted");
        self.shortcuts.push(Shortcut {
            prepare_edge_fwd,
            prepare_edge_bwd,
            from,
            to,
            skipped1,
            skipped2,
            flags,
            weight,
        });
    }

    /// Collects a backward shortcut from `from` to `to`.
    ///
    /// If a forward-only shortcut with the same target, the bit-identical weight and the same
    /// (resolved) skipped edges was collected before, it is turned into a bidirectional one instead.
    /// Skipped edges are resolved with the mapping known at this point: a shortcut that is not yet
    /// persisted only matches itself.
    pub fn add_shortcut_with_update(
        &mut self,
        prepare_edge_bwd: EdgeId,
        from: Node,
        to: Node,
        skipped1: EdgeId,
        skipped2: EdgeId,
        weight: f64,
    ) {
        debug_assert!(self.collecting, "no node is being contracted");

        let resolved = (self.resolve(skipped1), self.resolve(skipped2));
        let matching = self.shortcuts.iter().position(|sc| {
            sc.to == to
                && sc.weight.to_bits() == weight.to_bits()
                && (self.resolve(sc.skipped1), self.resolve(sc.skipped2)) == resolved
                && sc.flags == ShortcutFlags::FWD
        });

        if let Some(index) = matching {
            let sc = &mut self.shortcuts[index];
            sc.flags = ShortcutFlags::BOTH;
            sc.prepare_edge_bwd = prepare_edge_bwd;
        } else {
            self.shortcuts.push(Shortcut {
                prepare_edge_fwd: INVALID_EDGE,
                prepare_edge_bwd,
                from,
                to,
                skipped1,
                skipped2,
                flags: ShortcutFlags::BWD,
                weight,
            });
        }
    }

    /// Persists all collected shortcuts and returns how many were written
    pub fn finish_contracting_node(&mut self) -> usize {
        let shortcuts = std::mem::take(&mut self.shortcuts);
        for &sc in &shortcuts {
            let id = self.graph.shortcut(
                sc.from,
                sc.to,
                sc.flags,
                sc.weight,
                sc.skipped1,
                sc.skipped2,
            );
            trace!("persisted shortcut {id}: {sc}");

            if sc.flags == ShortcutFlags::FWD {
                self.set_shortcut_for_prepare_edge(sc.prepare_edge_fwd, id);
            } else if sc.flags == ShortcutFlags::BWD {
                self.set_shortcut_for_prepare_edge(sc.prepare_edge_bwd, id);
            } else {
                self.set_shortcut_for_prepare_edge(sc.prepare_edge_fwd, id);
                self.set_shortcut_for_prepare_edge(sc.prepare_edge_bwd, id);
            }
            self.persisted += 1;
        }

        self.collecting = false;
        shortcuts.len()
    }

    /// Rewrites the skipped edges of every persisted shortcut from prepare-edge ids to final ids.
    ///
    /// Must be called exactly once, after the last node has been contracted.
    /// Returns the number of rewritten shortcuts.
    pub fn finish_contraction(self) -> Result<usize, PrepareError> {
        let mut rewritten = 0;
        for edge in self.graph.edges_range() {
            if !self.graph.is_shortcut(edge) {
                continue;
            }

            let (skipped1, skipped2) = self.graph.skipped_edges(edge);
            let skipped1 = self.final_id(edge, skipped1)?;
            let skipped2 = self.final_id(edge, skipped2)?;
            self.graph.set_skipped_edges(edge, skipped1, skipped2);
            rewritten += 1;
        }

        info!(
            "finished contraction: {} shortcuts persisted, {} skipped edge pairs resolved",
            self.persisted, rewritten
        );

        Ok(rewritten)
    }

    /// Returns the final id of a persisted prepare edge
    pub fn shortcut_for_prepare_edge(&self, prepare_edge: EdgeId) -> Option<EdgeId> {
        match self.resolve(prepare_edge) {
            Resolved::Final(id) => Some(id),
            Resolved::Pending(_) => None,
        }
    }

    fn set_shortcut_for_prepare_edge(&mut self, prepare_edge: EdgeId, shortcut: EdgeId) {
        assert!(
            prepare_edge != INVALID_EDGE && prepare_edge >= self.orig_edges,
            "prepare edge {prepare_edge} cannot be mapped to a shortcut"
        );

        let index = (prepare_edge - self.orig_edges) as usize;
        if index >= self.shortcuts_by_prepare_edges.len() {
            self.shortcuts_by_prepare_edges.resize(index + 1, INVALID_EDGE);
        }
        self.shortcuts_by_prepare_edges[index] = shortcut;
    }

    fn resolve(&self, prepare_edge: EdgeId) -> Resolved {
        if prepare_edge < self.orig_edges {
            return Resolved::Final(prepare_edge);
        }

        match self
            .shortcuts_by_prepare_edges
            .get((prepare_edge - self.orig_edges) as usize)
        {
            Some(&id) if id != INVALID_EDGE => Resolved::Final(id),
            _ => Resolved::Pending(prepare_edge),
        }
    }

    fn final_id(&self, shortcut: EdgeId, prepare_edge: EdgeId) -> Result<EdgeId, PrepareError> {
        match self.resolve(prepare_edge) {
            Resolved::Final(id) => Ok(id),
            Resolved::Pending(_) => Err(PrepareError::UnresolvedPrepareEdge {
                shortcut,
                prepare_edge,
            }),
        }
    }
}
