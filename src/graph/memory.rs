use super::*;

/// An edge of a [`MemoryChGraph`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChEdge {
    pub base_node: Node,
    pub adj_node: Node,
    pub flags: ShortcutFlags,
    pub weight: f64,
    pub skipped1: EdgeId,
    pub skipped2: EdgeId,
}

impl ChEdge {
    /// Returns *true* if this edge skips other edges
    pub fn is_shortcut(&self) -> bool {
        self.skipped1 != INVALID_EDGE
    }
}

/// Heap-backed persisted graph: the original edges followed by all inserted shortcuts.
///
/// All accessors are bounds-checked.
#[derive(Debug, Clone, Default)]
pub struct MemoryChGraph {
    nodes: NumNodes,
    original_edges: NumEdges,
    edges: Vec<ChEdge>,
}

impl MemoryChGraph {
    /// Creates a persisted graph holding the original edges of `graph`
    pub fn from_base_graph<G: BaseGraph>(graph: &G) -> Self {
        let mut edges = Vec::with_capacity(graph.number_of_edges() as usize);
        edges.extend(graph.all_edges().map(|e| {
            let mut flags = ShortcutFlags::empty();
            flags.set(ShortcutFlags::FWD, e.forward);
            flags.set(ShortcutFlags::BWD, e.backward);

            ChEdge {
                base_node: e.base_node,
                adj_node: e.adj_node,
                flags,
                weight: e.distance,
                skipped1: INVALID_EDGE,
                skipped2: INVALID_EDGE,
            }
        }));

        Self {
            nodes: graph.number_of_nodes(),
            original_edges: graph.number_of_edges(),
            edges,
        }
    }

    /// Returns edge `edge`
    /// ** Panics if `edge >= m` **
    pub fn edge(&self, edge: EdgeId) -> &ChEdge {
        &self.edges[edge as usize]
    }

    /// Returns an iterator over all shortcuts and their ids
    pub fn shortcuts(&self) -> impl Iterator<Item = (EdgeId, &ChEdge)> + '_ {
        self.edges
            .iter()
            .enumerate()
            .skip(self.original_edges as usize)
            .map(|(id, edge)| (id as EdgeId, edge))
    }

    /// Returns the number of shortcuts
    pub fn number_of_shortcuts(&self) -> NumEdges {
        self.number_of_edges() - self.original_edges
    }
}

impl GraphNodeOrder for MemoryChGraph {
    fn number_of_nodes(&self) -> NumNodes {
        self.nodes
    }
}

impl GraphEdgeOrder for MemoryChGraph {
    fn number_of_edges(&self) -> NumEdges {
        self.edges.len() as NumEdges
    }
}

impl ShortcutGraph for MemoryChGraph {
    fn original_edges(&self) -> NumEdges {
        self.original_edges
    }

    fn shortcut(
        &mut self,
        from: Node,
        to: Node,
        flags: ShortcutFlags,
        weight: f64,
        skipped1: EdgeId,
        skipped2: EdgeId,
    ) -> EdgeId {
        assert!(from < self.nodes && to < self.nodes);
        assert!(!flags.is_empty(), "shortcut {from}-{to} has no direction");
        assert!(weight.is_finite(), "weight must be finite, got {weight}");
        assert_ne!(skipped1, INVALID_EDGE);

        let id = self.edges.len() as EdgeId;
        self.edges.push(ChEdge {
            base_node: from,
            adj_node: to,
            flags,
            weight,
            skipped1,
            skipped2,
        });
        id
    }

    fn is_shortcut(&self, edge: EdgeId) -> bool {
        self.edges[edge as usize].is_shortcut()
    }

    fn skipped_edges(&self, edge: EdgeId) -> (EdgeId, EdgeId) {
        let edge = &self.edges[edge as usize];
        (edge.skipped1, edge.skipped2)
    }

    fn set_skipped_edges(&mut self, edge: EdgeId, skipped1: EdgeId, skipped2: EdgeId) {
        let edge = &mut self.edges[edge as usize];
        edge.skipped1 = skipped1;
        edge.skipped2 = skipped2;
    }
}
