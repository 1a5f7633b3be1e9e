use fxhash::FxHashSet;
use log::debug;

use super::*;
use crate::{
    error::{PrepareError, raise_error_unless},
    graph::{BaseGraph, Weighting},
    utils::bucketed::BucketedArray,
};

/// Configuration of a [`PrepareGraph`].
///
/// The capacities only affect memory usage and the number of bucket relocations, never results.
#[derive(Debug, Clone, Copy)]
pub struct PrepareGraphConfig {
    initial_bucket_capacity: u32,
    initial_base_bucket_capacity: u32,
}

impl Default for PrepareGraphConfig {
    fn default() -> Self {
        Self {
            initial_bucket_capacity: 4,
            initial_base_bucket_capacity: 4,
        }
    }
}

impl PrepareGraphConfig {
    /// Creates the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of slots a node's working adjacency (in- and out-edges) starts with.
    ///
    /// # Panics
    /// Panics if `capacity == 0`.
    pub fn initial_bucket_capacity(mut self, capacity: u32) -> Self {
        assert!(capacity > 0);
        self.initial_bucket_capacity = capacity;
        self
    }

    /// Sets the number of slots a node's original adjacency starts with.
    ///
    /// # Panics
    /// Panics if `capacity == 0`.
    pub fn initial_base_bucket_capacity(mut self, capacity: u32) -> Self {
        assert!(capacity > 0);
        self.initial_base_bucket_capacity = capacity;
        self
    }
}

/// Slab of all live [`PrepareEdge`]s. Slots of removed edges are reused.
///
/// Every slot has a generation that is bumped on release; handles of released edges are rejected.
#[derive(Debug, Clone, Default)]
pub(crate) struct EdgeSlab {
    slots: Vec<PrepareEdge>,
    generations: Vec<u32>,
    free: Vec<u32>,
}

impl EdgeSlab {
    fn alloc(&mut self, edge: PrepareEdge) -> PrepareEdgeRef {
        let slot = if let Some(slot) = self.free.pop() {
            self.slots[slot as usize] = edge;
            slot
        } else {
            self.slots.push(edge);
            self.generations.push(0);
            self.slots.len() as u32 - 1
        };

        PrepareEdgeRef {
            slot,
            generation: self.generations[slot as usize],
        }
    }

    fn release(&mut self, edge: PrepareEdgeRef) {
        debug_assert!(self.contains(edge));
        let generation = &mut self.generations[edge.index()];
        *generation = generation.wrapping_add(1);
        self.free.push(edge.slot);
    }

    fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Returns *true* if `edge` refers to an edge that was not released since
    #[inline(always)]
    pub(crate) fn contains(&self, edge: PrepareEdgeRef) -> bool {
        self.generations.get(edge.index()) == Some(&edge.generation)
    }

    /// ** Panics if `edge` was released **
    #[inline(always)]
    pub(crate) fn get(&self, edge: PrepareEdgeRef) -> &PrepareEdge {
        assert!(self.contains(edge), "edge {edge:?} was removed");
        &self.slots[edge.index()]
    }

    /// ** Panics if `edge` was released **
    #[inline(always)]
    pub(crate) fn get_mut(&mut self, edge: PrepareEdgeRef) -> &mut PrepareEdge {
        assert!(self.contains(edge), "edge {edge:?} was removed");
        &mut self.slots[edge.index()]
    }
}

/// The working graph of a preparation run.
///
/// Every node owns a single bucket of edge handles: its incoming edges form the in-partition,
/// its outgoing edges the out-partition. A second set of buckets keeps the original edges of
/// every node, which are never removed.
///
/// # Examples
/// ```
/// use chprep::{graph::*, prelude::*};
///
/// let base = EdgeListGraph::from_edges(3, [(0, 1, 1.0), (1, 2, 2.0)]);
/// let mut graph = PrepareGraph::new(3);
/// graph.init_from_graph(&base, &DistanceWeighting).unwrap();
/// assert_eq!(graph.degree(1), 4);
///
/// let sc = graph.add_shortcut(0, 2, 0, 2, 0, 1, 3.0, 2);
/// assert_eq!(sc, 2);
///
/// let neighbors = graph.disconnect(1);
/// assert_eq!(neighbors.len(), 2);
/// assert_eq!(graph.degree(0), 1);
/// ```
#[derive(Debug, Clone)]
pub struct PrepareGraph {
    nodes: NumNodes,
    original_edges: NumEdges,
    next_edge: EdgeId,
    edges: EdgeSlab,
    arcs: BucketedArray<PrepareEdgeRef>,
    base_arcs: BucketedArray<BaseEdge>,
}

impl PrepareGraph {
    /// Creates an empty working graph for `nodes` nodes with the default configuration
    pub fn new(nodes: NumNodes) -> Self {
        Self::with_config(nodes, PrepareGraphConfig::default())
    }

    /// Creates an empty working graph for `nodes` nodes
    pub fn with_config(nodes: NumNodes, config: PrepareGraphConfig) -> Self {
        Self {
            nodes,
            original_edges: 0,
            next_edge: 0,
            edges: EdgeSlab::default(),
            arcs: BucketedArray::new(nodes as usize, config.initial_bucket_capacity),
            base_arcs: BucketedArray::new(nodes as usize, config.initial_base_bucket_capacity),
        }
    }

    /// Creates a working graph and initializes it from `graph`
    pub fn from_graph<G, W>(graph: &G, weighting: &W) -> Result<Self, PrepareError>
    where
        G: BaseGraph,
        W: Weighting,
    {
        let mut prepare = Self::new(graph.number_of_nodes());
        prepare.init_from_graph(graph, weighting)?;
        Ok(prepare)
    }

    /// Adds one edge per traversable direction of every edge of `graph`.
    ///
    /// Directions without access or with a non-finite weight are skipped.
    /// Shortcuts added afterwards receive ids starting at `graph.number_of_edges()`.
    pub fn init_from_graph<G, W>(&mut self, graph: &G, weighting: &W) -> Result<(), PrepareError>
    where
        G: BaseGraph,
        W: Weighting,
    {
        raise_error_unless!(
            graph.number_of_nodes() == self.nodes,
            PrepareError::NodeCountMismatch {
                graph: graph.number_of_nodes(),
                prepare: self.nodes,
            }
        );

        self.original_edges = graph.number_of_edges();
        self.next_edge = self.original_edges;

        let mut added = 0usize;
        let mut unreachable = 0usize;
        for edge in graph.all_edges() {
            if edge.forward {
                let weight = weighting.calc_edge_weight(&edge, false);
                if weight.is_finite() {
                    self.add_edge(edge.base_node, edge.adj_node, edge.edge, weight);
                    added += 1;
                } else {
                    unreachable += 1;
                }
            }
            if edge.backward {
                let weight = weighting.calc_edge_weight(&edge, true);
                if weight.is_finite() {
                    self.add_edge(edge.adj_node, edge.base_node, edge.edge, weight);
                    added += 1;
                } else {
                    unreachable += 1;
                }
            }
        }

        debug!(
            "initialized prepare graph with {} nodes and {} base edges: {} directed edges, {} skipped due to infinite weight",
            self.nodes, self.original_edges, added, unreachable
        );

        Ok(())
    }

    /// Returns the number of original edges the shortcut ids are counted from
    pub fn original_edges(&self) -> NumEdges {
        self.original_edges
    }

    /// Returns the number of edges (original or shortcut) currently present in the working graph
    pub fn number_of_live_edges(&self) -> usize {
        self.edges.live()
    }

    /// Returns the number of edges incident to `node` that are still present (in-degree + out-degree)
    /// ** Panics if `node >= n` **
    pub fn degree(&self, node: Node) -> NumEdges {
        self.arcs.size(node)
    }

    /// Adds an original edge from `from` to `to`. `orig_edge` is used as its prepare-edge id.
    ///
    /// # Panics
    /// Panics if `weight` is not finite.
    pub fn add_edge(&mut self, from: Node, to: Node, orig_edge: EdgeId, weight: f64) {
        let edge = self
            .edges
            .alloc(PrepareEdge::edge(orig_edge, from, to, weight));
        self.arcs.add_out(from, edge);
        self.arcs.add_in(to, edge);

        let base_edge = BaseEdge::new(orig_edge, from, to);
        self.base_arcs.add_out(from, base_edge);
        self.base_arcs.add_in(to, base_edge);
    }

    /// Adds a shortcut from `from` to `to` and returns its (temporary) prepare-edge id.
    ///
    /// The id is only meaningful within this graph and the
    /// [`ShortcutInserter`] until the shortcut is persisted.
    ///
    /// # Panics
    /// Panics if `weight` is not finite.
    #[allow(clippy::too_many_arguments)]
    pub fn add_shortcut(
        &mut self,
        from: Node,
        to: Node,
        orig_edge_key_first: EdgeKey,
        orig_edge_key_last: EdgeKey,
        skipped1: EdgeId,
        skipped2: EdgeId,
        weight: f64,
        orig_edge_count: u32,
    ) -> EdgeId {
        let id = self.next_edge;
        let edge = self.edges.alloc(PrepareEdge::shortcut(
            id,
            from,
            to,
            orig_edge_key_first,
            orig_edge_key_last,
            skipped1,
            skipped2,
            weight,
            orig_edge_count,
        ));
        self.arcs.add_out(from, edge);
        self.arcs.add_in(to, edge);

        self.next_edge += 1;
        id
    }

    /// Removes all edges incident to `node` from the working graph and returns the set of
    /// distinct neighbors that lost at least one edge.
    ///
    /// Loops at `node` are dropped without being reported. The original adjacency is not touched.
    /// ** Panics if `node >= n` **
    pub fn disconnect(&mut self, node: Node) -> FxHashSet<Node> {
        let mut neighbors =
            FxHashSet::with_capacity_and_hasher(self.degree(node) as usize, Default::default());

        // the bucket of `node` itself is not modified until it is cleared
        let size_in = self.arcs.size_in(node);
        for i in 0..self.arcs.size(node) {
            let handle = self.arcs.get(node, i);
            let edge = self.edges.get(handle);

            let other = if i < size_in { edge.from } else { edge.to };
            if other == node {
                // loops show up in both partitions and are released once, from the out-partition
                if i >= size_in {
                    self.edges.release(handle);
                }
                continue;
            }

            self.arcs.remove(other, handle);
            self.edges.release(handle);
            neighbors.insert(other);
        }
        self.arcs.clear(node);

        neighbors
    }

    /// Returns *true* if `edge` is still part of the working graph
    pub fn contains_edge(&self, edge: PrepareEdgeRef) -> bool {
        self.edges.contains(edge)
    }

    /// Returns the edge referenced by `edge`
    /// ** Panics if `edge` was removed by [`PrepareGraph::disconnect`] **
    pub fn edge(&self, edge: PrepareEdgeRef) -> &PrepareEdge {
        self.edges.get(edge)
    }

    /// Returns an iterator over the edges currently leaving `node`
    pub fn out_edges(&self, node: Node) -> impl Iterator<Item = &PrepareEdge> + '_ {
        self.arcs
            .out_slice(node)
            .iter()
            .map(|&edge| self.edges.get(edge))
    }

    /// Returns an iterator over the edges currently entering `node`
    pub fn in_edges(&self, node: Node) -> impl Iterator<Item = &PrepareEdge> + '_ {
        self.arcs
            .in_slice(node)
            .iter()
            .map(|&edge| self.edges.get(edge))
    }

    /// Creates a cursor over the outgoing working edges of a node
    pub fn out_explorer(&self) -> PrepareGraphExplorer<'_> {
        PrepareGraphExplorer::new(self, Direction::Out)
    }

    /// Creates a cursor over the incoming working edges of a node.
    /// Base and adjacent node are reported from the perspective of the explored node.
    pub fn in_explorer(&self) -> PrepareGraphExplorer<'_> {
        PrepareGraphExplorer::new(self, Direction::In)
    }

    /// Like [`PrepareGraph::out_explorer`] but allows modifying the visited edges
    pub fn out_explorer_mut(&mut self) -> PrepareGraphExplorerMut<'_> {
        PrepareGraphExplorerMut::new(self, Direction::Out)
    }

    /// Like [`PrepareGraph::in_explorer`] but allows modifying the visited edges
    pub fn in_explorer_mut(&mut self) -> PrepareGraphExplorerMut<'_> {
        PrepareGraphExplorerMut::new(self, Direction::In)
    }

    /// Creates a cursor over the outgoing original edges of a node
    pub fn base_out_explorer(&self) -> BaseGraphExplorer<'_> {
        BaseGraphExplorer::new(&self.base_arcs, Direction::Out)
    }

    /// Creates a cursor over the incoming original edges of a node
    pub fn base_in_explorer(&self) -> BaseGraphExplorer<'_> {
        BaseGraphExplorer::new(&self.base_arcs, Direction::In)
    }

    #[inline(always)]
    pub(crate) fn arcs(&self, node: Node, direction: Direction) -> &[PrepareEdgeRef] {
        match direction {
            Direction::Out => self.arcs.out_slice(node),
            Direction::In => self.arcs.in_slice(node),
        }
    }

    #[inline(always)]
    pub(crate) fn edges_mut(&mut self) -> &mut EdgeSlab {
        &mut self.edges
    }
}

impl GraphNodeOrder for PrepareGraph {
    fn number_of_nodes(&self) -> NumNodes {
        self.nodes
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64Mcg;

    use super::*;
    use crate::{graph::*, testing::random_road_graph};

    fn out_neighbors(graph: &PrepareGraph, node: Node) -> Vec<Node> {
        graph.out_edges(node).map(|e| e.to()).sorted().collect_vec()
    }

    fn in_neighbors(graph: &PrepareGraph, node: Node) -> Vec<Node> {
        graph.in_edges(node).map(|e| e.from()).sorted().collect_vec()
    }

    #[test]
    fn init_rejects_node_count_mismatch() {
        let base = EdgeListGraph::from_edges(3, [(0, 1, 1.0)]);
        let mut graph = PrepareGraph::new(4);

        assert_eq!(
            graph.init_from_graph(&base, &DistanceWeighting),
            Err(PrepareError::NodeCountMismatch {
                graph: 3,
                prepare: 4
            })
        );
        assert_eq!(graph.number_of_live_edges(), 0);
    }

    #[test]
    fn init_skips_inaccessible_and_infinite_directions() {
        let mut base = EdgeListGraph::new(4);
        base.add_bidirectional_edge(0, 1, 1.0);
        base.add_edge(1, 2, 2.0, true, false);
        base.add_edge(2, 3, 3.0, false, true);
        base.add_bidirectional_edge(3, 0, f64::INFINITY);

        let graph = PrepareGraph::from_graph(&base, &DistanceWeighting).unwrap();
        assert_eq!(graph.original_edges(), 4);
        assert_eq!(graph.number_of_live_edges(), 4);

        assert_eq!(out_neighbors(&graph, 0), vec![1]);
        assert_eq!(out_neighbors(&graph, 1), vec![0, 2]);
        assert_eq!(out_neighbors(&graph, 2), Vec::<Node>::new());
        assert_eq!(out_neighbors(&graph, 3), vec![2]);
        assert_eq!(in_neighbors(&graph, 2), vec![1, 3]);
        assert_eq!(graph.degree(0), 2);
        assert_eq!(graph.degree(3), 1);
    }

    #[test]
    fn direction_dependent_weighting() {
        let base = EdgeListGraph::from_edges(2, [(0, 1, 5.0)]);
        let weighting = |e: &EdgeState, reverse: bool| {
            if reverse { e.distance * 2.0 } else { e.distance }
        };

        let graph = PrepareGraph::from_graph(&base, &weighting).unwrap();
        assert_eq!(graph.out_edges(0).map(|e| e.weight()).collect_vec(), vec![5.0]);
        assert_eq!(graph.out_edges(1).map(|e| e.weight()).collect_vec(), vec![10.0]);
    }

    #[test]
    fn shortcut_ids_continue_after_original_edges() {
        let base = EdgeListGraph::from_edges(4, [(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0)]);
        let mut graph = PrepareGraph::from_graph(&base, &DistanceWeighting).unwrap();

        assert_eq!(graph.add_shortcut(0, 2, 0, 2, 0, 1, 2.0, 2), 3);
        assert_eq!(graph.add_shortcut(2, 0, 5, 1, 1, 0, 2.0, 2), 4);

        let shortcut = graph.out_edges(0).find(|e| e.is_shortcut()).unwrap();
        assert_eq!(shortcut.prepare_edge(), 3);
        assert_eq!(shortcut.to(), 2);
        assert_eq!((shortcut.skipped1(), shortcut.skipped2()), (0, 1));
        assert_eq!(graph.degree(0), 4);
    }

    #[test]
    fn disconnect_reports_distinct_neighbors() {
        let mut graph = PrepareGraph::new(5);
        // parallel edges, a loop and edges in both directions
        graph.add_edge(0, 1, 0, 1.0);
        graph.add_edge(0, 1, 1, 2.0);
        graph.add_edge(1, 0, 2, 1.0);
        graph.add_edge(0, 0, 3, 1.0);
        graph.add_edge(2, 0, 4, 1.0);
        graph.add_edge(3, 4, 5, 1.0);

        let degree: NumEdges = graph.degree(0);
        assert_eq!(degree, 6);
        let neighbors = graph.disconnect(0);

        assert_eq!(neighbors.into_iter().sorted().collect_vec(), vec![1, 2]);
        assert_eq!(graph.degree(0), 0);
        assert_eq!(graph.degree(1), 0);
        assert_eq!(graph.degree(2), 0);
        assert_eq!(graph.degree(3), 1);
        assert_eq!(graph.number_of_live_edges(), 1);

        // original adjacency is kept
        let mut base = graph.base_out_explorer();
        base.set_base_node(0);
        let mut count = 0;
        while base.next() {
            count += 1;
        }
        assert_eq!(count, 3);
    }

    #[test]
    fn disconnect_isolated_node() {
        let mut graph = PrepareGraph::new(2);
        assert!(graph.disconnect(1).is_empty());

        graph.add_edge(0, 0, 0, 1.0);
        assert_eq!(graph.degree(0), 2);
        assert!(graph.disconnect(0).is_empty());
        assert_eq!(graph.degree(0), 0);
        assert_eq!(graph.number_of_live_edges(), 0);
    }

    #[test]
    fn distinct_edges_with_equal_fields() {
        let mut graph = PrepareGraph::new(3);
        graph.add_edge(0, 1, 0, 1.0);
        graph.add_edge(0, 1, 0, 1.0);
        graph.add_edge(1, 2, 1, 1.0);

        assert_eq!(graph.degree(1), 3);
        graph.disconnect(2);
        assert_eq!(graph.degree(1), 2);
        assert_eq!(in_neighbors(&graph, 1), vec![0, 0]);
    }

    #[test]
    fn released_slots_are_reused() {
        let base = EdgeListGraph::from_edges(3, [(0, 1, 1.0), (1, 2, 1.0)]);
        let mut graph = PrepareGraph::from_graph(&base, &DistanceWeighting).unwrap();
        assert_eq!(graph.number_of_live_edges(), 4);

        graph.disconnect(1);
        assert_eq!(graph.number_of_live_edges(), 0);

        graph.add_shortcut(0, 2, 0, 2, 0, 1, 2.0, 2);
        graph.add_shortcut(2, 0, 3, 1, 1, 0, 2.0, 2);
        assert_eq!(graph.number_of_live_edges(), 2);
        assert_eq!(graph.edges.slots.len(), 4);
    }

    fn first_edge_ref(explorer: &mut PrepareGraphExplorer<'_>, node: Node) -> PrepareEdgeRef {
        explorer.set_base_node(node);
        assert!(explorer.next());
        explorer.edge_ref()
    }

    #[test]
    fn handles_stay_unique_across_slot_reuse() {
        let base = EdgeListGraph::from_edges(3, [(0, 1, 1.0), (1, 2, 1.0)]);
        let mut graph = PrepareGraph::from_graph(&base, &DistanceWeighting).unwrap();

        let old = first_edge_ref(&mut graph.out_explorer(), 0);
        assert_eq!(graph.edge(old).to(), 1);

        graph.disconnect(1);
        assert!(!graph.contains_edge(old));

        graph.add_shortcut(0, 2, 0, 2, 0, 1, 2.0, 2);
        graph.add_shortcut(2, 0, 3, 1, 1, 0, 2.0, 2);
        assert_eq!(graph.edges.slots.len(), 4);

        let new = first_edge_ref(&mut graph.in_explorer(), 0);
        assert_ne!(old, new);
        assert!(graph.contains_edge(new));
        assert!(!graph.contains_edge(old));
        assert_eq!(graph.edge(new).from(), 2);
    }

    #[test]
    #[should_panic]
    fn removed_edge_cannot_be_accessed() {
        let base = EdgeListGraph::from_edges(3, [(0, 1, 1.0), (1, 2, 1.0)]);
        let mut graph = PrepareGraph::from_graph(&base, &DistanceWeighting).unwrap();

        let old = first_edge_ref(&mut graph.out_explorer(), 0);
        graph.disconnect(1);
        graph.add_shortcut(0, 2, 0, 2, 0, 1, 2.0, 2);
        graph.add_shortcut(2, 0, 3, 1, 1, 0, 2.0, 2);

        graph.edge(old);
    }

    #[test]
    fn randomized_disconnect() {
        let rng = &mut Pcg64Mcg::seed_from_u64(3);

        for n in [10 as NumNodes, 30, 60] {
            for _ in 0..10 {
                let base = random_road_graph(rng, n, 3 * n);
                let mut graph = PrepareGraph::from_graph(&base, &DistanceWeighting).unwrap();

                let mut order = (0..n).collect_vec();
                for i in (1..order.len()).rev() {
                    order.swap(i, rng.random_range(0..=i));
                }

                let mut removed = vec![false; n as usize];
                for &u in &order {
                    let expected = graph
                        .out_edges(u)
                        .map(|e| e.to())
                        .chain(graph.in_edges(u).map(|e| e.from()))
                        .filter(|&v| v != u)
                        .unique()
                        .sorted()
                        .collect_vec();

                    let neighbors = graph.disconnect(u).into_iter().sorted().collect_vec();
                    assert_eq!(neighbors, expected);
                    removed[u as usize] = true;

                    assert_eq!(graph.degree(u), 0);
                    for v in graph.vertices_range() {
                        assert!(graph.out_edges(v).all(|e| !removed[e.to() as usize]));
                        assert!(graph.in_edges(v).all(|e| !removed[e.from() as usize]));
                    }
                }

                assert_eq!(graph.number_of_live_edges(), 0);
            }
        }
    }
}
