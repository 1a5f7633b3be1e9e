use fxhash::FxHashMap;
use itertools::Itertools;
use rand::Rng;

use crate::{error::PrepareError, graph::*, prepare::*, *};

/// Creates a random road-like graph with `m` edges between distinct nodes of `0..n`.
///
/// Distances are small integers so that sums of weights are exact and ties are common.
/// Roughly every fifth edge is a one-way street (in either direction).
pub(crate) fn random_road_graph<R: Rng>(rng: &mut R, n: NumNodes, m: NumEdges) -> EdgeListGraph {
    assert!(n > 1);

    let mut graph = EdgeListGraph::new(n);
    for _ in 0..m {
        let u = rng.random_range(0..n);
        let v = loop {
            let v = rng.random_range(0..n);
            if v != u {
                break v;
            }
        };

        let distance = rng.random_range(1..10u32) as f64;
        match rng.random_range(0..10u32) {
            0 => graph.add_edge(u, v, distance, true, false),
            1 => graph.add_edge(u, v, distance, false, true),
            _ => graph.add_bidirectional_edge(u, v, distance),
        };
    }
    graph
}

/// A working edge captured from an explorer
#[derive(Debug, Clone, Copy)]
struct CapturedEdge {
    adj_node: Node,
    prepare_edge: EdgeId,
    key_first: EdgeKey,
    key_last: EdgeKey,
    skipped1: EdgeId,
    skipped2: EdgeId,
    weight: f64,
    orig_edge_count: u32,
    is_shortcut: bool,
}

impl CapturedEdge {
    fn from_cursor<C: PrepareEdgeCursor>(cursor: &C) -> Self {
        Self {
            adj_node: cursor.adj_node(),
            prepare_edge: cursor.prepare_edge(),
            key_first: cursor.orig_edge_key_first(),
            key_last: cursor.orig_edge_key_last(),
            skipped1: cursor.skipped1(),
            skipped2: cursor.skipped2(),
            weight: cursor.weight(),
            orig_edge_count: cursor.orig_edge_count(),
            is_shortcut: cursor.is_shortcut(),
        }
    }
}

/// Collects all non-loop edges of `node` in the direction of `explorer`.
/// Among parallel edges only the lightest one is kept.
fn lightest_arcs(explorer: &mut PrepareGraphExplorer<'_>, node: Node) -> Vec<CapturedEdge> {
    let mut lightest: FxHashMap<Node, CapturedEdge> = FxHashMap::default();
    explorer.set_base_node(node);
    while explorer.next() {
        let arc = CapturedEdge::from_cursor(&*explorer);
        if arc.adj_node == node {
            continue;
        }

        lightest
            .entry(arc.adj_node)
            .and_modify(|best| {
                if arc.weight < best.weight {
                    *best = arc;
                }
            })
            .or_insert(arc);
    }
    lightest
        .into_values()
        .sorted_by_key(|arc| arc.adj_node)
        .collect_vec()
}

fn all_arcs(explorer: &mut PrepareGraphExplorer<'_>, node: Node) -> Vec<CapturedEdge> {
    explorer.set_base_node(node);
    let mut arcs = Vec::new();
    while explorer.next() {
        arcs.push(CapturedEdge::from_cursor(&*explorer));
    }
    arcs
}

/// Outcome of [`contract_all`]
pub(crate) struct Contraction {
    pub ch: MemoryChGraph,
    pub prepare_shortcuts: usize,
    pub merged: usize,
    pub result: Result<usize, PrepareError>,
}

/// Contracts all nodes of `base` in the given order without any witness search.
///
/// Every pair of remaining in- and out-neighbors of a contracted node receives a shortcut
/// (using the lightest of parallel edges). Shortcuts incident to a node are persisted right
/// before it is disconnected.
pub(crate) fn contract_all(base: &EdgeListGraph, order: &[Node]) -> Contraction {
    let mut graph = PrepareGraph::from_graph(base, &DistanceWeighting).unwrap();
    let mut ch = MemoryChGraph::from_base_graph(base);
    let mut inserter = ShortcutInserter::new(&mut ch);

    let mut prepare_shortcuts = 0;
    let mut merged = 0;
    for &node in order {
        let (incoming, outgoing, incident) = {
            let mut in_explorer = graph.in_explorer();
            let mut out_explorer = graph.out_explorer();
            let incident = (
                all_arcs(&mut out_explorer, node),
                all_arcs(&mut in_explorer, node),
            );
            (
                lightest_arcs(&mut in_explorer, node),
                lightest_arcs(&mut out_explorer, node),
                incident,
            )
        };

        inserter.start_contracting_node();
        for arc in incident.0.iter().filter(|arc| arc.is_shortcut) {
            inserter.add_shortcut(
                arc.prepare_edge,
                INVALID_EDGE,
                node,
                arc.adj_node,
                arc.skipped1,
                arc.skipped2,
                ShortcutFlags::FWD,
                arc.weight,
            );
        }
        for arc in incident.1.iter().filter(|arc| arc.is_shortcut) {
            if arc.adj_node == node {
                continue;
            }
            inserter.add_shortcut_with_update(
                arc.prepare_edge,
                node,
                arc.adj_node,
                arc.skipped2,
                arc.skipped1,
                arc.weight,
            );
        }
        let buffered = inserter.buffered();
        merged += incident
            .0
            .iter()
            .chain(incident.1.iter().filter(|arc| arc.adj_node != node))
            .filter(|arc| arc.is_shortcut)
            .count()
            - buffered;
        assert_eq!(inserter.finish_contracting_node(), buffered);

        for (a, b) in incoming.iter().cartesian_product(outgoing.iter()) {
            if a.adj_node == b.adj_node {
                continue;
            }
            graph.add_shortcut(
                a.adj_node,
                b.adj_node,
                a.key_first,
                b.key_last,
                a.prepare_edge,
                b.prepare_edge,
                a.weight + b.weight,
                a.orig_edge_count + b.orig_edge_count,
            );
            prepare_shortcuts += 1;
        }

        graph.disconnect(node);
    }

    assert_eq!(graph.number_of_live_edges(), 0);
    for id in graph.original_edges()..graph.original_edges() + prepare_shortcuts as EdgeId {
        assert!(inserter.shortcut_for_prepare_edge(id).is_some());
    }

    let result = inserter.finish_contraction();
    Contraction {
        ch,
        prepare_shortcuts,
        merged,
        result,
    }
}

/// Returns the endpoint of `edge` that is not `node`, or `None` if `edge` is not incident to `node`
fn opposite(ch: &MemoryChGraph, edge: EdgeId, node: Node) -> Option<Node> {
    let edge = ch.edge(edge);
    if edge.base_node == node {
        Some(edge.adj_node)
    } else if edge.adj_node == node {
        Some(edge.base_node)
    } else {
        None
    }
}

/// Sum of the original distances a persisted edge stands for
fn unpacked_weight(ch: &MemoryChGraph, edge: EdgeId) -> f64 {
    let ch_edge = ch.edge(edge);
    if ch_edge.is_shortcut() {
        unpacked_weight(ch, ch_edge.skipped1) + unpacked_weight(ch, ch_edge.skipped2)
    } else {
        ch_edge.weight
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    use super::*;

    fn shuffled_order<R: Rng>(rng: &mut R, n: NumNodes) -> Vec<Node> {
        let mut order = (0..n).collect_vec();
        for i in (1..order.len()).rev() {
            order.swap(i, rng.random_range(0..=i));
        }
        order
    }

    #[test]
    fn contract_path() {
        let base = EdgeListGraph::from_edges(4, [(0, 1, 1.0), (1, 2, 2.0), (2, 3, 3.0)]);
        let contraction = contract_all(&base, &[1, 2, 0, 3]);
        let ch = &contraction.ch;

        assert_eq!(contraction.result, Ok(2));
        assert_eq!(contraction.prepare_shortcuts, 4);
        assert_eq!(contraction.merged, 2);

        // 2<->0 via 1, then 0<->3 via 2
        assert_eq!(ch.number_of_shortcuts(), 2);
        let (first, second) = (ch.edge(3), ch.edge(4));
        assert_eq!(first.flags, ShortcutFlags::BOTH);
        assert_eq!((first.base_node, first.adj_node), (2, 0));
        assert_eq!((first.skipped1, first.skipped2), (1, 0));
        assert_eq!(first.weight, 3.0);

        assert_eq!(second.flags, ShortcutFlags::BOTH);
        assert_eq!((second.base_node, second.adj_node), (0, 3));
        assert_eq!((second.skipped1, second.skipped2), (3, 2));
        assert_eq!(second.weight, 6.0);
    }

    #[test]
    fn one_way_shortcuts_are_not_merged() {
        let mut base = EdgeListGraph::new(3);
        base.add_edge(0, 1, 1.0, true, false);
        base.add_bidirectional_edge(1, 2, 1.0);

        let contraction = contract_all(&base, &[1, 0, 2]);
        let ch = &contraction.ch;

        assert_eq!(contraction.result, Ok(1));
        assert_eq!(contraction.merged, 0);
        assert_eq!(ch.number_of_shortcuts(), 1);
        assert_eq!(ch.edge(2).flags, ShortcutFlags::FWD);
        assert_eq!((ch.edge(2).base_node, ch.edge(2).adj_node), (0, 2));
    }

    #[test]
    fn randomized_contraction_unpacks_consistently() {
        let rng = &mut Pcg64Mcg::seed_from_u64(3);

        for n in [5 as NumNodes, 10, 20, 30] {
            for _ in 0..10 {
                let base = random_road_graph(rng, n, 2 * n);
                let order = shuffled_order(rng, n);
                let contraction = contract_all(&base, &order);
                let ch = &contraction.ch;

                assert_eq!(contraction.result, Ok(ch.number_of_shortcuts() as usize));
                assert_eq!(
                    ch.number_of_shortcuts() as usize + contraction.merged,
                    contraction.prepare_shortcuts
                );

                for (id, sc) in ch.shortcuts() {
                    assert!(sc.skipped1 < id && sc.skipped2 < id);

                    let middle = opposite(ch, sc.skipped1, sc.base_node).unwrap();
                    assert_eq!(opposite(ch, sc.skipped2, sc.adj_node), Some(middle));
                    assert_ne!(middle, sc.base_node);
                    assert_ne!(middle, sc.adj_node);

                    assert_eq!(unpacked_weight(ch, id), sc.weight);
                }
            }
        }
    }
}
