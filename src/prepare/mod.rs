/*!
# Contraction Preparation

The mutable state of a Contraction Hierarchy preparation run.

- [`PrepareGraph`] holds the working graph: every original edge and every shortcut inserted so far,
  for all nodes that are not yet contracted. It also keeps the (static) original adjacency.
- [`ShortcutInserter`] collects the shortcuts produced while contracting one node, merges symmetric
  pairs and writes them into the persisted [`ShortcutGraph`](crate::graph::ShortcutGraph).

A contraction-order driver (not part of this crate) typically
1. picks a node and inspects its neighbors via the explorers of the [`PrepareGraph`],
2. inserts the required shortcuts between those neighbors with [`PrepareGraph::add_shortcut`],
3. persists the shortcuts incident to the node via the [`ShortcutInserter`],
4. calls [`PrepareGraph::disconnect`] and re-evaluates the returned neighbors.

Once every node is contracted, [`ShortcutInserter::finish_contraction`] rewrites the skipped edges of
all persisted shortcuts from temporary prepare-edge ids to final ids.
*/

use crate::{ops::*, *};

mod explorer;
mod inserter;
mod prepare_graph;

pub use explorer::*;
pub use inserter::*;
pub use prepare_graph::*;
