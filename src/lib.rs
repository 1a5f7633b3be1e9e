/*!
`chprep` provides the mutable core of a Contraction Hierarchy (CH) preprocessing for road networks:

- a working graph ([`PrepareGraph`](crate::prepare::PrepareGraph)) from which nodes are removed
  one by one while shortcuts between their neighbors are added,
- cursors ([`PrepareGraphExplorer`](crate::prepare::PrepareGraphExplorer) and friends) to inspect
  and modify the in- and out-edges of a node,
- a [`ShortcutInserter`](crate::prepare::ShortcutInserter) that merges symmetric shortcut pairs,
  persists them and finally resolves the temporary ids they refer to.

# Representation

Nodes are `u32` in the range `0..n`. Edge ids are `u32` as well: ids `0..m` denote the `m` original
edges of the base graph, while shortcuts receive *temporary* prepare-edge ids `m, m + 1, ...` in the
order they are added to the working graph. Once persisted, a shortcut gets a *final* id in the
[`ShortcutGraph`](crate::graph::ShortcutGraph) it is written to.

All adjacency data lives in [`BucketedArray`](crate::utils::bucketed::BucketedArray)s: one contiguous
arena holding a growable bucket per node, split into an in- and an out-partition.

# Usage

Choosing the contraction order, witness searches and node priorities are left to the caller.
See the [`prepare`] module for the typical workflow.

In most use-cases, `use chprep::{prelude::*, graph::*};` suffices for your needs.
*/

pub mod edge;
pub mod error;
pub mod graph;
pub mod node;
pub mod ops;
pub mod prepare;
#[cfg(test)]
pub(crate) mod testing;
pub mod utils;

pub use edge::*;
pub use node::*;

/// `chprep::prelude` includes definitions for nodes and edges, the basic graph operation traits as
/// well as the preparation graph, its explorers and the shortcut inserter.
pub mod prelude {
    pub use super::{edge::*, node::*, ops::*, prepare::*};
}
