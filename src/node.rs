/*!
# Node Representation

We choose `Node = u32` as road networks handled by a single preparation run stay well below `2^32` nodes.
Nodes carry no record of their own: all per-node state of the preparation graph lives in adjacency buckets
indexed by the node value.
*/

/// A node is an index in `0..n`
pub type Node = u32;

/// Marks the absence of a node
pub const INVALID_NODE: Node = Node::MAX;

/// Node counts share the representation of nodes, so `n < 2^32`
pub type NumNodes = Node;
