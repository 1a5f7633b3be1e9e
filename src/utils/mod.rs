/*!
# Utilities

Provides [`BucketedArray`](self::bucketed::BucketedArray), the storage behind all adjacency lists of
the [`PrepareGraph`](crate::prepare::PrepareGraph). You probably do not need to interact with this
module directly.
*/

pub mod bucketed;
