use thiserror::Error;

use crate::{EdgeId, NumNodes};

/// Errors surfaced to the caller of a preparation run.
///
/// Contract violations (such as non-finite weights) are not represented here: they panic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrepareError {
    #[error(
        "cannot initialize from given graph, the number of nodes does not match: {graph} vs. {prepare}"
    )]
    NodeCountMismatch { graph: NumNodes, prepare: NumNodes },

    #[error("shortcut {shortcut} skips prepare edge {prepare_edge} which was never persisted")]
    UnresolvedPrepareEdge { shortcut: EdgeId, prepare_edge: EdgeId },
}

/// Shorthand for returning `Err(PrepareError)` early when a condition fails
macro_rules! raise_error_unless {
    ($cond : expr, $err : expr) => {
        if !($cond) {
            return Err($err);
        }
    };
}

pub(crate) use raise_error_unless;
