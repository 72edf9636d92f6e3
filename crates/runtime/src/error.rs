//! Runtime errors

use thiserror::Error;

use crate::types::{GraphId, OperatorId};

/// Runtime result type
pub type Result<T> = std::result::Result<T, Error>;

/// Runtime errors
///
/// Evaluation itself never fails; these cover structural misuse of a graph
/// and the bounded run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("operator not found: {0}")]
    OperatorNotFound(OperatorId),

    #[error("operator {operator} is owned by graph {owner}")]
    AlreadyOwned { operator: OperatorId, owner: GraphId },

    #[error("inputs not drained after {limit} ticks ({exhausted}/{inputs} exhausted)")]
    TickLimitExceeded {
        limit: u64,
        exhausted: usize,
        inputs: usize,
    },
}
