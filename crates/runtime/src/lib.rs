//! Dataflow Runtime
//!
//! Builds level-scheduled operator graphs and evaluates them tick by tick
//! until their stream inputs are drained.

pub mod error;
pub mod executor;
pub mod graph;
pub mod level;
pub mod operator;
pub mod storage;
pub mod types;

pub use error::{Error, Result};
pub use executor::RunSummary;
pub use graph::{Endpoint, Graph};
pub use operator::{BinaryOp, Operands, Operator, OperatorKind, UnaryOp};
pub use storage::{SinkId, StreamId, Streams};
pub use types::*;
