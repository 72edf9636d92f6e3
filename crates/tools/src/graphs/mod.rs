//! Sample graph builders
//!
//! Each builder registers its stream inputs and sinks in the caller's
//! [`Streams`] and returns the wired graph together with its sinks, one per
//! copy. Copies are independent lanes sharing one graph.

mod chebyshev;
mod fir;

use dataflow_runtime::{Graph, SinkId, Streams, Word};
use thiserror::Error;

pub use chebyshev::chebyshev;
pub use fir::fir;

/// Errors raised while building a sample graph
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("a FIR filter needs at least one coefficient")]
    NoTaps,

    #[error("at least one input sequence is required")]
    NoInputs,

    #[error(transparent)]
    Graph(#[from] dataflow_runtime::Error),
}

/// Result type for graph builders.
pub type BuildResult<T> = Result<T, BuildError>;

/// A built graph and the sinks its outputs land in, one per copy
#[derive(Debug, Clone)]
pub struct SampleGraph<T> {
    pub graph: Graph<T>,
    pub sinks: Vec<SinkId>,
}

impl<T: Word> SampleGraph<T> {
    /// Drain the output of every copy, in copy order
    pub fn take_outputs(&self, streams: &mut Streams<T>) -> Vec<Vec<T>> {
        self.sinks.iter().map(|&sink| streams.take_output(sink)).collect()
    }
}

/// Hands out consecutive operator ids
struct IdCounter(u32);

impl IdCounter {
    fn next(&mut self) -> u32 {
        let id = self.0;
        self.0 += 1;
        id
    }
}
