//! Integration test harness for the dataflow runtime.
//!
//! Wraps a sample graph with its streams so tests can build, run and
//! inspect it in a few lines.

use dataflow_runtime::{Graph, OperatorId, RunSummary, Streams};
use dataflow_tools::graphs::{self, SampleGraph};

/// A sample graph together with the streams it reads and writes.
pub struct TestHarness {
    sample: SampleGraph<i64>,
    streams: Streams<i64>,
}

impl TestHarness {
    /// Build a FIR filter with one copy per input.
    ///
    /// # Panics
    ///
    /// Panics if the builder rejects the arguments.
    pub fn fir(coefficients: &[i64], inputs: &[Vec<i64>]) -> Self {
        let mut streams = Streams::new();
        let sample = graphs::fir(0, coefficients, inputs, &mut streams).expect("FIR build failed");
        Self::new(sample, streams)
    }

    /// Build the Chebyshev T5 graph with one copy per input.
    ///
    /// # Panics
    ///
    /// Panics if the builder rejects the arguments.
    pub fn chebyshev(inputs: &[Vec<i64>]) -> Self {
        let mut streams = Streams::new();
        let sample = graphs::chebyshev(0, inputs, &mut streams).expect("Chebyshev build failed");
        Self::new(sample, streams)
    }

    fn new(sample: SampleGraph<i64>, streams: Streams<i64>) -> Self {
        Self { sample, streams }
    }

    pub fn graph(&self) -> &Graph<i64> {
        &self.sample.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph<i64> {
        &mut self.sample.graph
    }

    /// Run until every input is drained.
    pub fn run(&mut self) -> RunSummary {
        self.sample.graph.run(&mut self.streams)
    }

    /// Output collected so far, one sequence per copy.
    pub fn outputs(&self) -> Vec<Vec<i64>> {
        self.sample
            .sinks
            .iter()
            .map(|&sink| self.streams.output(sink).unwrap_or_default().to_vec())
            .collect()
    }

    /// Edges whose producer is not on a strictly lower level than its consumer.
    pub fn level_violations(&self) -> Vec<(OperatorId, OperatorId)> {
        let mut violations = Vec::new();
        for (src, dsts) in self.graph().adjacency() {
            let Some(src_op) = self.graph().operator(*src) else {
                continue;
            };
            for dst in dsts {
                if let Some(dst_op) = self.graph().operator(*dst)
                    && src_op.level() >= dst_op.level()
                {
                    violations.push((*src, *dst));
                }
            }
        }
        violations
    }

    /// Highest level over all operators.
    pub fn observed_max_level(&self) -> u32 {
        self.graph()
            .operators()
            .values()
            .map(|op| op.level())
            .max()
            .unwrap_or(0)
    }
}
