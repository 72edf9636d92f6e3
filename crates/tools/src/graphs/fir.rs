//! FIR filter graph

use dataflow_runtime::{BinaryOp, Graph, Operator, OperatorId, Port, Streams, Word};
use tracing::{debug, instrument};

use super::{BuildError, BuildResult, IdCounter, SampleGraph};

/// Build a direct-form FIR filter as graph `id`, one copy per input sequence
///
/// The delay line is precomputed outside the graph: a tick is a single
/// combinational sweep, so every tap reads its own stream input holding the
/// input shifted by the tap delay. Tap `k` multiplies
/// `x[n - k]` by `coefficients[k]`; an adder chain sums the products, giving
/// `y[n] = sum(c[k] * x[n - k])` for every `n` where all taps are filled.
/// An input of `len` samples yields `len - taps + 1` outputs, none if it is
/// shorter than the filter.
///
/// Copies should be fed sequences of equal length: a run lasts until every
/// input is drained, and a shorter copy keeps repeating its last output.
#[instrument(skip_all, fields(graph = id, taps = coefficients.len(), copies = inputs.len()))]
pub fn fir<T: Word>(
    id: u32,
    coefficients: &[T],
    inputs: &[Vec<T>],
    streams: &mut Streams<T>,
) -> BuildResult<SampleGraph<T>> {
    let taps = coefficients.len();
    if taps == 0 {
        return Err(BuildError::NoTaps);
    }
    if inputs.is_empty() {
        return Err(BuildError::NoInputs);
    }

    let mut ids = IdCounter(0);
    let mut graph = Graph::new(id, "fir");

    // Tap inputs of every copy first, then the outputs, then the arithmetic.
    let mut tap_inputs = Vec::with_capacity(inputs.len());
    for data in inputs {
        let lane: Vec<OperatorId> = (0..taps)
            .map(|k| {
                let stream = streams.add_input(delayed(data, taps, k));
                graph.insert(Operator::stream_in(ids.next(), stream))
            })
            .collect::<Result<_, _>>()?;
        tap_inputs.push(lane);
    }

    let mut sinks = Vec::with_capacity(inputs.len());
    let mut outputs = Vec::with_capacity(inputs.len());
    for _ in inputs {
        let sink = streams.add_sink();
        outputs.push(graph.insert(Operator::stream_out(ids.next(), sink))?);
        sinks.push(sink);
    }

    for (lane, &output) in tap_inputs.iter().zip(&outputs) {
        let mut sum: Option<OperatorId> = None;
        for (&tap, &coefficient) in lane.iter().zip(coefficients) {
            let product = OperatorId(ids.next());
            graph.connect(tap, Operator::immediate(product.0, BinaryOp::Mult, coefficient), Port::A)?;

            let adder = OperatorId(ids.next());
            match sum {
                None => graph.connect(product, Operator::pass_a(adder.0), Port::A)?,
                Some(previous) => {
                    graph.connect(product, Operator::binary(adder.0, BinaryOp::Add), Port::A)?;
                    graph.connect(previous, adder, Port::B)?;
                }
            }
            sum = Some(adder);
        }
        if let Some(last) = sum {
            graph.connect(last, output, Port::A)?;
        }
    }

    debug!(
        operators = graph.operator_count(),
        edges = graph.edge_count(),
        max_level = graph.max_level(),
        "FIR graph built"
    );
    Ok(SampleGraph { graph, sinks })
}

/// Samples seen by tap `k` of a `taps` long filter: `x[taps-1-k .. len-k]`
fn delayed<T: Word>(data: &[T], taps: usize, k: usize) -> Vec<T> {
    if data.len() < taps {
        return Vec::new();
    }
    data[taps - 1 - k..data.len() - k].to_vec()
}
