//! Chebyshev polynomial graph

use dataflow_runtime::{BinaryOp, Graph, Operator, OperatorId, Port, Streams, Word};
use tracing::{debug, instrument};

use super::{BuildError, BuildResult, IdCounter, SampleGraph};

/// Build graph `id` evaluating `T5(x) = 16x^5 - 20x^3 + 5x`, one copy per input
///
/// Horner form `x * (x * (x * (x * 16x - 20)) + 5)` with a chain of pass
/// registers carrying `x` alongside the multipliers.
#[instrument(skip_all, fields(graph = id, copies = inputs.len()))]
pub fn chebyshev<T: Word + From<u8>>(
    id: u32,
    inputs: &[Vec<T>],
    streams: &mut Streams<T>,
) -> BuildResult<SampleGraph<T>> {
    if inputs.is_empty() {
        return Err(BuildError::NoInputs);
    }

    let mut ids = IdCounter(0);
    let mut graph = Graph::new(id, "chebyshev");
    let mut sinks = Vec::with_capacity(inputs.len());
    let mut lanes = Vec::with_capacity(inputs.len());

    for data in inputs {
        let stream = streams.add_input(data.clone());
        let input = graph.insert(Operator::stream_in(ids.next(), stream))?;
        let sink = streams.add_sink();
        let output = graph.insert(Operator::stream_out(ids.next(), sink))?;
        sinks.push(sink);
        lanes.push((input, output));
    }

    for (input, output) in lanes {
        let reg: Vec<OperatorId> = (0..7)
            .map(|_| graph.insert(Operator::pass_a(ids.next())))
            .collect::<Result<_, _>>()?;
        let mult1 = graph.insert(Operator::immediate(ids.next(), BinaryOp::Mult, T::from(16u8)))?;
        let mult2 = graph.insert(Operator::binary(ids.next(), BinaryOp::Mult))?;
        let sub1 = graph.insert(Operator::immediate(ids.next(), BinaryOp::Sub, T::from(20u8)))?;
        let mult3 = graph.insert(Operator::binary(ids.next(), BinaryOp::Mult))?;
        let mult4 = graph.insert(Operator::binary(ids.next(), BinaryOp::Mult))?;
        let add1 = graph.insert(Operator::immediate(ids.next(), BinaryOp::Add, T::from(5u8)))?;
        let mult5 = graph.insert(Operator::binary(ids.next(), BinaryOp::Mult))?;

        let wiring = [
            (input, mult1, Port::A),
            (input, reg[0], Port::A),
            (reg[0], reg[1], Port::A),
            (reg[1], reg[4], Port::A),
            (reg[4], reg[2], Port::A),
            (reg[2], reg[5], Port::A),
            (reg[5], reg[3], Port::A),
            (reg[0], mult2, Port::A),
            (mult1, mult2, Port::B),
            (mult2, sub1, Port::A),
            (reg[1], reg[6], Port::A),
            (reg[6], mult3, Port::A),
            (sub1, mult3, Port::B),
            (reg[2], mult4, Port::A),
            (mult3, mult4, Port::B),
            (mult4, add1, Port::A),
            (reg[3], mult5, Port::A),
            (add1, mult5, Port::B),
            (mult5, output, Port::A),
        ];
        for (src, dst, port) in wiring {
            graph.connect(src, dst, port)?;
        }
    }

    debug!(
        operators = graph.operator_count(),
        edges = graph.edge_count(),
        max_level = graph.max_level(),
        "Chebyshev graph built"
    );
    Ok(SampleGraph { graph, sinks })
}
