//! Integration tests for end-to-end dataflow execution.
//!
//! Build sample graph → Run → Verify outputs, levels and exports.

use dataflow_runtime::{BinaryOp, Error, Graph, Operator, OperatorId, Port, Streams};
use dataflow_tests::TestHarness;
use dataflow_tools::export;
use dataflow_tools::scenario::Scenario;

fn t5(x: i64) -> i64 {
    16 * x.pow(5) - 20 * x.pow(3) + 5 * x
}

/// Four taps over 1..=10: one output per fully filled window.
#[test]
fn test_fir_textbook_convolution() {
    let input: Vec<i64> = (1..=10).collect();
    let mut harness = TestHarness::fir(&[1, 2, 3, 4], &[input]);

    harness.run();

    let outputs = harness.outputs();
    assert_eq!(outputs, vec![vec![20, 30, 40, 50, 60, 70, 80]]);
    assert_eq!(outputs[0].len(), 10 - 4 + 1);
}

#[test]
fn test_fir_matches_direct_sum() {
    let coefficients = [3, -1, 4, 1, -5];
    let input: Vec<i64> = vec![2, 7, 1, 8, 2, 8, 1, 8, 2, 8, 4, 5];
    let mut harness = TestHarness::fir(&coefficients, &[input.clone()]);

    harness.run();

    let taps = coefficients.len();
    let expected: Vec<i64> = (taps - 1..input.len())
        .map(|n| (0..taps).map(|k| coefficients[k] * input[n - k]).sum())
        .collect();
    assert_eq!(harness.outputs(), vec![expected]);
}

#[test]
fn test_chebyshev_t5() {
    let input: Vec<i64> = (1..=10).collect();
    let mut harness = TestHarness::chebyshev(&[input.clone()]);

    harness.run();

    let expected: Vec<i64> = input.into_iter().map(t5).collect();
    assert_eq!(harness.outputs(), vec![expected]);
}

#[test]
fn test_copies_run_side_by_side() {
    let inputs = vec![vec![1, 2, 3], vec![-2, 0, 2], vec![5, 5, 5]];
    let mut harness = TestHarness::chebyshev(&inputs);

    harness.run();

    let expected: Vec<Vec<i64>> = inputs
        .iter()
        .map(|lane| lane.iter().copied().map(t5).collect())
        .collect();
    assert_eq!(harness.outputs(), expected);
}

/// Every edge goes from a lower to a strictly higher level.
#[test]
fn test_level_invariant_on_sample_graphs() {
    let fir = TestHarness::fir(&[1, 2, 3, 4], &[vec![0; 10], vec![0; 10]]);
    assert!(fir.level_violations().is_empty(), "{:?}", fir.level_violations());
    assert_eq!(fir.graph().max_level(), fir.observed_max_level());

    let cheb = TestHarness::chebyshev(&[vec![0; 4]]);
    assert!(cheb.level_violations().is_empty(), "{:?}", cheb.level_violations());
    assert_eq!(cheb.graph().max_level(), cheb.observed_max_level());
}

/// Running does not move levels.
#[test]
fn test_run_keeps_levels() {
    let mut harness = TestHarness::fir(&[1, 1, 1], &[vec![1, 2, 3, 4, 5]]);
    let before: Vec<u32> = harness.graph().operators().values().map(|op| op.level()).collect();

    harness.run();

    let after: Vec<u32> = harness.graph().operators().values().map(|op| op.level()).collect();
    assert_eq!(before, after);
}

#[test]
fn test_max_level_tracks_every_connect() {
    let mut streams = Streams::new();
    let source = streams.add_input(vec![1]);
    let sink = streams.add_sink();
    let mut graph: Graph<i64> = Graph::new(7, "chain");

    graph
        .connect(Operator::stream_in(0, source), Operator::pass_a(1), Port::A)
        .unwrap();
    let mut previous = OperatorId(1);
    for id in 2..8 {
        graph
            .connect(previous, Operator::immediate(id, BinaryOp::Add, 1), Port::A)
            .unwrap();
        previous = OperatorId(id);
        let observed = graph.operators().values().map(|op| op.level()).max().unwrap();
        assert_eq!(graph.max_level(), observed);
    }
    graph
        .connect(previous, Operator::stream_out(8, sink), Port::A)
        .unwrap();

    assert_eq!(graph.max_level(), 8);
    graph.run(&mut streams);
    assert_eq!(streams.output(sink), Some(&[7][..]));
}

#[test]
fn test_graph_without_inputs_returns_immediately() {
    let mut graph: Graph<i64> = Graph::new(0, "constants");
    graph
        .connect(
            Operator::pass_immediate(0, 3),
            Operator::immediate(1, BinaryOp::Mult, 2),
            Port::A,
        )
        .unwrap();

    let summary = graph.run(&mut Streams::new());

    assert_eq!(summary.ticks, 0);
    assert_eq!(graph.operator(OperatorId(1)).unwrap().value(), 0);
}

/// A removed operator reads as absent: its consumer keeps its last value.
#[test]
fn test_removed_operator_leaves_stale_consumer() {
    let mut harness = TestHarness::fir(&[2], &[vec![1, 2, 3]]);
    // ids: 0 tap input, 1 output, 2 multiplier, 3 adder
    let removed = harness.graph_mut().remove(OperatorId(2)).unwrap();
    assert_eq!(removed.graph_id(), None);

    harness.run();

    assert_eq!(harness.graph().operator(OperatorId(3)).unwrap().value(), 0);
    assert_eq!(harness.outputs(), vec![vec![0, 0, 0]]);
}

/// An operator moved to another graph arrives unwired and gets scheduled there.
#[test]
fn test_moved_input_runs_to_completion() {
    let mut harness = TestHarness::fir(&[1, 2], &[vec![4, 5, 6]]);
    let input = harness.graph_mut().remove(OperatorId(0)).unwrap();
    assert!(input.successors().is_empty());
    assert_eq!(input.level(), 0);

    let mut streams = Streams::new();
    streams.add_input(vec![7, 8]);
    let mut graph: Graph<i64> = Graph::new(9, "moved");
    graph.insert(input).unwrap();

    let summary = graph.run_bounded(&mut streams, 10).unwrap();
    assert_eq!(summary.ticks, 3);
    assert_eq!(graph.operator(OperatorId(0)).unwrap().value(), 8);
}

#[test]
fn test_operator_cannot_join_two_graphs() {
    let harness = TestHarness::chebyshev(&[vec![1]]);
    let owned = harness.graph().operator(OperatorId(2)).unwrap().clone();

    let mut other: Graph<i64> = Graph::new(1, "other");
    let err = other.insert(owned).unwrap_err();

    assert_eq!(
        err,
        Error::AlreadyOwned {
            operator: OperatorId(2),
            owner: harness.graph().id(),
        }
    );
    assert_eq!(other.operator_count(), 0);
}

/// Exporting reads only: repeated exports match, before and after a run.
#[test]
fn test_exports_are_pure() {
    let mut harness = TestHarness::fir(&[1, 2], &[vec![1, 2, 3]]);

    let dot = export::to_dot(harness.graph());
    let json = export::to_json(harness.graph()).unwrap();
    assert_eq!(export::to_dot(harness.graph()), dot);
    assert_eq!(export::to_json(harness.graph()).unwrap(), json);

    harness.run();
    assert_eq!(export::to_dot(harness.graph()), dot);
    assert_eq!(export::to_json(harness.graph()).unwrap(), json);
}

#[test]
fn test_json_export_counts() {
    let harness = TestHarness::chebyshev(&[vec![1]]);
    let value: serde_json::Value =
        serde_json::from_str(&export::to_json(harness.graph()).unwrap()).unwrap();

    let nodes = value["nodes"].as_array().unwrap();
    let edges = value["edges"].as_array().unwrap();
    assert_eq!(nodes.len(), harness.graph().operator_count());
    assert_eq!(edges.len(), harness.graph().edge_count());
    // 16 operators with ids 0..=15, so edge ids start at 16
    assert_eq!(edges[0]["data"]["id"], "16");
    assert_eq!(edges.last().unwrap()["data"]["id"], (16 + edges.len() - 1).to_string());
}

#[test]
fn test_dot_export_lists_constants() {
    let harness = TestHarness::chebyshev(&[vec![1]]);
    let dot = export::to_dot(harness.graph());

    assert!(dot.starts_with("digraph chebyshev {\n"));
    assert!(dot.contains(" 9 [ label = multi, VALUE = 16 ]\n"));
    assert!(dot.contains(" \"9.16\" -> 9\n"));
    assert!(dot.contains(" 11 [ label = subi, VALUE = 20 ]\n"));
    assert!(dot.contains(" 0 [ label = in0 ]\n"));
    assert!(dot.contains(" 1 [ label = out1 ]\n"));
    assert!(dot.ends_with("}\n"));
}

#[test]
fn test_scenario_file_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let dot = dir.path().join("fir.dot");
    let json = dir.path().join("fir.json");
    let yaml = format!(
        r#"
apiVersion: dataflow/v1
kind: Scenario
metadata:
  name: fir-e2e
graph:
  kind: fir
  coefficients: [1, 2, 3, 4]
inputs:
  - [1, 2, 3, 4, 5, 6, 7, 8, 9, 10]
  - [10, 9, 8, 7, 6, 5, 4, 3, 2, 1]
maxTicks: 20
export:
  dot: {}
  json: {}
"#,
        dot.display(),
        json.display()
    );
    let path = dir.path().join("fir.yaml");
    std::fs::write(&path, yaml).unwrap();

    let scenario = Scenario::load(&path).unwrap();
    let outcome = scenario.run().unwrap();

    assert_eq!(
        outcome.outputs,
        vec![
            vec![20, 30, 40, 50, 60, 70, 80],
            vec![90, 80, 70, 60, 50, 40, 30],
        ]
    );
    assert_eq!(outcome.summary.ticks, 8);
    assert_eq!(std::fs::read_to_string(&dot).unwrap(), export::to_dot(&outcome.graph));

    let record: export::GraphRecord =
        serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(record, export::to_record(&outcome.graph));
}

#[test]
fn test_shipped_scenarios_load() {
    let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../scenarios");

    for (file, lanes) in [("fir.yaml", 1), ("chebyshev.yaml", 2)] {
        let mut scenario = Scenario::load(root.join(file)).unwrap();
        assert_eq!(scenario.inputs.len(), lanes, "{file}");

        scenario.export = Default::default();
        let outcome = scenario.run().unwrap();
        assert_eq!(outcome.outputs.len(), lanes, "{file}");
        assert!(outcome.outputs.iter().all(|lane| !lane.is_empty()), "{file}");
    }
}
