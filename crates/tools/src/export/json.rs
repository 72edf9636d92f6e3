//! Cytoscape-style JSON export

use std::fs;
use std::path::Path;

use dataflow_runtime::{Graph, Word};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ExportError, ExportResult};

/// Element list of a graph: all nodes, then all edges
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphRecord {
    pub nodes: Vec<Element<NodeData>>,
    pub edges: Vec<Element<EdgeData>>,
}

/// One cytoscape element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element<D> {
    pub data: D,
    pub group: String,
    pub classes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeData {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeData {
    pub source: String,
    pub target: String,
    pub id: String,
}

/// Build the element record of a graph
///
/// Nodes come in id order and are classed by their label. Edges follow each
/// operator's successors in id order; edge ids count up from one past the
/// highest operator id.
pub fn to_record<T: Word>(graph: &Graph<T>) -> GraphRecord {
    let nodes = graph
        .operators()
        .values()
        .map(|op| Element {
            data: NodeData {
                id: op.id().to_string(),
                kind: op.label().to_string(),
            },
            group: "nodes".to_string(),
            classes: op.label().to_string(),
        })
        .collect();

    let first_edge_id = graph.operators().keys().last().map_or(0, |id| id.0) + 1;
    let edges = graph
        .operators()
        .values()
        .flat_map(|op| op.successors().iter().map(move |dst| (op.id(), *dst)))
        .zip(first_edge_id..)
        .map(|((src, dst), edge_id)| Element {
            data: EdgeData {
                source: src.to_string(),
                target: dst.to_string(),
                id: edge_id.to_string(),
            },
            group: "edges".to_string(),
            classes: String::new(),
        })
        .collect();

    GraphRecord { nodes, edges }
}

/// Render the element record as pretty-printed JSON
pub fn to_json<T: Word>(graph: &Graph<T>) -> ExportResult<String> {
    Ok(serde_json::to_string_pretty(&to_record(graph))?)
}

/// Write the JSON element record of a graph to `path`
pub fn write_json<T: Word>(graph: &Graph<T>, path: impl AsRef<Path>) -> ExportResult<()> {
    let path = path.as_ref();
    let json = to_json(graph)?;
    fs::write(path, json).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), graph = graph.name(), "wrote JSON export");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataflow_runtime::{BinaryOp, Operator, OperatorId, Port, Streams};
    use serde_json::json;

    fn sample() -> Graph<i32> {
        let mut streams = Streams::new();
        let left = streams.add_input(vec![1]);
        let right = streams.add_input(vec![2]);
        let sink = streams.add_sink();

        let mut graph = Graph::new(0, "sum");
        graph
            .connect(Operator::stream_in(0, left), Operator::binary(5, BinaryOp::Add), Port::A)
            .unwrap();
        graph
            .connect(Operator::stream_in(1, right), OperatorId(5), Port::B)
            .unwrap();
        graph
            .connect(OperatorId(5), Operator::stream_out(2, sink), Port::A)
            .unwrap();
        graph
    }

    #[test]
    fn test_record_layout() {
        let value = serde_json::to_value(to_record(&sample())).unwrap();

        assert_eq!(
            value["nodes"][0],
            json!({
                "data": { "id": "0", "type": "input" },
                "group": "nodes",
                "classes": "input"
            })
        );
        assert_eq!(value["nodes"][3]["data"]["type"], "add");
        assert_eq!(value["nodes"].as_array().unwrap().len(), 4);
        assert_eq!(
            value["edges"][0],
            json!({
                "data": { "source": "0", "target": "5", "id": "6" },
                "group": "edges",
                "classes": ""
            })
        );
    }

    #[test]
    fn test_each_edge_written_once() {
        let record = to_record(&sample());
        let pairs: Vec<(&str, &str, &str)> = record
            .edges
            .iter()
            .map(|e| (e.data.source.as_str(), e.data.target.as_str(), e.data.id.as_str()))
            .collect();

        assert_eq!(pairs, vec![("0", "5", "6"), ("1", "5", "7"), ("5", "2", "8")]);
    }

    #[test]
    fn test_empty_graph() {
        let graph: Graph<i32> = Graph::new(0, "empty");
        let record = to_record(&graph);
        assert!(record.nodes.is_empty());
        assert!(record.edges.is_empty());
    }

    #[test]
    fn test_json_is_repeatable() {
        let graph = sample();
        assert_eq!(to_json(&graph).unwrap(), to_json(&graph).unwrap());
    }

    #[test]
    fn test_write_json_parses_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sum.json");
        let graph = sample();

        write_json(&graph, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let record: GraphRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(record, to_record(&graph));
    }
}
