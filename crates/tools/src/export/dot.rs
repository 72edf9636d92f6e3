//! Graphviz DOT export

use std::fmt;
use std::fs;
use std::path::Path;

use dataflow_runtime::{Category, Graph, Word};
use tracing::debug;

use super::{ExportError, ExportResult};

/// DOT rendering of a graph, via [`fmt::Display`]
///
/// Operators are listed in id order. Stream endpoints are labelled
/// `in<id>` / `out<id>`. An immediate operator carries its constant as
/// `VALUE` and is fed by a synthetic `"<id>.<constant>"` node.
pub struct Dot<'a, T>(pub &'a Graph<T>);

impl<T: Word> fmt::Display for Dot<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let graph = self.0;
        writeln!(f, "digraph {} {{", graph.name())?;

        for (id, op) in graph.operators() {
            match (op.category(), op.constant()) {
                (Category::StreamIn, _) => writeln!(f, " {id} [ label = in{id} ]")?,
                (Category::StreamOut, _) => writeln!(f, " {id} [ label = out{id} ]")?,
                (Category::Immediate, Some(constant)) => {
                    writeln!(f, " {id} [ label = {}, VALUE = {constant} ]", op.label())?;
                    writeln!(f, " \"{id}.{constant}\" [ label = {constant} ]")?;
                }
                _ => writeln!(f, " {id} [ label = {} ]", op.label())?,
            }
        }

        for (id, op) in graph.operators() {
            if let Some(constant) = op.constant() {
                writeln!(f, " \"{id}.{constant}\" -> {id}")?;
            }
            for successor in op.successors() {
                writeln!(f, " {id} -> {successor}")?;
            }
        }

        writeln!(f, "}}")
    }
}

/// Render a graph as DOT text
pub fn to_dot<T: Word>(graph: &Graph<T>) -> String {
    Dot(graph).to_string()
}

/// Write the DOT rendering of a graph to `path`
pub fn write_dot<T: Word>(graph: &Graph<T>, path: impl AsRef<Path>) -> ExportResult<()> {
    let path = path.as_ref();
    fs::write(path, to_dot(graph)).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), graph = graph.name(), "wrote DOT export");
    Ok(())
}
