//! Stream storage
//!
//! Input and output sequences for stream endpoints. The caller owns a
//! [`Streams`] set and lends it to [`Graph::run`](crate::Graph::run); stream
//! operators only hold handles into it.

use std::fmt;

/// Handle to an input sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamId(pub usize);

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "in#{}", self.0)
    }
}

/// Handle to an output sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SinkId(pub usize);

impl fmt::Display for SinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "out#{}", self.0)
    }
}

/// Input and output sequences used by a graph run
#[derive(Debug, Clone)]
pub struct Streams<T> {
    inputs: Vec<Vec<T>>,
    outputs: Vec<Vec<T>>,
}

impl<T> Default for Streams<T> {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }
}

impl<T> Streams<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an input sequence, returns its handle
    pub fn add_input(&mut self, data: impl Into<Vec<T>>) -> StreamId {
        let id = StreamId(self.inputs.len());
        self.inputs.push(data.into());
        id
    }

    /// Register an empty output sequence, returns its handle
    pub fn add_sink(&mut self) -> SinkId {
        let id = SinkId(self.outputs.len());
        self.outputs.push(Vec::new());
        id
    }

    pub fn input(&self, id: StreamId) -> Option<&[T]> {
        self.inputs.get(id.0).map(Vec::as_slice)
    }

    pub fn output(&self, id: SinkId) -> Option<&[T]> {
        self.outputs.get(id.0).map(Vec::as_slice)
    }

    /// Take the collected values of an output, leaving it empty
    pub fn take_output(&mut self, id: SinkId) -> Vec<T> {
        self.outputs
            .get_mut(id.0)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    /// Append a value to an output. Returns false if the sink is unknown.
    pub fn push(&mut self, id: SinkId, value: T) -> bool {
        match self.outputs.get_mut(id.0) {
            Some(out) => {
                out.push(value);
                true
            }
            None => false,
        }
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn sink_count(&self) -> usize {
        self.outputs.len()
    }
}
