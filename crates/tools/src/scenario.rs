//! Scenario files
//!
//! A scenario selects a sample graph, its input sequences and where to
//! export the result:
//!
//! ```yaml
//! apiVersion: dataflow/v1
//! kind: Scenario
//! metadata:
//!   name: fir-4
//! graph:
//!   kind: fir
//!   coefficients: [1, 2, 3, 4]
//! inputs:
//!   - [1, 2, 3, 4, 5, 6, 7, 8, 9, 10]
//! maxTicks: 100
//! export:
//!   dot: fir.dot
//!   json: fir.json
//! ```

use std::path::{Path, PathBuf};

use dataflow_runtime::{Graph, RunSummary, Streams};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument};

use crate::export::{self, ExportError};
use crate::graphs::{self, BuildError, SampleGraph};

const API_VERSION: &str = "dataflow/v1";
const KIND: &str = "Scenario";

/// Errors that can occur when loading or running a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// Failed to read the scenario file.
    #[error("failed to read scenario file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse the scenario YAML.
    #[error("failed to parse scenario YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("invalid apiVersion: expected 'dataflow/v1', got '{0}'")]
    InvalidApiVersion(String),

    #[error("invalid kind: expected 'Scenario', got '{0}'")]
    InvalidKind(String),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("failed to build graph: {0}")]
    Build(#[from] BuildError),

    #[error(transparent)]
    Run(#[from] dataflow_runtime::Error),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Result type for scenario operations.
pub type ScenarioResult<T> = Result<T, ScenarioError>;

/// A sample graph run described in YAML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_kind")]
    pub kind: String,

    #[serde(default)]
    pub metadata: ScenarioMetadata,

    pub graph: GraphSpec,

    /// One input sequence per graph copy
    #[serde(default)]
    pub inputs: Vec<Vec<i64>>,

    /// Tick limit for the run, unbounded when absent
    #[serde(default)]
    pub max_ticks: Option<u64>,

    #[serde(default)]
    pub export: ExportTargets,
}

fn default_api_version() -> String {
    API_VERSION.to_string()
}

fn default_kind() -> String {
    KIND.to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioMetadata {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,
}

/// Which sample graph to build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GraphSpec {
    Fir { coefficients: Vec<i64> },
    Chebyshev,
}

/// Optional export paths, relative paths resolve against the working directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportTargets {
    #[serde(default)]
    pub dot: Option<PathBuf>,

    #[serde(default)]
    pub json: Option<PathBuf>,
}

/// Graph, outputs and counters of a finished scenario
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    pub graph: Graph<i64>,
    pub outputs: Vec<Vec<i64>>,
    pub summary: RunSummary,
}

impl Scenario {
    /// Create a scenario with the given name and graph, no inputs yet.
    pub fn new(name: impl Into<String>, graph: GraphSpec) -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_kind(),
            metadata: ScenarioMetadata {
                name: name.into(),
                description: None,
            },
            graph,
            inputs: Vec::new(),
            max_ticks: None,
            export: ExportTargets::default(),
        }
    }

    pub fn with_input(mut self, input: Vec<i64>) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }

    pub fn with_dot(mut self, path: impl Into<PathBuf>) -> Self {
        self.export.dot = Some(path.into());
        self
    }

    pub fn with_json(mut self, path: impl Into<PathBuf>) -> Self {
        self.export.json = Some(path.into());
        self
    }

    /// Load a scenario from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> ScenarioResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a scenario from a YAML string.
    pub fn from_yaml(yaml: &str) -> ScenarioResult<Self> {
        let scenario: Scenario = serde_yaml::from_str(yaml)?;
        scenario.validate_schema()?;
        Ok(scenario)
    }

    /// Serialize the scenario to YAML.
    pub fn to_yaml(&self) -> ScenarioResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    fn validate_schema(&self) -> ScenarioResult<()> {
        if self.api_version != API_VERSION {
            return Err(ScenarioError::InvalidApiVersion(self.api_version.clone()));
        }
        if self.kind != KIND {
            return Err(ScenarioError::InvalidKind(self.kind.clone()));
        }
        if self.metadata.name.is_empty() {
            return Err(ScenarioError::MissingField("metadata.name".to_string()));
        }
        if self.inputs.is_empty() {
            return Err(ScenarioError::MissingField("inputs".to_string()));
        }
        Ok(())
    }

    /// Build the selected graph over the scenario inputs
    pub fn build(&self, streams: &mut Streams<i64>) -> ScenarioResult<SampleGraph<i64>> {
        let built = match &self.graph {
            GraphSpec::Fir { coefficients } => graphs::fir(0, coefficients, &self.inputs, streams)?,
            GraphSpec::Chebyshev => graphs::chebyshev(0, &self.inputs, streams)?,
        };
        Ok(built)
    }

    /// Build, run and export the scenario
    #[instrument(skip_all, fields(scenario = %self.metadata.name))]
    pub fn run(&self) -> ScenarioResult<ScenarioOutcome> {
        let mut streams = Streams::new();
        let SampleGraph { mut graph, sinks } = self.build(&mut streams)?;

        let summary = match self.max_ticks {
            Some(limit) => graph.run_bounded(&mut streams, limit)?,
            None => graph.run(&mut streams),
        };
        let outputs = sinks.iter().map(|&sink| streams.take_output(sink)).collect();

        if let Some(path) = &self.export.dot {
            export::write_dot(&graph, path)?;
            info!(path = %path.display(), "DOT written");
        }
        if let Some(path) = &self.export.json {
            export::write_json(&graph, path)?;
            info!(path = %path.display(), "JSON written");
        }

        Ok(ScenarioOutcome {
            graph,
            outputs,
            summary,
        })
    }
}
