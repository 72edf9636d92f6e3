//! Dataflow Tools
//!
//! Exporters, sample graph builders and scenario files for the dataflow
//! runtime, plus the `dataflow-run` binary.

pub mod export;
pub mod graphs;
pub mod scenario;

use tracing_subscriber::{EnvFilter, fmt};

/// Initialize logging with a default filter.
///
/// Use `RUST_LOG` environment variable to override the default filter.
/// Default is `info` with `debug` for the dataflow crates.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,dataflow_tools=debug,dataflow_runtime=debug"));

    fmt().with_env_filter(filter).with_target(false).init();
}
