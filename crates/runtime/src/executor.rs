//! Tick executor
//!
//! Drives a graph sweep by sweep until every stream input is exhausted.
//!
//! A tick visits levels `0..=max_level` in order and evaluates every operator
//! of a level in ascending id order. After each level the executor counts the
//! stream inputs found exhausted during this tick; once all are exhausted the
//! tick stops early and the run ends.

use tracing::{info, instrument, trace};

use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::operator::Operator;
use crate::storage::Streams;
use crate::types::{Category, OperatorId, Word};

/// Counters reported by a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Ticks started, including the final partial one
    pub ticks: u64,
    /// Operator evaluations across all ticks
    pub evaluations: u64,
}

/// Operator ids grouped by level, ascending id within a level
struct Schedule {
    levels: Vec<Vec<OperatorId>>,
}

impl Schedule {
    fn build<T: Word>(graph: &Graph<T>) -> Self {
        // every operator gets a slot, even one leveled past the cached max
        let top = graph
            .operators()
            .values()
            .map(Operator::level)
            .fold(graph.max_level(), u32::max);
        let mut levels = vec![Vec::new(); top as usize + 1];
        for op in graph.operators().values() {
            if let Some(level) = levels.get_mut(op.level() as usize) {
                level.push(op.id());
            }
        }
        Self { levels }
    }
}

impl<T: Word> Graph<T> {
    /// Run until every stream input is exhausted
    ///
    /// Returns immediately when the graph has no stream inputs. Never returns
    /// if a stream input cannot be exhausted.
    #[instrument(skip_all, fields(graph = %self.id(), graph_name = self.name()))]
    pub fn run(&mut self, streams: &mut Streams<T>) -> RunSummary {
        let schedule = Schedule::build(self);
        let mut summary = RunSummary::default();
        let mut exhausted = 0;

        while exhausted != self.input_count() {
            exhausted = self.tick(&schedule, streams, &mut summary);
        }

        info!(ticks = summary.ticks, evaluations = summary.evaluations, "run complete");
        summary
    }

    /// Run with a tick limit
    ///
    /// Same loop as [`Graph::run`], but gives up with
    /// [`Error::TickLimitExceeded`] once `max_ticks` ticks have not drained
    /// the inputs.
    #[instrument(skip_all, fields(graph = %self.id(), graph_name = self.name(), max_ticks = max_ticks))]
    pub fn run_bounded(&mut self, streams: &mut Streams<T>, max_ticks: u64) -> Result<RunSummary> {
        let schedule = Schedule::build(self);
        let mut summary = RunSummary::default();
        let mut exhausted = 0;

        while exhausted != self.input_count() {
            if summary.ticks == max_ticks {
                return Err(Error::TickLimitExceeded {
                    limit: max_ticks,
                    exhausted,
                    inputs: self.input_count(),
                });
            }
            exhausted = self.tick(&schedule, streams, &mut summary);
        }

        info!(ticks = summary.ticks, evaluations = summary.evaluations, "run complete");
        Ok(summary)
    }

    /// One sweep over all levels, returns the stream inputs seen exhausted
    fn tick(&mut self, schedule: &Schedule, streams: &mut Streams<T>, summary: &mut RunSummary) -> usize {
        trace!(tick = summary.ticks, "tick start");
        summary.ticks += 1;
        let mut exhausted = 0;

        for (level, ids) in schedule.levels.iter().enumerate() {
            for &id in ids {
                let Some(op) = self.operator(id) else {
                    continue;
                };
                let operands = self.operands_of(op);
                let Some(op) = self.operator_mut(id) else {
                    continue;
                };
                op.evaluate(operands, streams);
                summary.evaluations += 1;

                if op.category() == Category::StreamIn && op.is_exhausted() {
                    exhausted += 1;
                }
            }

            if exhausted == self.input_count() {
                trace!(level, "inputs exhausted");
                break;
            }
        }

        exhausted
    }
}
