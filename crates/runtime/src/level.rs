//! Level assignment
//!
//! Every operator gets a level so that it is evaluated after its data
//! predecessors within a tick.
//!
//! # Algorithm
//!
//! 1. From every stream input (ascending id), walk the adjacency breadth
//!    first. There is no visited set: a node reachable along several paths is
//!    visited once per path. For each edge `parent -> child` with
//!    `level[parent] >= level[child]`, the child moves to `level[parent] + 1`.
//!    Levels are never lowered here, so repeated walks converge.
//! 2. Each stream input moves to one below its highest successor (0 at least).
//! 3. The max level is the maximum over all operators.
//!
//! Levels carry over between calls; only step 2 ever lowers a level.
//! A cycle reachable from a stream input keeps step 1 from terminating.

use std::collections::{BTreeMap, VecDeque};

use indexmap::IndexMap;
use tracing::trace;

use crate::operator::Operator;
use crate::types::{Category, OperatorId, Word};

/// Adjacency: producer -> consumers in connection order
pub type Adjacency = IndexMap<OperatorId, Vec<OperatorId>>;

/// Assign levels in place, returns the max level
///
/// Ids in `adjacency` that are not in `operators` are skipped.
pub fn assign_levels<T: Word>(
    operators: &mut BTreeMap<OperatorId, Operator<T>>,
    adjacency: &Adjacency,
) -> u32 {
    let inputs: Vec<OperatorId> = operators
        .values()
        .filter(|op| op.category() == Category::StreamIn)
        .map(Operator::id)
        .collect();

    let mut queue = VecDeque::new();
    for &input in &inputs {
        queue.push_back(input);
        let mut visits = 0usize;
        while let Some(parent) = queue.pop_front() {
            let Some(parent_level) = operators.get(&parent).map(Operator::level) else {
                continue;
            };
            let Some(children) = adjacency.get(&parent) else {
                continue;
            };
            for &child in children {
                let Some(child_op) = operators.get_mut(&child) else {
                    continue;
                };
                if parent_level >= child_op.level {
                    child_op.level = parent_level + 1;
                }
                queue.push_back(child);
                visits += 1;
            }
        }
        trace!(input = %input, visits, "stream input walked");
    }

    for input in &inputs {
        let highest = adjacency
            .get(input)
            .into_iter()
            .flatten()
            .filter_map(|child| operators.get(child))
            .map(Operator::level)
            .max()
            .unwrap_or(0);
        if let Some(op) = operators.get_mut(input) {
            op.level = highest.saturating_sub(1);
        }
    }

    operators.values().map(Operator::level).max().unwrap_or(0)
}
