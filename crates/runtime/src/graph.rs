//! Dataflow graph
//!
//! The graph owns its operators in an arena keyed by [`OperatorId`]. Operand
//! and successor fields of an operator are ids into that arena, never owning
//! references. Every [`Graph::connect`] re-runs level assignment over the
//! whole graph.

use std::collections::BTreeMap;

use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::level::{Adjacency, assign_levels};
use crate::operator::{Operands, Operator};
use crate::types::{Category, GraphId, OperatorId, Port, Word};

/// One side of a connection
///
/// Either an operator already registered in the graph, or a detached
/// operator to register.
#[derive(Debug, Clone)]
pub enum Endpoint<T> {
    Registered(OperatorId),
    Detached(Operator<T>),
}

impl<T> From<OperatorId> for Endpoint<T> {
    fn from(id: OperatorId) -> Self {
        Endpoint::Registered(id)
    }
}

impl<T> From<Operator<T>> for Endpoint<T> {
    fn from(op: Operator<T>) -> Self {
        Endpoint::Detached(op)
    }
}

/// A graph of operators connected by ports
#[derive(Debug, Clone)]
pub struct Graph<T> {
    id: GraphId,
    name: String,
    operators: BTreeMap<OperatorId, Operator<T>>,
    adjacency: Adjacency,
    /// Cached counters, only touched by `register` and `remove`
    input_count: usize,
    output_count: usize,
    max_level: u32,
}

impl<T: Word> Graph<T> {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id: GraphId(id),
            name: name.into(),
            operators: BTreeMap::new(),
            adjacency: Adjacency::new(),
            input_count: 0,
            output_count: 0,
            max_level: 0,
        }
    }

    pub fn id(&self) -> GraphId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register an operator without wiring it
    ///
    /// Registering an id that is already present is a no-op and the new
    /// operator is dropped. Operators owned by another graph are rejected.
    /// The operator enters unwired at level 0.
    pub fn insert(&mut self, op: Operator<T>) -> Result<OperatorId> {
        let id = self.register(op)?;
        self.update_levels();
        Ok(id)
    }

    /// Connect the output of `src` to `port` of `dst`
    ///
    /// Detached endpoints are registered first. The `dst` slot for `port` is
    /// overwritten. Levels are recomputed for the whole graph.
    pub fn connect(
        &mut self,
        src: impl Into<Endpoint<T>>,
        dst: impl Into<Endpoint<T>>,
        port: Port,
    ) -> Result<()> {
        let (src, dst) = (src.into(), dst.into());
        for endpoint in [&src, &dst] {
            match endpoint {
                Endpoint::Registered(id) if !self.operators.contains_key(id) => {
                    return Err(Error::OperatorNotFound(*id));
                }
                Endpoint::Detached(op) => self.check_owner(op)?,
                Endpoint::Registered(_) => {}
            }
        }

        let src = self.resolve(src)?;
        let dst = self.resolve(dst)?;

        self.adjacency.entry(src).or_default().push(dst);
        if let Some(op) = self.operators.get_mut(&src) {
            op.successors.push(dst);
        }
        if let Some(op) = self.operators.get_mut(&dst) {
            op.set_operand(port, src);
        }
        trace!(graph = %self.id, %src, %dst, %port, "connected");

        self.update_levels();
        Ok(())
    }

    /// Detach an operator and hand it back
    ///
    /// The returned operator is unwired, unowned and back at level 0; its
    /// value and stream cursor are kept. Adjacency entries and operand ids of
    /// other operators that reference it are left in place; they read as
    /// absent from then on.
    pub fn remove(&mut self, id: OperatorId) -> Option<Operator<T>> {
        let mut op = self.operators.remove(&id)?;
        match op.category() {
            Category::StreamIn => self.input_count -= 1,
            Category::StreamOut => self.output_count -= 1,
            _ => {}
        }
        op.release();
        debug!(graph = %self.id, operator = %id, "operator removed");
        self.debug_check_counters();
        self.update_levels();
        Some(op)
    }

    /// Look up an operator by id
    pub fn operator(&self, id: OperatorId) -> Option<&Operator<T>> {
        self.operators.get(&id)
    }

    /// All operators in ascending id order
    pub fn operators(&self) -> &BTreeMap<OperatorId, Operator<T>> {
        &self.operators
    }

    /// Producer -> consumers, in connection order
    pub fn adjacency(&self) -> &Adjacency {
        &self.adjacency
    }

    /// Consumers of `id`, empty if it has none or is unknown
    pub fn successors(&self, id: OperatorId) -> &[OperatorId] {
        self.adjacency.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of stream inputs
    pub fn input_count(&self) -> usize {
        self.input_count
    }

    /// Number of stream outputs
    pub fn output_count(&self) -> usize {
        self.output_count
    }

    pub fn operator_count(&self) -> usize {
        self.operators.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    /// Operand values currently visible to `op`
    pub(crate) fn operands_of(&self, op: &Operator<T>) -> Operands<T> {
        let value = |slot: Option<OperatorId>| {
            slot.and_then(|id| self.operators.get(&id))
                .map(Operator::value)
        };
        Operands::new(
            value(op.operand_a),
            value(op.operand_b),
            value(op.selector),
        )
    }

    pub(crate) fn operator_mut(&mut self, id: OperatorId) -> Option<&mut Operator<T>> {
        self.operators.get_mut(&id)
    }

    fn check_owner(&self, op: &Operator<T>) -> Result<()> {
        match op.owner {
            Some(owner) if owner != self.id => {
                warn!(graph = %self.id, operator = %op.id(), %owner, "operator owned elsewhere");
                Err(Error::AlreadyOwned {
                    operator: op.id(),
                    owner,
                })
            }
            _ => Ok(()),
        }
    }

    fn resolve(&mut self, endpoint: Endpoint<T>) -> Result<OperatorId> {
        match endpoint {
            Endpoint::Registered(id) => Ok(id),
            Endpoint::Detached(op) => self.register(op),
        }
    }

    fn register(&mut self, mut op: Operator<T>) -> Result<OperatorId> {
        self.check_owner(&op)?;
        let id = op.id();
        if self.operators.contains_key(&id) {
            debug!(graph = %self.id, operator = %id, "duplicate id ignored");
            return Ok(id);
        }

        match op.category() {
            Category::StreamIn => self.input_count += 1,
            Category::StreamOut => self.output_count += 1,
            _ => {}
        }
        op.release();
        op.owner = Some(self.id);
        debug!(graph = %self.id, operator = %id, kind = op.label(), "operator registered");
        self.operators.insert(id, op);
        self.debug_check_counters();
        Ok(id)
    }

    fn update_levels(&mut self) {
        self.max_level = assign_levels(&mut self.operators, &self.adjacency);
        trace!(graph = %self.id, max_level = self.max_level, "levels updated");
    }

    fn debug_check_counters(&self) {
        debug_assert_eq!(
            self.input_count,
            self.count_category(Category::StreamIn),
            "stream input counter out of sync"
        );
        debug_assert_eq!(
            self.output_count,
            self.count_category(Category::StreamOut),
            "stream output counter out of sync"
        );
    }

    fn count_category(&self, category: Category) -> usize {
        self.operators
            .values()
            .filter(|op| op.category() == category)
            .count()
    }
}
