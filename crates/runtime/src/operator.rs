//! Operators
//!
//! A closed set of operator kinds, each evaluated by a single `match`.
//!
//! # Evaluation policy
//!
//! An operator reads the operand values it needs. If any required operand is
//! absent (not wired, or wired to an operator that is no longer in the graph)
//! evaluation is a no-op and the operator keeps the value it computed last.
//! Evaluation never fails.

use tracing::warn;

use crate::storage::{SinkId, StreamId, Streams};
use crate::types::{Category, GraphId, Opcode, OperatorId, Port, Word};

/// Two-operand operations, available in binary and immediate form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mult,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    /// Equal, 0/1
    Beq,
    /// Not equal, 0/1
    Bne,
    /// Less than, 0/1
    Slt,
    /// Greater than, 0/1
    Sgt,
    /// Smaller operand value
    Min,
    /// Larger operand value
    Max,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 14] = [
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mult,
        BinaryOp::And,
        BinaryOp::Or,
        BinaryOp::Xor,
        BinaryOp::Shl,
        BinaryOp::Shr,
        BinaryOp::Beq,
        BinaryOp::Bne,
        BinaryOp::Slt,
        BinaryOp::Sgt,
        BinaryOp::Min,
        BinaryOp::Max,
    ];

    /// Apply the operation. Ties in min/max resolve to `b`.
    pub fn apply<T: Word>(self, a: T, b: T) -> T {
        match self {
            BinaryOp::Add => a.add(b),
            BinaryOp::Sub => a.sub(b),
            BinaryOp::Mult => a.mul(b),
            BinaryOp::And => a.and(b),
            BinaryOp::Or => a.or(b),
            BinaryOp::Xor => a.xor(b),
            BinaryOp::Shl => a.shl(b),
            BinaryOp::Shr => a.shr(b),
            BinaryOp::Beq => T::from_bool(a == b),
            BinaryOp::Bne => T::from_bool(a != b),
            BinaryOp::Slt => T::from_bool(a < b),
            BinaryOp::Sgt => T::from_bool(a > b),
            BinaryOp::Min => {
                if a < b {
                    a
                } else {
                    b
                }
            }
            BinaryOp::Max => {
                if a > b {
                    a
                } else {
                    b
                }
            }
        }
    }

    pub fn opcode(self) -> Opcode {
        match self {
            BinaryOp::Add => Opcode::Add,
            BinaryOp::Sub => Opcode::Sub,
            BinaryOp::Mult => Opcode::Mult,
            BinaryOp::And => Opcode::And,
            BinaryOp::Or => Opcode::Or,
            BinaryOp::Xor => Opcode::Xor,
            BinaryOp::Shl => Opcode::Shl,
            BinaryOp::Shr => Opcode::Shr,
            BinaryOp::Beq => Opcode::Beq,
            BinaryOp::Bne => Opcode::Bne,
            BinaryOp::Slt => Opcode::Slt,
            BinaryOp::Sgt => Opcode::Sgt,
            BinaryOp::Min => Opcode::Min,
            BinaryOp::Max => Opcode::Max,
        }
    }

    /// Mnemonic of the binary form
    pub fn mnemonic(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mult => "mult",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Xor => "xor",
            BinaryOp::Shl => "shl",
            BinaryOp::Shr => "shr",
            BinaryOp::Beq => "beq",
            BinaryOp::Bne => "bne",
            BinaryOp::Slt => "slt",
            BinaryOp::Sgt => "sgt",
            BinaryOp::Min => "min",
            BinaryOp::Max => "max",
        }
    }

    /// Mnemonic of the immediate form
    pub fn immediate_mnemonic(self) -> &'static str {
        match self {
            BinaryOp::Add => "addi",
            BinaryOp::Sub => "subi",
            BinaryOp::Mult => "multi",
            BinaryOp::And => "andi",
            BinaryOp::Or => "ori",
            BinaryOp::Xor => "xori",
            BinaryOp::Shl => "shli",
            BinaryOp::Shr => "shri",
            BinaryOp::Beq => "beqi",
            BinaryOp::Bne => "bnei",
            BinaryOp::Slt => "slti",
            BinaryOp::Sgt => "sgti",
            BinaryOp::Min => "mini",
            BinaryOp::Max => "maxi",
        }
    }
}

/// Single-operand operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Bitwise complement of A
    Not,
    /// Absolute value of A, or of B when only B is wired
    Abs,
}

impl UnaryOp {
    pub fn opcode(self) -> Opcode {
        match self {
            UnaryOp::Not => Opcode::Not,
            UnaryOp::Abs => Opcode::Abs,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            UnaryOp::Not => "not",
            UnaryOp::Abs => "abs",
        }
    }
}

/// The kind of work an operator performs
#[derive(Debug, Clone, PartialEq)]
pub enum OperatorKind<T> {
    /// `op(A, B)`
    Binary(BinaryOp),
    /// `op(A, constant)`
    Immediate { op: BinaryOp, constant: T },
    Unary(UnaryOp),
    /// Selector truthy ? A : B
    Mux,
    /// Selector truthy ? A : constant
    MuxImmediate { constant: T },
    /// Pipeline register copying A
    PassA,
    /// Pipeline register copying B
    PassB,
    /// Always yields the constant
    PassImmediate { constant: T },
    /// Publishes the next element of an input sequence per evaluation
    StreamIn { source: StreamId, cursor: usize },
    /// Appends A to an output sequence per evaluation
    StreamOut { sink: SinkId },
}

impl<T: Word> OperatorKind<T> {
    pub fn category(&self) -> Category {
        match self {
            OperatorKind::Binary(_)
            | OperatorKind::Unary(_)
            | OperatorKind::Mux
            | OperatorKind::PassA
            | OperatorKind::PassB => Category::Basic,
            OperatorKind::Immediate { .. }
            | OperatorKind::MuxImmediate { .. }
            | OperatorKind::PassImmediate { .. } => Category::Immediate,
            OperatorKind::StreamIn { .. } => Category::StreamIn,
            OperatorKind::StreamOut { .. } => Category::StreamOut,
        }
    }

    pub fn opcode(&self) -> Opcode {
        match self {
            OperatorKind::Binary(op) | OperatorKind::Immediate { op, .. } => op.opcode(),
            OperatorKind::Unary(op) => op.opcode(),
            OperatorKind::Mux | OperatorKind::MuxImmediate { .. } => Opcode::Mux,
            OperatorKind::PassB | OperatorKind::PassImmediate { .. } => Opcode::PassB,
            OperatorKind::PassA | OperatorKind::StreamIn { .. } | OperatorKind::StreamOut { .. } => {
                Opcode::PassA
            }
        }
    }

    /// Display label used by exporters
    pub fn label(&self) -> &'static str {
        match self {
            OperatorKind::Binary(op) => op.mnemonic(),
            OperatorKind::Immediate { op, .. } => op.immediate_mnemonic(),
            OperatorKind::Unary(op) => op.mnemonic(),
            OperatorKind::Mux => "mux",
            OperatorKind::MuxImmediate { .. } => "muxi",
            OperatorKind::PassA | OperatorKind::PassB | OperatorKind::PassImmediate { .. } => "reg",
            OperatorKind::StreamIn { .. } => "input",
            OperatorKind::StreamOut { .. } => "output",
        }
    }

    pub fn constant(&self) -> Option<T> {
        match self {
            OperatorKind::Immediate { constant, .. }
            | OperatorKind::MuxImmediate { constant }
            | OperatorKind::PassImmediate { constant } => Some(*constant),
            _ => None,
        }
    }
}

/// Operand values resolved by the graph for one evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Operands<T> {
    pub a: Option<T>,
    pub b: Option<T>,
    pub selector: Option<T>,
}

impl<T> Default for Operands<T> {
    fn default() -> Self {
        Self {
            a: None,
            b: None,
            selector: None,
        }
    }
}

impl<T> Operands<T> {
    pub fn new(a: Option<T>, b: Option<T>, selector: Option<T>) -> Self {
        Self { a, b, selector }
    }
}

/// A single node of the dataflow graph
#[derive(Debug, Clone)]
pub struct Operator<T> {
    id: OperatorId,
    kind: OperatorKind<T>,
    pub(crate) operand_a: Option<OperatorId>,
    pub(crate) operand_b: Option<OperatorId>,
    pub(crate) selector: Option<OperatorId>,
    pub(crate) successors: Vec<OperatorId>,
    pub(crate) level: u32,
    value: T,
    exhausted: bool,
    pub(crate) owner: Option<GraphId>,
}

impl<T: Word> Operator<T> {
    /// Create a detached, unwired operator
    pub fn new(id: u32, kind: OperatorKind<T>) -> Self {
        Self {
            id: OperatorId(id),
            kind,
            operand_a: None,
            operand_b: None,
            selector: None,
            successors: Vec::new(),
            level: 0,
            value: T::default(),
            exhausted: false,
            owner: None,
        }
    }

    pub fn binary(id: u32, op: BinaryOp) -> Self {
        Self::new(id, OperatorKind::Binary(op))
    }

    pub fn immediate(id: u32, op: BinaryOp, constant: T) -> Self {
        Self::new(id, OperatorKind::Immediate { op, constant })
    }

    pub fn unary(id: u32, op: UnaryOp) -> Self {
        Self::new(id, OperatorKind::Unary(op))
    }

    pub fn mux(id: u32) -> Self {
        Self::new(id, OperatorKind::Mux)
    }

    pub fn mux_immediate(id: u32, constant: T) -> Self {
        Self::new(id, OperatorKind::MuxImmediate { constant })
    }

    pub fn pass_a(id: u32) -> Self {
        Self::new(id, OperatorKind::PassA)
    }

    pub fn pass_b(id: u32) -> Self {
        Self::new(id, OperatorKind::PassB)
    }

    pub fn pass_immediate(id: u32, constant: T) -> Self {
        Self::new(id, OperatorKind::PassImmediate { constant })
    }

    pub fn stream_in(id: u32, source: StreamId) -> Self {
        Self::new(id, OperatorKind::StreamIn { source, cursor: 0 })
    }

    pub fn stream_out(id: u32, sink: SinkId) -> Self {
        Self::new(id, OperatorKind::StreamOut { sink })
    }

    pub fn id(&self) -> OperatorId {
        self.id
    }

    pub fn kind(&self) -> &OperatorKind<T> {
        &self.kind
    }

    pub fn category(&self) -> Category {
        self.kind.category()
    }

    pub fn opcode(&self) -> Opcode {
        self.kind.opcode()
    }

    pub fn label(&self) -> &'static str {
        self.kind.label()
    }

    pub fn constant(&self) -> Option<T> {
        self.kind.constant()
    }

    /// The operator wired into `port`, if any
    pub fn operand(&self, port: Port) -> Option<OperatorId> {
        match port {
            Port::A => self.operand_a,
            Port::B => self.operand_b,
            Port::Selector => self.selector,
        }
    }

    pub(crate) fn set_operand(&mut self, port: Port, src: OperatorId) {
        let slot = match port {
            Port::A => &mut self.operand_a,
            Port::B => &mut self.operand_b,
            Port::Selector => &mut self.selector,
        };
        *slot = Some(src);
    }

    /// Forget the wiring, level and owner of the graph it leaves
    ///
    /// Operand and successor ids are scoped to a graph and would alias
    /// unrelated operators elsewhere.
    pub(crate) fn release(&mut self) {
        self.operand_a = None;
        self.operand_b = None;
        self.selector = None;
        self.successors.clear();
        self.level = 0;
        self.owner = None;
    }

    /// Consumers of this operator's output, in connection order
    pub fn successors(&self) -> &[OperatorId] {
        &self.successors
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Last computed output
    pub fn value(&self) -> T {
        self.value
    }

    /// Whether a stream input has consumed its whole sequence
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Graph currently owning this operator
    pub fn graph_id(&self) -> Option<GraphId> {
        self.owner
    }

    /// Evaluate one step
    ///
    /// Missing required operands leave the value unchanged. Stream endpoints
    /// read from and append to `streams`.
    pub fn evaluate(&mut self, operands: Operands<T>, streams: &mut Streams<T>) {
        let Operands { a, b, selector } = operands;
        let next = match &mut self.kind {
            OperatorKind::Binary(op) => match (a, b) {
                (Some(a), Some(b)) => Some(op.apply(a, b)),
                _ => None,
            },
            OperatorKind::Immediate { op, constant } => a.map(|a| op.apply(a, *constant)),
            OperatorKind::Unary(UnaryOp::Not) => a.map(Word::not),
            OperatorKind::Unary(UnaryOp::Abs) => a.or(b).map(Word::abs),
            OperatorKind::Mux => match (a, b, selector) {
                (Some(a), Some(b), Some(sel)) => Some(if sel.is_truthy() { a } else { b }),
                _ => None,
            },
            OperatorKind::MuxImmediate { constant } => match (a, selector) {
                (Some(a), Some(sel)) => Some(if sel.is_truthy() { a } else { *constant }),
                _ => None,
            },
            OperatorKind::PassA => a,
            OperatorKind::PassB => b,
            OperatorKind::PassImmediate { constant } => Some(*constant),
            OperatorKind::StreamIn { source, cursor } => {
                if self.exhausted {
                    None
                } else {
                    match streams.input(*source) {
                        Some(data) if *cursor < data.len() => {
                            let v = data[*cursor];
                            *cursor += 1;
                            Some(v)
                        }
                        Some(_) => {
                            self.exhausted = true;
                            None
                        }
                        None => {
                            warn!(operator = %self.id, source = %source, "unknown input stream");
                            self.exhausted = true;
                            None
                        }
                    }
                }
            }
            OperatorKind::StreamOut { sink } => {
                if let Some(v) = a
                    && !streams.push(*sink, v)
                {
                    warn!(operator = %self.id, sink = %sink, "unknown output stream");
                }
                a
            }
        };

        if let Some(v) = next {
            self.value = v;
        }
    }
}
