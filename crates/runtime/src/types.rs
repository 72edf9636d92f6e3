//! Core runtime types
//!
//! Identifiers, ports, operator categories and the element type that values
//! flowing through a graph must implement.

use std::fmt;

/// Unique identifier for an operator within its graph
///
/// Assigned by the caller when the operator is created. Stable for the
/// lifetime of the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperatorId(pub u32);

impl fmt::Display for OperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for OperatorId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Unique identifier for a graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraphId(pub u32);

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for GraphId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Input slot an edge connects into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Port {
    /// First data operand
    A,
    /// Second data operand
    B,
    /// Boolean selector of a mux (the "branch" input)
    Selector,
}

impl Port {
    /// All ports in slot order
    pub const ALL: [Port; 3] = [Port::A, Port::B, Port::Selector];
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Port::A => write!(f, "a"),
            Port::B => write!(f, "b"),
            Port::Selector => write!(f, "branch"),
        }
    }
}

/// Operator category
///
/// Governs whether a node draws a constant operand and whether it takes
/// part in the stream exhaustion protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Basic,
    Immediate,
    StreamIn,
    StreamOut,
}

/// Numeric operation codes
///
/// Stream endpoints report [`Opcode::PassA`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Opcode {
    PassA = 0,
    PassB = 1,
    Min = 2,
    Max = 3,
    Beq = 4,
    Bne = 5,
    Slt = 6,
    Sgt = 7,
    Add = 8,
    Sub = 9,
    Mult = 10,
    Xor = 11,
    And = 12,
    Or = 13,
    Not = 14,
    Shl = 15,
    Shr = 16,
    Mux = 17,
    Abs = 18,
}

impl Opcode {
    /// Numeric code of this opcode
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Element type carried by a graph
///
/// Implemented for the primitive integers. Arithmetic wraps on overflow and
/// shift amounts are taken modulo the bit width, so evaluation never panics.
pub trait Word:
    Copy + Default + PartialEq + PartialOrd + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    fn add(self, rhs: Self) -> Self;
    fn sub(self, rhs: Self) -> Self;
    fn mul(self, rhs: Self) -> Self;
    fn and(self, rhs: Self) -> Self;
    fn or(self, rhs: Self) -> Self;
    fn xor(self, rhs: Self) -> Self;
    fn shl(self, rhs: Self) -> Self;
    fn shr(self, rhs: Self) -> Self;
    fn not(self) -> Self;
    fn abs(self) -> Self;

    /// Converts a comparison result to 0/1
    fn from_bool(flag: bool) -> Self;

    /// Non-zero values select the first mux input
    fn is_truthy(self) -> bool {
        self != Self::default()
    }
}

macro_rules! impl_word {
    ($abs:expr => $($ty:ty),* $(,)?) => {
        $(
            impl Word for $ty {
                #[inline]
                fn add(self, rhs: Self) -> Self {
                    self.wrapping_add(rhs)
                }
                #[inline]
                fn sub(self, rhs: Self) -> Self {
                    self.wrapping_sub(rhs)
                }
                #[inline]
                fn mul(self, rhs: Self) -> Self {
                    self.wrapping_mul(rhs)
                }
                #[inline]
                fn and(self, rhs: Self) -> Self {
                    self & rhs
                }
                #[inline]
                fn or(self, rhs: Self) -> Self {
                    self | rhs
                }
                #[inline]
                fn xor(self, rhs: Self) -> Self {
                    self ^ rhs
                }
                #[inline]
                fn shl(self, rhs: Self) -> Self {
                    self.wrapping_shl(rhs as u32)
                }
                #[inline]
                fn shr(self, rhs: Self) -> Self {
                    self.wrapping_shr(rhs as u32)
                }
                #[inline]
                fn not(self) -> Self {
                    !self
                }
                #[inline]
                fn abs(self) -> Self {
                    let abs: fn(Self) -> Self = $abs;
                    abs(self)
                }
                #[inline]
                fn from_bool(flag: bool) -> Self {
                    flag as Self
                }
            }
        )*
    };
}

impl_word!(|v| v.wrapping_abs() => i8, i16, i32, i64, i128, isize);
impl_word!(|v| v => u8, u16, u32, u64, u128, usize);
