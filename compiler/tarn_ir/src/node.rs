//! Syntax node kinds and per-node analysis state.
//!
//! `NodeKind` is the closed discriminant set for guest syntax nodes. It is
//! deliberately a plain `Copy` enum with child references (`NodeId`,
//! `NodeRange`) instead of owned boxes: nodes live in a [`NodeArena`]
//! (struct-of-arrays) and rewrites replace a node's kind in place.
//!
//! [`NodeArena`]: crate::NodeArena

use crate::arena::{BlobId, NodeId, NodeRange};
use crate::name::Name;

/// Unary operator of the guest language.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Plus,
    Minus,
    LogicNot,
    BitNot,
    IntCast,
    DoubleCast,
    StrCast,
    BoolCast,
}

impl UnaryOp {
    /// Operator spelling for diagnostics.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::LogicNot => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::IntCast => "(int)",
            UnaryOp::DoubleCast => "(double)",
            UnaryOp::StrCast => "(string)",
            UnaryOp::BoolCast => "(bool)",
        }
    }
}

/// Binary operator of the guest language.
///
/// `And`, `Or` short-circuit; `Xor` is logical but evaluates both sides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    ShiftLeft,
    ShiftRight,
    BitAnd,
    BitOr,
    BitXor,
    And,
    Or,
    Xor,
    Concat,
    Eq,
    NotEq,
    Identical,
    NotIdentical,
    Less,
    LessEq,
    Greater,
    GreaterEq,
}

impl BinaryOp {
    /// Operator spelling for diagnostics.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::ShiftLeft => "<<",
            BinaryOp::ShiftRight => ">>",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Xor => "xor",
            BinaryOp::Concat => ".",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Identical => "===",
            BinaryOp::NotIdentical => "!==",
            BinaryOp::Less => "<",
            BinaryOp::LessEq => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEq => ">=",
        }
    }
}

/// Increment/decrement operator, prefix or postfix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IncDecOp {
    PreInc,
    PostInc,
    PreDec,
    PostDec,
}

impl IncDecOp {
    /// Operator spelling for diagnostics.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            IncDecOp::PreInc | IncDecOp::PostInc => "++",
            IncDecOp::PreDec | IncDecOp::PostDec => "--",
        }
    }

    /// Whether the operator yields the original value (postfix).
    #[must_use]
    pub fn is_postfix(self) -> bool {
        matches!(self, IncDecOp::PostInc | IncDecOp::PostDec)
    }

    /// Whether the operator increments (as opposed to decrements).
    #[must_use]
    pub fn is_increment(self) -> bool {
        matches!(self, IncDecOp::PreInc | IncDecOp::PostInc)
    }
}

/// A guest syntax node.
///
/// Child references index into the owning arena: `NodeId` for single
/// children, `NodeRange` for child lists (and, for `ArrayLit`, into the
/// arena's array-item table). Float literals store raw bits so the enum
/// stays `Eq + Hash`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    // Literals
    NullLit,
    BoolLit(bool),
    IntLit(i32),
    LongLit(i64),
    DoubleLit(u64),
    StrLit(Name),
    BytesLit(BlobId),

    // Expressions
    Unary { op: UnaryOp, operand: NodeId },
    Binary { op: BinaryOp, left: NodeId, right: NodeId },
    ConcatChain { parts: NodeRange },
    VarUse(Name),
    ConstUse(Name),
    Assign { target: NodeId, value: NodeId },
    IncDec { op: IncDecOp, target: NodeId },
    Conditional { cond: NodeId, then_val: NodeId, else_val: NodeId },
    Call { callee: Name, args: NodeRange },
    ArrayLit { items: NodeRange },
    Index { base: NodeId, index: NodeId },

    // Statements
    Block(NodeRange),
    ExprStmt(NodeId),
    Echo(NodeRange),
    ConstDecl { name: Name, init: NodeId },
}

impl NodeKind {
    /// Number of kinds; the size of the kind-indexed dispatch table.
    pub const COUNT: usize = 22;

    /// Dense index of this kind, `0..COUNT`.
    ///
    /// Used to index the compiler's kind→strategy dispatch table.
    #[must_use]
    pub fn tag(&self) -> usize {
        match self {
            NodeKind::NullLit => 0,
            NodeKind::BoolLit(_) => 1,
            NodeKind::IntLit(_) => 2,
            NodeKind::LongLit(_) => 3,
            NodeKind::DoubleLit(_) => 4,
            NodeKind::StrLit(_) => 5,
            NodeKind::BytesLit(_) => 6,
            NodeKind::Unary { .. } => 7,
            NodeKind::Binary { .. } => 8,
            NodeKind::ConcatChain { .. } => 9,
            NodeKind::VarUse(_) => 10,
            NodeKind::ConstUse(_) => 11,
            NodeKind::Assign { .. } => 12,
            NodeKind::IncDec { .. } => 13,
            NodeKind::Conditional { .. } => 14,
            NodeKind::Call { .. } => 15,
            NodeKind::ArrayLit { .. } => 16,
            NodeKind::Index { .. } => 17,
            NodeKind::Block(_) => 18,
            NodeKind::ExprStmt(_) => 19,
            NodeKind::Echo(_) => 20,
            NodeKind::ConstDecl { .. } => 21,
        }
    }

    /// Kind name for fail-fast messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::NullLit => "NullLit",
            NodeKind::BoolLit(_) => "BoolLit",
            NodeKind::IntLit(_) => "IntLit",
            NodeKind::LongLit(_) => "LongLit",
            NodeKind::DoubleLit(_) => "DoubleLit",
            NodeKind::StrLit(_) => "StrLit",
            NodeKind::BytesLit(_) => "BytesLit",
            NodeKind::Unary { .. } => "Unary",
            NodeKind::Binary { .. } => "Binary",
            NodeKind::ConcatChain { .. } => "ConcatChain",
            NodeKind::VarUse(_) => "VarUse",
            NodeKind::ConstUse(_) => "ConstUse",
            NodeKind::Assign { .. } => "Assign",
            NodeKind::IncDec { .. } => "IncDec",
            NodeKind::Conditional { .. } => "Conditional",
            NodeKind::Call { .. } => "Call",
            NodeKind::ArrayLit { .. } => "ArrayLit",
            NodeKind::Index { .. } => "Index",
            NodeKind::Block(_) => "Block",
            NodeKind::ExprStmt(_) => "ExprStmt",
            NodeKind::Echo(_) => "Echo",
            NodeKind::ConstDecl { .. } => "ConstDecl",
        }
    }
}

static_assert_size!(NodeKind, 16);

/// How a node's value is used by its parent.
///
/// Threaded top-down during analysis; an assignment target is `Write`,
/// everything else defaults to `Read`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Access {
    #[default]
    None,
    Read,
    Write,
    RefTarget,
}

/// Pipeline phase a node has completed.
///
/// Analysis runs exactly once per node and emission requires analysis;
/// the pipeline asserts these transitions and treats violations as
/// compiler defects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    #[default]
    Created,
    Analyzed,
    Emitted,
}

/// Per-node cached analysis facts, fixed fields only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NodeState {
    pub access: Access,
    pub phase: Phase,
}

static_assert_size!(NodeState, 2);
