//! Analysis results and the operator glue into the value engine.
//!
//! [`Evaluation`] is what every fold and analyze call hands back: either
//! "this node runs at run time" or "this node is the constant I computed".
//! A valued evaluation turns into a literal node through
//! [`Evaluation::literalize`]; the parent stores the replacement id into
//! its own kind, which is the only rewrite the arena supports.
//!
//! [`apply_binary`] and [`apply_unary`] map syntax operators onto the
//! total engine in `tarn_value::ops`. They never fail; degraded outcomes
//! come back as [`CoercionFlags`] for the caller to fold, warn, or refuse
//! on.

use std::cmp::Ordering;

use tarn_ir::{BinaryOp, Interner, NodeArena, NodeId, NodeKind, UnaryOp};
use tarn_value::convert;
use tarn_value::ops::{arith, bits, compare, concat, shift, Coerced};
use tarn_value::GuestValue;


/// Outcome of folding or analyzing one node.
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    /// The node this evaluation describes (or, after a parent stores a
    /// literalized id, described).
    pub node: NodeId,
    /// The computed constant, when the node's value is known.
    pub value: Option<GuestValue>,
}

impl Evaluation {
    /// An evaluation with no compile-time value.
    #[must_use]
    pub fn runtime(node: NodeId) -> Self {
        Evaluation { node, value: None }
    }

    /// An evaluation that computed `value`.
    #[must_use]
    pub fn known(node: NodeId, value: GuestValue) -> Self {
        Evaluation { node, value: Some(value) }
    }

    /// Returns `true` if the node's value is known.
    #[must_use]
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// Convert a valued evaluation into a literal node.
    ///
    /// Returns a fresh literal carrying this node's span, or the node
    /// unchanged when there is no value or the node already is a
    /// literal. The caller stores the returned id back into the parent's
    /// kind; the arena itself is never patched here.
    ///
    /// # Panics
    /// Array values have no literal node form; producing one is a
    /// compiler defect.
    #[must_use = "the replacement id must be stored back into the parent"]
    pub fn literalize(&self, arena: &mut NodeArena, interner: &Interner) -> NodeId {
        let Some(value) = &self.value else {
            return self.node;
        };
        if is_literal(arena.kind(self.node)) {
            return self.node;
        }
        let span = arena.span(self.node);
        let kind = match value {
            GuestValue::Null => NodeKind::NullLit,
            GuestValue::Bool(value) => NodeKind::BoolLit(*value),
            GuestValue::Int(value) => NodeKind::IntLit(*value),
            GuestValue::Long(value) => NodeKind::LongLit(*value),
            GuestValue::Double(value) => NodeKind::DoubleLit(value.to_bits()),
            GuestValue::Str(text) => NodeKind::StrLit(interner.intern(text)),
            GuestValue::Bytes(bytes) => NodeKind::BytesLit(arena.push_blob(bytes.to_vec())),
            GuestValue::Array(_) => {
                compiler_bug!("no literal form for an array value at {span}")
            }
        };
        arena.push(kind, span)
    }
}

fn is_literal(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::NullLit
            | NodeKind::BoolLit(_)
            | NodeKind::IntLit(_)
            | NodeKind::LongLit(_)
            | NodeKind::DoubleLit(_)
            | NodeKind::StrLit(_)
            | NodeKind::BytesLit(_)
    )
}

/// Apply a binary operator to two known values.
///
/// The logical operators evaluate eagerly here; short-circuiting is an
/// emission concern, and with both operands already computed the eager
/// result is the same.
#[must_use]
pub fn apply_binary(op: BinaryOp, left: &GuestValue, right: &GuestValue) -> Coerced<GuestValue> {
    match op {
        BinaryOp::Add => arith::add(left, right),
        BinaryOp::Sub => arith::subtract(left, right),
        BinaryOp::Mul => arith::multiply(left, right),
        BinaryOp::Div => arith::divide(left, right),
        BinaryOp::Mod => arith::remainder(left, right),
        BinaryOp::ShiftLeft => shift::shift_left(left, right),
        BinaryOp::ShiftRight => shift::shift_right(left, right),
        BinaryOp::BitAnd => Coerced::clean(bits::bit_and(left, right)),
        BinaryOp::BitOr => Coerced::clean(bits::bit_or(left, right)),
        BinaryOp::BitXor => Coerced::clean(bits::bit_xor(left, right)),
        BinaryOp::And => logical(convert::to_boolean(left) && convert::to_boolean(right)),
        BinaryOp::Or => logical(convert::to_boolean(left) || convert::to_boolean(right)),
        BinaryOp::Xor => logical(convert::to_boolean(left) ^ convert::to_boolean(right)),
        BinaryOp::Concat => Coerced::clean(concat::concat2(left, right)),
        BinaryOp::Eq => logical(compare::loose_eq(left, right)),
        BinaryOp::NotEq => logical(!compare::loose_eq(left, right)),
        BinaryOp::Identical => logical(compare::strict_eq(left, right)),
        BinaryOp::NotIdentical => logical(!compare::strict_eq(left, right)),
        BinaryOp::Less => relational(left, right, |order| order == Ordering::Less),
        BinaryOp::LessEq => relational(left, right, |order| order != Ordering::Greater),
        BinaryOp::Greater => relational(left, right, |order| order == Ordering::Greater),
        BinaryOp::GreaterEq => relational(left, right, |order| order != Ordering::Less),
    }
}

/// Apply a unary operator to a known value.
#[must_use]
pub fn apply_unary(op: UnaryOp, operand: &GuestValue) -> Coerced<GuestValue> {
    match op {
        UnaryOp::Plus => arith::plus(operand),
        UnaryOp::Minus => arith::negate(operand),
        UnaryOp::LogicNot => logical(!convert::to_boolean(operand)),
        UnaryOp::BitNot => bits::bit_not(operand),
        UnaryOp::IntCast => Coerced::clean(GuestValue::Int(convert::to_int(operand))),
        UnaryOp::DoubleCast => Coerced::clean(GuestValue::Double(convert::to_double(operand))),
        UnaryOp::StrCast => Coerced::clean(GuestValue::str(convert::to_text(operand))),
        UnaryOp::BoolCast => Coerced::clean(GuestValue::Bool(convert::to_boolean(operand))),
    }
}

fn logical(value: bool) -> Coerced<GuestValue> {
    Coerced::clean(GuestValue::Bool(value))
}

/// Comparison operators share one shape: order the operands, test the
/// ordering, carry the comparison's flags through.
fn relational(
    left: &GuestValue,
    right: &GuestValue,
    test: impl Fn(Ordering) -> bool,
) -> Coerced<GuestValue> {
    let ordering = compare::compare(left, right);
    Coerced::flagged(GuestValue::Bool(test(ordering.value)), ordering.flags)
}
