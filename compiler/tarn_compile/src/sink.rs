//! Backend contract for code emission.
//!
//! The emit phase drives a [`CodeSink`]: a narrow writer interface over a
//! value-stack target. The compiler sequences loads, operators, branches,
//! and calls in guest evaluation order; the sink owns instruction encoding
//! and never sees syntax nodes. [`RecordingSink`] is the shipped
//! implementation, capturing the stream as [`Inst`]s for tests and
//! embedders that post-process instead of encoding.
//!
//! # Stack conventions
//!
//! Every operator consumes its operands from the top of the stack and
//! leaves its result there. Conditional branches consume one value,
//! coercing it to a boolean to decide. `store_var` consumes the stored
//! value; `call` consumes the arguments and leaves the result.

use tarn_ir::Name;
use tarn_value::GuestValue;

/// Static representation of the value an expression leaves behind.
///
/// `None` means nothing is left on the stack (statements, unconsumed
/// assignments); `Value` means a value of a shape only the running
/// program knows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Repr {
    None,
    Bool,
    Int,
    Long,
    Double,
    Str,
    Bytes,
    Array,
    Value,
}

/// Why a value is being defensively copied.
///
/// Guest arrays have value semantics: storing one into a variable, an
/// array slot, or an argument must not alias the source. The reason is
/// carried on the copy instruction so a backend can specialize.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CopyReason {
    Assigned,
    PassedByValue,
    ReturnedByValue,
    Unknown,
}

/// How a branch decides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BranchKind {
    /// Unconditional jump.
    Always,
    /// Consume the top of stack; jump when it coerces to `false`.
    IfFalse,
    /// Consume the top of stack; jump when it coerces to `true`.
    IfTrue,
}

/// Branch target allocated by [`CodeSink::new_label`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Label(u32);

impl Label {
    /// Wrap a raw label index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Label(index)
    }

    /// The raw label index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

/// Stack operators the emit phase can request.
///
/// The set mirrors the guest operator surface plus the handful of
/// structural operations emission needs: n-ary concatenation, array
/// construction, defensive copies, and stack plumbing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SinkOp {
    // Unary operators and casts.
    Plus,
    Neg,
    Not,
    BitNot,
    CastInt,
    CastDouble,
    CastStr,
    CastBool,

    // Binary operators.
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Shl,
    Shr,
    BitAnd,
    BitOr,
    BitXor,

    // Comparisons.
    Eq,
    NotEq,
    Identical,
    NotIdentical,
    Less,
    LessEq,
    Greater,
    GreaterEq,

    /// Concatenate the top `n` values into one text or byte string.
    ConcatN(u32),
    /// Push a fresh array with the given capacity hint.
    MakeArray(u32),
    /// Pop a value and append it to the array beneath it under the next
    /// integer key; the array stays on the stack.
    ArrayAppend,
    /// Pop a value and a key and insert into the array beneath them; the
    /// array stays on the stack.
    ArrayInsert,
    /// Pop a key and an array, push the element (null when absent).
    IndexGet,

    /// Replace the top of stack by a structurally fresh copy.
    Copy(CopyReason),
    /// Increment the top of stack by the guest `++` rules.
    Inc,
    /// Decrement the top of stack by the guest `--` rules.
    Dec,
    /// Duplicate the top of stack.
    Dup,
    /// Discard the top of stack.
    Pop,
    /// Pop a value and write its text form to the guest output.
    Echo,
}

/// Receiver for the emitted instruction stream.
///
/// One sink instance serves one unit; the pipeline never shares a sink
/// across workers.
pub trait CodeSink {
    /// Push a constant value.
    fn load_const(&mut self, value: &GuestValue);
    /// Push the current value of a named slot.
    fn load_var(&mut self, name: Name);
    /// Pop a value into a named slot.
    fn store_var(&mut self, name: Name);
    /// Apply a stack operator.
    fn emit_op(&mut self, op: SinkOp);
    /// Allocate a fresh, unmarked label.
    fn new_label(&mut self) -> Label;
    /// Bind a label to the current position.
    fn mark_label(&mut self, label: Label);
    /// Branch to a label.
    fn branch(&mut self, kind: BranchKind, target: Label);
    /// Call a named callable; `args` carries the static representation
    /// of each argument already on the stack.
    fn call(&mut self, callee: Name, args: &[Repr]);
}

/// One recorded sink action.
#[derive(Clone, Debug, PartialEq)]
pub enum Inst {
    Const(GuestValue),
    Load(Name),
    Store(Name),
    Op(SinkOp),
    Mark(Label),
    Branch(BranchKind, Label),
    Call(Name, Vec<Repr>),
}

/// A [`CodeSink`] that records the stream instead of encoding it.
#[derive(Debug, Default)]
pub struct RecordingSink {
    instructions: Vec<Inst>,
    next_label: u32,
}

impl RecordingSink {
    /// Create an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded instructions in emission order.
    #[must_use]
    pub fn instructions(&self) -> &[Inst] {
        &self.instructions
    }

    /// Consume the sink, returning the recorded instructions.
    #[must_use]
    pub fn into_instructions(self) -> Vec<Inst> {
        self.instructions
    }

    /// Returns `true` if nothing was emitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

impl CodeSink for RecordingSink {
    fn load_const(&mut self, value: &GuestValue) {
        self.instructions.push(Inst::Const(value.clone()));
    }

    fn load_var(&mut self, name: Name) {
        self.instructions.push(Inst::Load(name));
    }

    fn store_var(&mut self, name: Name) {
        self.instructions.push(Inst::Store(name));
    }

    fn emit_op(&mut self, op: SinkOp) {
        self.instructions.push(Inst::Op(op));
    }

    fn new_label(&mut self) -> Label {
        let label = Label::new(self.next_label);
        self.next_label += 1;
        label
    }

    fn mark_label(&mut self, label: Label) {
        self.instructions.push(Inst::Mark(label));
    }

    fn branch(&mut self, kind: BranchKind, target: Label) {
        self.instructions.push(Inst::Branch(kind, target));
    }

    fn call(&mut self, callee: Name, args: &[Repr]) {
        self.instructions.push(Inst::Call(callee, args.to_vec()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tarn_ir::Interner;

    #[test]
    fn labels_are_allocated_in_sequence() {
        let mut sink = RecordingSink::new();
        assert_eq!(sink.new_label(), Label::new(0));
        assert_eq!(sink.new_label(), Label::new(1));
        // Allocation alone records nothing.
        assert!(sink.is_empty());
    }

    #[test]
    fn records_actions_in_order() {
        let interner = Interner::new();
        let x = interner.intern("x");
        let strlen = interner.intern("strlen");

        let mut sink = RecordingSink::new();
        sink.load_const(&GuestValue::Int(1));
        sink.store_var(x);
        sink.load_var(x);
        sink.call(strlen, &[Repr::Value]);
        let end = sink.new_label();
        sink.branch(BranchKind::IfFalse, end);
        sink.mark_label(end);

        assert_eq!(
            sink.into_instructions(),
            vec![
                Inst::Const(GuestValue::Int(1)),
                Inst::Store(x),
                Inst::Load(x),
                Inst::Call(strlen, vec![Repr::Value]),
                Inst::Branch(BranchKind::IfFalse, Label::new(0)),
                Inst::Mark(Label::new(0)),
            ]
        );
    }
}
