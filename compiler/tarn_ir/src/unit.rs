//! Compilation unit: source text plus everything derived from it.
//!
//! [`SourceUnit`] couples a script's text with its [`LineIndex`], its
//! [`Interner`], and the [`NodeArena`] holding its syntax tree. Units are
//! built programmatically through [`UnitBuilder`], which stands in for a
//! parser in tests and embedding hosts: each helper pushes one node and
//! returns its id, so a tree is written bottom-up.

use crate::arena::{ArrayItem, BlobId, NodeArena, NodeId, NodeRange};
use crate::interner::{Interner, SharedInterner};
use crate::line_index::LineIndex;
use crate::name::Name;
use crate::node::{BinaryOp, IncDecOp, NodeKind, UnaryOp};
use crate::span::Span;
use std::sync::Arc;

/// One guest script, ready for compilation.
#[derive(Debug)]
pub struct SourceUnit {
    text: Arc<str>,
    line_index: LineIndex,
    interner: SharedInterner,
    /// Syntax nodes. Mutable so analysis can rewrite kinds in place.
    pub arena: NodeArena,
    /// Top-level `Block` node.
    pub root: NodeId,
}

impl SourceUnit {
    /// The full source text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Line break positions for this unit's text.
    #[must_use]
    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    /// The interner shared by this unit's names.
    #[must_use]
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// A handle to the shared interner, for callers that need the
    /// interner while the arena is mutably borrowed.
    #[must_use]
    pub fn shared_interner(&self) -> SharedInterner {
        Arc::clone(&self.interner)
    }

    /// Resolve an interned name back to its text.
    #[must_use]
    pub fn name_text(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }
}

/// Bottom-up construction of a [`SourceUnit`].
///
/// ```
/// use tarn_ir::{Span, UnitBuilder};
///
/// let mut b = UnitBuilder::new("1 + 2;");
/// let lhs = b.int(1, Span::new(0, 1));
/// let rhs = b.int(2, Span::new(4, 5));
/// let sum = b.add(lhs, rhs, Span::new(0, 5));
/// let stmt = b.expr_stmt(sum, Span::new(0, 6));
/// let unit = b.finish(&[stmt]);
/// assert_eq!(unit.line_index().line_count(), 1);
/// ```
pub struct UnitBuilder {
    text: Arc<str>,
    interner: SharedInterner,
    arena: NodeArena,
}

impl UnitBuilder {
    /// Start a unit with a fresh interner.
    #[must_use]
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self::with_interner(text, Arc::new(Interner::new()))
    }

    /// Start a unit sharing an interner with other units (required when
    /// several units resolve against one environment).
    #[must_use]
    pub fn with_interner(text: impl Into<Arc<str>>, interner: SharedInterner) -> Self {
        let text = text.into();
        let arena = NodeArena::with_capacity(text.len());
        Self { text, interner, arena }
    }

    /// Intern a string without creating a node.
    pub fn name(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    /// Push an arbitrary node. The per-kind helpers below are usually
    /// more convenient.
    pub fn push(&mut self, kind: NodeKind, span: Span) -> NodeId {
        self.arena.push(kind, span)
    }

    pub fn null(&mut self, span: Span) -> NodeId {
        self.push(NodeKind::NullLit, span)
    }

    pub fn bool_lit(&mut self, value: bool, span: Span) -> NodeId {
        self.push(NodeKind::BoolLit(value), span)
    }

    pub fn int(&mut self, value: i32, span: Span) -> NodeId {
        self.push(NodeKind::IntLit(value), span)
    }

    pub fn long(&mut self, value: i64, span: Span) -> NodeId {
        self.push(NodeKind::LongLit(value), span)
    }

    pub fn double(&mut self, value: f64, span: Span) -> NodeId {
        self.push(NodeKind::DoubleLit(value.to_bits()), span)
    }

    pub fn str_lit(&mut self, value: &str, span: Span) -> NodeId {
        let name = self.interner.intern(value);
        self.push(NodeKind::StrLit(name), span)
    }

    pub fn bytes_lit(&mut self, value: Vec<u8>, span: Span) -> NodeId {
        let blob = self.arena.push_blob(value);
        self.push(NodeKind::BytesLit(blob), span)
    }

    pub fn unary(&mut self, op: UnaryOp, operand: NodeId, span: Span) -> NodeId {
        self.push(NodeKind::Unary { op, operand }, span)
    }

    pub fn binary(&mut self, op: BinaryOp, left: NodeId, right: NodeId, span: Span) -> NodeId {
        self.push(NodeKind::Binary { op, left, right }, span)
    }

    /// Shorthand for the most common binary node in tests.
    pub fn add(&mut self, left: NodeId, right: NodeId, span: Span) -> NodeId {
        self.binary(BinaryOp::Add, left, right, span)
    }

    pub fn concat_chain(&mut self, parts: &[NodeId], span: Span) -> NodeId {
        let parts = self.arena.push_children(parts);
        self.push(NodeKind::ConcatChain { parts }, span)
    }

    pub fn var(&mut self, name: &str, span: Span) -> NodeId {
        let name = self.interner.intern(name);
        self.push(NodeKind::VarUse(name), span)
    }

    pub fn const_use(&mut self, name: &str, span: Span) -> NodeId {
        let name = self.interner.intern(name);
        self.push(NodeKind::ConstUse(name), span)
    }

    pub fn assign(&mut self, target: NodeId, value: NodeId, span: Span) -> NodeId {
        self.push(NodeKind::Assign { target, value }, span)
    }

    pub fn inc_dec(&mut self, op: IncDecOp, target: NodeId, span: Span) -> NodeId {
        self.push(NodeKind::IncDec { op, target }, span)
    }

    pub fn conditional(
        &mut self,
        cond: NodeId,
        then_val: NodeId,
        else_val: NodeId,
        span: Span,
    ) -> NodeId {
        self.push(NodeKind::Conditional { cond, then_val, else_val }, span)
    }

    pub fn call(&mut self, callee: &str, args: &[NodeId], span: Span) -> NodeId {
        let callee = self.interner.intern(callee);
        let args = self.arena.push_children(args);
        self.push(NodeKind::Call { callee, args }, span)
    }

    pub fn array_lit(&mut self, items: &[ArrayItem], span: Span) -> NodeId {
        let items = self.arena.push_items(items);
        self.push(NodeKind::ArrayLit { items }, span)
    }

    pub fn index(&mut self, base: NodeId, index: NodeId, span: Span) -> NodeId {
        self.push(NodeKind::Index { base, index }, span)
    }

    pub fn block(&mut self, stmts: &[NodeId], span: Span) -> NodeId {
        let stmts = self.arena.push_children(stmts);
        self.push(NodeKind::Block(stmts), span)
    }

    pub fn expr_stmt(&mut self, expr: NodeId, span: Span) -> NodeId {
        self.push(NodeKind::ExprStmt(expr), span)
    }

    pub fn echo(&mut self, args: &[NodeId], span: Span) -> NodeId {
        let args = self.arena.push_children(args);
        self.push(NodeKind::Echo(args), span)
    }

    pub fn const_decl(&mut self, name: &str, init: NodeId, span: Span) -> NodeId {
        let name = self.interner.intern(name);
        self.push(NodeKind::ConstDecl { name, init }, span)
    }

    /// Store raw bytes and return their id, for building `BytesLit` kinds
    /// directly.
    pub fn blob(&mut self, bytes: Vec<u8>) -> BlobId {
        self.arena.push_blob(bytes)
    }

    /// Allocate a child list for hand-built node kinds.
    pub fn children(&mut self, ids: &[NodeId]) -> NodeRange {
        self.arena.push_children(ids)
    }

    /// Wrap the given statements in the root `Block` and seal the unit.
    #[must_use]
    pub fn finish(mut self, stmts: &[NodeId]) -> SourceUnit {
        let span = if self.text.is_empty() {
            Span::new(0, 0)
        } else {
            Span::new(0, u32::try_from(self.text.len()).unwrap_or(u32::MAX))
        };
        let root = self.block(stmts, span);
        let line_index = LineIndex::build(&self.text);
        SourceUnit {
            text: self.text,
            line_index,
            interner: self.interner,
            arena: self.arena,
            root,
        }
    }
}
