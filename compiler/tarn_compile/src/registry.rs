//! Node-compiler registry and dispatch.
//!
//! Every node kind is served by a stateless strategy implementing
//! [`NodeCompiler`]. Resolution is an exhaustive `match` in
//! [`strategy_for`], so adding a kind without a strategy fails to build.
//! Dispatch at run time goes through a process-wide table indexed by
//! [`NodeKind::tag`], built once behind a `OnceLock` and read lock-free
//! from every compilation worker afterwards.

use std::sync::OnceLock;

use tarn_ir::{Access, NodeArena, NodeId, NodeKind, NodeRange};

use crate::analyzer::Analyzer;
use crate::emitter::Emitter;
use crate::eval::Evaluation;
use crate::fold::FoldContext;
use crate::sink::{CopyReason, Repr};
use crate::strategies::{
    ArrayLitCompiler, AssignCompiler, BinaryCompiler, BlockCompiler, CallCompiler,
    ConcatChainCompiler, ConditionalCompiler, ConstDeclCompiler, ConstUseCompiler, EchoCompiler,
    ExprStmtCompiler, IncDecCompiler, IndexCompiler, LiteralCompiler, UnaryCompiler, VarCompiler,
};

/// Compilation strategy for one family of node kinds.
///
/// A strategy is a stateless unit struct; the node's data lives in the
/// arena and every phase context is passed in. One strategy may serve
/// several kinds (all literals share [`LiteralCompiler`]).
pub trait NodeCompiler: Sync {
    /// Speculative, context-free fold before any analysis has run.
    ///
    /// No diagnostics, no rewrites, no state; kinds that are not
    /// self-evidently constant answer [`Evaluation::runtime`].
    fn fold_prior_analysis(&self, fx: &FoldContext<'_>, node: NodeId) -> Evaluation;

    /// Analyze the node, exactly once, threading the parent's usage down.
    fn analyze(&self, ax: &mut Analyzer<'_>, node: NodeId, usage: Access) -> Evaluation;

    /// Emit the node, exactly once, after analysis.
    fn emit(&self, ex: &mut Emitter<'_>, node: NodeId) -> Repr;

    /// Whether storing this node's value requires a defensive deep copy.
    ///
    /// Queries start at `nesting` 0; a strategy that delegates to a
    /// child forwards the level.
    fn deep_copy_on_use(
        &self,
        _arena: &NodeArena,
        _node: NodeId,
        _reason: CopyReason,
        _nesting: u32,
    ) -> bool {
        true
    }

    /// Whether an assignment consuming this node's value must park it in
    /// a temporary. Assignment nodes answer `false`: their own target
    /// still holds the value.
    fn stores_on_assignment(&self, _arena: &NodeArena, _node: NodeId) -> bool {
        true
    }
}

/// Resolve the strategy serving a kind.
///
/// Exhaustive on purpose: a new `NodeKind` variant will not compile
/// until it is routed here.
fn strategy_for(kind: NodeKind) -> &'static dyn NodeCompiler {
    match kind {
        NodeKind::NullLit
        | NodeKind::BoolLit(_)
        | NodeKind::IntLit(_)
        | NodeKind::LongLit(_)
        | NodeKind::DoubleLit(_)
        | NodeKind::StrLit(_)
        | NodeKind::BytesLit(_) => &LiteralCompiler,
        NodeKind::Unary { .. } => &UnaryCompiler,
        NodeKind::Binary { .. } => &BinaryCompiler,
        NodeKind::ConcatChain { .. } => &ConcatChainCompiler,
        NodeKind::VarUse(_) => &VarCompiler,
        NodeKind::ConstUse(_) => &ConstUseCompiler,
        NodeKind::Assign { .. } => &AssignCompiler,
        NodeKind::IncDec { .. } => &IncDecCompiler,
        NodeKind::Conditional { .. } => &ConditionalCompiler,
        NodeKind::Call { .. } => &CallCompiler,
        NodeKind::ArrayLit { .. } => &ArrayLitCompiler,
        NodeKind::Index { .. } => &IndexCompiler,
        NodeKind::Block(_) => &BlockCompiler,
        NodeKind::ExprStmt(_) => &ExprStmtCompiler,
        NodeKind::Echo(_) => &EchoCompiler,
        NodeKind::ConstDecl { .. } => &ConstDeclCompiler,
    }
}

/// One representative of every kind, in tag order.
///
/// The array length is pinned to [`NodeKind::COUNT`], so extending the
/// kind set without extending this list fails to build, and the
/// `debug_assert` in the table builder catches order drift.
fn sample_kinds() -> [NodeKind; NodeKind::COUNT] {
    [
        NodeKind::NullLit,
        NodeKind::BoolLit(false),
        NodeKind::IntLit(0),
        NodeKind::LongLit(0),
        NodeKind::DoubleLit(0),
        NodeKind::StrLit(tarn_ir::Name::EMPTY),
        NodeKind::BytesLit(tarn_ir::BlobId::new(0)),
        NodeKind::Unary { op: tarn_ir::UnaryOp::Plus, operand: NodeId::INVALID },
        NodeKind::Binary {
            op: tarn_ir::BinaryOp::Add,
            left: NodeId::INVALID,
            right: NodeId::INVALID,
        },
        NodeKind::ConcatChain { parts: NodeRange::EMPTY },
        NodeKind::VarUse(tarn_ir::Name::EMPTY),
        NodeKind::ConstUse(tarn_ir::Name::EMPTY),
        NodeKind::Assign { target: NodeId::INVALID, value: NodeId::INVALID },
        NodeKind::IncDec { op: tarn_ir::IncDecOp::PreInc, target: NodeId::INVALID },
        NodeKind::Conditional {
            cond: NodeId::INVALID,
            then_val: NodeId::INVALID,
            else_val: NodeId::INVALID,
        },
        NodeKind::Call { callee: tarn_ir::Name::EMPTY, args: NodeRange::EMPTY },
        NodeKind::ArrayLit { items: NodeRange::EMPTY },
        NodeKind::Index { base: NodeId::INVALID, index: NodeId::INVALID },
        NodeKind::Block(NodeRange::EMPTY),
        NodeKind::ExprStmt(NodeId::INVALID),
        NodeKind::Echo(NodeRange::EMPTY),
        NodeKind::ConstDecl { name: tarn_ir::Name::EMPTY, init: NodeId::INVALID },
    ]
}

/// Global kind-indexed dispatch table.
static DISPATCH: OnceLock<[&'static dyn NodeCompiler; NodeKind::COUNT]> = OnceLock::new();

/// The strategy for a kind, through the shared dispatch table.
///
/// The first call builds the table under the `OnceLock`; every later
/// call is an indexed read with no locking, from any thread.
#[must_use]
pub fn compiler_for(kind: NodeKind) -> &'static dyn NodeCompiler {
    let table = DISPATCH.get_or_init(|| {
        let samples = sample_kinds();
        core::array::from_fn(|tag| {
            debug_assert_eq!(samples[tag].tag(), tag, "sample order must follow NodeKind::tag");
            strategy_for(samples[tag])
        })
    });
    table[kind.tag()]
}

/// Whether storing `node`'s value for `reason` needs a defensive deep
/// copy. Emission sites always ask from nesting level 0.
#[must_use]
pub fn deep_copies(arena: &NodeArena, node: NodeId, reason: CopyReason) -> bool {
    compiler_for(arena.kind(node)).deep_copy_on_use(arena, node, reason, 0)
}
