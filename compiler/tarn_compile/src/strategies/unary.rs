//! Unary operators and increment/decrement.

use tarn_diagnostic::unsupported_operand_types;
use tarn_ir::{Access, NodeArena, NodeId, NodeKind, UnaryOp};

use crate::analyzer::Analyzer;
use crate::emitter::Emitter;
use crate::eval::{apply_unary, Evaluation};
use crate::fold::FoldContext;
use crate::registry::NodeCompiler;
use crate::sink::{CopyReason, Repr, SinkOp};

/// `+x`, `-x`, `!x`, `~x` and the four casts.
pub(crate) struct UnaryCompiler;

fn unary_parts(arena: &NodeArena, node: NodeId) -> (UnaryOp, NodeId) {
    let NodeKind::Unary { op, operand } = arena.kind(node) else {
        compiler_bug!("unary strategy bound to {}", arena.kind(node).name());
    };
    (op, operand)
}

impl NodeCompiler for UnaryCompiler {
    fn fold_prior_analysis(&self, fx: &FoldContext<'_>, node: NodeId) -> Evaluation {
        let (op, operand) = unary_parts(fx.arena(), node);
        let Some(value) = fx.fold(operand).value else {
            return Evaluation::runtime(node);
        };
        let outcome = apply_unary(op, &value);
        if outcome.is_clean() {
            Evaluation::known(node, outcome.value)
        } else {
            Evaluation::runtime(node)
        }
    }

    fn analyze(&self, ax: &mut Analyzer<'_>, node: NodeId, _usage: Access) -> Evaluation {
        let (op, operand) = unary_parts(ax.arena(), node);
        let operand_eval = ax.analyze(operand, Access::Read);

        if let Some(value) = &operand_eval.value {
            let outcome = apply_unary(op, value);
            if outcome.is_clean() {
                return Evaluation::known(node, outcome.value);
            }
            let span = ax.arena().span(node);
            ax.report(unsupported_operand_types(op.symbol(), span));
        }

        let new_operand = ax.literalize(&operand_eval);
        if new_operand != operand {
            ax.arena_mut().set_kind(node, NodeKind::Unary { op, operand: new_operand });
        }
        Evaluation::runtime(node)
    }

    fn emit(&self, ex: &mut Emitter<'_>, node: NodeId) -> Repr {
        let (op, operand) = unary_parts(ex.arena(), node);
        ex.emit(operand);
        let (sink_op, repr) = match op {
            UnaryOp::Plus => (SinkOp::Plus, Repr::Value),
            UnaryOp::Minus => (SinkOp::Neg, Repr::Value),
            UnaryOp::LogicNot => (SinkOp::Not, Repr::Bool),
            UnaryOp::BitNot => (SinkOp::BitNot, Repr::Value),
            UnaryOp::IntCast => (SinkOp::CastInt, Repr::Int),
            UnaryOp::DoubleCast => (SinkOp::CastDouble, Repr::Double),
            UnaryOp::StrCast => (SinkOp::CastStr, Repr::Str),
            UnaryOp::BoolCast => (SinkOp::CastBool, Repr::Bool),
        };
        ex.sink().emit_op(sink_op);
        repr
    }

    // Every operator here produces a fresh scalar.
    fn deep_copy_on_use(
        &self,
        _arena: &NodeArena,
        _node: NodeId,
        _reason: CopyReason,
        _nesting: u32,
    ) -> bool {
        false
    }
}

/// `++$x`, `--$x`, `$x++`, `$x--`.
pub(crate) struct IncDecCompiler;

impl NodeCompiler for IncDecCompiler {
    fn fold_prior_analysis(&self, _fx: &FoldContext<'_>, node: NodeId) -> Evaluation {
        Evaluation::runtime(node)
    }

    fn analyze(&self, ax: &mut Analyzer<'_>, node: NodeId, _usage: Access) -> Evaluation {
        let NodeKind::IncDec { target, .. } = ax.arena().kind(node) else {
            compiler_bug!("incdec strategy bound to {}", ax.arena().kind(node).name());
        };
        if !matches!(ax.arena().kind(target), NodeKind::VarUse(_)) {
            compiler_bug!(
                "increment target must be a variable, got {} at {}",
                ax.arena().kind(target).name(),
                ax.arena().span(target),
            );
        }
        ax.analyze(target, Access::Write);
        Evaluation::runtime(node)
    }

    fn emit(&self, ex: &mut Emitter<'_>, node: NodeId) -> Repr {
        let NodeKind::IncDec { op, target } = ex.arena().kind(node) else {
            compiler_bug!("incdec strategy bound to {}", ex.arena().kind(node).name());
        };
        let NodeKind::VarUse(name) = ex.arena().kind(target) else {
            compiler_bug!("increment target must be a variable at {}", ex.arena().span(target));
        };
        let consumed = ex.arena().state(node).access == Access::Read;

        ex.sink().load_var(name);
        if consumed && op.is_postfix() {
            ex.sink().emit_op(SinkOp::Dup);
        }
        ex.sink().emit_op(if op.is_increment() { SinkOp::Inc } else { SinkOp::Dec });
        if consumed && !op.is_postfix() {
            ex.sink().emit_op(SinkOp::Dup);
        }
        // The target's own emit performs the store.
        ex.emit(target);

        if consumed { Repr::Value } else { Repr::None }
    }
}
