//! The `?:` operator.
//!
//! A constant condition decides the branch at analysis time: the other
//! branch is reported unreachable and the node either folds to the
//! taken branch's value or takes over its kind outright. Both branches
//! are analyzed either way, so their own diagnostics still surface.

use tarn_diagnostic::unreachable_branch;
use tarn_ir::{Access, NodeArena, NodeId, NodeKind};
use tarn_value::convert::to_boolean;

use crate::analyzer::Analyzer;
use crate::emitter::Emitter;
use crate::eval::Evaluation;
use crate::fold::FoldContext;
use crate::registry::{compiler_for, NodeCompiler};
use crate::sink::{BranchKind, CopyReason, Repr};

pub(crate) struct ConditionalCompiler;

fn conditional_parts(arena: &NodeArena, node: NodeId) -> (NodeId, NodeId, NodeId) {
    let NodeKind::Conditional { cond, then_val, else_val } = arena.kind(node) else {
        compiler_bug!("conditional strategy bound to {}", arena.kind(node).name());
    };
    (cond, then_val, else_val)
}

impl NodeCompiler for ConditionalCompiler {
    fn fold_prior_analysis(&self, fx: &FoldContext<'_>, node: NodeId) -> Evaluation {
        let (cond, then_val, else_val) = conditional_parts(fx.arena(), node);
        let Some(cond_value) = fx.fold(cond).value else {
            return Evaluation::runtime(node);
        };
        let taken = if to_boolean(&cond_value) { then_val } else { else_val };
        match fx.fold(taken).value {
            Some(value) => Evaluation::known(node, value),
            None => Evaluation::runtime(node),
        }
    }

    fn analyze(&self, ax: &mut Analyzer<'_>, node: NodeId, _usage: Access) -> Evaluation {
        let (cond, then_val, else_val) = conditional_parts(ax.arena(), node);
        let cond_eval = ax.analyze(cond, Access::Read);
        ax.enter_conditional();
        let then_eval = ax.analyze(then_val, Access::Read);
        let else_eval = ax.analyze(else_val, Access::Read);
        ax.leave_conditional();

        if let Some(cond_value) = &cond_eval.value {
            let takes_then = to_boolean(cond_value);
            let (taken, untaken) =
                if takes_then { (then_val, else_val) } else { (else_val, then_val) };
            let taken_eval = if takes_then { &then_eval } else { &else_eval };
            ax.report(unreachable_branch(ax.arena().span(untaken)));

            if let Some(value) = &taken_eval.value {
                return Evaluation::known(node, value.clone());
            }
            // The node becomes the taken branch; the untaken subtree is
            // simply never emitted.
            let kind = ax.arena().kind(taken);
            ax.arena_mut().set_kind(node, kind);
            return Evaluation::runtime(node);
        }

        let new_then = ax.literalize(&then_eval);
        let new_else = ax.literalize(&else_eval);
        if new_then != then_val || new_else != else_val {
            ax.arena_mut().set_kind(
                node,
                NodeKind::Conditional { cond, then_val: new_then, else_val: new_else },
            );
        }
        Evaluation::runtime(node)
    }

    fn emit(&self, ex: &mut Emitter<'_>, node: NodeId) -> Repr {
        let (cond, then_val, else_val) = conditional_parts(ex.arena(), node);
        ex.emit(cond);
        let else_label = ex.sink().new_label();
        let end_label = ex.sink().new_label();
        ex.sink().branch(BranchKind::IfFalse, else_label);
        let then_repr = ex.emit(then_val);
        ex.sink().branch(BranchKind::Always, end_label);
        ex.sink().mark_label(else_label);
        let else_repr = ex.emit(else_val);
        ex.sink().mark_label(end_label);

        if then_repr == else_repr { then_repr } else { Repr::Value }
    }

    // Copy duty follows whichever branch could be picked.
    fn deep_copy_on_use(
        &self,
        arena: &NodeArena,
        node: NodeId,
        reason: CopyReason,
        nesting: u32,
    ) -> bool {
        let (_, then_val, else_val) = conditional_parts(arena, node);
        compiler_for(arena.kind(then_val)).deep_copy_on_use(arena, then_val, reason, nesting)
            || compiler_for(arena.kind(else_val)).deep_copy_on_use(arena, else_val, reason, nesting)
    }
}
