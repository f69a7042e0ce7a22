//! Variable reads and writes, value assignment, array indexing.

use tarn_ir::{Access, NodeArena, NodeId, NodeKind};

use crate::analyzer::Analyzer;
use crate::emitter::Emitter;
use crate::eval::Evaluation;
use crate::fold::FoldContext;
use crate::registry::{compiler_for, deep_copies, NodeCompiler};
use crate::sink::{CopyReason, Repr, SinkOp};

/// `$name`, as a read or as a store target.
pub(crate) struct VarCompiler;

impl NodeCompiler for VarCompiler {
    fn fold_prior_analysis(&self, _fx: &FoldContext<'_>, node: NodeId) -> Evaluation {
        Evaluation::runtime(node)
    }

    fn analyze(&self, _ax: &mut Analyzer<'_>, node: NodeId, _usage: Access) -> Evaluation {
        Evaluation::runtime(node)
    }

    fn emit(&self, ex: &mut Emitter<'_>, node: NodeId) -> Repr {
        let NodeKind::VarUse(name) = ex.arena().kind(node) else {
            compiler_bug!("variable strategy bound to {}", ex.arena().kind(node).name());
        };
        if ex.arena().state(node).access == Access::Write {
            ex.sink().store_var(name);
            Repr::None
        } else {
            ex.sink().load_var(name);
            Repr::Value
        }
    }
}

/// `$target = value`.
pub(crate) struct AssignCompiler;

fn assign_parts(arena: &NodeArena, node: NodeId) -> (NodeId, NodeId) {
    let NodeKind::Assign { target, value } = arena.kind(node) else {
        compiler_bug!("assign strategy bound to {}", arena.kind(node).name());
    };
    (target, value)
}

impl NodeCompiler for AssignCompiler {
    fn fold_prior_analysis(&self, _fx: &FoldContext<'_>, node: NodeId) -> Evaluation {
        Evaluation::runtime(node)
    }

    fn analyze(&self, ax: &mut Analyzer<'_>, node: NodeId, _usage: Access) -> Evaluation {
        let (target, value) = assign_parts(ax.arena(), node);
        if !matches!(ax.arena().kind(target), NodeKind::VarUse(_)) {
            compiler_bug!(
                "assignment target must be a variable, got {} at {}",
                ax.arena().kind(target).name(),
                ax.arena().span(target),
            );
        }
        ax.analyze(target, Access::Write);
        let value_eval = ax.analyze(value, Access::Read);
        let new_value = ax.literalize(&value_eval);
        if new_value != value {
            ax.arena_mut().set_kind(node, NodeKind::Assign { target, value: new_value });
        }
        Evaluation::runtime(node)
    }

    fn emit(&self, ex: &mut Emitter<'_>, node: NodeId) -> Repr {
        let (target, value) = assign_parts(ex.arena(), node);
        let consumed = ex.arena().state(node).access == Access::Read;

        let value_repr = ex.emit(value);
        if deep_copies(ex.arena(), value, CopyReason::Assigned) {
            ex.sink().emit_op(SinkOp::Copy(CopyReason::Assigned));
        }

        // A chained assignment's value lives on in its own target, so
        // re-reading the variable beats keeping a duplicate around.
        let keeps_value =
            compiler_for(ex.arena().kind(value)).stores_on_assignment(ex.arena(), value);
        if consumed && keeps_value {
            ex.sink().emit_op(SinkOp::Dup);
            ex.emit(target);
            value_repr
        } else if consumed {
            ex.emit(target);
            let NodeKind::VarUse(name) = ex.arena().kind(target) else {
                compiler_bug!("assignment target must be a variable at {}", ex.arena().span(target));
            };
            ex.sink().load_var(name);
            Repr::Value
        } else {
            ex.emit(target);
            Repr::None
        }
    }

    // Once stored, the value stays readable from this node's own
    // target; an enclosing assignment need not park it in a temporary.
    fn stores_on_assignment(&self, _arena: &NodeArena, _node: NodeId) -> bool {
        false
    }
}

/// `base[index]`, read-only.
pub(crate) struct IndexCompiler;

impl NodeCompiler for IndexCompiler {
    fn fold_prior_analysis(&self, _fx: &FoldContext<'_>, node: NodeId) -> Evaluation {
        Evaluation::runtime(node)
    }

    fn analyze(&self, ax: &mut Analyzer<'_>, node: NodeId, _usage: Access) -> Evaluation {
        let NodeKind::Index { base, index } = ax.arena().kind(node) else {
            compiler_bug!("index strategy bound to {}", ax.arena().kind(node).name());
        };
        let base_eval = ax.analyze(base, Access::Read);
        let index_eval = ax.analyze(index, Access::Read);
        let new_base = ax.literalize(&base_eval);
        let new_index = ax.literalize(&index_eval);
        if new_base != base || new_index != index {
            ax.arena_mut().set_kind(node, NodeKind::Index { base: new_base, index: new_index });
        }
        Evaluation::runtime(node)
    }

    fn emit(&self, ex: &mut Emitter<'_>, node: NodeId) -> Repr {
        let NodeKind::Index { base, index } = ex.arena().kind(node) else {
            compiler_bug!("index strategy bound to {}", ex.arena().kind(node).name());
        };
        ex.emit(base);
        ex.emit(index);
        ex.sink().emit_op(SinkOp::IndexGet);
        Repr::Value
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tarn_diagnostic::DiagnosticBag;
    use tarn_ir::{Span, UnitBuilder};
    use tarn_value::GuestValue;

    use super::*;
    use crate::pipeline::{compile_unit, CompileEnv};
    use crate::sink::{Inst, RecordingSink};

    #[test]
    fn plain_assignment_stores_without_a_duplicate() {
        let mut b = UnitBuilder::new("$a = 1;");
        let a = b.var("a", Span::new(0, 2));
        let one = b.int(1, Span::new(5, 6));
        let assign = b.assign(a, one, Span::new(0, 6));
        let stmt = b.expr_stmt(assign, Span::new(0, 7));
        let mut unit = b.finish(&[stmt]);

        let env = CompileEnv::new(unit.shared_interner());
        let mut bag = DiagnosticBag::new();
        let mut code = RecordingSink::new();
        compile_unit(&mut unit, &env, &mut bag, &mut code);

        let name = unit.interner().intern("a");
        assert_eq!(
            code.instructions(),
            &[Inst::Const(GuestValue::Int(1)), Inst::Store(name)],
        );
    }

    #[test]
    fn assigning_a_variable_copies_it_first() {
        let mut b = UnitBuilder::new("$a = $b;");
        let a = b.var("a", Span::new(0, 2));
        let bvar = b.var("b", Span::new(5, 7));
        let assign = b.assign(a, bvar, Span::new(0, 7));
        let stmt = b.expr_stmt(assign, Span::new(0, 8));
        let mut unit = b.finish(&[stmt]);

        let env = CompileEnv::new(unit.shared_interner());
        let mut bag = DiagnosticBag::new();
        let mut code = RecordingSink::new();
        compile_unit(&mut unit, &env, &mut bag, &mut code);

        let a_name = unit.interner().intern("a");
        let b_name = unit.interner().intern("b");
        assert_eq!(
            code.instructions(),
            &[
                Inst::Load(b_name),
                Inst::Op(SinkOp::Copy(CopyReason::Assigned)),
                Inst::Store(a_name),
            ],
        );
    }

    #[test]
    fn indexing_reads_base_then_key() {
        let mut b = UnitBuilder::new("$m[1 + 1];");
        let m = b.var("m", Span::new(0, 2));
        let one_a = b.int(1, Span::new(3, 4));
        let one_b = b.int(1, Span::new(7, 8));
        let sum = b.add(one_a, one_b, Span::new(3, 8));
        let item = b.index(m, sum, Span::new(0, 9));
        let stmt = b.expr_stmt(item, Span::new(0, 10));
        let mut unit = b.finish(&[stmt]);

        let env = CompileEnv::new(unit.shared_interner());
        let mut bag = DiagnosticBag::new();
        let mut code = RecordingSink::new();
        compile_unit(&mut unit, &env, &mut bag, &mut code);

        let name = unit.interner().intern("m");
        assert_eq!(
            code.instructions(),
            &[
                Inst::Load(name),
                Inst::Const(GuestValue::Int(2)),
                Inst::Op(SinkOp::IndexGet),
                Inst::Op(SinkOp::Pop),
            ],
        );
    }
}
