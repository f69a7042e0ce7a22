//! Statements: blocks, expression statements, `echo`.

use tarn_ir::{Access, NodeId, NodeKind};

use crate::analyzer::Analyzer;
use crate::emitter::Emitter;
use crate::eval::Evaluation;
use crate::fold::FoldContext;
use crate::registry::NodeCompiler;
use crate::sink::{Repr, SinkOp};

/// A statement sequence; every unit's root is one.
pub(crate) struct BlockCompiler;

impl NodeCompiler for BlockCompiler {
    fn fold_prior_analysis(&self, _fx: &FoldContext<'_>, node: NodeId) -> Evaluation {
        Evaluation::runtime(node)
    }

    fn analyze(&self, ax: &mut Analyzer<'_>, node: NodeId, _usage: Access) -> Evaluation {
        let NodeKind::Block(stmts) = ax.arena().kind(node) else {
            compiler_bug!("block strategy bound to {}", ax.arena().kind(node).name());
        };
        let ids: Vec<NodeId> = ax.arena().children(stmts).to_vec();
        for &stmt in &ids {
            ax.analyze(stmt, Access::None);
        }
        Evaluation::runtime(node)
    }

    fn emit(&self, ex: &mut Emitter<'_>, node: NodeId) -> Repr {
        let NodeKind::Block(stmts) = ex.arena().kind(node) else {
            compiler_bug!("block strategy bound to {}", ex.arena().kind(node).name());
        };
        let ids: Vec<NodeId> = ex.arena().children(stmts).to_vec();
        for &stmt in &ids {
            ex.emit(stmt);
        }
        Repr::None
    }
}

/// An expression evaluated for its effects; a leftover value is popped.
pub(crate) struct ExprStmtCompiler;

impl NodeCompiler for ExprStmtCompiler {
    fn fold_prior_analysis(&self, _fx: &FoldContext<'_>, node: NodeId) -> Evaluation {
        Evaluation::runtime(node)
    }

    fn analyze(&self, ax: &mut Analyzer<'_>, node: NodeId, _usage: Access) -> Evaluation {
        let NodeKind::ExprStmt(expr) = ax.arena().kind(node) else {
            compiler_bug!("statement strategy bound to {}", ax.arena().kind(node).name());
        };
        let eval = ax.analyze(expr, Access::None);
        let new_expr = ax.literalize(&eval);
        if new_expr != expr {
            ax.arena_mut().set_kind(node, NodeKind::ExprStmt(new_expr));
        }
        Evaluation::runtime(node)
    }

    fn emit(&self, ex: &mut Emitter<'_>, node: NodeId) -> Repr {
        let NodeKind::ExprStmt(expr) = ex.arena().kind(node) else {
            compiler_bug!("statement strategy bound to {}", ex.arena().kind(node).name());
        };
        if ex.emit(expr) != Repr::None {
            ex.sink().emit_op(SinkOp::Pop);
        }
        Repr::None
    }
}

/// `echo a, b, ...;` writes each value in turn.
pub(crate) struct EchoCompiler;

impl NodeCompiler for EchoCompiler {
    fn fold_prior_analysis(&self, _fx: &FoldContext<'_>, node: NodeId) -> Evaluation {
        Evaluation::runtime(node)
    }

    fn analyze(&self, ax: &mut Analyzer<'_>, node: NodeId, _usage: Access) -> Evaluation {
        let NodeKind::Echo(args) = ax.arena().kind(node) else {
            compiler_bug!("echo strategy bound to {}", ax.arena().kind(node).name());
        };
        let ids: Vec<NodeId> = ax.arena().children(args).to_vec();
        for (slot, &arg) in ids.iter().enumerate() {
            let eval = ax.analyze(arg, Access::Read);
            let new_arg = ax.literalize(&eval);
            if new_arg != arg {
                ax.arena_mut().set_child(args, slot, new_arg);
            }
        }
        Evaluation::runtime(node)
    }

    fn emit(&self, ex: &mut Emitter<'_>, node: NodeId) -> Repr {
        let NodeKind::Echo(args) = ex.arena().kind(node) else {
            compiler_bug!("echo strategy bound to {}", ex.arena().kind(node).name());
        };
        let ids: Vec<NodeId> = ex.arena().children(args).to_vec();
        for &arg in &ids {
            ex.emit(arg);
            ex.sink().emit_op(SinkOp::Echo);
        }
        Repr::None
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
    fn statement_values_are_popped_and_echoes_are_not() {
        let mut b = UnitBuilder::new("7; echo 'a', 'b';");
        let seven = b.int(7, Span::new(0, 1));
        let first = b.expr_stmt(seven, Span::new(0, 2));
        let a = b.str_lit("a", Span::new(8, 11));
        let bee = b.str_lit("b", Span::new(13, 16));
        let second = b.echo(&[a, bee], Span::new(3, 17));
        let mut unit = b.finish(&[first, second]);

        let env = CompileEnv::new(unit.shared_interner());
        let mut bag = DiagnosticBag::new();
        let mut code = RecordingSink::new();
        compile_unit(&mut unit, &env, &mut bag, &mut code);

        assert_eq!(
            code.instructions(),
            &[
                Inst::Const(GuestValue::Int(7)),
                Inst::Op(SinkOp::Pop),
                Inst::Const(GuestValue::str("a")),
                Inst::Op(SinkOp::Echo),
                Inst::Const(GuestValue::str("b")),
                Inst::Op(SinkOp::Echo),
            ],
        );
    }
}
