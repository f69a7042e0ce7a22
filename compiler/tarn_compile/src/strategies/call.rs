//! Direct function calls.
//!
//! Callees resolve against the environment's signature table; calls
//! never fold, even with constant arguments, since a function body is
//! outside the unit.

use tarn_diagnostic::{unresolved_function, wrong_argument_count};
use tarn_ir::{Access, NodeArena, NodeId, NodeKind};

use crate::analyzer::Analyzer;
use crate::emitter::Emitter;
use crate::eval::Evaluation;
use crate::fold::FoldContext;
use crate::registry::{deep_copies, NodeCompiler};
use crate::sink::{CopyReason, Repr, SinkOp};

pub(crate) struct CallCompiler;

impl NodeCompiler for CallCompiler {
    fn fold_prior_analysis(&self, _fx: &FoldContext<'_>, node: NodeId) -> Evaluation {
        Evaluation::runtime(node)
    }

    fn analyze(&self, ax: &mut Analyzer<'_>, node: NodeId, _usage: Access) -> Evaluation {
        let NodeKind::Call { callee, args } = ax.arena().kind(node) else {
            compiler_bug!("call strategy bound to {}", ax.arena().kind(node).name());
        };
        let text = ax.interner().lookup(callee);
        let span = ax.arena().span(node);
        let got = ax.arena().children(args).len();
        match ax.env().function(callee).copied() {
            None => ax.report(unresolved_function(text, span)),
            Some(sig) => {
                let expected = sig.min_args as usize..=sig.max_args as usize;
                if !expected.contains(&got) {
                    ax.report(wrong_argument_count(
                        text,
                        (sig.min_args, sig.max_args),
                        got,
                        span,
                    ));
                }
            }
        }

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
        let NodeKind::Call { callee, args } = ex.arena().kind(node) else {
            compiler_bug!("call strategy bound to {}", ex.arena().kind(node).name());
        };
        let ids: Vec<NodeId> = ex.arena().children(args).to_vec();
        let mut reprs = Vec::with_capacity(ids.len());
        for &arg in &ids {
            let repr = ex.emit(arg);
            if deep_copies(ex.arena(), arg, CopyReason::PassedByValue) {
                ex.sink().emit_op(SinkOp::Copy(CopyReason::PassedByValue));
            }
            reprs.push(repr);
        }
        ex.sink().call(callee, &reprs);
        Repr::Value
    }

    // Return values come back fresh from the callee frame.
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

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tarn_diagnostic::{DiagnosticBag, DiagnosticCode};
    use tarn_ir::{Span, UnitBuilder};
    use tarn_value::GuestValue;

    use super::*;
    use crate::pipeline::{compile_unit, CompileEnv, CompileOutcome};
    use crate::sink::{Inst, RecordingSink};

    #[test]
    fn arguments_fold_and_variables_copy_on_the_way_in() {
        let mut b = UnitBuilder::new("tally(1 + 2, $rows);");
        let one = b.int(1, Span::new(6, 7));
        let two = b.int(2, Span::new(10, 11));
        let sum = b.add(one, two, Span::new(6, 11));
        let rows = b.var("rows", Span::new(13, 18));
        let call = b.call("tally", &[sum, rows], Span::new(0, 19));
        let stmt = b.expr_stmt(call, Span::new(0, 20));
        let mut unit = b.finish(&[stmt]);

        let mut env = CompileEnv::new(unit.shared_interner());
        env.declare_function("tally", 2, 2);
        let mut bag = DiagnosticBag::new();
        let mut code = RecordingSink::new();
        let outcome = compile_unit(&mut unit, &env, &mut bag, &mut code);

        assert_eq!(outcome, CompileOutcome::Emitted);
        let tally = unit.interner().intern("tally");
        let rows_name = unit.interner().intern("rows");
        assert_eq!(
            code.instructions(),
            &[
                Inst::Const(GuestValue::Int(3)),
                Inst::Load(rows_name),
                Inst::Op(SinkOp::Copy(CopyReason::PassedByValue)),
                Inst::Call(tally, vec![Repr::Int, Repr::Value]),
                Inst::Op(SinkOp::Pop),
            ],
        );
    }

    #[test]
    fn unknown_callees_are_errors() {
        let mut b = UnitBuilder::new("mystery();");
        let call = b.call("mystery", &[], Span::new(0, 9));
        let stmt = b.expr_stmt(call, Span::new(0, 10));
        let mut unit = b.finish(&[stmt]);

        let env = CompileEnv::new(unit.shared_interner());
        let mut bag = DiagnosticBag::new();
        let mut code = RecordingSink::new();
        let outcome = compile_unit(&mut unit, &env, &mut bag, &mut code);

        assert_eq!(outcome, CompileOutcome::Suppressed);
        assert!(bag.iter().any(|d| d.code == DiagnosticCode::E0002));
    }

    #[test]
    fn arity_is_checked_against_the_declared_range() {
        let mut b = UnitBuilder::new("pad('x');");
        let x = b.str_lit("x", Span::new(4, 7));
        let call = b.call("pad", &[x], Span::new(0, 8));
        let stmt = b.expr_stmt(call, Span::new(0, 9));
        let mut unit = b.finish(&[stmt]);

        let mut env = CompileEnv::new(unit.shared_interner());
        env.declare_function("pad", 2, 3);
        let mut bag = DiagnosticBag::new();
        let mut code = RecordingSink::new();
        let outcome = compile_unit(&mut unit, &env, &mut bag, &mut code);

        assert_eq!(outcome, CompileOutcome::Suppressed);
        let counts: Vec<&str> = bag
            .iter()
            .filter(|d| d.code == DiagnosticCode::E0003)
            .map(|d| d.message.as_str())
            .collect();
        assert_eq!(counts, vec!["function `pad` expects 2 to 3 arguments, 1 given"]);
    }
}
