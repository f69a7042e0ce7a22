//! Named constants: declarations and uses.
//!
//! Resolution is order-sensitive within a unit, the way runtime
//! definition would be: a use resolves against declarations analyzed
//! before it, then against the environment. A unit declaration shadows
//! an environment constant of the same name.

use tarn_diagnostic::{duplicate_constant, unresolved_constant};
use tarn_ir::{Access, NodeArena, NodeId, NodeKind};

use crate::analyzer::{Analyzer, ConstEntry};
use crate::emitter::Emitter;
use crate::eval::Evaluation;
use crate::fold::FoldContext;
use crate::registry::{deep_copies, NodeCompiler};
use crate::sink::{CopyReason, Repr, SinkOp};

/// A constant read by name.
pub(crate) struct ConstUseCompiler;

impl NodeCompiler for ConstUseCompiler {
    fn fold_prior_analysis(&self, _fx: &FoldContext<'_>, node: NodeId) -> Evaluation {
        // Resolution needs analysis state; before that the name is
        // opaque.
        Evaluation::runtime(node)
    }

    fn analyze(&self, ax: &mut Analyzer<'_>, node: NodeId, _usage: Access) -> Evaluation {
        let NodeKind::ConstUse(name) = ax.arena().kind(node) else {
            compiler_bug!("constant-use strategy bound to {}", ax.arena().kind(node).name());
        };
        if let Some(entry) = ax.resolve_const(name) {
            return match entry.value {
                Some(value) => Evaluation::known(node, value),
                None => Evaluation::runtime(node),
            };
        }
        if let Some(value) = ax.env().constant(name).cloned() {
            return Evaluation::known(node, value);
        }
        let text = ax.interner().lookup(name);
        ax.report(unresolved_constant(text, ax.arena().span(node)));
        Evaluation::runtime(node)
    }

    fn emit(&self, ex: &mut Emitter<'_>, node: NodeId) -> Repr {
        // Only reachable for a unit constant whose initializer stayed
        // runtime; its declaration stored the value under the name.
        let NodeKind::ConstUse(name) = ex.arena().kind(node) else {
            compiler_bug!("constant-use strategy bound to {}", ex.arena().kind(node).name());
        };
        ex.sink().load_var(name);
        Repr::Value
    }

    // Constants hold immutable values.
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

/// `const NAME = init;`.
pub(crate) struct ConstDeclCompiler;

impl NodeCompiler for ConstDeclCompiler {
    fn fold_prior_analysis(&self, _fx: &FoldContext<'_>, node: NodeId) -> Evaluation {
        Evaluation::runtime(node)
    }

    fn analyze(&self, ax: &mut Analyzer<'_>, node: NodeId, _usage: Access) -> Evaluation {
        let NodeKind::ConstDecl { name, init } = ax.arena().kind(node) else {
            compiler_bug!("constant-decl strategy bound to {}", ax.arena().kind(node).name());
        };
        let init_eval = ax.analyze(init, Access::Read);
        let new_init = ax.literalize(&init_eval);
        if new_init != init {
            ax.arena_mut().set_kind(node, NodeKind::ConstDecl { name, init: new_init });
        }

        let span = ax.arena().span(node);
        if let Some(first) = ax.resolve_const(name) {
            let text = ax.interner().lookup(name);
            ax.report(duplicate_constant(text, first.span, span));
        } else {
            // An unfoldable initializer still declares the name; uses
            // just stay runtime.
            ax.declare_const(name, ConstEntry { span, value: init_eval.value });
        }
        Evaluation::runtime(node)
    }

    fn emit(&self, ex: &mut Emitter<'_>, node: NodeId) -> Repr {
        let NodeKind::ConstDecl { name, init } = ex.arena().kind(node) else {
            compiler_bug!("constant-decl strategy bound to {}", ex.arena().kind(node).name());
        };
        ex.emit(init);
        if deep_copies(ex.arena(), init, CopyReason::Assigned) {
            ex.sink().emit_op(SinkOp::Copy(CopyReason::Assigned));
        }
        ex.sink().store_var(name);
        Repr::None
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tarn_diagnostic::{DiagnosticBag, DiagnosticCode};
    use tarn_ir::{BinaryOp, Span, UnitBuilder};
    use tarn_value::GuestValue;

    use super::*;
    use crate::pipeline::{compile_unit, CompileEnv, CompileOutcome};
    use crate::sink::{Inst, RecordingSink};

    fn compile(
        unit: &mut tarn_ir::SourceUnit,
        env: &CompileEnv,
    ) -> (CompileOutcome, DiagnosticBag, Vec<Inst>) {
        let mut bag = DiagnosticBag::new();
        let mut code = RecordingSink::new();
        let outcome = compile_unit(unit, env, &mut bag, &mut code);
        (outcome, bag, code.into_instructions())
    }

    #[test]
    fn declared_constants_inline_into_later_uses() {
        let mut b = UnitBuilder::new("const N = 6 * 7; echo N;");
        let six = b.int(6, Span::new(10, 11));
        let seven = b.int(7, Span::new(14, 15));
        let product = b.binary(BinaryOp::Mul, six, seven, Span::new(10, 15));
        let decl = b.const_decl("N", product, Span::new(0, 16));
        let n = b.const_use("N", Span::new(22, 23));
        let say = b.echo(&[n], Span::new(17, 24));
        let mut unit = b.finish(&[decl, say]);

        let env = CompileEnv::new(unit.shared_interner());
        let (outcome, _, code) = compile(&mut unit, &env);

        assert_eq!(outcome, CompileOutcome::Emitted);
        let name = unit.interner().intern("N");
        assert_eq!(
            code,
            vec![
                Inst::Const(GuestValue::Int(42)),
                Inst::Store(name),
                Inst::Const(GuestValue::Int(42)),
                Inst::Op(SinkOp::Echo),
            ],
        );
    }

    #[test]
    fn use_before_declaration_is_unresolved() {
        let mut b = UnitBuilder::new("echo N; const N = 1;");
        let n = b.const_use("N", Span::new(5, 6));
        let say = b.echo(&[n], Span::new(0, 7));
        let one = b.int(1, Span::new(18, 19));
        let decl = b.const_decl("N", one, Span::new(8, 20));
        let mut unit = b.finish(&[say, decl]);

        let env = CompileEnv::new(unit.shared_interner());
        let (outcome, bag, _) = compile(&mut unit, &env);

        assert_eq!(outcome, CompileOutcome::Suppressed);
        assert!(bag.iter().any(|d| d.code == DiagnosticCode::E0001));
    }

    #[test]
    fn redeclaring_keeps_the_first_binding() {
        let mut b = UnitBuilder::new("const N = 1; const N = 2; echo N;");
        let one = b.int(1, Span::new(10, 11));
        let first = b.const_decl("N", one, Span::new(0, 12));
        let two = b.int(2, Span::new(23, 24));
        let second = b.const_decl("N", two, Span::new(13, 25));
        let n = b.const_use("N", Span::new(31, 32));
        let say = b.echo(&[n], Span::new(26, 33));
        let mut unit = b.finish(&[first, second, say]);

        let env = CompileEnv::new(unit.shared_interner());
        let (outcome, bag, _) = compile(&mut unit, &env);

        assert_eq!(outcome, CompileOutcome::Suppressed);
        let dup: Vec<&tarn_diagnostic::Diagnostic> =
            bag.iter().filter(|d| d.code == DiagnosticCode::E0004).collect();
        assert_eq!(dup.len(), 1);
        assert_eq!(dup[0].span, Span::new(13, 25));
        // The note leads back to the first declaration.
        assert_eq!(dup[0].notes[0].1, Span::new(0, 12));
    }

    #[test]
    fn unit_declarations_shadow_the_environment() {
        let mut b = UnitBuilder::new("const LIMIT = 2; echo LIMIT;");
        let two = b.int(2, Span::new(14, 15));
        let decl = b.const_decl("LIMIT", two, Span::new(0, 16));
        let limit = b.const_use("LIMIT", Span::new(22, 27));
        let say = b.echo(&[limit], Span::new(17, 28));
        let mut unit = b.finish(&[decl, say]);

        let mut env = CompileEnv::new(unit.shared_interner());
        env.define_constant("LIMIT", GuestValue::Int(9));
        let (outcome, bag, code) = compile(&mut unit, &env);

        assert_eq!(outcome, CompileOutcome::Emitted);
        assert!(!bag.has_errors());
        let name = unit.interner().intern("LIMIT");
        assert_eq!(
            code,
            vec![
                Inst::Const(GuestValue::Int(2)),
                Inst::Store(name),
                Inst::Const(GuestValue::Int(2)),
                Inst::Op(SinkOp::Echo),
            ],
        );
    }

    #[test]
    fn environment_constants_resolve_without_declarations() {
        let mut b = UnitBuilder::new("echo VERSION;");
        let version = b.const_use("VERSION", Span::new(5, 12));
        let say = b.echo(&[version], Span::new(0, 13));
        let mut unit = b.finish(&[say]);

        let mut env = CompileEnv::new(unit.shared_interner());
        env.define_constant("VERSION", GuestValue::str("1.4"));
        let (outcome, _, code) = compile(&mut unit, &env);

        assert_eq!(outcome, CompileOutcome::Emitted);
        assert_eq!(
            code,
            vec![Inst::Const(GuestValue::str("1.4")), Inst::Op(SinkOp::Echo)],
        );
    }
}
