//! Binary operators and flattened concatenation chains.
//!
//! Folding needs both operands known; a known operand next to a runtime
//! one is literalized in place and the node stays runtime. The one
//! constant-aware special case is division: a constant zero divisor
//! decides the whole expression even when the dividend is unknown.

use tarn_diagnostic::{division_by_zero, shift_count_truncated, unsupported_operand_types};
use tarn_ir::{Access, BinaryOp, NodeArena, NodeId, NodeKind};
use tarn_value::ops::concat;
use tarn_value::{CoercionFlags, GuestValue};

use crate::analyzer::Analyzer;
use crate::emitter::Emitter;
use crate::eval::{apply_binary, Evaluation};
use crate::fold::FoldContext;
use crate::registry::NodeCompiler;
use crate::sink::{BranchKind, CopyReason, Repr, SinkOp};

/// Everything `left op right`, logical operators included.
pub(crate) struct BinaryCompiler;

fn binary_parts(arena: &NodeArena, node: NodeId) -> (BinaryOp, NodeId, NodeId) {
    let NodeKind::Binary { op, left, right } = arena.kind(node) else {
        compiler_bug!("binary strategy bound to {}", arena.kind(node).name());
    };
    (op, left, right)
}

/// Operators that map onto one stack operation, operands already pushed.
fn direct_op(op: BinaryOp) -> (SinkOp, Repr) {
    match op {
        BinaryOp::Add => (SinkOp::Add, Repr::Value),
        BinaryOp::Sub => (SinkOp::Sub, Repr::Value),
        BinaryOp::Mul => (SinkOp::Mul, Repr::Value),
        BinaryOp::Div => (SinkOp::Div, Repr::Value),
        BinaryOp::Mod => (SinkOp::Mod, Repr::Value),
        BinaryOp::ShiftLeft => (SinkOp::Shl, Repr::Value),
        BinaryOp::ShiftRight => (SinkOp::Shr, Repr::Value),
        BinaryOp::BitAnd => (SinkOp::BitAnd, Repr::Value),
        BinaryOp::BitOr => (SinkOp::BitOr, Repr::Value),
        BinaryOp::BitXor => (SinkOp::BitXor, Repr::Value),
        BinaryOp::Eq => (SinkOp::Eq, Repr::Bool),
        BinaryOp::NotEq => (SinkOp::NotEq, Repr::Bool),
        BinaryOp::Identical => (SinkOp::Identical, Repr::Bool),
        BinaryOp::NotIdentical => (SinkOp::NotIdentical, Repr::Bool),
        BinaryOp::Less => (SinkOp::Less, Repr::Bool),
        BinaryOp::LessEq => (SinkOp::LessEq, Repr::Bool),
        BinaryOp::Greater => (SinkOp::Greater, Repr::Bool),
        BinaryOp::GreaterEq => (SinkOp::GreaterEq, Repr::Bool),
        BinaryOp::And | BinaryOp::Or | BinaryOp::Xor | BinaryOp::Concat => {
            compiler_bug!("`{}` does not map onto one stack operation", op.symbol())
        }
    }
}

/// Short-circuit emission shared by `&&` and `||`.
///
/// The left value feeds the skip branch; when it decides the result,
/// the right operand is jumped over and the decided boolean loaded.
fn emit_short_circuit(
    ex: &mut Emitter<'_>,
    left: NodeId,
    right: NodeId,
    skip_when: BranchKind,
    skip_value: bool,
) -> Repr {
    ex.emit(left);
    let short = ex.sink().new_label();
    let end = ex.sink().new_label();
    ex.sink().branch(skip_when, short);
    ex.emit(right);
    ex.sink().emit_op(SinkOp::CastBool);
    ex.sink().branch(BranchKind::Always, end);
    ex.sink().mark_label(short);
    ex.sink().load_const(&GuestValue::Bool(skip_value));
    ex.sink().mark_label(end);
    Repr::Bool
}

/// Static type of a concatenation, from its operand types.
fn concat_repr(parts: &[Repr]) -> Repr {
    if parts.contains(&Repr::Bytes) {
        return Repr::Bytes;
    }
    let textual = parts.iter().all(|repr| {
        matches!(repr, Repr::Bool | Repr::Int | Repr::Long | Repr::Double | Repr::Str)
    });
    if textual { Repr::Str } else { Repr::Value }
}

impl NodeCompiler for BinaryCompiler {
    fn fold_prior_analysis(&self, fx: &FoldContext<'_>, node: NodeId) -> Evaluation {
        let (op, left, right) = binary_parts(fx.arena(), node);
        let (Some(l), Some(r)) = (fx.fold(left).value, fx.fold(right).value) else {
            return Evaluation::runtime(node);
        };
        let outcome = apply_binary(op, &l, &r);
        if outcome.is_clean() {
            Evaluation::known(node, outcome.value)
        } else {
            Evaluation::runtime(node)
        }
    }

    fn analyze(&self, ax: &mut Analyzer<'_>, node: NodeId, _usage: Access) -> Evaluation {
        let (op, left, right) = binary_parts(ax.arena(), node);
        let left_eval = ax.analyze(left, Access::Read);
        // Only `||` makes the right operand conditionally executed: a
        // true left never evaluates it.
        let right_eval = if op == BinaryOp::Or {
            ax.enter_conditional();
            let eval = ax.analyze(right, Access::Read);
            ax.leave_conditional();
            eval
        } else {
            ax.analyze(right, Access::Read)
        };

        if let (Some(l), Some(r)) = (&left_eval.value, &right_eval.value) {
            let outcome = apply_binary(op, l, r);
            let flags = outcome.flags;
            if flags.is_empty() {
                return Evaluation::known(node, outcome.value);
            }
            if flags.intersects(CoercionFlags::UNSUPPORTED | CoercionFlags::INCOMPARABLE) {
                let span = ax.arena().span(node);
                ax.report(unsupported_operand_types(op.symbol(), span));
            } else {
                // The value survived coercion; warn and fold anyway.
                if flags.contains(CoercionFlags::DIV_BY_ZERO) {
                    ax.report(division_by_zero(ax.arena().span(right)));
                }
                if flags.contains(CoercionFlags::SHIFT_WRAPPED) {
                    ax.report(shift_count_truncated(ax.arena().span(right)));
                }
                return Evaluation::known(node, outcome.value);
            }
        } else if matches!(op, BinaryOp::Div | BinaryOp::Mod) {
            if let Some(divisor) = &right_eval.value {
                if matches!(divisor, GuestValue::Int(0) | GuestValue::Long(0)) {
                    ax.report(division_by_zero(ax.arena().span(right)));
                    return Evaluation::known(node, GuestValue::Bool(false));
                }
            }
        }

        let new_left = ax.literalize(&left_eval);
        let new_right = ax.literalize(&right_eval);
        if new_left != left || new_right != right {
            ax.arena_mut()
                .set_kind(node, NodeKind::Binary { op, left: new_left, right: new_right });
        }
        Evaluation::runtime(node)
    }

    fn emit(&self, ex: &mut Emitter<'_>, node: NodeId) -> Repr {
        let (op, left, right) = binary_parts(ex.arena(), node);
        match op {
            BinaryOp::And => emit_short_circuit(ex, left, right, BranchKind::IfFalse, false),
            BinaryOp::Or => emit_short_circuit(ex, left, right, BranchKind::IfTrue, true),
            BinaryOp::Xor => {
                ex.emit(left);
                ex.sink().emit_op(SinkOp::CastBool);
                ex.emit(right);
                ex.sink().emit_op(SinkOp::CastBool);
                ex.sink().emit_op(SinkOp::NotEq);
                Repr::Bool
            }
            BinaryOp::Concat => {
                let l = ex.emit(left);
                let r = ex.emit(right);
                ex.sink().emit_op(SinkOp::ConcatN(2));
                concat_repr(&[l, r])
            }
            op => {
                ex.emit(left);
                ex.emit(right);
                let (sink_op, repr) = direct_op(op);
                ex.sink().emit_op(sink_op);
                repr
            }
        }
    }

    // Results are fresh scalars or fresh strings.
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

/// `a . b . c . ...`, flattened by the builder.
pub(crate) struct ConcatChainCompiler;

impl NodeCompiler for ConcatChainCompiler {
    fn fold_prior_analysis(&self, fx: &FoldContext<'_>, node: NodeId) -> Evaluation {
        let NodeKind::ConcatChain { parts } = fx.arena().kind(node) else {
            compiler_bug!("concat strategy bound to {}", fx.arena().kind(node).name());
        };
        let ids = fx.arena().children(parts);
        let mut values = Vec::with_capacity(ids.len());
        for &part in ids {
            match fx.fold(part).value {
                Some(value) => values.push(value),
                None => return Evaluation::runtime(node),
            }
        }
        Evaluation::known(node, concat::concat(&values))
    }

    fn analyze(&self, ax: &mut Analyzer<'_>, node: NodeId, _usage: Access) -> Evaluation {
        let NodeKind::ConcatChain { parts } = ax.arena().kind(node) else {
            compiler_bug!("concat strategy bound to {}", ax.arena().kind(node).name());
        };
        let ids: Vec<NodeId> = ax.arena().children(parts).to_vec();
        let mut evals = Vec::with_capacity(ids.len());
        for &part in &ids {
            evals.push(ax.analyze(part, Access::Read));
        }

        if evals.iter().all(Evaluation::has_value) {
            let values: Vec<GuestValue> = evals.iter().filter_map(|e| e.value.clone()).collect();
            return Evaluation::known(node, concat::concat(&values));
        }

        for (slot, eval) in evals.iter().enumerate() {
            let id = ax.literalize(eval);
            if id != eval.node {
                ax.arena_mut().set_child(parts, slot, id);
            }
        }
        Evaluation::runtime(node)
    }

    fn emit(&self, ex: &mut Emitter<'_>, node: NodeId) -> Repr {
        let NodeKind::ConcatChain { parts } = ex.arena().kind(node) else {
            compiler_bug!("concat strategy bound to {}", ex.arena().kind(node).name());
        };
        let ids: Vec<NodeId> = ex.arena().children(parts).to_vec();
        let mut reprs = Vec::with_capacity(ids.len());
        for &part in &ids {
            reprs.push(ex.emit(part));
        }
        ex.sink().emit_op(SinkOp::ConcatN(u32::from(parts.len)));
        concat_repr(&reprs)
    }

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

    use super::*;
    use crate::pipeline::{compile_unit, CompileEnv, CompileOutcome};
    use crate::sink::{Inst, RecordingSink};

    fn compile(
        mut unit: tarn_ir::SourceUnit,
    ) -> (CompileOutcome, DiagnosticBag, Vec<Inst>, tarn_ir::SourceUnit) {
        let env = CompileEnv::new(unit.shared_interner());
        let mut bag = DiagnosticBag::new();
        let mut code = RecordingSink::new();
        let outcome = compile_unit(&mut unit, &env, &mut bag, &mut code);
        (outcome, bag, code.into_instructions(), unit)
    }

    #[test]
    fn division_by_a_constant_zero_folds_to_false() {
        let mut b = UnitBuilder::new("$x / 0;");
        let x = b.var("x", Span::new(0, 2));
        let zero = b.int(0, Span::new(5, 6));
        let div = b.binary(BinaryOp::Div, x, zero, Span::new(0, 6));
        let stmt = b.expr_stmt(div, Span::new(0, 7));
        let unit = b.finish(&[stmt]);

        let (outcome, bag, code, _) = compile(unit);

        assert_eq!(outcome, CompileOutcome::Emitted);
        assert_eq!(code[0], Inst::Const(GuestValue::Bool(false)));
        // The warning points at the divisor, not the whole expression.
        let warned: Vec<Span> = bag
            .iter()
            .filter(|d| d.code == DiagnosticCode::W0001)
            .map(|d| d.span)
            .collect();
        assert_eq!(warned, vec![Span::new(5, 6)]);
    }

    #[test]
    fn negative_shift_counts_warn_and_still_fold() {
        let mut b = UnitBuilder::new("8 << -1;");
        let eight = b.int(8, Span::new(0, 1));
        let minus_one = b.int(-1, Span::new(5, 7));
        let shl = b.binary(BinaryOp::ShiftLeft, eight, minus_one, Span::new(0, 7));
        let stmt = b.expr_stmt(shl, Span::new(0, 8));
        let unit = b.finish(&[stmt]);

        let (outcome, bag, code, _) = compile(unit);

        assert_eq!(outcome, CompileOutcome::Emitted);
        assert_eq!(code[0], Inst::Const(GuestValue::Int(4)));
        assert!(bag.iter().any(|d| d.code == DiagnosticCode::W0002));
    }

    #[test]
    fn a_runtime_operand_is_literalized_next_to_the_constant_one() {
        let mut b = UnitBuilder::new("$x + (2 * 3);");
        let x = b.var("x", Span::new(0, 2));
        let two = b.int(2, Span::new(6, 7));
        let three = b.int(3, Span::new(10, 11));
        let mul = b.binary(BinaryOp::Mul, two, three, Span::new(6, 11));
        let add = b.add(x, mul, Span::new(0, 12));
        let stmt = b.expr_stmt(add, Span::new(0, 13));
        let unit = b.finish(&[stmt]);

        let (_, bag, code, unit) = compile(unit);

        let name = unit.interner().intern("x");
        assert_eq!(
            code,
            vec![
                Inst::Load(name),
                Inst::Const(GuestValue::Int(6)),
                Inst::Op(SinkOp::Add),
                Inst::Op(SinkOp::Pop),
            ],
        );
        // The folded multiplication keeps its source span.
        assert!(bag.iter().any(|d| {
            d.code == DiagnosticCode::N0001 && d.span == Span::new(6, 11)
        }));
    }

    #[test]
    fn constant_chains_concatenate_at_analysis_time() {
        let mut b = UnitBuilder::new("'n=' . 4 . '!';");
        let prefix = b.str_lit("n=", Span::new(0, 4));
        let four = b.int(4, Span::new(7, 8));
        let bang = b.str_lit("!", Span::new(11, 14));
        let chain = b.concat_chain(&[prefix, four, bang], Span::new(0, 14));
        let stmt = b.expr_stmt(chain, Span::new(0, 15));
        let unit = b.finish(&[stmt]);

        let (outcome, _, code, _) = compile(unit);

        assert_eq!(outcome, CompileOutcome::Emitted);
        assert_eq!(code[0], Inst::Const(GuestValue::str("n=4!")));
    }

    #[test]
    fn mixed_chains_emit_every_part_before_one_concat() {
        let mut b = UnitBuilder::new("'v' . $x;");
        let prefix = b.str_lit("v", Span::new(0, 3));
        let x = b.var("x", Span::new(6, 8));
        let chain = b.concat_chain(&[prefix, x], Span::new(0, 8));
        let stmt = b.expr_stmt(chain, Span::new(0, 9));
        let unit = b.finish(&[stmt]);

        let (_, _, code, unit) = compile(unit);

        let name = unit.interner().intern("x");
        assert_eq!(
            code,
            vec![
                Inst::Const(GuestValue::str("v")),
                Inst::Load(name),
                Inst::Op(SinkOp::ConcatN(2)),
                Inst::Op(SinkOp::Pop),
            ],
        );
    }
}
