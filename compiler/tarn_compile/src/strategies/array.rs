//! Array literals.
//!
//! An array literal builds a fresh array every time it runs, so it
//! never folds to a compile-time value; keys and values still fold
//! individually.

use tarn_ir::{Access, ArrayItem, NodeArena, NodeId, NodeKind};

use crate::analyzer::Analyzer;
use crate::emitter::Emitter;
use crate::eval::Evaluation;
use crate::fold::FoldContext;
use crate::registry::{deep_copies, NodeCompiler};
use crate::sink::{CopyReason, Repr, SinkOp};

pub(crate) struct ArrayLitCompiler;

impl NodeCompiler for ArrayLitCompiler {
    fn fold_prior_analysis(&self, _fx: &FoldContext<'_>, node: NodeId) -> Evaluation {
        Evaluation::runtime(node)
    }

    fn analyze(&self, ax: &mut Analyzer<'_>, node: NodeId, _usage: Access) -> Evaluation {
        let NodeKind::ArrayLit { items } = ax.arena().kind(node) else {
            compiler_bug!("array strategy bound to {}", ax.arena().kind(node).name());
        };
        let list: Vec<ArrayItem> = ax.arena().items(items).to_vec();
        let mut rebuilt = Vec::with_capacity(list.len());
        let mut changed = false;
        for item in &list {
            let new_key = match item.key() {
                Some(key) => {
                    let eval = ax.analyze(key, Access::Read);
                    let id = ax.literalize(&eval);
                    changed |= id != key;
                    Some(id)
                }
                None => None,
            };
            let value_eval = ax.analyze(item.value, Access::Read);
            let new_value = ax.literalize(&value_eval);
            changed |= new_value != item.value;
            rebuilt.push(match new_key {
                Some(key) => ArrayItem::keyed(key, new_value),
                None => ArrayItem::unkeyed(new_value),
            });
        }
        // Item lists are immutable once pushed; a rewrite gets a fresh
        // list and the node points at it.
        if changed {
            let range = ax.arena_mut().push_items(&rebuilt);
            ax.arena_mut().set_kind(node, NodeKind::ArrayLit { items: range });
        }
        Evaluation::runtime(node)
    }

    fn emit(&self, ex: &mut Emitter<'_>, node: NodeId) -> Repr {
        let NodeKind::ArrayLit { items } = ex.arena().kind(node) else {
            compiler_bug!("array strategy bound to {}", ex.arena().kind(node).name());
        };
        let list: Vec<ArrayItem> = ex.arena().items(items).to_vec();
        ex.sink().emit_op(SinkOp::MakeArray(u32::from(items.len)));
        for item in &list {
            match item.key() {
                Some(key) => {
                    ex.emit(key);
                    ex.emit(item.value);
                    if deep_copies(ex.arena(), item.value, CopyReason::Assigned) {
                        ex.sink().emit_op(SinkOp::Copy(CopyReason::Assigned));
                    }
                    ex.sink().emit_op(SinkOp::ArrayInsert);
                }
                None => {
                    ex.emit(item.value);
                    if deep_copies(ex.arena(), item.value, CopyReason::Assigned) {
                        ex.sink().emit_op(SinkOp::Copy(CopyReason::Assigned));
                    }
                    ex.sink().emit_op(SinkOp::ArrayAppend);
                }
            }
        }
        Repr::Array
    }

    // Always freshly built; assignment can take it as is.
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
    use tarn_diagnostic::DiagnosticBag;
    use tarn_ir::{Span, UnitBuilder};
    use tarn_value::GuestValue;

    use super::*;
    use crate::pipeline::{compile_unit, CompileEnv, CompileOutcome};
    use crate::sink::{Inst, RecordingSink};

    #[test]
    fn items_build_in_source_order_with_folded_keys() {
        let mut b = UnitBuilder::new("$a = [2 + 3 => $v, 'tag'];");
        let a = b.var("a", Span::new(0, 2));
        let two = b.int(2, Span::new(6, 7));
        let three = b.int(3, Span::new(10, 11));
        let sum = b.add(two, three, Span::new(6, 11));
        let v = b.var("v", Span::new(15, 17));
        let tag = b.str_lit("tag", Span::new(19, 24));
        let arr = b.array_lit(
            &[ArrayItem::keyed(sum, v), ArrayItem::unkeyed(tag)],
            Span::new(5, 25),
        );
        let assign = b.assign(a, arr, Span::new(0, 25));
        let stmt = b.expr_stmt(assign, Span::new(0, 26));
        let mut unit = b.finish(&[stmt]);

        let env = CompileEnv::new(unit.shared_interner());
        let mut bag = DiagnosticBag::new();
        let mut code = RecordingSink::new();
        let outcome = compile_unit(&mut unit, &env, &mut bag, &mut code);

        assert_eq!(outcome, CompileOutcome::Emitted);
        let a_name = unit.interner().intern("a");
        let v_name = unit.interner().intern("v");
        assert_eq!(
            code.instructions(),
            &[
                Inst::Op(SinkOp::MakeArray(2)),
                Inst::Const(GuestValue::Int(5)),
                Inst::Load(v_name),
                Inst::Op(SinkOp::Copy(CopyReason::Assigned)),
                Inst::Op(SinkOp::ArrayInsert),
                Inst::Const(GuestValue::str("tag")),
                Inst::Op(SinkOp::ArrayAppend),
                Inst::Store(a_name),
            ],
        );
    }
}
