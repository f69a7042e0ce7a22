//! Literal nodes: their kind is their value.

use tarn_ir::{Access, Interner, NodeArena, NodeId, NodeKind};
use tarn_value::GuestValue;

use crate::analyzer::Analyzer;
use crate::emitter::Emitter;
use crate::eval::Evaluation;
use crate::fold::FoldContext;
use crate::registry::NodeCompiler;
use crate::sink::{CopyReason, Repr};

/// Serves all seven literal kinds.
pub(crate) struct LiteralCompiler;

fn value_of(arena: &NodeArena, interner: &Interner, node: NodeId) -> GuestValue {
    match arena.kind(node) {
        NodeKind::NullLit => GuestValue::Null,
        NodeKind::BoolLit(value) => GuestValue::Bool(value),
        NodeKind::IntLit(value) => GuestValue::Int(value),
        NodeKind::LongLit(value) => GuestValue::Long(value),
        NodeKind::DoubleLit(bits) => GuestValue::Double(f64::from_bits(bits)),
        NodeKind::StrLit(name) => GuestValue::str(interner.lookup(name)),
        NodeKind::BytesLit(blob) => GuestValue::bytes(arena.blob(blob)),
        other => compiler_bug!("{} is not a literal", other.name()),
    }
}

fn repr_of(kind: NodeKind) -> Repr {
    match kind {
        NodeKind::NullLit => Repr::Value,
        NodeKind::BoolLit(_) => Repr::Bool,
        NodeKind::IntLit(_) => Repr::Int,
        NodeKind::LongLit(_) => Repr::Long,
        NodeKind::DoubleLit(_) => Repr::Double,
        NodeKind::StrLit(_) => Repr::Str,
        NodeKind::BytesLit(_) => Repr::Bytes,
        other => compiler_bug!("{} is not a literal", other.name()),
    }
}

impl NodeCompiler for LiteralCompiler {
    fn fold_prior_analysis(&self, fx: &FoldContext<'_>, node: NodeId) -> Evaluation {
        Evaluation::known(node, value_of(fx.arena(), fx.interner(), node))
    }

    fn analyze(&self, ax: &mut Analyzer<'_>, node: NodeId, _usage: Access) -> Evaluation {
        let value = value_of(ax.arena(), ax.interner(), node);
        Evaluation::known(node, value)
    }

    fn emit(&self, ex: &mut Emitter<'_>, node: NodeId) -> Repr {
        let value = value_of(ex.arena(), ex.interner(), node);
        let repr = repr_of(ex.arena().kind(node));
        ex.sink().load_const(&value);
        repr
    }

    // Literal values are immutable; nothing to protect.
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
