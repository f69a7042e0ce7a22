//! Speculative folding before analysis.
//!
//! Embedders sometimes need a constant answer from an expression that has
//! not been analyzed yet, typically to resolve a compile-time input the
//! rest of compilation depends on. [`fold_expr`] walks the node through
//! the strategy registry's `fold_prior_analysis` phase: pure, context
//! free, and side-effect free. It rewrites nothing, reports nothing, and
//! leaves every per-node state untouched, so running it (or not, or
//! twice) never changes what analysis later does.

use tarn_ir::{Interner, NodeArena, NodeId, SourceUnit};

use crate::eval::Evaluation;
use crate::registry::compiler_for;

/// Read-only view of a unit for speculative folding.
pub struct FoldContext<'a> {
    arena: &'a NodeArena,
    interner: &'a Interner,
}

impl<'a> FoldContext<'a> {
    /// The unit's arena.
    #[must_use]
    pub fn arena(&self) -> &'a NodeArena {
        self.arena
    }

    /// The unit's interner.
    #[must_use]
    pub fn interner(&self) -> &'a Interner {
        self.interner
    }

    /// Fold a child node.
    #[must_use]
    pub fn fold(&self, node: NodeId) -> Evaluation {
        compiler_for(self.arena.kind(node)).fold_prior_analysis(self, node)
    }
}

/// Speculatively fold one expression of an unanalyzed unit.
///
/// Self-evidently constant shapes (literals, and operator trees over
/// them) come back valued; everything else comes back
/// [`Evaluation::runtime`].
#[must_use]
pub fn fold_expr(unit: &SourceUnit, node: NodeId) -> Evaluation {
    FoldContext { arena: &unit.arena, interner: unit.interner() }.fold(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tarn_ir::{BinaryOp, Phase, Span, UnaryOp, UnitBuilder};
    use tarn_value::GuestValue;

    #[test]
    fn folds_literal_operator_trees() {
        let mut b = UnitBuilder::new("-(2 * 3) . \"!\"");
        let two = b.int(2, Span::new(2, 3));
        let three = b.int(3, Span::new(6, 7));
        let product = b.binary(BinaryOp::Mul, two, three, Span::new(2, 7));
        let negated = b.unary(UnaryOp::Minus, product, Span::new(0, 8));
        let bang = b.str_lit("!", Span::new(11, 14));
        let joined = b.binary(BinaryOp::Concat, negated, bang, Span::new(0, 14));
        let unit = b.finish(&[]);

        let eval = fold_expr(&unit, joined);
        assert_eq!(eval.value, Some(GuestValue::str("-6!")));
    }

    #[test]
    fn refuses_anything_with_a_runtime_leaf() {
        let mut b = UnitBuilder::new("1 + $x");
        let one = b.int(1, Span::new(0, 1));
        let x = b.var("x", Span::new(4, 6));
        let sum = b.add(one, x, Span::new(0, 6));
        let unit = b.finish(&[]);

        assert_eq!(fold_expr(&unit, sum).value, None);
    }

    #[test]
    fn refuses_degraded_constant_outcomes() {
        // 1/0 has a total answer, but folding it would swallow the
        // warning analysis owes.
        let mut b = UnitBuilder::new("1 / 0");
        let one = b.int(1, Span::new(0, 1));
        let zero = b.int(0, Span::new(4, 5));
        let quotient = b.binary(BinaryOp::Div, one, zero, Span::new(0, 5));
        let unit = b.finish(&[]);

        assert_eq!(fold_expr(&unit, quotient).value, None);
    }

    #[test]
    fn folds_only_the_taken_conditional_branch() {
        let mut b = UnitBuilder::new("0 ? $x : 9");
        let zero = b.int(0, Span::new(0, 1));
        let x = b.var("x", Span::new(4, 6));
        let nine = b.int(9, Span::new(9, 10));
        let pick = b.conditional(zero, x, nine, Span::new(0, 10));
        let unit = b.finish(&[]);

        assert_eq!(fold_expr(&unit, pick).value, Some(GuestValue::Int(9)));
    }

    #[test]
    fn leaves_node_states_untouched() {
        let mut b = UnitBuilder::new("1 + 2");
        let one = b.int(1, Span::new(0, 1));
        let two = b.int(2, Span::new(4, 5));
        let sum = b.add(one, two, Span::new(0, 5));
        let unit = b.finish(&[]);

        let _ = fold_expr(&unit, sum);
        for node in [one, two, sum] {
            assert_eq!(unit.arena.state(node).phase, Phase::Created);
        }
    }
}
