//! The analysis phase.
//!
//! [`Analyzer`] owns everything one unit's analysis needs: the mutable
//! arena, the shared interner, the ambient environment, the diagnostic
//! sink, and the unit-level constant table built up as declarations are
//! met. Strategies call back into [`Analyzer::analyze`] for their
//! children and into [`Analyzer::literalize`] to commit a fold.
//!
//! Analysis runs exactly once per node. The entry point checks the
//! node's phase and treats a repeat visit as a compiler defect, not a
//! diagnostic: the guest program cannot cause it, only a broken strategy
//! can.

use rustc_hash::FxHashMap;
use tarn_diagnostic::{constant_expression_folded, Diagnostic, DiagnosticSink};
use tarn_ir::{Access, Interner, Name, NodeArena, NodeId, Phase, SharedInterner, Span};
use tarn_value::GuestValue;

use crate::eval::Evaluation;
use crate::pipeline::CompileEnv;
use crate::registry::compiler_for;

/// One unit-level constant declaration.
///
/// `value` is `None` when the initializer did not fold; uses of such a
/// constant stay runtime but still resolve.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstEntry {
    /// Where the constant was declared, for duplicate reports.
    pub span: Span,
    /// The folded initializer, when there is one.
    pub value: Option<GuestValue>,
}

/// Per-unit analysis state and the strategy callback surface.
pub struct Analyzer<'a> {
    arena: &'a mut NodeArena,
    interner: SharedInterner,
    env: &'a CompileEnv,
    sink: &'a mut dyn DiagnosticSink,
    consts: FxHashMap<Name, ConstEntry>,
    conditional_level: u32,
}

impl<'a> Analyzer<'a> {
    /// Set up analysis of one unit against an environment.
    pub fn new(
        arena: &'a mut NodeArena,
        interner: SharedInterner,
        env: &'a CompileEnv,
        sink: &'a mut dyn DiagnosticSink,
    ) -> Self {
        Analyzer {
            arena,
            interner,
            env,
            sink,
            consts: FxHashMap::default(),
            conditional_level: 0,
        }
    }

    /// Analyze a node, threading the parent's usage down.
    ///
    /// Records the access and advances the phase before dispatching, so
    /// the strategy sees its own node already in `Phase::Analyzed`.
    ///
    /// # Panics
    /// A second visit of the same node is a compiler defect.
    pub fn analyze(&mut self, node: NodeId, usage: Access) -> Evaluation {
        if self.arena.state(node).phase != Phase::Created {
            compiler_bug!(
                "analyze visited {} twice at {}",
                self.arena.kind(node).name(),
                self.arena.span(node),
            );
        }
        let state = self.arena.state_mut(node);
        state.access = usage;
        state.phase = Phase::Analyzed;

        compiler_for(self.arena.kind(node)).analyze(self, node, usage)
    }

    /// Commit a child's evaluation, rewriting it to a literal if valued.
    ///
    /// The fresh literal inherits the child's access and counts as
    /// analyzed; the rewrite is reported as a
    /// [`constant_expression_folded`] note. The caller stores the
    /// returned id into its own kind.
    #[must_use = "the replacement id must be stored back into the parent"]
    pub fn literalize(&mut self, eval: &Evaluation) -> NodeId {
        let replacement = eval.literalize(self.arena, &self.interner);
        if replacement != eval.node {
            let state = self.arena.state(eval.node);
            let fresh = self.arena.state_mut(replacement);
            fresh.access = state.access;
            fresh.phase = Phase::Analyzed;
            self.sink.report(constant_expression_folded(self.arena.span(eval.node)));
        }
        replacement
    }

    /// The unit's arena.
    #[must_use]
    pub fn arena(&self) -> &NodeArena {
        self.arena
    }

    /// The unit's arena, for kind rewrites.
    pub fn arena_mut(&mut self) -> &mut NodeArena {
        self.arena
    }

    /// The interner shared by the unit and the environment.
    #[must_use]
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// The ambient compilation environment.
    #[must_use]
    pub fn env(&self) -> &CompileEnv {
        self.env
    }

    /// Report a diagnostic and keep analyzing.
    pub fn report(&mut self, diag: Diagnostic) {
        self.sink.report(diag);
    }

    /// Enter a region that only runs under a runtime condition.
    pub fn enter_conditional(&mut self) {
        self.conditional_level += 1;
    }

    /// Leave a conditionally executed region.
    ///
    /// # Panics
    /// Leaving more regions than were entered is a compiler defect.
    pub fn leave_conditional(&mut self) {
        if self.conditional_level == 0 {
            compiler_bug!("left a conditional region that was never entered");
        }
        self.conditional_level -= 1;
    }

    /// Nesting depth of conditionally executed code at this point of
    /// the walk.
    #[must_use]
    pub fn conditional_level(&self) -> u32 {
        self.conditional_level
    }

    /// Record a unit-level constant declaration.
    pub fn declare_const(&mut self, name: Name, entry: ConstEntry) {
        self.consts.insert(name, entry);
    }

    /// Look up a unit-level constant declared earlier in the walk.
    ///
    /// Returns a clone; entries are small and this keeps strategy code
    /// free of borrow gymnastics.
    #[must_use]
    pub fn resolve_const(&self, name: Name) -> Option<ConstEntry> {
        self.consts.get(&name).cloned()
    }
}
