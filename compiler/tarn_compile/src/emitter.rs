//! The emission phase.
//!
//! [`Emitter`] walks an analyzed tree and drives a [`CodeSink`].
//! Strategies call back into [`Emitter::emit`] for their children; each
//! call leaves whatever the returned [`Repr`] says on the sink's stack.
//!
//! Emission is the last phase, and the entry point enforces the order:
//! a node that was never analyzed, or that is emitted twice, is a
//! compiler defect.

use tarn_ir::{Interner, NodeArena, NodeId, Phase, SharedInterner};

use crate::registry::compiler_for;
use crate::sink::{CodeSink, Repr};

/// Per-unit emission state and the strategy callback surface.
pub struct Emitter<'a> {
    arena: &'a mut NodeArena,
    interner: SharedInterner,
    sink: &'a mut dyn CodeSink,
}

impl<'a> Emitter<'a> {
    /// Set up emission of one analyzed unit into a sink.
    pub fn new(
        arena: &'a mut NodeArena,
        interner: SharedInterner,
        sink: &'a mut dyn CodeSink,
    ) -> Self {
        Emitter { arena, interner, sink }
    }

    /// Emit a node, returning what it left on the stack.
    ///
    /// # Panics
    /// Emitting an unanalyzed node, or the same node twice, is a
    /// compiler defect.
    pub fn emit(&mut self, node: NodeId) -> Repr {
        match self.arena.state(node).phase {
            Phase::Analyzed => {}
            Phase::Created => compiler_bug!(
                "emit before analysis of {} at {}",
                self.arena.kind(node).name(),
                self.arena.span(node),
            ),
            Phase::Emitted => compiler_bug!(
                "emit visited {} twice at {}",
                self.arena.kind(node).name(),
                self.arena.span(node),
            ),
        }
        self.arena.state_mut(node).phase = Phase::Emitted;

        compiler_for(self.arena.kind(node)).emit(self, node)
    }

    /// The unit's arena.
    #[must_use]
    pub fn arena(&self) -> &NodeArena {
        self.arena
    }

    /// The interner shared with the unit.
    #[must_use]
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// The sink being driven.
    pub fn sink(&mut self) -> &mut dyn CodeSink {
        self.sink
    }
}
