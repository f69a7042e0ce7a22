//! Node compilation for Tarn source units.
//!
//! Every node kind is handled by a strategy implementing
//! [`NodeCompiler`], resolved through a fixed dispatch table. A unit
//! moves through three phases in order:
//!
//! 1. **Pre-analysis folding** ([`fold_expr`]) — a read-only attempt to
//!    evaluate an expression before analysis has run, used for things
//!    like constant initializers. Nothing is rewritten or reported.
//! 2. **Analysis** ([`Analyzer`]) — the single mutating walk. Usage
//!    flows down as [`tarn_ir::Access`], evaluations flow back up, and
//!    subtrees whose value is known are rewritten to literals.
//! 3. **Emission** ([`Emitter`]) — drives a [`CodeSink`] from the
//!    analyzed tree. Phase state written during analysis makes skipping
//!    or repeating a phase a detectable defect.
//!
//! [`compile_unit`] runs analysis and emission back to back and
//! suppresses emission when analysis reported errors; [`compile_batch`]
//! does that for many units in parallel.

#[macro_export]
macro_rules! compiler_bug {
    ($($arg:tt)*) => {
        panic!("compiler bug: {}", format_args!($($arg)*))
    };
}

pub mod analyzer;
pub mod emitter;
pub mod eval;
pub mod fold;
pub mod pipeline;
pub mod registry;
pub mod sink;

mod strategies;

pub use analyzer::{Analyzer, ConstEntry};
pub use emitter::Emitter;
pub use eval::{apply_binary, apply_unary, Evaluation};
pub use fold::{fold_expr, FoldContext};
pub use pipeline::{
    compile_batch, compile_unit, CompileEnv, CompileOutcome, FunctionSig, UnitOutput,
};
pub use registry::{compiler_for, deep_copies, NodeCompiler};
pub use sink::{
    BranchKind, CodeSink, CopyReason, Inst, Label, RecordingSink, Repr, SinkOp,
};
