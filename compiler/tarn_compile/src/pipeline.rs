//! The unit pipeline: environment, analyze-then-emit, batch runs.

use std::sync::Arc;

use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tarn_diagnostic::{Diagnostic, DiagnosticBag, DiagnosticSink};
use tarn_ir::{Access, Interner, Name, SharedInterner, SourceUnit};
use tarn_value::GuestValue;

use crate::analyzer::Analyzer;
use crate::emitter::Emitter;
use crate::sink::{CodeSink, Inst, RecordingSink};

/// Declared shape of a callable function.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FunctionSig {
    pub name: Name,
    /// Fewest arguments a call may pass.
    pub min_args: u32,
    /// Most arguments a call may pass.
    pub max_args: u32,
}

/// Ambient context shared by every unit of a compilation.
///
/// Holds the interner all units must share, plus the constants and
/// function signatures the host makes available. Read-only during
/// compilation, so a batch can borrow it from every worker at once.
pub struct CompileEnv {
    interner: SharedInterner,
    constants: FxHashMap<Name, GuestValue>,
    functions: FxHashMap<Name, FunctionSig>,
}

impl CompileEnv {
    #[must_use]
    pub fn new(interner: SharedInterner) -> Self {
        CompileEnv {
            interner,
            constants: FxHashMap::default(),
            functions: FxHashMap::default(),
        }
    }

    /// The interner units compiled against this environment must use.
    #[must_use]
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// A handle on the interner, for building units.
    #[must_use]
    pub fn shared_interner(&self) -> SharedInterner {
        Arc::clone(&self.interner)
    }

    /// Make a constant visible to every unit.
    pub fn define_constant(&mut self, name: &str, value: GuestValue) {
        let name = self.interner.intern(name);
        self.constants.insert(name, value);
    }

    /// Declare a callable function and its arity range.
    pub fn declare_function(&mut self, name: &str, min_args: u32, max_args: u32) {
        let name = self.interner.intern(name);
        self.functions.insert(name, FunctionSig { name, min_args, max_args });
    }

    #[must_use]
    pub fn constant(&self, name: Name) -> Option<&GuestValue> {
        self.constants.get(&name)
    }

    #[must_use]
    pub fn function(&self, name: Name) -> Option<&FunctionSig> {
        self.functions.get(&name)
    }
}

/// How [`compile_unit`] ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CompileOutcome {
    /// Analysis was clean enough; code went to the sink.
    Emitted,
    /// Analysis reported errors; nothing went to the sink.
    Suppressed,
}

/// Counts errors on the way past, so the pipeline knows whether the
/// analyzed tree is sound enough to emit.
struct TrackingSink<'a> {
    inner: &'a mut dyn DiagnosticSink,
    errors: usize,
}

impl DiagnosticSink for TrackingSink<'_> {
    fn report(&mut self, diag: Diagnostic) {
        if diag.is_error() {
            self.errors += 1;
        }
        self.inner.report(diag);
    }
}

/// Compile one unit: analyze, then emit unless analysis errored.
///
/// Warnings and notes never block emission; any error does, leaving the
/// sink untouched.
pub fn compile_unit(
    unit: &mut SourceUnit,
    env: &CompileEnv,
    diagnostics: &mut dyn DiagnosticSink,
    code: &mut dyn CodeSink,
) -> CompileOutcome {
    let mut tracking = TrackingSink { inner: diagnostics, errors: 0 };
    analyze_unit(unit, env, &mut tracking);
    if tracking.errors > 0 {
        return CompileOutcome::Suppressed;
    }
    emit_unit(unit, code);
    CompileOutcome::Emitted
}

#[tracing::instrument(level = "debug", skip_all)]
fn analyze_unit(unit: &mut SourceUnit, env: &CompileEnv, sink: &mut dyn DiagnosticSink) {
    let interner = unit.shared_interner();
    let root = unit.root;
    let mut analyzer = Analyzer::new(&mut unit.arena, interner, env, sink);
    analyzer.analyze(root, Access::None);
}

#[tracing::instrument(level = "debug", skip_all)]
fn emit_unit(unit: &mut SourceUnit, sink: &mut dyn CodeSink) {
    let interner = unit.shared_interner();
    let root = unit.root;
    let mut emitter = Emitter::new(&mut unit.arena, interner, sink);
    emitter.emit(root);
}

/// What one unit of a batch produced.
#[derive(Debug)]
pub struct UnitOutput {
    pub outcome: CompileOutcome,
    pub diagnostics: Vec<Diagnostic>,
    /// Recorded sink actions; empty when emission was suppressed.
    pub code: Vec<Inst>,
}

/// Compile every unit against one environment, in parallel.
///
/// Units are independent once they share the environment's interner,
/// so each worker gets its own diagnostic bag and recording sink and
/// outputs come back in input order.
pub fn compile_batch(units: &mut [SourceUnit], env: &CompileEnv) -> Vec<UnitOutput> {
    units
        .par_iter_mut()
        .map(|unit| {
            let mut bag = DiagnosticBag::new();
            let mut code = RecordingSink::new();
            let outcome = compile_unit(unit, env, &mut bag, &mut code);
            UnitOutput {
                outcome,
                diagnostics: bag.into_vec(),
                code: code.into_instructions(),
            }
        })
        .collect()
}
