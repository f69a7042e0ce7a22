//! Diagnostic collection.
//!
//! Compilation phases report through the [`DiagnosticSink`] trait and never
//! look back at what they reported; only the pipeline's final emit decision
//! inspects the collected set. [`DiagnosticBag`] is the standard collecting
//! implementation.

use crate::diagnostic::{Diagnostic, Severity};

/// Receiver for diagnostics produced during compilation.
pub trait DiagnosticSink {
    /// Record one diagnostic. Must not unwind.
    fn report(&mut self, diag: Diagnostic);
}

/// Ordered collection of diagnostics with per-severity counts.
///
/// Diagnostics keep their report order, which for a single-threaded
/// pipeline walk is source order.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
    errors: usize,
    warnings: usize,
    notes: usize,
}

impl DiagnosticBag {
    /// Create an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of collected diagnostics of any severity.
    #[must_use]
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Returns `true` if nothing was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Returns `true` if at least one error was reported.
    ///
    /// This is the signal that suppresses emission.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    /// Number of errors reported.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors
    }

    /// Number of warnings reported.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.warnings
    }

    /// Number of notes reported.
    #[must_use]
    pub fn note_count(&self) -> usize {
        self.notes
    }

    /// The collected diagnostics in report order.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Iterate over the collected diagnostics in report order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Consume the bag, returning the diagnostics.
    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl DiagnosticSink for DiagnosticBag {
    fn report(&mut self, diag: Diagnostic) {
        match diag.severity {
            Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
            Severity::Note => self.notes += 1,
        }
        self.diagnostics.push(diag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::{division_by_zero, unresolved_constant, unreachable_branch};
    use pretty_assertions::assert_eq;
    use tarn_ir::Span;

    #[test]
    fn counts_follow_severity() {
        let mut bag = DiagnosticBag::new();
        assert!(!bag.has_errors());

        bag.report(division_by_zero(Span::new(0, 1)));
        bag.report(unreachable_branch(Span::new(2, 3)));
        assert!(!bag.has_errors());
        assert_eq!(bag.warning_count(), 1);
        assert_eq!(bag.note_count(), 1);

        bag.report(unresolved_constant("X", Span::new(4, 5)));
        assert!(bag.has_errors());
        assert_eq!(bag.error_count(), 1);
        assert_eq!(bag.len(), 3);
    }

    #[test]
    fn report_order_is_preserved() {
        let mut bag = DiagnosticBag::new();
        bag.report(unresolved_constant("B", Span::new(9, 10)));
        bag.report(unresolved_constant("A", Span::new(0, 1)));
        let spans: Vec<_> = bag.iter().map(|d| d.span).collect();
        assert_eq!(spans, vec![Span::new(9, 10), Span::new(0, 1)]);
    }
}
