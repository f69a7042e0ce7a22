use std::fmt;

use tarn_ir::Span;

use crate::DiagnosticCode;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A compiler diagnostic: code, severity, message, and primary span.
///
/// Diagnostics never unwind. Every condition the compiler can report flows
/// through one of the factory functions below into a [`DiagnosticSink`],
/// and compilation carries on; only the final emit decision looks at
/// whether errors were collected.
///
/// [`DiagnosticSink`]: crate::DiagnosticSink
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    /// Code for searchability.
    pub code: DiagnosticCode,
    /// Severity level.
    pub severity: Severity,
    /// Main message.
    pub message: String,
    /// Where the condition occurred.
    pub span: Span,
    /// Additional notes with their own locations.
    pub notes: Vec<(String, Span)>,
}

impl Diagnostic {
    fn new_with_severity(
        code: DiagnosticCode,
        severity: Severity,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Diagnostic { code, severity, message: message.into(), span, notes: Vec::new() }
    }

    /// Create a new error diagnostic.
    pub fn error(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self::new_with_severity(code, Severity::Error, message, span)
    }

    /// Create a new warning diagnostic.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self::new_with_severity(code, Severity::Warning, message, span)
    }

    /// Create a new note diagnostic.
    pub fn note(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self::new_with_severity(code, Severity::Note, message, span)
    }

    /// Add a note with its own location.
    pub fn with_note(mut self, message: impl Into<String>, span: Span) -> Self {
        self.notes.push((message.into(), span));
        self
    }

    /// Check if this is an error (vs warning/note).
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.code, self.message)?;
        for (note, span) in &self.notes {
            write!(f, "\n  = note: {note} ({span:?})")?;
        }
        Ok(())
    }
}

/// Create an "unresolved constant" error.
pub fn unresolved_constant(name: &str, span: Span) -> Diagnostic {
    Diagnostic::error(DiagnosticCode::E0001, format!("unresolved constant `{name}`"), span)
}

/// Create an "unresolved function" error.
pub fn unresolved_function(name: &str, span: Span) -> Diagnostic {
    Diagnostic::error(DiagnosticCode::E0002, format!("unresolved function `{name}`"), span)
}

/// Create a "wrong argument count" error.
///
/// `expected` is the callee's declared `(min, max)` range.
pub fn wrong_argument_count(
    name: &str,
    expected: (u32, u32),
    got: usize,
    span: Span,
) -> Diagnostic {
    let (min, max) = expected;
    let wants = if min == max {
        format!("{min} argument{}", if min == 1 { "" } else { "s" })
    } else {
        format!("{min} to {max} arguments")
    };
    Diagnostic::error(
        DiagnosticCode::E0003,
        format!("function `{name}` expects {wants}, {got} given"),
        span,
    )
}

/// Create a "duplicate constant" error pointing back at the first
/// declaration.
pub fn duplicate_constant(name: &str, first_span: Span, span: Span) -> Diagnostic {
    Diagnostic::error(DiagnosticCode::E0004, format!("constant `{name}` is already declared"), span)
        .with_note("first declaration is here", first_span)
}

/// Create an "unsupported operand types" error for the given operator
/// symbol.
pub fn unsupported_operand_types(op: &str, span: Span) -> Diagnostic {
    Diagnostic::error(DiagnosticCode::E0005, format!("unsupported operand types for `{op}`"), span)
}

/// Create a "division by zero" warning.
pub fn division_by_zero(span: Span) -> Diagnostic {
    Diagnostic::warning(DiagnosticCode::W0001, "division by zero", span)
}

/// Create a "shift count truncated" warning.
pub fn shift_count_truncated(span: Span) -> Diagnostic {
    Diagnostic::warning(
        DiagnosticCode::W0002,
        "negative shift count wraps around the value width",
        span,
    )
}

/// Create a "constant expression folded" note.
pub fn constant_expression_folded(span: Span) -> Diagnostic {
    Diagnostic::note(DiagnosticCode::N0001, "constant expression replaced by its value", span)
}

/// Create an "unreachable branch" note.
pub fn unreachable_branch(span: Span) -> Diagnostic {
    Diagnostic::note(DiagnosticCode::N0002, "branch is never taken, condition is constant", span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn factories_agree_with_code_severity() {
        let span = Span::new(0, 4);
        let all = [
            unresolved_constant("LIMIT", span),
            unresolved_function("strlen", span),
            wrong_argument_count("min", (2, 2), 3, span),
            duplicate_constant("PI", Span::new(0, 2), span),
            unsupported_operand_types("+", span),
            division_by_zero(span),
            shift_count_truncated(span),
            constant_expression_folded(span),
            unreachable_branch(span),
        ];
        for diag in all {
            assert_eq!(diag.severity, diag.code.severity(), "{}", diag.code);
        }
    }

    #[test]
    fn wrong_argument_count_formats_ranges() {
        let span = Span::new(0, 3);
        assert_eq!(
            wrong_argument_count("abs", (1, 1), 0, span).message,
            "function `abs` expects 1 argument, 0 given"
        );
        assert_eq!(
            wrong_argument_count("min", (2, 2), 3, span).message,
            "function `min` expects 2 arguments, 3 given"
        );
        assert_eq!(
            wrong_argument_count("round", (1, 2), 4, span).message,
            "function `round` expects 1 to 2 arguments, 4 given"
        );
    }

    #[test]
    fn duplicate_constant_carries_a_note() {
        let diag = duplicate_constant("PI", Span::new(2, 4), Span::new(10, 12));
        assert_eq!(diag.notes.len(), 1);
        assert_eq!(diag.notes[0].0, "first declaration is here");
        assert_eq!(diag.notes[0].1, Span::new(2, 4));
    }

    #[test]
    fn display_includes_code_and_severity() {
        let diag = unresolved_constant("FOO", Span::new(5, 8));
        assert_eq!(diag.to_string(), "error [E0001]: unresolved constant `FOO`");
    }
}
