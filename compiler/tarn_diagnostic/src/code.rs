//! Diagnostic codes for all compiler conditions.
//!
//! Each code is a unique identifier with the first letter indicating the
//! default severity. Used for searchability and documentation lookups.

use crate::diagnostic::Severity;
use std::fmt;

/// Diagnostic codes for all compiler conditions.
///
/// Format: letter + four digits, where the letter indicates severity:
/// - Exxxx: errors (compilation produces no output)
/// - Wxxxx: warnings (compilation continues)
/// - Nxxxx: notes (informational, from analysis rewrites)
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DiagnosticCode {
    /// Use of a constant with no visible declaration
    E0001,
    /// Call of a function unknown to the environment
    E0002,
    /// Call with an argument count outside the callee's declared range
    E0003,
    /// Constant declared more than once in a unit
    E0004,
    /// Operator applied to operands it has no meaning for
    E0005,

    /// Division or modulo by a constant zero
    W0001,
    /// Negative shift count reduced modulo the value width
    W0002,

    /// Side-effect-free expression replaced by its computed value
    N0001,
    /// Conditional branch that can never execute
    N0002,
}

impl DiagnosticCode {
    /// All code variants, for exhaustive testing.
    ///
    /// Kept in sync with `as_str()` which is exhaustive (Rust match
    /// enforces it). The `all_codes_have_consistent_severity` test catches
    /// any omission here.
    pub const ALL: &[DiagnosticCode] = &[
        DiagnosticCode::E0001,
        DiagnosticCode::E0002,
        DiagnosticCode::E0003,
        DiagnosticCode::E0004,
        DiagnosticCode::E0005,
        DiagnosticCode::W0001,
        DiagnosticCode::W0002,
        DiagnosticCode::N0001,
        DiagnosticCode::N0002,
    ];

    /// Get the code as a string (e.g., "E0001").
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticCode::E0001 => "E0001",
            DiagnosticCode::E0002 => "E0002",
            DiagnosticCode::E0003 => "E0003",
            DiagnosticCode::E0004 => "E0004",
            DiagnosticCode::E0005 => "E0005",
            DiagnosticCode::W0001 => "W0001",
            DiagnosticCode::W0002 => "W0002",
            DiagnosticCode::N0001 => "N0001",
            DiagnosticCode::N0002 => "N0002",
        }
    }

    /// The severity this code is reported with.
    #[must_use]
    pub fn severity(self) -> Severity {
        match self {
            DiagnosticCode::E0001
            | DiagnosticCode::E0002
            | DiagnosticCode::E0003
            | DiagnosticCode::E0004
            | DiagnosticCode::E0005 => Severity::Error,
            DiagnosticCode::W0001 | DiagnosticCode::W0002 => Severity::Warning,
            DiagnosticCode::N0001 | DiagnosticCode::N0002 => Severity::Note,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn all_codes_have_consistent_severity() {
        for &code in DiagnosticCode::ALL {
            let s = code.as_str();
            let expected = match &s[..1] {
                "E" => Severity::Error,
                "W" => Severity::Warning,
                "N" => Severity::Note,
                other => panic!("unexpected code prefix {other}"),
            };
            assert_eq!(code.severity(), expected, "severity mismatch for {s}");
        }
    }

    #[test]
    fn codes_are_unique() {
        for (i, a) in DiagnosticCode::ALL.iter().enumerate() {
            for b in &DiagnosticCode::ALL[i + 1..] {
                assert_ne!(a.as_str(), b.as_str());
            }
        }
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(DiagnosticCode::E0003.to_string(), "E0003");
        assert_eq!(DiagnosticCode::N0002.to_string(), "N0002");
    }
}
