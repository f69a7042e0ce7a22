//! Diagnostic system for the Tarn compiler.
//!
//! Design rules:
//! - Diagnostic codes for searchability
//! - Clear messages (what went wrong)
//! - A primary span (where it went wrong)
//! - Diagnostics never unwind; conversions are total and analysis keeps
//!   going, so one pass reports everything it can see
//!
//! Producers push into a [`DiagnosticSink`]; the pipeline's emit decision
//! reads [`DiagnosticBag::has_errors`] once analysis is done. Factory
//! functions keep call sites to one line:
//!
//! ```
//! use tarn_diagnostic::{unresolved_constant, DiagnosticBag, DiagnosticSink};
//! use tarn_ir::Span;
//!
//! let mut bag = DiagnosticBag::new();
//! bag.report(unresolved_constant("LIMIT", Span::new(4, 9)));
//! assert!(bag.has_errors());
//! ```

mod code;
mod diagnostic;
mod render;
mod sink;

pub use code::DiagnosticCode;
pub use diagnostic::{
    constant_expression_folded, division_by_zero, duplicate_constant, shift_count_truncated,
    unreachable_branch, unresolved_constant, unresolved_function, unsupported_operand_types,
    wrong_argument_count, Diagnostic, Severity,
};
pub use render::{render, render_all};
pub use sink::{DiagnosticBag, DiagnosticSink};
