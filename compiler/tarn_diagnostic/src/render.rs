//! Plain-text rendering for tests and tooling.
//!
//! One line per diagnostic in the form `code:line:col: severity: message`,
//! positions 1-based for humans. Notes follow on indented lines. Rich
//! terminal output is the embedding host's business; the compiler itself
//! only guarantees this stable format.

use crate::diagnostic::Diagnostic;
use tarn_ir::{LineIndex, Span};

/// 1-based line and column of a span start, if the span lies inside the
/// indexed text.
fn position(index: &LineIndex, span: Span) -> Option<(u32, u32)> {
    index.line_col(span.start).ok().map(|(line, col)| (line + 1, col + 1))
}

/// Render one diagnostic against the unit's line index.
///
/// A span outside the indexed text renders as `?:?` rather than failing;
/// such spans are compiler defects and the caller's assertions will catch
/// the marker.
#[must_use]
pub fn render(diag: &Diagnostic, index: &LineIndex) -> String {
    let mut out = String::new();
    match position(index, diag.span) {
        Some((line, col)) => {
            out.push_str(&format!("{}:{line}:{col}: {}: {}", diag.code, diag.severity, diag.message));
        }
        None => {
            out.push_str(&format!("{}:?:?: {}: {}", diag.code, diag.severity, diag.message));
        }
    }
    for (note, span) in &diag.notes {
        match position(index, *span) {
            Some((line, col)) => out.push_str(&format!("\n  note: {note} at {line}:{col}")),
            None => out.push_str(&format!("\n  note: {note}")),
        }
    }
    out
}

/// Render a batch of diagnostics, one per line, in the given order.
#[must_use]
pub fn render_all<'a>(
    diags: impl IntoIterator<Item = &'a Diagnostic>,
    index: &LineIndex,
) -> String {
    let rendered: Vec<String> = diags.into_iter().map(|d| render(d, index)).collect();
    rendered.join("\n")
}
