//! Line index for mapping byte offsets to source positions.
//!
//! Guest sources may use any of six line-break forms, so the index cannot
//! lean on `\n` alone. Recognized terminators:
//!
//! - CR (U+000D), LF (U+000A), and CRLF consumed as a single break
//! - NEL (U+0085)
//! - LINE SEPARATOR (U+2028) and PARAGRAPH SEPARATOR (U+2029)
//!
//! A CR followed by anything other than LF terminates a line by itself, so
//! a lone CR between two LFs produces three breaks while CRLF produces one.
//!
//! Lines are 0-based. Offsets past the end of the text are compiler defects,
//! not user errors, and every query reports them as [`PositionError`]
//! instead of clamping to a nearby position.

use crate::span::Span;

/// Position query failure.
///
/// Raised when a caller asks about an offset or line the indexed text does
/// not contain. Such a query always indicates a stale or corrupt span, so
/// callers treat it as an internal fault rather than recover from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    /// The byte offset lies beyond the indexed text.
    #[error("offset {offset} out of range for text of length {len}")]
    OffsetOutOfRange { offset: u32, len: u32 },
    /// The line number is not a line of the indexed text.
    #[error("line {line} out of range for text with {count} lines")]
    LineOutOfRange { line: u32, count: u32 },
}

/// Pre-computed table of line-start offsets for one source text.
///
/// Built by a single forward scan, immutable afterwards. Lookups binary
/// search the table, O(log L) for L lines.
///
/// # Example
///
/// ```
/// use tarn_ir::LineIndex;
///
/// let index = LineIndex::build("abc\r\nabc\r\nabc");
///
/// assert_eq!(index.line_count(), 3);
/// assert_eq!(index.line_of(6), Ok(1)); // 'b' on the second line
/// ```
#[derive(Clone, Debug)]
pub struct LineIndex {
    /// Byte offset of the first character of each line.
    ///
    /// `starts[0] == 0` always, even for empty text.
    starts: Vec<u32>,
    /// Total length of the indexed text in bytes.
    text_len: u32,
}

/// First byte of the UTF-8 encoding of NEL (U+0085).
const NEL_LEAD: u8 = 0xC2;
/// First byte of the UTF-8 encodings of LS (U+2028) and PS (U+2029).
const SEP_LEAD: u8 = 0xE2;

impl LineIndex {
    /// Build a line index by scanning `text` once.
    ///
    /// Texts are bounded at `u32::MAX` bytes, same as [`Span`] offsets.
    pub fn build(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut starts = vec![0u32];
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\r' => {
                    // CRLF counts as one break; CR alone is a break too.
                    i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                    starts.push(i as u32);
                }
                b'\n' => {
                    i += 1;
                    starts.push(i as u32);
                }
                NEL_LEAD if bytes.get(i + 1) == Some(&0x85) => {
                    i += 2;
                    starts.push(i as u32);
                }
                SEP_LEAD
                    if bytes.get(i + 1) == Some(&0x80)
                        && matches!(bytes.get(i + 2), Some(&0xA8) | Some(&0xA9)) =>
                {
                    i += 3;
                    starts.push(i as u32);
                }
                _ => i += 1,
            }
        }
        LineIndex { starts, text_len: bytes.len() as u32 }
    }

    /// Number of lines in the indexed text.
    ///
    /// Empty text has one (empty) line; text ending in a break has an
    /// empty final line after it.
    #[inline]
    pub fn line_count(&self) -> u32 {
        self.starts.len() as u32
    }

    /// Total length of the indexed text in bytes.
    #[inline]
    pub fn text_len(&self) -> u32 {
        self.text_len
    }

    /// 0-based line containing the byte offset.
    ///
    /// Offsets `0..=text_len` are valid; the end-of-text offset maps to the
    /// last line. Anything beyond is an error, never a clamped guess.
    pub fn line_of(&self, offset: u32) -> Result<u32, PositionError> {
        if offset > self.text_len {
            return Err(PositionError::OffsetOutOfRange { offset, len: self.text_len });
        }
        // Largest line start <= offset.
        let line = match self.starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert - 1,
        };
        Ok(line as u32)
    }

    /// 0-based (line, byte column) of the byte offset.
    pub fn line_col(&self, offset: u32) -> Result<(u32, u32), PositionError> {
        let line = self.line_of(offset)?;
        Ok((line, offset - self.starts[line as usize]))
    }

    /// Byte offset of the first character of a 0-based line.
    pub fn line_start(&self, line: u32) -> Result<u32, PositionError> {
        self.starts.get(line as usize).copied().ok_or(PositionError::LineOutOfRange {
            line,
            count: self.line_count(),
        })
    }

    /// Span of a line's content, exclusive of its terminating break.
    ///
    /// `text` must be the text this index was built from; the index itself
    /// stores only offsets, so the break length at the end of the line is
    /// read back out of the text.
    pub fn line_span(&self, text: &str, line: u32) -> Result<Span, PositionError> {
        let start = self.line_start(line)?;
        let end = match self.starts.get(line as usize + 1) {
            Some(&next_start) => next_start - break_len_before(text.as_bytes(), next_start),
            None => self.text_len,
        };
        Ok(Span::new(start, end))
    }
}

/// Length in bytes of the line break ending at `next_start`.
///
/// `next_start` must be the start offset of a line other than the first,
/// so a complete break always precedes it.
fn break_len_before(bytes: &[u8], next_start: u32) -> u32 {
    let i = next_start as usize;
    match bytes[i - 1] {
        b'\n' if i >= 2 && bytes[i - 2] == b'\r' => 2,
        b'\n' | b'\r' => 1,
        0x85 => 2,
        // LS and PS both end in their third byte.
        _ => 3,
    }
}
