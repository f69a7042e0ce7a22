//! Numeric classification of guest text.
//!
//! [`classify_number`] is the engine behind every string-to-number
//! conversion: one forward pass that never fails, reporting how far the
//! int-, long-, and double-convertible prefixes reach and what each is
//! worth. Width overflow clamps the value to the width's bound and freezes
//! that width's prefix; the scan itself keeps going, so wider prefixes
//! still grow.

use bitflags::bitflags;

bitflags! {
    /// Classification flags: the value's kind plus scan facts.
    ///
    /// Exactly one of the three kind bits is set, chosen by comparing
    /// prefix lengths (double over long over int).
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    pub struct NumberInfo: u16 {
        /// Fits the 32-bit integer width.
        const INTEGER = 1;
        /// Needs the 64-bit integer width.
        const LONG = 2;
        /// Floating point.
        const DOUBLE = 4;
        /// The text (after leading, before trailing whitespace) is one
        /// complete number.
        const IS_NUMBER = 64;
        /// The `0x` form with at least one digit after the `x`.
        const HEX = 128;
        /// The value was an array; its element count stands in. Set by
        /// value conversion, never by the text scanner.
        const IS_ARRAY = 256;

        /// Mask of the kind bits.
        const TYPE_MASK = Self::INTEGER.bits() | Self::LONG.bits() | Self::DOUBLE.bits();
    }
}

/// Result of one classification pass.
///
/// Prefix ends are absolute byte offsets into the scanned text. On width
/// overflow the value field is clamped to that width's bound (`i32::MAX`,
/// `i64::MIN`, ...) and the matching end freezes where the clamp happened.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NumberClassification {
    pub info: NumberInfo,
    /// Value of the int-convertible prefix, saturated at the i32 bounds.
    pub int_value: i32,
    /// Value of the long-convertible prefix, saturated at the i64 bounds.
    pub long_value: i64,
    /// Value of the double prefix. Oversized exponents reach ±infinity;
    /// this never produces NaN.
    pub double_value: f64,
    pub int_end: usize,
    pub long_end: usize,
    pub double_end: usize,
    /// Where the scan stopped (first byte not part of any prefix).
    pub scan_end: usize,
}

impl NumberClassification {
    /// Whether the text was one complete number.
    #[must_use]
    pub fn is_number(&self) -> bool {
        self.info.contains(NumberInfo::IS_NUMBER)
    }

    /// Whether the scan consumed the text to its end.
    #[must_use]
    pub fn consumed_all(&self, text: &str) -> bool {
        self.scan_end == text.len()
    }
}

/// Parse the recognized double prefix, normalizing the guest's `d`/`D`
/// exponent markers to `e` first.
///
/// The host parser guarantees nearest-double rounding and saturates
/// oversized exponents to ±infinity or zero, so any prefix with exponent
/// digits parses. `None` only for degenerate prefixes like `"+."` or a
/// dangling exponent sign, where the accumulated value stands in.
fn parse_double_prefix(slice: &str) -> Option<f64> {
    if slice.bytes().any(|b| b == b'd' || b == b'D') {
        let normalized: String =
            slice.chars().map(|c| if c == 'd' || c == 'D' { 'e' } else { c }).collect();
        normalized.parse().ok()
    } else {
        slice.parse().ok()
    }
}

/// Scanner states.
///
/// Grammar, with the state that consumes each piece:
///
/// ```text
/// [:white:]* [+-]? 0? [0-9]* [.]? [0-9]* ([dDeE] [+-]? [0-9]+)?
///  0          1    7   2      2    3       4      5     6
/// [:white:]* [+-]? 0 (x|X) [0-9A-Fa-f]*
///  0          1    7  7     8
/// ```
const SKIP_SPACE: u8 = 0;
const SIGN_OR_DIGIT: u8 = 1;
const INT_DIGITS: u8 = 2;
const FRAC_DIGITS: u8 = 3;
const EXP_MARKER: u8 = 4;
const EXP_SIGN: u8 = 5;
const EXP_DIGITS: u8 = 6;
const LEADING_ZERO: u8 = 7;
const HEX_DIGITS: u8 = 8;

/// Classify the numeric content of `text` starting at byte offset `from`.
///
/// Total: every input produces a classification; non-numeric text yields
/// zero values with all prefixes ending where the scan gave up.
///
/// # Panics
///
/// Panics if `from` is not a char boundary of `text`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn classify_number(text: &str, from: usize) -> NumberClassification {
    let limit = text.len();
    let mut p = from.min(limit);

    let mut int_value: i64 = 0; // magnitude while open; sign applied on close
    let mut long_value: i64 = 0;
    let mut acc_double: f64 = 0.0;
    let mut frac_div: f64 = 10.0;

    let mut int_end: Option<usize> = None;
    let mut long_end: Option<usize> = None;
    let mut double_end: Option<usize> = None;
    let mut marker_pos = 0usize; // exponent marker position, for rollback
    let mut num_start: Option<usize> = None;

    let mut contains_digit = false;
    let mut hex = false;
    let mut sign: i32 = 1;
    let mut state = SKIP_SPACE;

    'scan: while p < limit {
        let Some(c) = text[p..].chars().next() else { break };

        match state {
            SKIP_SPACE => {
                if c.is_whitespace() {
                    p += c.len_utf8();
                } else {
                    num_start = Some(p);
                    state = SIGN_OR_DIGIT; // re-dispatch without consuming
                }
            }

            SIGN_OR_DIGIT => {
                if c.is_ascii_digit() {
                    state = INT_DIGITS;
                } else if c == '-' {
                    sign = -1;
                    state = INT_DIGITS;
                    p += 1;
                } else if c == '+' {
                    state = INT_DIGITS;
                    p += 1;
                } else {
                    if int_end.is_none() {
                        int_end = Some(p);
                        int_value *= i64::from(sign);
                    }
                    if long_end.is_none() {
                        long_end = Some(p);
                        long_value *= i64::from(sign);
                    }
                    if c == '.' {
                        state = FRAC_DIGITS;
                        p += 1;
                    } else {
                        break 'scan;
                    }
                }
            }

            INT_DIGITS => {
                if c == '0' && !contains_digit {
                    contains_digit = true;
                    state = LEADING_ZERO;
                    p += 1;
                } else if let Some(num) = c.to_digit(10) {
                    let num = i64::from(num);
                    contains_digit = true;
                    acc_double = acc_double * 10.0 + num as f64;

                    if long_end.is_none() {
                        if long_value < i64::MAX / 10
                            || (long_value == i64::MAX / 10 && num <= i64::MAX % 10)
                        {
                            long_value = long_value * 10 + num;
                            if int_end.is_none() {
                                if long_value <= i64::from(i32::MAX) {
                                    int_value = long_value;
                                } else if sign < 0 {
                                    // -2147483648 is a complete int, so the
                                    // prefix includes this digit
                                    let end = if -long_value == i64::from(i32::MIN) {
                                        p + 1
                                    } else {
                                        p
                                    };
                                    int_end = Some(end);
                                    int_value = i64::from(i32::MIN);
                                } else {
                                    int_end = Some(p);
                                    int_value = i64::from(i32::MAX);
                                }
                            }
                        } else {
                            long_end = Some(p);
                            long_value = if sign < 0 { i64::MIN } else { i64::MAX };
                        }
                    }
                    p += 1;
                } else {
                    // the prefix value is final here, so the sign lands now
                    if int_end.is_none() {
                        int_end = Some(p);
                        int_value *= i64::from(sign);
                    }
                    if long_end.is_none() {
                        long_end = Some(p);
                        long_value *= i64::from(sign);
                    }
                    if c == '.' {
                        state = FRAC_DIGITS;
                        p += 1;
                    } else if matches!(c, 'd' | 'D' | 'e' | 'E') {
                        marker_pos = p;
                        state = EXP_MARKER;
                        p += 1;
                    } else {
                        break 'scan;
                    }
                }
            }

            FRAC_DIGITS => {
                if let Some(num) = c.to_digit(10) {
                    contains_digit = true;
                    acc_double += f64::from(num) / frac_div;
                    frac_div *= 10.0;
                    p += 1;
                } else if matches!(c, 'd' | 'D' | 'e' | 'E') {
                    marker_pos = p;
                    state = EXP_MARKER;
                    p += 1;
                } else {
                    break 'scan;
                }
            }

            EXP_MARKER => {
                if c.is_ascii_digit() {
                    state = EXP_DIGITS; // re-dispatch
                } else if c == '-' || c == '+' {
                    state = EXP_SIGN;
                    p += 1;
                } else {
                    break 'scan; // rollback to the marker below
                }
            }

            // any character re-dispatches; a non-digit here commits the
            // marker and sign into the double prefix (exponent of zero)
            EXP_SIGN => state = EXP_DIGITS,

            EXP_DIGITS => {
                if c.is_ascii_digit() {
                    // digits are always fully consumed; the value comes
                    // from parsing the prefix, so size does not matter here
                    p += 1;
                } else {
                    break 'scan;
                }
            }

            LEADING_ZERO => {
                if c == 'x' || c == 'X' {
                    double_end = Some(p);
                    state = HEX_DIGITS;
                    p += 1;
                } else {
                    state = INT_DIGITS; // re-dispatch; "00x10" stays decimal
                }
            }

            HEX_DIGITS => {
                hex = true;
                if let Some(num) = c.to_digit(16) {
                    let num = i64::from(num);
                    if long_end.is_none() {
                        if long_value < i64::MAX / 16
                            || (long_value == i64::MAX / 16 && num <= i64::MAX % 16)
                        {
                            long_value = long_value * 16 + num;
                            if int_end.is_none() {
                                if long_value <= i64::from(i32::MAX) {
                                    int_value = long_value;
                                } else if sign < 0 {
                                    let end = if -long_value == i64::from(i32::MIN) {
                                        p + 1
                                    } else {
                                        p
                                    };
                                    int_end = Some(end);
                                    int_value = i64::from(i32::MIN);
                                } else {
                                    int_end = Some(p);
                                    int_value = i64::from(i32::MAX);
                                }
                            }
                        } else {
                            long_end = Some(p);
                            long_value = if sign < 0 { i64::MIN } else { i64::MAX };
                        }
                    }
                    p += 1;
                } else {
                    break 'scan;
                }
            }

            _ => unreachable!("scanner state {state} does not exist"),
        }
    }

    // a scan that stops at the exponent marker (or right after its sign)
    // rolls back so the marker is not consumed
    if state == EXP_MARKER || state == EXP_SIGN {
        p = marker_pos;
    }
    let scan_end = p;

    let double_end = double_end.unwrap_or(scan_end);
    let long_end = match long_end {
        Some(end) => end,
        None => {
            long_value *= i64::from(sign);
            scan_end
        }
    };
    let int_end = match int_end {
        Some(end) => end,
        None => {
            int_value *= i64::from(sign);
            scan_end
        }
    };

    let mut info = NumberInfo::empty();
    if hex {
        info |= NumberInfo::HEX;
    }
    if double_end > long_end {
        info |= NumberInfo::DOUBLE;
    } else if long_end > int_end {
        info |= NumberInfo::LONG;
    } else {
        info |= NumberInfo::INTEGER;
    }

    if contains_digit && text[scan_end..].chars().all(char::is_whitespace) {
        info |= NumberInfo::IS_NUMBER;
    }

    let double_value = if hex {
        long_value as f64
    } else {
        let start = num_start.unwrap_or(scan_end);
        let fallback = acc_double * f64::from(sign);
        parse_double_prefix(&text[start..double_end]).unwrap_or(fallback)
    };

    NumberClassification {
        info,
        int_value: int_value as i32,
        long_value,
        double_value,
        int_end,
        long_end,
        double_end,
        scan_end,
    }
}
