//! The `++` and `--` family, including alphanumeric string stepping.
//!
//! Increment and decrement are not symmetric in the guest language:
//! every string increments through the right-to-left alphanumeric carry
//! of [`string_increment`], but only strings that already spell a
//! number decrement, and non-numeric ones pass through unchanged.
//! Booleans ignore both operators entirely.

use crate::number::{classify_number, NumberInfo};
use crate::value::GuestValue;

use super::{Coerced, CoercionFlags};

/// Unary `++`.
///
/// Integer widths widen at their upper bound the same way addition
/// does; text steps through [`string_increment`], so `"3.5"` becomes
/// `"3.6"`, not 4.5.
#[allow(clippy::cast_precision_loss)]
pub fn increment(x: &GuestValue) -> Coerced<GuestValue> {
    match x {
        GuestValue::Int(int) => Coerced::clean(if *int == i32::MAX {
            GuestValue::Long(i64::from(i32::MAX) + 1)
        } else {
            GuestValue::Int(*int + 1)
        }),
        GuestValue::Null => Coerced::clean(GuestValue::Int(1)),
        GuestValue::Long(long) => Coerced::clean(if *long == i64::MAX {
            GuestValue::Double(i64::MAX as f64 + 1.0)
        } else {
            GuestValue::Long(*long + 1)
        }),
        GuestValue::Double(double) => Coerced::clean(GuestValue::Double(*double + 1.0)),
        GuestValue::Str(text) => Coerced::clean(GuestValue::str(string_increment(text))),
        GuestValue::Bytes(bytes) => Coerced::clean(GuestValue::str(string_increment(
            &String::from_utf8_lossy(bytes),
        ))),
        GuestValue::Bool(_) => Coerced::clean(x.clone()),
        GuestValue::Array(_) => Coerced::flagged(GuestValue::Int(0), CoercionFlags::UNSUPPORTED),
    }
}

/// Unary `--`.
///
/// Integer widths widen at their lower bound; null stays null rather
/// than becoming -1; text decrements only when it spells a number.
#[allow(clippy::cast_precision_loss)]
pub fn decrement(x: &GuestValue) -> Coerced<GuestValue> {
    match x {
        GuestValue::Null => Coerced::clean(GuestValue::Null),
        GuestValue::Int(int) => Coerced::clean(if *int == i32::MIN {
            GuestValue::Double(f64::from(i32::MIN) - 1.0)
        } else {
            GuestValue::Int(*int - 1)
        }),
        GuestValue::Long(long) => Coerced::clean(if *long == i64::MIN {
            GuestValue::Double(i64::MIN as f64 - 1.0)
        } else {
            GuestValue::Long(*long - 1)
        }),
        GuestValue::Double(double) => Coerced::clean(GuestValue::Double(*double - 1.0)),
        GuestValue::Str(text) => Coerced::clean(decrement_text(text)),
        GuestValue::Bytes(bytes) => {
            Coerced::clean(decrement_text(&String::from_utf8_lossy(bytes)))
        }
        GuestValue::Bool(_) => Coerced::clean(x.clone()),
        GuestValue::Array(_) => Coerced::flagged(GuestValue::Int(0), CoercionFlags::UNSUPPORTED),
    }
}

/// Decrements text that spells a complete number; anything else comes
/// back as the same text (a byte buffer comes back as text either way).
#[allow(clippy::cast_precision_loss)]
fn decrement_text(text: &str) -> GuestValue {
    let scan = classify_number(text, 0);
    if !scan.is_number() {
        return GuestValue::str(text);
    }

    let kind = scan.info & NumberInfo::TYPE_MASK;
    if kind == NumberInfo::DOUBLE {
        return GuestValue::Double(scan.double_value - 1.0);
    }
    if kind == NumberInfo::INTEGER {
        return if scan.int_value == i32::MIN {
            GuestValue::Double(scan.long_value as f64 - 1.0)
        } else {
            GuestValue::Int(scan.int_value - 1)
        };
    }
    if scan.long_value == i64::MIN {
        GuestValue::Double(scan.double_value - 1.0)
    } else {
        GuestValue::Long(scan.long_value - 1)
    }
}

/// Steps text the way Perl's string increment does.
///
/// Scanning right to left: `0`-`8`, `a`-`y` and `A`-`Y` bump in place
/// and stop; `9`, `z` and `Z` roll over and carry left. Any other
/// character swallows the carry. A carry that runs off the left edge
/// prepends `1`, `a` or `A` to match the column it fell out of, which
/// is also how the empty string becomes `"1"`.
pub fn string_increment(text: &str) -> String {
    let mut bytes = text.as_bytes().to_vec();
    // an empty input falls through as a spent digit carry
    let mut carried = b'9';
    for i in (0..bytes.len()).rev() {
        carried = bytes[i];
        match carried {
            b'0'..=b'8' | b'a'..=b'y' | b'A'..=b'Y' => {
                bytes[i] += 1;
            }
            b'9' => {
                bytes[i] = b'0';
                continue;
            }
            b'z' => {
                bytes[i] = b'a';
                continue;
            }
            b'Z' => {
                bytes[i] = b'A';
                continue;
            }
            _ => {}
        }
        break;
    }

    let overflow = match carried {
        b'9' => Some(b'1'),
        b'z' => Some(b'a'),
        b'Z' => Some(b'A'),
        _ => None,
    };
    if let Some(first) = overflow {
        bytes.insert(0, first);
    }
    String::from_utf8_lossy(&bytes).into_owned()
}
