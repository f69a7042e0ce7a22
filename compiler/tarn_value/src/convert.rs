//! Implicit conversions between guest value kinds.
//!
//! Every function here is total: any value converts to any scalar kind,
//! degrading to zero or empty rather than failing. These are the exact
//! conversions the emitted program performs at run time, which is what
//! lets constant folding substitute a computed value for an expression
//! without changing observable behavior.
//!
//! Number conversions of text route through [`classify_number`]; the
//! widths disagree on what an array is worth (its element count as an
//! int or double, zero as a long), which is a quirk the rest of the
//! engine relies on staying put.

use crate::array::GuestArray;
use crate::number::{classify_number, NumberClassification, NumberInfo};
use crate::value::GuestValue;

/// A value viewed through the numeric tower: classification flags plus
/// its worth at each width. This is the input shape of every arithmetic
/// coercion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NumericValue {
    pub info: NumberInfo,
    pub int_value: i32,
    pub long_value: i64,
    pub double_value: f64,
}

impl From<NumberClassification> for NumericValue {
    fn from(scan: NumberClassification) -> Self {
        NumericValue {
            info: scan.info,
            int_value: scan.int_value,
            long_value: scan.long_value,
            double_value: scan.double_value,
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn clamp_to_int(long: i64) -> i32 {
    long.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

fn count_as_int(array: &GuestArray) -> i32 {
    i32::try_from(array.len()).unwrap_or(i32::MAX)
}

/// Views any value as a number.
///
/// Text is classified; booleans become 0 or 1 but never claim to *be*
/// numbers; an array reports its element count with the
/// [`NumberInfo::IS_ARRAY`] flag raised so arithmetic can reject it.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn to_number(value: &GuestValue) -> NumericValue {
    match value {
        GuestValue::Int(int) => NumericValue {
            info: NumberInfo::INTEGER | NumberInfo::IS_NUMBER,
            int_value: *int,
            long_value: i64::from(*int),
            double_value: f64::from(*int),
        },
        GuestValue::Long(long) => NumericValue {
            info: NumberInfo::LONG | NumberInfo::IS_NUMBER,
            int_value: clamp_to_int(*long),
            long_value: *long,
            double_value: *long as f64,
        },
        GuestValue::Double(double) => NumericValue {
            info: NumberInfo::DOUBLE | NumberInfo::IS_NUMBER,
            int_value: *double as i32,
            long_value: *double as i64,
            double_value: *double,
        },
        GuestValue::Str(text) => classify_number(text, 0).into(),
        GuestValue::Bytes(bytes) => classify_number(&String::from_utf8_lossy(bytes), 0).into(),
        GuestValue::Bool(b) => NumericValue {
            info: NumberInfo::INTEGER,
            int_value: i32::from(*b),
            long_value: i64::from(*b),
            double_value: if *b { 1.0 } else { 0.0 },
        },
        GuestValue::Null => NumericValue {
            info: NumberInfo::INTEGER,
            int_value: 0,
            long_value: 0,
            double_value: 0.0,
        },
        GuestValue::Array(array) => {
            let count = count_as_int(array);
            NumericValue {
                info: NumberInfo::INTEGER | NumberInfo::IS_ARRAY,
                int_value: count,
                long_value: i64::from(count),
                double_value: f64::from(count),
            }
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
pub fn to_int(value: &GuestValue) -> i32 {
    match value {
        GuestValue::Int(int) => *int,
        GuestValue::Bool(b) => i32::from(*b),
        GuestValue::Long(long) => clamp_to_int(*long),
        GuestValue::Double(double) => *double as i32,
        GuestValue::Str(text) => classify_number(text, 0).int_value,
        GuestValue::Bytes(bytes) => classify_number(&String::from_utf8_lossy(bytes), 0).int_value,
        GuestValue::Null => 0,
        GuestValue::Array(array) => count_as_int(array),
    }
}

/// Unlike [`to_int`] and [`to_double`], an array converts to long as
/// zero, not as its count.
#[allow(clippy::cast_possible_truncation)]
pub fn to_long(value: &GuestValue) -> i64 {
    match value {
        GuestValue::Long(long) => *long,
        GuestValue::Int(int) => i64::from(*int),
        GuestValue::Bool(b) => i64::from(*b),
        GuestValue::Double(double) => *double as i64,
        GuestValue::Str(text) => classify_number(text, 0).long_value,
        GuestValue::Bytes(bytes) => classify_number(&String::from_utf8_lossy(bytes), 0).long_value,
        GuestValue::Null => 0,
        GuestValue::Array(_) => 0,
    }
}

#[allow(clippy::cast_precision_loss)]
pub fn to_double(value: &GuestValue) -> f64 {
    match value {
        GuestValue::Double(double) => *double,
        GuestValue::Int(int) => f64::from(*int),
        GuestValue::Str(text) => classify_number(text, 0).double_value,
        GuestValue::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        GuestValue::Long(long) => *long as f64,
        GuestValue::Bytes(bytes) => classify_number(&String::from_utf8_lossy(bytes), 0).double_value,
        GuestValue::Null => 0.0,
        GuestValue::Array(array) => f64::from(count_as_int(array)),
    }
}

/// Guest truthiness. Empty text, the single character `0`, every zero
/// number, null, and the empty array are false; everything else is true,
/// including `"0.0"` and NaN.
pub fn to_boolean(value: &GuestValue) -> bool {
    match value {
        GuestValue::Bool(b) => *b,
        GuestValue::Int(int) => *int != 0,
        GuestValue::Double(double) => *double != 0.0,
        GuestValue::Long(long) => *long != 0,
        GuestValue::Str(text) => !(text.is_empty() || text.as_str() == "0"),
        GuestValue::Bytes(bytes) => !(bytes.is_empty() || (bytes.len() == 1 && bytes[0] == b'0')),
        GuestValue::Null => false,
        GuestValue::Array(array) => !array.is_empty(),
    }
}

/// Renders a value as guest text. Null and false render as the empty
/// string, true as `"1"`, arrays as the literal word `Array`.
pub fn to_text(value: &GuestValue) -> String {
    match value {
        GuestValue::Null => String::new(),
        GuestValue::Str(text) => text.as_str().to_owned(),
        GuestValue::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        GuestValue::Int(int) => int.to_string(),
        GuestValue::Long(long) => long.to_string(),
        GuestValue::Bool(b) => {
            if *b {
                "1".to_owned()
            } else {
                String::new()
            }
        }
        GuestValue::Double(double) => fmt_double(*double),
        GuestValue::Array(_) => "Array".to_owned(),
    }
}

/// Renders a value as a raw byte buffer.
///
/// Arrays render as the lowercase word `array` here, not the `Array` of
/// [`to_text`]; the two casings are both part of the surface behavior.
pub fn to_bytes(value: &GuestValue) -> Vec<u8> {
    match value {
        GuestValue::Bytes(bytes) => bytes.as_slice().to_vec(),
        GuestValue::Str(text) => text.as_bytes().to_vec(),
        GuestValue::Int(int) => int.to_string().into_bytes(),
        GuestValue::Long(long) => long.to_string().into_bytes(),
        GuestValue::Double(double) => fmt_double(*double).into_bytes(),
        GuestValue::Bool(b) => {
            if *b {
                vec![b'1']
            } else {
                Vec::new()
            }
        }
        GuestValue::Null => Vec::new(),
        GuestValue::Array(_) => b"array".to_vec(),
    }
}

/// Renders a double the way the guest language prints one: up to 15
/// significant digits, fixed notation while the exponent sits in
/// [-4, 14], otherwise `d.dddE±xx` with a two-digit minimum exponent.
pub fn fmt_double(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_owned();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-Infinity" } else { "Infinity" }.to_owned();
    }
    if value == 0.0 {
        return "0".to_owned();
    }

    // 15 significant digits, then strip what rounding left as zeros.
    let scientific = format!("{:.14e}", value.abs());
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let mut digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    while digits.len() > 1 && digits.ends_with('0') {
        digits.pop();
    }

    let body = if (-4..15).contains(&exponent) {
        fixed_form(&digits, exponent)
    } else {
        scientific_form(&digits, exponent)
    };
    if value < 0.0 {
        format!("-{body}")
    } else {
        body
    }
}

#[allow(clippy::cast_sign_loss)]
fn fixed_form(digits: &str, exponent: i32) -> String {
    if exponent < 0 {
        let leading = "0".repeat((-exponent - 1) as usize);
        return format!("0.{leading}{digits}");
    }
    let point = exponent as usize + 1;
    if point >= digits.len() {
        let mut out = digits.to_owned();
        out.push_str(&"0".repeat(point - digits.len()));
        out
    } else {
        format!("{}.{}", &digits[..point], &digits[point..])
    }
}

fn scientific_form(digits: &str, exponent: i32) -> String {
    let sign = if exponent < 0 { '-' } else { '+' };
    let magnitude = exponent.unsigned_abs();
    let (head, tail) = digits.split_at(1);
    if tail.is_empty() {
        format!("{head}E{sign}{magnitude:02}")
    } else {
        format!("{head}.{tail}E{sign}{magnitude:02}")
    }
}
