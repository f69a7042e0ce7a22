//! Loose comparison and identity.
//!
//! One ordering backs the whole relational family: `==`, `!=`, `<`,
//! `<=`, `>` and `>=` all read off [`compare`], and [`loose_eq`] is
//! literally `compare == Equal`. The ladder runs null, then boolean,
//! then arrays, then text, with everything left falling through to the
//! numeric tower. Identity ([`strict_eq`]) is separate and structural:
//! same kind, same payload, no coercion at all.

use std::cmp::Ordering;

use crate::array::GuestArray;
use crate::convert::{to_boolean, to_number};
use crate::number::NumberInfo;
use crate::value::GuestValue;

use super::{Coerced, CoercionFlags};

/// The guest's regular (loose) equality.
pub fn loose_eq(left: &GuestValue, right: &GuestValue) -> bool {
    compare(left, right).value == Ordering::Equal
}

/// The guest's regular three-way comparison.
///
/// Total. The only degradation is [`CoercionFlags::INCOMPARABLE`], when
/// two arrays share no key shape; the order then falls back to
/// left-greater so the result is still usable.
pub fn compare(left: &GuestValue, right: &GuestValue) -> Coerced<Ordering> {
    match (left, right) {
        // Null equals whatever is zero-ish for its own kind and is less
        // than everything else.
        (GuestValue::Null, GuestValue::Null) => Coerced::clean(Ordering::Equal),
        (GuestValue::Null, other) => Coerced::clean(if is_zeroish(other) {
            Ordering::Equal
        } else {
            Ordering::Less
        }),
        (other, GuestValue::Null) => Coerced::clean(if is_zeroish(other) {
            Ordering::Equal
        } else {
            Ordering::Greater
        }),

        // A boolean on either side forces both sides to truthiness.
        (GuestValue::Bool(b), other) => Coerced::clean(b.cmp(&to_boolean(other))),
        (other, GuestValue::Bool(b)) => Coerced::clean(to_boolean(other).cmp(b)),

        (GuestValue::Array(x), GuestValue::Array(y)) => compare_arrays(x, y),
        // Past the null and boolean rungs an array outranks any scalar.
        (GuestValue::Array(_), _) => Coerced::clean(Ordering::Greater),
        (_, GuestValue::Array(_)) => Coerced::clean(Ordering::Less),

        (
            x @ (GuestValue::Str(_) | GuestValue::Bytes(_)),
            y @ (GuestValue::Str(_) | GuestValue::Bytes(_)),
        ) => Coerced::clean(compare_texts(x, y)),

        // Number against number, or number against one piece of text.
        _ => Coerced::clean(compare_numeric(left, right)),
    }
}

/// The guest's identity test. No coercion: kinds must match, except
/// that text is one kind whether it lives as characters or bytes.
pub fn strict_eq(left: &GuestValue, right: &GuestValue) -> bool {
    match (left, right) {
        (GuestValue::Null, GuestValue::Null) => true,
        (GuestValue::Bool(x), GuestValue::Bool(y)) => x == y,
        (GuestValue::Int(x), GuestValue::Int(y)) => x == y,
        (GuestValue::Long(x), GuestValue::Long(y)) => x == y,
        (GuestValue::Double(x), GuestValue::Double(y)) => {
            compare_doubles(*x, *y) == Ordering::Equal
        }
        (GuestValue::Str(x), GuestValue::Str(y)) => x.as_bytes() == y.as_bytes(),
        (GuestValue::Str(x), GuestValue::Bytes(y)) => x.as_bytes() == y.as_slice(),
        (GuestValue::Bytes(x), GuestValue::Str(y)) => x.as_slice() == y.as_bytes(),
        (GuestValue::Bytes(x), GuestValue::Bytes(y)) => x.as_slice() == y.as_slice(),
        (GuestValue::Array(x), GuestValue::Array(y)) => strict_eq_arrays(x, y),
        _ => false,
    }
}

/// Whether a value is the zero of its own kind, which is what null
/// compares equal to.
fn is_zeroish(value: &GuestValue) -> bool {
    match value {
        GuestValue::Null => true,
        GuestValue::Bool(b) => !b,
        GuestValue::Int(int) => *int == 0,
        GuestValue::Long(long) => *long == 0,
        GuestValue::Double(double) => *double == 0.0,
        GuestValue::Str(text) => text.is_empty(),
        GuestValue::Bytes(bytes) => bytes.is_empty(),
        GuestValue::Array(array) => array.is_empty(),
    }
}

/// Three-way double comparison where NaN orders equal to anything, so
/// the relational operators all answer false on it at once.
fn compare_doubles(x: f64, y: f64) -> Ordering {
    if x > y {
        Ordering::Greater
    } else if x < y {
        Ordering::Less
    } else {
        Ordering::Equal
    }
}

/// Comparison through the numeric tower. Text contributes its
/// classified prefix value here, zero when nothing numeric leads it;
/// the width is double as soon as either side's class says so.
fn compare_numeric(left: &GuestValue, right: &GuestValue) -> Ordering {
    let x = to_number(left);
    let y = to_number(right);
    if (x.info | y.info).contains(NumberInfo::DOUBLE) {
        compare_doubles(x.double_value, y.double_value)
    } else {
        x.long_value.cmp(&y.long_value)
    }
}

fn raw_bytes(value: &GuestValue) -> &[u8] {
    match value {
        GuestValue::Str(text) => text.as_bytes(),
        GuestValue::Bytes(bytes) => bytes,
        _ => &[],
    }
}

/// Text against text: numeric when both sides are complete numbers
/// (double width if either is), byte-wise ordinal otherwise.
fn compare_texts(left: &GuestValue, right: &GuestValue) -> Ordering {
    let x = to_number(left);
    let y = to_number(right);
    if x.info.contains(NumberInfo::IS_NUMBER) && y.info.contains(NumberInfo::IS_NUMBER) {
        if (x.info | y.info).contains(NumberInfo::DOUBLE) {
            compare_doubles(x.double_value, y.double_value)
        } else {
            x.long_value.cmp(&y.long_value)
        }
    } else {
        raw_bytes(left).cmp(raw_bytes(right))
    }
}

/// Arrays order by length first, then pairwise: walk the left array in
/// its own order and look each key up on the right. A key the right
/// side lacks means the shapes are incomparable; flag it and call the
/// left side greater.
fn compare_arrays(x: &GuestArray, y: &GuestArray) -> Coerced<Ordering> {
    match x.len().cmp(&y.len()) {
        Ordering::Equal => {}
        order => return Coerced::clean(order),
    }
    for (key, x_value) in x.entries() {
        let Some(y_value) = y.get(key) else {
            return Coerced::flagged(Ordering::Greater, CoercionFlags::INCOMPARABLE);
        };
        let inner = compare(x_value, y_value);
        if inner.value != Ordering::Equal {
            return inner;
        }
    }
    Coerced::clean(Ordering::Equal)
}

fn strict_eq_arrays(x: &GuestArray, y: &GuestArray) -> bool {
    if x.len() != y.len() {
        return false;
    }
    x.entries()
        .iter()
        .zip(y.entries())
        .all(|((x_key, x_value), (y_key, y_value))| x_key == y_key && strict_eq(x_value, y_value))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::array::ArrayKey;

    fn less(left: &GuestValue, right: &GuestValue) {
        assert_eq!(compare(left, right).value, Ordering::Less, "{left:?} < {right:?}");
        assert_eq!(compare(right, left).value, Ordering::Greater, "{right:?} > {left:?}");
    }

    fn equal(left: &GuestValue, right: &GuestValue) {
        assert_eq!(compare(left, right).value, Ordering::Equal, "{left:?} == {right:?}");
        assert!(loose_eq(left, right), "{left:?} == {right:?}");
        assert!(loose_eq(right, left), "{right:?} == {left:?}");
    }

    fn array_of(values: &[GuestValue]) -> GuestValue {
        let mut array = GuestArray::new();
        for value in values {
            array.push(value.clone());
        }
        GuestValue::array(array)
    }

    #[test]
    fn null_equals_the_zero_of_each_kind() {
        equal(&GuestValue::Null, &GuestValue::Null);
        equal(&GuestValue::Null, &GuestValue::Int(0));
        equal(&GuestValue::Null, &GuestValue::Long(0));
        equal(&GuestValue::Null, &GuestValue::Double(-0.0));
        equal(&GuestValue::Null, &GuestValue::str(""));
        equal(&GuestValue::Null, &GuestValue::bytes(Vec::new()));
        equal(&GuestValue::Null, &GuestValue::Bool(false));
        equal(&GuestValue::Null, &GuestValue::array(GuestArray::new()));

        less(&GuestValue::Null, &GuestValue::Int(-5));
        less(&GuestValue::Null, &GuestValue::str("0"));
        less(&GuestValue::Null, &GuestValue::Double(f64::NAN));
        less(&GuestValue::Null, &array_of(&[GuestValue::Null]));
    }

    #[test]
    fn booleans_compare_by_truthiness() {
        less(&GuestValue::Bool(false), &GuestValue::Bool(true));
        equal(&GuestValue::Bool(true), &GuestValue::Int(-7));
        equal(&GuestValue::Bool(true), &GuestValue::str("0.0"));
        equal(&GuestValue::Bool(false), &GuestValue::str("0"));
        less(&GuestValue::Bool(false), &array_of(&[GuestValue::Int(1)]));
        equal(&GuestValue::Bool(true), &array_of(&[GuestValue::Int(1)]));
    }

    #[test]
    fn numbers_compare_across_widths() {
        less(&GuestValue::Int(2), &GuestValue::Long(1 << 40));
        less(&GuestValue::Int(2), &GuestValue::Double(2.5));
        equal(&GuestValue::Int(5), &GuestValue::Long(5));
        equal(&GuestValue::Long(3), &GuestValue::Double(3.0));
        // i64::MAX survives the long path that a double round-trip
        // would flatten
        less(&GuestValue::Long(i64::MAX - 1), &GuestValue::Long(i64::MAX));
    }

    #[test]
    fn nan_is_equal_to_everything_numeric() {
        let nan = GuestValue::Double(f64::NAN);
        equal(&nan, &GuestValue::Double(5.0));
        equal(&nan, &GuestValue::Int(0));
        equal(&nan, &nan);
        equal(&nan, &GuestValue::str("10"));
    }

    #[test]
    fn text_against_a_number_goes_numeric_even_when_garbage() {
        equal(&GuestValue::str("10"), &GuestValue::Int(10));
        less(&GuestValue::str("9"), &GuestValue::Int(10));
        equal(&GuestValue::str("junk"), &GuestValue::Int(0));
        less(&GuestValue::str("junk"), &GuestValue::Int(3));
        less(&GuestValue::Int(12), &GuestValue::str("12.5xyz"));
        equal(&GuestValue::str(" 0x1A"), &GuestValue::Int(26));
    }

    #[test]
    fn two_texts_compare_numerically_only_when_both_are_numbers() {
        equal(&GuestValue::str("1e1"), &GuestValue::str("10"));
        equal(&GuestValue::str("10"), &GuestValue::str(" 10 "));
        less(&GuestValue::str("2"), &GuestValue::str("10"));
        // one side stops being a number and ordinal bytes take over
        less(&GuestValue::str("10a"), &GuestValue::str("2"));
        less(&GuestValue::str("abc"), &GuestValue::str("abd"));
        equal(&GuestValue::str("12"), &GuestValue::bytes(*b"12"));
        less(&GuestValue::bytes(*b"za"), &GuestValue::str("zb"));
    }

    #[test]
    fn arrays_order_by_length_then_by_key_lookup() {
        let short = array_of(&[GuestValue::Int(9)]);
        let long = array_of(&[GuestValue::Int(1), GuestValue::Int(2)]);
        less(&short, &long);

        let a = array_of(&[GuestValue::Int(1), GuestValue::Int(2)]);
        let b = array_of(&[GuestValue::Int(1), GuestValue::Int(3)]);
        less(&a, &b);
        equal(&a, &a.deep_copy());

        // an array outranks scalars once null and bool are out of the way
        less(&GuestValue::str("zzz"), &a);
        less(&GuestValue::Double(1e300), &a);
    }

    #[test]
    fn mismatched_array_shapes_flag_incomparable() {
        let mut left = GuestArray::new();
        left.insert(ArrayKey::Str("a".into()), GuestValue::Int(1));
        let mut right = GuestArray::new();
        right.insert(ArrayKey::Str("b".into()), GuestValue::Int(1));

        let order = compare(&GuestValue::array(left), &GuestValue::array(right));
        assert_eq!(order.value, Ordering::Greater);
        assert!(order.flags.contains(CoercionFlags::INCOMPARABLE));
    }

    #[test]
    fn order_ignores_key_position_but_identity_does_not() {
        let mut ab = GuestArray::new();
        ab.insert(ArrayKey::Str("a".into()), GuestValue::Int(1));
        ab.insert(ArrayKey::Str("b".into()), GuestValue::Int(2));
        let mut ba = GuestArray::new();
        ba.insert(ArrayKey::Str("b".into()), GuestValue::Int(2));
        ba.insert(ArrayKey::Str("a".into()), GuestValue::Int(1));

        let ab = GuestValue::array(ab);
        let ba = GuestValue::array(ba);
        equal(&ab, &ba);
        assert!(!strict_eq(&ab, &ba));
    }

    #[test]
    fn identity_requires_the_same_kind() {
        assert!(strict_eq(&GuestValue::Int(5), &GuestValue::Int(5)));
        assert!(!strict_eq(&GuestValue::Int(5), &GuestValue::Long(5)));
        assert!(!strict_eq(&GuestValue::Int(1), &GuestValue::Bool(true)));
        assert!(!strict_eq(&GuestValue::str("10"), &GuestValue::str("1e1")));
        assert!(strict_eq(&GuestValue::Null, &GuestValue::Null));
        assert!(!strict_eq(&GuestValue::Null, &GuestValue::Int(0)));
    }

    #[test]
    fn identity_unifies_text_and_bytes() {
        assert!(strict_eq(&GuestValue::str("ab"), &GuestValue::bytes(*b"ab")));
        assert!(strict_eq(&GuestValue::bytes(*b"ab"), &GuestValue::str("ab")));
        assert!(!strict_eq(&GuestValue::str("ab"), &GuestValue::bytes(*b"aB")));
    }

    #[test]
    fn identity_on_arrays_is_pairwise_strict() {
        let ints = array_of(&[GuestValue::Int(1), GuestValue::Int(2)]);
        assert!(strict_eq(&ints, &ints.deep_copy()));

        let longs = array_of(&[GuestValue::Long(1), GuestValue::Long(2)]);
        assert!(loose_eq(&ints, &longs));
        assert!(!strict_eq(&ints, &longs));
    }
}
