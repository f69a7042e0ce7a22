//! The `<<` and `>>` operators.
//!
//! The shifted operand takes its 64-bit numeric view and the count its
//! 32-bit view; the count is used modulo the 64-bit word width. A
//! non-negative count past 63 wraps silently, the way the host word
//! width has always made it. A negative count becomes a shift the other
//! way by its absolute value, flagged with
//! [`CoercionFlags::SHIFT_WRAPPED`] so analysis can say so.

use crate::convert::{to_int, to_number};
use crate::value::GuestValue;

use super::{narrow, Coerced, CoercionFlags};

pub fn shift_left(x: &GuestValue, count: &GuestValue) -> Coerced<GuestValue> {
    let value = to_number(x).long_value;
    let by = to_int(count);
    let amount = by.unsigned_abs() % 64;
    if by < 0 {
        Coerced::flagged(narrow(value >> amount), CoercionFlags::SHIFT_WRAPPED)
    } else {
        Coerced::clean(narrow(value << amount))
    }
}

/// Arithmetic right shift; the sign bit fills in from the left.
pub fn shift_right(x: &GuestValue, count: &GuestValue) -> Coerced<GuestValue> {
    let value = to_number(x).long_value;
    let by = to_int(count);
    let amount = by.unsigned_abs() % 64;
    if by < 0 {
        Coerced::flagged(narrow(value << amount), CoercionFlags::SHIFT_WRAPPED)
    } else {
        Coerced::clean(narrow(value >> amount))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::array::GuestArray;

    fn int(n: i32) -> GuestValue {
        GuestValue::Int(n)
    }

    #[test]
    fn results_take_the_narrowest_width() {
        assert_eq!(shift_left(&int(1), &int(3)).value, GuestValue::Int(8));
        assert_eq!(
            shift_left(&int(1), &int(31)).value,
            GuestValue::Long(1_i64 << 31)
        );
        assert_eq!(
            shift_left(&int(1), &int(63)).value,
            GuestValue::Long(i64::MIN)
        );
    }

    #[test]
    fn counts_wrap_at_the_word_width_silently() {
        let wrapped = shift_left(&int(1), &int(64));
        assert!(wrapped.is_clean());
        assert_eq!(wrapped.value, GuestValue::Int(1));

        // 100 % 64 = 36, out past the int width
        assert_eq!(
            shift_left(&int(1), &int(100)).value,
            GuestValue::Long(1_i64 << 36)
        );
    }

    #[test]
    fn negative_counts_shift_the_other_way_with_a_flag() {
        let result = shift_left(&int(8), &int(-1));
        assert_eq!(result.flags, CoercionFlags::SHIFT_WRAPPED);
        assert_eq!(result.value, GuestValue::Int(4));

        let mirrored = shift_right(&int(1), &int(-3));
        assert_eq!(mirrored.flags, CoercionFlags::SHIFT_WRAPPED);
        assert_eq!(mirrored.value, GuestValue::Int(8));

        // -64 wraps to a shift by zero, still flagged
        let zero = shift_left(&int(5), &int(-64));
        assert_eq!(zero.flags, CoercionFlags::SHIFT_WRAPPED);
        assert_eq!(zero.value, GuestValue::Int(5));
    }

    #[test]
    fn right_shift_is_arithmetic() {
        assert_eq!(shift_right(&int(-8), &int(1)).value, GuestValue::Int(-4));
        assert_eq!(shift_right(&int(-1), &int(40)).value, GuestValue::Int(-1));
    }

    #[test]
    fn operands_classify_like_any_other_number() {
        assert_eq!(
            shift_left(&GuestValue::str("4"), &GuestValue::str("2")).value,
            GuestValue::Int(16)
        );

        // an array shifts as its element count, cleanly
        let mut array = GuestArray::new();
        array.push(int(0));
        array.push(int(0));
        let result = shift_left(&GuestValue::array(array), &int(2));
        assert!(result.is_clean());
        assert_eq!(result.value, GuestValue::Int(8));
    }
}
