//! The bitwise operators, on the 64-bit integer view.
//!
//! The binary three are unconditionally clean: both operands go through
//! [`to_long`] (so an array participates as zero) and the result takes
//! the narrowest width. `~` is the odd one out, preserving its
//! operand's width, passing null through, and rejecting what it cannot
//! read as bits.

use crate::convert::{to_long, to_number};
use crate::value::GuestValue;

use super::{narrow, Coerced, CoercionFlags};

pub fn bit_and(x: &GuestValue, y: &GuestValue) -> GuestValue {
    narrow(to_long(x) & to_long(y))
}

pub fn bit_or(x: &GuestValue, y: &GuestValue) -> GuestValue {
    narrow(to_long(x) | to_long(y))
}

pub fn bit_xor(x: &GuestValue, y: &GuestValue) -> GuestValue {
    narrow(to_long(x) ^ to_long(y))
}

/// Unary `~`. An int stays an int and a long stays a long, however
/// small the complement; doubles and text read their 64-bit value
/// first and answer as longs.
#[allow(clippy::cast_possible_truncation)]
pub fn bit_not(x: &GuestValue) -> Coerced<GuestValue> {
    match x {
        GuestValue::Null => Coerced::clean(GuestValue::Null),
        GuestValue::Int(int) => Coerced::clean(GuestValue::Int(!*int)),
        GuestValue::Long(long) => Coerced::clean(GuestValue::Long(!*long)),
        GuestValue::Double(double) => Coerced::clean(GuestValue::Long(!(*double as i64))),
        GuestValue::Str(_) | GuestValue::Bytes(_) => {
            Coerced::clean(GuestValue::Long(!to_number(x).long_value))
        }
        GuestValue::Bool(_) | GuestValue::Array(_) => {
            Coerced::flagged(GuestValue::Null, CoercionFlags::UNSUPPORTED)
        }
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
    fn binary_ops_narrow_their_results() {
        assert_eq!(bit_and(&int(0b1100), &int(0b1010)), GuestValue::Int(0b1000));
        assert_eq!(bit_or(&int(0b1100), &int(0b1010)), GuestValue::Int(0b1110));
        assert_eq!(bit_xor(&int(0b1100), &int(0b1010)), GuestValue::Int(0b0110));
        assert_eq!(
            bit_and(&GuestValue::Long(i64::MAX), &GuestValue::Long(-1)),
            GuestValue::Long(i64::MAX)
        );
    }

    #[test]
    fn operands_convert_through_the_long_view() {
        assert_eq!(bit_or(&GuestValue::str("6"), &GuestValue::Bool(true)), GuestValue::Int(7));
        assert_eq!(bit_and(&GuestValue::Double(6.9), &int(3)), GuestValue::Int(2));

        // the long view of an array is zero, not its count
        let mut array = GuestArray::new();
        array.push(int(1));
        assert_eq!(bit_or(&GuestValue::array(array), &int(5)), GuestValue::Int(5));
    }

    #[test]
    fn complement_keeps_the_operand_width() {
        assert_eq!(bit_not(&int(0)).value, GuestValue::Int(-1));
        assert_eq!(bit_not(&GuestValue::Long(0)).value, GuestValue::Long(-1));
        assert_eq!(bit_not(&GuestValue::Double(2.9)).value, GuestValue::Long(-3));
        assert_eq!(bit_not(&GuestValue::str("5")).value, GuestValue::Long(-6));
        assert_eq!(bit_not(&GuestValue::Null).value, GuestValue::Null);
    }

    #[test]
    fn complement_rejects_booleans_and_arrays() {
        let rejected = bit_not(&GuestValue::Bool(true));
        assert_eq!(rejected.flags, CoercionFlags::UNSUPPORTED);
        assert_eq!(rejected.value, GuestValue::Null);
        assert_eq!(
            bit_not(&GuestValue::array(GuestArray::new())).flags,
            CoercionFlags::UNSUPPORTED
        );
    }
}
