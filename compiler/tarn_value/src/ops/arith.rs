//! The arithmetic operator family.
//!
//! Operands go through [`to_number`] first, so `"12abc"` takes part as
//! 12 and non-numeric text as 0 with no complaint; only arrays are
//! rejected (except in [`add`], where two arrays unite). Integer work
//! happens on the 64-bit view with the result narrowed afterwards, and
//! overflow at 64 bits falls over to doubles.

use crate::convert::to_number;
use crate::number::NumberInfo;
use crate::value::GuestValue;

use super::{narrow, Coerced, CoercionFlags};

/// Binary `+`.
///
/// Two arrays form their key-preserving union. For everything else the
/// 64-bit sum decides overflow, but the reported result skips the
/// 64-bit width: a sum that no longer fits 32 bits is already a double.
#[allow(clippy::cast_precision_loss)]
pub fn add(x: &GuestValue, y: &GuestValue) -> Coerced<GuestValue> {
    let nx = to_number(x);
    let ny = to_number(y);
    let info = nx.info | ny.info;

    if info.contains(NumberInfo::IS_ARRAY) {
        if let (GuestValue::Array(ax), GuestValue::Array(ay)) = (x, y) {
            return Coerced::clean(GuestValue::array(ax.union(ay)));
        }
        return Coerced::flagged(GuestValue::Int(0), CoercionFlags::UNSUPPORTED);
    }

    if info.contains(NumberInfo::DOUBLE) {
        return Coerced::clean(GuestValue::Double(nx.double_value + ny.double_value));
    }

    let sum = nx.long_value.wrapping_add(ny.long_value);
    let overflowed =
        (nx.long_value < 0) == (ny.long_value < 0) && (nx.long_value < 0) != (sum < 0);
    if overflowed {
        return Coerced::clean(GuestValue::Double(nx.double_value + ny.double_value));
    }
    match i32::try_from(sum) {
        Ok(int) => Coerced::clean(GuestValue::Int(int)),
        Err(_) => Coerced::clean(GuestValue::Double(sum as f64)),
    }
}

/// Binary `-`. Unlike [`add`], a result past 32 bits keeps the 64-bit
/// width; only 64-bit overflow falls over to doubles.
pub fn subtract(x: &GuestValue, y: &GuestValue) -> Coerced<GuestValue> {
    let nx = to_number(x);
    let ny = to_number(y);
    let info = nx.info | ny.info;

    if info.contains(NumberInfo::IS_ARRAY) {
        return Coerced::flagged(GuestValue::Int(0), CoercionFlags::UNSUPPORTED);
    }
    if info.contains(NumberInfo::DOUBLE) {
        return Coerced::clean(GuestValue::Double(nx.double_value - ny.double_value));
    }
    match nx.long_value.checked_sub(ny.long_value) {
        Some(difference) => Coerced::clean(narrow(difference)),
        None => Coerced::clean(GuestValue::Double(nx.double_value - ny.double_value)),
    }
}

/// Binary `*`.
pub fn multiply(x: &GuestValue, y: &GuestValue) -> Coerced<GuestValue> {
    let nx = to_number(x);
    let ny = to_number(y);
    let info = nx.info | ny.info;

    if info.contains(NumberInfo::IS_ARRAY) {
        return Coerced::flagged(GuestValue::Int(0), CoercionFlags::UNSUPPORTED);
    }
    if info.contains(NumberInfo::DOUBLE) {
        return Coerced::clean(GuestValue::Double(nx.double_value * ny.double_value));
    }
    match nx.long_value.checked_mul(ny.long_value) {
        Some(product) => Coerced::clean(narrow(product)),
        None => Coerced::clean(GuestValue::Double(nx.double_value * ny.double_value)),
    }
}

/// Binary `/`.
///
/// With a double operand this is plain IEEE division: a zero divisor
/// lands on an infinity or NaN, not on the zero-divisor flag. The flag
/// belongs to the integer path, where the guest answer is `false`.
/// Integer division that leaves a remainder reports the float quotient.
#[allow(clippy::cast_precision_loss)]
pub fn divide(x: &GuestValue, y: &GuestValue) -> Coerced<GuestValue> {
    let nx = to_number(x);
    let ny = to_number(y);
    let info = nx.info | ny.info;

    if info.contains(NumberInfo::IS_ARRAY) {
        return Coerced::flagged(GuestValue::Double(0.0), CoercionFlags::UNSUPPORTED);
    }
    if info.contains(NumberInfo::DOUBLE) {
        return Coerced::clean(GuestValue::Double(nx.double_value / ny.double_value));
    }
    if ny.long_value == 0 {
        return Coerced::flagged(GuestValue::Bool(false), CoercionFlags::DIV_BY_ZERO);
    }
    if ny.long_value == -1 && nx.long_value == i64::MIN {
        return Coerced::clean(GuestValue::Double(-(i64::MIN as f64)));
    }
    if nx.long_value % ny.long_value != 0 {
        return Coerced::clean(GuestValue::Double(nx.double_value / ny.double_value));
    }
    Coerced::clean(narrow(nx.long_value / ny.long_value))
}

/// Binary `%`, always on the 64-bit integer view of both operands.
///
/// The divisor is inspected first: a zero or `-1` divisor answers
/// without ever classifying the left operand.
pub fn remainder(x: &GuestValue, y: &GuestValue) -> Coerced<GuestValue> {
    let ny = to_number(y);
    if ny.info.contains(NumberInfo::IS_ARRAY) {
        return Coerced::flagged(GuestValue::Bool(false), CoercionFlags::UNSUPPORTED);
    }
    if ny.long_value == 0 {
        return Coerced::flagged(GuestValue::Bool(false), CoercionFlags::DIV_BY_ZERO);
    }
    if ny.long_value == -1 {
        return Coerced::clean(GuestValue::Int(0));
    }

    let nx = to_number(x);
    if nx.info.contains(NumberInfo::IS_ARRAY) {
        return Coerced::flagged(GuestValue::Bool(false), CoercionFlags::UNSUPPORTED);
    }
    Coerced::clean(narrow(nx.long_value % ny.long_value))
}

/// Unary `-`. Each width widens exactly when negation escapes it, and
/// negating the 64-bit minimum reaches the double tower.
#[allow(clippy::cast_precision_loss)]
pub fn negate(x: &GuestValue) -> Coerced<GuestValue> {
    let nx = to_number(x);
    if nx.info.contains(NumberInfo::IS_ARRAY) {
        return Coerced::flagged(GuestValue::Int(0), CoercionFlags::UNSUPPORTED);
    }

    let kind = nx.info & NumberInfo::TYPE_MASK;
    if kind == NumberInfo::DOUBLE {
        return Coerced::clean(GuestValue::Double(-nx.double_value));
    }
    if kind == NumberInfo::LONG {
        let negated = if nx.long_value == i64::MIN {
            GuestValue::Double(-(i64::MIN as f64))
        } else if nx.long_value == i64::from(i32::MAX) + 1 {
            GuestValue::Int(i32::MIN)
        } else {
            GuestValue::Long(-nx.long_value)
        };
        return Coerced::clean(negated);
    }
    if nx.int_value == i32::MIN {
        return Coerced::clean(GuestValue::Long(i64::from(i32::MAX) + 1));
    }
    Coerced::clean(GuestValue::Int(-nx.int_value))
}

/// Unary `+`: the operand re-expressed as its classified number.
pub fn plus(x: &GuestValue) -> Coerced<GuestValue> {
    let nx = to_number(x);
    if nx.info.contains(NumberInfo::IS_ARRAY) {
        return Coerced::flagged(GuestValue::Int(0), CoercionFlags::UNSUPPORTED);
    }

    let kind = nx.info & NumberInfo::TYPE_MASK;
    let value = if kind == NumberInfo::DOUBLE {
        GuestValue::Double(nx.double_value)
    } else if kind == NumberInfo::LONG {
        GuestValue::Long(nx.long_value)
    } else {
        GuestValue::Int(nx.int_value)
    };
    Coerced::clean(value)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;
    use crate::array::{ArrayKey, GuestArray};

    fn int(n: i32) -> GuestValue {
        GuestValue::Int(n)
    }

    #[test]
    fn add_stays_int_while_it_fits() {
        assert_eq!(add(&int(2), &int(3)).value, GuestValue::Int(5));
        assert_eq!(
            add(&GuestValue::str("5"), &GuestValue::str("7")).value,
            GuestValue::Int(12)
        );
    }

    #[test]
    fn add_past_the_int_bound_is_a_double_not_a_long() {
        let result = add(&int(i32::MAX), &int(1));
        assert!(result.is_clean());
        assert_eq!(result.value, GuestValue::Double(2_147_483_648.0));
    }

    #[test]
    fn add_past_the_long_bound_is_a_double() {
        let result = add(&GuestValue::Long(i64::MAX), &GuestValue::Long(i64::MAX));
        let GuestValue::Double(sum) = result.value else {
            panic!("expected a double, got {:?}", result.value);
        };
        let expected = i64::MAX as f64 + i64::MAX as f64;
        assert_eq!(sum, expected);
    }

    #[test]
    fn add_classifies_text_operands() {
        assert_eq!(add(&GuestValue::str("3.5"), &int(1)).value, GuestValue::Double(4.5));
        let silent = add(&GuestValue::str("abc"), &int(5));
        assert!(silent.is_clean());
        assert_eq!(silent.value, GuestValue::Int(5));
    }

    #[test]
    fn add_unites_two_arrays() {
        let mut left = GuestArray::new();
        left.push(int(1));
        let mut right = GuestArray::new();
        right.insert(ArrayKey::Int(0), int(9));
        right.insert(ArrayKey::Int(7), int(2));

        let result = add(&GuestValue::array(left), &GuestValue::array(right));
        assert!(result.is_clean());
        let GuestValue::Array(merged) = &result.value else {
            panic!("expected an array");
        };
        assert_eq!(merged.get(&ArrayKey::Int(0)), Some(&int(1)));
        assert_eq!(merged.get(&ArrayKey::Int(7)), Some(&int(2)));
    }

    #[test]
    fn add_rejects_an_array_mixed_with_a_scalar() {
        let result = add(&GuestValue::array(GuestArray::new()), &int(1));
        assert_eq!(result.flags, CoercionFlags::UNSUPPORTED);
        assert_eq!(result.value, GuestValue::Int(0));
    }

    #[test]
    fn subtract_keeps_the_long_width() {
        let result = subtract(&int(i32::MIN), &int(1));
        assert_eq!(result.value, GuestValue::Long(i64::from(i32::MIN) - 1));

        let overflow = subtract(&GuestValue::Long(i64::MIN), &int(1));
        let GuestValue::Double(_) = overflow.value else {
            panic!("expected a double, got {:?}", overflow.value);
        };
    }

    #[test]
    fn multiply_narrows_and_overflows() {
        assert_eq!(multiply(&int(6), &int(7)).value, GuestValue::Int(42));
        assert_eq!(
            multiply(&GuestValue::Long(1 << 40), &int(1)).value,
            GuestValue::Long(1 << 40)
        );
        let overflow = multiply(&GuestValue::Long(i64::MAX), &int(2));
        let GuestValue::Double(_) = overflow.value else {
            panic!("expected a double, got {:?}", overflow.value);
        };
    }

    #[test]
    fn divide_reports_exact_quotients_narrow() {
        assert_eq!(divide(&int(8), &int(2)).value, GuestValue::Int(4));
        assert_eq!(divide(&int(7), &int(2)).value, GuestValue::Double(3.5));
    }

    #[test]
    fn integer_division_by_zero_is_false_with_a_flag() {
        let result = divide(&int(1), &int(0));
        assert_eq!(result.flags, CoercionFlags::DIV_BY_ZERO);
        assert_eq!(result.value, GuestValue::Bool(false));

        // the float path has no such flag, it has infinities
        let float = divide(&GuestValue::Double(1.0), &int(0));
        assert!(float.is_clean());
        assert_eq!(float.value, GuestValue::Double(f64::INFINITY));
    }

    #[test]
    fn divide_long_min_by_minus_one_escapes_to_double() {
        let result = divide(&GuestValue::Long(i64::MIN), &int(-1));
        assert_eq!(result.value, GuestValue::Double(-(i64::MIN as f64)));
    }

    #[test]
    fn remainder_is_integer_only() {
        assert_eq!(remainder(&GuestValue::Double(10.5), &int(3)).value, GuestValue::Int(1));
        assert_eq!(remainder(&int(-7), &int(3)).value, GuestValue::Int(-1));
    }

    #[test]
    fn remainder_decides_on_the_divisor_before_looking_left() {
        let array = GuestValue::array(GuestArray::new());

        // a zero divisor answers first, even with an array on the left
        let by_zero = remainder(&array, &int(0));
        assert_eq!(by_zero.flags, CoercionFlags::DIV_BY_ZERO);

        let by_minus_one = remainder(&array, &int(-1));
        assert!(by_minus_one.is_clean());
        assert_eq!(by_minus_one.value, GuestValue::Int(0));

        let by_three = remainder(&array, &int(3));
        assert_eq!(by_three.flags, CoercionFlags::UNSUPPORTED);
    }

    #[test]
    fn negate_widens_exactly_at_each_bound() {
        assert_eq!(negate(&int(5)).value, GuestValue::Int(-5));
        assert_eq!(
            negate(&int(i32::MIN)).value,
            GuestValue::Long(i64::from(i32::MAX) + 1)
        );
        assert_eq!(
            negate(&GuestValue::Long(i64::from(i32::MAX) + 1)).value,
            GuestValue::Int(i32::MIN)
        );
        assert_eq!(
            negate(&GuestValue::Long(i64::MIN)).value,
            GuestValue::Double(-(i64::MIN as f64))
        );
        assert_eq!(negate(&GuestValue::str("3.5")).value, GuestValue::Double(-3.5));
        assert_eq!(
            negate(&GuestValue::array(GuestArray::new())).flags,
            CoercionFlags::UNSUPPORTED
        );
    }

    #[test]
    fn unary_plus_reexpresses_the_number() {
        assert_eq!(plus(&GuestValue::str(" 12abc")).value, GuestValue::Int(12));
        assert_eq!(plus(&GuestValue::Bool(true)).value, GuestValue::Int(1));
        assert_eq!(plus(&GuestValue::str("1e3")).value, GuestValue::Double(1000.0));
        assert_eq!(
            plus(&GuestValue::array(GuestArray::new())).flags,
            CoercionFlags::UNSUPPORTED
        );
    }

    fn scalar() -> impl Strategy<Value = GuestValue> {
        prop_oneof![
            Just(GuestValue::Null),
            any::<bool>().prop_map(GuestValue::Bool),
            any::<i32>().prop_map(GuestValue::Int),
            any::<i64>().prop_map(GuestValue::Long),
            (-1e300..1e300).prop_map(GuestValue::Double),
            "-?[0-9]{1,12}(\\.[0-9]{1,4})?".prop_map(GuestValue::str),
        ]
    }

    proptest! {
        #[test]
        fn add_commutes_over_scalars(a in scalar(), b in scalar()) {
            prop_assert_eq!(add(&a, &b), add(&b, &a));
        }
    }
}
