//! Operator semantics over guest values.
//!
//! Each operator is a pure function from operand values to a
//! [`Coerced`] result: the value the running program would observe plus
//! flags recording anything the coercion had to paper over. Nothing in
//! here raises; a caller that wants to warn inspects the flags, and a
//! folder that wants to be conservative declines to fold anything
//! flagged.

use bitflags::bitflags;

use crate::value::GuestValue;

pub mod arith;
pub mod bits;
pub mod compare;
pub mod concat;
pub mod incdec;
pub mod shift;

bitflags! {
    /// What a coercion had to do to stay total.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
    pub struct CoercionFlags: u8 {
        /// An operand kind the operator has no rule for; the result is
        /// that operator's fallback value.
        const UNSUPPORTED = 1;
        /// Integer division or remainder by zero; the result is `false`.
        const DIV_BY_ZERO = 2;
        /// A negative shift count was rewritten into a shift the other
        /// way.
        const SHIFT_WRAPPED = 4;
        /// The operands admit no meaningful order; the comparison fell
        /// back to a fixed answer.
        const INCOMPARABLE = 8;
    }
}

/// An operator result plus the flags describing any degradation.
#[derive(Clone, Debug, PartialEq)]
pub struct Coerced<T> {
    pub value: T,
    pub flags: CoercionFlags,
}

impl<T> Coerced<T> {
    pub fn clean(value: T) -> Self {
        Coerced {
            value,
            flags: CoercionFlags::empty(),
        }
    }

    pub fn flagged(value: T, flags: CoercionFlags) -> Self {
        Coerced { value, flags }
    }

    /// True when the value can stand in for the expression anywhere,
    /// with no diagnostic owed.
    pub fn is_clean(&self) -> bool {
        self.flags.is_empty()
    }
}

/// The narrowest integer variant holding `long`.
pub(crate) fn narrow(long: i64) -> GuestValue {
    match i32::try_from(long) {
        Ok(int) => GuestValue::Int(int),
        Err(_) => GuestValue::Long(long),
    }
}
