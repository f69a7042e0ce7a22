//! The guest value model.
//!
//! [`GuestValue`] is the compile-time representation of every value the
//! guest language can produce: the scalar widths the numeric tower moves
//! through (`Int` → `Long` → `Double`), two string flavors (text and raw
//! bytes), arrays, booleans, and null. Folding works on these directly, so
//! the enum and the conversion engine together define what "evaluating a
//! constant expression" means.
//!
//! Heap-backed variants share their payload through [`Heap`], a cheap
//! clone over immutable contents. Array values have copy semantics in the
//! guest language, so sharing is only sound until a value crosses a
//! copy-on-use or copy-on-assignment site; [`GuestValue::deep_copy`] is
//! that site's tool.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::array::GuestArray;

/// Shared immutable payload of a heap-backed value.
///
/// Cloning a `Heap` clones the handle, not the contents. Equality is by
/// contents, matching the guest language's notion that two strings with
/// the same bytes are the same value wherever they live.
pub struct Heap<T>(Arc<T>);

impl<T> Heap<T> {
    pub(crate) fn new(contents: T) -> Self {
        Heap(Arc::new(contents))
    }
}

impl<T> Clone for Heap<T> {
    fn clone(&self) -> Self {
        Heap(Arc::clone(&self.0))
    }
}

impl<T> Deref for Heap<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: PartialEq> PartialEq for Heap<T> {
    fn eq(&self, other: &Self) -> bool {
        *self.0 == *other.0
    }
}

impl<T: fmt::Debug> fmt::Debug for Heap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A value of the guest language, as the compiler sees it.
///
/// `Int` and `Long` are distinct variants even though every `Int` fits a
/// `Long`: operator results report the narrowest width that holds them,
/// and strict equality distinguishes the two. `Str` holds text; `Bytes`
/// holds a raw byte buffer that only turns into text through an explicit
/// conversion.
#[derive(Clone, Debug, PartialEq)]
pub enum GuestValue {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Double(f64),
    Str(Heap<String>),
    Bytes(Heap<Vec<u8>>),
    Array(Heap<GuestArray>),
}

impl GuestValue {
    pub fn str(text: impl Into<String>) -> Self {
        GuestValue::Str(Heap::new(text.into()))
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        GuestValue::Bytes(Heap::new(bytes.into()))
    }

    pub fn array(array: GuestArray) -> Self {
        GuestValue::Array(Heap::new(array))
    }

    /// A structurally fresh copy, as guest assignment and argument
    /// passing require for arrays.
    ///
    /// Scalars and strings are immutable, so their handles are shared;
    /// arrays are rebuilt element by element, recursively.
    #[must_use]
    pub fn deep_copy(&self) -> GuestValue {
        match self {
            GuestValue::Array(array) => GuestValue::array(array.deep_copy()),
            other => other.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::array::ArrayKey;

    #[test]
    fn heap_equality_is_by_contents() {
        let a = GuestValue::str("abc");
        let b = GuestValue::str("abc");
        assert_eq!(a, b);
        assert_ne!(a, GuestValue::str("abd"));
        assert_ne!(a, GuestValue::bytes(*b"abc"));
    }

    #[test]
    fn clone_shares_the_array_but_deep_copy_does_not() {
        let mut inner = GuestArray::new();
        inner.push(GuestValue::Int(1));
        let mut outer = GuestArray::new();
        outer.insert(ArrayKey::Str("child".into()), GuestValue::array(inner));
        let value = GuestValue::array(outer);

        let shared = value.clone();
        let fresh = value.deep_copy();
        assert_eq!(shared, value);
        assert_eq!(fresh, value);

        let GuestValue::Array(original) = &value else {
            panic!("not an array");
        };
        let GuestValue::Array(copied) = &fresh else {
            panic!("not an array");
        };
        assert!(!std::ptr::eq(&**original, &**copied));
    }

    #[test]
    fn int_and_long_are_distinct_values() {
        assert_ne!(GuestValue::Int(5), GuestValue::Long(5));
    }
}
