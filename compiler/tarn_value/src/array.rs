//! Guest arrays: ordered maps with normalized keys.
//!
//! A [`GuestArray`] remembers insertion order and looks entries up by
//! key, so it is a `Vec` of entries plus a key-to-slot index. Keys are
//! either 32-bit integers or text; every guest value normalizes to one of
//! the two through [`ArrayKey::from_value`], and canonical decimal text
//! ("42", "-7", "0") collapses to the integer key it spells. Appends take
//! the next integer index, which only ever moves forward.

use rustc_hash::FxHashMap;

use crate::value::GuestValue;

/// A normalized array key.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum ArrayKey {
    Int(i32),
    Str(Box<str>),
}

impl ArrayKey {
    /// Normalizes an arbitrary guest value into a key. Total: every
    /// value maps to something, however degenerate (an array indexes as
    /// the text key `"Array"`).
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_value(value: &GuestValue) -> ArrayKey {
        match value {
            GuestValue::Int(int) => ArrayKey::Int(*int),
            GuestValue::Str(text) => text_key(text),
            GuestValue::Bytes(bytes) => text_key(&String::from_utf8_lossy(bytes)),
            GuestValue::Bool(b) => ArrayKey::Int(i32::from(*b)),
            GuestValue::Double(d) => ArrayKey::Int(*d as i32),
            GuestValue::Long(long) => {
                ArrayKey::Int((*long).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
            }
            GuestValue::Null => ArrayKey::Str("".into()),
            GuestValue::Array(_) => ArrayKey::Str("Array".into()),
        }
    }
}

/// Collapses text spelling a canonical in-range decimal integer to the
/// integer key. "007", "-0", "1e5", an out-of-range count of digits, or
/// anything else non-canonical stays a text key.
fn text_key(text: &str) -> ArrayKey {
    let bytes = text.as_bytes();
    let digits = match bytes.first() {
        Some(b'-') => &bytes[1..],
        _ => bytes,
    };
    let negative = digits.len() != bytes.len();
    if digits.is_empty() || digits.len() > 10 || !digits.iter().all(u8::is_ascii_digit) {
        return ArrayKey::Str(text.into());
    }
    if digits[0] == b'0' && (negative || digits.len() > 1) {
        return ArrayKey::Str(text.into());
    }

    let mut value: i64 = 0;
    for &digit in digits {
        value = value * 10 + i64::from(digit - b'0');
    }
    if negative {
        value = -value;
    }
    match i32::try_from(value) {
        Ok(int) => ArrayKey::Int(int),
        Err(_) => ArrayKey::Str(text.into()),
    }
}

/// An insertion-ordered guest array.
#[derive(Clone, Debug, Default)]
pub struct GuestArray {
    entries: Vec<(ArrayKey, GuestValue)>,
    index: FxHashMap<ArrayKey, usize>,
    next_index: i32,
}

impl GuestArray {
    pub fn new() -> Self {
        GuestArray::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        GuestArray {
            entries: Vec::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, rustc_hash::FxBuildHasher),
            next_index: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts or overwrites. Overwriting keeps the key's original
    /// position in the entry order.
    ///
    /// An integer key at or past the append cursor pushes the cursor to
    /// just past itself; keys below it (negative ones included) leave it
    /// alone.
    pub fn insert(&mut self, key: ArrayKey, value: GuestValue) {
        if let Some(&slot) = self.index.get(&key) {
            self.entries[slot].1 = value;
            return;
        }
        if let ArrayKey::Int(int) = key {
            if int >= self.next_index {
                self.next_index = int.wrapping_add(1);
            }
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
    }

    /// Appends at the next integer index.
    pub fn push(&mut self, value: GuestValue) {
        self.insert(ArrayKey::Int(self.next_index), value);
    }

    pub fn get(&self, key: &ArrayKey) -> Option<&GuestValue> {
        self.index.get(key).map(|&slot| &self.entries[slot].1)
    }

    pub fn contains_key(&self, key: &ArrayKey) -> bool {
        self.index.contains_key(key)
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[(ArrayKey, GuestValue)] {
        &self.entries
    }

    /// A recursive copy sharing nothing mutable with the original. The
    /// append cursor carries over even when it is past every present key.
    #[must_use]
    pub fn deep_copy(&self) -> GuestArray {
        let mut copy = GuestArray::with_capacity(self.entries.len());
        for (key, value) in &self.entries {
            copy.insert(key.clone(), value.deep_copy());
        }
        copy.next_index = self.next_index;
        copy
    }

    /// Key-preserving union: this array's entries, then the other's
    /// entries whose keys are not already present. First writer wins;
    /// everything copied is a deep copy.
    #[must_use]
    pub fn union(&self, other: &GuestArray) -> GuestArray {
        let mut result = self.deep_copy();
        for (key, value) in &other.entries {
            if !result.contains_key(key) {
                result.insert(key.clone(), value.deep_copy());
            }
        }
        result
    }
}

impl PartialEq for GuestArray {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}
