//! Interned name identifiers.

/// Interned string id, resolved through [`Interner`](crate::Interner).
///
/// Cheap to copy and compare; two names are equal iff the strings they
/// intern are equal. Guest identifiers (variables, functions, constants)
/// are interned once at parse time and carried as `Name`s everywhere else.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(u32);

impl Name {
    /// The pre-interned empty string.
    pub const EMPTY: Name = Name(0);

    /// Wrap a raw interner index.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Name(raw)
    }

    /// The raw interner index.
    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl std::fmt::Debug for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

static_assert_size!(Name, 4);
