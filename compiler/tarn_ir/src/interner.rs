//! String interner for guest identifier storage.
//!
//! Provides O(1) interning and lookup with thread-safe concurrent access.
//! Interned strings are leaked to obtain `'static` references, so lookups
//! hand out bare `&'static str` without holding the lock.

use crate::name::Name;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// An [`Interner`] shared between the units of a batch.
pub type SharedInterner = Arc<Interner>;

/// Error when interning a string fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InternError {
    /// The interner exceeded `u32` id space.
    #[error("interner exceeded capacity: {count} strings, max is {max}", max = u32::MAX)]
    Overflow { count: usize },
}

struct InternerInner {
    /// Map from string content to its id.
    map: FxHashMap<&'static str, u32>,
    /// Id-indexed storage for string contents.
    strings: Vec<&'static str>,
}

/// Thread-safe string interner.
///
/// A single `RwLock` guards the map; the read path covers the common case
/// of re-interning an already-known identifier. Wrap in an `Arc` (see
/// [`SharedInterner`]) to share across compilation workers.
pub struct Interner {
    inner: RwLock<InternerInner>,
}

impl Interner {
    /// Create a new interner with the empty string pre-interned as
    /// [`Name::EMPTY`].
    #[must_use]
    pub fn new() -> Self {
        let empty: &'static str = "";
        let mut map = FxHashMap::default();
        map.insert(empty, 0);
        Interner {
            inner: RwLock::new(InternerInner { map, strings: vec![empty] }),
        }
    }

    /// Try to intern a string, returning its [`Name`] or an error on id
    /// space exhaustion.
    pub fn try_intern(&self, s: &str) -> Result<Name, InternError> {
        // Fast path: already interned.
        {
            let guard = self.inner.read();
            if let Some(&id) = guard.map.get(s) {
                return Ok(Name::from_raw(id));
            }
        }

        let mut guard = self.inner.write();

        // Double-check after acquiring the write lock.
        if let Some(&id) = guard.map.get(s) {
            return Ok(Name::from_raw(id));
        }

        // Leak the string to get a 'static lifetime.
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());

        let id = u32::try_from(guard.strings.len())
            .map_err(|_| InternError::Overflow { count: guard.strings.len() })?;
        guard.strings.push(leaked);
        guard.map.insert(leaked, id);

        Ok(Name::from_raw(id))
    }

    /// Intern a string, returning its [`Name`].
    ///
    /// # Panics
    /// Panics if the interner exceeds `u32` id space. Use [`try_intern`]
    /// for the fallible form.
    ///
    /// [`try_intern`]: Interner::try_intern
    #[inline]
    pub fn intern(&self, s: &str) -> Name {
        self.try_intern(s).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Look up the string for a [`Name`].
    ///
    /// Interned strings are never deallocated, so the returned reference
    /// outlives the interner's lock.
    ///
    /// # Panics
    /// Panics if `name` was not produced by this interner.
    #[must_use]
    pub fn lookup(&self, name: Name) -> &'static str {
        let guard = self.inner.read();
        guard.strings[name.as_u32() as usize]
    }

    /// Number of interned strings, including the pre-interned empty string.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().strings.len()
    }

    /// Whether the interner holds no strings. Never true in practice
    /// because the empty string is pre-interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Interner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interner").field("len", &self.len()).finish()
    }
}
