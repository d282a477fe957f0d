//! Concurrent identifier and string-literal interning.
//!
//! The intern table is the one structure shared mutably across modules while they are lexed, parsed, and analysed in
//! parallel. Insertion is insert-or-get: interning the same text twice (from any thread, in any order) yields the
//! same [`Atom`].
//!
//! ## Examples
//! ```rust
//! use asthra::frontend::intern::Interner;
//!
//! let interner = Interner::new();
//! let a = interner.intern("point");
//! let b = interner.intern("point");
//! assert_eq!(a, b);
//! assert_eq!(interner.resolve(a).as_deref(), Some("point"));
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// Interned string identifier, stable for the lifetime of its [`Interner`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Atom(u32);

impl Atom {
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Atom({})", self.0)
    }
}

/// Insert-or-get string table, safe to share across threads behind an `Arc`.
#[derive(Debug, Default)]
pub struct Interner {
    /// Text to id.
    by_text: DashMap<Arc<str>, Atom>,
    /// Id to text.
    by_id: DashMap<u32, Arc<str>>,
    next_id: AtomicU32,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shareable handle for use from several worker threads.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Intern `text`, returning the existing id when it was seen before.
    pub fn intern(&self, text: &str) -> Atom {
        if let Some(atom) = self.by_text.get(text) {
            return *atom;
        }

        // The entry lock makes allocation and publication one step, so racing threads agree on a single id.
        match self.by_text.entry(Arc::from(text)) {
            Entry::Occupied(existing) => *existing.get(),
            Entry::Vacant(slot) => {
                let atom = Atom(self.next_id.fetch_add(1, Ordering::Relaxed));
                self.by_id.insert(atom.0, Arc::clone(slot.key()));
                slot.insert(atom);
                atom
            }
        }
    }

    /// Look up an id without inserting.
    pub fn get(&self, text: &str) -> Option<Atom> {
        self.by_text.get(text).map(|atom| *atom)
    }

    /// Text of an interned id.
    pub fn resolve(&self, atom: Atom) -> Option<Arc<str>> {
        self.by_id.get(&atom.0).map(|text| Arc::clone(&text))
    }

    pub fn len(&self) -> usize {
        self.by_text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn test_intern_is_idempotent() {
        let interner = Interner::new();
        let a = interner.intern("x");
        let b = interner.intern("y");
        assert_ne!(a, b);
        assert_eq!(interner.intern("x"), a);
        assert_eq!(interner.len(), 2);
        assert_eq!(interner.get("z"), None);
    }

    #[test]
    fn test_concurrent_intern_agrees_on_ids() {
        let interner = Interner::shared();
        let words: Vec<String> = (0..64).map(|i| format!("name_{}", i % 16)).collect();

        let ids: Vec<Atom> = words.par_iter().map(|w| interner.intern(w)).collect();

        assert_eq!(interner.len(), 16);
        for (word, id) in words.iter().zip(&ids) {
            assert_eq!(interner.resolve(*id).as_deref(), Some(word.as_str()));
            assert_eq!(interner.intern(word), *id);
        }
    }
}
