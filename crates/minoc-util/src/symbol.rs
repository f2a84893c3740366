//! String interning.
//!
//! A [`Symbol`] is a 4-byte handle to an interned string. Identifiers and
//! operator names appear many times across tokens, AST nodes, and tables;
//! interning makes comparing them an integer compare and copying them free.
//!
//! Interned strings are leaked to obtain `'static` lifetime. The table lives
//! for the whole process and strings are never removed, so the total leak is
//! bounded by the size of the distinct names in the source.
//!
//! # Examples
//!
//! ```
//! use minoc_util::Symbol;
//!
//! let a = Symbol::intern("main");
//! let b = Symbol::intern("main");
//! assert_eq!(a, b);
//! assert_eq!(a.as_str(), "main");
//! ```

use std::fmt;
use std::sync::{LazyLock, RwLock};

use ahash::RandomState;
use dashmap::DashMap;

/// Handle to an interned string.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u32);

impl Symbol {
    /// Intern the given string, returning its stable handle.
    pub fn intern(string: &str) -> Symbol {
        INTERNER.intern(string)
    }

    /// Get the interned string.
    pub fn as_str(self) -> &'static str {
        INTERNER.get(self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", self.as_str())
    }
}

static INTERNER: LazyLock<Interner> = LazyLock::new(Interner::new);

/// Global string table.
///
/// Lookups go through a concurrent map keyed by string contents; the index
/// vector provides the reverse direction for [`Symbol::as_str`].
struct Interner {
    map: DashMap<&'static str, u32, RandomState>,
    strings: RwLock<Vec<&'static str>>,
}

impl Interner {
    fn new() -> Self {
        Self {
            map: DashMap::with_capacity_and_hasher(256, RandomState::new()),
            strings: RwLock::new(Vec::with_capacity(256)),
        }
    }

    fn intern(&self, string: &str) -> Symbol {
        if let Some(index) = self.map.get(string) {
            return Symbol(*index);
        }

        let mut strings = self.strings.write().unwrap();
        // Re-check under the write lock: another thread may have interned
        // the same string between the lookup above and here.
        if let Some(index) = self.map.get(string) {
            return Symbol(*index);
        }

        let leaked: &'static str = Box::leak(string.to_owned().into_boxed_str());
        let index = strings.len() as u32;
        strings.push(leaked);
        self.map.insert(leaked, index);
        Symbol(index)
    }

    fn get(&self, index: u32) -> &'static str {
        self.strings.read().unwrap()[index as usize]
    }
}
