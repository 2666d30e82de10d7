//! String interner for member names, callable names and tags.
//!
//! Owned by an [`Env`](crate::Env); interning takes `&mut self`, which keeps
//! the interner free of locks. The environment is never shared across
//! threads while it is being mutated.

use super::Name;
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// Error when interning a string fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InternError {
    /// The table already holds `u32::MAX` strings.
    #[error("interner exceeded capacity: {count} strings, max is {}", u32::MAX)]
    Overflow { count: usize },
}

/// Deduplicating string table.
///
/// Index 0 is always the empty string ([`Name::EMPTY`]).
pub struct StringInterner {
    /// Map from string content to its index.
    map: FxHashMap<Rc<str>, u32>,
    /// Storage for string contents, indexed by `Name::index()`.
    strings: Vec<Rc<str>>,
}

impl StringInterner {
    /// Create an interner holding only the empty string.
    pub fn new() -> Self {
        let empty: Rc<str> = Rc::from("");
        let mut map = FxHashMap::default();
        map.insert(Rc::clone(&empty), 0);
        Self {
            map,
            strings: vec![empty],
        }
    }

    /// Try to intern a string, returning its Name or an error on overflow.
    pub fn try_intern(&mut self, s: &str) -> Result<Name, InternError> {
        if let Some(&index) = self.map.get(s) {
            return Ok(Name::from_raw(index));
        }

        let index = u32::try_from(self.strings.len()).map_err(|_| InternError::Overflow {
            count: self.strings.len(),
        })?;
        let stored: Rc<str> = Rc::from(s);
        self.strings.push(Rc::clone(&stored));
        self.map.insert(stored, index);
        Ok(Name::from_raw(index))
    }

    /// Look up a string without interning it.
    pub fn get(&self, s: &str) -> Option<Name> {
        self.map.get(s).map(|&index| Name::from_raw(index))
    }

    /// Look up the string for a Name.
    ///
    /// Names from a different interner resolve to the empty string when out
    /// of range.
    pub fn lookup(&self, name: Name) -> &str {
        self.strings.get(name.index()).map_or("", |s| s)
    }

    /// Number of interned strings, including the empty string.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if the interner only has the empty string.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
