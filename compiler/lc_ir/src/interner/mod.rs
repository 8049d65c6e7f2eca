//! String interner for identifiers, constructor names and string literals.
//!
//! Interned strings are leaked, so lookups hand out `&'static str` and a
//! `Name` stays valid for the life of the process.

use super::Name;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fmt;

/// Error when interning a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternError {
    /// The table exceeded `u32::MAX` entries.
    Overflow { count: usize },
}

impl fmt::Display for InternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InternError::Overflow { count } => write!(
                f,
                "interner exceeded capacity: {count} strings, max is {}",
                u32::MAX
            ),
        }
    }
}

impl std::error::Error for InternError {}

/// Storage behind the lock.
struct InternTable {
    /// Map from string content to index.
    map: FxHashMap<&'static str, Name>,
    /// Strings by index.
    strings: Vec<&'static str>,
}

impl InternTable {
    fn with_empty() -> Self {
        let empty: &'static str = "";
        let mut map = FxHashMap::default();
        map.insert(empty, Name::EMPTY);
        InternTable {
            map,
            strings: vec![empty],
        }
    }
}

/// String interner.
///
/// Interning goes through `&self` behind a read-write lock, so one interner
/// can back several sessions; the evaluator itself is single-threaded.
pub struct StringInterner {
    table: RwLock<InternTable>,
}

impl StringInterner {
    /// Create a new interner with the built-in constructor and primitive
    /// names already present.
    pub fn new() -> Self {
        let interner = StringInterner {
            table: RwLock::new(InternTable::with_empty()),
        };
        interner.pre_intern_builtins();
        interner
    }

    /// Try to intern a string, returning its Name or an error on overflow.
    pub fn try_intern(&self, s: &str) -> Result<Name, InternError> {
        // Fast path: already interned
        if let Some(&name) = self.table.read().map.get(s) {
            return Ok(name);
        }

        let mut guard = self.table.write();

        // Double-check after acquiring write lock
        if let Some(&name) = guard.map.get(s) {
            return Ok(name);
        }

        let raw = u32::try_from(guard.strings.len()).map_err(|_| InternError::Overflow {
            count: guard.strings.len(),
        })?;
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let name = Name::from_raw(raw);
        guard.strings.push(leaked);
        guard.map.insert(leaked, name);
        Ok(name)
    }

    /// Intern a string, returning its Name.
    ///
    /// # Panics
    /// Panics if the interner exceeds capacity (over 4 billion strings).
    /// Use `try_intern` for fallible interning.
    #[inline]
    pub fn intern(&self, s: &str) -> Name {
        self.try_intern(s).unwrap_or_else(|e| panic!("{}", e))
    }

    /// Look up the string for a Name.
    ///
    /// Names minted by a different interner resolve to the empty string
    /// rather than panicking.
    pub fn lookup(&self, name: Name) -> &'static str {
        self.table
            .read()
            .strings
            .get(name.index())
            .copied()
            .unwrap_or("")
    }

    /// Look up an already-interned string without inserting it.
    pub fn get(&self, s: &str) -> Option<Name> {
        self.table.read().map.get(s).copied()
    }

    /// Names the runtime refers to without going through user syntax.
    fn pre_intern_builtins(&self) {
        const BUILTINS: &[&str] = &[
            // Prelude datatypes and constructors
            "Bool", "False", "True", "List", "Cons", "Nil", "Option", "None", "Some", "Pair",
            "Ordering", "EQ", "GT", "LT",
            // Prelude field names
            "head", "tail", "x", "fst", "snd",
            // Unary primitives
            "ceiling", "error", "floor", "log", "numToStr", "trace",
        ];

        for builtin in BUILTINS {
            self.intern(builtin);
        }
    }

    /// Number of interned strings, including the empty string.
    pub fn len(&self) -> usize {
        self.table.read().strings.len()
    }

    /// Check if only the empty string is interned.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}
