use std::collections::{HashMap, HashSet};

/// A function-like macro: `#define NAME(a, b) body...`.
///
/// The body is kept as the raw token texts of the definition line; parameter
/// binding happens positionally at expansion time.
#[derive(Clone, Debug)]
pub struct Macro {
    /// Ordered parameter names.
    pub params: Vec<String>,
    /// Body token texts, in definition order.
    pub body: Vec<String>,
}

/// The `#define` state of one preprocessor instance.
///
/// Object-like definitions live in a name-to-value map; function-like macros
/// live in their own namespace. The non-constant set flags definitions whose
/// value could not be resolved to a literal, which changes how a bare symbol
/// reads inside an `#if`. None of this state is rolled back when a
/// conditional block closes.
#[derive(Debug, Default)]
pub(crate) struct DefineTable {
    defines: HashMap<String, String>,
    macros: HashMap<String, Macro>,
    non_constant: HashSet<String>,
}

impl DefineTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.defines.get(name).map(String::as_str)
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.defines.contains_key(name)
    }

    /// Insert an object-like definition, returning the previous value.
    pub fn insert(&mut self, name: &str, value: String) -> Option<String> {
        self.defines.insert(name.to_string(), value)
    }

    /// Drop a definition and its non-constant flag. Function-like macros are
    /// a separate namespace and are left alone.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.non_constant.remove(name);
        self.defines.remove(name)
    }

    pub fn get_macro(&self, name: &str) -> Option<&Macro> {
        self.macros.get(name)
    }

    pub fn insert_macro(&mut self, name: &str, mac: Macro) -> Option<Macro> {
        self.macros.insert(name.to_string(), mac)
    }

    pub fn mark_non_constant(&mut self, name: &str) {
        self.non_constant.insert(name.to_string());
    }

    pub fn is_non_constant(&self, name: &str) -> bool {
        self.non_constant.contains(name)
    }

    pub fn defines(&self) -> &HashMap<String, String> {
        &self.defines
    }

    /// Follow a chain of definitions (`#define A B`, `#define B 5`) to its
    /// last resolvable value. Returns `None` for an undefined starting word
    /// when `none_if_missing` is set, otherwise echoes the word back. The
    /// hop count is capped so a self-referential chain terminates.
    pub fn resolve(&self, word: &str, none_if_missing: bool) -> Option<String> {
        let mut last = match self.defines.get(word) {
            Some(v) => v.clone(),
            None if none_if_missing => return None,
            None => return Some(word.to_string()),
        };
        for _ in 0..64 {
            match self.defines.get(&last) {
                Some(next) => last = next.clone(),
                None => break,
            }
        }
        Some(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_follows_chains() {
        let mut t = DefineTable::new();
        t.insert("B", "5".to_string());
        t.insert("A", "B".to_string());
        assert_eq!(t.resolve("A", true).as_deref(), Some("5"));
        assert_eq!(t.resolve("C", true), None);
        assert_eq!(t.resolve("C", false).as_deref(), Some("C"));
    }

    #[test]
    fn resolve_survives_cycles() {
        let mut t = DefineTable::new();
        t.insert("A", "B".to_string());
        t.insert("B", "A".to_string());
        // Must terminate; the exact value is whichever end of the cycle the
        // cap lands on.
        assert!(t.resolve("A", true).is_some());
    }

    #[test]
    fn undef_clears_non_constant_flag() {
        let mut t = DefineTable::new();
        t.insert("FOO", "BAR".to_string());
        t.mark_non_constant("FOO");
        assert!(t.is_non_constant("FOO"));
        t.remove("FOO");
        assert!(!t.is_defined("FOO"));
        assert!(!t.is_non_constant("FOO"));
    }
}
