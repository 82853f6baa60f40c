//! Symbol table. Keys fold case so `loop` and `LOOP` are one symbol; the
//! first-seen spelling is kept for listing and export output. Iteration is
//! alphabetical, which the listing relies on. Local labels (leading `.`)
//! are stored qualified by the most recent global label.

use std::collections::BTreeMap;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub value: u16,
    /// First-pass mark: the defining line has not been re-processed yet.
    pub forward: bool,
    /// Redefinable via SET.
    pub soft: bool,
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    map: BTreeMap<String, Symbol>,
    last_global: String,
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable::default()
    }

    fn key(name: &str) -> String {
        name.to_ascii_uppercase()
    }

    /// Qualifies a local name with the current global label. Non-local
    /// names pass through unchanged.
    pub fn qualify(&self, name: &str) -> String {
        if name.starts_with('.') {
            format!("{}{}", self.last_global, name)
        } else {
            name.to_owned()
        }
    }

    /// Records `name` as the current global label scope. Called for every
    /// non-local label definition, in both passes, so local references
    /// qualify identically each time through the source.
    pub fn set_scope(&mut self, name: &str) {
        self.last_global = name.to_owned();
    }

    /// Resets the scope for a new pass.
    pub fn reset_scope(&mut self) {
        self.last_global.clear();
    }

    /// Inserts the symbol if absent. Returns whether it was newly created
    /// together with the entry.
    pub fn enter(&mut self, name: &str) -> (bool, &mut Symbol) {
        let key = SymbolTable::key(name);
        let mut created = false;
        let entry = self.map.entry(key).or_insert_with(|| {
            created = true;
            Symbol {
                name: name.to_owned(),
                value: 0,
                forward: false,
                soft: false,
            }
        });
        (created, entry)
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.map.get(&SymbolTable::key(name))
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.map.get_mut(&SymbolTable::key(name))
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Symbols in alphabetical order of their folded names.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.map.values()
    }
}
