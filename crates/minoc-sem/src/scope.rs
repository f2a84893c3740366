//! Lexical scope resolution.

use minoc_par::ast::VarId;
use minoc_util::Symbol;
use rustc_hash::FxHashMap;

/// A stack of name-to-declaration maps.
///
/// Lookup walks from the innermost rib outward, so a variable in an inner
/// scope shadows one with the same name further out. Insertion fails only if
/// the innermost rib already holds the name; shadowing an outer binding is
/// allowed, declaring twice in the same scope is not.
pub struct Scope {
    ribs: Vec<FxHashMap<Symbol, VarId>>,
}

impl Scope {
    /// A scope with a single rib (the function's parameter scope).
    pub fn new() -> Self {
        Self {
            ribs: vec![FxHashMap::default()],
        }
    }

    /// Enter a nested scope.
    pub fn push(&mut self) {
        self.ribs.push(FxHashMap::default());
    }

    /// Leave the innermost scope, dropping its bindings.
    pub fn pop(&mut self) {
        self.ribs.pop();
    }

    /// Bind `name` in the innermost scope. Returns false if the name is
    /// already bound there.
    pub fn insert(&mut self, name: Symbol, var: VarId) -> bool {
        let rib = self.ribs.last_mut().expect("scope stack is never empty");
        if rib.contains_key(&name) {
            false
        } else {
            rib.insert(name, var);
            true
        }
    }

    /// Look `name` up, innermost scope first.
    pub fn find(&self, name: Symbol) -> Option<VarId> {
        self.ribs
            .iter()
            .rev()
            .find_map(|rib| rib.get(&name).copied())
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}
