//! Overload-aware function table.

use indexmap::IndexMap;
use minoc_par::ast::{FuncId, Program, Type};
use minoc_util::Symbol;

use crate::error::TypeError;

/// Multimap from function name to its overloads.
///
/// Both the map and the per-name overload lists preserve insertion order, so
/// resolution deterministically picks the *first* exact signature match.
/// The builtin declarations are inserted ahead of user code and therefore
/// win any tie; since a duplicate signature is rejected outright, they
/// also reserve their name/signature slots against redefinition.
#[derive(Default)]
pub struct FuncTable {
    map: IndexMap<Symbol, Vec<FuncId>>,
}

impl FuncTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function. Two functions may share a name only if their
    /// parameter type lists differ.
    pub fn insert(&mut self, program: &Program, id: FuncId) -> Result<(), TypeError> {
        let def = program.func(id);
        let overloads = self.map.entry(def.name).or_default();
        for &existing in overloads.iter() {
            let other = program.func(existing);
            if param_types(program, existing).eq(def.params().iter().map(|p| p.ty)) {
                debug_assert_eq!(other.name, def.name);
                return Err(TypeError::DuplicateFunction(def.name));
            }
        }
        overloads.push(id);
        Ok(())
    }

    /// Select the first overload of `name` whose parameter types exactly
    /// equal `args`, in insertion order. No implicit conversions.
    pub fn resolve(&self, program: &Program, name: Symbol, args: &[Type]) -> Option<FuncId> {
        self.map
            .get(&name)?
            .iter()
            .copied()
            .find(|&id| param_types(program, id).eq(args.iter().copied()))
    }
}

fn param_types(program: &Program, id: FuncId) -> impl Iterator<Item = Type> + '_ {
    program.func(id).params().iter().map(|p| p.ty)
}
