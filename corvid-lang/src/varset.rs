//! Sets of type-variable names, used for free-variable collection
//! and generalization during inference.
use std::collections::HashSet;

use crate::identifier::Name;
use crate::types::Type;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VarSet(HashSet<Name>);

impl VarSet {
    pub fn new() -> VarSet {
        VarSet(HashSet::new())
    }

    pub fn put(&mut self, name: Name) {
        self.0.insert(name);
    }

    pub fn delete(&mut self, name: &Name) {
        self.0.remove(name);
    }

    pub fn contains(&self, name: &Name) -> bool {
        self.0.contains(name)
    }

    pub fn put_all(&mut self, other: &VarSet) {
        self.0.extend(other.0.iter().cloned());
    }

    pub fn delete_all(&mut self, other: &VarSet) {
        for v in &other.0 {
            self.0.remove(v);
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The set's members in deterministic order, matching
    /// `types/typecheck/varset.go`'s sorted `InOrder`.
    pub fn in_order(&self) -> Vec<Name> {
        let mut vars: Vec<Name> = self.0.iter().cloned().collect();
        vars.sort();
        vars
    }
}

/// Every variable appearing anywhere in `ty`.
pub fn free_vars(ty: &Type) -> VarSet {
    let mut vs = VarSet::new();
    ty.map(&mut |t| {
        if let Type::Var(v) = &t {
            vs.put(v.clone());
        }
        t
    });
    vs
}
