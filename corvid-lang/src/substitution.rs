//! Type-variable substitutions and their application to types,
//! expressions, and local environments.
use std::collections::HashMap;

use crate::ast::Expr;
use crate::identifier::Name;
use crate::types::Type;

/// A finite map from type variables to the types they stand for.
/// Grounded on `types/typecheck/subst.go`'s `Subst`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Subst(HashMap<Name, Type>);

impl Subst {
    pub fn empty() -> Subst {
        Subst(HashMap::new())
    }

    pub fn single(name: Name, ty: Type) -> Subst {
        let mut map = HashMap::new();
        map.insert(name, ty);
        Subst(map)
    }

    pub fn get(&self, name: &Name) -> Option<&Type> {
        self.0.get(name)
    }

    /// `self` followed by `other`: apply `other` to everything `self`
    /// maps to, then let `other`'s own bindings take precedence.
    pub fn compose(&self, other: &Subst) -> Subst {
        let mut result: HashMap<Name, Type> = self
            .0
            .iter()
            .map(|(v, t)| (v.clone(), other.apply_to_type(t)))
            .collect();
        for (v, t) in &other.0 {
            result.insert(v.clone(), t.clone());
        }
        Subst(result)
    }

    pub fn apply_to_type(&self, ty: &Type) -> Type {
        ty.map(&mut |t| match &t {
            Type::Var(v) => self.0.get(v).cloned().unwrap_or(t),
            _ => t,
        })
    }

    pub fn apply_to_expr(&self, expr: &Expr) -> Expr {
        expr.map(&mut |e| match e.type_info() {
            Some(ty) => e.with_type_info(self.apply_to_type(&ty)),
            None => e,
        })
    }

    /// Applies this substitution to every binding in a local type
    /// environment (`types/typecheck/subst.go`'s `ApplyToVars`).
    pub fn apply_to_vars(&self, vars: &HashMap<Name, Type>) -> HashMap<Name, Type> {
        vars.iter()
            .map(|(v, t)| (v.clone(), self.apply_to_type(t)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_applies_transitively() {
        let a = Name::new("a");
        let b = Name::new("b");
        let s1 = Subst::single(a.clone(), Type::Var(b.clone()));
        let s2 = Subst::single(b.clone(), Type::nullary("Int"));
        let composed = s1.compose(&s2);
        assert_eq!(composed.apply_to_type(&Type::Var(a)), Type::nullary("Int"));
    }
}
