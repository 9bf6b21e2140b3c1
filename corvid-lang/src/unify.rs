//! Unification of two monomorphic types, with alias expansion and an
//! occurs-check. Grounded on `types/typecheck/unify.go`.
use std::collections::HashMap;

use crate::identifier::Name;
use crate::substitution::Subst;
use crate::types::{reveal_alias, Type, TypeDecl};

/// Unifies `t` and `u` under the given declared-type environment
/// (needed to transparently expand aliases). Returns the most general
/// substitution that makes them equal, or `None` if they cannot be
/// unified.
pub fn unify(names: &HashMap<Name, TypeDecl>, t: &Type, u: &Type) -> Option<Subst> {
    // Prefer binding the "lesser" variable as the bindee, so that
    // unification is deterministic regardless of argument order.
    if let Type::Var(v2) = u {
        if !matches!(t, Type::Var(v1) if !lesser_name(v1, v2)) {
            return unify(names, u, t);
        }
    }

    match t {
        Type::Var(v) => {
            if !matches!(u, Type::Var(_)) && Type::occurs_in(v, u) {
                return None;
            }
            Some(Subst::single(v.clone(), u.clone()))
        }

        Type::Appl(cons, args) => {
            let Type::Appl(cons_u, args_u) = u else {
                return unify_via_alias(names, t, u);
            };
            if cons != cons_u || args.len() != args_u.len() {
                return unify_via_alias(names, t, u);
            }
            let mut s = Subst::empty();
            for (a, b) in args.iter().zip(args_u) {
                let s1 = unify(names, &s.apply_to_type(a), &s.apply_to_type(b))?;
                s = s.compose(&s1);
            }
            Some(s)
        }

        Type::Func(from, to) => {
            let Type::Func(from_u, to_u) = u else {
                return None;
            };
            let s1 = unify(names, from, from_u)?;
            let s2 = unify(names, &s1.apply_to_type(to), &s1.apply_to_type(to_u))?;
            Some(s1.compose(&s2))
        }
    }
}

fn unify_via_alias(names: &HashMap<Name, TypeDecl>, t: &Type, u: &Type) -> Option<Subst> {
    if let Type::Appl(cons, args) = t {
        if let Some(TypeDecl::Alias(alias)) = names.get(cons) {
            return unify(names, &reveal_alias(alias, args), u);
        }
    }
    if let Type::Appl(cons, args) = u {
        if let Some(TypeDecl::Alias(alias)) = names.get(cons) {
            return unify(names, t, &reveal_alias(alias, args));
        }
    }
    None
}

/// Deterministic tie-break used when both sides of a unification step
/// are variables: the shorter (then lexicographically smaller) name
/// becomes the bindee.
fn lesser_name(s: &Name, t: &Name) -> bool {
    let (s, t) = (s.as_str(), t.as_str());
    match s.len().cmp(&t.len()) {
        std::cmp::Ordering::Less => true,
        std::cmp::Ordering::Greater => false,
        std::cmp::Ordering::Equal => s < t,
    }
}

/// `t` unifies with `u` after both have had their bound variables
/// freshened, i.e. "could these two schemes describe the same thing."
pub fn can_unify(names: &HashMap<Name, TypeDecl>, t: &Type, u: &Type) -> bool {
    unify(names, t, u).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unifies_identical_nullary() {
        let names = HashMap::new();
        let int = Type::nullary("Int");
        let s = unify(&names, &int, &int).unwrap();
        assert_eq!(s.apply_to_type(&int), int);
    }

    #[test]
    fn binds_variable_to_concrete_type() {
        let names = HashMap::new();
        let a = Name::new("a");
        let s = unify(&names, &Type::Var(a.clone()), &Type::nullary("Int")).unwrap();
        assert_eq!(s.apply_to_type(&Type::Var(a)), Type::nullary("Int"));
    }

    #[test]
    fn occurs_check_rejects_infinite_type() {
        let names = HashMap::new();
        let a = Name::new("a");
        let recursive = Type::Appl(Name::new("List"), vec![Type::Var(a.clone())]);
        assert!(unify(&names, &Type::Var(a), &recursive).is_none());
    }

    #[test]
    fn mismatched_constructors_fail() {
        let names = HashMap::new();
        assert!(unify(&names, &Type::nullary("Int"), &Type::nullary("Char")).is_none());
    }
}
