//! "Is more specific than": a one-way substitution check used to
//! detect ambiguity among candidate overloads. Grounded on
//! `types/typecheck/spec.go`'s `IsSpec`.
use std::collections::HashMap;

use crate::identifier::Name;
use crate::types::Type;

/// True when `t` specializes to `u` via some one-directional binding
/// of `t`'s variables — i.e. `u` is at least as specific as `t`.
pub fn is_more_specific(t: &Type, u: &Type) -> bool {
    let mut bind = HashMap::new();
    specific(&mut bind, t, u)
}

fn specific(bind: &mut HashMap<Name, Type>, t: &Type, u: &Type) -> bool {
    match t {
        Type::Var(v) => {
            let bound = bind.entry(v.clone()).or_insert_with(|| u.clone());
            bound == u
        }
        Type::Appl(cons, args) => {
            let Type::Appl(cons_u, args_u) = u else {
                return false;
            };
            if cons != cons_u || args.len() != args_u.len() {
                return false;
            }
            args.iter().zip(args_u).all(|(a, b)| specific(bind, a, b))
        }
        Type::Func(from, to) => {
            let Type::Func(from_u, to_u) = u else {
                return false;
            };
            specific(bind, from, from_u) && specific(bind, to, to_u)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn var_specializes_to_concrete() {
        let a = Type::Var(Name::new("a"));
        assert!(is_more_specific(&a, &Type::nullary("Int")));
    }

    #[test]
    fn concrete_does_not_specialize_to_var() {
        let a = Type::Var(Name::new("a"));
        assert!(!is_more_specific(&Type::nullary("Int"), &a));
    }

    #[test]
    fn same_variable_must_bind_consistently() {
        let a = Name::new("a");
        let t = Type::func(Type::Var(a.clone()), Type::Var(a));
        let u = Type::func(Type::nullary("Int"), Type::nullary("Char"));
        assert!(!is_more_specific(&t, &u));
    }
}
