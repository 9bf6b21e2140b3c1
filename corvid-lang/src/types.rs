//! Types: variables, applied constructors, and functions.
//!
//! This is the language of both surface type annotations and inferred
//! types. A [`Type`] is unapplied until fully substituted; a
//! [`Scheme`] adds the universally-quantified variables a `let`-bound
//! name is generalized over.
use std::fmt::{self, Display, Formatter};

use crate::identifier::Name;
use crate::source::SourceInfo;

/// A monomorphic type: a variable, an applied constructor
/// (`List Int`, `Map Key Value`, nullary constructors like `Int`), or
/// a function arrow.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Var(Name),
    Appl(Name, Vec<Type>),
    Func(Box<Type>, Box<Type>),
}

impl Type {
    pub fn func(from: Type, to: Type) -> Type {
        Type::Func(Box::new(from), Box::new(to))
    }

    pub fn nullary(name: impl Into<Name>) -> Type {
        Type::Appl(name.into(), Vec::new())
    }

    /// Applies `f` to every node in this type, bottom-up, mirroring
    /// the original `Type.Map` visitor that substitution and
    /// free-variable collection are both built from.
    pub fn map(&self, f: &mut impl FnMut(Type) -> Type) -> Type {
        let mapped = match self {
            Type::Var(_) => self.clone(),
            Type::Appl(name, args) => {
                Type::Appl(name.clone(), args.iter().map(|a| a.map(f)).collect())
            }
            Type::Func(from, to) => Type::func(from.map(f), to.map(f)),
        };
        f(mapped)
    }

    /// Whether `self` occurs as a subterm of `other` (the unifier's
    /// occurs-check, `types/typecheck/varset.go`'s `ContainsVar`).
    pub fn occurs_in(name: &Name, ty: &Type) -> bool {
        match ty {
            Type::Var(v) => v == name,
            Type::Appl(_, args) => args.iter().any(|a| Type::occurs_in(name, a)),
            Type::Func(from, to) => Type::occurs_in(name, from) || Type::occurs_in(name, to),
        }
    }

    fn left_string(&self) -> String {
        match self {
            Type::Var(n) => n.to_string(),
            Type::Appl(..) => self.to_string(),
            Type::Func(..) => format!("({self})"),
        }
    }

    fn inside_string(&self) -> String {
        match self {
            Type::Var(n) => n.to_string(),
            Type::Appl(_, args) if !args.is_empty() => format!("({self})"),
            Type::Appl(..) => self.to_string(),
            Type::Func(..) => format!("({self})"),
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Type::Var(name) => write!(f, "{name}"),
            Type::Appl(cons, args) => {
                write!(f, "{cons}")?;
                for arg in args {
                    write!(f, " {}", arg.inside_string())?;
                }
                Ok(())
            }
            Type::Func(from, to) => write!(f, "{} -> {}", from.left_string(), to),
        }
    }
}

/// A universally-quantified type: `Bound` is the set of variables in
/// `Body` that a use site must freshly instantiate.
#[derive(Clone, Debug, PartialEq)]
pub struct Scheme {
    pub bound: Vec<Name>,
    pub body: Type,
}

impl Scheme {
    pub fn monomorphic(body: Type) -> Scheme {
        Scheme { bound: Vec::new(), body }
    }
}

/// A user type declaration: a record, an enum (tagged union), or an
/// alias. Each carries the type parameters it is generic over.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeDecl {
    /// A primitive type with no declared structure: `Int`, `Char`,
    /// `Float`. Carries only the arity (always 0 today) so that
    /// validation can treat it uniformly with user declarations.
    Builtin(usize),
    Record(RecordDecl),
    Union(UnionDecl),
    Alias(AliasDecl),
}

impl TypeDecl {
    pub fn arity(&self) -> usize {
        match self {
            TypeDecl::Builtin(n) => *n,
            TypeDecl::Record(r) => r.args.len(),
            TypeDecl::Union(u) => u.args.len(),
            TypeDecl::Alias(a) => a.args.len(),
        }
    }

    pub fn info(&self) -> Option<&SourceInfo> {
        match self {
            TypeDecl::Builtin(_) => None,
            TypeDecl::Record(r) => Some(&r.info),
            TypeDecl::Union(u) => Some(&u.info),
            TypeDecl::Alias(a) => Some(&a.info),
        }
    }

    pub fn args(&self) -> &[Name] {
        match self {
            TypeDecl::Builtin(_) => &[],
            TypeDecl::Record(r) => &r.args,
            TypeDecl::Union(u) => &u.args,
            TypeDecl::Alias(a) => &a.args,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecordField {
    pub info: SourceInfo,
    pub name: Name,
    pub ty: Type,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecordDecl {
    pub info: SourceInfo,
    pub args: Vec<Name>,
    pub fields: Vec<RecordField>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Alternative {
    pub info: SourceInfo,
    pub name: Name,
    pub fields: Vec<Type>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnionDecl {
    pub info: SourceInfo,
    pub args: Vec<Name>,
    pub alternatives: Vec<Alternative>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AliasDecl {
    pub info: SourceInfo,
    pub args: Vec<Name>,
    pub ty: Type,
}

/// Replaces `alias`'s parameters with `args` inside its body, the way
/// the unifier transparently expands an alias it encounters
/// (`types/typecheck/unify.go`'s `revealAlias`).
pub fn reveal_alias(alias: &AliasDecl, args: &[Type]) -> Type {
    let subst: std::collections::HashMap<Name, Type> = alias
        .args
        .iter()
        .cloned()
        .zip(args.iter().cloned())
        .collect();
    alias.ty.map(&mut |t| match &t {
        Type::Var(v) => subst.get(v).cloned().unwrap_or(t),
        _ => t,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_expected_shape() {
        let list_int = Type::Appl(Name::new("List"), vec![Type::nullary("Int")]);
        assert_eq!(list_int.to_string(), "List Int");

        let f = Type::func(list_int.clone(), Type::nullary("Int"));
        assert_eq!(f.to_string(), "List Int -> Int");

        let higher = Type::func(f.clone(), Type::nullary("Bool"));
        assert_eq!(higher.to_string(), "(List Int -> Int) -> Bool");
    }

    #[test]
    fn occurs_check_finds_nested_var() {
        let a = Name::new("a");
        let ty = Type::Appl(Name::new("List"), vec![Type::Var(a.clone())]);
        assert!(Type::occurs_in(&a, &ty));
        assert!(!Type::occurs_in(&Name::new("b"), &ty));
    }
}
