//! The surface expression tree: what the tree-former hands to the
//! type inferencer. Every node carries an optional [`Type`] slot
//! (`ty`) that inference fills in, and a [`SourceInfo`] for
//! diagnostics.
use num_bigint::BigInt;

use crate::identifier::Name;
use crate::source::SourceInfo;
use crate::types::Type;

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Char(CharLit),
    Int(IntLit),
    Float(FloatLit),
    Var(Var),
    Abst(Abst),
    Appl(Appl),
    Switch(Switch),
    Strict(Strict),
}

#[derive(Clone, Debug, PartialEq)]
pub struct CharLit {
    pub info: SourceInfo,
    pub value: char,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IntLit {
    pub info: SourceInfo,
    pub value: BigInt,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FloatLit {
    pub info: SourceInfo,
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Var {
    pub info: SourceInfo,
    pub name: Name,
    pub ty: Option<Type>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Abst {
    pub info: SourceInfo,
    pub bound: Box<Var>,
    pub body: Box<Expr>,
    pub ty: Option<Type>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Appl {
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub ty: Option<Type>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SwitchCase {
    pub info: SourceInfo,
    pub alternative: Name,
    pub body: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Switch {
    pub info: SourceInfo,
    pub scrutinee: Box<Expr>,
    pub cases: Vec<SwitchCase>,
    pub ty: Option<Type>,
}

/// `strict e` — forces `e` before it is used as an application's
/// argument, instead of passing a thunk. Has no effect on typing: it
/// types exactly as `e` does.
#[derive(Clone, Debug, PartialEq)]
pub struct Strict {
    pub info: SourceInfo,
    pub expr: Box<Expr>,
    pub ty: Option<Type>,
}

impl Expr {
    /// The built-in, non-overridable type of literal nodes, or the
    /// inferencer-assigned type for everything else (`expr/expr.go`'s
    /// `TypeInfo`).
    pub fn type_info(&self) -> Option<Type> {
        match self {
            Expr::Char(_) => Some(Type::nullary("Char")),
            Expr::Int(_) => Some(Type::nullary("Int")),
            Expr::Float(_) => Some(Type::nullary("Float")),
            Expr::Var(v) => v.ty.clone(),
            Expr::Abst(a) => a.ty.clone(),
            Expr::Appl(a) => a.ty.clone(),
            Expr::Switch(s) => s.ty.clone(),
            Expr::Strict(s) => s.ty.clone(),
        }
    }

    pub fn with_type_info(&self, ty: Type) -> Expr {
        match self {
            Expr::Char(_) | Expr::Int(_) | Expr::Float(_) => self.clone(),
            Expr::Var(v) => Expr::Var(Var { ty: Some(ty), ..v.clone() }),
            Expr::Abst(a) => Expr::Abst(Abst { ty: Some(ty), ..a.clone() }),
            Expr::Appl(a) => Expr::Appl(Appl { ty: Some(ty), ..a.clone() }),
            Expr::Switch(s) => Expr::Switch(Switch { ty: Some(ty), ..s.clone() }),
            Expr::Strict(s) => Expr::Strict(Strict { ty: Some(ty), ..s.clone() }),
        }
    }

    pub fn info(&self) -> SourceInfo {
        match self {
            Expr::Char(c) => c.info.clone(),
            Expr::Int(i) => i.info.clone(),
            Expr::Float(fl) => fl.info.clone(),
            Expr::Var(v) => v.info.clone(),
            Expr::Abst(a) => a.info.clone(),
            Expr::Appl(a) => a.left.info(),
            Expr::Switch(s) => s.info.clone(),
            Expr::Strict(s) => s.info.clone(),
        }
    }

    /// Bottom-up rewrite, mirroring `expr/expr.go`'s `Map`: every
    /// subexpression is rewritten first, then `f` is applied to the
    /// rebuilt node. Substitution and instantiation are both
    /// expressed as a single `map` call with a closure that only
    /// touches `Var` nodes.
    pub fn map(&self, f: &mut impl FnMut(Expr) -> Expr) -> Expr {
        let mapped = match self {
            Expr::Char(_) | Expr::Int(_) | Expr::Float(_) | Expr::Var(_) => self.clone(),
            Expr::Abst(a) => Expr::Abst(Abst {
                info: a.info.clone(),
                bound: a.bound.clone(),
                body: Box::new(a.body.map(f)),
                ty: a.ty.clone(),
            }),
            Expr::Appl(a) => Expr::Appl(Appl {
                left: Box::new(a.left.map(f)),
                right: Box::new(a.right.map(f)),
                ty: a.ty.clone(),
            }),
            Expr::Switch(s) => Expr::Switch(Switch {
                info: s.info.clone(),
                scrutinee: Box::new(s.scrutinee.map(f)),
                cases: s
                    .cases
                    .iter()
                    .map(|c| SwitchCase {
                        info: c.info.clone(),
                        alternative: c.alternative.clone(),
                        body: c.body.map(f),
                    })
                    .collect(),
                ty: s.ty.clone(),
            }),
            Expr::Strict(s) => Expr::Strict(Strict {
                info: s.info.clone(),
                expr: Box::new(s.expr.map(f)),
                ty: s.ty.clone(),
            }),
        };
        f(mapped)
    }
}
