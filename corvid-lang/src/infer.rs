//! Hindley-Milner type inference extended with ad-hoc overloading:
//! a name may have several admissible signatures, so inference
//! returns a set of candidate results rather than a single type.
//! Grounded on `types/typecheck/infer.go`, extended with the `Switch`
//! and literal cases the retrieved revision of that file had not yet
//! grown.
use std::collections::HashMap;

use crate::ast::{Abst, Appl, Expr, Strict, Switch, SwitchCase, Var};
use crate::error::{CannotSwitchReason, Error, ErrorKind};
use crate::identifier::{fresh_var_name, Name};
use crate::source::SourceInfo;
use crate::specialize::is_more_specific;
use crate::substitution::Subst;
use crate::types::{Type, TypeDecl};
use crate::unify::unify;

/// One admissible way to type an expression: the type it settled on,
/// the substitution that produced it, and the expression with every
/// `Var` node's type slot filled in.
#[derive(Clone, Debug)]
pub struct InferResult {
    pub ty: Type,
    pub subst: Subst,
    pub expr: Expr,
}

type Local = HashMap<Name, Type>;
type Global = HashMap<Name, Vec<Type>>;

/// Fresh type-variable counter threaded through one top-level
/// inference call.
struct VarGen(usize);

impl VarGen {
    fn fresh(&mut self) -> Type {
        let name = Name::new(fresh_var_name(self.0));
        self.0 += 1;
        Type::Var(name)
    }
}

/// Infers every admissible type for `expr` in the given declared-type
/// and overload environments. Literal annotations already present on
/// `expr` (from a user type ascription) are freshened the same way
/// bound variables are, so that a single expression can be
/// re-inferred without variable capture across calls.
pub fn infer(
    names: &HashMap<Name, TypeDecl>,
    global: &Global,
    expr: &Expr,
) -> Result<Vec<InferResult>, Error> {
    let mut gen = VarGen(0);
    let mut renames = HashMap::new();
    let instantiated = instantiate_expr(&mut gen, &mut renames, expr);
    infer_rec(names, &mut gen, global, &Local::new(), &instantiated)
}

fn infer_rec(
    names: &HashMap<Name, TypeDecl>,
    gen: &mut VarGen,
    global: &Global,
    local: &Local,
    expr: &Expr,
) -> Result<Vec<InferResult>, Error> {
    let results = match expr {
        Expr::Char(c) => vec![InferResult {
            ty: Type::nullary("Char"),
            subst: Subst::empty(),
            expr: Expr::Char(c.clone()),
        }],
        Expr::Int(i) => vec![InferResult {
            ty: Type::nullary("Int"),
            subst: Subst::empty(),
            expr: Expr::Int(i.clone()),
        }],
        Expr::Float(fl) => vec![InferResult {
            ty: Type::nullary("Float"),
            subst: Subst::empty(),
            expr: Expr::Float(fl.clone()),
        }],

        Expr::Var(v) => infer_var(global, local, v)?,

        Expr::Appl(a) => infer_appl(names, gen, global, local, a)?,

        Expr::Abst(a) => infer_abst(names, gen, global, local, a)?,

        Expr::Switch(s) => infer_switch(names, gen, global, local, s)?,

        Expr::Strict(s) => infer_strict(names, gen, global, local, s)?,
    };
    filter_by_annotation(names, expr, results)
}

/// spec.md §4.5's "Filtering" step: on exit from a node that already
/// carries a type — a literal's built-in type, or a user ascription
/// (`e : T`) `ast_build.rs` attaches directly to the node, surviving
/// `instantiate_expr`'s initial freshening — the result set is
/// narrowed to the candidates that type specializes to. Nodes with no
/// preset type (the overwhelming majority) pass every candidate
/// through unchanged.
fn filter_by_annotation(
    names: &HashMap<Name, TypeDecl>,
    expr: &Expr,
    results: Vec<InferResult>,
) -> Result<Vec<InferResult>, Error> {
    let Some(ann) = expr.type_info() else {
        return Ok(results);
    };
    let mut admissible = Vec::with_capacity(results.len());
    let mut rejected_ty = None;
    for r in results {
        if is_more_specific(&ann, &r.ty) || unify(names, &ann, &r.ty).is_some() {
            admissible.push(r);
        } else if rejected_ty.is_none() {
            rejected_ty = Some(r.ty.clone());
        }
    }
    match admissible.len() {
        0 => Err(Error::at(
            expr.info(),
            ErrorKind::NoMatch { inferred: rejected_ty.unwrap_or_else(|| ann.clone()), annotation: ann },
        )),
        1 => Ok(admissible),
        _ => Err(Error::at(
            expr.info(),
            ErrorKind::Ambiguous {
                witness: ambiguity_witness(&admissible[0].expr, &admissible[1].expr),
                candidates: admissible.into_iter().map(|r| r.ty).collect(),
            },
        )),
    }
}

/// The paired-traversal witness spec.md §4.5's "Ambiguity reporting"
/// asks for: walks two rewritten expressions with the same shape (both
/// built from the same source tree, so they only ever differ in the
/// `ty` slots inference filled in) and returns the position of the
/// left-most, inner-most node whose type differs between them.
pub fn ambiguity_witness(a: &Expr, b: &Expr) -> Option<SourceInfo> {
    match (a, b) {
        (Expr::Abst(x), Expr::Abst(y)) => {
            ambiguity_witness(&x.body, &y.body).or_else(|| type_mismatch_at(&x.ty, &y.ty, &x.info))
        }
        (Expr::Appl(x), Expr::Appl(y)) => ambiguity_witness(&x.left, &y.left)
            .or_else(|| ambiguity_witness(&x.right, &y.right))
            .or_else(|| type_mismatch_at(&x.ty, &y.ty, &x.left.info())),
        (Expr::Switch(x), Expr::Switch(y)) => ambiguity_witness(&x.scrutinee, &y.scrutinee)
            .or_else(|| {
                x.cases
                    .iter()
                    .zip(&y.cases)
                    .find_map(|(cx, cy)| ambiguity_witness(&cx.body, &cy.body))
            })
            .or_else(|| type_mismatch_at(&x.ty, &y.ty, &x.info)),
        (Expr::Strict(x), Expr::Strict(y)) => {
            ambiguity_witness(&x.expr, &y.expr).or_else(|| type_mismatch_at(&x.ty, &y.ty, &x.info))
        }
        (Expr::Var(x), Expr::Var(y)) => type_mismatch_at(&x.ty, &y.ty, &x.info),
        _ => None,
    }
}

fn type_mismatch_at(a: &Option<Type>, b: &Option<Type>, info: &SourceInfo) -> Option<SourceInfo> {
    match (a, b) {
        (Some(ta), Some(tb)) if ta != tb => Some(info.clone()),
        _ => None,
    }
}

/// `strict e` types exactly as `e` does; only evaluation order changes.
fn infer_strict(
    names: &HashMap<Name, TypeDecl>,
    gen: &mut VarGen,
    global: &Global,
    local: &Local,
    s: &Strict,
) -> Result<Vec<InferResult>, Error> {
    let inner_results = infer_rec(names, gen, global, local, &s.expr)?;
    Ok(inner_results
        .into_iter()
        .map(|r| InferResult {
            ty: r.ty.clone(),
            subst: r.subst,
            expr: Expr::Strict(Strict {
                info: s.info.clone(),
                expr: Box::new(r.expr),
                ty: Some(r.ty),
            }),
        })
        .collect())
}

fn infer_var(global: &Global, local: &Local, v: &Var) -> Result<Vec<InferResult>, Error> {
    if let Some(ty) = local.get(&v.name) {
        return Ok(vec![InferResult {
            ty: ty.clone(),
            subst: Subst::empty(),
            expr: Expr::Var(Var { ty: Some(ty.clone()), ..v.clone() }),
        }]);
    }
    if let Some(signatures) = global.get(&v.name) {
        return Ok(signatures
            .iter()
            .map(|ty| InferResult {
                ty: ty.clone(),
                subst: Subst::empty(),
                expr: Expr::Var(Var { ty: Some(ty.clone()), ..v.clone() }),
            })
            .collect());
    }
    Err(Error::at(v.info.clone(), ErrorKind::NotBound(v.name.clone())))
}

fn infer_appl(
    names: &HashMap<Name, TypeDecl>,
    gen: &mut VarGen,
    global: &Global,
    local: &Local,
    a: &Appl,
) -> Result<Vec<InferResult>, Error> {
    let left_results = infer_rec(names, gen, global, local, &a.left)?;
    // A malformed right side is an error in itself even if every
    // left-side candidate already failed to apply.
    infer_rec(names, gen, global, local, &a.right)?;

    let mut results = Vec::new();
    for r1 in &left_results {
        let narrowed_local = r1.subst.apply_to_vars(local);
        let right_results = infer_rec(names, gen, global, &narrowed_local, &a.right)?;
        let result_ty = gen.fresh();
        for r2 in &right_results {
            let applied_left = r2.subst.apply_to_type(&r1.ty);
            let func_ty = Type::func(r2.ty.clone(), result_ty.clone());
            let Some(s) = unify(names, &applied_left, &func_ty) else {
                continue;
            };
            let ty = s.apply_to_type(&result_ty);
            results.push(InferResult {
                ty: ty.clone(),
                subst: r1.subst.compose(&r2.subst).compose(&s),
                expr: Expr::Appl(Appl {
                    left: Box::new(r1.expr.clone()),
                    right: Box::new(r2.expr.clone()),
                    ty: Some(ty),
                }),
            });
        }
    }
    if results.is_empty() {
        let r1 = &left_results[0];
        let r2 = infer_rec(names, gen, global, local, &a.right)?;
        return Err(Error::at(
            a.left.info(),
            ErrorKind::CannotApply {
                left: r1.ty.clone(),
                right: r2[0].ty.clone(),
            },
        ));
    }
    Ok(results)
}

fn infer_abst(
    names: &HashMap<Name, TypeDecl>,
    gen: &mut VarGen,
    global: &Global,
    local: &Local,
    a: &Abst,
) -> Result<Vec<InferResult>, Error> {
    let bind_ty = gen.fresh();
    let mut new_local = local.clone();
    new_local.insert(a.bound.name.clone(), bind_ty.clone());

    let body_results = infer_rec(names, gen, global, &new_local, &a.body)?;
    Ok(body_results
        .into_iter()
        .map(|r| {
            let inferred_bind_ty = r.subst.apply_to_type(&bind_ty);
            let ty = Type::func(inferred_bind_ty.clone(), r.ty.clone());
            InferResult {
                ty: ty.clone(),
                subst: r.subst,
                expr: Expr::Abst(Abst {
                    info: a.info.clone(),
                    bound: Box::new(Var {
                        ty: Some(inferred_bind_ty),
                        ..*a.bound.clone()
                    }),
                    body: Box::new(r.expr),
                    ty: Some(ty),
                }),
            }
        })
        .collect())
}

fn infer_switch(
    names: &HashMap<Name, TypeDecl>,
    gen: &mut VarGen,
    global: &Global,
    local: &Local,
    s: &Switch,
) -> Result<Vec<InferResult>, Error> {
    let scrutinee_results = infer_rec(names, gen, global, local, &s.scrutinee)?;

    let mut results = Vec::new();
    for r in &scrutinee_results {
        let Type::Appl(union_name, type_args) = r.subst.apply_to_type(&r.ty) else {
            continue;
        };
        let Some(TypeDecl::Union(union)) = names.get(&union_name) else {
            continue;
        };
        if union.alternatives.len() != s.cases.len()
            || !union
                .alternatives
                .iter()
                .zip(&s.cases)
                .all(|(alt, case)| alt.name == case.alternative)
        {
            continue;
        }

        let case_subst: HashMap<Name, Type> =
            union.args.iter().cloned().zip(type_args.iter().cloned()).collect();

        // Every case's body must agree on one overall result type;
        // `overall` is unified against each case's inferred type in
        // turn so mismatches surface as an ordinary unification
        // failure rather than a separate comparison pass.
        let overall = gen.fresh();
        let mut subst_acc = r.subst.clone();
        let mut case_exprs = Vec::with_capacity(s.cases.len());
        let mut failed = false;
        for (alt, case) in union.alternatives.iter().zip(&s.cases) {
            let expected = alt
                .fields
                .iter()
                .cloned()
                .rev()
                .fold(overall.clone(), |acc, field_ty| {
                    Type::func(substitute(&case_subst, &field_ty), acc)
                });

            let case_results = infer_rec(names, gen, global, local, &case.body)?;
            let mut matched = false;
            for cr in &case_results {
                let expected_here = subst_acc.compose(&cr.subst).apply_to_type(&expected);
                let Some(s2) = unify(names, &expected_here, &cr.ty) else {
                    continue;
                };
                subst_acc = subst_acc.compose(&cr.subst).compose(&s2);
                case_exprs.push(SwitchCase {
                    info: case.info.clone(),
                    alternative: case.alternative.clone(),
                    body: cr.expr.clone(),
                });
                matched = true;
                break;
            }
            if !matched {
                failed = true;
                break;
            }
        }
        if failed {
            continue;
        }
        let ty = subst_acc.apply_to_type(&overall);
        results.push(InferResult {
            ty: ty.clone(),
            subst: subst_acc.clone(),
            expr: Expr::Switch(Switch {
                info: s.info.clone(),
                scrutinee: Box::new(subst_acc.apply_to_expr(&r.expr)),
                cases: case_exprs,
                ty: Some(ty),
            }),
        });
    }

    if results.is_empty() {
        return Err(Error::at(
            s.info.clone(),
            ErrorKind::CannotSwitch(CannotSwitchReason::NoMatchingUnion),
        ));
    }
    Ok(results)
}

fn substitute(map: &HashMap<Name, Type>, ty: &Type) -> Type {
    ty.map(&mut |t| match &t {
        Type::Var(v) => map.get(v).cloned().unwrap_or(t),
        _ => t,
    })
}

fn instantiate_type(
    gen: &mut VarGen,
    renames: &mut HashMap<Name, Name>,
    ty: &Type,
) -> Type {
    ty.map(&mut |t| match &t {
        Type::Var(v) => {
            let renamed = renames.entry(v.clone()).or_insert_with(|| match gen.fresh() {
                Type::Var(n) => n,
                _ => unreachable!(),
            });
            Type::Var(renamed.clone())
        }
        _ => t,
    })
}

fn instantiate_expr(
    gen: &mut VarGen,
    renames: &mut HashMap<Name, Name>,
    expr: &Expr,
) -> Expr {
    expr.map(&mut |e| match e.type_info() {
        Some(ty) => e.with_type_info(instantiate_type(gen, renames, &ty)),
        None => e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{CharLit, IntLit};
    use crate::source::SourceInfo;
    use num_bigint::BigInt;

    fn info() -> SourceInfo {
        SourceInfo::new("test.cv".into(), 1, 1)
    }

    #[test]
    fn infers_literal_types() {
        let names = HashMap::new();
        let global = HashMap::new();
        let results = infer(&names, &global, &Expr::Int(IntLit { info: info(), value: BigInt::from(1) })).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].ty, Type::nullary("Int"));
    }

    #[test]
    fn not_bound_reports_name() {
        let names = HashMap::new();
        let global = HashMap::new();
        let expr = Expr::Var(Var { info: info(), name: Name::new("x"), ty: None });
        let err = infer(&names, &global, &expr).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotBound(Name::new("x")));
    }

    #[test]
    fn identity_application_infers_to_argument_type() {
        let names = HashMap::new();
        let mut global = HashMap::new();
        global.insert(
            Name::new("id"),
            vec![Type::func(Type::Var(Name::new("a")), Type::Var(Name::new("a")))],
        );
        let expr = Expr::Appl(Appl {
            left: Box::new(Expr::Var(Var { info: info(), name: Name::new("id"), ty: None })),
            right: Box::new(Expr::Char(CharLit { info: info(), value: 'x' })),
            ty: None,
        });
        let results = infer(&names, &global, &expr).unwrap();
        assert!(results.iter().any(|r| r.ty == Type::nullary("Char")));
    }
}
