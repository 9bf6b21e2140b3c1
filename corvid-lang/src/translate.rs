//! First IR stage: lowers a typed surface `Expr` into the nameless
//! `ir::Code` tree. Grounded directly on `SPEC_FULL.md` §4.7: no Go
//! original in the retrieval pack implements this algorithm (see
//! `DESIGN.md`). A name bound by an enclosing `Abst` resolves to
//! `Code::Var(None, name)` (its De Bruijn depth is filled in later, by
//! `lift`); a name not in scope resolves immediately to `Code::Ref`,
//! picking the overload whose instantiated type unifies with the
//! call site's inferred type.
use std::collections::HashMap;

use crate::ast::Expr;
use crate::identifier::Name;
use crate::ir::Code;
use crate::types::{Type, TypeDecl};
use crate::unify::can_unify;

pub fn translate(names: &HashMap<Name, TypeDecl>, global: &HashMap<Name, Vec<Type>>, expr: &Expr) -> Code {
    translate_rec(names, global, &[], expr)
}

fn translate_rec(
    names: &HashMap<Name, TypeDecl>,
    global: &HashMap<Name, Vec<Type>>,
    locals: &[Name],
    expr: &Expr,
) -> Code {
    match expr {
        Expr::Char(c) => Code::Char(c.value),
        Expr::Int(i) => Code::Int(i.value.clone()),
        Expr::Float(f) => Code::Float(f.value),

        Expr::Var(v) => {
            if locals.iter().any(|n| n == &v.name) {
                return Code::Var(None, v.name.clone());
            }
            let ty = v
                .ty
                .as_ref()
                .expect("translate runs after type inference, every Var is typed");
            let overloads = global
                .get(&v.name)
                .unwrap_or_else(|| panic!("unresolved name after validation: {}", v.name));
            let index = overloads
                .iter()
                .position(|candidate| can_unify(names, candidate, ty))
                .unwrap_or_else(|| panic!("no overload of {} matches its inferred type", v.name));
            Code::Ref(v.name.clone(), index)
        }

        Expr::Appl(a) => Code::Appl(
            Box::new(translate_rec(names, global, locals, &a.left)),
            vec![translate_rec(names, global, locals, &a.right)],
        ),

        Expr::Abst(a) => {
            let mut extended = Vec::with_capacity(locals.len() + 1);
            extended.push(a.bound.name.clone());
            extended.extend_from_slice(locals);
            Code::Abst(
                vec![a.bound.name.clone()],
                Box::new(translate_rec(names, global, &extended, &a.body)),
            )
        }

        Expr::Strict(s) => Code::Strict(Box::new(translate_rec(names, global, locals, &s.expr))),

        Expr::Switch(s) => Code::Switch(
            Box::new(translate_rec(names, global, locals, &s.scrutinee)),
            s.cases.iter().map(|c| translate_rec(names, global, locals, &c.body)).collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Appl, Var};
    use crate::source::SourceInfo;

    fn info() -> SourceInfo {
        SourceInfo::new("t.cv".into(), 1, 1)
    }

    fn typed_var(name: &str, ty: Type) -> Var {
        Var { info: info(), name: Name::new(name), ty: Some(ty) }
    }

    #[test]
    fn resolves_global_to_the_matching_overload() {
        let names = HashMap::new();
        let mut global = HashMap::new();
        global.insert(Name::new("zero"), vec![Type::nullary("Int"), Type::nullary("Char")]);
        let expr = Expr::Var(typed_var("zero", Type::nullary("Char")));
        let code = translate(&names, &global, &expr);
        assert!(matches!(code, Code::Ref(_, 1)));
    }

    #[test]
    fn bound_var_stays_nameless_and_unresolved() {
        let names = HashMap::new();
        let global = HashMap::new();
        let expr = Expr::Appl(Appl {
            left: Box::new(Expr::Var(typed_var("f", Type::func(Type::nullary("Int"), Type::nullary("Int"))))),
            right: Box::new(Expr::Var(typed_var("f", Type::nullary("Int")))),
            ty: None,
        });
        // `f` is bound locally here to sidestep needing a global table entry.
        let code = translate_rec(&names, &global, &[Name::new("f")], &expr);
        match code {
            Code::Appl(left, operands) => {
                assert!(matches!(*left, Code::Var(None, ref n) if n == &Name::new("f")));
                assert!(matches!(operands[0], Code::Var(None, ref n) if n == &Name::new("f")));
            }
            _ => panic!("expected Appl"),
        }
    }
}
