//! Third IR stage: true lambda-lifting. Grounded directly on
//! `SPEC_FULL.md` §4.9 (no Go original in the retrieval pack does this;
//! see `DESIGN.md`). At every `Abst`, any name free in its body that
//! comes from an *enclosing* scope is hoisted into a new leading bound
//! parameter, and the abstraction site is wrapped in an application
//! that supplies the captured value from the enclosing frame. This
//! turns every abstraction into a closed combinator, so the runtime
//! never needs to chase an environment past the frame an `Abst` itself
//! introduces.
//!
//! `locals` holds the names in scope at the current node in De Bruijn
//! order already: index 0 is whatever the runtime will have pushed
//! *last* (and so finds at depth 0), matching how the reducer applies
//! an n-ary `Abst`'s operands one at a time, in application order,
//! each push landing on top of the frame. Since application order is
//! the order arguments appear in `bound`/`Appl`'s operand list, the
//! name bound to the *last* operand ends up at depth 0; `depth_order`
//! below performs that reversal whenever a new set of binders is
//! entered.
use crate::identifier::Name;
use crate::ir::Code;

pub fn lift(locals: &[Name], code: Code) -> Code {
    match code {
        Code::Var(_, name) => {
            let depth = locals
                .iter()
                .position(|n| n == &name)
                .unwrap_or_else(|| panic!("unresolved local after compress/lift: {name}"));
            Code::Var(Some(depth), name)
        }

        Code::Abst(bound, body) => {
            let mut free = Vec::new();
            collect_free(locals, &bound, &body, &mut free);

            if free.is_empty() {
                let new_locals = depth_order(&bound);
                Code::Abst(bound, Box::new(lift(&new_locals, *body)))
            } else {
                // Application order at runtime: the wrapping `Appl` supplies
                // the captured values first, then the original call site
                // supplies `bound`'s arguments, in that order.
                let mut application_order = free.clone();
                application_order.extend(bound.iter().cloned());
                let new_locals = depth_order(&application_order);
                let lifted_body = lift(&new_locals, *body);
                let combinator = Code::Abst(application_order, Box::new(lifted_body));
                let captured: Vec<Code> = free
                    .iter()
                    .map(|n| {
                        let depth = locals.iter().position(|x| x == n).expect(
                            "a name collect_free reports free in an enclosing scope must be in locals",
                        );
                        Code::Var(Some(depth), n.clone())
                    })
                    .collect();
                Code::Appl(Box::new(combinator), captured)
            }
        }

        Code::Appl(f, operands) => Code::Appl(
            Box::new(lift(locals, *f)),
            operands.into_iter().map(|a| lift(locals, a)).collect(),
        ),

        Code::Strict(e) => Code::Strict(Box::new(lift(locals, *e))),

        Code::Switch(scrutinee, cases) => {
            Code::Switch(Box::new(lift(locals, *scrutinee)), cases.into_iter().map(|c| lift(locals, c)).collect())
        }

        other @ (Code::Char(_) | Code::Int(_) | Code::Float(_) | Code::Ref(..) | Code::Operator(_)
        | Code::Make(_) | Code::Field(_)) => other,
    }
}

/// Reverses an application-order parameter list into De Bruijn order:
/// the last-applied name ends up first (depth 0).
fn depth_order(application_order: &[Name]) -> Vec<Name> {
    application_order.iter().rev().cloned().collect()
}

/// Collects, into `out`, every name free in `code` that is present in
/// `locals` but not shadowed by `shadow` (the abstraction's own bound
/// names) or by any `Abst` encountered on the way down. Insertion
/// order matters: it fixes the order captured values are supplied in
/// at the application `lift` builds around the lifted abstraction.
fn collect_free(locals: &[Name], shadow: &[Name], code: &Code, out: &mut Vec<Name>) {
    match code {
        Code::Var(_, name) => {
            if locals.contains(name) && !shadow.contains(name) && !out.contains(name) {
                out.push(name.clone());
            }
        }
        Code::Char(_) | Code::Int(_) | Code::Float(_) | Code::Ref(..) | Code::Operator(_)
        | Code::Make(_) | Code::Field(_) => {}
        Code::Abst(bound, body) => {
            let mut nested_shadow = shadow.to_vec();
            nested_shadow.extend(bound.iter().cloned());
            collect_free(locals, &nested_shadow, body, out);
        }
        Code::Appl(f, operands) => {
            collect_free(locals, shadow, f, out);
            for a in operands {
                collect_free(locals, shadow, a, out);
            }
        }
        Code::Strict(e) => collect_free(locals, shadow, e, out),
        Code::Switch(scrutinee, cases) => {
            collect_free(locals, shadow, scrutinee, out);
            for c in cases {
                collect_free(locals, shadow, c, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Code {
        Code::Var(None, Name::new(name))
    }

    #[test]
    fn closed_abstraction_is_left_in_place() {
        let code = Code::Abst(vec![Name::new("x")], Box::new(var("x")));
        match lift(&[], code) {
            Code::Abst(bound, body) => {
                assert_eq!(bound, vec![Name::new("x")]);
                assert!(matches!(*body, Code::Var(Some(0), _)));
            }
            _ => panic!("expected Abst"),
        }
    }

    #[test]
    fn captures_an_enclosing_local_as_a_leading_parameter() {
        // Under a binder for `y`, lift `\x -> y x`.
        let inner = Code::Abst(vec![Name::new("x")], Box::new(Code::Appl(Box::new(var("y")), vec![var("x")])));
        match lift(&[Name::new("y")], inner) {
            Code::Appl(combinator, captured) => {
                assert_eq!(captured.len(), 1);
                assert!(matches!(captured[0], Code::Var(Some(0), ref n) if n == &Name::new("y")));
                match *combinator {
                    Code::Abst(bound, body) => {
                        assert_eq!(bound, vec![Name::new("y"), Name::new("x")]);
                        match *body {
                            // `y` is applied first (depth 1, pushed deeper),
                            // `x` last (depth 0, on top).
                            Code::Appl(f, operands) => {
                                assert!(matches!(*f, Code::Var(Some(1), _)));
                                assert!(matches!(operands[0], Code::Var(Some(0), _)));
                            }
                            _ => panic!("expected Appl body"),
                        }
                    }
                    _ => panic!("expected Abst combinator"),
                }
            }
            _ => panic!("expected an Appl wrapping the lifted combinator"),
        }
    }

    #[test]
    fn later_bound_param_gets_depth_zero() {
        // `\x y -> x y`: x is applied first (so ends up deeper), y last.
        let code = Code::Abst(
            vec![Name::new("x"), Name::new("y")],
            Box::new(Code::Appl(Box::new(var("x")), vec![var("y")])),
        );
        match lift(&[], code) {
            Code::Abst(_, body) => match *body {
                Code::Appl(f, operands) => {
                    assert!(matches!(*f, Code::Var(Some(1), _)));
                    assert!(matches!(operands[0], Code::Var(Some(0), _)));
                }
                _ => panic!("expected Appl body"),
            },
            _ => panic!("expected Abst"),
        }
    }

    #[test]
    fn shadowed_name_is_not_captured() {
        let code = Code::Abst(vec![Name::new("x")], Box::new(var("x")));
        match lift(&[Name::new("x")], code) {
            Code::Abst(..) => {}
            Code::Appl(..) => panic!("shadowed name must not be captured"),
            _ => panic!("unexpected shape"),
        }
    }
}
