//! Second IR stage: flattens curried `Abst`/`Appl` chains into their
//! n-ary form, bottom-up, in one pass. Grounded directly on
//! `SPEC_FULL.md` §4.8 (no Go original in the retrieval pack compiles
//! this way; see `DESIGN.md`). Two rules, applied wherever they match:
//!
//! - `Abst(x1, Abst(x2, e))` → `Abst([x1, x2], e)`
//! - `Appl(Appl(f, as), bs)` → `Appl(f, as ++ bs)`
use crate::ir::Code;

pub fn compress(code: Code) -> Code {
    match code {
        Code::Abst(mut bound, body) => match compress(*body) {
            Code::Abst(inner_bound, inner_body) => {
                bound.extend(inner_bound);
                Code::Abst(bound, inner_body)
            }
            other => Code::Abst(bound, Box::new(other)),
        },

        Code::Appl(f, operands) => {
            let f = compress(*f);
            let operands: Vec<Code> = operands.into_iter().map(compress).collect();
            match f {
                Code::Appl(inner_f, mut inner_operands) => {
                    inner_operands.extend(operands);
                    Code::Appl(inner_f, inner_operands)
                }
                other => Code::Appl(Box::new(other), operands),
            }
        }

        Code::Strict(e) => Code::Strict(Box::new(compress(*e))),

        Code::Switch(scrutinee, cases) => {
            Code::Switch(Box::new(compress(*scrutinee)), cases.into_iter().map(compress).collect())
        }

        other @ (Code::Char(_) | Code::Int(_) | Code::Float(_) | Code::Var(..) | Code::Ref(..)
        | Code::Operator(_) | Code::Make(_) | Code::Field(_)) => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::Name;

    fn var(name: &str) -> Code {
        Code::Var(None, Name::new(name))
    }

    #[test]
    fn flattens_nested_abstractions() {
        let code = Code::Abst(
            vec![Name::new("x")],
            Box::new(Code::Abst(vec![Name::new("y")], Box::new(var("y")))),
        );
        match compress(code) {
            Code::Abst(bound, body) => {
                assert_eq!(bound, vec![Name::new("x"), Name::new("y")]);
                assert!(matches!(*body, Code::Var(None, ref n) if n == &Name::new("y")));
            }
            _ => panic!("expected Abst"),
        }
    }

    #[test]
    fn flattens_nested_applications() {
        let code = Code::Appl(
            Box::new(Code::Appl(Box::new(var("f")), vec![var("a")])),
            vec![var("b")],
        );
        match compress(code) {
            Code::Appl(f, operands) => {
                assert!(matches!(*f, Code::Var(None, ref n) if n == &Name::new("f")));
                assert_eq!(operands.len(), 2);
            }
            _ => panic!("expected Appl"),
        }
    }

    #[test]
    fn leaves_single_abstraction_unchanged() {
        let code = Code::Abst(vec![Name::new("x")], Box::new(var("x")));
        match compress(code) {
            Code::Abst(bound, _) => assert_eq!(bound, vec![Name::new("x")]),
            _ => panic!("expected Abst"),
        }
    }
}
