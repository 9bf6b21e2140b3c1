//! Fourth and final compile-time stage: turns a validated, type-
//! inferred [`Env`] into a runtime [`Program`] of [`code::Code`]
//! graphs. Grounded on `SPEC_FULL.md` §4.10; the entry-point lookup at
//! the bottom of this file is grounded on `run.go`'s length-0/length-1
//! checks around its own lookup of `main` (see `DESIGN.md`).
//!
//! Linking happens in two passes so that forward and mutual references
//! between top-level definitions work: pass one creates one
//! [`Definition`] placeholder per `(name, overload index)` pair with an
//! empty body; pass two compiles every body and installs it, by which
//! point every name a body can possibly reference already has a
//! placeholder to point `Code::Global` at.
use std::collections::HashMap;
use std::rc::Rc;

use crate::code::{self, Definition};
use crate::compress::compress;
use crate::env::{Env, FuncImpl};
use crate::error::{Error, ErrorKind};
use crate::identifier::Name;
use crate::ir;
use crate::lift::lift;
use crate::native;
use crate::translate::translate;
use crate::types::Type;

/// Every top-level definition, linked and ready to reduce.
#[derive(Debug)]
pub struct Program {
    definitions: HashMap<Name, Vec<Rc<Definition>>>,
}

impl Program {
    pub fn lookup(&self, name: &Name, overload: usize) -> Option<&Rc<Definition>> {
        self.definitions.get(name).and_then(|v| v.get(overload))
    }

    /// Finds the single nullary definition named `name` to use as a
    /// program's entry point, matching `run.go`'s shape: zero matches
    /// or more than one is an error, since the driver needs exactly
    /// one value to start reducing.
    pub fn entry_point(&self, name: &Name) -> Result<Rc<Definition>, Error> {
        match self.definitions.get(name).map(Vec::as_slice) {
            None | Some([]) => Err(Error::without_source(ErrorKind::NoDefinitionFor(name.clone()))),
            Some([single]) => Ok(single.clone()),
            Some(_) => Err(Error::without_source(ErrorKind::MultipleDefinitionsOf(name.clone()))),
        }
    }
}

pub fn link(env: &Env) -> Program {
    let mut definitions: HashMap<Name, Vec<Rc<Definition>>> = HashMap::new();
    for (name, impls) in &env.funcs {
        let placeholders = (0..impls.len())
            .map(|overload| {
                Rc::new(Definition {
                    name: name.clone(),
                    overload,
                    code: std::cell::RefCell::new(Rc::new(code::Code::Int(num_bigint::BigInt::from(0)))),
                })
            })
            .collect();
        definitions.insert(name.clone(), placeholders);
    }

    let global: HashMap<Name, Vec<Type>> = env
        .funcs
        .iter()
        .map(|(name, impls)| (name.clone(), impls.iter().map(|i| i.ty().clone()).collect()))
        .collect();

    for (name, impls) in &env.funcs {
        for (overload, imp) in impls.iter().enumerate() {
            let compiled = match imp {
                FuncImpl::Source { body, .. } => {
                    let ir = translate(&env.names, &global, body);
                    let ir = compress(ir);
                    let ir = lift(&[], ir);
                    lower(&definitions, &ir)
                }
                FuncImpl::Native { ty, .. } => native::synthesize(&env.names, name, ty),
            };
            *definitions[name][overload].code.borrow_mut() = compiled;
        }
    }

    Program { definitions }
}

/// Lowers a fully-lifted `ir::Code` (every `Var` already has a depth,
/// every name-carrying node is cosmetic) into the nameless `code::Code`
/// the reducer runs. `Ref` becomes `Global` by looking up the
/// placeholder `link`'s first pass already created for that overload.
fn lower(definitions: &HashMap<Name, Vec<Rc<Definition>>>, code: &ir::Code) -> Rc<code::Code> {
    match code {
        ir::Code::Char(c) => Rc::new(code::Code::Char(*c)),
        ir::Code::Int(i) => Rc::new(code::Code::Int(i.clone())),
        ir::Code::Float(x) => Rc::new(code::Code::Float(*x)),

        ir::Code::Var(depth, name) => {
            let depth = depth.unwrap_or_else(|| panic!("unlifted Var reached link: {name}"));
            Rc::new(code::Code::Var(depth))
        }

        ir::Code::Ref(name, overload) => {
            let def = definitions
                .get(name)
                .and_then(|v| v.get(*overload))
                .unwrap_or_else(|| panic!("link: no placeholder for {name}#{overload}"))
                .clone();
            Rc::new(code::Code::Global(def))
        }

        ir::Code::Abst(bound, body) => {
            Rc::new(code::Code::Abst { arity: bound.len(), body: lower(definitions, body) })
        }

        ir::Code::Appl(operator, operands) => Rc::new(code::Code::Appl {
            operator: lower(definitions, operator),
            operands: operands.iter().map(|o| lower(definitions, o)).collect(),
        }),

        ir::Code::Strict(inner) => Rc::new(code::Code::Strict(lower(definitions, inner))),

        ir::Code::Switch(scrutinee, cases) => Rc::new(code::Code::Switch {
            scrutinee: lower(definitions, scrutinee),
            cases: cases.iter().map(|c| lower(definitions, c)).collect(),
        }),

        ir::Code::Operator(_) | ir::Code::Make(_) | ir::Code::Field(_) => {
            unreachable!("translate never produces these; native bodies bypass ir::Code entirely")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expr, IntLit};
    use crate::reduce::force;
    use crate::source::SourceInfo;
    use num_bigint::BigInt;

    fn info() -> SourceInfo {
        SourceInfo::new("t.cv".into(), 1, 1)
    }

    #[test]
    fn links_a_single_nullary_definition_and_reduces_it() {
        let mut env = Env::new();
        env.funcs.insert(
            Name::new("answer"),
            vec![FuncImpl::Source {
                info: info(),
                ty: Type::nullary("Int"),
                body: Expr::Int(IntLit { info: info(), value: BigInt::from(42) }),
            }],
        );
        let program = link(&env);
        let entry = program.entry_point(&Name::new("answer")).unwrap();
        let thunk = crate::code::Thunk::suspended(
            entry.code.borrow().clone(),
            crate::code::Data::empty(),
        );
        match force(&thunk) {
            crate::code::Value::Int(i) => assert_eq!(i, BigInt::from(42)),
            other => panic!("expected Int, got {other:?}"),
        }
    }

    #[test]
    fn missing_entry_point_is_an_error() {
        let env = Env::new();
        let program = link(&env);
        let err = program.entry_point(&Name::new("main")).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::NoDefinitionFor(_)));
    }
}
