//! Pipeline glue: source text in, a linked [`link::Program`] (or every
//! error found along the way) out. Grounded on `compile/compile.go`'s
//! top-level `Compile` function, which runs the same phases in the
//! same order and keeps batching errors instead of stopping at the
//! first.
use crate::ast_build::parse_source;
use crate::env::Env;
use crate::error::Error;
use crate::link::{self, Program};

/// One source file, named for error messages.
pub struct Source<'a> {
    pub filename: &'a str,
    pub text: &'a str,
}

/// Runs tokenizing, tree-forming, AST-building, declaration
/// validation and type inference over every source file, then links
/// the result into a runnable [`Program`]. Every phase collects all
/// its errors before the next phase runs, so a caller sees every
/// problem in one pass rather than one-at-a-time (`spec.md` §7).
pub fn compile(sources: &[Source]) -> Result<Program, Vec<Error>> {
    let mut env = Env::new();
    let mut errs = Vec::new();

    for source in sources {
        match parse_source(source.filename, source.text) {
            Ok(decls) => errs.extend(env.add_all(decls)),
            Err(e) => errs.push(e),
        }
    }
    if !errs.is_empty() {
        return Err(errs);
    }

    errs.extend(env.validate());
    if !errs.is_empty() {
        return Err(errs);
    }

    errs.extend(env.type_infer());
    if !errs.is_empty() {
        return Err(errs);
    }

    Ok(link::link(&env))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_and_links_a_trivial_program() {
        let sources = [Source { filename: "t.cv", text: "func main : Int = 42" }];
        let program = compile(&sources).unwrap();
        let entry = program.entry_point(&crate::identifier::Name::new("main")).unwrap();
        let thunk = crate::code::Thunk::suspended(entry.code.borrow().clone(), crate::code::Data::empty());
        match crate::reduce::force(&thunk) {
            crate::code::Value::Int(i) => assert_eq!(i, num_bigint::BigInt::from(42)),
            other => panic!("expected Int, got {other:?}"),
        }
    }

    #[test]
    fn reports_an_unbound_name_instead_of_panicking() {
        let sources = [Source { filename: "t.cv", text: "func main : Int = doesNotExist" }];
        let errs = compile(&sources).unwrap_err();
        assert!(!errs.is_empty());
    }
}
