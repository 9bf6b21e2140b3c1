//! The nameless lambda/combinator IR a typed AST is lowered to on its
//! way to the runtime's `Code` graph (`crate::code`), grounded on
//! `SPEC_FULL.md` §3.3/§4.7-§4.10. No Go original covers this stage:
//! `funky`'s own compiler folds translate/lift/link into one pass with
//! lexical drop-counts rather than true lambda-lifting, so this is a
//! from-scratch implementation of the described algorithm.
//!
//! Names stay attached to `Var`/`Abst` throughout `translate`,
//! `compress` and `lift` purely as compiler bookkeeping; `link`
//! discards them when it builds the final nameless `code::Code` cells.
use num_bigint::BigInt;

use crate::identifier::Name;

#[derive(Clone, Debug)]
pub enum Code {
    Char(char),
    Int(BigInt),
    Float(f64),
    /// A local variable: `None` before `lift` assigns its De Bruijn
    /// depth, `Some(depth)` after.
    Var(Option<usize>, Name),
    /// A reference to the `i`-th overload of a top-level name,
    /// resolved by `translate` from the call site's inferred type.
    Ref(Name, usize),
    Abst(Vec<Name>, Box<Code>),
    Appl(Box<Code>, Vec<Code>),
    Strict(Box<Code>),
    Switch(Box<Code>, Vec<Code>),
    /// A built-in arithmetic/comparison/conversion operator, by name
    /// (e.g. `"+"`, `"intToFloat"`). Never produced by `translate`
    /// from source syntax; `link` synthesizes these directly for
    /// native function bodies (see `native.rs`).
    Operator(Name),
    /// A record/union constructor tag: applying `arity` further
    /// arguments builds a `Record`/`Union` value carrying them.
    Make(Name),
    /// Projects field `index` out of the single argument, which must
    /// be a `Record` or the matching `Union` alternative.
    Field(usize),
}
