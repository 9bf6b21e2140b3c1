/*!
A small, purely functional, lazily evaluated programming language:
tokenizer, tree-forming parser, Hindley-Milner type inferencer with
ad-hoc overloading, a nameless lambda-lifted intermediate
representation, and a lazy graph-reduction runtime.

[`compile::compile`] runs the whole front end over a batch of source
files and returns a linked [`link::Program`]; [`driver::run_console`]
drives one to completion as a console I/O program. `corvid-cli` wires
both together for the command line.
*/
pub mod ast;
pub mod ast_build;
pub mod code;
pub mod compile;
pub mod compress;
pub mod driver;
pub mod env;
pub mod error;
pub mod identifier;
pub mod infer;
pub mod ir;
pub mod lexer;
pub mod lift;
pub mod link;
pub mod native;
pub mod reduce;
pub mod source;
pub mod specialize;
pub mod substitution;
pub mod translate;
pub mod tree;
pub mod types;
pub mod unify;
pub mod value;
pub mod varset;

pub use compile::{compile, Source};
pub use env::Env;
pub use error::{Error, ErrorKind};
pub use identifier::Name;
pub use link::Program;
pub use value::Value;
