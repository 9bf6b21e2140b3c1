//! The final, nameless runtime representation `link` builds and
//! `reduce` evaluates: a graph of [`Code`] cells (shared via `Rc` so
//! multiple call sites can reference the same compiled definition) and
//! the [`Value`]/[`Thunk`]/[`Data`] objects the graph-reduction loop
//! threads through it. Grounded on `SPEC_FULL.md` §3.4/§4.11; no Go
//! original in the retrieval pack implements this representation
//! exactly (see `DESIGN.md`). The self-memoizing `Thunk` is the
//! closest match to Go `runtime/expr.go`'s `Appl{reduced, ...}` node,
//! carried over as Rust's standard `Rc<RefCell<..>>` shared-mutable-
//! cell idiom rather than Go's raw pointer mutation.
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use num_bigint::BigInt;

use crate::identifier::Name;

/// A compiled expression. `Var` indices are De Bruijn depths into the
/// `Data` frame chain active when the cell is reduced; `Global` is a
/// resolved pointer to another top-level definition's compiled body.
pub enum Code {
    Char(char),
    Int(BigInt),
    Float(f64),
    Var(usize),
    Global(Rc<Definition>),
    Abst { arity: usize, body: Rc<Code> },
    Appl { operator: Rc<Code>, operands: Vec<Rc<Code>> },
    /// Marks an `Appl` operand as forced before it is pushed onto the
    /// callee's data frame, instead of being pushed as a lazy thunk.
    /// Never appears anywhere but in an operand position.
    Strict(Rc<Code>),
    Switch { scrutinee: Rc<Code>, cases: Vec<Rc<Code>> },
    NativeFn(Rc<dyn Fn(&[Rc<RefCell<Thunk>>]) -> Value>, usize),
}

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Code::Char(c) => write!(f, "Char({c:?})"),
            Code::Int(i) => write!(f, "Int({i})"),
            Code::Float(x) => write!(f, "Float({x})"),
            Code::Var(i) => write!(f, "Var({i})"),
            Code::Global(d) => write!(f, "Global({}#{})", d.name, d.overload),
            Code::Abst { arity, .. } => write!(f, "Abst(/{arity})"),
            Code::Appl { operands, .. } => write!(f, "Appl(.. x{})", operands.len()),
            Code::Strict(inner) => write!(f, "Strict({inner:?})"),
            Code::Switch { cases, .. } => write!(f, "Switch(x{})", cases.len()),
            Code::NativeFn(_, arity) => write!(f, "NativeFn(/{arity})"),
        }
    }
}

/// A linked top-level definition: stable identity for a `Global` cell
/// to point at, installed once by `link` and never mutated afterward.
#[derive(Debug)]
pub struct Definition {
    pub name: Name,
    pub overload: usize,
    /// Installed by `link` in a second pass, after every definition's
    /// placeholder already exists, so bodies may reference each other
    /// (forward and mutual references) before any of them is compiled.
    pub code: RefCell<Rc<Code>>,
}

/// A singly-linked environment frame: the runtime analogue of the
/// local-name stack `lift` closed over at compile time.
pub enum Data {
    Empty,
    Frame { value: Rc<RefCell<Thunk>>, next: Rc<Data> },
}

impl Data {
    pub fn empty() -> Rc<Data> {
        Rc::new(Data::Empty)
    }

    pub fn push(self: &Rc<Data>, value: Rc<RefCell<Thunk>>) -> Rc<Data> {
        Rc::new(Data::Frame { value, next: self.clone() })
    }

    /// Walks `n` steps along the frame chain (`drop(n, d)` in
    /// `SPEC_FULL.md` §3.4).
    pub fn drop_n(self: &Rc<Data>, n: usize) -> Rc<Data> {
        let mut d = self.clone();
        for _ in 0..n {
            d = match &*d {
                Data::Frame { next, .. } => next.clone(),
                Data::Empty => panic!("dropped past the end of a data frame"),
            };
        }
        d
    }

    pub fn get(self: &Rc<Data>, index: usize) -> Rc<RefCell<Thunk>> {
        match &*self.drop_n(index) {
            Data::Frame { value, .. } => value.clone(),
            Data::Empty => panic!("Var index out of range"),
        }
    }
}

/// A suspended computation: `code` paired with the `Data` frame it
/// closes over. `Reduce` mutates `memo` from `None` to `Some` exactly
/// once (`SPEC_FULL.md` §3.4's lifecycle note) and every subsequent
/// force of the same `Rc<RefCell<Thunk>>` returns the memoized value
/// without re-entering the reducer.
pub struct Thunk {
    pub code: Rc<Code>,
    pub data: Rc<Data>,
    pub memo: Option<Value>,
}

impl Thunk {
    pub fn suspended(code: Rc<Code>, data: Rc<Data>) -> Rc<RefCell<Thunk>> {
        Rc::new(RefCell::new(Thunk { code, data, memo: None }))
    }

    pub fn ready(value: Value) -> Rc<RefCell<Thunk>> {
        Rc::new(RefCell::new(Thunk { code: Rc::new(Code::Char('\0')), data: Data::empty(), memo: Some(value) }))
    }
}

/// A head-normal result: either a fully-evaluated primitive/structured
/// value, or a callable (`Abst`/`NativeFn`) waiting for its argument.
#[derive(Clone)]
pub enum Value {
    Char(char),
    Int(BigInt),
    Float(f64),
    Record(Rc<Vec<Rc<RefCell<Thunk>>>>),
    Union(usize, Rc<Vec<Rc<RefCell<Thunk>>>>),
    Abst { arity: usize, body: Rc<Code>, data: Rc<Data> },
    NativeFn(Rc<dyn Fn(&[Rc<RefCell<Thunk>>]) -> Value>, usize, Vec<Rc<RefCell<Thunk>>>),
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Char(c) => write!(f, "Char({c:?})"),
            Value::Int(i) => write!(f, "Int({i})"),
            Value::Float(x) => write!(f, "Float({x})"),
            Value::Record(fields) => write!(f, "Record(x{})", fields.len()),
            Value::Union(alt, fields) => write!(f, "Union({alt}, x{})", fields.len()),
            Value::Abst { arity, .. } => write!(f, "Abst(/{arity})"),
            Value::NativeFn(_, arity, applied) => write!(f, "NativeFn(/{arity}, applied {})", applied.len()),
        }
    }
}
