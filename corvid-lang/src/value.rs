//! The driver-facing value API: a thin, ergonomic wrapper over
//! [`code::Value`] for code outside the reducer (`compile.rs`,
//! `driver.rs`, `corvid-cli`) to inspect and construct runtime values
//! without reaching into `code::Data`/`Thunk` by hand. Grounded on Go
//! `runtime/box.go`'s `Box`/`Mk*` methods — API shape only, since no
//! retrieved revision targets this crate's `Rc<RefCell<Thunk>>`
//! representation (see `DESIGN.md`).
use std::cell::RefCell;
use std::rc::Rc;

use num_bigint::BigInt;

use crate::code::{Thunk, Value as RawValue};
use crate::reduce::force;

/// A forced runtime value, ready for a driver to inspect.
#[derive(Clone)]
pub struct Value(RawValue);

impl Value {
    pub fn from_thunk(thunk: &Rc<RefCell<Thunk>>) -> Value {
        Value(force(thunk))
    }

    pub fn char(&self) -> Option<char> {
        match &self.0 {
            RawValue::Char(c) => Some(*c),
            _ => None,
        }
    }

    pub fn int(&self) -> Option<&BigInt> {
        match &self.0 {
            RawValue::Int(i) => Some(i),
            _ => None,
        }
    }

    pub fn float(&self) -> Option<f64> {
        match &self.0 {
            RawValue::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// The tag of a union value (its alternative's position in
    /// declaration order) and the number of fields it carries.
    pub fn alternative(&self) -> Option<usize> {
        match &self.0 {
            RawValue::Union(alt, _) => Some(*alt),
            _ => None,
        }
    }

    /// Field `index` of a record or union value, forced.
    pub fn field(&self, index: usize) -> Option<Value> {
        match &self.0 {
            RawValue::Record(fields) | RawValue::Union(_, fields) => {
                fields.get(index).map(Value::from_thunk)
            }
            _ => None,
        }
    }

    /// Applies this value, which must be callable, to one argument
    /// and forces the result. The driver loop (`driver.rs`) repeatedly
    /// applies a console-I/O alternative's continuation this way.
    pub fn apply(&self, arg: Value) -> Value {
        let thunk = Thunk::ready(arg.0);
        Value(crate::reduce::apply(self.0.clone(), thunk))
    }

    /// Interprets a two-alternative union (`False`/`True`, by
    /// declaration order) as a bool, the convention `SPEC_FULL.md`
    /// §4.12 documents for driver-level convenience accessors.
    pub fn bool(&self) -> Option<bool> {
        match self.alternative()? {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        }
    }

    /// Walks a `Cons`/`Nil`-shaped union (alternative 0 = nil,
    /// alternative 1 = cons of a field and a tail) into a `Vec`,
    /// forcing every spine cell but leaving each element a `Value`.
    pub fn list(&self) -> Option<Vec<Value>> {
        let mut out = Vec::new();
        let mut current = self.clone();
        loop {
            match current.alternative()? {
                0 => return Some(out),
                1 => {
                    out.push(current.field(0)?);
                    current = current.field(1)?;
                }
                _ => return None,
            }
        }
    }

    /// A `list()` of `Char`s, collected into a `String`.
    pub fn string(&self) -> Option<String> {
        self.list()?.into_iter().map(|v| v.char()).collect::<Option<Vec<char>>>().map(|cs| cs.into_iter().collect())
    }
}

pub fn mk_char(c: char) -> Value {
    Value(RawValue::Char(c))
}

pub fn mk_int(i: BigInt) -> Value {
    Value(RawValue::Int(i))
}

pub fn mk_float(x: f64) -> Value {
    Value(RawValue::Float(x))
}

pub fn mk_record(fields: Vec<Value>) -> Value {
    let cells = fields.into_iter().map(|v| Thunk::ready(v.0)).collect();
    Value(RawValue::Record(Rc::new(cells)))
}

pub fn mk_union(alt: usize, fields: Vec<Value>) -> Value {
    let cells = fields.into_iter().map(|v| Thunk::ready(v.0)).collect();
    Value(RawValue::Union(alt, Rc::new(cells)))
}

pub fn mk_bool(b: bool) -> Value {
    mk_union(b as usize, Vec::new())
}

/// Builds a `Cons`/`Nil` list value (alternative 1 / 0) out of
/// already-built element values, tail first so the last element
/// becomes the outermost cons cell.
pub fn mk_list(elements: Vec<Value>) -> Value {
    elements
        .into_iter()
        .rev()
        .fold(mk_union(0, Vec::new()), |tail, head| mk_union(1, vec![head, tail]))
}

pub fn mk_string(s: &str) -> Value {
    mk_list(s.chars().map(mk_char).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_short_list() {
        let v = mk_list(vec![mk_int(BigInt::from(1)), mk_int(BigInt::from(2))]);
        let back: Vec<BigInt> = v.list().unwrap().into_iter().map(|e| e.int().unwrap().clone()).collect();
        assert_eq!(back, vec![BigInt::from(1), BigInt::from(2)]);
    }

    #[test]
    fn round_trips_a_string() {
        let v = mk_string("hi");
        assert_eq!(v.string().unwrap(), "hi");
    }

    #[test]
    fn bool_reads_back_its_alternative() {
        assert_eq!(mk_bool(true).bool(), Some(true));
        assert_eq!(mk_bool(false).bool(), Some(false));
    }
}
