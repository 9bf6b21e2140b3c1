//! Built-in arity-N functions and the record/union constructors,
//! accessors and updaters `env.rs` declared as [`FuncImpl::Native`].
//! Grounded on `SPEC_FULL.md` §4.13; no retrieved Go source file
//! covers this (the closest, `runtime/box.go`, only exposes these
//! operations to the *driver*, not to program code — see
//! `DESIGN.md`). Every native body is a `code::Code::NativeFn`
//! closure over already-curried arguments, built once by `link` and
//! shared by every call site via `Rc`.
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use num_bigint::BigInt;

use crate::code::{Code, Thunk, Value};
use crate::identifier::Name;
use crate::reduce::force;
use crate::types::{Type, TypeDecl};
use crate::unify::can_unify;

type NativeImpl = Rc<dyn Fn(&[Rc<RefCell<Thunk>>]) -> Value>;

/// Synthesizes the runtime body for one [`FuncImpl::Native`] overload,
/// dispatching on its declared name and type. Record/union machinery
/// is tried first since those names are user-chosen and could in
/// principle collide with a prelude name. `ty` is this specific
/// overload's signature (already the one `link` picked by unification
/// before calling here), so it also disambiguates two different
/// declarations that happen to share a field/alternative/prelude name.
pub fn synthesize(names: &HashMap<Name, TypeDecl>, name: &Name, ty: &Type) -> Rc<Code> {
    if let Some(code) = synthesize_record(names, name, ty) {
        return code;
    }
    if let Some(code) = synthesize_union(names, name, ty) {
        return code;
    }
    synthesize_builtin(name, ty)
        .unwrap_or_else(|| panic!("no native implementation registered for {name}: {ty}"))
}

fn curry(arity: usize, f: NativeImpl) -> Rc<Code> {
    Rc::new(Code::NativeFn(f, arity))
}

fn synthesize_record(names: &HashMap<Name, TypeDecl>, name: &Name, ty: &Type) -> Option<Rc<Code>> {
    for (record_name, decl) in names.iter() {
        let TypeDecl::Record(record) = decl else { continue };
        let record_ty = Type::Appl(record_name.clone(), record.args.iter().cloned().map(Type::Var).collect());

        if name == record_name {
            let constructor_ty = record
                .fields
                .iter()
                .rev()
                .fold(record_ty.clone(), |acc, field| Type::func(field.ty.clone(), acc));
            if !can_unify(names, &constructor_ty, ty) {
                continue;
            }
            let arity = record.fields.len();
            let f: NativeImpl = Rc::new(move |args| Value::Record(Rc::new(args.to_vec())));
            return Some(curry(arity, f));
        }

        for (index, field) in record.fields.iter().enumerate() {
            if &field.name != name {
                continue;
            }
            let getter_ty = Type::func(record_ty.clone(), field.ty.clone());
            let setter_ty = Type::func(field.ty.clone(), Type::func(record_ty.clone(), record_ty.clone()));
            let field_index = index;

            if can_unify(names, &setter_ty, ty) {
                let f: NativeImpl = Rc::new(move |args| {
                    let Value::Record(fields) = force(&args[1]) else {
                        panic!("setter applied to a non-record value");
                    };
                    let mut updated = (*fields).clone();
                    updated[field_index] = args[0].clone();
                    Value::Record(Rc::new(updated))
                });
                return Some(curry(2, f));
            }
            if can_unify(names, &getter_ty, ty) {
                let f: NativeImpl = Rc::new(move |args| {
                    let Value::Record(fields) = force(&args[0]) else {
                        panic!("getter applied to a non-record value");
                    };
                    force(&fields[field_index])
                });
                return Some(curry(1, f));
            }
        }
    }
    None
}

fn synthesize_union(names: &HashMap<Name, TypeDecl>, name: &Name, ty: &Type) -> Option<Rc<Code>> {
    for (union_name, decl) in names.iter() {
        let TypeDecl::Union(union) = decl else { continue };
        let union_ty = Type::Appl(union_name.clone(), union.args.iter().cloned().map(Type::Var).collect());
        for (index, alt) in union.alternatives.iter().enumerate() {
            if &alt.name != name {
                continue;
            }
            let alt_ty = alt
                .fields
                .iter()
                .rev()
                .fold(union_ty.clone(), |acc, field| Type::func(field.clone(), acc));
            if !can_unify(names, &alt_ty, ty) {
                continue;
            }
            let arity = alt.fields.len();
            let tag = index;
            let f: NativeImpl = Rc::new(move |args| Value::Union(tag, Rc::new(args.to_vec())));
            return Some(curry(arity, f));
        }
    }
    None
}

fn is_int(ty: &Type) -> bool {
    matches!(ty, Type::Appl(n, a) if a.is_empty() && n.as_str() == "Int")
}
fn is_float(ty: &Type) -> bool {
    matches!(ty, Type::Appl(n, a) if a.is_empty() && n.as_str() == "Float")
}
fn is_char(ty: &Type) -> bool {
    matches!(ty, Type::Appl(n, a) if a.is_empty() && n.as_str() == "Char")
}

/// `ty` is the declared signature for this overload of `name`; it
/// disambiguates ad-hoc-overloaded arithmetic (`+` on `Int` vs. on
/// `Float`) without needing the call site's inferred type, since
/// `link` already picked this overload by unification before reaching
/// here.
fn synthesize_builtin(name: &Name, ty: &Type) -> Option<Rc<Code>> {
    let from_ty = first_arg_type(ty);

    match name.as_str() {
        "+" if from_ty.is_some_and(is_int) => Some(int_binop(|a, b| Value::Int(a + b))),
        "+" if from_ty.is_some_and(is_float) => Some(float_binop(|a, b| Value::Float(a + b))),
        "-" if from_ty.is_some_and(is_int) => Some(int_binop(|a, b| Value::Int(a - b))),
        "-" if from_ty.is_some_and(is_float) => Some(float_binop(|a, b| Value::Float(a - b))),
        "*" if from_ty.is_some_and(is_int) => Some(int_binop(|a, b| Value::Int(a * b))),
        "*" if from_ty.is_some_and(is_float) => Some(float_binop(|a, b| Value::Float(a * b))),
        "/" if from_ty.is_some_and(is_int) => Some(int_binop(|a, b| Value::Int(a / b))),
        "/" if from_ty.is_some_and(is_float) => Some(float_binop(|a, b| Value::Float(a / b))),
        "%" if from_ty.is_some_and(is_int) => Some(int_binop(|a, b| Value::Int(a % b))),
        "neg" if from_ty.is_some_and(is_int) => Some(int_unop(|a| Value::Int(-a))),
        "neg" if from_ty.is_some_and(is_float) => Some(float_unop(|a| Value::Float(-a))),

        // Comparisons return `Int` (`0`/`1`) rather than a `Bool`
        // union: the prelude is seeded before any program-defined type
        // exists, so it cannot reference a union the program might
        // never declare (see DESIGN.md).
        "==" if from_ty.is_some_and(is_int) => Some(int_cmp(|o| o == std::cmp::Ordering::Equal)),
        "/=" if from_ty.is_some_and(is_int) => Some(int_cmp(|o| o != std::cmp::Ordering::Equal)),
        "<" if from_ty.is_some_and(is_int) => Some(int_cmp(|o| o == std::cmp::Ordering::Less)),
        "<=" if from_ty.is_some_and(is_int) => Some(int_cmp(|o| o != std::cmp::Ordering::Greater)),
        ">" if from_ty.is_some_and(is_int) => Some(int_cmp(|o| o == std::cmp::Ordering::Greater)),
        ">=" if from_ty.is_some_and(is_int) => Some(int_cmp(|o| o != std::cmp::Ordering::Less)),

        "==" if from_ty.is_some_and(is_char) => {
            Some(char_cmp(|o| o == std::cmp::Ordering::Equal))
        }
        "<" if from_ty.is_some_and(is_char) => Some(char_cmp(|o| o == std::cmp::Ordering::Less)),
        ">" if from_ty.is_some_and(is_char) => {
            Some(char_cmp(|o| o == std::cmp::Ordering::Greater))
        }

        "intToFloat" => Some(curry(1, Rc::new(|args| {
            let Value::Int(i) = force(&args[0]) else { panic!("intToFloat expects Int") };
            Value::Float(bigint_to_f64(&i))
        }))),
        "floatToInt" => Some(curry(1, Rc::new(|args| {
            let Value::Float(f) = force(&args[0]) else { panic!("floatToInt expects Float") };
            Value::Int(BigInt::from(f as i64))
        }))),
        "charToInt" => Some(curry(1, Rc::new(|args| {
            let Value::Char(c) = force(&args[0]) else { panic!("charToInt expects Char") };
            Value::Int(BigInt::from(c as u32))
        }))),
        "intToChar" => Some(curry(1, Rc::new(|args| {
            let Value::Int(i) = force(&args[0]) else { panic!("intToChar expects Int") };
            let code_point: u32 = i.try_into().unwrap_or(0);
            Value::Char(char::from_u32(code_point).unwrap_or('\u{fffd}'))
        }))),

        "dump" => Some(curry(2, Rc::new(|args| {
            let value = force(&args[0]);
            eprintln!("{value:?}");
            force(&args[1])
        }))),
        "error" => Some(curry(1, Rc::new(|args| {
            let value = force(&args[0]);
            eprintln!("error: {value:?}");
            std::process::exit(1);
        }))),

        _ => None,
    }
}

fn first_arg_type(ty: &Type) -> Option<&Type> {
    match ty {
        Type::Func(from, _) => Some(from),
        _ => None,
    }
}

fn int_binop(f: impl Fn(&BigInt, &BigInt) -> Value + 'static) -> Rc<Code> {
    let imp: NativeImpl = Rc::new(move |args| {
        let (Value::Int(a), Value::Int(b)) = (force(&args[0]), force(&args[1])) else {
            panic!("expected two Int arguments")
        };
        f(&a, &b)
    });
    curry(2, imp)
}

fn int_unop(f: impl Fn(&BigInt) -> Value + 'static) -> Rc<Code> {
    let imp: NativeImpl = Rc::new(move |args| {
        let Value::Int(a) = force(&args[0]) else { panic!("expected an Int argument") };
        f(&a)
    });
    curry(1, imp)
}

fn float_binop(f: impl Fn(f64, f64) -> Value + 'static) -> Rc<Code> {
    let imp: NativeImpl = Rc::new(move |args| {
        let (Value::Float(a), Value::Float(b)) = (force(&args[0]), force(&args[1])) else {
            panic!("expected two Float arguments")
        };
        f(a, b)
    });
    curry(2, imp)
}

fn float_unop(f: impl Fn(f64) -> Value + 'static) -> Rc<Code> {
    let imp: NativeImpl = Rc::new(move |args| {
        let Value::Float(a) = force(&args[0]) else { panic!("expected a Float argument") };
        f(a)
    });
    curry(1, imp)
}

fn int_cmp(f: impl Fn(std::cmp::Ordering) -> bool + 'static) -> Rc<Code> {
    let imp: NativeImpl = Rc::new(move |args| {
        let (Value::Int(a), Value::Int(b)) = (force(&args[0]), force(&args[1])) else {
            panic!("expected two Int arguments")
        };
        Value::Int(BigInt::from(f(a.cmp(&b)) as i64))
    });
    curry(2, imp)
}

fn char_cmp(f: impl Fn(std::cmp::Ordering) -> bool + 'static) -> Rc<Code> {
    let imp: NativeImpl = Rc::new(move |args| {
        let (Value::Char(a), Value::Char(b)) = (force(&args[0]), force(&args[1])) else {
            panic!("expected two Char arguments")
        };
        Value::Int(BigInt::from(f(a.cmp(&b)) as i64))
    });
    curry(2, imp)
}

fn bigint_to_f64(i: &BigInt) -> f64 {
    use num_traits::ToPrimitive;
    i.to_f64().unwrap_or(f64::NAN)
}

/// Every name and declared signature the prelude registers, for
/// `env.rs` to fold into a fresh [`crate::env::Env`] before any user
/// declaration is added.
pub fn prelude_signatures() -> Vec<(Name, Type)> {
    let int = Type::nullary("Int");
    let float = Type::nullary("Float");
    let char_ty = Type::nullary("Char");
    let var_a = || Type::Var(Name::new("__native_a"));
    let var_b = || Type::Var(Name::new("__native_b"));

    let binop = |t: Type| Type::func(t.clone(), Type::func(t.clone(), t));
    let cmp = |t: Type| Type::func(t.clone(), Type::func(t, int.clone()));

    vec![
        (Name::new("+"), binop(int.clone())),
        (Name::new("+"), binop(float.clone())),
        (Name::new("-"), binop(int.clone())),
        (Name::new("-"), binop(float.clone())),
        (Name::new("*"), binop(int.clone())),
        (Name::new("*"), binop(float.clone())),
        (Name::new("/"), binop(int.clone())),
        (Name::new("/"), binop(float.clone())),
        (Name::new("%"), binop(int.clone())),
        (Name::new("neg"), Type::func(int.clone(), int.clone())),
        (Name::new("neg"), Type::func(float.clone(), float.clone())),
        (Name::new("=="), cmp(int.clone())),
        (Name::new("/="), cmp(int.clone())),
        (Name::new("<"), cmp(int.clone())),
        (Name::new("<="), cmp(int.clone())),
        (Name::new(">"), cmp(int.clone())),
        (Name::new(">="), cmp(int.clone())),
        (Name::new("=="), cmp(char_ty.clone())),
        (Name::new("<"), cmp(char_ty.clone())),
        (Name::new(">"), cmp(char_ty.clone())),
        (Name::new("intToFloat"), Type::func(int.clone(), float.clone())),
        (Name::new("floatToInt"), Type::func(float.clone(), int.clone())),
        (Name::new("charToInt"), Type::func(char_ty.clone(), int.clone())),
        (Name::new("intToChar"), Type::func(int.clone(), char_ty.clone())),
        (Name::new("dump"), Type::func(var_a(), Type::func(var_b(), var_b()))),
        (Name::new("error"), Type::func(var_a(), var_b())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceInfo;
    use crate::types::{Alternative, RecordDecl, RecordField, UnionDecl};

    fn info() -> SourceInfo {
        SourceInfo::new("<test>".into(), 1, 1)
    }

    fn point_names() -> HashMap<Name, TypeDecl> {
        let mut names = HashMap::new();
        names.insert(
            Name::new("Point"),
            TypeDecl::Record(RecordDecl {
                info: info(),
                args: Vec::new(),
                fields: vec![
                    RecordField { info: info(), name: Name::new("x"), ty: Type::nullary("Int") },
                    RecordField { info: info(), name: Name::new("y"), ty: Type::nullary("Int") },
                ],
            }),
        );
        names
    }

    #[test]
    fn record_constructor_builds_a_record_value() {
        let names = point_names();
        let point_ty = Type::nullary("Point");
        let ctor_ty = Type::func(Type::nullary("Int"), Type::func(Type::nullary("Int"), point_ty));
        let code = synthesize(&names, &Name::new("Point"), &ctor_ty);
        let Code::NativeFn(f, arity) = &*code else { panic!("expected NativeFn") };
        assert_eq!(*arity, 2);
        let args = vec![Thunk::ready(Value::Int(BigInt::from(1))), Thunk::ready(Value::Int(BigInt::from(2)))];
        match f(&args) {
            Value::Record(fields) => assert_eq!(fields.len(), 2),
            other => panic!("expected Record, got {other:?}"),
        }
    }

    #[test]
    fn record_getter_and_setter_are_disambiguated_by_type() {
        let names = point_names();
        let point_ty = Type::nullary("Point");
        let getter_ty = Type::func(point_ty.clone(), Type::nullary("Int"));
        let setter_ty = Type::func(Type::nullary("Int"), Type::func(point_ty.clone(), point_ty));

        let getter = synthesize(&names, &Name::new("x"), &getter_ty);
        let record = Value::Record(Rc::new(vec![
            Thunk::ready(Value::Int(BigInt::from(10))),
            Thunk::ready(Value::Int(BigInt::from(20))),
        ]));
        let Code::NativeFn(f, arity) = &*getter else { panic!("expected NativeFn") };
        assert_eq!(*arity, 1);
        match f(&[Thunk::ready(record.clone())]) {
            Value::Int(i) => assert_eq!(i, BigInt::from(10)),
            other => panic!("expected Int, got {other:?}"),
        }

        let setter = synthesize(&names, &Name::new("x"), &setter_ty);
        let Code::NativeFn(f, arity) = &*setter else { panic!("expected NativeFn") };
        assert_eq!(*arity, 2);
        match f(&[Thunk::ready(Value::Int(BigInt::from(99))), Thunk::ready(record)]) {
            Value::Record(fields) => match force(&fields[0]) {
                Value::Int(i) => assert_eq!(i, BigInt::from(99)),
                other => panic!("expected Int, got {other:?}"),
            },
            other => panic!("expected Record, got {other:?}"),
        }
    }

    #[test]
    fn union_alternative_constructor_tags_its_value() {
        let mut names = HashMap::new();
        names.insert(
            Name::new("Bool2"),
            TypeDecl::Union(UnionDecl {
                info: info(),
                args: Vec::new(),
                alternatives: vec![
                    Alternative { info: info(), name: Name::new("False2"), fields: Vec::new() },
                    Alternative { info: info(), name: Name::new("True2"), fields: Vec::new() },
                ],
            }),
        );
        let union_ty = Type::nullary("Bool2");
        let code = synthesize(&names, &Name::new("True2"), &union_ty);
        let Code::NativeFn(f, arity) = &*code else { panic!("expected NativeFn") };
        assert_eq!(*arity, 0);
        match f(&[]) {
            Value::Union(tag, fields) => {
                assert_eq!(tag, 1);
                assert!(fields.is_empty());
            }
            other => panic!("expected Union, got {other:?}"),
        }
    }

    #[test]
    fn builtin_int_addition_adds_its_forced_arguments() {
        let ty = Type::func(Type::nullary("Int"), Type::func(Type::nullary("Int"), Type::nullary("Int")));
        let code = synthesize(&HashMap::new(), &Name::new("+"), &ty);
        let Code::NativeFn(f, arity) = &*code else { panic!("expected NativeFn") };
        assert_eq!(*arity, 2);
        let args = vec![Thunk::ready(Value::Int(BigInt::from(3))), Thunk::ready(Value::Int(BigInt::from(4)))];
        match f(&args) {
            Value::Int(i) => assert_eq!(i, BigInt::from(7)),
            other => panic!("expected Int, got {other:?}"),
        }
    }

    #[test]
    fn prelude_signatures_cover_every_overloaded_arithmetic_name() {
        let sigs = prelude_signatures();
        let plus_count = sigs.iter().filter(|(n, _)| n.as_str() == "+").count();
        assert_eq!(plus_count, 2, "+ should be registered for both Int and Float");
    }
}
