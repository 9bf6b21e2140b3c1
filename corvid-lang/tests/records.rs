use corvid_lang::code::{Data, Thunk};
use corvid_lang::identifier::Name;
use corvid_lang::{compile, Source, Value};

fn run(text: &str) -> Value {
    let sources = [Source { filename: "t.cv", text }];
    let program = compile(&sources).unwrap_or_else(|errs| {
        panic!("unexpected compile errors: {}", errs.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))
    });
    let entry = program.entry_point(&Name::new("main")).unwrap();
    let thunk = Thunk::suspended(entry.code.borrow().clone(), Data::empty());
    Value::from_thunk(&thunk)
}

#[test]
fn field_getter_reads_back_a_constructed_record() {
    let text = "record Pair a b = fst: a, snd: b\nfunc main : Char = snd (Pair 1 'x')";
    assert_eq!(run(text).char(), Some('x'));
}

#[test]
fn second_field_getter_is_disambiguated_from_the_first() {
    let text = "record Pair a b = fst: a, snd: b\nfunc main : Int = fst (Pair 7 'x')";
    assert_eq!(run(text).int().cloned(), Some(num_bigint::BigInt::from(7)));
}

#[test]
fn field_setter_overload_is_picked_by_its_argument_types() {
    // `fst` is overloaded three ways (constructor's first arg aside):
    // a getter `Pair a b -> a` and a setter `a -> Pair a b -> Pair a b`.
    // `fst 9 (Pair 1 'x')` can only match the setter by argument shape.
    let text = "record Pair a b = fst: a, snd: b\n\
                func main : Int = fst (fst 9 (Pair 1 'x'))";
    assert_eq!(run(text).int().cloned(), Some(num_bigint::BigInt::from(9)));
}
