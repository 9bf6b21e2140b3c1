use corvid_lang::code::{Data, Thunk};
use corvid_lang::identifier::Name;
use corvid_lang::{compile, Source, Value};

fn run_int(text: &str) -> num_bigint::BigInt {
    let sources = [Source { filename: "t.cv", text }];
    let program = compile(&sources).unwrap_or_else(|errs| {
        panic!("unexpected compile errors: {}", errs.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))
    });
    let entry = program.entry_point(&Name::new("main")).unwrap();
    let thunk = Thunk::suspended(entry.code.borrow().clone(), Data::empty());
    Value::from_thunk(&thunk).int().expect("expected an Int result").clone()
}

#[test]
fn overloaded_plus_picks_the_int_overload() {
    assert_eq!(run_int("func main : Int = 2 + 3"), num_bigint::BigInt::from(5));
}

#[test]
fn arithmetic_respects_ordinary_precedence_free_application() {
    // no precedence table: every operator is just another function,
    // so parentheses control grouping explicitly.
    assert_eq!(run_int("func main : Int = (2 + 3) * 4"), num_bigint::BigInt::from(20));
}

#[test]
fn helper_function_is_applied_with_an_argument() {
    let text = "func double : Int -> Int = \\x x * 2\nfunc main : Int = double 21";
    assert_eq!(run_int(text), num_bigint::BigInt::from(42));
}

#[test]
fn float_overload_of_plus_is_picked_independently_of_int() {
    let sources = [Source { filename: "t.cv", text: "func main : Float = 1.5 + 2.5" }];
    let program = compile(&sources).unwrap();
    let entry = program.entry_point(&Name::new("main")).unwrap();
    let thunk = Thunk::suspended(entry.code.borrow().clone(), Data::empty());
    assert_eq!(Value::from_thunk(&thunk).float(), Some(4.0));
}
