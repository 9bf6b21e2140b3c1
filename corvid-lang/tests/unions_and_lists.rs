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
fn switch_picks_the_case_named_after_the_matching_alternative() {
    let text = "union Shape = Circle Int | Square Int\n\
                func area : Shape -> Int = \\s switch s case Circle (\\r r * r) case Square (\\w w * w)\n\
                func main : Int = area (Circle 5)";
    assert_eq!(run(text).int().cloned(), Some(num_bigint::BigInt::from(25)));
}

#[test]
fn switch_dispatches_to_the_other_case_for_the_other_alternative() {
    let text = "union Shape = Circle Int | Square Int\n\
                func area : Shape -> Int = \\s switch s case Circle (\\r r * r) case Square (\\w w * w)\n\
                func main : Int = area (Square 4)";
    assert_eq!(run(text).int().cloned(), Some(num_bigint::BigInt::from(16)));
}

#[test]
fn list_literal_desugars_to_the_prelude_cons_and_empty() {
    let text = "func main : List Int = [1, 2, 3]";
    let got: Vec<num_bigint::BigInt> = run(text).list().expect("expected a list").into_iter().map(|v| v.int().unwrap().clone()).collect();
    assert_eq!(got, vec![num_bigint::BigInt::from(1), num_bigint::BigInt::from(2), num_bigint::BigInt::from(3)]);
}

#[test]
fn string_literal_desugars_to_a_list_of_chars() {
    let text = "func main : List Char = \"hi\"";
    assert_eq!(run(text).string(), Some("hi".to_string()));
}
