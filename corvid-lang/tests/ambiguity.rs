use corvid_lang::compile;
use corvid_lang::{ErrorKind, Source};

// Two overloads of `f` whose signatures do not unify with each other
// (`Int` and `Char` never match), so both are accepted as distinct
// declarations. `ambiguousUse`'s own declared type is a single bare
// type variable, which specializes to either overload's type, so both
// survive filtering and the reference is genuinely ambiguous.
const SOURCE: &str = "func f : a -> Int = \\x 1\nfunc f : b -> Char = \\x 'c'\nfunc ambiguousUse : c = f";

#[test]
fn reference_to_an_overloaded_name_with_no_narrowing_annotation_is_ambiguous() {
    let sources = [Source { filename: "t.cv", text: SOURCE }];
    let errs = compile(&sources).expect_err("an unresolved overload should fail to compile");
    let ambiguous = errs
        .iter()
        .find(|e| matches!(e.kind, ErrorKind::Ambiguous { .. }))
        .unwrap_or_else(|| panic!("expected an Ambiguous error, got {errs:?}"));
    let ErrorKind::Ambiguous { candidates, .. } = &ambiguous.kind else { unreachable!() };
    assert_eq!(candidates.len(), 2);
}

#[test]
fn an_inline_ascription_narrows_an_overload_to_one_result() {
    // same two overloads of `f`, but the use site pins down the result
    // type directly, so filtering admits exactly one of them.
    let text = "func f : a -> Int = \\x 1\nfunc f : b -> Char = \\x 'c'\nfunc main : Int = (f : Int -> Int) 0";
    let sources = [Source { filename: "t.cv", text }];
    compile(&sources).unwrap_or_else(|errs| {
        panic!("expected the ascription to resolve the overload, got: {}", errs.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))
    });
}
