use corvid_lang::compile;
use corvid_lang::{ErrorKind, Source};

#[test]
fn unbound_name_is_reported_with_its_source_position() {
    let sources = [Source { filename: "t.cv", text: "func main : Int = doesNotExist" }];
    let errs = compile(&sources).expect_err("an unbound name should fail to compile");
    assert_eq!(errs.len(), 1);
    assert!(matches!(&errs[0].kind, ErrorKind::NotBound(name) if name.to_string() == "doesNotExist"));
    assert!(errs[0].info.is_some());
}

#[test]
fn duplicate_type_names_across_two_files_both_land_in_one_batch() {
    // declaration errors accumulate across every source file before
    // the batch is returned, rather than stopping at the first file
    // that has a problem.
    let sources = [
        Source { filename: "a.cv", text: "record Pair a b = fst: a, snd: b\nrecord Pair a b = fst: a, snd: b" },
        Source { filename: "b.cv", text: "union Shape = Circle Int\nunion Shape = Square Int" },
    ];
    let errs = compile(&sources).expect_err("both files should contribute errors");
    let duplicates: Vec<_> = errs.iter().filter(|e| matches!(e.kind, ErrorKind::DuplicateTypeName { .. })).collect();
    assert_eq!(duplicates.len(), 2, "expected one duplicate error from each file, got {errs:?}");
}
