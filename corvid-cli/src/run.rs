//! `corvid run`: compiles a batch of source files and, if they compile
//! cleanly, drives the named entry point to completion against this
//! process's real stdin/stdout.
use std::path::Path;

use corvid_lang::code::{Data, Thunk};
use corvid_lang::identifier::Name;
use corvid_lang::{compile, Source, Value};

use crate::load::{load_sources, report_errors};

pub fn run(files: &[impl AsRef<Path>], entry: &str) -> i32 {
    let texts = match load_sources(files) {
        Ok(texts) => texts,
        Err(code) => return code,
    };
    let sources: Vec<Source> = texts
        .iter()
        .map(|(filename, text)| Source { filename, text })
        .collect();

    let program = match compile(&sources) {
        Ok(program) => program,
        Err(errs) => return report_errors(&errs, &texts),
    };

    let entry_name = Name::new(entry);
    let definition = match program.entry_point(&entry_name) {
        Ok(definition) => definition,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };

    let thunk = Thunk::suspended(definition.code.borrow().clone(), Data::empty());
    let entry_value = Value::from_thunk(&thunk);

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    if let Err(e) = corvid_lang::driver::run_console(entry_value, &mut stdin.lock(), &mut stdout.lock()) {
        eprintln!("runtime error: {e}");
        return 1;
    }
    0
}
