//! `corvid check`: runs the same front end as `corvid run` but stops
//! after compiling, reporting every diagnostic without executing
//! anything. Useful for editor integrations and CI, per `SPEC_FULL.md`
//! §6.5's non-goal of a full language server: a batch check is all
//! this crate offers.
use std::path::Path;

use corvid_lang::compile;
use corvid_lang::Source;

use crate::load::{load_sources, report_errors};

pub fn check(files: &[impl AsRef<Path>]) -> i32 {
    let texts = match load_sources(files) {
        Ok(texts) => texts,
        Err(code) => return code,
    };
    let sources: Vec<Source> = texts
        .iter()
        .map(|(filename, text)| Source { filename, text })
        .collect();

    match compile(&sources) {
        Ok(_) => {
            println!("ok");
            0
        }
        Err(errs) => report_errors(&errs, &texts),
    }
}
