//! Shared file-loading and diagnostic-rendering glue for `run` and
//! `check`: both read the same files into memory up front (so error
//! rendering has the original text on hand) and report errors the
//! same way.
use std::path::Path;

use corvid_lang::Error;

/// Reads every file into memory, pairing each with the filename string
/// `corvid-lang` uses in its source-position diagnostics. Returns exit
/// code 1 and prints to stderr on the first unreadable file.
pub fn load_sources(files: &[impl AsRef<Path>]) -> Result<Vec<(String, String)>, i32> {
    let mut texts = Vec::with_capacity(files.len());
    for file in files {
        let path = file.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => texts.push((path.display().to_string(), text)),
            Err(e) => {
                eprintln!("{}: {e}", path.display());
                return Err(1);
            }
        }
    }
    Ok(texts)
}

/// Renders every error against the source file it was raised in, then
/// returns the exit code `corvid`'s `main` should use.
pub fn report_errors(errs: &[Error], texts: &[(String, String)]) -> i32 {
    for err in errs {
        let source = err
            .info
            .as_ref()
            .and_then(|info| texts.iter().find(|(name, _)| name.as_str() == info.filename.as_ref()))
            .map(|(_, text)| text.as_str());
        eprintln!("{}", err.render(source));
    }
    1
}
