//! Source positions attached to tokens and AST nodes.
//!
//! Every token the lexer produces, and every error the pipeline can
//! raise, carries a [`SourceInfo`] so that diagnostics can point back
//! at `file:line:col`.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// A source position: a filename plus a 1-based line and column.
///
/// Cheaply cloned: the filename is shared behind an [`Arc`] so that
/// every token in a file does not allocate its own copy of the name.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct SourceInfo {
    pub filename: Arc<str>,
    pub line: u32,
    pub column: u32,
}

impl SourceInfo {
    pub fn new(filename: Arc<str>, line: u32, column: u32) -> Self {
        SourceInfo {
            filename,
            line,
            column,
        }
    }

    /// Advances this position past one rune, tracking newlines.
    pub fn advance(&mut self, rune: char) {
        if rune == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}

impl Display for SourceInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.line, self.column)
    }
}

/// Convenience wrapper for "no known position" in error messages.
pub fn display_opt(info: &Option<SourceInfo>) -> String {
    match info {
        Some(si) => si.to_string(),
        None => "<unknown source>".to_string(),
    }
}
