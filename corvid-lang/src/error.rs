//! The error taxonomy for every compile-time failure in the pipeline.
//!
//! `spec.md` §7 enumerates five kinds of error: lexical/syntactic,
//! declaration, type inference, compile-time linking, and runtime.
//! The first four are represented here as [`ErrorKind`] variants,
//! batched by the phase that raises them (spec.md §6.4's "multi-error
//! returns are slices, preserving order of discovery"). Runtime errors
//! (a native function applied to a value of the wrong shape, which
//! type inference should have ruled out already) are fatal and raised
//! as an ordinary Rust panic rather than through this type.
use std::fmt::{self, Display, Formatter};

use crate::identifier::Name;
use crate::source::{display_opt, SourceInfo};
use crate::types::Type;

/// One compiler error: an optional source position plus a typed
/// reason. `spec.md` §6.4's wire format is exactly `{source_info, msg}`;
/// [`Display`] renders that text, and [`Error::render`] additionally
/// produces an `annotate-snippets` block when source text is on hand.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    pub info: Option<SourceInfo>,
    pub kind: ErrorKind,
}

impl Error {
    pub fn new(info: Option<SourceInfo>, kind: ErrorKind) -> Self {
        Error { info, kind }
    }

    pub fn at(info: SourceInfo, kind: ErrorKind) -> Self {
        Error::new(Some(info), kind)
    }

    pub fn without_source(kind: ErrorKind) -> Self {
        Error::new(None, kind)
    }

    /// Renders this error as an annotated source snippet when the
    /// originating file's text is supplied; falls back to the plain
    /// `file:line:col: message` line otherwise. Used by `corvid-cli`,
    /// matching the teacher's `annotate-snippets` + `colored` pairing.
    pub fn render(&self, source: Option<&str>) -> String {
        use annotate_snippets::{Level, Renderer, Snippet};

        let message = self.kind.to_string();
        let Some(info) = &self.info else {
            return format!("error: {message}");
        };
        let Some(source) = source else {
            return format!("{info}: error: {message}");
        };

        let line_start = line_byte_offset(source, info.line);
        let line_end = source[line_start..]
            .find('\n')
            .map(|i| line_start + i)
            .unwrap_or(source.len());
        let col = (info.column.saturating_sub(1)) as usize;
        let ann_start = (line_start + col).min(line_end);
        let ann_end = (ann_start + 1).min(line_end.max(ann_start));

        let snippet = Snippet::source(&source[line_start..line_end])
            .line_start(info.line as usize)
            .origin(info.filename.as_ref())
            .fold(true)
            .annotation(
                Level::Error
                    .span((ann_start - line_start)..(ann_end - line_start))
                    .label(&message),
            );
        let message = Level::Error.title(&message).snippet(snippet);
        let rendered = Renderer::styled().render(message).to_string();
        rendered
    }
}

fn line_byte_offset(source: &str, line: u32) -> usize {
    let mut current = 1u32;
    if line <= 1 {
        return 0;
    }
    for (i, c) in source.char_indices() {
        if c == '\n' {
            current += 1;
            if current == line {
                return i + 1;
            }
        }
    }
    source.len()
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", display_opt(&self.info), self.kind)
    }
}

impl std::error::Error for Error {}

/// The reason a phase rejected the program. Grouped to mirror
/// spec.md §7's four compile-time kinds (lexical/syntactic,
/// declaration, type inference, linking).
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    // --- Lexical / syntactic (spec.md §4.1, §4.2) ---
    UnterminatedChar,
    UnterminatedString,
    InvalidEscape(char),
    NoMatchingOpenParen,
    NoMatchingCloseParen,
    EmptyParens,
    NothingToBind,
    NothingAfterBinding,
    NotASimpleIdentifier,
    UnexpectedToken(String),
    ExpectedSwitchCase,
    MissingFunctionBody,
    MissingFunctionType,

    // --- Declaration (spec.md §4.4, §9 cyclic alias) ---
    DuplicateTypeName { name: Name, previous: Option<SourceInfo> },
    UnknownTypeName(Name),
    ArityMismatch { name: Name, expected: usize, found: usize },
    UnboundTypeVariable(Name),
    DuplicateField { name: Name, previous: SourceInfo },
    DuplicateAlternative { name: Name, previous: SourceInfo },
    DuplicateTypeArgument(Name),
    DuplicateSignature { name: Name, previous: Option<SourceInfo> },
    CyclicAlias(Vec<Name>),
    NotATypeConstructor(Name),

    // --- Type inference (spec.md §4.5, §4.6) ---
    NotBound(Name),
    CannotApply { left: Type, right: Type },
    NoMatch { inferred: Type, annotation: Type },
    Ambiguous { candidates: Vec<Type>, witness: Option<SourceInfo> },
    CannotSwitch(CannotSwitchReason),

    // --- Compile-time linking (spec.md §4.10) ---
    NoDefinitionFor(Name),
    MultipleDefinitionsOf(Name),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CannotSwitchReason {
    NoMatchingUnion,
    WrongCaseCountOrOrder,
    CaseBodyMismatch { case: Name, expected: Type, found: Type },
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::UnterminatedChar => write!(f, "unterminated character literal"),
            ErrorKind::UnterminatedString => write!(f, "unterminated string literal"),
            ErrorKind::InvalidEscape(c) => write!(f, "invalid escape sequence: \\{c}"),
            ErrorKind::NoMatchingOpenParen => write!(f, "no matching opening parenthesis"),
            ErrorKind::NoMatchingCloseParen => write!(f, "no matching closing parenthesis"),
            ErrorKind::EmptyParens => write!(f, "nothing inside parentheses"),
            ErrorKind::NothingToBind => write!(f, "nothing to bind"),
            ErrorKind::NothingAfterBinding => write!(f, "nothing after lambda binding"),
            ErrorKind::NotASimpleIdentifier => write!(f, "expected a simple identifier"),
            ErrorKind::UnexpectedToken(t) => write!(f, "unexpected token: {t}"),
            ErrorKind::ExpectedSwitchCase => write!(f, "expected a `case` after `switch`"),
            ErrorKind::MissingFunctionBody => write!(f, "function definition is missing a body"),
            ErrorKind::MissingFunctionType => write!(f, "function definition is missing a type"),
            ErrorKind::DuplicateTypeName { name, previous } => write!(
                f,
                "type name `{name}` already defined: {}",
                display_opt(previous)
            ),
            ErrorKind::UnknownTypeName(name) => write!(f, "type name does not exist: {name}"),
            ErrorKind::ArityMismatch { name, expected, found } => write!(
                f,
                "type `{name}` requires {expected} argument(s), {found} given"
            ),
            ErrorKind::UnboundTypeVariable(name) => {
                write!(f, "type variable not bound: {name}")
            }
            ErrorKind::DuplicateField { name, previous } => write!(
                f,
                "another record field has the same name: {name} (first defined at {previous})"
            ),
            ErrorKind::DuplicateAlternative { name, previous } => write!(
                f,
                "another union alternative has the same name: {name} (first defined at {previous})"
            ),
            ErrorKind::DuplicateTypeArgument(name) => {
                write!(f, "duplicate type argument: {name}")
            }
            ErrorKind::DuplicateSignature { name, previous } => write!(
                f,
                "function `{name}` with colliding signature exists: {}",
                display_opt(previous)
            ),
            ErrorKind::CyclicAlias(chain) => {
                let names = chain
                    .iter()
                    .map(Name::to_string)
                    .collect::<Vec<_>>()
                    .join(" -> ");
                write!(f, "cyclic type alias: {names}")
            }
            ErrorKind::NotATypeConstructor(name) => {
                write!(f, "not a type constructor: {name}")
            }
            ErrorKind::NotBound(name) => write!(f, "variable not bound: {name}"),
            ErrorKind::CannotApply { left, right } => {
                write!(f, "cannot apply ({left}) to ({right})")
            }
            ErrorKind::NoMatch { inferred, annotation } => write!(
                f,
                "inferred type ({inferred}) does not match annotation ({annotation})"
            ),
            ErrorKind::Ambiguous { candidates, witness } => {
                let types = candidates
                    .iter()
                    .map(Type::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                match witness {
                    Some(w) => write!(f, "ambiguous expression, admits multiple types: {types} (first differs at {w})"),
                    None => write!(f, "ambiguous expression, admits multiple types: {types}"),
                }
            }
            ErrorKind::CannotSwitch(reason) => write!(f, "{reason}"),
            ErrorKind::NoDefinitionFor(name) => write!(f, "no {name} function"),
            ErrorKind::MultipleDefinitionsOf(name) => write!(f, "multiple {name} functions"),
        }
    }
}

impl Display for CannotSwitchReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CannotSwitchReason::NoMatchingUnion => {
                write!(f, "no union's alternatives match the switch's cases")
            }
            CannotSwitchReason::WrongCaseCountOrOrder => {
                write!(f, "switch cases do not match the union's alternatives in count or order")
            }
            CannotSwitchReason::CaseBodyMismatch { case, expected, found } => write!(
                f,
                "case `{case}` has type ({found}), expected ({expected})"
            ),
        }
    }
}

/// Appends `err` to `errs` and returns `()`, used to batch errors the
/// way `spec.md` §7's "propagation policy" requires: "every phase
/// batches errors where natural ... so the user can see multiple
/// issues in one run."
pub fn push(errs: &mut Vec<Error>, err: Error) {
    errs.push(err);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_position() {
        let info = SourceInfo::new("foo.cv".into(), 3, 7);
        let err = Error::at(info, ErrorKind::NotBound(Name::new("x")));
        assert_eq!(err.to_string(), "foo.cv:3:7: variable not bound: x");
    }

    #[test]
    fn display_without_position() {
        let err = Error::without_source(ErrorKind::NoDefinitionFor(Name::new("main")));
        assert_eq!(err.to_string(), "<unknown source>: no main function");
    }
}
