//! Diagnostic messages used in the gammac compiler.
//!
//! These can be converted to [`Diagnostic`]s in order to present them to the user.
//!
//! [`Diagnostic`]: codespan_reporting::diagnostic::Diagnostic

use codespan_reporting::diagnostic::{Diagnostic, Label};
use itertools::Itertools;
use std::fmt;

use crate::files::FileId;
use crate::source::{FileRange, Position};
use crate::surface::lexer::TokenKind;

/// Global diagnostic messages
#[derive(Debug, Clone)]
pub enum Message {
    Lexer(LexerMessage),
    Parse(ParseMessage),
    Codegen(CodegenMessage),
}

impl From<LexerMessage> for Message {
    fn from(message: LexerMessage) -> Self {
        Message::Lexer(message)
    }
}

impl From<ParseMessage> for Message {
    fn from(message: ParseMessage) -> Self {
        Message::Parse(message)
    }
}

impl From<CodegenMessage> for Message {
    fn from(message: CodegenMessage) -> Self {
        Message::Codegen(message)
    }
}

impl Message {
    pub fn to_diagnostic(&self) -> Diagnostic<FileId> {
        match self {
            Message::Lexer(message) => message.to_diagnostic(),
            Message::Parse(message) => message.to_diagnostic(),
            Message::Codegen(message) => message.to_diagnostic(),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Lexer(message) => message.fmt(f),
            Message::Parse(message) => message.fmt(f),
            Message::Codegen(message) => message.fmt(f),
        }
    }
}

impl std::error::Error for Message {}

fn primary_label(range: &FileRange) -> Label<FileId> {
    Label::primary(range.file_id(), *range)
}

fn secondary_label(range: &FileRange) -> Label<FileId> {
    Label::secondary(range.file_id(), *range)
}

/// Messages produced during lexing
#[derive(Debug, Clone)]
pub enum LexerMessage {
    UnexpectedChar {
        range: FileRange,
        position: Position,
        found: char,
    },
    UnterminatedString {
        range: FileRange,
        position: Position,
    },
}

impl LexerMessage {
    pub fn to_diagnostic(&self) -> Diagnostic<FileId> {
        match self {
            LexerMessage::UnexpectedChar { range, found, .. } => Diagnostic::error()
                .with_message(format!("unexpected character `{}`", found.escape_debug()))
                .with_labels(vec![primary_label(range).with_message("unexpected character")])
                .with_notes(vec![
                    "names may only contain ASCII letters".to_owned()
                ]),
            LexerMessage::UnterminatedString { range, .. } => Diagnostic::error()
                .with_message("unterminated string literal")
                .with_labels(vec![
                    primary_label(range).with_message("missing closing `\"`")
                ]),
        }
    }
}

impl fmt::Display for LexerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexerMessage::UnexpectedChar {
                position, found, ..
            } => write!(f, "{position}: unexpected character `{}`", found.escape_debug()),
            LexerMessage::UnterminatedString { position, .. } => {
                write!(f, "{position}: unterminated string literal")
            }
        }
    }
}

impl std::error::Error for LexerMessage {}

/// Messages produced during parsing
#[derive(Debug, Clone)]
pub enum ParseMessage {
    UnexpectedToken {
        range: FileRange,
        position: Position,
        expected: TokenKind,
        /// Description of the token that was found instead.
        found: String,
    },
    ExpectedTypeDeclaration {
        range: FileRange,
        position: Position,
        found: String,
    },
    UnknownDeclarationKeyword {
        range: FileRange,
        position: Position,
        keyword: String,
        suggestion: Option<&'static str>,
    },
}

impl ParseMessage {
    pub fn to_diagnostic(&self) -> Diagnostic<FileId> {
        match self {
            ParseMessage::UnexpectedToken {
                range,
                expected,
                found,
                ..
            } => Diagnostic::error()
                .with_message(format!("unexpected {found}"))
                .with_labels(vec![primary_label(range).with_message("unexpected token")])
                .with_notes(vec![format!("expected {expected}")]),
            ParseMessage::ExpectedTypeDeclaration { range, found, .. } => Diagnostic::error()
                .with_message(format!("expected a type declaration, found {found}"))
                .with_labels(vec![
                    primary_label(range).with_message("expected a type declaration")
                ])
                .with_notes(vec![format!(
                    "declarations start with {}",
                    format_alternatives(&["`enum`", "`union`", "`struct`"]),
                )]),
            ParseMessage::UnknownDeclarationKeyword {
                range,
                keyword,
                suggestion,
                ..
            } => Diagnostic::error()
                .with_message(format!("unknown declaration keyword `{keyword}`"))
                .with_labels(vec![primary_label(range).with_message("unknown keyword")])
                .with_notes(suggestion_notes(*suggestion)),
        }
    }
}

impl fmt::Display for ParseMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseMessage::UnexpectedToken {
                position,
                expected,
                found,
                ..
            } => write!(f, "{position}: expected {expected}, found {found}"),
            ParseMessage::ExpectedTypeDeclaration {
                position, found, ..
            } => write!(f, "{position}: expected a type declaration, found {found}"),
            ParseMessage::UnknownDeclarationKeyword {
                position, keyword, ..
            } => write!(f, "{position}: unknown declaration keyword `{keyword}`"),
        }
    }
}

impl std::error::Error for ParseMessage {}

/// Ways in which a display format string can be malformed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// A `{` was never closed.
    UnclosedInterpolation,
    /// A `}` appeared outside of an interpolation.
    UnopenedInterpolation,
    /// A `{` appeared inside an interpolation.
    NestedInterpolation,
    /// There are more interpolations than the field has arguments.
    TooManyInterpolations { arguments: usize },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::UnclosedInterpolation => f.write_str("unclosed `{` in format"),
            FormatError::UnopenedInterpolation => f.write_str("unmatched `}` in format"),
            FormatError::NestedInterpolation => f.write_str("nested `{` in format"),
            FormatError::TooManyInterpolations { arguments: 1 } => {
                f.write_str("more interpolations than the 1 argument of the field")
            }
            FormatError::TooManyInterpolations { arguments } => {
                write!(f, "more interpolations than the {arguments} arguments of the field")
            }
        }
    }
}

/// Messages produced during code generation
#[derive(Debug, Clone)]
pub enum CodegenMessage {
    InvalidTrait {
        range: FileRange,
        position: Position,
        trait_name: String,
        /// The kind of declaration, eg. `enum`.
        decl_kind: &'static str,
        decl_name: String,
        decl_range: FileRange,
        valid_traits: &'static [&'static str],
        suggestion: Option<&'static str>,
    },
    DuplicateTrait {
        range: FileRange,
        position: Position,
        first_range: FileRange,
        trait_name: String,
    },
    InvalidFormat {
        range: FileRange,
        position: Position,
        field_name: String,
        error: FormatError,
    },
}

impl CodegenMessage {
    pub fn to_diagnostic(&self) -> Diagnostic<FileId> {
        match self {
            CodegenMessage::InvalidTrait {
                range,
                trait_name,
                decl_kind,
                decl_name,
                decl_range,
                valid_traits,
                suggestion,
                ..
            } => {
                let valid_traits = valid_traits.iter().map(|name| format!("`{name}`"));
                let mut notes = vec![format!(
                    "{decl_kind} declarations support {}",
                    format_alternatives(&valid_traits.collect::<Vec<_>>()),
                )];
                notes.extend(suggestion_notes(*suggestion));

                Diagnostic::error()
                    .with_message(format!("invalid trait `{trait_name}`"))
                    .with_labels(vec![
                        primary_label(range).with_message("unknown trait"),
                        secondary_label(decl_range)
                            .with_message(format!("in {decl_kind} `{decl_name}`")),
                    ])
                    .with_notes(notes)
            }
            CodegenMessage::DuplicateTrait {
                range,
                first_range,
                trait_name,
                ..
            } => Diagnostic::error()
                .with_message(format!("trait `{trait_name}` is listed more than once"))
                .with_labels(vec![
                    primary_label(range).with_message("duplicate trait"),
                    secondary_label(first_range).with_message("first listed here"),
                ]),
            CodegenMessage::InvalidFormat {
                range,
                field_name,
                error,
                ..
            } => Diagnostic::error()
                .with_message(format!("invalid display format for field `{field_name}`"))
                .with_labels(vec![primary_label(range).with_message(error.to_string())])
                .with_notes(vec![
                    "each `{...}` in a format is replaced by the next argument of the field"
                        .to_owned(),
                ]),
        }
    }
}

impl fmt::Display for CodegenMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodegenMessage::InvalidTrait {
                position,
                trait_name,
                ..
            } => write!(f, "{position}: invalid trait `{trait_name}`"),
            CodegenMessage::DuplicateTrait {
                position,
                trait_name,
                ..
            } => write!(f, "{position}: trait `{trait_name}` is listed more than once"),
            CodegenMessage::InvalidFormat {
                position,
                field_name,
                error,
                ..
            } => write!(f, "{position}: invalid display format for field `{field_name}`: {error}"),
        }
    }
}

impl std::error::Error for CodegenMessage {}

/// Find the candidate closest to `name` by edit distance, if any is close
/// enough to be worth suggesting.
pub fn closest_name(name: &str, candidates: &[&'static str]) -> Option<&'static str> {
    candidates
        .iter()
        .map(|candidate| (levenshtein::levenshtein(name, candidate), *candidate))
        .filter(|(distance, candidate)| *distance <= candidate.len().max(name.len()) / 2)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate)
}

fn suggestion_notes(suggestion: Option<&'static str>) -> Vec<String> {
    suggestion.map_or(Vec::new(), |name| vec![format!("help: did you mean `{name}`?")])
}

fn format_alternatives(items: &[impl fmt::Display]) -> String {
    match items.split_last() {
        None => String::new(),
        Some((last, [])) => last.to_string(),
        Some((last, items)) => format!("{} or {}", items.iter().format(", "), last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closest_names() {
        assert_eq!(closest_name("enmu", &["enum", "union", "struct"]), Some("enum"));
        assert_eq!(closest_name("Ot", &["In", "Out"]), Some("Out"));
        assert_eq!(closest_name("Bogus", &["In", "Out"]), None);
        assert_eq!(closest_name("Eq", &[]), None);
    }

    #[test]
    fn alternatives() {
        assert_eq!(format_alternatives(&["`In`"]), "`In`");
        assert_eq!(format_alternatives(&["`In`", "`Out`"]), "`In` or `Out`");
        assert_eq!(format_alternatives(&["a", "b", "c"]), "a, b or c");
    }

    #[test]
    fn format_errors_read_naturally() {
        let error = FormatError::TooManyInterpolations { arguments: 1 };
        assert_eq!(
            error.to_string(),
            "more interpolations than the 1 argument of the field"
        );
        let error = FormatError::TooManyInterpolations { arguments: 0 };
        assert_eq!(
            error.to_string(),
            "more interpolations than the 0 arguments of the field"
        );
    }
}
