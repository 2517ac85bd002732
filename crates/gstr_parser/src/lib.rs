//! Recursive-descent parser for expressions containing interpolated string
//! literals.
//!
//! Grammar functions drive a [`Parser`], which records nodes through
//! [`Marker`]s and collects recoverable [`SyntaxError`]s. [`parse`] runs the
//! whole pipeline over a source string.

mod config;
mod event;
pub mod expr;
pub mod gstring;
mod parser;
mod source;

use gstr_lexer::Span;
use gstr_syntax::{SourceFile, SyntaxKind, SyntaxNode};

pub use config::{DEFAULT_MAX_EXPRESSION_DEPTH, DEFAULT_MAX_INTERPOLATION_DEPTH, ParserConfig};
pub use expr::{ExprGrammar, ExprParser};
pub use gstring::{parse_gstring, parse_value_part};
pub use parser::{CompletedMarker, Marker, Parser};
pub use source::{parse, parse_source_file, parse_with};

/// Outcome of a grammar function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseResult {
    /// A node was committed.
    Matched(CompletedMarker),
    /// Nothing starts here. The cursor and tree are unchanged.
    NoMatch,
}

impl ParseResult {
    pub fn is_match(&self) -> bool {
        matches!(self, ParseResult::Matched(_))
    }

    pub fn is_no_match(&self) -> bool {
        matches!(self, ParseResult::NoMatch)
    }

    /// Kind of the committed node.
    pub fn kind(&self) -> Option<SyntaxKind> {
        self.completed().map(|m| m.kind())
    }

    pub fn completed(self) -> Option<CompletedMarker> {
        match self {
            ParseResult::Matched(m) => Some(m),
            ParseResult::NoMatch => None,
        }
    }
}

/// A recoverable problem found while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub span: Span,
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}..{}", self.message, self.span.start, self.span.end)
    }
}

impl std::error::Error for SyntaxError {}

/// A finished parse: the tree and every diagnostic reported on the way.
#[derive(Debug, Clone)]
pub struct Parse {
    pub root: SyntaxNode,
    pub errors: Vec<SyntaxError>,
}

impl Parse {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn source_file(&self) -> Option<SourceFile<'_>> {
        SourceFile::cast(&self.root)
    }

    pub fn debug_dump(&self, source: &str) -> String {
        self.root.debug_dump(source)
    }
}
