//! Syntax tree for parsed source: node kinds, the concrete tree, and typed
//! views over interpolated string literals.

pub mod ast;
mod kind;
mod tree;

pub use ast::{GString, Injection, SourceFile, StringPart, TextPart};
pub use kind::SyntaxKind;
pub use tree::{SyntaxElement, SyntaxNode};

pub use gstr_lexer::{Span, SpannedToken, TokenKind};
