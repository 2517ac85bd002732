//! Typed views over [`SyntaxNode`]s.

use gstr_lexer::{unescape, EscapeError, Span, SpannedToken, TokenKind};

use crate::{SyntaxKind, SyntaxNode};

/// An interpolated string literal.
#[derive(Debug, Clone, Copy)]
pub struct GString<'a>(&'a SyntaxNode);

/// One piece of an interpolated string, in source order.
#[derive(Debug, Clone, Copy)]
pub enum StringPart<'a> {
    Text(TextPart),
    Injection(Injection<'a>),
}

/// A run of literal text, escapes still encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPart(SpannedToken);

/// An embedded expression: `${ expr }` or `$name.path`.
#[derive(Debug, Clone, Copy)]
pub struct Injection<'a>(&'a SyntaxNode);

impl<'a> GString<'a> {
    pub fn cast(node: &'a SyntaxNode) -> Option<Self> {
        (node.kind() == SyntaxKind::GString).then_some(Self(node))
    }

    pub fn syntax(&self) -> &'a SyntaxNode {
        self.0
    }

    /// Text runs and injections. Delimiters and error nodes are skipped.
    pub fn parts(&self) -> impl Iterator<Item = StringPart<'a>> {
        self.0.children().iter().filter_map(|child| {
            if let Some(token) = child.as_token() {
                return (token.kind == TokenKind::GStringContent)
                    .then_some(StringPart::Text(TextPart(*token)));
            }
            child.as_node().and_then(Injection::cast).map(StringPart::Injection)
        })
    }

    pub fn injections(&self) -> impl Iterator<Item = Injection<'a>> {
        self.parts().filter_map(|part| match part {
            StringPart::Injection(injection) => Some(injection),
            StringPart::Text(_) => None,
        })
    }

    /// `"""` rather than `"`.
    pub fn is_multiline(&self) -> bool {
        self.0
            .first_token_of(TokenKind::GStringBegin)
            .is_some_and(|t| t.span.len() == 3)
    }

    pub fn is_terminated(&self) -> bool {
        self.0.first_token_of(TokenKind::GStringEnd).is_some()
    }

    pub fn has_errors(&self) -> bool {
        self.0.first_child_of(SyntaxKind::Error).is_some()
    }
}

impl TextPart {
    pub fn span(&self) -> Span {
        self.0.span
    }

    pub fn raw<'s>(&self, source: &'s str) -> &'s str {
        self.0.text(source)
    }

    /// The text with escapes decoded.
    pub fn value(&self, source: &str) -> Result<String, EscapeError> {
        unescape(self.raw(source))
    }
}

impl<'a> Injection<'a> {
    pub fn cast(node: &'a SyntaxNode) -> Option<Self> {
        (node.kind() == SyntaxKind::StringInjection).then_some(Self(node))
    }

    pub fn syntax(&self) -> &'a SyntaxNode {
        self.0
    }

    /// The embedded expression.
    pub fn expr(&self) -> Option<&'a SyntaxNode> {
        self.0.child_nodes().find(|n| n.kind().is_expr())
    }

    /// `$name.path` rather than `${ ... }`.
    pub fn is_short_form(&self) -> bool {
        self.0.first_token_of(TokenKind::Dollar).is_some()
    }
}

impl<'a> StringPart<'a> {
    pub fn span(&self) -> Span {
        match self {
            StringPart::Text(text) => text.span(),
            StringPart::Injection(injection) => injection.syntax().span(),
        }
    }
}

/// The root of a parsed input.
#[derive(Debug, Clone, Copy)]
pub struct SourceFile<'a>(&'a SyntaxNode);

impl<'a> SourceFile<'a> {
    pub fn cast(node: &'a SyntaxNode) -> Option<Self> {
        (node.kind() == SyntaxKind::SourceFile).then_some(Self(node))
    }

    pub fn syntax(&self) -> &'a SyntaxNode {
        self.0
    }

    /// The expression of each statement.
    pub fn expressions(&self) -> impl Iterator<Item = &'a SyntaxNode> {
        self.0
            .child_nodes()
            .filter(|n| n.kind() == SyntaxKind::ExprStmt)
            .filter_map(|stmt| stmt.child_nodes().find(|n| n.kind().is_expr()))
    }

    /// Every interpolated string in the file, outermost first.
    pub fn gstrings(&self) -> Vec<GString<'a>> {
        self.0.descendants().into_iter().filter_map(GString::cast).collect()
    }
}
