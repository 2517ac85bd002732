use std::fmt::Write;

use gstr_lexer::{Span, SpannedToken, TokenKind};

use crate::SyntaxKind;

/// A child of a syntax node: either a nested node or a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxElement {
    Node(SyntaxNode),
    Token(SpannedToken),
}

impl SyntaxElement {
    pub fn span(&self) -> Span {
        match self {
            SyntaxElement::Node(node) => node.span,
            SyntaxElement::Token(token) => token.span,
        }
    }

    pub fn as_node(&self) -> Option<&SyntaxNode> {
        match self {
            SyntaxElement::Node(node) => Some(node),
            SyntaxElement::Token(_) => None,
        }
    }

    pub fn as_token(&self) -> Option<&SpannedToken> {
        match self {
            SyntaxElement::Token(token) => Some(token),
            SyntaxElement::Node(_) => None,
        }
    }
}

/// A node of the concrete syntax tree.
///
/// Nodes own their children. Token text is not stored; slice it out of the
/// source with [`SpannedToken::text`] or [`SyntaxNode::text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    kind: SyntaxKind,
    span: Span,
    children: Vec<SyntaxElement>,
}

impl SyntaxNode {
    /// Build a node. The span covers the children, or is empty at `offset`
    /// when there are none.
    pub fn new(kind: SyntaxKind, offset: usize, children: Vec<SyntaxElement>) -> Self {
        let span = children
            .iter()
            .map(SyntaxElement::span)
            .reduce(Span::cover)
            .unwrap_or(Span::at(offset));
        Self { kind, span, children }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn children(&self) -> &[SyntaxElement] {
        &self.children
    }

    pub fn child_nodes(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.children.iter().filter_map(SyntaxElement::as_node)
    }

    pub fn child_tokens(&self) -> impl Iterator<Item = &SpannedToken> {
        self.children.iter().filter_map(SyntaxElement::as_token)
    }

    pub fn first_child_of(&self, kind: SyntaxKind) -> Option<&SyntaxNode> {
        self.child_nodes().find(|n| n.kind == kind)
    }

    pub fn first_token_of(&self, kind: TokenKind) -> Option<&SpannedToken> {
        self.child_tokens().find(|t| t.kind == kind)
    }

    /// All nodes of this subtree in preorder, `self` first.
    pub fn descendants(&self) -> Vec<&SyntaxNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            let children: Vec<_> = node.child_nodes().collect();
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// Source text covered by this node.
    pub fn text<'src>(&self, source: &'src str) -> &'src str {
        &source[self.span.range()]
    }

    /// Indented tree dump, one element per line.
    ///
    /// ```text
    /// GString@0..8
    ///   GStringBegin@0..1 "\""
    ///   GStringContent@1..2 "a"
    /// ```
    pub fn debug_dump(&self, source: &str) -> String {
        let mut out = String::new();
        // (node, depth, index of the next child to print)
        let mut stack = vec![(self, 0usize, 0usize)];
        while let Some((node, depth, next)) = stack.pop() {
            let indent = "  ".repeat(depth);
            if next == 0 {
                let _ = writeln!(out, "{}{:?}@{}..{}", indent, node.kind, node.span.start, node.span.end);
            }
            for (i, child) in node.children.iter().enumerate().skip(next) {
                match child {
                    SyntaxElement::Token(token) => {
                        let _ = writeln!(
                            out,
                            "{}  {:?}@{}..{} {:?}",
                            indent,
                            token.kind,
                            token.span.start,
                            token.span.end,
                            token.text(source)
                        );
                    }
                    SyntaxElement::Node(child) => {
                        stack.push((node, depth, i + 1));
                        stack.push((child, depth + 1, 0));
                        break;
                    }
                }
            }
        }
        out
    }
}

impl Drop for SyntaxNode {
    // Unlink subtrees onto a heap stack so long left-nested chains do not
    // recurse once per level.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(child) = pending.pop() {
            if let SyntaxElement::Node(mut node) = child {
                pending.append(&mut node.children);
            }
        }
    }
}
