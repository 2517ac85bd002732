use gstr_lexer::{Span, SpannedToken, TokenKind};
use gstr_syntax::{SyntaxElement, SyntaxKind, SyntaxNode};

use crate::event::{build_tree, Event};
use crate::{Parse, ParserConfig, SyntaxError};

/// Token cursor and tree builder shared by all grammar functions.
///
/// Grammar code reads tokens with [`peek`](Parser::peek) and
/// [`bump`](Parser::bump), brackets the nodes it recognises with
/// [`mark`](Parser::mark) / [`Marker::commit`], and backs out of failed
/// attempts with [`Marker::rollback`]. Recoverable problems are reported with
/// [`error`](Parser::error) and never abort the parse.
pub struct Parser<'t> {
    tokens: &'t [SpannedToken],
    pos: usize,
    events: Vec<Event>,
    errors: Vec<SyntaxError>,
    config: ParserConfig,
    open_markers: usize,
    string_depth: usize,
    expr_depth: usize,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [SpannedToken]) -> Self {
        Self::with_config(tokens, ParserConfig::default())
    }

    pub fn with_config(tokens: &'t [SpannedToken], config: ParserConfig) -> Self {
        Self {
            tokens,
            pos: 0,
            events: Vec::new(),
            errors: Vec::new(),
            config,
            open_markers: 0,
            string_depth: 0,
            expr_depth: 0,
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    // === Token Access ===

    /// Index of the current token.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The current token. Past the end of the stream this is a synthetic
    /// `Eof` at the end of the last token.
    pub fn current(&self) -> SpannedToken {
        self.nth_token(0)
    }

    fn nth_token(&self, n: usize) -> SpannedToken {
        match self.tokens.get(self.pos + n) {
            Some(token) => *token,
            None => {
                let end = self.tokens.last().map_or(0, |t| t.span.end);
                SpannedToken::new(TokenKind::Eof, Span::at(end))
            }
        }
    }

    pub fn peek(&self) -> TokenKind {
        self.current().kind
    }

    /// Kind of the token `n` positions ahead of the cursor.
    pub fn nth(&self, n: usize) -> TokenKind {
        self.nth_token(n).kind
    }

    pub fn peek_span(&self) -> Span {
        self.current().span
    }

    /// Span of the last consumed token, or an empty span at the cursor.
    pub fn prev_span(&self) -> Span {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => token.span,
            None => Span::at(self.peek_span().start),
        }
    }

    pub fn at(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    pub fn at_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.peek())
    }

    pub fn is_at_end(&self) -> bool {
        self.at(TokenKind::Eof)
    }

    /// Consume the current token into the node being built. Does nothing at
    /// the end of the stream.
    pub fn bump(&mut self) {
        if self.is_at_end() {
            return;
        }
        self.events.push(Event::Token(self.current()));
        self.pos += 1;
    }

    /// Consume the current token if it is `kind`.
    pub fn eat(&mut self, kind: TokenKind) -> bool {
        if !self.at(kind) {
            return false;
        }
        self.bump();
        true
    }

    /// Consume `kind`, or report `message` at the current token.
    pub fn expect(&mut self, kind: TokenKind, message: &str) -> bool {
        if self.eat(kind) {
            return true;
        }
        self.error(message);
        false
    }

    // === Tree Building ===

    /// Open a node at the current position.
    pub fn mark(&mut self) -> Marker {
        let start = self.events.len();
        self.events.push(Event::Start { kind: None, forward_parent: None });
        self.open_markers += 1;
        Marker {
            start,
            rollback_to: start,
            pos: self.pos,
            errors: self.errors.len(),
        }
    }

    /// Report a recoverable error at the current token.
    pub fn error(&mut self, message: impl Into<String>) {
        let span = self.peek_span();
        self.error_at(span, message);
    }

    pub fn error_at(&mut self, span: Span, message: impl Into<String>) {
        self.errors.push(SyntaxError {
            message: message.into(),
            span,
        });
    }

    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    /// Wrap tokens in an `Error` node: the current token, then everything up
    /// to the next token satisfying `stop`. Brackets, injections and string
    /// literals are skipped as a whole, so `stop` is only tested outside
    /// them. Returns the span of the consumed tokens.
    pub fn skip_until(&mut self, stop: impl Fn(TokenKind) -> bool) -> Span {
        let start = self.peek_span();
        if self.is_at_end() {
            return Span::at(start.start);
        }

        let m = self.mark();
        loop {
            self.bump_group();
            if self.is_at_end() || stop(self.peek()) {
                break;
            }
        }
        m.commit(self, SyntaxKind::Error);
        start.cover(self.prev_span())
    }

    /// Consume one token, or a whole bracketed group or string literal.
    pub fn bump_group(&mut self) {
        match self.peek() {
            TokenKind::GStringBegin => self.bump_gstring(),
            kind if is_opener(kind) => self.bump_bracketed(),
            _ => self.bump(),
        }
    }

    fn bump_bracketed(&mut self) {
        let mut depth = 0usize;
        while !self.is_at_end() {
            let kind = self.peek();
            if is_opener(kind) {
                depth += 1;
            } else if is_closer(kind) {
                depth = depth.saturating_sub(1);
            }
            self.bump();
            if depth == 0 {
                break;
            }
        }
    }

    fn bump_gstring(&mut self) {
        self.bump();
        self.bump_string_body();
        self.eat(TokenKind::GStringEnd);
    }

    /// A literal may lack its end token, so its extent is taken from the
    /// token kinds the lexer produces inside one.
    fn bump_string_body(&mut self) {
        loop {
            match self.peek() {
                TokenKind::GStringContent => self.bump(),
                TokenKind::DollarBrace => self.bump_bracketed(),
                TokenKind::Dollar => {
                    self.bump();
                    self.eat(TokenKind::Ident);
                    while self.at(TokenKind::Dot) && self.nth(1) == TokenKind::Ident {
                        self.bump();
                        self.bump();
                    }
                }
                _ => break,
            }
        }
    }

    /// Wrap the text and injections up to the end of the current string
    /// literal in an `Error` node. The end delimiter is left in place.
    /// Returns `None` when there was nothing to skip.
    pub fn skip_string_body(&mut self) -> Option<Span> {
        let start = self.peek_span();
        let m = self.mark();
        self.bump_string_body();
        if self.position() == m.pos {
            m.rollback(self);
            return None;
        }
        m.commit(self, SyntaxKind::Error);
        Some(start.cover(self.prev_span()))
    }

    // === Recursion Limits ===

    /// How many interpolated strings enclose the cursor.
    pub fn string_depth(&self) -> usize {
        self.string_depth
    }

    pub fn expr_depth(&self) -> usize {
        self.expr_depth
    }

    /// Run `f` one interpolated-string level deeper.
    pub fn nested_string<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.string_depth += 1;
        let result = f(self);
        self.string_depth -= 1;
        result
    }

    /// Run `f` one expression level deeper.
    pub fn nested_expr<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.expr_depth += 1;
        let result = f(self);
        self.expr_depth -= 1;
        result
    }

    /// Assemble the tree. Top-level elements are gathered under a
    /// `SourceFile` root unless they already form one.
    pub fn finish(self) -> Parse {
        debug_assert_eq!(self.open_markers, 0, "parse finished with open markers");

        let offset = self.tokens.first().map_or(0, |t| t.span.start);
        let mut top = build_tree(self.events).into_iter();
        let root = match (top.next(), top.len()) {
            (Some(SyntaxElement::Node(node)), 0) if node.kind() == SyntaxKind::SourceFile => node,
            (first, _) => {
                let children = first.into_iter().chain(top).collect();
                SyntaxNode::new(SyntaxKind::SourceFile, offset, children)
            }
        };

        Parse {
            root,
            errors: self.errors,
        }
    }
}

fn is_opener(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::LParen
            | TokenKind::LBracket
            | TokenKind::LBrace
            | TokenKind::DollarBrace
    )
}

fn is_closer(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::RParen
            | TokenKind::RBracket
            | TokenKind::RBrace
            | TokenKind::InjectionEnd
    )
}

/// An open node. Close it exactly once, with [`commit`](Marker::commit) or
/// [`rollback`](Marker::rollback).
#[must_use = "a marker must be committed or rolled back"]
#[derive(Debug)]
pub struct Marker {
    start: usize,
    /// First event to discard on rollback. Differs from `start` for markers
    /// created by `precede`, whose rollback also removes the wrapped node.
    rollback_to: usize,
    pos: usize,
    errors: usize,
}

impl Marker {
    /// Close the node as `kind`.
    pub fn commit(self, p: &mut Parser<'_>, kind: SyntaxKind) -> CompletedMarker {
        match &mut p.events[self.start] {
            Event::Start { kind: slot, .. } => *slot = Some(kind),
            _ => unreachable!("marker does not point at a start event"),
        }
        p.events.push(Event::Finish);
        p.open_markers -= 1;
        CompletedMarker {
            start: self.start,
            rollback_to: self.rollback_to,
            pos: self.pos,
            errors: self.errors,
            kind,
        }
    }

    /// Discard the node and everything recorded since it was opened,
    /// including diagnostics, and move the cursor back to where it was.
    pub fn rollback(self, p: &mut Parser<'_>) {
        p.events.truncate(self.rollback_to);
        p.errors.truncate(self.errors);
        p.pos = self.pos;
        p.open_markers -= 1;
    }
}

/// A committed node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedMarker {
    start: usize,
    rollback_to: usize,
    pos: usize,
    errors: usize,
    kind: SyntaxKind,
}

impl CompletedMarker {
    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    /// Open a new node that will contain this one as its first child.
    pub fn precede(self, p: &mut Parser<'_>) -> Marker {
        let Marker { start, .. } = p.mark();
        match &mut p.events[self.start] {
            Event::Start { forward_parent, .. } => *forward_parent = Some(start - self.start),
            _ => unreachable!("completed marker does not point at a start event"),
        }
        Marker {
            start,
            rollback_to: self.rollback_to,
            pos: self.pos,
            errors: self.errors,
        }
    }
}
