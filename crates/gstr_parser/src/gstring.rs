//! Interpolated string literals.
//!
//! The lexer splits a literal into a begin delimiter, runs of text, injected
//! expressions (`${ expr }` or `$name.path`) and an end delimiter:
//!
//! ```text
//! "Hello ${name}!"   GStringBegin GStringContent DollarBrace Ident InjectionEnd GStringContent GStringEnd
//! ```
//!
//! [`parse_gstring`] turns that sequence into a `GString` node whose children
//! are the text tokens and one `StringInjection` node per injection.

use gstr_lexer::{Span, TokenKind};
use gstr_syntax::SyntaxKind;

use crate::{ExprParser, ParseResult, Parser};

/// Parse an interpolated string literal starting at the cursor.
///
/// Returns `NoMatch`, with nothing consumed, unless the cursor is at a
/// `GStringBegin`. Once the opening delimiter is consumed a `GString` node is
/// always committed and problems inside the literal are reported as
/// diagnostics.
///
/// A malformed injection ends the literal early: it is reported, and the
/// injection and everything after it are left for the caller to recover
/// from.
pub fn parse_gstring(p: &mut Parser<'_>, exprs: &dyn ExprParser) -> ParseResult {
    let m = p.mark();
    if !p.eat(TokenKind::GStringBegin) {
        m.rollback(p);
        return ParseResult::NoMatch;
    }

    if p.string_depth() >= p.config().max_interpolation_depth {
        p.error_at(p.prev_span(), "string interpolation nested too deeply");
        p.skip_string_body();
        if !p.eat(TokenKind::GStringEnd) {
            p.error_at(Span::at(p.prev_span().end), "string end expected");
        }
        return ParseResult::Matched(m.commit(p, SyntaxKind::GString));
    }

    p.nested_string(|p| parse_parts(p, exprs));
    ParseResult::Matched(m.commit(p, SyntaxKind::GString))
}

fn parse_parts(p: &mut Parser<'_>, exprs: &dyn ExprParser) {
    p.eat(TokenKind::GStringContent);

    while p.at_any(&[TokenKind::DollarBrace, TokenKind::Dollar]) {
        let start = p.peek_span();
        if parse_value_part(p, exprs).is_no_match() {
            p.error_at(start, "expression expected in string injection");
            return;
        }
        p.eat(TokenKind::GStringContent);
    }

    if !p.eat(TokenKind::GStringEnd) {
        p.error_at(Span::at(p.prev_span().end), "string end expected");
    }
}

/// Parse one injection: `${ expr }` or the short form `$name.path`.
///
/// The expression itself is recognised by `exprs`. Returns `NoMatch`, with
/// nothing consumed, when the cursor is not at an injection or no expression
/// follows its opening token.
pub fn parse_value_part(p: &mut Parser<'_>, exprs: &dyn ExprParser) -> ParseResult {
    match p.peek() {
        TokenKind::DollarBrace => parse_braced_injection(p, exprs),
        TokenKind::Dollar => parse_short_injection(p, exprs),
        _ => ParseResult::NoMatch,
    }
}

fn parse_braced_injection(p: &mut Parser<'_>, exprs: &dyn ExprParser) -> ParseResult {
    let m = p.mark();
    p.bump();

    if exprs.parse_expr(p).is_no_match() {
        m.rollback(p);
        return ParseResult::NoMatch;
    }

    if !p.at(TokenKind::InjectionEnd) && !p.is_at_end() {
        let span = p.skip_until(|kind| kind == TokenKind::InjectionEnd);
        p.error_at(span, "unexpected tokens in string injection");
    }
    p.expect(TokenKind::InjectionEnd, "'}' expected");

    ParseResult::Matched(m.commit(p, SyntaxKind::StringInjection))
}

// The lexer only produces an identifier and `.identifier` pairs after `$`.
fn parse_short_injection(p: &mut Parser<'_>, exprs: &dyn ExprParser) -> ParseResult {
    let m = p.mark();
    p.bump();

    if exprs.parse_expr(p).is_no_match() {
        m.rollback(p);
        return ParseResult::NoMatch;
    }

    ParseResult::Matched(m.commit(p, SyntaxKind::StringInjection))
}
