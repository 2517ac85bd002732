//! Expression grammar used inside string injections and at the top level.

use gstr_lexer::TokenKind;
use gstr_syntax::SyntaxKind;

use crate::gstring::parse_gstring;
use crate::{CompletedMarker, ParseResult, Parser};

/// Recognises one expression at the cursor.
///
/// Implementations follow the same protocol as the rest of the grammar:
/// `Matched` after committing a node, `NoMatch` with nothing consumed.
pub trait ExprParser {
    fn parse_expr(&self, p: &mut Parser<'_>) -> ParseResult;
}

/// The built-in expression grammar (Pratt parser).
///
/// Literals, names, interpolated strings, parenthesised expressions and
/// lists; calls, field access (`.` and `?.`) and indexing; prefix `-` and
/// `!`; binary operators, the conditional `? :`, elvis `?:` and assignment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExprGrammar;

impl ExprParser for ExprGrammar {
    fn parse_expr(&self, p: &mut Parser<'_>) -> ParseResult {
        self.guarded(p, |p| self.parse_assignment(p))
    }
}

/// Whether an expression can start with `kind`.
pub fn starts_expr(kind: TokenKind) -> bool {
    kind.is_literal()
        || kind.is_keyword()
        || matches!(
            kind,
            TokenKind::Ident
                | TokenKind::GStringBegin
                | TokenKind::LParen
                | TokenKind::LBracket
                | TokenKind::Minus
                | TokenKind::Not
        )
}

fn is_postfix(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::LParen | TokenKind::Dot | TokenKind::SafeDot | TokenKind::LBracket
    )
}

fn binop_precedence(kind: TokenKind) -> Option<u8> {
    match kind {
        TokenKind::OrOr => Some(1),
        TokenKind::AndAnd => Some(2),
        TokenKind::EqEq | TokenKind::NotEq => Some(3),
        TokenKind::Lt | TokenKind::Gt | TokenKind::LtEq | TokenKind::GtEq => Some(4),
        TokenKind::Plus | TokenKind::Minus => Some(5),
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Some(6),
        _ => None,
    }
}

impl ExprGrammar {
    /// Run `f` one level deeper. Once the depth limit is reached the next
    /// operand (prefix operators and one token group) is skipped into an
    /// `Error` node instead.
    fn guarded(
        &self,
        p: &mut Parser<'_>,
        f: impl FnOnce(&mut Parser<'_>) -> ParseResult,
    ) -> ParseResult {
        if p.expr_depth() < p.config().max_expression_depth {
            return p.nested_expr(f);
        }
        if !starts_expr(p.peek()) {
            return ParseResult::NoMatch;
        }

        let start = p.peek_span();
        let m = p.mark();
        while p.at_any(&[TokenKind::Minus, TokenKind::Not]) {
            p.bump();
        }
        if starts_expr(p.peek()) {
            p.bump_group();
        }
        p.error_at(start.cover(p.prev_span()), "expression nested too deeply");
        ParseResult::Matched(m.commit(p, SyntaxKind::Error))
    }

    /// How many more left-nested links (`a.b.c`, `a + b + c`) fit below the
    /// depth limit at the current level.
    fn chain_room(&self, p: &Parser<'_>) -> usize {
        p.config()
            .max_expression_depth
            .saturating_sub(p.expr_depth())
            .max(1)
    }

    /// Past the depth limit the rest of a chain is kept flat: `left` and
    /// the remaining links go into one `Error` node.
    fn flatten_rest(
        &self,
        p: &mut Parser<'_>,
        left: CompletedMarker,
        mut bump_link: impl FnMut(&mut Parser<'_>) -> bool,
    ) -> CompletedMarker {
        let start = p.peek_span();
        let m = left.precede(p);
        while bump_link(p) {}
        p.error_at(start.cover(p.prev_span()), "expression nested too deeply");
        m.commit(p, SyntaxKind::Error)
    }

    /// Report a missing operand.
    fn operand(&self, p: &mut Parser<'_>, result: ParseResult) {
        if result.is_no_match() {
            p.error("expression expected");
        }
    }

    fn parse_assignment(&self, p: &mut Parser<'_>) -> ParseResult {
        let ParseResult::Matched(lhs) = self.parse_conditional(p) else {
            return ParseResult::NoMatch;
        };

        if !p.at(TokenKind::Eq) {
            return ParseResult::Matched(lhs);
        }
        let m = lhs.precede(p);
        p.bump();
        let rhs = self.guarded(p, |p| self.parse_assignment(p));
        self.operand(p, rhs);
        ParseResult::Matched(m.commit(p, SyntaxKind::AssignExpr))
    }

    fn parse_conditional(&self, p: &mut Parser<'_>) -> ParseResult {
        let ParseResult::Matched(cond) = self.parse_binary(p, 0) else {
            return ParseResult::NoMatch;
        };

        match p.peek() {
            TokenKind::Question => {
                let m = cond.precede(p);
                p.bump();
                let then = self.parse_expr(p);
                self.operand(p, then);
                if p.expect(TokenKind::Colon, "':' expected") {
                    let otherwise = self.guarded(p, |p| self.parse_conditional(p));
                    self.operand(p, otherwise);
                }
                ParseResult::Matched(m.commit(p, SyntaxKind::TernaryExpr))
            }
            TokenKind::Elvis => {
                let m = cond.precede(p);
                p.bump();
                let fallback = self.guarded(p, |p| self.parse_conditional(p));
                self.operand(p, fallback);
                ParseResult::Matched(m.commit(p, SyntaxKind::ElvisExpr))
            }
            _ => ParseResult::Matched(cond),
        }
    }

    fn parse_binary(&self, p: &mut Parser<'_>, min_prec: u8) -> ParseResult {
        let ParseResult::Matched(mut left) = self.parse_unary(p) else {
            return ParseResult::NoMatch;
        };

        let room = self.chain_room(p);
        let mut links = 0;
        while let Some(prec) = binop_precedence(p.peek()) {
            if prec < min_prec {
                break;
            }
            if links == room {
                left = self.flatten_rest(p, left, |p| match binop_precedence(p.peek()) {
                    Some(prec) if prec >= min_prec => {
                        p.bump();
                        let right = self.parse_binary(p, prec + 1);
                        self.operand(p, right);
                        true
                    }
                    _ => false,
                });
                break;
            }
            links += 1;

            let m = left.precede(p);
            p.bump(); // consume operator
            let right = self.parse_binary(p, prec + 1);
            self.operand(p, right);
            left = m.commit(p, SyntaxKind::BinaryExpr);
        }

        ParseResult::Matched(left)
    }

    fn parse_unary(&self, p: &mut Parser<'_>) -> ParseResult {
        if p.at_any(&[TokenKind::Minus, TokenKind::Not]) {
            let m = p.mark();
            p.bump();
            let operand = self.guarded(p, |p| self.parse_unary(p));
            self.operand(p, operand);
            return ParseResult::Matched(m.commit(p, SyntaxKind::PrefixExpr));
        }

        match self.parse_primary(p) {
            ParseResult::Matched(expr) => ParseResult::Matched(self.parse_postfix(p, expr)),
            ParseResult::NoMatch => ParseResult::NoMatch,
        }
    }

    fn parse_postfix(&self, p: &mut Parser<'_>, mut expr: CompletedMarker) -> CompletedMarker {
        let room = self.chain_room(p);
        for _ in 0..room {
            match p.peek() {
                TokenKind::LParen => {
                    // Function call
                    let m = expr.precede(p);
                    self.parse_arg_list(p);
                    expr = m.commit(p, SyntaxKind::CallExpr);
                }
                TokenKind::Dot | TokenKind::SafeDot => {
                    let m = expr.precede(p);
                    p.bump();
                    p.expect(TokenKind::Ident, "identifier expected");
                    expr = m.commit(p, SyntaxKind::FieldExpr);
                }
                TokenKind::LBracket => {
                    let m = expr.precede(p);
                    p.bump();
                    let index = self.parse_expr(p);
                    self.operand(p, index);
                    p.expect(TokenKind::RBracket, "']' expected");
                    expr = m.commit(p, SyntaxKind::IndexExpr);
                }
                _ => return expr,
            }
        }

        if !is_postfix(p.peek()) {
            return expr;
        }
        self.flatten_rest(p, expr, |p| match p.peek() {
            TokenKind::Dot | TokenKind::SafeDot => {
                p.bump();
                p.eat(TokenKind::Ident);
                true
            }
            kind if is_postfix(kind) => {
                p.bump_group();
                true
            }
            _ => false,
        })
    }

    fn parse_arg_list(&self, p: &mut Parser<'_>) {
        let m = p.mark();
        p.bump();
        self.parse_comma_list(p, TokenKind::RParen);
        p.expect(TokenKind::RParen, "')' expected");
        m.commit(p, SyntaxKind::ArgList);
    }

    /// Comma-separated expressions up to `close`, which is left in place.
    fn parse_comma_list(&self, p: &mut Parser<'_>, close: TokenKind) {
        while !p.at(close) && !p.is_at_end() {
            if self.parse_expr(p).is_no_match() {
                p.error("expression expected");
                break;
            }
            if !p.eat(TokenKind::Comma) {
                break;
            }
        }
    }

    fn parse_primary(&self, p: &mut Parser<'_>) -> ParseResult {
        match p.peek() {
            kind if kind.is_literal() || kind.is_keyword() => {
                let m = p.mark();
                p.bump();
                ParseResult::Matched(m.commit(p, SyntaxKind::Literal))
            }
            TokenKind::Ident => {
                let m = p.mark();
                p.bump();
                ParseResult::Matched(m.commit(p, SyntaxKind::NameRef))
            }
            TokenKind::GStringBegin => parse_gstring(p, self),
            TokenKind::LParen => {
                let m = p.mark();
                p.bump();
                let inner = self.parse_expr(p);
                self.operand(p, inner);
                p.expect(TokenKind::RParen, "')' expected");
                ParseResult::Matched(m.commit(p, SyntaxKind::ParenExpr))
            }
            TokenKind::LBracket => {
                let m = p.mark();
                p.bump();
                self.parse_comma_list(p, TokenKind::RBracket);
                p.expect(TokenKind::RBracket, "']' expected");
                ParseResult::Matched(m.commit(p, SyntaxKind::ListExpr))
            }
            _ => ParseResult::NoMatch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gstr_lexer::Lexer;

    fn dump(source: &str) -> String {
        let tokens = Lexer::tokenize(source);
        let mut p = Parser::new(&tokens);
        let result = ExprGrammar.parse_expr(&mut p);
        assert!(result.is_match(), "no expression in {:?}", source);
        let parse = p.finish();
        assert!(parse.errors.is_empty(), "{:?}", parse.errors);
        parse.debug_dump(source)
    }

    #[test]
    fn test_precedence() {
        assert_eq!(
            dump("a + b * c"),
            "SourceFile@0..9
  BinaryExpr@0..9
    NameRef@0..1
      Ident@0..1 \"a\"
    Plus@2..3 \"+\"
    BinaryExpr@4..9
      NameRef@4..5
        Ident@4..5 \"b\"
      Star@6..7 \"*\"
      NameRef@8..9
        Ident@8..9 \"c\"
"
        );
    }

    #[test]
    fn test_binary_is_left_associative() {
        let out = dump("a - b - c");
        assert!(out.starts_with("SourceFile@0..9\n  BinaryExpr@0..9\n    BinaryExpr@0..5\n"));
    }

    #[test]
    fn test_not_an_expression() {
        let tokens = Lexer::tokenize(") x");
        let mut p = Parser::new(&tokens);
        assert!(ExprGrammar.parse_expr(&mut p).is_no_match());
        assert_eq!(p.position(), 0);
    }

    #[test]
    fn test_starts_expr() {
        assert!(starts_expr(TokenKind::GStringBegin));
        assert!(starts_expr(TokenKind::StringLiteral));
        assert!(starts_expr(TokenKind::Null));
        assert!(!starts_expr(TokenKind::RBrace));
        assert!(!starts_expr(TokenKind::DollarBrace));
    }
}
