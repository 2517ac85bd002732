use gstr_lexer::{Lexer, TokenKind};
use gstr_syntax::SyntaxKind;

use crate::expr::starts_expr;
use crate::{ExprGrammar, ExprParser, Parse, ParserConfig, Parser};

/// Lex and parse `source` with the default limits.
pub fn parse(source: &str) -> Parse {
    parse_with(source, ParserConfig::default())
}

pub fn parse_with(source: &str, config: ParserConfig) -> Parse {
    let tokens = Lexer::tokenize(source);
    let mut parser = Parser::with_config(&tokens, config);
    parse_source_file(&mut parser, &ExprGrammar);
    parser.finish()
}

/// A sequence of expression statements, separated by optional `;`.
///
/// Tokens that cannot start an expression are reported once per run and
/// gathered into an `Error` node.
pub fn parse_source_file(p: &mut Parser<'_>, exprs: &dyn ExprParser) {
    let file = p.mark();

    while !p.is_at_end() {
        if p.eat(TokenKind::Semi) {
            continue;
        }

        let stmt = p.mark();
        if exprs.parse_expr(p).is_match() {
            p.eat(TokenKind::Semi);
            stmt.commit(p, SyntaxKind::ExprStmt);
            continue;
        }
        stmt.rollback(p);

        let message = match p.peek() {
            TokenKind::Error => "unexpected character".to_string(),
            kind => format!("unexpected token '{}'", kind),
        };
        let span = p.skip_until(|kind| starts_expr(kind) || kind == TokenKind::Semi);
        p.error_at(span, message);
    }

    file.commit(p, SyntaxKind::SourceFile);
}
