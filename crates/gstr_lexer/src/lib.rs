use logos::Logos;

pub mod escape;
mod token;

pub use escape::{unescape, unquote, EscapeError};
pub use token::TokenKind;

/// Span in source code (byte offsets)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Empty span at `offset`.
    pub fn at(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Smallest span covering both `self` and `other`.
    pub fn cover(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// A token with its span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpannedToken {
    pub kind: TokenKind,
    pub span: Span,
}

impl SpannedToken {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// The raw source text of this token.
    pub fn text<'src>(&self, source: &'src str) -> &'src str {
        &source[self.span.range()]
    }
}

/// What the lexer is currently scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Ordinary code.
    Code,
    /// Inside a `"` or `"""` literal.
    GString { triple: bool },
    /// Inside `${ ... }`. Code tokens, with nested braces counted.
    Injection { brace_depth: u32 },
    /// Inside a `$name.path` reference.
    ShortRef { expect_ident: bool },
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Modal lexer producing [`SpannedToken`]s.
///
/// Code is tokenized with the `logos` derived [`TokenKind`] lexer. String
/// literals switch to hand-written scanning that splits the literal into
/// begin / content / injection / end tokens. Modes nest on a stack, so an
/// injection may itself contain further string literals.
///
/// The lexer never fails: unrecognised input becomes [`TokenKind::Error`]
/// and an unterminated literal simply has no [`TokenKind::GStringEnd`].
pub struct Lexer<'src> {
    source: &'src str,
    pos: usize,
    modes: Vec<Mode>,
    finished: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            modes: vec![Mode::Code],
            finished: false,
        }
    }

    /// Tokenize the entire source into a Vec, terminated by `Eof`.
    pub fn tokenize(source: &str) -> Vec<SpannedToken> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();

        loop {
            let spanned = lexer.next_token();
            let is_eof = spanned.kind == TokenKind::Eof;
            tokens.push(spanned);
            if is_eof {
                break;
            }
        }

        tokens
    }

    pub fn next_token(&mut self) -> SpannedToken {
        if self.finished {
            let len = self.source.len();
            return SpannedToken::new(TokenKind::Eof, Span::at(len));
        }

        match self.mode() {
            Mode::Code | Mode::Injection { .. } => self.lex_code(),
            Mode::GString { triple } => self.lex_gstring(triple),
            Mode::ShortRef { expect_ident } => self.lex_short_ref(expect_ident),
        }
    }

    fn mode(&self) -> Mode {
        self.modes.last().copied().unwrap_or(Mode::Code)
    }

    fn set_mode(&mut self, mode: Mode) {
        if let Some(top) = self.modes.last_mut() {
            *top = mode;
        }
    }

    /// Pop the current mode, never the bottom `Code` mode.
    fn leave_mode(&mut self) {
        if self.modes.len() > 1 {
            self.modes.pop();
        }
    }

    fn rest(&self) -> &'src str {
        &self.source[self.pos..]
    }

    fn emit(&mut self, kind: TokenKind, len: usize) -> SpannedToken {
        let span = Span::new(self.pos, self.pos + len);
        self.pos = span.end;
        SpannedToken::new(kind, span)
    }

    // === Code ===

    fn lex_code(&mut self) -> SpannedToken {
        let offset = self.pos;
        let mut inner = TokenKind::lexer(self.rest());

        let Some(result) = inner.next() else {
            self.pos = self.source.len();
            self.finished = true;
            return SpannedToken::new(TokenKind::Eof, Span::at(self.pos));
        };

        let range = inner.span();
        let mut span = Span::new(offset + range.start, offset + range.end);
        if span.end <= offset {
            // Always make progress, even on an empty error match.
            let width = self.rest().chars().next().map_or(1, char::len_utf8);
            span = Span::new(offset, offset + width);
        }
        self.pos = span.end;

        let kind = match result {
            Ok(kind) => kind,
            Err(()) => TokenKind::Error,
        };

        let kind = match (kind, self.mode()) {
            (TokenKind::GStringBegin, _) => {
                self.modes.push(Mode::GString { triple: span.len() == 3 });
                kind
            }
            (TokenKind::LBrace, Mode::Injection { brace_depth }) => {
                self.set_mode(Mode::Injection { brace_depth: brace_depth + 1 });
                kind
            }
            (TokenKind::RBrace, Mode::Injection { brace_depth: 0 }) => {
                self.leave_mode();
                TokenKind::InjectionEnd
            }
            (TokenKind::RBrace, Mode::Injection { brace_depth }) => {
                self.set_mode(Mode::Injection { brace_depth: brace_depth - 1 });
                kind
            }
            _ => kind,
        };

        SpannedToken::new(kind, span)
    }

    // === Interpolated strings ===

    fn lex_gstring(&mut self, triple: bool) -> SpannedToken {
        let rest = self.rest();
        let quote = if triple { "\"\"\"" } else { "\"" };

        if rest.is_empty() {
            // Unterminated at end of input: no end token.
            self.leave_mode();
            return self.next_token();
        }

        if rest.starts_with(quote) {
            self.leave_mode();
            return self.emit(TokenKind::GStringEnd, quote.len());
        }

        if rest.starts_with("${") {
            self.modes.push(Mode::Injection { brace_depth: 0 });
            return self.emit(TokenKind::DollarBrace, 2);
        }

        if starts_short_ref(rest) {
            self.modes.push(Mode::ShortRef { expect_ident: true });
            return self.emit(TokenKind::Dollar, 1);
        }

        if !triple && (rest.starts_with('\n') || rest.starts_with("\r\n")) {
            // A single-line literal cannot span lines: end it without an end token.
            self.leave_mode();
            return self.next_token();
        }

        let len = content_len(rest, triple);
        self.emit(TokenKind::GStringContent, len)
    }

    fn lex_short_ref(&mut self, expect_ident: bool) -> SpannedToken {
        let rest = self.rest();

        if expect_ident {
            let len = rest
                .char_indices()
                .find(|&(_, c)| !is_ident_continue(c))
                .map_or(rest.len(), |(i, _)| i);
            self.set_mode(Mode::ShortRef { expect_ident: false });
            return self.emit(TokenKind::Ident, len);
        }

        let mut chars = rest.chars();
        if chars.next() == Some('.') && chars.next().is_some_and(is_ident_start) {
            self.set_mode(Mode::ShortRef { expect_ident: true });
            return self.emit(TokenKind::Dot, 1);
        }

        self.leave_mode();
        self.next_token()
    }
}

/// `$` directly followed by an identifier start.
fn starts_short_ref(rest: &str) -> bool {
    let mut chars = rest.chars();
    chars.next() == Some('$') && chars.next().is_some_and(is_ident_start)
}

/// Length of the text run at the start of `rest`, up to the next closing
/// quote, injection, or (for single-line literals) newline. Escapes are
/// skipped over but not decoded.
fn content_len(rest: &str, triple: bool) -> usize {
    let mut chars = rest.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '"' if !triple || rest[i..].starts_with("\"\"\"") => return i,
            '$' if rest[i..].starts_with("${") || starts_short_ref(&rest[i..]) => return i,
            '\n' if !triple => return i,
            '\r' if !triple && rest[i..].starts_with("\r\n") => return i,
            _ => {}
        }
    }

    rest.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    fn texts(source: &str) -> Vec<&str> {
        Lexer::tokenize(source)
            .into_iter()
            .map(|t| t.text(source))
            .collect()
    }

    #[test]
    fn test_basic_tokens() {
        let tokens = kinds("foo(1, 2.5) == 'x' // comment");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Ident,
                TokenKind::LParen,
                TokenKind::IntLiteral,
                TokenKind::Comma,
                TokenKind::FloatLiteral,
                TokenKind::RParen,
                TokenKind::EqEq,
                TokenKind::StringLiteral,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_plain_gstring() {
        assert_eq!(
            kinds(r#""hello""#),
            vec![
                TokenKind::GStringBegin,
                TokenKind::GStringContent,
                TokenKind::GStringEnd,
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds(r#""""#),
            vec![TokenKind::GStringBegin, TokenKind::GStringEnd, TokenKind::Eof]
        );
    }

    #[test]
    fn test_injection() {
        let source = r#""a${x + 1}b""#;
        assert_eq!(
            kinds(source),
            vec![
                TokenKind::GStringBegin,
                TokenKind::GStringContent,
                TokenKind::DollarBrace,
                TokenKind::Ident,
                TokenKind::Plus,
                TokenKind::IntLiteral,
                TokenKind::InjectionEnd,
                TokenKind::GStringContent,
                TokenKind::GStringEnd,
                TokenKind::Eof,
            ]
        );
        assert_eq!(texts(source), vec!["\"", "a", "${", "x", "+", "1", "}", "b", "\"", ""]);
    }

    #[test]
    fn test_adjacent_injections() {
        assert_eq!(
            kinds(r#""${a}${b}""#),
            vec![
                TokenKind::GStringBegin,
                TokenKind::DollarBrace,
                TokenKind::Ident,
                TokenKind::InjectionEnd,
                TokenKind::DollarBrace,
                TokenKind::Ident,
                TokenKind::InjectionEnd,
                TokenKind::GStringEnd,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_only_outer_brace_ends_injection() {
        assert_eq!(
            kinds(r#""${ {x} }""#),
            vec![
                TokenKind::GStringBegin,
                TokenKind::DollarBrace,
                TokenKind::LBrace,
                TokenKind::Ident,
                TokenKind::RBrace,
                TokenKind::InjectionEnd,
                TokenKind::GStringEnd,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_short_reference() {
        let source = r#""Hi $user.name.""#;
        assert_eq!(
            kinds(source),
            vec![
                TokenKind::GStringBegin,
                TokenKind::GStringContent,
                TokenKind::Dollar,
                TokenKind::Ident,
                TokenKind::Dot,
                TokenKind::Ident,
                TokenKind::GStringContent,
                TokenKind::GStringEnd,
                TokenKind::Eof,
            ]
        );
        assert_eq!(texts(source)[6], ".");
    }

    #[test]
    fn test_nested_gstring() {
        assert_eq!(
            kinds(r#""a${ "b${c}" }d""#),
            vec![
                TokenKind::GStringBegin,
                TokenKind::GStringContent,
                TokenKind::DollarBrace,
                TokenKind::GStringBegin,
                TokenKind::GStringContent,
                TokenKind::DollarBrace,
                TokenKind::Ident,
                TokenKind::InjectionEnd,
                TokenKind::GStringEnd,
                TokenKind::InjectionEnd,
                TokenKind::GStringContent,
                TokenKind::GStringEnd,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_triple_quoted_spans_lines() {
        let source = "\"\"\"line one\n\"quoted\" ${x}\n\"\"\"";
        assert_eq!(
            kinds(source),
            vec![
                TokenKind::GStringBegin,
                TokenKind::GStringContent,
                TokenKind::DollarBrace,
                TokenKind::Ident,
                TokenKind::InjectionEnd,
                TokenKind::GStringContent,
                TokenKind::GStringEnd,
                TokenKind::Eof,
            ]
        );
        assert_eq!(texts(source)[1], "line one\n\"quoted\" ");
    }

    #[test]
    fn test_newline_ends_single_line_gstring() {
        assert_eq!(
            kinds("\"abc\nfoo"),
            vec![
                TokenKind::GStringBegin,
                TokenKind::GStringContent,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unterminated_gstring() {
        assert_eq!(
            kinds("\"abc"),
            vec![TokenKind::GStringBegin, TokenKind::GStringContent, TokenKind::Eof]
        );
        assert_eq!(
            kinds("\"${x"),
            vec![
                TokenKind::GStringBegin,
                TokenKind::DollarBrace,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[rstest]
    #[case(r#""\$x""#)]
    #[case(r#""\"""#)]
    #[case(r#""cost: $""#)]
    #[case(r#""$1""#)]
    fn test_escapes_and_bare_dollar_stay_content(#[case] source: &str) {
        assert_eq!(
            kinds(source),
            vec![
                TokenKind::GStringBegin,
                TokenKind::GStringContent,
                TokenKind::GStringEnd,
                TokenKind::Eof,
            ]
        );
    }

    #[rstest]
    #[case("'abc'")]
    #[case("''")]
    #[case("'''multi\nline ${not} interpolated'''")]
    fn test_single_quoted_strings(#[case] source: &str) {
        assert_eq!(kinds(source), vec![TokenKind::StringLiteral, TokenKind::Eof]);
    }

    #[test]
    fn test_unknown_character_is_error_token() {
        assert_eq!(
            kinds("a # b"),
            vec![TokenKind::Ident, TokenKind::Error, TokenKind::Ident, TokenKind::Eof]
        );
    }

    #[test]
    fn test_eof_is_sticky() {
        let mut lexer = Lexer::new("x");
        assert_eq!(lexer.next_token().kind, TokenKind::Ident);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }
}
