use logos::Logos;

/// Kinds of tokens produced by the lexer.
///
/// Variants with a `logos` attribute are recognised in code mode. The
/// string-literal variants without one are emitted by the modal lexer while
/// it scans the inside of an interpolated string.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f]+")]        // Skip whitespace
#[logos(skip r"//[^\n]*")]            // Skip line comments
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
pub enum TokenKind {
    // === Keywords ===
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    // === Literals ===
    #[regex(r"[0-9][0-9_]*")]
    IntLiteral,

    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*")]
    FloatLiteral,

    /// Single-quoted string, never interpolated: `'abc'` or `'''abc'''`.
    #[regex(r"'([^'\\\n]|\\.)*'")]
    #[token("'''", triple_single_quoted)]
    StringLiteral,

    // === Identifiers ===
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    // === Operators ===
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("=")]
    Eq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("!")]
    Not,
    #[token("?")]
    Question,
    #[token("?:")]
    Elvis,
    #[token("?.")]
    SafeDot,

    // === Delimiters ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    // === Punctuation ===
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token(".")]
    Dot,
    #[token("->")]
    Arrow,

    // === Interpolated strings ===
    /// `"` or `"""`
    #[token("\"")]
    #[token("\"\"\"")]
    GStringBegin,
    /// Raw text between delimiters and injections, escapes left undecoded.
    GStringContent,
    /// `${`
    DollarBrace,
    /// The `}` closing a `${` injection.
    InjectionEnd,
    /// The `$` of a short-form `$name.path` reference.
    Dollar,
    /// Closing `"` or `"""`
    GStringEnd,

    // === Special ===
    Error,
    Eof,
}

impl TokenKind {
    pub fn is_keyword(self) -> bool {
        matches!(self, TokenKind::True | TokenKind::False | TokenKind::Null)
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::IntLiteral | TokenKind::FloatLiteral | TokenKind::StringLiteral
        )
    }

    /// Tokens that only occur inside an interpolated string literal.
    pub fn is_gstring_part(self) -> bool {
        matches!(
            self,
            TokenKind::GStringBegin
                | TokenKind::GStringContent
                | TokenKind::DollarBrace
                | TokenKind::InjectionEnd
                | TokenKind::Dollar
                | TokenKind::GStringEnd
        )
    }
}

/// Consume the body of a `'''` string up to and including the closing `'''`.
///
/// An unterminated body is consumed to the end of input and reported as an
/// error token.
fn triple_single_quoted(lex: &mut logos::Lexer<TokenKind>) -> bool {
    let rest = lex.remainder();
    let mut chars = rest.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '\'' if rest[i..].starts_with("'''") => {
                lex.bump(i + 3);
                return true;
            }
            _ => {}
        }
    }
    lex.bump(rest.len());
    false
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::True => write!(f, "true"),
            TokenKind::False => write!(f, "false"),
            TokenKind::Null => write!(f, "null"),
            TokenKind::IntLiteral => write!(f, "integer literal"),
            TokenKind::FloatLiteral => write!(f, "float literal"),
            TokenKind::StringLiteral => write!(f, "string literal"),
            TokenKind::Ident => write!(f, "identifier"),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::Percent => write!(f, "%"),
            TokenKind::Eq => write!(f, "="),
            TokenKind::EqEq => write!(f, "=="),
            TokenKind::NotEq => write!(f, "!="),
            TokenKind::Lt => write!(f, "<"),
            TokenKind::Gt => write!(f, ">"),
            TokenKind::LtEq => write!(f, "<="),
            TokenKind::GtEq => write!(f, ">="),
            TokenKind::AndAnd => write!(f, "&&"),
            TokenKind::OrOr => write!(f, "||"),
            TokenKind::Not => write!(f, "!"),
            TokenKind::Question => write!(f, "?"),
            TokenKind::Elvis => write!(f, "?:"),
            TokenKind::SafeDot => write!(f, "?."),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::LBrace => write!(f, "{{"),
            TokenKind::RBrace => write!(f, "}}"),
            TokenKind::LBracket => write!(f, "["),
            TokenKind::RBracket => write!(f, "]"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Colon => write!(f, ":"),
            TokenKind::Semi => write!(f, ";"),
            TokenKind::Dot => write!(f, "."),
            TokenKind::Arrow => write!(f, "->"),
            TokenKind::GStringBegin => write!(f, "string start"),
            TokenKind::GStringContent => write!(f, "string content"),
            TokenKind::DollarBrace => write!(f, "${{"),
            TokenKind::InjectionEnd => write!(f, "}}"),
            TokenKind::Dollar => write!(f, "$"),
            TokenKind::GStringEnd => write!(f, "string end"),
            TokenKind::Error => write!(f, "invalid token"),
            TokenKind::Eof => write!(f, "EOF"),
        }
    }
}
