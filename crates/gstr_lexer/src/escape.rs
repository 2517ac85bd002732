//! Decoding of backslash escapes in string text.

/// An escape sequence that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscapeError {
    pub message: String,
    /// Byte offset of the backslash within the decoded text.
    pub offset: usize,
}

impl std::fmt::Display for EscapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at offset {}", self.message, self.offset)
    }
}

impl std::error::Error for EscapeError {}

/// Process escape sequences in a string literal or text run.
///
/// Supports `\b \t \n \f \r \" \' \\ \$`, `\uXXXX`, and a backslash before a
/// line break as a line continuation.
pub fn unescape(s: &str) -> Result<String, EscapeError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }

        match chars.next() {
            Some((_, 'b')) => result.push('\u{8}'),
            Some((_, 't')) => result.push('\t'),
            Some((_, 'n')) => result.push('\n'),
            Some((_, 'f')) => result.push('\u{c}'),
            Some((_, 'r')) => result.push('\r'),
            Some((_, '"')) => result.push('"'),
            Some((_, '\'')) => result.push('\''),
            Some((_, '\\')) => result.push('\\'),
            Some((_, '$')) => result.push('$'),
            Some((_, '\n')) => {}
            Some((_, '\r')) => {
                if chars.peek().map(|&(_, c)| c) == Some('\n') {
                    chars.next();
                }
            }
            Some((_, 'u')) => {
                let mut code = 0u32;
                for _ in 0..4 {
                    let digit = chars
                        .next()
                        .and_then(|(_, c)| c.to_digit(16))
                        .ok_or_else(|| EscapeError {
                            message: "expected four hex digits after '\\u'".to_string(),
                            offset,
                        })?;
                    code = code * 16 + digit;
                }
                let decoded = char::from_u32(code).ok_or_else(|| EscapeError {
                    message: format!("invalid unicode escape '\\u{:04x}'", code),
                    offset,
                })?;
                result.push(decoded);
            }
            Some((_, other)) => {
                return Err(EscapeError {
                    message: format!("unknown escape sequence '\\{}'", other),
                    offset,
                });
            }
            None => {
                return Err(EscapeError {
                    message: "dangling backslash".to_string(),
                    offset,
                });
            }
        }
    }

    Ok(result)
}

/// Strip the quotes off a single-quoted string literal and decode it.
pub fn unquote(literal: &str) -> Result<String, EscapeError> {
    let inner = if literal.len() >= 6 && literal.starts_with("'''") && literal.ends_with("'''") {
        &literal[3..literal.len() - 3]
    } else if literal.len() >= 2 && literal.starts_with('\'') && literal.ends_with('\'') {
        &literal[1..literal.len() - 1]
    } else {
        literal
    };
    unescape(inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_escapes() {
        assert_eq!(unescape(r#"a\tb\n\"c\"\$d\\"#).unwrap(), "a\tb\n\"c\"$d\\");
    }

    #[test]
    fn test_unicode_escape() {
        assert_eq!(unescape(r"caf\u00e9").unwrap(), "café");
    }

    #[test]
    fn test_line_continuation() {
        assert_eq!(unescape("one \\\ntwo").unwrap(), "one two");
        assert_eq!(unescape("one \\\r\ntwo").unwrap(), "one two");
    }

    #[test]
    fn test_unknown_escape_reports_offset() {
        let err = unescape(r"ab\q").unwrap_err();
        assert_eq!(err.offset, 2);
        assert!(err.message.contains("\\q"));
    }

    #[test]
    fn test_truncated_unicode_escape() {
        assert!(unescape(r"\u12").is_err());
        assert!(unescape(r"\ud800").is_err());
    }

    #[test]
    fn test_dangling_backslash() {
        assert!(unescape("abc\\").is_err());
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("'it\\'s'").unwrap(), "it's");
        assert_eq!(unquote("''").unwrap(), "");
        assert_eq!(unquote("'''a\nb'''").unwrap(), "a\nb");
    }
}
