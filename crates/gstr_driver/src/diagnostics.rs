use std::ops::Range;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use gstr_lexer::{unquote, Span, TokenKind};
use gstr_parser::{Parse, SyntaxError};
use gstr_syntax::{SyntaxElement, SyntaxNode};

/// Parser diagnostics plus invalid escapes in string text, in source order.
pub fn collect(parse: &Parse, source: &str) -> Vec<SyntaxError> {
    let mut errors = parse.errors.clone();
    errors.extend(escape_errors(&parse.root, source));
    errors.sort_by_key(|e| (e.span.start, e.span.end));
    errors
}

/// Check the escapes of every text run and single-quoted literal.
fn escape_errors(root: &SyntaxNode, source: &str) -> Vec<SyntaxError> {
    let mut errors = Vec::new();

    if let Some(file) = gstr_syntax::SourceFile::cast(root) {
        for gstring in file.gstrings() {
            for part in gstring.parts() {
                if let gstr_syntax::StringPart::Text(text) = part {
                    if let Err(e) = text.value(source) {
                        let at = text.span().start + e.offset;
                        errors.push(SyntaxError {
                            message: e.message,
                            span: Span::new(at, at + 1),
                        });
                    }
                }
            }
        }
    }

    for node in root.descendants() {
        for child in node.children() {
            let SyntaxElement::Token(token) = child else {
                continue;
            };
            if token.kind != TokenKind::StringLiteral {
                continue;
            }
            let text = token.text(source);
            if let Err(e) = unquote(text) {
                let quote = if text.starts_with("'''") && text.len() >= 6 { 3 } else { 1 };
                let at = token.span.start + quote + e.offset;
                errors.push(SyntaxError {
                    message: e.message,
                    span: Span::new(at, at + 1),
                });
            }
        }
    }

    errors
}

/// Character index of byte offset `byte`; ariadne counts characters.
fn char_offset(source: &str, byte: usize) -> usize {
    source.char_indices().take_while(|&(i, _)| i < byte).count()
}

fn render<'a>(
    error: &SyntaxError,
    path: &'a str,
    source: &str,
    config: Config,
) -> Report<'a, (&'a str, Range<usize>)> {
    let start = char_offset(source, error.span.start);
    let end = char_offset(source, error.span.end);
    Report::build(ReportKind::Error, path, start)
        .with_config(config)
        .with_message(&error.message)
        .with_label(
            Label::new((path, start..end))
                .with_message(&error.message)
                .with_color(Color::Red),
        )
        .finish()
}

/// Render one diagnostic to stderr.
pub fn report(error: &SyntaxError, path: &str, source: &str) {
    let result = render(error, path, source, Config::default()).eprint((path, Source::from(source)));

    if result.is_err() {
        eprintln!("{}: {}", path, error);
    }
}

pub fn report_all(errors: &[SyntaxError], path: &str, source: &str) {
    for error in errors {
        report(error, path, source);
    }
}
