use serde::Serialize;

use gstr_parser::SyntaxError;
use gstr_syntax::{SyntaxElement, SyntaxNode};

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Element<'src> {
    Node {
        kind: String,
        start: usize,
        end: usize,
        children: Vec<Element<'src>>,
    },
    Token {
        kind: String,
        start: usize,
        end: usize,
        text: &'src str,
    },
}

#[derive(Debug, Serialize)]
struct Diagnostic<'a> {
    message: &'a str,
    start: usize,
    end: usize,
}

#[derive(Debug, Serialize)]
struct Output<'a> {
    tree: Element<'a>,
    errors: Vec<Diagnostic<'a>>,
}

fn element<'src>(node: &SyntaxNode, source: &'src str) -> Element<'src> {
    let children = node
        .children()
        .iter()
        .map(|child| match child {
            SyntaxElement::Node(node) => element(node, source),
            SyntaxElement::Token(token) => Element::Token {
                kind: format!("{:?}", token.kind),
                start: token.span.start,
                end: token.span.end,
                text: token.text(source),
            },
        })
        .collect();

    Element::Node {
        kind: format!("{:?}", node.kind()),
        start: node.span().start,
        end: node.span().end,
        children,
    }
}

/// Pretty-printed JSON of the tree and its diagnostics.
pub fn to_json(
    root: &SyntaxNode,
    errors: &[SyntaxError],
    source: &str,
) -> serde_json::Result<String> {
    let output = Output {
        tree: element(root, source),
        errors: errors
            .iter()
            .map(|e| Diagnostic {
                message: &e.message,
                start: e.span.start,
                end: e.span.end,
            })
            .collect(),
    };
    serde_json::to_string_pretty(&output)
}
