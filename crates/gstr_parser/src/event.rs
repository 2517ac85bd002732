use gstr_lexer::SpannedToken;
use gstr_syntax::{SyntaxElement, SyntaxKind, SyntaxNode};

/// Flat record of parser actions, turned into a tree by [`build_tree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event {
    /// Opens a node. `kind` stays `None` until the marker is committed.
    /// `forward_parent` is the distance to the `Start` of a node that was
    /// opened later but wraps this one (see `CompletedMarker::precede`).
    Start {
        kind: Option<SyntaxKind>,
        forward_parent: Option<usize>,
    },
    Finish,
    Token(SpannedToken),
}

impl Event {
    fn tombstone() -> Self {
        Event::Start { kind: None, forward_parent: None }
    }
}

struct OpenNode {
    kind: SyntaxKind,
    offset: usize,
    children: Vec<SyntaxElement>,
}

fn attach(stack: &mut [OpenNode], top: &mut Vec<SyntaxElement>, element: SyntaxElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => top.push(element),
    }
}

/// Assemble events into nodes. Elements outside any node are returned at the
/// top level in order.
pub(crate) fn build_tree(mut events: Vec<Event>) -> Vec<SyntaxElement> {
    let mut stack: Vec<OpenNode> = Vec::new();
    let mut top = Vec::new();
    let mut offset = 0;
    let mut parents = Vec::new();

    for i in 0..events.len() {
        match std::mem::replace(&mut events[i], Event::tombstone()) {
            Event::Start { kind, forward_parent } => {
                parents.push(kind);
                let mut idx = i;
                let mut next = forward_parent;
                while let Some(distance) = next {
                    idx += distance;
                    next = match std::mem::replace(&mut events[idx], Event::tombstone()) {
                        Event::Start { kind, forward_parent } => {
                            parents.push(kind);
                            forward_parent
                        }
                        _ => None,
                    };
                }
                // Outermost wrapper first.
                for kind in parents.drain(..).rev().flatten() {
                    stack.push(OpenNode { kind, offset, children: Vec::new() });
                }
            }
            Event::Finish => {
                if let Some(open) = stack.pop() {
                    let node = SyntaxNode::new(open.kind, open.offset, open.children);
                    attach(&mut stack, &mut top, SyntaxElement::Node(node));
                }
            }
            Event::Token(token) => {
                offset = token.span.end;
                attach(&mut stack, &mut top, SyntaxElement::Token(token));
            }
        }
    }

    // Only reachable if a marker was left open.
    while let Some(open) = stack.pop() {
        let node = SyntaxNode::new(open.kind, open.offset, open.children);
        attach(&mut stack, &mut top, SyntaxElement::Node(node));
    }

    top
}

#[cfg(test)]
mod tests {
    use super::*;
    use gstr_lexer::{Span, TokenKind};

    fn token(kind: TokenKind, start: usize, end: usize) -> Event {
        Event::Token(SpannedToken::new(kind, Span::new(start, end)))
    }

    fn start(kind: SyntaxKind) -> Event {
        Event::Start { kind: Some(kind), forward_parent: None }
    }

    #[test]
    fn test_nested_nodes() {
        let events = vec![
            start(SyntaxKind::ParenExpr),
            token(TokenKind::LParen, 0, 1),
            start(SyntaxKind::NameRef),
            token(TokenKind::Ident, 1, 2),
            Event::Finish,
            token(TokenKind::RParen, 2, 3),
            Event::Finish,
        ];
        let top = build_tree(events);
        assert_eq!(top.len(), 1);
        let paren = top[0].as_node().unwrap();
        assert_eq!(paren.kind(), SyntaxKind::ParenExpr);
        assert_eq!(paren.span(), Span::new(0, 3));
        assert_eq!(paren.child_nodes().next().unwrap().kind(), SyntaxKind::NameRef);
    }

    #[test]
    fn test_forward_parent_wraps_earlier_node() {
        // a + b, where the binary node was opened after `a` completed
        let events = vec![
            Event::Start { kind: Some(SyntaxKind::NameRef), forward_parent: Some(3) },
            token(TokenKind::Ident, 0, 1),
            Event::Finish,
            start(SyntaxKind::BinaryExpr),
            token(TokenKind::Plus, 2, 3),
            start(SyntaxKind::NameRef),
            token(TokenKind::Ident, 4, 5),
            Event::Finish,
            Event::Finish,
        ];
        let top = build_tree(events);
        assert_eq!(top.len(), 1);
        let binary = top[0].as_node().unwrap();
        assert_eq!(binary.kind(), SyntaxKind::BinaryExpr);
        assert_eq!(binary.span(), Span::new(0, 5));
        assert_eq!(binary.children().len(), 3);
    }

    #[test]
    fn test_uncommitted_start_is_skipped() {
        let events = vec![Event::tombstone(), token(TokenKind::Ident, 0, 1)];
        let top = build_tree(events);
        assert_eq!(top.len(), 1);
        assert!(top[0].as_token().is_some());
    }
}
