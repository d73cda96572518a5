// ABOUTME: Text and markup reconstruction of a subtree from per-node text buffers.
// ABOUTME: Children are spliced into their parent's text at their recorded insert offsets.

//! Content reconstruction.
//!
//! Each element only holds the text that appeared directly inside it. To
//! render a subtree, the parent's buffer is cut at every child's
//! `insert_offset` and the child's own rendering is spliced in between.
//!
//! Whitespace convention: every text segment is trimmed, empty segments are
//! dropped, and what remains is joined with exactly one space. Neither view
//! ever starts or ends with whitespace.

use ego_tree::NodeRef;

use crate::heuristics::Heuristics;
use crate::tree::Element;

/// One step of a document-order walk over a subtree.
enum Step<'a> {
    /// A trimmed, non-empty slice of some element's own text.
    Text(&'a str),
    Open(NodeRef<'a, Element>),
    Close(NodeRef<'a, Element>),
}

/// An element being walked: the next child to visit and how far into the
/// element's own text we have emitted.
struct Frame<'a> {
    node: NodeRef<'a, Element>,
    next_child: Option<NodeRef<'a, Element>>,
    cursor: usize,
}

impl<'a> Frame<'a> {
    fn new(node: NodeRef<'a, Element>) -> Self {
        Self {
            node,
            next_child: node.first_child(),
            cursor: 0,
        }
    }
}

fn emit_text<'a, F>(segment: Option<&'a str>, visit: &mut F)
where
    F: FnMut(Step<'a>),
{
    if let Some(segment) = segment.map(str::trim).filter(|s| !s.is_empty()) {
        visit(Step::Text(segment));
    }
}

/// Walk the subtree at `node` in document order with an explicit stack, so
/// nesting depth is bounded by the heap rather than the call stack.
///
/// Excluded elements are skipped whole. Each element's text is cut at its
/// children's insert offsets and the children are visited in between.
fn walk<'a, F>(node: NodeRef<'a, Element>, heuristics: &Heuristics, mut visit: F)
where
    F: FnMut(Step<'a>),
{
    if heuristics.is_excluded(&node.value().tag) {
        return;
    }
    visit(Step::Open(node));
    let mut stack = vec![Frame::new(node)];

    while let Some(frame) = stack.last_mut() {
        let text: &'a str = frame.node.value().text.as_str();
        let Some(child) = frame.next_child else {
            emit_text(text.get(frame.cursor..), &mut visit);
            visit(Step::Close(frame.node));
            stack.pop();
            continue;
        };

        frame.next_child = child.next_sibling();
        let offset = child.value().insert_offset.clamp(frame.cursor, text.len());
        emit_text(text.get(frame.cursor..offset), &mut visit);
        frame.cursor = offset;

        if !heuristics.is_excluded(&child.value().tag) {
            visit(Step::Open(child));
            stack.push(Frame::new(child));
        }
    }
}

/// Plain text of the subtree rooted at `node`.
pub fn text_view(node: NodeRef<'_, Element>, heuristics: &Heuristics) -> String {
    let mut segments = Vec::new();
    walk(node, heuristics, |step| {
        if let Step::Text(segment) = step {
            segments.push(segment);
        }
    });
    segments.join(" ")
}

/// Normalized markup of the subtree rooted at `node`.
///
/// The synthetic root has no tag of its own and renders as its first child.
pub fn markup_view(node: NodeRef<'_, Element>, heuristics: &Heuristics) -> String {
    let node = if node.value().is_root() {
        match node.first_child() {
            Some(child) => child,
            None => return String::new(),
        }
    } else {
        node
    };

    let mut out = String::new();
    // One entry per open element: whether its content has been started.
    let mut started: Vec<bool> = Vec::new();

    walk(node, heuristics, |step| match step {
        Step::Text(segment) => {
            separate(&mut out, &mut started);
            escape_into(&mut out, segment, false);
        }
        Step::Open(child) => {
            separate(&mut out, &mut started);
            let element = child.value();
            out.push('<');
            out.push_str(&element.tag);
            for (name, value) in &element.attributes {
                out.push(' ');
                out.push_str(name);
                out.push_str("='");
                escape_into(&mut out, value, true);
                out.push('\'');
            }
            out.push('>');
            started.push(false);
        }
        Step::Close(child) => {
            started.pop();
            let element = child.value();
            if !heuristics.is_void(&element.tag) {
                out.push_str("</");
                out.push_str(&element.tag);
                out.push('>');
            }
        }
    });
    out
}

/// Space before every piece of an element's content but the first.
fn separate(out: &mut String, started: &mut [bool]) {
    if let Some(last) = started.last_mut() {
        if *last {
            out.push(' ');
        }
        *last = true;
    }
}

fn escape_into(out: &mut String, raw: &str, attribute: bool) {
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '\'' if attribute => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}
