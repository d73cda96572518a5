// ABOUTME: Arena-backed document tree: the Element node type and the Document wrapper.
// ABOUTME: Provides the query helpers find_by_type, find_by_class and link_density.

//! The weighted document tree produced by the [`TreeBuilder`](crate::builder::TreeBuilder).
//!
//! Nodes live in an `ego_tree` arena and are addressed by [`NodeId`]. Children
//! are owned by their parent's child list; the parent link is an arena index,
//! so the structure never forms reference cycles.

pub mod stack;

use std::collections::BTreeMap;

use ego_tree::{NodeId, NodeRef, Tree};

use crate::heuristics::Heuristics;
use crate::render;

/// Tag of the synthetic document root.
pub const ROOT_TAG: &str = "root";

/// One element of the document and the character data that sits directly in it.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    /// Raw text observed while this element was the innermost open element.
    pub text: String,
    pub score: f64,
    /// Byte length of the parent's `text` when this element was attached.
    pub insert_offset: usize,
}

impl Element {
    pub fn new<I>(tag: impl Into<String>, attributes: I, insert_offset: usize) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            tag: tag.into(),
            attributes: attributes.into_iter().collect(),
            text: String::new(),
            score: 0.0,
            insert_offset,
        }
    }

    pub fn root() -> Self {
        Self::new(ROOT_TAG, Vec::new(), 0)
    }

    pub fn is_root(&self) -> bool {
        self.tag == ROOT_TAG
    }

    /// Attribute value, or the empty string when absent.
    pub fn attr(&self, name: &str) -> &str {
        self.attributes.get(name).map(String::as_str).unwrap_or("")
    }

    /// `class` followed by `id`, the string both scoring and pruning match against.
    pub fn class_and_id(&self) -> String {
        let mut out = String::with_capacity(self.attr("class").len() + self.attr("id").len());
        out.push_str(self.attr("class"));
        out.push_str(self.attr("id"));
        out
    }
}

/// A built document: the element arena plus the heuristics it was built with.
#[derive(Debug, Clone)]
pub struct Document<'h> {
    tree: Tree<Element>,
    heuristics: &'h Heuristics,
}

impl<'h> Document<'h> {
    pub(crate) fn new(heuristics: &'h Heuristics) -> Self {
        Self {
            tree: Tree::new(Element::root()),
            heuristics,
        }
    }

    pub fn heuristics(&self) -> &'h Heuristics {
        self.heuristics
    }

    pub fn root_id(&self) -> NodeId {
        self.tree.root().id()
    }

    pub fn root(&self) -> NodeRef<'_, Element> {
        self.tree.root()
    }

    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_, Element>> {
        self.tree.get(id)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.tree.get(id).map(|node| node.value())
    }

    pub fn parent_id(&self, id: NodeId) -> Option<NodeId> {
        self.tree.get(id)?.parent().map(|p| p.id())
    }

    /// Ids of the children of `id`, in document order.
    pub fn child_ids(&self, id: NodeId) -> Vec<NodeId> {
        self.tree
            .get(id)
            .map(|node| node.children().map(|c| c.id()).collect())
            .unwrap_or_default()
    }

    /// Number of elements reachable from the root, root included.
    pub fn len(&self) -> usize {
        self.tree.root().descendants().count()
    }

    pub fn is_empty(&self) -> bool {
        !self.tree.root().has_children()
    }

    /// Attach a new element as the last child of `parent`, stamping its insert offset.
    pub(crate) fn append(&mut self, parent: NodeId, mut element: Element) -> Option<NodeId> {
        let mut node = self.tree.get_mut(parent)?;
        element.insert_offset = node.value().text.len();
        Some(node.append(element).id())
    }

    /// Append trimmed character data to the element's own text buffer.
    pub(crate) fn push_text(&mut self, id: NodeId, text: &str) {
        if let Some(mut node) = self.tree.get_mut(id) {
            let buf = &mut node.value().text;
            if !buf.is_empty() {
                buf.push(' ');
            }
            buf.push_str(text);
        }
    }

    pub(crate) fn add_score(&mut self, id: NodeId, amount: f64) {
        if let Some(mut node) = self.tree.get_mut(id) {
            node.value().score += amount;
        }
    }

    /// Detach `id` and its subtree from the tree. The root cannot be detached.
    pub(crate) fn detach(&mut self, id: NodeId) {
        if id == self.root_id() {
            return;
        }
        if let Some(mut node) = self.tree.get_mut(id) {
            node.detach();
        }
    }

    /// Plain-text rendering of the subtree at `id`.
    pub fn text(&self, id: NodeId) -> String {
        self.tree
            .get(id)
            .map(|node| render::text_view(node, self.heuristics))
            .unwrap_or_default()
    }

    /// Normalized markup rendering of the subtree at `id`.
    pub fn html(&self, id: NodeId) -> String {
        self.tree
            .get(id)
            .map(|node| render::markup_view(node, self.heuristics))
            .unwrap_or_default()
    }

    /// All elements under `id` (itself included) whose tag is exactly `tag`, depth first.
    pub fn find_by_type(&self, id: NodeId, tag: &str) -> Vec<NodeId> {
        self.find(id, |el| el.tag == tag)
    }

    /// All elements under `id` (itself included) whose whole `class` value is `class`.
    pub fn find_by_class(&self, id: NodeId, class: &str) -> Vec<NodeId> {
        self.find(id, |el| el.attr("class") == class)
    }

    fn find<F>(&self, id: NodeId, matches: F) -> Vec<NodeId>
    where
        F: Fn(&Element) -> bool,
    {
        let Some(start) = self.tree.get(id) else {
            return Vec::new();
        };
        start
            .descendants()
            .filter(|node| matches(node.value()))
            .map(|node| node.id())
            .collect()
    }

    /// Characters of link targets per character of rendered text.
    ///
    /// Sums the length of every `a` element's own `href` and divides by the
    /// character count of the node's text view (at least 1).
    pub fn link_density(&self, id: NodeId) -> f64 {
        let href_chars: usize = self
            .find_by_type(id, "a")
            .into_iter()
            .filter_map(|link| self.element(link))
            .map(|link| link.attr("href").chars().count())
            .sum();
        let text_chars = self.text(id).chars().count().max(1);
        href_chars as f64 / text_chars as f64
    }
}
