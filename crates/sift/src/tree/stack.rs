// ABOUTME: Stack of open elements used while the tree builder consumes tokens.
// ABOUTME: The root is a permanent floor, so peek always answers and pop never underflows.

use ego_tree::NodeId;

/// Open-element chain, innermost last.
#[derive(Debug, Clone)]
pub struct OpenElements {
    root: NodeId,
    open: Vec<NodeId>,
}

impl OpenElements {
    pub fn new(root: NodeId) -> Self {
        Self {
            root,
            open: Vec::new(),
        }
    }

    pub fn push(&mut self, id: NodeId) {
        self.open.push(id);
    }

    /// Remove and return the innermost element. The root is never returned.
    pub fn pop(&mut self) -> Option<NodeId> {
        self.open.pop()
    }

    /// Current insertion parent; the root when nothing else is open.
    pub fn peek(&self) -> NodeId {
        self.open.last().copied().unwrap_or(self.root)
    }

    /// Open elements above the root.
    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    /// Depth (from the bottom) of the innermost open element satisfying `pred`.
    pub fn position<F>(&self, pred: F) -> Option<usize>
    where
        F: Fn(NodeId) -> bool,
    {
        self.open.iter().rposition(|&id| pred(id))
    }
}
