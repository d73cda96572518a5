// ABOUTME: Top-node selection over a finished document tree.
// ABOUTME: Picks the highest-scoring element that still has non-void children; ties keep the earlier node.

use ego_tree::NodeId;
use tracing::debug;

use crate::tree::Document;

/// The element most likely to hold the article body, or `None` when every
/// reachable element is a leaf.
///
/// Void children (`br`, `img`, ...) carry no content of their own, so they do
/// not make their parent eligible.
pub fn top_node(doc: &Document<'_>) -> Option<NodeId> {
    let heuristics = doc.heuristics();
    let mut best: Option<(NodeId, f64)> = None;

    for node in doc.root().descendants() {
        let eligible = node
            .children()
            .any(|child| !heuristics.is_void(&child.value().tag));
        if !eligible {
            continue;
        }
        let score = node.value().score;
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((node.id(), score)),
        }
    }

    if let Some((id, score)) = best {
        if let Some(element) = doc.element(id) {
            debug!(tag = %element.tag, score, "selected top node");
        }
    }
    best.map(|(id, _)| id)
}
