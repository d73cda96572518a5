// ABOUTME: Streaming tree builder: turns token events into a scored, pruned Document in one pass.
// ABOUTME: Scoring runs when elements open and close; pruning runs as each element closes.

use ego_tree::NodeId;
use tracing::{debug, trace};

use crate::heuristics::Heuristics;
use crate::pruning::is_boilerplate;
use crate::scoring::{initial_score, paragraph_score, propagation};
use crate::tokens::Event;
use crate::tree::stack::OpenElements;
use crate::tree::{Document, Element};

/// Start tags that close an open element of the same family sitting on top of the stack.
const IMPLIED_END_TAGS: &[(&str, &[&str])] = &[
    ("p", &["p"]),
    ("li", &["li"]),
    ("dt", &["dt", "dd"]),
    ("dd", &["dt", "dd"]),
    ("tr", &["tr", "td", "th"]),
    ("td", &["td", "th"]),
    ("th", &["td", "th"]),
    ("option", &["option"]),
];

/// Inside an excluded element: everything is dropped until its end tag.
#[derive(Debug)]
struct Skipping {
    tag: String,
    depth: usize,
}

/// Counters reported once the build finishes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildStats {
    pub elements: usize,
    pub pruned: usize,
    pub skipped: usize,
    pub stray_end_tags: usize,
}

/// Builds a [`Document`] from a stream of [`Event`]s.
#[derive(Debug)]
pub struct TreeBuilder<'h> {
    heuristics: &'h Heuristics,
    doc: Document<'h>,
    open: OpenElements,
    skipping: Option<Skipping>,
    stats: BuildStats,
    done: bool,
}

impl<'h> TreeBuilder<'h> {
    pub fn new(heuristics: &'h Heuristics) -> Self {
        let doc = Document::new(heuristics);
        let open = OpenElements::new(doc.root_id());
        Self {
            heuristics,
            doc,
            open,
            skipping: None,
            stats: BuildStats::default(),
            done: false,
        }
    }

    /// Consume events until a terminal one (or the end of the iterator).
    pub fn build<I>(heuristics: &'h Heuristics, events: I) -> Document<'h>
    where
        I: IntoIterator<Item = Event>,
    {
        let mut builder = Self::new(heuristics);
        for event in events {
            if !builder.feed(event) {
                break;
            }
        }
        builder.finish()
    }

    /// Process one event. Returns false once the stream is terminated.
    pub fn feed(&mut self, event: Event) -> bool {
        if self.done {
            return false;
        }
        match event {
            Event::StartTag {
                name,
                attributes,
                self_closing,
            } => self.start_tag(name, attributes, self_closing),
            Event::EndTag { name } => self.end_tag(&name),
            Event::Text(text) => self.text(&text),
            Event::Eof => {
                self.close_all();
                self.done = true;
            }
            Event::Error(message) => {
                debug!(%message, open = self.open.len(), "token stream failed; keeping partial tree");
                self.done = true;
            }
        }
        !self.done
    }

    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    /// Hand back the tree built so far.
    pub fn finish(self) -> Document<'h> {
        debug!(
            elements = self.stats.elements,
            pruned = self.stats.pruned,
            skipped = self.stats.skipped,
            stray_end_tags = self.stats.stray_end_tags,
            complete = self.done,
            "built document tree"
        );
        self.doc
    }

    fn start_tag(&mut self, name: String, attributes: Vec<(String, String)>, self_closing: bool) {
        let h = self.heuristics;

        if let Some(skip) = self.skipping.as_mut() {
            if name == skip.tag {
                skip.depth += 1;
            }
            return;
        }

        let void = h.is_void(&name);
        if h.is_excluded(&name) {
            self.stats.skipped += 1;
            // A trailing slash does not close a non-void element, so `<script/>`
            // still swallows everything up to `</script>`.
            if !void {
                self.skipping = Some(Skipping { tag: name, depth: 1 });
            }
            return;
        }

        self.close_implied(&name);

        let parent = self.open.peek();
        let mut element = Element::new(name, attributes, 0);
        element.score = initial_score(&element, h);
        let Some(id) = self.doc.append(parent, element) else {
            return;
        };
        self.stats.elements += 1;

        if void {
            return;
        }
        self.open.push(id);
        if self_closing {
            self.close_top();
        }
    }

    fn end_tag(&mut self, name: &str) {
        let h = self.heuristics;

        if let Some(skip) = self.skipping.as_mut() {
            if name == skip.tag {
                skip.depth -= 1;
                if skip.depth == 0 {
                    self.skipping = None;
                }
            }
            return;
        }

        if h.is_void(name) || h.is_excluded(name) {
            return;
        }

        let doc = &self.doc;
        let target = self
            .open
            .position(|id| doc.element(id).is_some_and(|el| el.tag == name));
        let Some(depth) = target else {
            trace!(tag = name, "end tag without matching open element");
            self.stats.stray_end_tags += 1;
            return;
        };

        while self.open.len() > depth {
            self.close_top();
        }
    }

    fn text(&mut self, raw: &str) {
        if self.skipping.is_some() {
            return;
        }
        let trimmed = raw.trim();
        if trimmed.chars().count() < self.heuristics.min_text_chars() {
            return;
        }
        let top = self.open.peek();
        self.doc.push_text(top, trimmed);
    }

    /// Close the element on top of the stack if a new `tag` implicitly ends it.
    fn close_implied(&mut self, tag: &str) {
        let Some((_, closes)) = IMPLIED_END_TAGS.iter().find(|(opener, _)| *opener == tag) else {
            return;
        };
        let top = self.open.peek();
        let closes_top = self
            .doc
            .element(top)
            .is_some_and(|el| !el.is_root() && closes.contains(&el.tag.as_str()));
        if closes_top {
            self.close_top();
        }
    }

    fn close_all(&mut self) {
        while !self.open.is_empty() {
            self.close_top();
        }
    }

    /// Pop the innermost element, propagate its paragraph score and prune it if needed.
    fn close_top(&mut self) {
        let h = self.heuristics;
        let Some(current) = self.open.pop() else {
            return;
        };
        let Some(element) = self.doc.element(current) else {
            return;
        };

        let boilerplate = is_boilerplate(&element.tag, &element.class_and_id(), h);

        if h.is_paragraph(&element.tag) {
            let score = paragraph_score(&self.doc.text(current), h);
            let (to_parent, to_grandparent) = propagation(score);
            if let Some(parent) = self.doc.parent_id(current) {
                self.doc.add_score(parent, to_parent);
                if let Some(grandparent) = self.doc.parent_id(parent) {
                    self.doc.add_score(grandparent, to_grandparent);
                }
            }
        }

        if boilerplate {
            if let Some(element) = self.doc.element(current) {
                trace!(tag = %element.tag, class_and_id = %element.class_and_id(), "pruned");
            }
            self.doc.detach(current);
            self.stats.pruned += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn build(events: Vec<Event>) -> Document<'static> {
        TreeBuilder::build(Heuristics::builtin(), events)
    }

    fn tags(doc: &Document<'_>, id: NodeId) -> Vec<String> {
        doc.child_ids(id)
            .into_iter()
            .map(|c| doc.element(c).unwrap().tag.clone())
            .collect()
    }

    #[test]
    fn nests_elements_and_text() {
        let doc = build(vec![
            Event::start("div", &[]),
            Event::start("p", &[]),
            Event::text("Hello there"),
            Event::end("p"),
            Event::end("div"),
            Event::Eof,
        ]);
        let root = doc.root_id();
        let div = doc.child_ids(root)[0];
        let p = doc.child_ids(div)[0];
        assert_eq!(tags(&doc, root), vec!["div"]);
        assert_eq!(doc.element(p).unwrap().text, "Hello there");
        assert_eq!(doc.element(div).unwrap().text, "");
    }

    #[test]
    fn short_text_tokens_are_dropped() {
        let doc = build(vec![
            Event::start("p", &[]),
            Event::text(" x "),
            Event::text("   "),
            Event::text("  ok  "),
            Event::end("p"),
            Event::Eof,
        ]);
        let p = doc.child_ids(doc.root_id())[0];
        assert_eq!(doc.element(p).unwrap().text, "ok");
    }

    #[test]
    fn insert_offsets_track_parent_text() {
        let doc = build(vec![
            Event::start("p", &[]),
            Event::text("Hello"),
            Event::start("b", &[]),
            Event::text("big"),
            Event::end("b"),
            Event::text("wide"),
            Event::start("i", &[]),
            Event::text("world"),
            Event::end("i"),
            Event::end("p"),
            Event::Eof,
        ]);
        let p = doc.child_ids(doc.root_id())[0];
        let offsets: Vec<usize> = doc
            .child_ids(p)
            .into_iter()
            .map(|c| doc.element(c).unwrap().insert_offset)
            .collect();
        assert_eq!(offsets, vec![5, 10]);
        assert_eq!(doc.text(p), "Hello big wide world");
    }

    #[test]
    fn void_elements_attach_without_opening() {
        let doc = build(vec![
            Event::start("p", &[]),
            Event::text("one"),
            Event::start("br", &[]),
            Event::text("two"),
            Event::end("p"),
            Event::Eof,
        ]);
        let p = doc.child_ids(doc.root_id())[0];
        assert_eq!(tags(&doc, p), vec!["br"]);
        assert_eq!(doc.element(p).unwrap().text, "one two");
        let br = doc.child_ids(p)[0];
        assert!(doc.child_ids(br).is_empty());
    }

    #[test]
    fn excluded_subtree_is_never_materialized() {
        let doc = build(vec![
            Event::start("div", &[]),
            Event::text("before"),
            Event::start("script", &[]),
            Event::text("document.write('<div>')"),
            Event::end("script"),
            Event::text("after"),
            Event::end("div"),
            Event::Eof,
        ]);
        let div = doc.child_ids(doc.root_id())[0];
        assert!(doc.child_ids(div).is_empty());
        assert_eq!(doc.text(div), "before after");
        assert!(doc.find_by_type(doc.root_id(), "script").is_empty());
    }

    #[test]
    fn nested_excluded_tags_balance() {
        let doc = build(vec![
            Event::start("div", &[]),
            Event::start("object", &[]),
            Event::start("object", &[]),
            Event::end("object"),
            Event::text("hidden"),
            Event::end("object"),
            Event::text("shown"),
            Event::end("div"),
            Event::Eof,
        ]);
        let div = doc.child_ids(doc.root_id())[0];
        assert_eq!(doc.text(div), "shown");
    }

    #[test]
    fn self_closed_excluded_tag_still_skips_its_body() {
        let mut builder = TreeBuilder::new(Heuristics::builtin());
        builder.feed(Event::start("div", &[]));
        builder.feed(Event::self_closing("script", &[("src", "a.js")]));
        builder.feed(Event::text("var leaked = 1;"));
        builder.feed(Event::end("script"));
        builder.feed(Event::text("visible"));
        builder.feed(Event::end("div"));
        builder.feed(Event::Eof);
        assert_eq!(builder.stats().skipped, 1);

        let doc = builder.finish();
        let div = doc.child_ids(doc.root_id())[0];
        assert_eq!(doc.text(div), "visible");
        assert_eq!(doc.html(div), "<div>visible</div>");
    }

    #[test]
    fn self_closed_void_excluded_tag_does_not_skip() {
        let doc = build(vec![
            Event::start("div", &[]),
            Event::self_closing("meta", &[("charset", "utf-8")]),
            Event::text("after meta"),
            Event::end("div"),
            Event::Eof,
        ]);
        let div = doc.child_ids(doc.root_id())[0];
        assert!(doc.child_ids(div).is_empty());
        assert_eq!(doc.text(div), "after meta");
    }

    #[test]
    fn error_keeps_open_boilerplate_unpruned() {
        let mut builder = TreeBuilder::new(Heuristics::builtin());
        builder.feed(Event::start("body", &[]));
        builder.feed(Event::start("footer", &[]));
        builder.feed(Event::text("Copyright notice"));
        builder.feed(Event::Error("truncated".into()));
        assert_eq!(builder.stats().pruned, 0);

        let doc = builder.finish();
        let footers = doc.find_by_type(doc.root_id(), "footer");
        assert_eq!(footers.len(), 1);
        assert_eq!(doc.text(footers[0]), "Copyright notice");
    }

    #[test]
    fn deep_nesting_closes_without_overflow() {
        let mut events = vec![
            Event::start("div", &[]),
            Event::start("p", &[]),
            Event::text("top"),
        ];
        events.extend((0..100_000).map(|_| Event::start("span", &[])));
        events.push(Event::text("deep"));
        events.push(Event::Eof);

        let doc = build(events);
        let div = doc.child_ids(doc.root_id())[0];
        assert_eq!(doc.text(div), "top deep");
        // "top deep" is 8 chars with no delimiters
        assert!((doc.element(div).unwrap().score - 5.08).abs() < 1e-9);
    }

    #[test]
    fn self_closing_non_void_opens_and_closes() {
        let doc = build(vec![
            Event::start("div", &[]),
            Event::self_closing("span", &[]),
            Event::text("still in div"),
            Event::end("div"),
            Event::Eof,
        ]);
        let div = doc.child_ids(doc.root_id())[0];
        assert_eq!(tags(&doc, div), vec!["span"]);
        assert_eq!(doc.element(div).unwrap().text, "still in div");
    }

    #[test]
    fn boilerplate_is_pruned_on_close() {
        let doc = build(vec![
            Event::start("body", &[]),
            Event::start("header", &[]),
            Event::text("Site name"),
            Event::end("header"),
            Event::start("div", &[("class", "share-buttons")]),
            Event::text("Tweet this"),
            Event::end("div"),
            Event::start("div", &[("class", "main-column")]),
            Event::text("Body text"),
            Event::end("div"),
            Event::end("body"),
            Event::Eof,
        ]);
        let body = doc.child_ids(doc.root_id())[0];
        assert_eq!(tags(&doc, body), vec!["div"]);
        assert_eq!(doc.text(body), "Body text");
    }

    #[test]
    fn pruning_only_child_empties_parent() {
        let doc = build(vec![
            Event::start("div", &[]),
            Event::start("footer", &[]),
            Event::text("copyright"),
            Event::end("footer"),
            Event::end("div"),
            Event::Eof,
        ]);
        let div = doc.child_ids(doc.root_id())[0];
        assert!(doc.child_ids(div).is_empty());
    }

    #[test]
    fn paragraph_score_reaches_parent_and_grandparent() {
        let text = "a".repeat(50);
        let doc = build(vec![
            Event::start("section", &[]),
            Event::start("section", &[]),
            Event::start("p", &[]),
            Event::text(&text),
            Event::end("p"),
            Event::end("section"),
            Event::end("section"),
            Event::Eof,
        ]);
        let outer = doc.child_ids(doc.root_id())[0];
        let inner = doc.child_ids(outer)[0];
        assert_eq!(doc.element(inner).unwrap().score, 0.5);
        assert_eq!(doc.element(outer).unwrap().score, 0.25);
        assert_eq!(doc.root().value().score, 0.0);
    }

    #[test]
    fn pruned_paragraph_still_scores_its_parent() {
        let doc = build(vec![
            Event::start("section", &[]),
            Event::start("p", &[("class", "comment")]),
            Event::text("Nice, post."),
            Event::end("p"),
            Event::end("section"),
            Event::Eof,
        ]);
        let section = doc.child_ids(doc.root_id())[0];
        assert!(doc.child_ids(section).is_empty());
        assert!(doc.element(section).unwrap().score > 2.0);
    }

    #[test]
    fn initial_score_applied_at_creation() {
        let doc = build(vec![
            Event::start("div", &[("id", "content")]),
            Event::end("div"),
            Event::Eof,
        ]);
        let div = doc.child_ids(doc.root_id())[0];
        assert_eq!(doc.element(div).unwrap().score, 30.0);
    }

    #[test]
    fn implied_paragraph_end() {
        let doc = build(vec![
            Event::start("div", &[]),
            Event::start("p", &[]),
            Event::text("first"),
            Event::start("p", &[]),
            Event::text("second"),
            Event::end("div"),
            Event::Eof,
        ]);
        let div = doc.child_ids(doc.root_id())[0];
        assert_eq!(tags(&doc, div), vec!["p", "p"]);
        assert_eq!(doc.text(div), "first second");
    }

    #[test]
    fn mismatched_end_tag_closes_through() {
        let doc = build(vec![
            Event::start("div", &[]),
            Event::start("span", &[]),
            Event::text("inner"),
            Event::end("div"),
            Event::text("outside"),
            Event::Eof,
        ]);
        let root = doc.root_id();
        assert_eq!(tags(&doc, root), vec!["div"]);
        assert_eq!(doc.root().value().text, "outside");
    }

    #[test]
    fn stray_end_tags_are_ignored() {
        let mut builder = TreeBuilder::new(Heuristics::builtin());
        builder.feed(Event::end("div"));
        builder.feed(Event::end("p"));
        builder.feed(Event::start("div", &[]));
        builder.feed(Event::text("safe"));
        builder.feed(Event::end("div"));
        builder.feed(Event::Eof);
        assert_eq!(builder.stats().stray_end_tags, 2);

        let doc = builder.finish();
        assert_eq!(doc.text(doc.root_id()), "safe");
    }

    #[test]
    fn error_keeps_partial_tree() {
        let mut builder = TreeBuilder::new(Heuristics::builtin());
        assert!(builder.feed(Event::start("div", &[])));
        assert!(builder.feed(Event::text("partial")));
        assert!(!builder.feed(Event::Error("connection reset".into())));
        assert!(!builder.feed(Event::text("ignored")));

        let doc = builder.finish();
        assert_eq!(doc.text(doc.root_id()), "partial");
    }

    #[test]
    fn iterator_without_eof_still_returns_tree() {
        let doc = build(vec![Event::start("div", &[]), Event::text("open")]);
        assert_eq!(doc.text(doc.root_id()), "open");
    }
}
