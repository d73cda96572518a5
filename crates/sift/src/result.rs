// ABOUTME: Extraction struct holding the selected node's text and markup views.
// ABOUTME: Serializes to JSON for the CLI and picks the requested view through content().

use serde::Serialize;

use crate::options::ContentType;

/// The outcome of extracting one document.
///
/// When no eligible node exists, `tag` and `score` are `None` and both
/// views are empty.
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct Extraction {
    pub url: String,
    pub domain: String,
    pub tag: Option<String>,
    pub score: Option<f64>,
    pub text: String,
    pub html: String,
    pub word_count: usize,
}

impl Extraction {
    /// The view matching `content_type`.
    pub fn content(&self, content_type: ContentType) -> &str {
        match content_type {
            ContentType::Html => &self.html,
            ContentType::Text => &self.text,
        }
    }

    /// Returns true if nothing was selected.
    pub fn is_empty(&self) -> bool {
        self.tag.is_none()
    }
}

/// Count words in a text string using whitespace splitting.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
