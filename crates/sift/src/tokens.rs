// ABOUTME: Token events consumed by the tree builder and the html5gum adapter producing them.
// ABOUTME: Comments, doctypes and recoverable tokenizer diagnostics never reach the builder.

use html5gum::{DefaultEmitter, Token, Tokenizer};

/// One tokenizer event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    StartTag {
        name: String,
        attributes: Vec<(String, String)>,
        self_closing: bool,
    },
    EndTag {
        name: String,
    },
    Text(String),
    /// Unrecoverable input failure; the build stops and keeps what it has.
    Error(String),
    Eof,
}

impl Event {
    pub fn start(name: &str, attributes: &[(&str, &str)]) -> Self {
        Event::StartTag {
            name: name.to_string(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            self_closing: false,
        }
    }

    pub fn self_closing(name: &str, attributes: &[(&str, &str)]) -> Self {
        match Event::start(name, attributes) {
            Event::StartTag {
                name, attributes, ..
            } => Event::StartTag {
                name,
                attributes,
                self_closing: true,
            },
            other => other,
        }
    }

    pub fn end(name: &str) -> Self {
        Event::EndTag {
            name: name.to_string(),
        }
    }

    pub fn text(data: &str) -> Self {
        Event::Text(data.to_string())
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn convert(token: Token) -> Option<Event> {
    match token {
        Token::StartTag(tag) => Some(Event::StartTag {
            name: lossy(&tag.name),
            attributes: tag
                .attributes
                .iter()
                .map(|(k, v)| (lossy(k), lossy(v)))
                .collect(),
            self_closing: tag.self_closing,
        }),
        Token::EndTag(tag) => Some(Event::EndTag {
            name: lossy(&tag.name),
        }),
        Token::String(text) => Some(Event::Text(lossy(&text))),
        Token::Error(err) => {
            tracing::trace!(error = ?err, "tokenizer diagnostic");
            None
        }
        _ => None,
    }
}

/// Tokenize an HTML string into builder events, terminated by [`Event::Eof`].
///
/// Raw-text elements (`script`, `style`, ...) switch the tokenizer state so
/// their contents arrive as a single text event instead of bogus tags.
pub fn tokenize(html: &str) -> impl Iterator<Item = Event> + '_ {
    let mut emitter = DefaultEmitter::default();
    emitter.switch_states(true);

    Tokenizer::new_with_emitter(html, emitter)
        .flatten()
        .filter_map(convert)
        .chain(std::iter::once(Event::Eof))
}
