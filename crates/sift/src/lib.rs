// ABOUTME: Main library entry point for sift, a main-content extractor for HTML documents.
// ABOUTME: Re-exports the public API: Client, ClientBuilder, Extraction, SiftError, Heuristics, TreeBuilder.

//! sift - extract the article body of an HTML page.
//!
//! The document is tokenized once and fed through a streaming tree builder
//! that scores elements as they open, spreads paragraph scores upward as they
//! close, and drops boilerplate subtrees on the spot. The highest-scoring
//! element that still has children is taken as the article, and its text and
//! markup are rebuilt from the per-element text buffers.
//!
//! # Example
//!
//! ```
//! let html = r#"<div id="content"><p>Alpha, beta.</p></div>
//!               <div class="sidebar"><p>ad</p></div>"#;
//! let result = sift::extract(html);
//! assert_eq!(result.text, "Alpha, beta.");
//! ```

pub mod builder;
pub mod client;
pub mod error;
pub mod heuristics;
pub mod options;
pub mod pruning;
pub mod render;
pub mod resource;
pub mod result;
pub mod scoring;
pub mod select;
pub mod tokens;
pub mod tree;

pub use crate::builder::{BuildStats, TreeBuilder};
pub use crate::client::{extract, extract_with, summarize, Client};
pub use crate::error::{ErrorCode, SiftError};
pub use crate::heuristics::Heuristics;
pub use crate::options::{ClientBuilder, ContentType, Options};
pub use crate::result::Extraction;
pub use crate::select::top_node;
pub use crate::tokens::{tokenize, Event};
pub use crate::tree::{Document, Element};
