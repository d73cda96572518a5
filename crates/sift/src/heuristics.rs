// ABOUTME: Immutable scoring and pruning configuration: tag tables, keyword patterns, constants.
// ABOUTME: The builtin set is embedded JSON; custom sets load from a file with the same schema.

//! Heuristics shared by the tree builder, the scoring engine and the pruning
//! policy.
//!
//! A [`Heuristics`] value is compiled once and then only read, so a single
//! instance can back any number of concurrent builds. [`Heuristics::builtin`]
//! hands out the process-wide default.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::SiftError;

/// Embedded JSON holding the builtin tag tables and patterns.
const BUILTIN_HEURISTICS_JSON: &str = include_str!("../data/heuristics.json");

static BUILTIN: Lazy<Heuristics> = Lazy::new(|| {
    Heuristics::from_json(BUILTIN_HEURISTICS_JSON, "builtin")
        .expect("failed to compile builtin heuristics")
});

/// On-disk shape of a heuristics document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeuristicsFile {
    pub tag_weights: BTreeMap<String, f64>,
    pub void_tags: Vec<String>,
    pub excluded_tags: Vec<String>,
    pub boilerplate_tags: Vec<String>,
    pub paragraph_tags: Vec<String>,
    pub patterns: PatternsFile,
    pub class_weight: f64,
    pub article_bonus: f64,
    pub max_delimiters: usize,
    pub length_divisor: f64,
    pub max_length_bonus: f64,
    pub min_text_chars: usize,
}

/// Regular expression sources, compiled by [`Heuristics::from_file_contents`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternsFile {
    pub unlikely_candidates: String,
    pub maybe_candidate: String,
    pub positive: String,
    pub negative: String,
    pub sentence_delimiters: String,
}

/// Compiled, read-only heuristics.
#[derive(Debug, Clone)]
pub struct Heuristics {
    tag_weights: HashMap<String, f64>,
    void_tags: HashSet<String>,
    excluded_tags: HashSet<String>,
    boilerplate_tags: HashSet<String>,
    paragraph_tags: HashSet<String>,
    pub(crate) unlikely_candidates: Regex,
    pub(crate) maybe_candidate: Regex,
    pub(crate) positive: Regex,
    pub(crate) negative: Regex,
    pub(crate) sentence_delimiters: Regex,
    pub(crate) class_weight: f64,
    pub(crate) article_bonus: f64,
    pub(crate) max_delimiters: usize,
    pub(crate) length_divisor: f64,
    pub(crate) max_length_bonus: f64,
    pub(crate) min_text_chars: usize,
}

impl Heuristics {
    /// The shared builtin heuristics.
    ///
    /// # Panics
    ///
    /// Panics on first use if the embedded JSON is malformed.
    pub fn builtin() -> &'static Heuristics {
        &BUILTIN
    }

    /// The embedded JSON document, useful as a starting point for custom files.
    pub fn builtin_json() -> &'static str {
        BUILTIN_HEURISTICS_JSON
    }

    /// Parse and compile a heuristics document. `label` names the source in errors.
    pub fn from_json(json: &str, label: &str) -> Result<Self, SiftError> {
        let file: HeuristicsFile = serde_json::from_str(json).map_err(|e| {
            SiftError::config(label, "ParseHeuristics", Some(anyhow::Error::new(e)))
        })?;
        Self::from_file_contents(file, label)
    }

    /// Read, parse and compile a heuristics document from disk.
    pub fn from_path(path: &Path) -> Result<Self, SiftError> {
        let label = path.display().to_string();
        let json = fs::read_to_string(path).map_err(|e| {
            SiftError::config(&label, "ReadHeuristics", Some(anyhow::Error::new(e)))
        })?;
        Self::from_json(&json, &label)
    }

    /// Compile an already-deserialized document.
    pub fn from_file_contents(file: HeuristicsFile, label: &str) -> Result<Self, SiftError> {
        let compile = |name: &str, source: &str| {
            Regex::new(source).map_err(|e| {
                SiftError::config(
                    label,
                    "CompilePattern",
                    Some(anyhow::anyhow!("pattern {}: {}", name, e)),
                )
            })
        };

        if file.length_divisor <= 0.0 {
            return Err(SiftError::config(
                label,
                "ParseHeuristics",
                Some(anyhow::anyhow!("length_divisor must be positive")),
            ));
        }

        let patterns = &file.patterns;
        Ok(Self {
            unlikely_candidates: compile("unlikely_candidates", &patterns.unlikely_candidates)?,
            maybe_candidate: compile("maybe_candidate", &patterns.maybe_candidate)?,
            positive: compile("positive", &patterns.positive)?,
            negative: compile("negative", &patterns.negative)?,
            sentence_delimiters: compile("sentence_delimiters", &patterns.sentence_delimiters)?,
            tag_weights: file.tag_weights.into_iter().collect(),
            void_tags: file.void_tags.into_iter().collect(),
            excluded_tags: file.excluded_tags.into_iter().collect(),
            boilerplate_tags: file.boilerplate_tags.into_iter().collect(),
            paragraph_tags: file.paragraph_tags.into_iter().collect(),
            class_weight: file.class_weight,
            article_bonus: file.article_bonus,
            max_delimiters: file.max_delimiters,
            length_divisor: file.length_divisor,
            max_length_bonus: file.max_length_bonus,
            min_text_chars: file.min_text_chars,
        })
    }

    /// Weight for a tag, if the tag takes part in initial scoring.
    pub fn tag_weight(&self, tag: &str) -> Option<f64> {
        self.tag_weights.get(tag).copied()
    }

    pub fn is_void(&self, tag: &str) -> bool {
        self.void_tags.contains(tag)
    }

    pub fn is_excluded(&self, tag: &str) -> bool {
        self.excluded_tags.contains(tag)
    }

    pub fn is_boilerplate_tag(&self, tag: &str) -> bool {
        self.boilerplate_tags.contains(tag)
    }

    pub fn is_paragraph(&self, tag: &str) -> bool {
        self.paragraph_tags.contains(tag)
    }

    /// Minimum number of characters a trimmed text token needs to be kept.
    pub fn min_text_chars(&self) -> usize {
        self.min_text_chars
    }
}

impl Default for Heuristics {
    fn default() -> Self {
        Self::builtin().clone()
    }
}
