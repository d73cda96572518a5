// ABOUTME: Content scoring: initial tag/class weights at creation and paragraph density on close.
// ABOUTME: Density is delimiter count plus a capped length bonus, spread to parent and grandparent.

use crate::heuristics::Heuristics;
use crate::tree::Element;

/// Tag that earns the article bonus on top of its table weight.
const ARTICLE_TAG: &str = "article";

/// Initial score for a freshly created element.
///
/// Only tags present in the weight table are scored; everything else starts
/// at zero and can only gain score through paragraph propagation.
pub fn initial_score(element: &Element, heuristics: &Heuristics) -> f64 {
    let Some(weight) = heuristics.tag_weight(&element.tag) else {
        return 0.0;
    };

    let mut score = weight;
    let class_and_id = element.class_and_id();
    if heuristics.negative.is_match(&class_and_id) {
        score -= heuristics.class_weight;
    }
    if heuristics.positive.is_match(&class_and_id) {
        score += heuristics.class_weight;
    }
    if element.tag == ARTICLE_TAG {
        score += heuristics.article_bonus;
    }
    score
}

/// Content density of a paragraph's rendered text.
pub fn paragraph_score(text: &str, heuristics: &Heuristics) -> f64 {
    let delimiters = heuristics
        .sentence_delimiters
        .find_iter(text)
        .take(heuristics.max_delimiters)
        .count();
    let length = text.chars().count() as f64;
    let length_bonus = (length / heuristics.length_divisor).min(heuristics.max_length_bonus);
    delimiters as f64 + length_bonus
}

/// Amounts credited to the parent and grandparent for a paragraph score.
pub fn propagation(score: f64) -> (f64, f64) {
    (score, score / 2.0)
}
