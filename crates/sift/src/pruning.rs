// ABOUTME: Boilerplate classification applied to every element as it closes.
// ABOUTME: A pure function of tag and class+id, so identical inputs always get the same verdict.

use crate::heuristics::Heuristics;

/// True when an element with this tag and `class + id` string should be dropped.
///
/// Structural boilerplate tags always go. Otherwise the element goes when its
/// class/id looks like boilerplate and nothing in it suggests real content.
pub fn is_boilerplate(tag: &str, class_and_id: &str, heuristics: &Heuristics) -> bool {
    if heuristics.is_boilerplate_tag(tag) {
        return true;
    }
    heuristics.unlikely_candidates.is_match(class_and_id)
        && !heuristics.maybe_candidate.is_match(class_and_id)
}
