//! Conversion of free-text review feedback into numbered review points.

use crate::domain::ReviewPoint;
use regex::Regex;
use std::sync::LazyLock;

/// Matches enumeration markers such as `1. ` or `12.  `.
static ENUMERATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\s+").expect("enumeration pattern is valid"));

/// Splits feedback text on enumeration markers and renumbers the fragments from 1.
///
/// Server-supplied numbers are discarded, so gaps or repeats upstream still
/// produce a contiguous sequence. Text without any marker becomes a single
/// point. Blank input yields no points.
pub fn parse(feedback_text: &str) -> Vec<ReviewPoint> {
    ENUMERATION
        .split(feedback_text)
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .enumerate()
        .map(|(offset, fragment)| ReviewPoint {
            index: offset + 1,
            text: fragment.to_owned(),
        })
        .collect()
}
