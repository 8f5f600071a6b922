//! Series-level selection stages plus the post-expansion date split.
//!
//! Each series stage borrows its input and returns a fresh map, so callers can
//! run any subset of them in any order.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use deadlines_parser::{normalize_series_name, ConferenceSeries, RankGrade};

use crate::expand::ExpandedDeadline;
use crate::normalize::SeriesMap;

// Titles are normalized the same way sources are merged, so "IEEE S&P" and
// "S&P" name the same series. They match every category carrying that title.
fn normalized_titles(titles: &BTreeSet<String>) -> BTreeSet<String> {
    titles.iter().map(|title| normalize_series_name(title)).collect()
}

fn retain_by<F>(series: &SeriesMap, keep: F) -> SeriesMap
where
    F: Fn(&str, &ConferenceSeries) -> bool,
{
    series
        .iter()
        .filter(|(key, entry)| keep(key, entry))
        .map(|(key, entry)| (key.clone(), Arc::clone(entry)))
        .collect()
}

pub fn filter_category(series: &SeriesMap, categories: &BTreeSet<String>) -> SeriesMap {
    retain_by(series, |_, entry| categories.contains(&entry.category))
}

pub fn filter_rank(series: &SeriesMap, minimum: &RankGrade) -> SeriesMap {
    retain_by(series, |_, entry| entry.rank.meets(minimum))
}

pub fn exclude_titles(series: &SeriesMap, titles: &BTreeSet<String>) -> SeriesMap {
    let excluded = normalized_titles(titles);
    retain_by(series, |_, entry| !excluded.contains(&entry.title))
}

/// Restores listed titles from `original` on top of `kept`. A restored series
/// replaces whatever `kept` holds under the same key.
pub fn include_titles(
    kept: &SeriesMap,
    original: &SeriesMap,
    titles: &BTreeSet<String>,
) -> SeriesMap {
    let wanted = normalized_titles(titles);
    let mut result = kept.clone();
    for (key, entry) in original.iter().filter(|(_, entry)| wanted.contains(&entry.title)) {
        result.insert(key.clone(), Arc::clone(entry));
    }
    result
}

/// Half-open split: `deadline >= now` is upcoming, everything earlier is past.
/// Relative order inside each half is preserved.
pub fn split_at(
    deadlines: Vec<ExpandedDeadline>,
    now: DateTime<Utc>,
) -> (Vec<ExpandedDeadline>, Vec<ExpandedDeadline>) {
    deadlines.into_iter().partition(|row| row.deadline >= now)
}
