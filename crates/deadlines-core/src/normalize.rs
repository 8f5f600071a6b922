use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use deadlines_parser::{
    parse_source, series_key, AcceptanceStatistics, ConferenceSeries, FragmentRole, ParsedSource,
    RankGrade, RecordIssue, SeriesFragment,
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{PipelineError, Result};

/// Series keyed by [`series_key`]: normalized title plus category. Iteration
/// order is key order, which is also the order expansion walks series in.
pub type SeriesMap = BTreeMap<String, Arc<ConferenceSeries>>;

/// The ranking organisation whose grade drives rank filtering.
pub const PRIMARY_RANKING: &str = "core";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceIssue {
    Record(RecordIssue),
    UnmatchedEnrichment { adapter: &'static str, title: String },
}

impl fmt::Display for SourceIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceIssue::Record(issue) => write!(f, "{issue}"),
            SourceIssue::UnmatchedEnrichment { adapter, title } => {
                write!(f, "{adapter} has data for unknown series '{title}'")
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NormalizedSnapshot {
    pub series: SeriesMap,
    pub issues: Vec<SourceIssue>,
}

/// Routes every payload through the adapter registry and merges the results,
/// later payloads overriding earlier ones.
pub fn normalize<'a, I>(payloads: I) -> Result<NormalizedSnapshot>
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut parsed = Vec::new();
    for (index, payload) in payloads.into_iter().enumerate() {
        let source = parse_source(payload).map_err(|source| PipelineError::Source { index, source })?;
        parsed.push(source);
    }
    Ok(merge_sources(parsed))
}

pub fn merge_sources(sources: Vec<ParsedSource>) -> NormalizedSnapshot {
    let mut building: BTreeMap<String, ConferenceSeries> = BTreeMap::new();
    let mut issues = Vec::new();

    for source in sources {
        issues.extend(source.issues.into_iter().map(SourceIssue::Record));
        for mut fragment in source.fragments {
            let category = fragment
                .category
                .as_deref()
                .map(str::trim)
                .filter(|category| !category.is_empty());

            let creates = fragment.role == FragmentRole::Primary;
            let target = match category {
                Some(category) => Some(series_key(&fragment.title, category))
                    .filter(|key| creates || building.contains_key(key)),
                None => best_candidate(&building, &fragment.title)
                    .or_else(|| creates.then(|| series_key(&fragment.title, ""))),
            };

            let Some(key) = target else {
                debug!(
                    adapter = source.adapter,
                    title = %fragment.title,
                    "enrichment for a series no source introduced"
                );
                issues.push(SourceIssue::UnmatchedEnrichment {
                    adapter: source.adapter,
                    title: fragment.title,
                });
                continue;
            };

            let series = building
                .entry(key)
                .or_insert_with_key(|key| empty_series(key, &fragment.title));
            if fragment.role == FragmentRole::Enrichment {
                if let Some(acceptance) = fragment.acceptance.as_mut() {
                    retain_instance_years(series, acceptance, source.adapter);
                }
            }
            apply_fragment(series, fragment);
        }
    }

    if !issues.is_empty() {
        warn!(count = issues.len(), "normalization finished with source issues");
    }

    NormalizedSnapshot {
        series: building
            .into_iter()
            .map(|(key, series)| (key, Arc::new(series)))
            .collect(),
        issues,
    }
}

/// Picks the series a category-less fragment belongs to when several share its
/// title: best primary grade first, then the one with more instances. Ties keep
/// the first in key order.
fn best_candidate(building: &BTreeMap<String, ConferenceSeries>, title: &str) -> Option<String> {
    let mut best: Option<(&String, &ConferenceSeries)> = None;
    for (key, series) in building.iter().filter(|(_, series)| series.title == title) {
        let better = match best {
            None => true,
            Some((_, current)) => {
                (series.rank.ordinal(), series.instances.len())
                    > (current.rank.ordinal(), current.instances.len())
            }
        };
        if better {
            best = Some((key, series));
        }
    }
    best.map(|(key, _)| key.clone())
}

// Statistics only count for years the series actually held.
fn retain_instance_years(
    series: &ConferenceSeries,
    acceptance: &mut BTreeMap<u16, AcceptanceStatistics>,
    adapter: &'static str,
) {
    acceptance.retain(|year, _| {
        let held = series.instances.iter().any(|instance| instance.year == *year);
        if !held {
            debug!(
                adapter,
                series = %series.key,
                year,
                "dropping acceptance for a year with no instance"
            );
        }
        held
    });
}

fn empty_series(key: &str, title: &str) -> ConferenceSeries {
    ConferenceSeries {
        key: key.to_string(),
        title: title.to_string(),
        description: String::new(),
        category: String::new(),
        link: None,
        rank: RankGrade::default(),
        rankings: BTreeMap::new(),
        acceptance: BTreeMap::new(),
        instances: Vec::new(),
    }
}

// Shallow merge: each field the fragment carries replaces the stored one whole.
fn apply_fragment(series: &mut ConferenceSeries, fragment: SeriesFragment) {
    if let Some(description) = fragment.description {
        series.description = description;
    }
    if let Some(category) = fragment.category {
        series.category = category;
    }
    if let Some(link) = fragment.link {
        series.link = Some(link);
    }
    if let Some(rankings) = fragment.rankings {
        series.rank = rankings
            .get(PRIMARY_RANKING)
            .map(|grade| RankGrade::from(grade.as_str()))
            .unwrap_or_default();
        series.rankings = rankings;
    }
    if let Some(acceptance) = fragment.acceptance {
        series.acceptance = acceptance;
    }
    if let Some(instances) = fragment.instances {
        series.instances = instances.into_iter().map(Arc::new).collect();
    }
}
