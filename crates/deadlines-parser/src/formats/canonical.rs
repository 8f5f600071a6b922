use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::errors::{ParserError, RecordIssue};
use crate::model::{
    AcceptanceStatistics, ConferenceInstance, DateExpr, FragmentRole, ParsedSource,
    SeriesFragment, TimelineEvent,
};
use crate::registry::SourceAdapter;

use super::{clean_optional, collect_rankings, de_count, describe_kind};

/// The richer aggregated schema: a mapping of series key to series, with
/// `rankings.core`, yearly `conferences` and self-describing timeline events
/// whose dates usually carry their own UTC offset.
pub struct CanonicalAdapter;

impl Default for CanonicalAdapter {
    fn default() -> Self {
        Self
    }
}

#[derive(Debug, Deserialize)]
struct CanonicalSeries {
    name: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    rankings: Option<BTreeMap<String, Option<String>>>,
    #[serde(default)]
    conferences: Option<BTreeMap<String, CanonicalConference>>,
    #[serde(default)]
    acceptance_statistics: Option<BTreeMap<String, CanonicalStatistics>>,
}

#[derive(Debug, Deserialize)]
struct CanonicalConference {
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    timezone: Option<String>,
    #[serde(default)]
    timeline: Vec<CanonicalEvent>,
}

#[derive(Debug, Deserialize)]
struct CanonicalEvent {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    comment: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CanonicalStatistics {
    #[serde(deserialize_with = "de_count")]
    accepted: u32,
    #[serde(deserialize_with = "de_count")]
    submitted: u32,
}

impl CanonicalAdapter {
    const NAME: &'static str = "CANONICAL";

    fn parse_year(raw: &str) -> Result<u16, String> {
        raw.trim()
            .parse::<u16>()
            .map_err(|err| format!("year key '{raw}' is not a year: {err}"))
    }

    fn to_fragment(
        key: &str,
        series: CanonicalSeries,
        issues: &mut Vec<RecordIssue>,
    ) -> SeriesFragment {
        let mut fragment = SeriesFragment::new(&series.name, FragmentRole::Primary);
        fragment.category = clean_optional(series.category);
        fragment.description = clean_optional(series.description);
        fragment.link = clean_optional(series.link);
        fragment.rankings = series.rankings.map(collect_rankings);

        fragment.instances = series.conferences.map(|conferences| {
            let mut instances = Vec::with_capacity(conferences.len());
            for (year, conference) in conferences {
                match Self::parse_year(&year) {
                    Ok(year) => instances.push(Self::to_instance(year, conference)),
                    Err(message) => {
                        let issue = RecordIssue::new(Self::NAME, key, message);
                        warn!(%issue, "skipping conference year");
                        issues.push(issue);
                    }
                }
            }
            instances.sort_by_key(|instance| instance.year);
            instances
        });

        fragment.acceptance = series.acceptance_statistics.map(|statistics| {
            let mut acceptance = BTreeMap::new();
            for (year, stats) in statistics {
                match Self::parse_year(&year) {
                    Ok(year) => {
                        acceptance.insert(
                            year,
                            AcceptanceStatistics {
                                submitted: stats.submitted,
                                accepted: stats.accepted,
                            },
                        );
                    }
                    Err(message) => {
                        let issue = RecordIssue::new(Self::NAME, key, message);
                        warn!(%issue, "skipping acceptance year");
                        issues.push(issue);
                    }
                }
            }
            acceptance
        });

        fragment
    }

    fn to_instance(year: u16, conference: CanonicalConference) -> ConferenceInstance {
        let timeline = conference
            .timeline
            .into_iter()
            .map(|event| {
                let date = DateExpr::from_optional(event.date.as_deref());
                TimelineEvent::new(event.description.trim(), date, clean_optional(event.comment))
            })
            .collect();

        ConferenceInstance {
            year,
            location: clean_optional(conference.location),
            link: clean_optional(conference.link),
            timezone: clean_optional(conference.timezone),
            date_text: None,
            timeline,
        }
    }
}

impl SourceAdapter for CanonicalAdapter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(&self, payload: &Value) -> Result<ParsedSource, ParserError> {
        let entries = payload
            .as_object()
            .ok_or_else(|| ParserError::FormatMismatch {
                adapter: Self::NAME,
                reason: format!("expected a mapping of series, found {}", describe_kind(payload)),
            })?;

        if !entries.is_empty() && !entries.values().any(|entry| entry.get("conferences").is_some()) {
            return Err(ParserError::FormatMismatch {
                adapter: Self::NAME,
                reason: "no series carries a `conferences` mapping".to_string(),
            });
        }

        let mut fragments = Vec::with_capacity(entries.len());
        let mut issues = Vec::new();
        // Keys are storage artefacts; identity comes from the series name.
        for (key, entry) in entries {
            match CanonicalSeries::deserialize(entry) {
                Ok(series) => fragments.push(Self::to_fragment(key, series, &mut issues)),
                Err(err) => {
                    let issue = RecordIssue::new(Self::NAME, key.as_str(), err.to_string());
                    warn!(%issue, "skipping canonical series");
                    issues.push(issue);
                }
            }
        }

        Ok(ParsedSource {
            adapter: Self::NAME,
            fragments,
            issues,
        })
    }
}
