use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::errors::{ParserError, RecordIssue};
use crate::model::{AcceptanceStatistics, FragmentRole, ParsedSource, SeriesFragment};
use crate::registry::SourceAdapter;

use super::{de_count, de_year, describe_kind, entry_label};

/// The ccfddl acceptance feed (`allacc.yml`). It only names series by title, so
/// its fragments decorate series another source introduced.
pub struct CcfddlAcceptanceAdapter;

impl Default for CcfddlAcceptanceAdapter {
    fn default() -> Self {
        Self
    }
}

#[derive(Debug, Deserialize)]
struct AcceptanceEntry {
    title: String,
    #[serde(default)]
    accept_rates: Vec<AcceptanceRate>,
}

#[derive(Debug, Deserialize)]
struct AcceptanceRate {
    #[serde(deserialize_with = "de_year")]
    year: u16,
    #[serde(deserialize_with = "de_count")]
    submitted: u32,
    #[serde(deserialize_with = "de_count")]
    accepted: u32,
}

/// Titles the acceptance feed spells differently from the conference list.
const TITLE_ALIASES: &[(&str, &str)] = &[("UbiComp", "UbiComp/ISWC")];

impl CcfddlAcceptanceAdapter {
    const NAME: &'static str = "CCFDDL_ACCEPTANCE";

    fn canonical_title(title: &str) -> &str {
        TITLE_ALIASES
            .iter()
            .find(|(alias, _)| *alias == title.trim())
            .map_or(title, |&(_, canonical)| canonical)
    }

    fn to_fragment(entry: AcceptanceEntry) -> SeriesFragment {
        let title = Self::canonical_title(&entry.title);
        let mut fragment = SeriesFragment::new(title, FragmentRole::Enrichment);
        let acceptance: BTreeMap<u16, AcceptanceStatistics> = entry
            .accept_rates
            .into_iter()
            .map(|rate| {
                (
                    rate.year,
                    AcceptanceStatistics {
                        submitted: rate.submitted,
                        accepted: rate.accepted,
                    },
                )
            })
            .collect();
        fragment.acceptance = Some(acceptance);
        fragment
    }
}

impl SourceAdapter for CcfddlAcceptanceAdapter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(&self, payload: &Value) -> Result<ParsedSource, ParserError> {
        let entries = payload
            .as_array()
            .ok_or_else(|| ParserError::FormatMismatch {
                adapter: Self::NAME,
                reason: format!(
                    "expected a list of acceptance entries, found {}",
                    describe_kind(payload)
                ),
            })?;

        if !entries.iter().any(|entry| entry.get("accept_rates").is_some()) {
            return Err(ParserError::FormatMismatch {
                adapter: Self::NAME,
                reason: "no entry carries an `accept_rates` list".to_string(),
            });
        }

        let mut fragments = Vec::with_capacity(entries.len());
        let mut issues = Vec::new();
        for (index, entry) in entries.iter().enumerate() {
            match AcceptanceEntry::deserialize(entry) {
                Ok(parsed) => fragments.push(Self::to_fragment(parsed)),
                Err(err) => {
                    let issue = RecordIssue::new(
                        Self::NAME,
                        entry_label(entry, "title", index),
                        err.to_string(),
                    );
                    warn!(%issue, "skipping acceptance entry");
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
