use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::errors::{ParserError, RecordIssue};
use crate::model::{
    ConferenceInstance, DateExpr, FragmentRole, ParsedSource, SeriesFragment, TimelineEvent,
};
use crate::registry::SourceAdapter;

use super::{clean_optional, collect_rankings, de_year, describe_kind, entry_label};

pub const ABSTRACT_DEADLINE: &str = "Abstract deadline";
pub const SUBMISSION_DEADLINE: &str = "Submission deadline";

/// The flat ccfddl conference list (`allconf.yml`): a list of series, each with
/// `rank.core`, a short `sub` code and `confs[]` carrying a shared timezone.
pub struct CcfddlConferenceAdapter;

impl Default for CcfddlConferenceAdapter {
    fn default() -> Self {
        Self
    }
}

#[derive(Debug, Deserialize)]
struct CcfddlEntry {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    rank: BTreeMap<String, Option<String>>,
    #[serde(default)]
    confs: Vec<CcfddlConf>,
}

#[derive(Debug, Deserialize)]
struct CcfddlConf {
    #[serde(deserialize_with = "de_year")]
    year: u16,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    timeline: Vec<CcfddlTimeline>,
    #[serde(default)]
    timezone: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    place: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CcfddlTimeline {
    #[serde(default)]
    deadline: Option<String>,
    #[serde(default)]
    abstract_deadline: Option<String>,
    #[serde(default)]
    comment: Option<String>,
}

impl CcfddlConferenceAdapter {
    const NAME: &'static str = "CCFDDL_CONFERENCES";

    /// Maps the ccfddl subfield codes onto the category names the canonical
    /// source uses, so one allow-list filters both.
    pub fn category_for_code(code: &str) -> Option<&'static str> {
        let category = match code.trim().to_ascii_uppercase().as_str() {
            "DS" => "Computer Engineering",
            "NW" => "Networking and Distributed Systems",
            "SC" => "Security and Privacy",
            "SE" => "Software Engineering",
            "DB" => "Databases",
            "CT" => "Theoretical Computer Science",
            "CG" => "Computer Graphics",
            "AI" => "Artificial Intelligence",
            "HI" => "Computer Human Interaction",
            "MX" => "Other",
            _ => return None,
        };
        Some(category)
    }

    fn to_fragment(entry: CcfddlEntry) -> SeriesFragment {
        let mut fragment = SeriesFragment::new(&entry.title, FragmentRole::Primary);

        fragment.category = clean_optional(entry.sub).map(|code| {
            match Self::category_for_code(&code) {
                Some(category) => category.to_string(),
                None => {
                    warn!(
                        adapter = Self::NAME,
                        title = %fragment.title,
                        code = %code,
                        "unknown ccfddl category code, keeping it verbatim"
                    );
                    code
                }
            }
        });
        fragment.description = clean_optional(entry.description);
        fragment.rankings = Some(collect_rankings(entry.rank));
        fragment.instances = Some(entry.confs.into_iter().map(Self::to_instance).collect());
        fragment
    }

    fn to_instance(conf: CcfddlConf) -> ConferenceInstance {
        let mut timeline = Vec::with_capacity(conf.timeline.len());
        for item in conf.timeline {
            let comment = clean_optional(item.comment);
            if let Some(raw) = item.abstract_deadline {
                timeline.push(TimelineEvent::new(
                    ABSTRACT_DEADLINE,
                    DateExpr::from_raw(&raw),
                    comment.clone(),
                ));
            }
            let date = DateExpr::from_optional(item.deadline.as_deref());
            timeline.push(TimelineEvent::new(SUBMISSION_DEADLINE, date, comment));
        }

        ConferenceInstance {
            year: conf.year,
            location: clean_optional(conf.place),
            link: clean_optional(conf.link),
            timezone: clean_optional(conf.timezone),
            date_text: clean_optional(conf.date),
            timeline,
        }
    }
}

impl SourceAdapter for CcfddlConferenceAdapter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(&self, payload: &Value) -> Result<ParsedSource, ParserError> {
        let entries = payload
            .as_array()
            .ok_or_else(|| ParserError::FormatMismatch {
                adapter: Self::NAME,
                reason: format!("expected a list of series, found {}", describe_kind(payload)),
            })?;

        if !entries.is_empty() && !entries.iter().any(|entry| entry.get("confs").is_some()) {
            return Err(ParserError::FormatMismatch {
                adapter: Self::NAME,
                reason: "no entry carries a `confs` list".to_string(),
            });
        }

        let mut fragments = Vec::with_capacity(entries.len());
        let mut issues = Vec::new();
        for (index, entry) in entries.iter().enumerate() {
            match CcfddlEntry::deserialize(entry) {
                Ok(parsed) => fragments.push(Self::to_fragment(parsed)),
                Err(err) => {
                    let issue = RecordIssue::new(
                        Self::NAME,
                        entry_label(entry, "title", index),
                        err.to_string(),
                    );
                    warn!(%issue, "skipping ccfddl series");
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
