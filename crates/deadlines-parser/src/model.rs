use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::errors::RecordIssue;

pub const CONFERENCE_START: &str = "Conference start";
pub const CONFERENCE_END: &str = "Conference end";

/// CORE-style grade. Labels outside the known set keep their raw text and rank
/// strictly below `C`; they all compare equal to each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum RankGrade {
    AStar,
    A,
    B,
    C,
    Unranked(String),
}

impl RankGrade {
    pub fn ordinal(&self) -> i8 {
        match self {
            RankGrade::AStar => 0,
            RankGrade::A => -1,
            RankGrade::B => -2,
            RankGrade::C => -3,
            RankGrade::Unranked(_) => -4,
        }
    }

    /// True when `self` ranks at or above `minimum`.
    pub fn meets(&self, minimum: &RankGrade) -> bool {
        self.ordinal() >= minimum.ordinal()
    }

    pub fn label(&self) -> &str {
        match self {
            RankGrade::AStar => "A*",
            RankGrade::A => "A",
            RankGrade::B => "B",
            RankGrade::C => "C",
            RankGrade::Unranked(raw) => raw,
        }
    }
}

impl Default for RankGrade {
    fn default() -> Self {
        RankGrade::Unranked(String::new())
    }
}

impl From<&str> for RankGrade {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "A*" => RankGrade::AStar,
            "A" => RankGrade::A,
            "B" => RankGrade::B,
            "C" => RankGrade::C,
            _ => RankGrade::Unranked(value.trim().to_string()),
        }
    }
}

impl From<String> for RankGrade {
    fn from(value: String) -> Self {
        RankGrade::from(value.as_str())
    }
}

impl From<RankGrade> for String {
    fn from(value: RankGrade) -> Self {
        value.label().to_string()
    }
}

impl<'de> serde::Deserialize<'de> for RankGrade {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(RankGrade::from).unwrap_or_default())
    }
}

impl fmt::Display for RankGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankGrade::Unranked(raw) if raw.is_empty() => f.write_str("unranked"),
            other => f.write_str(other.label()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AcceptanceStatistics {
    pub submitted: u32,
    pub accepted: u32,
}

impl AcceptanceStatistics {
    pub fn rate(&self) -> Option<f64> {
        if self.submitted == 0 {
            return None;
        }
        Some(f64::from(self.accepted) / f64::from(self.submitted))
    }
}

impl fmt::Display for AcceptanceStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rate() {
            Some(rate) => write!(
                f,
                "{:.1}% ({}/{})",
                (rate * 1000.0).round() / 10.0,
                self.accepted,
                self.submitted
            ),
            None => write!(f, "n/a ({}/{})", self.accepted, self.submitted),
        }
    }
}

/// Raw date of a timeline event, kept unparsed until expansion so the
/// instance timezone can be applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DateExpr {
    Tbd,
    At(String),
}

impl DateExpr {
    /// Only an explicit `TBD` marker defers an event. Blank text stays a date
    /// so expansion reports it instead of dropping it.
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.to_ascii_uppercase().contains("TBD") {
            DateExpr::Tbd
        } else {
            DateExpr::At(trimmed.to_string())
        }
    }

    /// A timeline entry with no date field at all.
    pub fn from_optional(raw: Option<&str>) -> Self {
        DateExpr::from_raw(raw.unwrap_or_default())
    }

    pub fn is_tbd(&self) -> bool {
        matches!(self, DateExpr::Tbd)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEvent {
    pub label: String,
    pub date: DateExpr,
    pub comment: Option<String>,
}

impl TimelineEvent {
    pub fn new(label: impl Into<String>, date: DateExpr, comment: Option<String>) -> Self {
        Self {
            label: label.into(),
            date,
            comment,
        }
    }

    /// Conference start/end mark the event's own dates rather than a deadline.
    pub fn lifecycle(&self) -> Option<Lifecycle> {
        match self.label.trim() {
            CONFERENCE_START => Some(Lifecycle::Start),
            CONFERENCE_END => Some(Lifecycle::End),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConferenceInstance {
    pub year: u16,
    pub location: Option<String>,
    pub link: Option<String>,
    /// IANA name, `UTC±H[:MM]` or `AoE`. Absent means `AoE`.
    pub timezone: Option<String>,
    /// Free-text conference dates from sources that carry no start event.
    pub date_text: Option<String>,
    pub timeline: Vec<TimelineEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConferenceSeries {
    pub key: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub link: Option<String>,
    pub rank: RankGrade,
    pub rankings: BTreeMap<String, String>,
    pub acceptance: BTreeMap<u16, AcceptanceStatistics>,
    pub instances: Vec<Arc<ConferenceInstance>>,
}

impl ConferenceSeries {
    pub fn acceptance_summary(&self) -> String {
        if self.acceptance.is_empty() {
            return "no data".to_string();
        }
        self.acceptance
            .iter()
            .map(|(year, stats)| format!("{year}: {stats}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentRole {
    /// May introduce a new series.
    Primary,
    /// Only decorates series another source already introduced.
    Enrichment,
}

/// One adapter's partial view of a series. `None` fields are left untouched
/// when the fragment is merged.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesFragment {
    pub title: String,
    pub role: FragmentRole,
    pub description: Option<String>,
    pub category: Option<String>,
    pub link: Option<String>,
    pub rankings: Option<BTreeMap<String, String>>,
    pub acceptance: Option<BTreeMap<u16, AcceptanceStatistics>>,
    pub instances: Option<Vec<ConferenceInstance>>,
}

impl SeriesFragment {
    pub fn new(title: &str, role: FragmentRole) -> Self {
        Self {
            title: normalize_series_name(title),
            role,
            description: None,
            category: None,
            link: None,
            rankings: None,
            acceptance: None,
            instances: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParsedSource {
    pub adapter: &'static str,
    pub fragments: Vec<SeriesFragment>,
    pub issues: Vec<RecordIssue>,
}

/// Map key of a series. A short title alone is not unique (FSE is both a
/// software engineering and a cryptography venue), so the category is part of
/// the identity whenever it is known.
pub fn series_key(title: &str, category: &str) -> String {
    if category.is_empty() {
        title.to_string()
    } else {
        format!("{title} [{category}]")
    }
}

/// Strips publisher prefixes and collapses whitespace so the same series
/// lines up across feeds.
pub fn normalize_series_name(name: &str) -> String {
    let words: Vec<&str> = name.split_whitespace().collect();
    let kept: Vec<&str> = words
        .iter()
        .copied()
        .filter(|word| !matches!(*word, "IEEE" | "ACM"))
        .collect();
    if kept.is_empty() {
        words.join(" ")
    } else {
        kept.join(" ")
    }
}
