use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::RunConfig;
use crate::error::Result;
use crate::expand::{expand_all, ConferenceDate, ExpandedDeadline, SkippedEvent};
use crate::filters::{exclude_titles, filter_category, filter_rank, include_titles, split_at};
use crate::normalize::{normalize, SeriesMap, SourceIssue};
use crate::time_format::{format_countdown, format_eta, format_relative, EtaMode, RelativeStyle};

/// Raw payloads in the order they were supplied. Later payloads override
/// earlier ones when they describe the same series.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub sources: Vec<Value>,
}

impl Snapshot {
    pub fn new(sources: Vec<Value>) -> Self {
        Self { sources }
    }
}

/// Both renderings of the distance to a deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Eta {
    pub relative: String,
    pub countdown: String,
}

#[derive(Debug, Clone)]
pub struct DeadlineReport {
    pub now: DateTime<Utc>,
    /// Ascending by deadline.
    pub upcoming: Vec<ExpandedDeadline>,
    /// Ascending by deadline; see [`DeadlineReport::past_most_recent_first`].
    pub past: Vec<ExpandedDeadline>,
    pub skipped_events: Vec<SkippedEvent>,
    pub source_issues: Vec<SourceIssue>,
    pub eta_mode: EtaMode,
    pub relative_style: RelativeStyle,
}

/// Flat, serializable view of one deadline for presenters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub key: String,
    pub title: String,
    pub year: u16,
    pub event: String,
    pub comment: Option<String>,
    pub deadline: DateTime<Utc>,
    pub timezone: Option<String>,
    pub category: String,
    pub rank: String,
    pub location: Option<String>,
    pub link: Option<String>,
    pub conference_date: ConferenceDate,
    pub acceptance: String,
    pub passed: bool,
    pub eta: Eta,
    /// The rendering selected by the run's `eta_mode`.
    pub display: String,
}

impl DeadlineReport {
    pub fn past_most_recent_first(&self) -> impl Iterator<Item = &ExpandedDeadline> {
        self.past.iter().rev()
    }

    pub fn eta(&self, row: &ExpandedDeadline) -> Eta {
        Eta {
            relative: format_relative(row.deadline, self.now, self.relative_style),
            countdown: format_countdown(row.deadline, self.now, self.relative_style),
        }
    }

    fn row(&self, deadline: &ExpandedDeadline) -> ReportRow {
        let series = &deadline.series;
        let instance = &deadline.instance;
        ReportRow {
            key: series.key.clone(),
            title: series.title.clone(),
            year: instance.year,
            event: deadline.event.label.clone(),
            comment: deadline.event.comment.clone(),
            deadline: deadline.deadline,
            timezone: instance.timezone.clone(),
            category: series.category.clone(),
            rank: series.rank.to_string(),
            location: instance.location.clone(),
            link: instance.link.clone().or_else(|| series.link.clone()),
            conference_date: deadline.conference_date.clone(),
            acceptance: series.acceptance_summary(),
            passed: deadline.deadline < self.now,
            eta: self.eta(deadline),
            display: format_eta(deadline.deadline, self.now, self.eta_mode, self.relative_style),
        }
    }

    pub fn upcoming_rows(&self) -> Vec<ReportRow> {
        self.upcoming.iter().map(|d| self.row(d)).collect()
    }

    pub fn past_rows(&self) -> Vec<ReportRow> {
        self.past_most_recent_first().map(|d| self.row(d)).collect()
    }

    /// Upcoming rows soonest first, then past rows most recent first.
    pub fn rows(&self) -> Vec<ReportRow> {
        let mut rows = self.upcoming_rows();
        rows.extend(self.past_rows());
        rows
    }
}

/// Stages 1-4 in their fixed order. The include stage draws from `all`, so it
/// can restore anything an earlier stage dropped.
pub fn apply_series_filters(all: &SeriesMap, config: &RunConfig) -> SeriesMap {
    let mut kept = match &config.categories {
        Some(categories) => filter_category(all, categories),
        None => all.clone(),
    };
    kept = filter_rank(&kept, &config.min_rank);
    if !config.exclude_titles.is_empty() {
        kept = exclude_titles(&kept, &config.exclude_titles);
    }
    if !config.include_titles.is_empty() {
        kept = include_titles(&kept, all, &config.include_titles);
    }
    debug!(total = all.len(), kept = kept.len(), "series filters applied");
    kept
}

/// One full refresh. Holds no state between calls, so running it twice over
/// the same inputs yields the same report.
pub fn run(snapshot: &Snapshot, config: &RunConfig, now: DateTime<Utc>) -> Result<DeadlineReport> {
    let normalized = normalize(&snapshot.sources)?;
    let selected = apply_series_filters(&normalized.series, config);

    let expansion = expand_all(&selected);
    let mut deadlines = expansion.deadlines;
    // `sort_by_key` is stable: equal instants keep expansion order.
    deadlines.sort_by_key(|row| row.deadline);
    let (upcoming, past) = split_at(deadlines, now);

    info!(
        sources = snapshot.sources.len(),
        series = selected.len(),
        upcoming = upcoming.len(),
        past = past.len(),
        skipped = expansion.skipped.len(),
        issues = normalized.issues.len(),
        "deadline report built"
    );

    Ok(DeadlineReport {
        now,
        upcoming,
        past,
        skipped_events: expansion.skipped,
        source_issues: normalized.issues,
        eta_mode: config.eta_mode,
        relative_style: config.relative_style,
    })
}
