use std::sync::Arc;

use chrono::{DateTime, Utc};
use deadlines_parser::{ConferenceInstance, ConferenceSeries, DateExpr, Lifecycle, TimelineEvent};
use serde::Serialize;
use tracing::warn;

use crate::normalize::SeriesMap;
use crate::timezone::{parse_deadline, TimezoneError};

/// When the conference itself takes place. Display context only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ConferenceDate {
    Starts(DateTime<Utc>),
    Text(String),
    Tbd,
}

/// One deadline row: a single non-lifecycle event of one instance, with its
/// owning series and instance shared rather than copied.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedDeadline {
    pub series: Arc<ConferenceSeries>,
    pub instance: Arc<ConferenceInstance>,
    pub event: TimelineEvent,
    pub deadline: DateTime<Utc>,
    pub conference_date: ConferenceDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedEvent {
    pub series_key: String,
    pub series_title: String,
    pub year: u16,
    pub label: String,
    pub raw_date: String,
    pub reason: TimezoneError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expansion {
    pub deadlines: Vec<ExpandedDeadline>,
    pub skipped: Vec<SkippedEvent>,
}

impl Expansion {
    fn extend(&mut self, other: Expansion) {
        self.deadlines.extend(other.deadlines);
        self.skipped.extend(other.skipped);
    }
}

pub fn expand(series: &Arc<ConferenceSeries>) -> Expansion {
    let mut expansion = Expansion::default();

    for instance in &series.instances {
        let conference_date = conference_date(series, instance);
        let zone = instance.timezone.as_deref();

        for event in &instance.timeline {
            if event.lifecycle().is_some() {
                continue;
            }
            let DateExpr::At(raw) = &event.date else {
                continue;
            };
            match parse_deadline(raw, zone) {
                Ok(deadline) => expansion.deadlines.push(ExpandedDeadline {
                    series: Arc::clone(series),
                    instance: Arc::clone(instance),
                    event: event.clone(),
                    deadline,
                    conference_date: conference_date.clone(),
                }),
                Err(reason) => {
                    warn!(
                        series = %series.key,
                        year = instance.year,
                        event = %event.label,
                        raw = %raw,
                        error = %reason,
                        "skipping event with malformed date"
                    );
                    expansion.skipped.push(SkippedEvent {
                        series_key: series.key.clone(),
                        series_title: series.title.clone(),
                        year: instance.year,
                        label: event.label.clone(),
                        raw_date: raw.clone(),
                        reason,
                    });
                }
            }
        }
    }

    expansion
}

pub fn expand_all(series: &SeriesMap) -> Expansion {
    let mut expansion = Expansion::default();
    for entry in series.values() {
        expansion.extend(expand(entry));
    }
    expansion
}

fn conference_date(series: &ConferenceSeries, instance: &ConferenceInstance) -> ConferenceDate {
    let start = instance
        .timeline
        .iter()
        .find(|event| event.lifecycle() == Some(Lifecycle::Start));

    match start.map(|event| &event.date) {
        Some(DateExpr::At(raw)) => match parse_deadline(raw, instance.timezone.as_deref()) {
            Ok(start) => ConferenceDate::Starts(start),
            Err(err) => {
                warn!(
                    series = %series.key,
                    year = instance.year,
                    error = %err,
                    "conference start date unreadable"
                );
                ConferenceDate::Tbd
            }
        },
        Some(DateExpr::Tbd) => ConferenceDate::Tbd,
        None => instance
            .date_text
            .clone()
            .map(ConferenceDate::Text)
            .unwrap_or(ConferenceDate::Tbd),
    }
}
