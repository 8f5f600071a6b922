use chrono::{DateTime, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use deadlines_core::{ConferenceDate, DeadlineReport, ReportRow};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct JsonReport {
    now: DateTime<Utc>,
    upcoming: Vec<ReportRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    past: Option<Vec<ReportRow>>,
    skipped_events: Vec<JsonSkipped>,
    source_issues: Vec<String>,
}

#[derive(Debug, Serialize)]
struct JsonSkipped {
    key: String,
    series: String,
    year: u16,
    event: String,
    raw_date: String,
    reason: String,
}

pub fn report_json(report: &DeadlineReport, include_past: bool) -> serde_json::Result<String> {
    let view = JsonReport {
        now: report.now,
        upcoming: report.upcoming_rows(),
        past: include_past.then(|| report.past_rows()),
        skipped_events: report
            .skipped_events
            .iter()
            .map(|skipped| JsonSkipped {
                key: skipped.series_key.clone(),
                series: skipped.series_title.clone(),
                year: skipped.year,
                event: skipped.label.clone(),
                raw_date: skipped.raw_date.clone(),
                reason: skipped.reason.to_string(),
            })
            .collect(),
        source_issues: report.source_issues.iter().map(ToString::to_string).collect(),
    };
    serde_json::to_string_pretty(&view)
}

pub fn deadline_table(rows: &[ReportRow]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Conference",
            "Event",
            "Deadline (UTC)",
            "Time left",
            "Rank",
            "Category",
            "When / where",
            "Acceptance",
        ]);

    for row in rows {
        let event = match &row.comment {
            Some(comment) => format!("{} ({comment})", row.event),
            None => row.event.clone(),
        };
        let when = match &row.conference_date {
            ConferenceDate::Starts(start) => start.format("%Y-%m-%d").to_string(),
            ConferenceDate::Text(text) => text.clone(),
            ConferenceDate::Tbd => "TBD".to_string(),
        };
        let when_where = match &row.location {
            Some(location) => format!("{when}\n{location}"),
            None => when,
        };
        table.add_row(vec![
            format!("{} {}", row.title, row.year),
            event,
            row.deadline.format("%Y-%m-%d %H:%M:%S").to_string(),
            row.display.clone(),
            row.rank.clone(),
            row.category.clone(),
            when_where,
            row.acceptance.clone(),
        ]);
    }
    table
}

/// Skipped events and source issues, one line each. Empty when the run was clean.
pub fn problem_lines(report: &DeadlineReport) -> Vec<String> {
    let skipped = report.skipped_events.iter().map(|skipped| {
        format!(
            "skipped {} {} '{}': {}",
            skipped.series_title, skipped.year, skipped.label, skipped.reason
        )
    });
    let issues = report
        .source_issues
        .iter()
        .map(|issue| format!("source issue: {issue}"));
    skipped.chain(issues).collect()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use deadlines_core::{run, RunConfig, Snapshot};
    use serde_json::json;

    use super::*;

    fn report() -> DeadlineReport {
        let snapshot = Snapshot::new(vec![json!({
            "x": {
                "name": "FSE",
                "category": "Software Engineering",
                "rankings": { "core": "A" },
                "conferences": {
                    "2026": {
                        "location": "Montreal",
                        "timezone": "UTC",
                        "timeline": [
                            { "date": "2025-09-11 12:00:00", "description": "Submission deadline", "comment": "Research track" },
                            { "date": "2025-01-01 12:00:00", "description": "Abstract deadline" },
                            { "date": "someday", "description": "Notification" },
                            { "date": "", "description": "Camera ready" }
                        ]
                    }
                }
            }
        })]);
        let now = Utc.with_ymd_and_hms(2025, 9, 10, 12, 0, 0).unwrap();
        run(&snapshot, &RunConfig::default(), now).unwrap()
    }

    #[test]
    fn json_view_hides_past_unless_requested() {
        let report = report();
        let without: serde_json::Value =
            serde_json::from_str(&report_json(&report, false).unwrap()).unwrap();
        assert!(without.get("past").is_none());
        assert_eq!(without["upcoming"][0]["display"], "1 days 00 hours 00 mins 00 s");
        assert_eq!(without["upcoming"][0]["eta"]["relative"], "in 1 day");
        assert_eq!(without["skipped_events"][0]["event"], "Notification");
        assert_eq!(without["skipped_events"][0]["series"], "FSE");
        assert_eq!(without["skipped_events"][0]["key"], "FSE [Software Engineering]");

        let with: serde_json::Value =
            serde_json::from_str(&report_json(&report, true).unwrap()).unwrap();
        assert_eq!(with["past"][0]["event"], "Abstract deadline");
    }

    #[test]
    fn table_lists_every_row() {
        let report = report();
        let table = deadline_table(&report.upcoming_rows());
        assert_eq!(table.row_iter().count(), 1);
        let cells: Vec<String> = table
            .row(0)
            .unwrap()
            .cell_iter()
            .map(|cell| cell.content())
            .collect();
        assert_eq!(cells[0], "FSE 2026");
        assert_eq!(cells[1], "Submission deadline (Research track)");
        assert_eq!(cells[4], "A");
        assert_eq!(cells[6], "TBD\nMontreal");
    }

    #[test]
    fn problems_cover_skipped_events() {
        let lines = problem_lines(&report());
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("skipped FSE 2026 'Notification'"));
        assert!(lines[1].starts_with("skipped FSE 2026 'Camera ready'"));
    }
}
