pub mod config;
pub mod error;
pub mod expand;
pub mod filters;
pub mod normalize;
pub mod pipeline;
pub mod time_format;
pub mod timezone;

pub use config::RunConfig;
pub use error::{PipelineError, Result};
pub use expand::{expand, expand_all, ConferenceDate, ExpandedDeadline, Expansion, SkippedEvent};
pub use normalize::{normalize, NormalizedSnapshot, SeriesMap, SourceIssue};
pub use filters::{exclude_titles, filter_category, filter_rank, include_titles, split_at};
pub use pipeline::{apply_series_filters, run, DeadlineReport, Eta, ReportRow, Snapshot};
pub use time_format::{
    format_countdown, format_eta, format_relative, Countdown, EtaMode, RelativeStyle,
};
pub use timezone::{parse_deadline, DeadlineZone, TimezoneError};

pub use deadlines_parser::{
    AcceptanceStatistics, ConferenceInstance, ConferenceSeries, DateExpr, RankGrade,
    TimelineEvent,
};
