pub mod errors;
pub mod formats;
pub mod model;
mod registry;

pub use errors::{AdapterAttempt, ParserError, RecordIssue};
pub use formats::{decode_payload, PayloadEncoding};
pub use model::{
    normalize_series_name, series_key, AcceptanceStatistics, ConferenceInstance, ConferenceSeries,
    DateExpr, FragmentRole, Lifecycle, ParsedSource, RankGrade, SeriesFragment, TimelineEvent,
};
pub use registry::{parse_source, parse_with_adapters, SourceAdapter};

#[cfg(test)]
mod tests;
