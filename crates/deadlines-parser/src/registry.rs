use serde_json::Value;
use tracing::debug;

use crate::errors::{AdapterAttempt, ParserError};
use crate::formats::{CcfddlAcceptanceAdapter, CcfddlConferenceAdapter, CanonicalAdapter};
use crate::model::ParsedSource;

pub trait SourceAdapter {
    fn name(&self) -> &'static str;
    fn parse(&self, payload: &Value) -> Result<ParsedSource, ParserError>;
}

pub fn parse_source(payload: &Value) -> Result<ParsedSource, ParserError> {
    let canonical = CanonicalAdapter;
    let conferences = CcfddlConferenceAdapter;
    let acceptance = CcfddlAcceptanceAdapter;
    let adapters: [&dyn SourceAdapter; 3] = [&canonical, &conferences, &acceptance];
    parse_with_adapters(payload, &adapters)
}

pub fn parse_with_adapters(
    payload: &Value,
    adapters: &[&dyn SourceAdapter],
) -> Result<ParsedSource, ParserError> {
    let mut attempts = Vec::new();

    for adapter in adapters {
        match adapter.parse(payload) {
            Ok(parsed) => {
                debug!(
                    adapter = adapter.name(),
                    fragments = parsed.fragments.len(),
                    issues = parsed.issues.len(),
                    "payload routed to adapter"
                );
                return Ok(parsed);
            }
            Err(ParserError::FormatMismatch { reason, .. }) => {
                attempts.push(AdapterAttempt::new(adapter.name(), reason));
            }
            Err(err) => return Err(err),
        }
    }

    Err(ParserError::NoMatchingAdapter { attempts })
}
