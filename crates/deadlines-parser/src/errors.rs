use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct AdapterAttempt {
    pub adapter: &'static str,
    pub message: String,
}

impl AdapterAttempt {
    pub fn new(adapter: &'static str, message: impl Into<String>) -> Self {
        Self {
            adapter,
            message: message.into(),
        }
    }
}

impl fmt::Display for AdapterAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.adapter, self.message)
    }
}

/// A single entry an adapter could not turn into a fragment. The rest of the
/// payload is still used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordIssue {
    pub adapter: &'static str,
    pub record: String,
    pub message: String,
}

impl RecordIssue {
    pub fn new(adapter: &'static str, record: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            adapter,
            record: record.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for RecordIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} record {}: {}", self.adapter, self.record, self.message)
    }
}

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("{adapter} format mismatch: {reason}")]
    FormatMismatch {
        adapter: &'static str,
        reason: String,
    },

    #[error("payload is not valid JSON: {source}")]
    Json {
        #[source]
        source: serde_json::Error,
    },

    #[error("payload is not valid YAML: {source}")]
    Yaml {
        #[source]
        source: serde_yaml::Error,
    },

    #[error("no adapter recognized this payload; attempts: {attempts:?}")]
    NoMatchingAdapter { attempts: Vec<AdapterAttempt> },
}
