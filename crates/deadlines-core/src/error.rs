// crates/deadlines-core/src/error.rs

use deadlines_parser::ParserError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Source #{index} could not be normalized: {source}")]
    Source {
        index: usize,
        #[source]
        source: ParserError,
    },

    #[error("Configuration is invalid: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
