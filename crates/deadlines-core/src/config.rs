use std::collections::BTreeSet;

use deadlines_parser::RankGrade;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::time_format::{EtaMode, RelativeStyle};

/// Caller-supplied selection and rendering settings for one pipeline run.
///
/// Every field is optional in TOML:
///
/// ```toml
/// categories = ["Security", "Software Engineering"]
/// min_rank = "A"
/// exclude_titles = ["ACNS"]
/// include_titles = ["ESEM"]
/// eta_mode = "relative"
/// relative_style = "auto"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// `None` keeps every category.
    pub categories: Option<BTreeSet<String>>,
    pub min_rank: RankGrade,
    pub exclude_titles: BTreeSet<String>,
    pub include_titles: BTreeSet<String>,
    pub eta_mode: EtaMode,
    pub relative_style: RelativeStyle,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            categories: None,
            // The empty unranked grade is the floor, so nothing is dropped.
            min_rank: RankGrade::default(),
            exclude_titles: BTreeSet::new(),
            include_titles: BTreeSet::new(),
            eta_mode: EtaMode::default(),
            relative_style: RelativeStyle::default(),
        }
    }
}

impl RunConfig {
    /// Grades are matched case-insensitively. A label outside A*/A/B/C still
    /// loads, as the unranked floor, but is logged since it keeps everything.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        if let RankGrade::Unranked(label) = &config.min_rank {
            if !label.is_empty() {
                warn!(min_rank = %label, "unknown min_rank grade, no series will be dropped by rank");
            }
        }
        Ok(config)
    }
}
