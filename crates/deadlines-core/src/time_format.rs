//! Human-readable distance between a deadline and "now".
//!
//! Two modes: a coarse relative phrase ("in 3 weeks", "2 days ago") and a
//! fine countdown ("1 days 04 hours 09 mins 30 s") for deadlines still ahead.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MILLIS_PER_SECOND: u64 = 1_000;
const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 60 * 60;
const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EtaMode {
    #[default]
    Countdown,
    Relative,
}

/// `Always` keeps numbers ("in 1 day"); `Auto` prefers words where English
/// has them ("tomorrow", "last week").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelativeStyle {
    #[default]
    Always,
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Year,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
}

impl Unit {
    // Largest first; months and years are fixed-length approximations.
    const ALL: [(Unit, u64); 7] = [
        (Unit::Year, 365 * 24 * 60 * 60 * MILLIS_PER_SECOND),
        (Unit::Month, 30 * 24 * 60 * 60 * MILLIS_PER_SECOND),
        (Unit::Week, 7 * 24 * 60 * 60 * MILLIS_PER_SECOND),
        (Unit::Day, 24 * 60 * 60 * MILLIS_PER_SECOND),
        (Unit::Hour, 60 * 60 * MILLIS_PER_SECOND),
        (Unit::Minute, 60 * MILLIS_PER_SECOND),
        (Unit::Second, MILLIS_PER_SECOND),
    ];

    fn name(self) -> &'static str {
        match self {
            Unit::Year => "year",
            Unit::Month => "month",
            Unit::Week => "week",
            Unit::Day => "day",
            Unit::Hour => "hour",
            Unit::Minute => "minute",
            Unit::Second => "second",
        }
    }

    fn phrase(self, value: u64, future: bool, style: RelativeStyle) -> String {
        if style == RelativeStyle::Auto && value == 1 {
            match (self, future) {
                (Unit::Day, true) => return "tomorrow".to_string(),
                (Unit::Day, false) => return "yesterday".to_string(),
                (Unit::Week | Unit::Month | Unit::Year, true) => {
                    return format!("next {}", self.name())
                }
                (Unit::Week | Unit::Month | Unit::Year, false) => {
                    return format!("last {}", self.name())
                }
                _ => {}
            }
        }

        let plural = if value == 1 { "" } else { "s" };
        if future {
            format!("in {value} {}{plural}", self.name())
        } else {
            format!("{value} {}{plural} ago", self.name())
        }
    }
}

/// Coarse relative phrase. The sign follows `deadline - now`.
pub fn format_relative(deadline: DateTime<Utc>, now: DateTime<Utc>, style: RelativeStyle) -> String {
    let delta_ms = (deadline - now).num_milliseconds();
    let magnitude = delta_ms.unsigned_abs();

    for (unit, threshold) in Unit::ALL {
        if magnitude >= threshold {
            return unit.phrase(magnitude / threshold, delta_ms > 0, style);
        }
    }
    "now".to_string()
}

/// Remaining time split by successive floor division into days, hours,
/// minutes and seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Countdown {
    pub fn from_seconds(total: i64) -> Self {
        let days = total / SECONDS_PER_DAY;
        let rest = total % SECONDS_PER_DAY;
        let hours = rest / SECONDS_PER_HOUR;
        let rest = rest % SECONDS_PER_HOUR;
        Self {
            days,
            hours,
            minutes: rest / SECONDS_PER_MINUTE,
            seconds: rest % SECONDS_PER_MINUTE,
        }
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show_hours = self.days > 0 || self.hours > 0;
        let show_minutes = show_hours || self.minutes > 0;

        if self.days > 0 {
            write!(f, "{} days ", self.days)?;
        }
        if show_hours {
            write!(f, "{:02} hours ", self.hours)?;
        }
        if show_minutes {
            write!(f, "{:02} mins ", self.minutes)?;
        }
        write!(f, "{:02} s", self.seconds)
    }
}

/// Fine countdown while at least a whole second remains; otherwise the
/// coarse phrase, which reports the deadline as passed.
pub fn format_countdown(deadline: DateTime<Utc>, now: DateTime<Utc>, style: RelativeStyle) -> String {
    let remaining = (deadline - now).num_seconds();
    if remaining < 1 {
        return format_relative(deadline, now, style);
    }
    Countdown::from_seconds(remaining).to_string()
}

pub fn format_eta(
    deadline: DateTime<Utc>,
    now: DateTime<Utc>,
    mode: EtaMode,
    style: RelativeStyle,
) -> String {
    match mode {
        EtaMode::Countdown => format_countdown(deadline, now, style),
        EtaMode::Relative => format_relative(deadline, now, style),
    }
}
