//! Deadline timezones: `AoE` substitution, fixed UTC offsets and IANA zones.

use std::str::FromStr;

use chrono::offset::LocalResult;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset as _, TimeZone as _, Utc};
use chrono_tz::Tz;
use thiserror::Error;

pub const AOE: &str = "AoE";
pub const AOE_OFFSET: &str = "UTC-12";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimezoneError {
    #[error("unknown timezone '{0}'")]
    UnknownZone(String),
    #[error("invalid UTC offset in '{0}'")]
    InvalidOffset(String),
    #[error("cannot parse date '{raw}'")]
    MalformedDate { raw: String },
    #[error("local time {local} does not exist in {zone}")]
    NonexistentLocalTime { local: NaiveDateTime, zone: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeadlineZone {
    Fixed(FixedOffset),
    Named(Tz),
}

/// `AoE` is shorthand for UTC-12 and must be replaced before anything parses the zone.
pub fn substitute_aoe(zone: &str) -> &str {
    if zone.trim().eq_ignore_ascii_case(AOE) {
        AOE_OFFSET
    } else {
        zone.trim()
    }
}

impl FromStr for DeadlineZone {
    type Err = TimezoneError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let zone = substitute_aoe(raw);
        let prefix = zone.get(..3);
        if prefix.is_some_and(|p| p.eq_ignore_ascii_case("utc") || p.eq_ignore_ascii_case("gmt")) {
            let rest = zone[3..].trim();
            if rest.is_empty() {
                return Ok(DeadlineZone::Fixed(Utc.fix()));
            }
            return parse_offset(rest)
                .map(DeadlineZone::Fixed)
                .ok_or_else(|| TimezoneError::InvalidOffset(raw.to_string()));
        }
        zone.parse::<Tz>()
            .map(DeadlineZone::Named)
            .map_err(|_| TimezoneError::UnknownZone(raw.to_string()))
    }
}

// Accepts `+8`, `-12`, `+05:30` and `+0530`.
fn parse_offset(raw: &str) -> Option<FixedOffset> {
    let (sign, digits) = match raw.chars().next()? {
        '+' => (1, &raw[1..]),
        '-' => (-1, &raw[1..]),
        _ => return None,
    };
    let (hours, minutes) = match digits.split_once(':') {
        Some((h, m)) => (h, m),
        None if digits.len() == 4 && digits.is_ascii() => digits.split_at(2),
        None => (digits, "0"),
    };
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if !(0..=14).contains(&hours) || !(0..60).contains(&minutes) {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

impl DeadlineZone {
    pub fn resolve(&self, local: NaiveDateTime) -> Result<DateTime<Utc>, TimezoneError> {
        match self {
            DeadlineZone::Fixed(offset) => {
                resolve_local(offset.from_local_datetime(&local), local, offset.to_string())
            }
            DeadlineZone::Named(tz) => {
                resolve_local(tz.from_local_datetime(&local), local, tz.name().to_string())
            }
        }
    }
}

fn resolve_local<T: chrono::TimeZone>(
    result: LocalResult<DateTime<T>>,
    local: NaiveDateTime,
    zone: String,
) -> Result<DateTime<Utc>, TimezoneError> {
    match result {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        // Ambiguous wall-clock times resolve to the earlier instant.
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(TimezoneError::NonexistentLocalTime { local, zone }),
    }
}

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%:z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%d %H:%M%:z",
];

const LOCAL_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Parses `<date>` in `<zone>` into an absolute instant. Dates that carry
/// their own offset ignore `zone`; a missing zone means `AoE`. A bare date
/// is taken as the last second of that day.
pub fn parse_deadline(raw: &str, zone: Option<&str>) -> Result<DateTime<Utc>, TimezoneError> {
    let trimmed = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, fmt) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    let local = parse_local(trimmed)?;
    let zone: DeadlineZone = zone.unwrap_or(AOE).parse()?;
    zone.resolve(local)
}

fn parse_local(trimmed: &str) -> Result<NaiveDateTime, TimezoneError> {
    for fmt in LOCAL_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(23, 59, 59))
        .ok_or_else(|| TimezoneError::MalformedDate {
            raw: trimmed.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw)
            .expect("valid rfc3339")
            .with_timezone(&Utc)
    }

    #[test]
    fn aoe_matches_utc_minus_twelve() {
        let aoe = parse_deadline("2025-03-14 23:59:59", Some("AoE")).unwrap();
        let fixed = parse_deadline("2025-03-14 23:59:59", Some("UTC-12")).unwrap();
        assert_eq!(aoe, fixed);
        assert_eq!(aoe, utc("2025-03-15T11:59:59Z"));
    }

    #[test]
    fn missing_zone_defaults_to_aoe() {
        let implicit = parse_deadline("2025-03-14 23:59", None).unwrap();
        assert_eq!(implicit, utc("2025-03-15T11:59:00Z"));
    }

    #[test]
    fn explicit_offsets_win_over_zone() {
        let parsed = parse_deadline("2025-03-14 23:59:59-12:00", Some("Europe/Berlin")).unwrap();
        assert_eq!(parsed, utc("2025-03-15T11:59:59Z"));
        let rfc = parse_deadline("2025-03-14T10:00:00+02:00", None).unwrap();
        assert_eq!(rfc, utc("2025-03-14T08:00:00Z"));
    }

    #[test]
    fn named_zones_follow_daylight_saving() {
        let summer = parse_deadline("2025-07-01 12:00:00", Some("Europe/Berlin")).unwrap();
        assert_eq!(summer, utc("2025-07-01T10:00:00Z"));
        let winter = parse_deadline("2025-01-15 12:00:00", Some("Europe/Berlin")).unwrap();
        assert_eq!(winter, utc("2025-01-15T11:00:00Z"));
    }

    #[test]
    fn fixed_offset_variants() {
        let plus = parse_deadline("2025-01-01 00:00", Some("UTC+05:30")).unwrap();
        assert_eq!(plus, utc("2024-12-31T18:30:00Z"));
        let compact = parse_deadline("2025-01-01 00:00", Some("GMT+0530")).unwrap();
        assert_eq!(compact, plus);
        let bare = parse_deadline("2025-01-01 00:00", Some("UTC")).unwrap();
        assert_eq!(bare, utc("2025-01-01T00:00:00Z"));
    }

    #[test]
    fn bare_dates_mean_end_of_day() {
        let parsed = parse_deadline("2025-05-02", Some("UTC")).unwrap();
        assert_eq!(parsed, utc("2025-05-02T23:59:59Z"));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            parse_deadline("sometime in spring", Some("UTC")),
            Err(TimezoneError::MalformedDate { .. })
        ));
        assert!(matches!(
            parse_deadline("2025-01-01 00:00", Some("Mars/Olympus")),
            Err(TimezoneError::UnknownZone(_))
        ));
        assert!(matches!(
            parse_deadline("2025-01-01 00:00", Some("UTC+99")),
            Err(TimezoneError::InvalidOffset(_))
        ));
    }

    #[test]
    fn spring_forward_gap_is_reported() {
        let err = parse_deadline("2025-03-30 02:30:00", Some("Europe/Berlin")).unwrap_err();
        assert!(matches!(err, TimezoneError::NonexistentLocalTime { .. }));
    }
}
