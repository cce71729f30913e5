//! Time utilities: plan date parsing in a single schedule zone.
//!
//! Every date inside a plan is held as `DateTime<Tz>` in the schedule zone.
//! Naive strings are read as local wall-clock time there; strings carrying an
//! offset are converted into it.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ConfigError;

/// Zone used when nothing else is configured.
pub const DEFAULT_TIMEZONE: &str = "America/New_York";

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

pub fn parse_timezone(name: &str) -> Result<Tz, ConfigError> {
    name.parse()
        .map_err(|_| ConfigError::InvalidTimezone(name.to_string()))
}

/// Parse an ISO-8601 date, date-time, or RFC 3339 timestamp into `tz`.
pub fn parse_plan_datetime(text: &str, tz: Tz) -> Result<DateTime<Tz>, String> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&tz));
    }
    if let Ok(dt) = DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M%:z") {
        return Ok(dt.with_timezone(&tz));
    }

    let naive = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| "expected an ISO-8601 date or date-time".to_string())?;

    tz.from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| format!("{naive} does not exist in {tz} (DST gap)"))
}

/// A date as written in a plan file.
///
/// JSON only has strings; TOML can also carry native (unquoted) dates and
/// date-times, which arrive here already parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlanDate {
    Text(String),
    Toml(toml::value::Datetime),
}

impl PlanDate {
    /// ISO-8601 text for either form. TOML local dates and local date-times
    /// come out without an offset, so they land in the schedule zone.
    pub fn text(&self) -> String {
        match self {
            PlanDate::Text(s) => s.clone(),
            PlanDate::Toml(dt) => dt.to_string(),
        }
    }

    pub fn resolve(&self, tz: Tz) -> Result<DateTime<Tz>, String> {
        parse_plan_datetime(&self.text(), tz)
    }
}

impl From<String> for PlanDate {
    fn from(s: String) -> Self {
        PlanDate::Text(s)
    }
}

impl From<&str> for PlanDate {
    fn from(s: &str) -> Self {
        PlanDate::Text(s.to_string())
    }
}

/// Pin a zoned time to its numeric UTC offset for the wire.
pub fn to_fixed(dt: &DateTime<Tz>) -> DateTime<FixedOffset> {
    dt.with_timezone(&dt.offset().fix())
}

pub fn to_utc(dt: &DateTime<Tz>) -> DateTime<Utc> {
    dt.with_timezone(&Utc)
}

/// Serde helper: RFC 3339 with the numeric offset, whole seconds.
pub fn serialize_rfc3339<S: Serializer>(
    dt: &DateTime<FixedOffset>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use chrono_tz::America::New_York;

    #[test]
    fn naive_datetime_is_local() {
        let dt = parse_plan_datetime("2026-02-20T23:59", New_York).unwrap();
        // Feb is EST (UTC-5)
        assert_eq!(to_utc(&dt).to_rfc3339(), "2026-02-21T04:59:00+00:00");
    }

    #[test]
    fn bare_date_is_local_midnight() {
        let dt = parse_plan_datetime("2025-06-01", New_York).unwrap();
        assert_eq!(dt.hour(), 0);
        assert_eq!(dt.date_naive(), NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
    }

    #[test]
    fn offset_strings_keep_the_instant() {
        let dt = parse_plan_datetime("2025-06-01T12:00:00+00:00", New_York).unwrap();
        assert_eq!(dt.hour(), 8);
        assert_eq!(to_fixed(&dt).to_rfc3339(), "2025-06-01T08:00:00-04:00");
    }

    #[test]
    fn space_separator_and_fraction() {
        let dt = parse_plan_datetime("2025-06-01 10:15:30.250", New_York).unwrap();
        assert_eq!(dt.minute(), 15);
        assert_eq!(dt.nanosecond(), 250_000_000);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_plan_datetime("next tuesday", New_York).is_err());
        assert!(parse_plan_datetime("2025-13-01", New_York).is_err());
    }

    #[test]
    fn dst_gap_is_rejected() {
        assert!(parse_plan_datetime("2025-03-09T02:30", New_York).is_err());
    }

    #[test]
    fn timezone_names() {
        assert_eq!(parse_timezone("UTC").unwrap(), Tz::UTC);
        assert!(matches!(
            parse_timezone("Mars/Olympus"),
            Err(ConfigError::InvalidTimezone(_))
        ));
    }
}
