use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::error::{DashError, Result};

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Uses the `iana-time-zone` crate directly – no subprocess calls.
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

/// Resolve the `"auto"` sentinel to the system timezone; other names pass
/// through unchanged.
pub fn resolve_timezone_name(name: &str) -> String {
    if name.eq_ignore_ascii_case("auto") {
        get_system_timezone()
    } else {
        name.to_string()
    }
}

// ── TimezoneHandler ───────────────────────────────────────────────────────────

/// Offset-bearing layouts tried after RFC 3339; `%z` accepts `+hhmm` and
/// `+hh:mm`.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
];

/// Naive layouts tried after the offset-bearing forms, most specific first.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
];

/// Parses event timestamps and projects them onto the display timezone.
///
/// Every calendar bucket the dashboard computes (year, month, weekday, hour)
/// is derived from the wall-clock value this handler returns.
#[derive(Debug, Clone, Copy)]
pub struct TimezoneHandler {
    display_tz: Tz,
}

impl Default for TimezoneHandler {
    fn default() -> Self {
        Self { display_tz: Tz::UTC }
    }
}

impl TimezoneHandler {
    /// Create a handler for `tz_name`, failing on names that are not
    /// recognised IANA identifiers.
    pub fn try_new(tz_name: &str) -> Result<Self> {
        tz_name
            .parse::<Tz>()
            .map(|display_tz| Self { display_tz })
            .map_err(|_| DashError::InvalidTimezone(tz_name.to_string()))
    }

    pub fn display_tz(&self) -> Tz {
        self.display_tz
    }

    /// Parse a timestamp that carries an explicit offset into a UTC instant.
    ///
    /// Handles RFC 3339 (including the `Z` suffix), the `"... UTC"` suffix
    /// used by clickstream exports and ISO 8601 offsets with or without a
    /// colon or a separating space.
    pub fn parse_instant(&self, s: &str) -> Option<DateTime<Utc>> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        if let Some(stripped) = s.strip_suffix(" UTC") {
            return parse_naive(stripped).map(|naive| naive.and_utc());
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }

        OFFSET_FORMATS
            .iter()
            .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Parse any supported timestamp into a wall-clock value in the display
    /// timezone.
    ///
    /// Offset-bearing input is converted; naive input is taken to already be
    /// display-local.  Date-only input maps to midnight.  Returns `None` for
    /// empty or unrecognised text; never panics.
    pub fn parse_local(&self, s: &str) -> Option<NaiveDateTime> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Some(instant) = self.parse_instant(trimmed) {
            return Some(self.to_local(instant));
        }

        if let Some(naive) = parse_naive(trimmed) {
            return Some(naive);
        }

        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return date.and_hms_opt(0, 0, 0);
        }

        debug!("TimezoneHandler: could not parse timestamp \"{}\"", trimmed);
        None
    }

    /// Project a UTC instant onto the display timezone's wall clock.
    pub fn to_local(&self, dt: DateTime<Utc>) -> NaiveDateTime {
        dt.with_timezone(&self.display_tz).naive_local()
    }
}

fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone as _, Timelike};

    // ── new / try_new ────────────────────────────────────────────────────────

    #[test]
    fn test_try_new_valid_timezone() {
        let handler = TimezoneHandler::try_new("America/New_York").unwrap();
        assert_eq!(handler.display_tz(), Tz::America__New_York);
        assert_eq!(TimezoneHandler::default().display_tz(), Tz::UTC);
    }

    #[test]
    fn test_try_new_invalid_is_error() {
        let err = TimezoneHandler::try_new("Invalid/Timezone").unwrap_err();
        assert!(matches!(err, DashError::InvalidTimezone(_)));
    }

    // ── parse_instant ────────────────────────────────────────────────────────

    #[test]
    fn test_parse_instant_utc_suffix() {
        let handler = TimezoneHandler::default();
        let dt = handler.parse_instant("2020-09-24 11:57:06 UTC").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2020, 9, 24, 11, 57, 6).unwrap());
    }

    #[test]
    fn test_parse_instant_z_suffix() {
        let handler = TimezoneHandler::default();
        let dt = handler.parse_instant("2024-01-15T10:30:00Z").unwrap();
        assert_eq!(dt.hour(), 10);
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn test_parse_instant_with_offset() {
        let handler = TimezoneHandler::default();
        let dt = handler.parse_instant("2024-01-15T12:00:00+02:00").unwrap();
        assert_eq!(dt.hour(), 10);
        let dt = handler.parse_instant("2024-01-15 12:00:00 +0200").unwrap();
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn test_parse_instant_offset_without_colon() {
        let handler = TimezoneHandler::default();
        let dt = handler.parse_instant("2020-09-24T11:57:06.123+0700").unwrap();
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (4, 57, 6));
        assert_eq!(dt.timestamp_subsec_millis(), 123);

        let dt = handler.parse_instant("2020-09-24T11:57:06+0700").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2020, 9, 24, 4, 57, 6).unwrap());

        let dt = handler.parse_instant("2020-09-24 11:57:06-0500").unwrap();
        assert_eq!(dt.hour(), 16);
    }

    #[test]
    fn test_parse_local_offset_without_colon_lands_in_time_buckets() {
        let handler = TimezoneHandler::try_new("Asia/Jakarta").unwrap();
        let t = handler.parse_local("2020-09-24T11:57:06.123+0700").unwrap();
        assert_eq!((t.day(), t.hour(), t.minute()), (24, 11, 57));
    }

    #[test]
    fn test_parse_instant_naive_is_none() {
        let handler = TimezoneHandler::default();
        assert!(handler.parse_instant("2024-01-15 12:00:00").is_none());
    }

    // ── parse_local ──────────────────────────────────────────────────────────

    #[test]
    fn test_parse_local_utc_display() {
        let handler = TimezoneHandler::default();
        let t = handler.parse_local("2020-09-24 11:57:06 UTC").unwrap();
        assert_eq!((t.year(), t.month(), t.day(), t.hour()), (2020, 9, 24, 11));
    }

    #[test]
    fn test_parse_local_converts_to_display_timezone() {
        let handler = TimezoneHandler::try_new("Asia/Jakarta").unwrap();
        // Jakarta is UTC+7 with no DST: 20:00 UTC is 03:00 the next day.
        let t = handler.parse_local("2020-09-24 20:00:00 UTC").unwrap();
        assert_eq!(t.day(), 25);
        assert_eq!(t.hour(), 3);
    }

    #[test]
    fn test_parse_local_naive_kept_as_wall_clock() {
        let handler = TimezoneHandler::try_new("America/New_York").unwrap();
        let t = handler.parse_local("2024-06-01T08:15:00").unwrap();
        assert_eq!(t.hour(), 8);
        assert_eq!(t.minute(), 15);
    }

    #[test]
    fn test_parse_local_fractional_seconds() {
        let handler = TimezoneHandler::default();
        assert!(handler.parse_local("2024-06-01 08:15:00.250").is_some());
    }

    #[test]
    fn test_parse_local_date_only_is_midnight() {
        let handler = TimezoneHandler::default();
        let t = handler.parse_local("2024-02-29").unwrap();
        assert_eq!(t.hour(), 0);
        assert_eq!(t.day(), 29);
    }

    #[test]
    fn test_parse_local_trims_whitespace() {
        let handler = TimezoneHandler::default();
        assert!(handler.parse_local("  2024-01-01 00:00:00 UTC ").is_some());
    }

    #[test]
    fn test_parse_local_empty_returns_none() {
        let handler = TimezoneHandler::default();
        assert!(handler.parse_local("").is_none());
        assert!(handler.parse_local("   ").is_none());
    }

    #[test]
    fn test_parse_local_garbage_returns_none() {
        let handler = TimezoneHandler::default();
        assert!(handler.parse_local("not-a-date").is_none());
        assert!(handler.parse_local("2024-13-45 99:00:00 UTC").is_none());
    }

    // ── resolve_timezone_name ────────────────────────────────────────────────

    #[test]
    fn test_resolve_timezone_name_passthrough() {
        assert_eq!(resolve_timezone_name("Europe/Berlin"), "Europe/Berlin");
    }

    #[test]
    fn test_resolve_timezone_name_auto() {
        assert!(!resolve_timezone_name("auto").is_empty());
        assert_ne!(resolve_timezone_name("AUTO"), "AUTO");
    }

    #[test]
    fn test_get_system_timezone_returns_nonempty_string() {
        let tz = get_system_timezone();
        assert!(!tz.is_empty(), "system timezone should not be empty");
    }
}
