//! Timezone-aware local day windows.
//!
//! Every goal is reconciled against "today" in its own zone, independent of
//! the server's clock and of other goals processed in the same run.

use anyhow::Result;
use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Zone applied when a goal document has no timezone of its own.
pub const DEFAULT_TIMEZONE: &str = "Africa/Dar_es_Salaam";

/// One local calendar day, expressed as an inclusive UTC instant window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayWindow {
    /// The local calendar date this window covers.
    pub date: chrono::NaiveDate,
    /// Local midnight, in UTC.
    pub start: DateTime<Utc>,
    /// One millisecond before the next local midnight, in UTC.
    pub end: DateTime<Utc>,
}

impl DayWindow {
    /// Resolve "today" for the given zone at the reference instant `now`.
    ///
    /// `timezone` falls back to [`DEFAULT_TIMEZONE`] when absent; an
    /// unparseable zone name is an error (the caller treats it as a
    /// misconfigured goal). Ambiguous or skipped local midnights around a
    /// DST transition resolve to the earliest valid instant.
    pub fn resolve(timezone: Option<&str>, now: DateTime<Utc>) -> Result<DayWindow> {
        let name = timezone.unwrap_or(DEFAULT_TIMEZONE);
        let tz: Tz = name
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid timezone: {name}"))?;

        let date = now.with_timezone(&tz).date_naive();
        let start = local_midnight(tz, date)?;
        let end = local_midnight(tz, date + Duration::days(1))? - Duration::milliseconds(1);

        Ok(DayWindow {
            date,
            start: start.with_timezone(&Utc),
            end: end.with_timezone(&Utc),
        })
    }
}

fn local_midnight(tz: Tz, date: chrono::NaiveDate) -> Result<DateTime<Tz>> {
    tz.from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
        .ok_or_else(|| anyhow::anyhow!("no valid midnight for {date} in {tz}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_dar_es_salaam_window() {
        // EAT is UTC+3, no DST. 2026-03-02 20:30 UTC is 23:30 local.
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 20, 30, 0).unwrap();
        let w = DayWindow::resolve(Some("Africa/Dar_es_Salaam"), now).unwrap();

        assert_eq!(w.date, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
        assert_eq!(w.start.to_rfc3339(), "2026-03-01T21:00:00+00:00");
        assert_eq!(w.end.to_rfc3339(), "2026-03-02T20:59:59.999+00:00");
    }

    #[test]
    fn test_local_date_can_differ_from_utc_date() {
        // 22:30 UTC is already the next day in UTC+3.
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 22, 30, 0).unwrap();
        let w = DayWindow::resolve(None, now).unwrap();
        assert_eq!(w.date, NaiveDate::from_ymd_opt(2026, 3, 3).unwrap());
    }

    #[test]
    fn test_zones_get_independent_windows() {
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 1, 0, 0).unwrap();
        let dar = DayWindow::resolve(Some("Africa/Dar_es_Salaam"), now).unwrap();
        let chicago = DayWindow::resolve(Some("America/Chicago"), now).unwrap();

        assert_eq!(dar.date, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
        assert_eq!(chicago.date, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_ne!(dar.start, chicago.start);
    }

    #[test]
    fn test_invalid_zone_is_an_error() {
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 1, 0, 0).unwrap();
        assert!(DayWindow::resolve(Some("Mars/Olympus_Mons"), now).is_err());
    }

    #[test]
    fn test_dst_spring_forward_day_is_shorter() {
        // US spring forward 2026-03-08: the local day is 23 hours long.
        let now = Utc.with_ymd_and_hms(2026, 3, 8, 18, 0, 0).unwrap();
        let w = DayWindow::resolve(Some("America/Chicago"), now).unwrap();
        assert_eq!(w.date, NaiveDate::from_ymd_opt(2026, 3, 8).unwrap());
        let span = w.end - w.start;
        assert_eq!(span, Duration::hours(23) - Duration::milliseconds(1));
    }
}
