//! Deterministic timeframe extraction from free-text messages.
//!
//! "how much did I spend last week?" needs a date window before any data is
//! fetched. This is a cheap keyword scan, not language understanding; the
//! conversational surface works in UTC calendar days.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFrameKind {
    AllTime,
    Today,
    Yesterday,
    ThisWeek,
    LastWeek,
    ThisMonth,
    LastMonth,
}

/// Inclusive UTC window with a human label for replies.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeFrame {
    pub kind: TimeFrameKind,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub label: String,
}

impl TimeFrame {
    /// Scan `text` for a known timeframe phrase. Longer phrases win over
    /// their substrings ("last month" before "month"); no match means all
    /// time.
    pub fn from_text(text: &str, now: DateTime<Utc>) -> TimeFrame {
        let lower = text.to_lowercase();
        let today = now.date_naive();

        if lower.contains("this month") {
            let start = first_of_month(today);
            return Self::build(TimeFrameKind::ThisMonth, start, now, "for this month");
        }
        if lower.contains("last month") {
            let this_first = first_of_month(today);
            let last_first = first_of_month(this_first - Duration::days(1));
            let end = end_of_day(this_first - Duration::days(1));
            return Self::build(TimeFrameKind::LastMonth, last_first, end, "for last month");
        }
        if lower.contains("last week") {
            let monday = monday_of(today);
            let start = monday - Duration::days(7);
            let end = end_of_day(monday - Duration::days(1));
            return Self::build(TimeFrameKind::LastWeek, start, end, "for last week");
        }
        if lower.contains("this week") {
            return Self::build(TimeFrameKind::ThisWeek, monday_of(today), now, "for this week");
        }
        if lower.contains("yesterday") {
            let y = today - Duration::days(1);
            return Self::build(TimeFrameKind::Yesterday, y, end_of_day(y), "for yesterday");
        }
        if lower.contains("today") {
            return Self::build(TimeFrameKind::Today, today, now, "for today");
        }

        TimeFrame {
            kind: TimeFrameKind::AllTime,
            start: DateTime::<Utc>::UNIX_EPOCH,
            end: now,
            label: "of all time".to_string(),
        }
    }

    fn build(kind: TimeFrameKind, start: NaiveDate, end: DateTime<Utc>, label: &str) -> TimeFrame {
        TimeFrame {
            kind,
            start: start.and_time(NaiveTime::MIN).and_utc(),
            end,
            label: label.to_string(),
        }
    }

    /// True for frames that line up with a budget month.
    pub fn is_monthly(&self) -> bool {
        matches!(self.kind, TimeFrameKind::ThisMonth | TimeFrameKind::LastMonth)
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    (date + Duration::days(1)).and_time(NaiveTime::MIN).and_utc() - Duration::milliseconds(1)
}
