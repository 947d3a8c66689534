//! Pacific-time date handling shared by every theater.
//!
//! Listings are always Seattle local time, so every parsed date gets the
//! `America/Los_Angeles` offset in force on that calendar day, regardless of
//! when or where the scrape runs.

use crate::config::{Config, RunMode};
use crate::error::DateError;
use chrono::{
    DateTime, Days, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};
use chrono_tz::America::Los_Angeles;
use regex::Regex;
use std::sync::OnceLock;

fn time_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(\d{1,2}):(\d{2})\s*(AM|PM)").expect("valid regex"))
}

/// Holds the reference "now" for one run. Frozen in mock mode so fixture URLs
/// derived from dates stay stable.
#[derive(Debug, Clone, Copy)]
pub struct DateManager {
    now: DateTime<FixedOffset>,
}

impl DateManager {
    pub fn from_config(config: &Config) -> Self {
        match config.run_mode {
            RunMode::Mock => Self::frozen(config.mock_date),
            RunMode::Prod | RunMode::UpdateMocks => Self::at(Utc::now()),
        }
    }

    /// Reference "now" given as Pacific wall-clock time.
    pub fn frozen(local: NaiveDateTime) -> Self {
        Self {
            now: pacific_at(local),
        }
    }

    pub fn at<Tz: TimeZone>(instant: DateTime<Tz>) -> Self {
        Self {
            now: instant.with_timezone(&Los_Angeles).fixed_offset(),
        }
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        self.now
    }

    /// Calendar date of "now" in Seattle.
    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }

    /// Midnight Pacific at the start of the reference day.
    pub fn start_of_today(&self) -> DateTime<FixedOffset> {
        pacific_at(self.today().and_time(NaiveTime::MIN))
    }

    /// `n` consecutive dates `interval` days apart, starting today.
    pub fn next_n_days(&self, n: usize, interval: u64) -> Vec<NaiveDate> {
        let today = self.today();
        (0..n as u64)
            .filter_map(|i| today.checked_add_days(Days::new(i * interval)))
            .collect()
    }

    /// Parse a time like "7:45 PM" on `date`, in Pacific time.
    pub fn parse_date_time(
        &self,
        date: NaiveDate,
        time: &str,
    ) -> Result<DateTime<FixedOffset>, DateError> {
        let (hour, minute) = parse_12_hour(time)?;
        pacific_datetime(date, hour, minute)
    }
}

/// "H:MM AM|PM" to 24-hour (hour, minute).
pub fn parse_12_hour(time: &str) -> Result<(u32, u32), DateError> {
    let caps = time_regex()
        .captures(time)
        .ok_or_else(|| DateError::InvalidTime(time.to_string()))?;

    let hour: u32 = caps[1]
        .parse()
        .map_err(|_| DateError::InvalidTime(time.to_string()))?;
    let minute: u32 = caps[2]
        .parse()
        .map_err(|_| DateError::InvalidTime(time.to_string()))?;
    if !(1..=12).contains(&hour) || minute > 59 {
        return Err(DateError::InvalidTime(time.to_string()));
    }

    let is_pm = caps[3].eq_ignore_ascii_case("PM");
    Ok((to_24_hour(hour, is_pm), minute))
}

pub fn to_24_hour(hour: u32, is_pm: bool) -> u32 {
    match (hour, is_pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, true) => h + 12,
        (h, false) => h,
    }
}

/// UTC offset for Seattle on `date`: -08:00 (PST) or -07:00 (PDT).
///
/// Resolved at local noon, so the day a transition happens gets the offset in
/// force for most of that day.
pub fn pacific_offset(date: NaiveDate) -> FixedOffset {
    let noon = date.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN));
    Los_Angeles
        .offset_from_local_datetime(&noon)
        .earliest()
        .map(|offset| offset.fix())
        .unwrap_or_else(pst)
}

fn pst() -> FixedOffset {
    FixedOffset::west_opt(8 * 3600).unwrap_or_else(|| Utc.fix())
}

pub fn pacific_datetime(
    date: NaiveDate,
    hour: u32,
    minute: u32,
) -> Result<DateTime<FixedOffset>, DateError> {
    let time = NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| DateError::InvalidTime(format!("{hour}:{minute:02}")))?;
    Ok(pacific_at(date.and_time(time)))
}

fn pacific_at(local: NaiveDateTime) -> DateTime<FixedOffset> {
    let offset = pacific_offset(local.date());
    // A fixed offset maps every local time to exactly one instant.
    match offset.from_local_datetime(&local).single() {
        Some(dt) => dt,
        None => offset.from_utc_datetime(&local),
    }
}

/// Parse "2026-01-19T16:30" style strings. Strings that carry their own
/// offset (or `Z`) are taken as-is; naive ones are read as Pacific.
pub fn parse_iso_as_pacific(iso: &str) -> Result<DateTime<FixedOffset>, DateError> {
    let iso = iso.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(iso) {
        return Ok(dt);
    }
    if let Ok(dt) = DateTime::parse_from_str(iso, "%Y-%m-%dT%H:%M%:z") {
        return Ok(dt);
    }

    let naive = NaiveDateTime::parse_from_str(iso, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(iso, "%Y-%m-%dT%H:%M"))
        .map_err(|_| DateError::InvalidDate(iso.to_string()))?;
    Ok(pacific_at(naive))
}

pub fn date_yyyymmdd(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
