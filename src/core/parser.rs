use crate::domain::model::{DailySchedule, Prayer, PrayerEvent};
use crate::utils::error::{PrayerError, Result};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

// "04:30 (+03)", "04:30 (+0330)", "04:30 (-03:30)"
static TIMING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d{1,2}):(\d{2})\s*\(\s*([+-])(\d{2}):?(\d{2})?\s*\)\s*$")
        .expect("timing pattern is valid")
});

#[derive(Debug, Deserialize)]
struct CalendarResponse {
    #[serde(default)]
    code: Option<u16>,
    data: Vec<DayEntry>,
}

#[derive(Debug, Deserialize)]
struct DayEntry {
    timings: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    date: Option<DayDate>,
}

#[derive(Debug, Deserialize)]
struct DayDate {
    #[serde(default)]
    gregorian: Option<GregorianDate>,
}

#[derive(Debug, Deserialize)]
struct GregorianDate {
    date: String,
}

/// Extracts the schedule for `date` from a month-level calendar payload.
///
/// The payload's `data` array is indexed by day of month. Only the five
/// obligatory prayers are kept; the result is ordered by [`Prayer::rank`].
pub fn parse_schedule(raw: &[u8], date: NaiveDate) -> Result<DailySchedule> {
    let response: CalendarResponse = serde_json::from_slice(raw)
        .map_err(|e| PrayerError::parse(format!("invalid calendar payload: {}", e)))?;

    if let Some(code) = response.code {
        if code != 200 {
            return Err(PrayerError::parse(format!(
                "provider reported status {} in payload",
                code
            )));
        }
    }

    let index = date.day0() as usize;
    let entry = response.data.get(index).ok_or_else(|| {
        PrayerError::parse(format!(
            "payload has {} days, day {} missing",
            response.data.len(),
            date.day()
        ))
    })?;

    check_entry_date(entry, date)?;

    let mut events = Vec::with_capacity(Prayer::ALL.len());
    for prayer in Prayer::ALL {
        let value = entry
            .timings
            .get(prayer.name())
            .ok_or_else(|| PrayerError::parse(format!("{} missing for {}", prayer, date)))?;
        let text = value.as_str().ok_or_else(|| {
            PrayerError::parse(format!("{} for {} is not a string: {}", prayer, date, value))
        })?;
        events.push(PrayerEvent::new(prayer, parse_timing(text, date)?));
    }

    DailySchedule::new(date, events)
}

/// Combines an offset-bearing time of day such as `"04:30 (+03)"` with `date`.
pub fn parse_timing(text: &str, date: NaiveDate) -> Result<DateTime<FixedOffset>> {
    let caps = TIMING_RE
        .captures(text)
        .ok_or_else(|| PrayerError::parse(format!("unrecognised timing '{}'", text)))?;

    let hour: u32 = caps[1].parse().map_err(|_| bad_timing(text))?;
    let minute: u32 = caps[2].parse().map_err(|_| bad_timing(text))?;
    let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| bad_timing(text))?;

    let offset_hours: i32 = caps[4].parse().map_err(|_| bad_timing(text))?;
    let offset_minutes: i32 = match caps.get(5) {
        Some(m) => m.as_str().parse().map_err(|_| bad_timing(text))?,
        None => 0,
    };
    let sign = if &caps[3] == "-" { -1 } else { 1 };
    let offset = FixedOffset::east_opt(sign * (offset_hours * 3600 + offset_minutes * 60))
        .ok_or_else(|| bad_timing(text))?;

    offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .ok_or_else(|| bad_timing(text))
}

fn bad_timing(text: &str) -> PrayerError {
    PrayerError::parse(format!("invalid timing '{}'", text))
}

fn check_entry_date(entry: &DayEntry, date: NaiveDate) -> Result<()> {
    let Some(gregorian) = entry.date.as_ref().and_then(|d| d.gregorian.as_ref()) else {
        return Ok(());
    };
    match NaiveDate::parse_from_str(&gregorian.date, "%d-%m-%Y") {
        Ok(found) if found != date => Err(PrayerError::parse(format!(
            "payload entry is for {}, expected {}",
            found, date
        ))),
        _ => Ok(()),
    }
}
