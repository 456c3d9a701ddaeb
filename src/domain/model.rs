use crate::utils::error::{PrayerError, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The five daily prayers, declared in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Prayer {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl Prayer {
    pub const ALL: [Prayer; 5] = [
        Prayer::Fajr,
        Prayer::Dhuhr,
        Prayer::Asr,
        Prayer::Maghrib,
        Prayer::Isha,
    ];

    /// Position within the day. Ordering is defined by this table, never by timestamps.
    pub fn rank(self) -> usize {
        match self {
            Prayer::Fajr => 0,
            Prayer::Dhuhr => 1,
            Prayer::Asr => 2,
            Prayer::Maghrib => 3,
            Prayer::Isha => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Prayer::Fajr => "Fajr",
            Prayer::Dhuhr => "Dhuhr",
            Prayer::Asr => "Asr",
            Prayer::Maghrib => "Maghrib",
            Prayer::Isha => "Isha",
        }
    }

    /// Maps a provider timings key; Sunrise, Imsak, Midnight and friends yield `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == key)
    }
}

impl fmt::Display for Prayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerEvent {
    prayer: Prayer,
    time: DateTime<FixedOffset>,
}

impl PrayerEvent {
    pub fn new(prayer: Prayer, time: DateTime<FixedOffset>) -> Self {
        Self { prayer, time }
    }

    pub fn prayer(&self) -> Prayer {
        self.prayer
    }

    pub fn time(&self) -> DateTime<FixedOffset> {
        self.time
    }
}

impl fmt::Display for PrayerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<7} {}", self.prayer.name(), self.time.format("%I:%M"))
    }
}

/// One calendar day of prayers: exactly five events, one per [`Prayer`], in rank order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySchedule {
    date: NaiveDate,
    events: Vec<PrayerEvent>,
}

impl DailySchedule {
    pub fn new(date: NaiveDate, mut events: Vec<PrayerEvent>) -> Result<Self> {
        if events.len() != Prayer::ALL.len() {
            return Err(PrayerError::parse(format!(
                "expected {} prayers for {}, got {}",
                Prayer::ALL.len(),
                date,
                events.len()
            )));
        }

        events.sort_by_key(|event| event.prayer.rank());

        for (event, expected) in events.iter().zip(Prayer::ALL) {
            if event.prayer != expected {
                return Err(PrayerError::parse(format!(
                    "duplicate or missing prayer on {}: found {} where {} belongs",
                    date, event.prayer, expected
                )));
            }
        }

        Ok(Self { date, events })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Always Fajr.
    pub fn first(&self) -> &PrayerEvent {
        &self.events[0]
    }

    pub fn get(&self, prayer: Prayer) -> &PrayerEvent {
        &self.events[prayer.rank()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &PrayerEvent> {
        self.events.iter()
    }

    /// First event, in canonical order, strictly after `now`.
    pub fn next_after(&self, now: DateTime<FixedOffset>) -> Option<&PrayerEvent> {
        self.events.iter().find(|event| event.time > now)
    }

    /// UTC offset the provider used for this day.
    pub fn offset(&self) -> FixedOffset {
        *self.first().time.offset()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOrigin {
    Cache,
    Remote,
}

/// Raw provider payload persisted for one calendar date.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    date: NaiveDate,
    payload: Vec<u8>,
    origin: EntryOrigin,
}

impl CacheEntry {
    pub fn new(date: NaiveDate, payload: Vec<u8>, origin: EntryOrigin) -> Self {
        Self {
            date,
            payload,
            origin,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn origin(&self) -> EntryOrigin {
        self.origin
    }
}

/// Whole seconds left until an event, clamped at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Countdown {
    total_seconds: i64,
}

impl Countdown {
    pub fn from_seconds(total_seconds: i64) -> Self {
        Self {
            total_seconds: total_seconds.max(0),
        }
    }

    pub fn until(now: DateTime<FixedOffset>, target: DateTime<FixedOffset>) -> Self {
        Self::from_seconds(round_to_seconds(target - now))
    }

    pub fn total_seconds(&self) -> i64 {
        self.total_seconds
    }

    pub fn hours(&self) -> i64 {
        self.total_seconds / 3600
    }

    pub fn minutes(&self) -> i64 {
        self.total_seconds % 3600 / 60
    }

    pub fn seconds(&self) -> i64 {
        self.total_seconds % 60
    }

    pub fn describe(&self, prayer: Prayer) -> String {
        format!("Next prayer is {}\nafter {}", prayer, self)
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours(),
            self.minutes(),
            self.seconds()
        )
    }
}

/// Rounds half away from zero to whole seconds.
pub fn round_to_seconds(delta: TimeDelta) -> i64 {
    let millis = delta.num_milliseconds();
    if millis >= 0 {
        (millis + 500) / 1000
    } else {
        -((-millis + 500) / 1000)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    PreReminder,
    Arrival,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub event: PrayerEvent,
}
