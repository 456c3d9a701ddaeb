#![allow(dead_code)]

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeZone};
use prayer_clock::TomlConfig;
use serde_json::json;

pub const JUNE: [&str; 5] = [
    "04:30 (+03)",
    "11:45 (+03)",
    "15:10 (+03)",
    "18:20 (+03)",
    "19:50 (+03)",
];

pub const JULY: [&str; 5] = [
    "04:35 (+03)",
    "11:50 (+03)",
    "15:15 (+03)",
    "18:25 (+03)",
    "19:55 (+03)",
];

/// Month payload shaped like the Aladhan calendar response.
pub fn month_body(year: i32, month: u32, timings: [&str; 5]) -> String {
    let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
    let data: Vec<serde_json::Value> = first
        .iter_days()
        .take_while(|d| d.month0() == first.month0())
        .map(|d| {
            json!({
                "timings": {
                    "Fajr": timings[0],
                    "Sunrise": "05:55 (+03)",
                    "Dhuhr": timings[1],
                    "Asr": timings[2],
                    "Sunset": "18:18 (+03)",
                    "Maghrib": timings[3],
                    "Isha": timings[4],
                    "Imsak": "04:20 (+03)",
                    "Midnight": "23:59 (+03)"
                },
                "date": { "gregorian": { "date": d.format("%d-%m-%Y").to_string() } }
            })
        })
        .collect();
    json!({ "code": 200, "status": "OK", "data": data }).to_string()
}

pub fn at(month: u32, day: u32, h: u32, m: u32, s: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(3 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, month, day, h, m, s)
        .unwrap()
}

pub fn config(endpoint: &str, cache_dir: &str) -> TomlConfig {
    TomlConfig::from_toml_str(&format!(
        r#"
[location]
latitude = 30.983334
longitude = 41.016666

[provider]
endpoint = "{}"
method = 4
timeout_seconds = 5

[cache]
directory = "{}"
"#,
        endpoint,
        cache_dir.replace('\\', "/")
    ))
    .unwrap()
}
