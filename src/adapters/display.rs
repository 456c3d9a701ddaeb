use crate::domain::model::{Countdown, DailySchedule, PrayerEvent};
use crate::domain::ports::ScheduleDisplay;
use std::io::Write;

/// Prints the day's list once per refresh and rewrites a single countdown line.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalDisplay;

pub fn render_schedule(schedule: &DailySchedule) -> String {
    let mut out = format!("Prayer times for {}\n", schedule.date().format("%A %Y-%m-%d"));
    for event in schedule.iter() {
        out.push_str(&format!("  {}\n", event));
    }
    out
}

pub fn render_countdown(next: &PrayerEvent, remaining: Countdown) -> String {
    format!("Next prayer is {} after {}", next.prayer(), remaining)
}

impl ScheduleDisplay for TerminalDisplay {
    fn show_schedule(&self, schedule: &DailySchedule) {
        let mut stdout = std::io::stdout().lock();
        let _ = write!(stdout, "\n{}", render_schedule(schedule));
        let _ = stdout.flush();
    }

    fn show_countdown(&self, next: &PrayerEvent, remaining: Countdown) {
        let mut stdout = std::io::stdout().lock();
        let _ = write!(stdout, "\r{}", render_countdown(next, remaining));
        let _ = stdout.flush();
    }
}
