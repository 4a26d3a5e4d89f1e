use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Days, NaiveTime, TimeDelta, TimeZone, Utc};

/// When looping playback should stop on its own.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StopMode {
    /// Loop until stopped by hand.
    Indefinite,
    /// Stop once this much time has passed.
    Duration(Duration),
    /// Stop at the next occurrence of this local time of day.
    Alarm(NaiveTime),
}

impl StopMode {
    pub fn label(&self) -> &'static str {
        match self {
            StopMode::Indefinite => "indefinite",
            StopMode::Duration(_) => "duration",
            StopMode::Alarm(_) => "alarm",
        }
    }

    /// Absolute stop instant for this mode, evaluated at `now`.
    ///
    /// `now` carries the time zone alarm times are interpreted in.
    /// `None` means the mode never stops on its own.
    pub fn end_instant<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<DateTime<Utc>> {
        match self {
            StopMode::Indefinite => None,
            StopMode::Duration(d) => {
                let delta = TimeDelta::from_std(*d).ok()?;
                now.to_utc().checked_add_signed(delta)
            }
            StopMode::Alarm(at) => next_occurrence(now, *at).map(|t| t.to_utc()),
        }
    }
}

impl fmt::Display for StopMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopMode::Indefinite => write!(f, "loop forever"),
            StopMode::Duration(d) => {
                let mins = d.as_secs() / 60;
                let secs = d.as_secs() % 60;
                if secs == 0 {
                    write!(f, "stop after {mins} min")
                } else {
                    write!(f, "stop after {mins}m{secs:02}s")
                }
            }
            StopMode::Alarm(at) => write!(f, "stop at {}", at.format("%H:%M")),
        }
    }
}

/// The first instant strictly after `now` whose local time of day is `at`.
///
/// A time that has already passed today (or is exactly now) rolls over to the
/// next day. When `at` falls into a DST gap the instant one hour later is used.
pub fn next_occurrence<Tz: TimeZone>(now: &DateTime<Tz>, at: NaiveTime) -> Option<DateTime<Tz>> {
    let tz = now.timezone();
    let today = now.date_naive();

    for offset in 0..=2 {
        let day = today.checked_add_days(Days::new(offset))?;
        let naive = day.and_time(at);
        let local = tz
            .from_local_datetime(&naive)
            .earliest()
            .or_else(|| tz.from_local_datetime(&(naive + TimeDelta::hours(1))).earliest());

        if let Some(candidate) = local {
            if candidate > *now {
                return Some(candidate);
            }
        }
    }
    None
}
