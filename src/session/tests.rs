use super::*;
use crate::timer::TimerState;
use chrono::{Local, NaiveTime, TimeDelta, TimeZone, Timelike};
use std::cell::Cell;
use std::path::Path;

#[derive(Default)]
struct FakeOutput {
    loaded: Option<PathBuf>,
    starts: usize,
    stops: usize,
    fail_stop: bool,
    fail_start: bool,
}

impl LoopOutput for FakeOutput {
    fn start_loop(&mut self, path: &Path) -> Result<(), AudioError> {
        if self.fail_start {
            return Err(AudioError::NoOutputDevice);
        }
        assert!(self.loaded.is_none(), "two loops loaded at once");
        self.loaded = Some(path.to_path_buf());
        self.starts += 1;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        self.stops += 1;
        self.loaded = None;
        if self.fail_stop {
            return Err(AudioError::NotLoaded);
        }
        Ok(())
    }
}

struct FakeClock {
    now: Cell<DateTime<Utc>>,
}

impl FakeClock {
    fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    fn advance(&self, by: TimeDelta) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for &FakeClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 21, 0, 0).unwrap()
}

fn entry(id: &str, name: &str) -> SoundEntry {
    SoundEntry {
        id: id.to_string(),
        name: name.to_string(),
        file_path: PathBuf::from(format!("/data/sounds/{id}.wav")),
        duration_seconds: 120,
        created_at: t0(),
    }
}

fn five_seconds() -> StopMode {
    StopMode::Duration(Duration::from_secs(5))
}

#[test]
fn duration_session_counts_down_then_stops_once() {
    let clock = FakeClock::at(t0());
    let mut session = PlaybackSession::new(FakeOutput::default(), &clock);

    let end = session.start(&entry("sound_a", "Rain"), five_seconds()).unwrap();
    assert_eq!(end, Some(t0() + TimeDelta::seconds(5)));
    assert_eq!(session.tick(), SessionTick::Remaining(Duration::from_secs(5)));

    clock.advance(TimeDelta::seconds(3));
    assert_eq!(session.tick(), SessionTick::Remaining(Duration::from_secs(2)));
    assert!(session.timer().is_armed());
    assert_eq!(
        session.now_playing().unwrap().remaining,
        Some(Duration::from_secs(2))
    );

    clock.advance(TimeDelta::milliseconds(2_500));
    let SessionTick::Stopped(stopped) = session.tick() else {
        panic!("expected the timer to fire");
    };
    assert_eq!(stopped.sound_id, "sound_a");
    assert_eq!(session.timer().state(), TimerState::Fired);
    assert_eq!(session.output().stops, 1);

    clock.advance(TimeDelta::seconds(30));
    assert_eq!(session.tick(), SessionTick::Idle);
    assert_eq!(session.output().stops, 1);
    assert!(session.now_playing().is_none());
}

#[test]
fn first_tick_after_suspension_stops_playback() {
    let clock = FakeClock::at(t0());
    let mut session = PlaybackSession::new(FakeOutput::default(), &clock);
    session
        .start(
            &entry("sound_a", "Rain"),
            StopMode::Duration(Duration::from_secs(10)),
        )
        .unwrap();
    assert!(matches!(session.tick(), SessionTick::Remaining(_)));

    // Suspended for 40 minutes without a single tick.
    clock.advance(TimeDelta::minutes(40));
    assert!(matches!(session.tick(), SessionTick::Stopped(_)));
    assert_eq!(session.output().stops, 1);
    assert!(!session.is_active());
}

#[test]
fn failing_stop_still_leaves_the_session_idle() {
    let clock = FakeClock::at(t0());
    let output = FakeOutput {
        fail_stop: true,
        ..FakeOutput::default()
    };
    let mut session = PlaybackSession::new(output, &clock);
    session.start(&entry("sound_a", "Rain"), five_seconds()).unwrap();

    clock.advance(TimeDelta::seconds(6));
    assert!(matches!(session.tick(), SessionTick::Stopped(_)));
    assert_eq!(session.timer().state(), TimerState::Fired);
    assert_eq!(session.tick(), SessionTick::Idle);

    session.start(&entry("sound_b", "Fan"), five_seconds()).unwrap();
    assert!(session.stop().is_some());
    assert!(!session.timer().is_armed());
    assert!(session.current().is_none());
}

#[test]
fn explicit_stop_cancels_the_timer_and_releases_audio() {
    let clock = FakeClock::at(t0());
    let mut session = PlaybackSession::new(FakeOutput::default(), &clock);
    session.start(&entry("sound_a", "Rain"), five_seconds()).unwrap();

    let stopped = session.stop().unwrap();
    assert_eq!(stopped.name, "Rain");
    assert_eq!(session.timer().state(), TimerState::Idle);
    assert_eq!(session.output().stops, 1);
    assert!(session.output().loaded.is_none());

    // Past the old end instant nothing happens.
    clock.advance(TimeDelta::seconds(10));
    assert_eq!(session.tick(), SessionTick::Idle);
    assert_eq!(session.output().stops, 1);

    assert!(session.stop().is_none());
    assert_eq!(session.output().stops, 1);
}

#[test]
fn explicit_stop_releases_audio_even_when_it_fails() {
    let clock = FakeClock::at(t0());
    let output = FakeOutput {
        fail_stop: true,
        ..FakeOutput::default()
    };
    let mut session = PlaybackSession::new(output, &clock);
    session
        .start(&entry("sound_a", "Rain"), StopMode::Indefinite)
        .unwrap();

    let stopped = session.stop().unwrap();
    assert_eq!(stopped.sound_id, "sound_a");
    assert_eq!(session.output().stops, 1);
    assert!(session.output().loaded.is_none());
    assert!(!session.is_active());
    assert!(session.now_playing().is_none());
}

#[test]
fn starting_again_tears_down_the_previous_session_first() {
    let clock = FakeClock::at(t0());
    let mut session = PlaybackSession::new(FakeOutput::default(), &clock);
    session.start(&entry("sound_a", "Rain"), five_seconds()).unwrap();

    clock.advance(TimeDelta::seconds(2));
    session
        .start(&entry("sound_b", "Fan"), StopMode::Indefinite)
        .unwrap();

    assert_eq!(session.output().starts, 2);
    assert_eq!(session.output().stops, 1);
    assert_eq!(
        session.output().loaded.as_deref(),
        Some(Path::new("/data/sounds/sound_b.wav"))
    );
    assert!(!session.timer().is_armed());

    clock.advance(TimeDelta::hours(5));
    assert_eq!(session.tick(), SessionTick::Looping);
    assert_eq!(session.now_playing().unwrap().remaining, None);
}

#[test]
fn failed_start_leaves_nothing_playing() {
    let clock = FakeClock::at(t0());
    let output = FakeOutput {
        fail_start: true,
        ..FakeOutput::default()
    };
    let mut session = PlaybackSession::new(output, &clock);

    let err = session.start(&entry("sound_a", "Rain"), five_seconds());
    assert!(matches!(err, Err(AudioError::NoOutputDevice)));
    assert!(!session.is_active());
    assert!(!session.timer().is_armed());
    assert_eq!(session.tick(), SessionTick::Idle);
}

#[test]
fn alarm_time_already_past_today_ends_on_the_next_day() {
    let clock = FakeClock::at(t0());
    let mut session = PlaybackSession::new(FakeOutput::default(), &clock);

    let local_now = t0().with_timezone(&Local);
    let at = NaiveTime::from_hms_opt(local_now.hour(), 0, 0).unwrap();

    let end = session
        .start(&entry("sound_a", "Rain"), StopMode::Alarm(at))
        .unwrap()
        .unwrap();
    assert!(end > t0());
    assert!(end - t0() <= TimeDelta::hours(25));
    assert_eq!(session.current().unwrap().ends_at, Some(end));
    assert!(matches!(session.tick(), SessionTick::Remaining(_)));
}
