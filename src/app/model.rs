//! Application model types: `App`, `PlaybackState` and the stop-mode picker.

use std::time::Duration;

use chrono::{NaiveTime, TimeDelta};

use crate::config::{PlaybackSettings, StopModeSetting};
use crate::library::{LimitStatus, Limits, SoundEntry, StoreError};
use crate::session::NowPlaying;
use crate::timer::StopMode;

use super::overlay::Overlay;

/// Bounds and step of the duration picker, in minutes.
pub const MIN_DURATION_MINUTES: u64 = 1;
pub const MAX_DURATION_MINUTES: u64 = 24 * 60;
const DURATION_STEP_MINUTES: i64 = 5;
const ALARM_STEP_MINUTES: i64 = 15;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
}

/// Which stop policy the picker shows; the parameters live on `App`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ModeKind {
    Indefinite,
    Duration,
    Alarm,
}

impl From<StopModeSetting> for ModeKind {
    fn from(s: StopModeSetting) -> Self {
        match s {
            StopModeSetting::Indefinite => ModeKind::Indefinite,
            StopModeSetting::Duration => ModeKind::Duration,
            StopModeSetting::Alarm => ModeKind::Alarm,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub is_error: bool,
}

/// An in-progress microphone capture, as shown in the UI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordingStatus {
    pub name: String,
    pub elapsed: Duration,
    pub max: Duration,
}

/// The main application model.
pub struct App {
    pub sounds: Vec<SoundEntry>,
    pub selected: usize,
    pub limits: LimitStatus,

    pub mode: ModeKind,
    pub duration_minutes: u64,
    pub alarm_time: NaiveTime,

    pub playback: PlaybackState,
    pub now_playing: Option<NowPlaying>,
    pub recording: Option<RecordingStatus>,

    pub overlay: Option<Overlay>,
    pub status: Option<StatusLine>,
    pub confirm_delete: bool,

    pub(super) pending_g: bool,
}

impl App {
    /// Create a new `App` over `sounds`, preselecting the configured stop mode.
    pub fn new(sounds: Vec<SoundEntry>, limits: LimitStatus, playback: &PlaybackSettings) -> Self {
        Self {
            sounds,
            selected: 0,
            limits,

            mode: playback.default_mode.into(),
            duration_minutes: playback
                .duration_minutes
                .clamp(MIN_DURATION_MINUTES, MAX_DURATION_MINUTES),
            alarm_time: playback.alarm_time().unwrap_or_default(),

            playback: PlaybackState::Stopped,
            now_playing: None,
            recording: None,

            overlay: None,
            status: None,
            confirm_delete: true,

            pending_g: false,
        }
    }

    /// Replace the library snapshot, keeping the cursor on the same sound when
    /// it still exists.
    pub fn set_library(&mut self, sounds: Vec<SoundEntry>, limits: LimitStatus) {
        let keep = self.selected_entry().map(|e| e.id.clone());
        self.sounds = sounds;
        self.limits = limits;
        self.selected = keep
            .and_then(|id| self.sounds.iter().position(|e| e.id == id))
            .unwrap_or(self.selected)
            .min(self.sounds.len().saturating_sub(1));
    }

    pub fn selected_entry(&self) -> Option<&SoundEntry> {
        self.sounds.get(self.selected)
    }

    pub fn has_sounds(&self) -> bool {
        !self.sounds.is_empty()
    }

    /// Index of the sound that is playing, if it is in the list.
    pub fn playing_index(&self) -> Option<usize> {
        let np = self.now_playing.as_ref()?;
        self.sounds.iter().position(|e| e.id == np.sound_id)
    }

    /// Move selection to the next sound, wrapping around.
    pub fn next(&mut self) {
        if self.has_sounds() {
            self.selected = (self.selected + 1) % self.sounds.len();
        }
    }

    /// Move selection to the previous sound, wrapping around.
    pub fn prev(&mut self) {
        if self.has_sounds() {
            self.selected = self
                .selected
                .checked_sub(1)
                .unwrap_or(self.sounds.len() - 1);
        }
    }

    pub fn first(&mut self) {
        self.selected = 0;
    }

    pub fn last(&mut self) {
        self.selected = self.sounds.len().saturating_sub(1);
    }

    /// Cycle the picker through `Indefinite -> Duration -> Alarm`.
    pub fn cycle_mode(&mut self) {
        self.mode = match self.mode {
            ModeKind::Indefinite => ModeKind::Duration,
            ModeKind::Duration => ModeKind::Alarm,
            ModeKind::Alarm => ModeKind::Indefinite,
        };
    }

    /// Nudge the parameter of the current mode by `steps` (negative lowers it).
    ///
    /// Durations move in 5 minute steps within `1..=1440`; alarm times move in
    /// 15 minute steps and wrap around midnight.
    pub fn adjust(&mut self, steps: i64) {
        match self.mode {
            ModeKind::Indefinite => {}
            ModeKind::Duration => {
                let next = self.duration_minutes as i64 + steps * DURATION_STEP_MINUTES;
                self.duration_minutes =
                    next.clamp(MIN_DURATION_MINUTES as i64, MAX_DURATION_MINUTES as i64) as u64;
            }
            ModeKind::Alarm => {
                let delta = TimeDelta::minutes(steps * ALARM_STEP_MINUTES);
                self.alarm_time = self.alarm_time.overflowing_add_signed(delta).0;
            }
        }
    }

    /// The stop policy the next `play` should use.
    pub fn stop_mode(&self) -> StopMode {
        match self.mode {
            ModeKind::Indefinite => StopMode::Indefinite,
            ModeKind::Duration => StopMode::Duration(Duration::from_secs(self.duration_minutes * 60)),
            ModeKind::Alarm => StopMode::Alarm(self.alarm_time),
        }
    }

    pub fn set_now_playing(&mut self, now_playing: Option<NowPlaying>) {
        self.playback = if now_playing.is_some() {
            PlaybackState::Playing
        } else {
            PlaybackState::Stopped
        };
        self.now_playing = now_playing;
    }

    pub fn set_info(&mut self, text: impl Into<String>) {
        self.status = Some(StatusLine {
            text: text.into(),
            is_error: false,
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusLine {
            text: text.into(),
            is_error: true,
        });
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// Message shown when a new sound would not fit.
    pub fn capacity_message(&self) -> String {
        StoreError::CapacityExceeded {
            max: self.limits.max_sounds,
        }
        .to_string()
    }

    pub fn max_recording(&self) -> Duration {
        Duration::from_secs(u64::from(self.limits.max_duration_seconds))
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(
            Vec::new(),
            Limits::FREE.status(0),
            &PlaybackSettings::default(),
        )
    }
}
