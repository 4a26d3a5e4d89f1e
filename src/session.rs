//! The single active playback session.
//!
//! A session pairs one looping audio handle with the auto-stop timer. Starting
//! a new session always tears the previous one down first, so two handles are
//! never live at once.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Local, Utc};

use crate::audio::{AudioError, LoopOutput};
use crate::library::SoundEntry;
use crate::timer::{Clock, PlaybackTimer, StopMode, Tick};

#[cfg(test)]
mod tests;

/// What is playing right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSession {
    pub sound_id: String,
    pub name: String,
    pub path: PathBuf,
    pub mode: StopMode,
    pub ends_at: Option<DateTime<Utc>>,
}

/// Outcome of one session tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionTick {
    /// Nothing is playing.
    Idle,
    /// Playing with no stop instant.
    Looping,
    /// Playing toward a stop instant.
    Remaining(Duration),
    /// The timer fired and playback was stopped. Carries the stopped session.
    Stopped(ActiveSession),
}

/// Display snapshot of the active session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    pub sound_id: String,
    pub name: String,
    pub mode: StopMode,
    pub remaining: Option<Duration>,
}

pub struct PlaybackSession<O: LoopOutput, C: Clock> {
    output: O,
    clock: C,
    timer: PlaybackTimer,
    current: Option<ActiveSession>,
}

impl<O: LoopOutput, C: Clock> PlaybackSession<O, C> {
    pub fn new(output: O, clock: C) -> Self {
        Self {
            output,
            clock,
            timer: PlaybackTimer::new(),
            current: None,
        }
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn timer(&self) -> &PlaybackTimer {
        &self.timer
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&ActiveSession> {
        self.current.as_ref()
    }

    /// Loop `entry` under `mode`, replacing any running session.
    ///
    /// Returns the stop instant, if the mode has one. When the new file cannot
    /// be started the previous session is still gone.
    pub fn start(
        &mut self,
        entry: &SoundEntry,
        mode: StopMode,
    ) -> Result<Option<DateTime<Utc>>, AudioError> {
        if self.current.is_some() {
            self.stop();
        }

        self.output.start_loop(&entry.file_path)?;

        let now = self.clock.now();
        let ends_at = mode.end_instant(&now.with_timezone(&Local));
        match ends_at {
            Some(end) => self.timer.arm(end),
            None => self.timer.cancel(),
        }

        tracing::info!(
            id = %entry.id,
            mode = mode.label(),
            ends_at = ?ends_at,
            "playback started"
        );
        self.current = Some(ActiveSession {
            sound_id: entry.id.clone(),
            name: entry.name.clone(),
            path: entry.file_path.clone(),
            mode,
            ends_at,
        });
        Ok(ends_at)
    }

    /// Cancel the timer, release audio, reset. Returns the session that was
    /// running, if any.
    pub fn stop(&mut self) -> Option<ActiveSession> {
        self.timer.cancel();
        let id = self.current.as_ref()?.sound_id.clone();
        self.release(&id);
        let stopped = self.current.take()?;
        tracing::info!(id = %stopped.sound_id, path = ?stopped.path, "playback stopped");
        Some(stopped)
    }

    /// Check the timer against the clock; stops playback once it has expired.
    pub fn tick(&mut self) -> SessionTick {
        if self.current.is_none() {
            return SessionTick::Idle;
        }

        match self.timer.tick(self.clock.now()) {
            Tick::Inactive => SessionTick::Looping,
            Tick::Remaining(left) => SessionTick::Remaining(left),
            Tick::Expired => {
                let Some(id) = self.current.as_ref().map(|s| s.sound_id.clone()) else {
                    return SessionTick::Idle;
                };
                self.release(&id);
                let Some(stopped) = self.current.take() else {
                    return SessionTick::Idle;
                };
                tracing::info!(
                    id = %stopped.sound_id,
                    ends_at = ?stopped.ends_at,
                    "auto-stop fired"
                );
                SessionTick::Stopped(stopped)
            }
        }
    }

    pub fn now_playing(&self) -> Option<NowPlaying> {
        let cur = self.current.as_ref()?;
        Some(NowPlaying {
            sound_id: cur.sound_id.clone(),
            name: cur.name.clone(),
            mode: cur.mode,
            remaining: self.timer.remaining(self.clock.now()),
        })
    }

    fn release(&mut self, id: &str) {
        if let Err(e) = self.output.stop() {
            tracing::warn!(id, error = %e, "stopping playback failed");
        }
    }
}
