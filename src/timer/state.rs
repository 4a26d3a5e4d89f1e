use std::time::Duration;

use chrono::{DateTime, Utc};

/// Where the timer is in its `Idle -> Armed -> Fired` life.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum TimerState {
    #[default]
    Idle,
    Armed {
        end: DateTime<Utc>,
    },
    Fired,
}

/// Result of a single tick.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tick {
    /// Not armed; nothing to do.
    Inactive,
    /// Still armed, this much time left (rounded down to whole milliseconds).
    Remaining(Duration),
    /// The end instant has passed. Reported exactly once per arm.
    Expired,
}

/// Exactly-once stop signal toward an absolute end instant.
#[derive(Debug, Default)]
pub struct PlaybackTimer {
    state: TimerState,
}

impl PlaybackTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state(), TimerState::Armed { .. })
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        match self.state {
            TimerState::Armed { end } => Some(end),
            _ => None,
        }
    }

    /// Arm toward `end`, replacing whatever was armed before.
    pub fn arm(&mut self, end: DateTime<Utc>) {
        self.state = TimerState::Armed { end };
    }

    /// Back to `Idle` without firing.
    pub fn cancel(&mut self) {
        self.state = TimerState::Idle;
    }

    /// Time left until the end instant, clamped at zero.
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.end()
            .map(|end| (end - now).to_std().unwrap_or(Duration::ZERO))
    }

    /// Compare `now` with the end instant; fire once it has been reached.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Tick {
        let TimerState::Armed { end } = self.state else {
            return Tick::Inactive;
        };

        if now >= end {
            self.state = TimerState::Fired;
            return Tick::Expired;
        }

        let left = (end - now).to_std().unwrap_or(Duration::ZERO);
        Tick::Remaining(Duration::from_millis(left.as_millis() as u64))
    }
}
