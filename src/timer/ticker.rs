use std::time::{Duration, Instant};

/// Cancellable recurring deadline, polled from an event loop.
///
/// After a long gap between polls (suspension) the ticker fires once and
/// reschedules from the poll time instead of replaying every missed period.
#[derive(Debug, Clone)]
pub struct Ticker {
    period: Duration,
    next: Option<Instant>,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self { period, next: None }
    }

    /// One tick per second.
    pub fn every_second() -> Self {
        Self::new(Duration::from_secs(1))
    }

    /// Start (or restart) ticking; the first tick is due immediately.
    pub fn start(&mut self, now: Instant) {
        self.next = Some(now);
    }

    pub fn cancel(&mut self) {
        self.next = None;
    }

    pub fn is_running(&self) -> bool {
        self.next.is_some()
    }

    /// True when a tick is due; schedules the following one.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next {
            Some(due) if now >= due => {
                self.next = Some(now + self.period);
                true
            }
            _ => false,
        }
    }

    /// How long until the next tick, if running.
    pub fn until_next(&self, now: Instant) -> Option<Duration> {
        self.next.map(|due| due.saturating_duration_since(now))
    }
}
