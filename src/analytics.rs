//! Fire-and-forget usage events.
//!
//! Events never block the caller and never fail it. The only sink shipped is
//! the log; transport to a remote service is not part of this crate.

use crate::config::AnalyticsSettings;


pub const APP_OPENED: &str = "app_opened";
pub const SOUND_SAVED: &str = "sound_saved";
pub const SOUND_RENAMED: &str = "sound_renamed";
pub const SOUND_DELETED: &str = "sound_deleted";
pub const PLAYBACK_STARTED: &str = "playback_started";
pub const PLAYBACK_STOPPED: &str = "playback_stopped";
pub const SAVE_REJECTED: &str = "save_rejected";

pub type Props<'a> = &'a [(&'a str, String)];

pub trait Analytics {
    fn track(&self, event: &str, props: Props<'_>);
}

/// Writes each event as a `tracing` record on the `soundloop::analytics` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAnalytics;

impl Analytics for TracingAnalytics {
    fn track(&self, event: &str, props: Props<'_>) {
        tracing::info!(
            target: "soundloop::analytics",
            event,
            props = %flatten(props),
            "event"
        );
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAnalytics;

impl Analytics for NoopAnalytics {
    fn track(&self, _event: &str, _props: Props<'_>) {}
}

pub fn from_settings(settings: &AnalyticsSettings) -> Box<dyn Analytics> {
    if settings.enabled {
        Box::new(TracingAnalytics)
    } else {
        Box::new(NoopAnalytics)
    }
}

/// `key=value` pairs joined by spaces; values containing whitespace are quoted.
pub(crate) fn flatten(props: Props<'_>) -> String {
    props
        .iter()
        .map(|(k, v)| {
            if v.is_empty() || v.chars().any(char::is_whitespace) {
                format!("{k}={v:?}")
            } else {
                format!("{k}={v}")
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
