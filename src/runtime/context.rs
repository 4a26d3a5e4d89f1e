//! Service object shared by the TUI and the headless commands.
//!
//! Owns the store, the playback session and the analytics hook; every user
//! intent goes through here so events are tracked the same way everywhere.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::analytics::{self, Analytics};
use crate::audio::{
    AudioError, AudioPlayer, LoopOutput, ProbeError, ProbeInfo, RecordFormat, Recorder, Recording,
    probe,
};
use crate::config::Settings;
use crate::library::{LimitStatus, SoundEntry, SoundStore, StoreError};
use crate::session::{ActiveSession, NowPlaying, PlaybackSession, SessionTick};
use crate::timer::{StopMode, SystemClock};

use super::BoxError;

const STAGING_DIR: &str = "staging";

pub struct Context<O: LoopOutput = AudioPlayer> {
    pub settings: Settings,
    store: SoundStore,
    session: PlaybackSession<O, SystemClock>,
    analytics: Box<dyn Analytics>,
    data_dir: PathBuf,
}

impl<O: LoopOutput> Context<O> {
    pub fn new(
        settings: Settings,
        store: SoundStore,
        output: O,
        analytics: Box<dyn Analytics>,
    ) -> Self {
        let data_dir = settings.library.resolved_data_dir();
        Self {
            settings,
            store,
            session: PlaybackSession::new(output, SystemClock),
            analytics,
            data_dir,
        }
    }

    pub fn sounds(&self) -> Vec<SoundEntry> {
        self.store.list().to_vec()
    }

    pub fn get(&self, id: &str) -> Option<&SoundEntry> {
        self.store.get(id)
    }

    pub fn status(&self) -> LimitStatus {
        self.store.status()
    }

    pub fn max_recording(&self) -> Duration {
        Duration::from_secs(u64::from(self.store.limits().max_duration_seconds))
    }

    /// Size and length of `path`, checked against the upload cap.
    pub fn probe(&self, path: &Path) -> Result<ProbeInfo, ProbeError> {
        probe(path, self.store.limits().max_upload_bytes)
    }

    /// Probe `path` and save it under `name`, or its suggested name.
    pub fn import(&mut self, path: &Path, name: Option<&str>) -> Result<SoundEntry, BoxError> {
        let info = match self.probe(path) {
            Ok(info) => info,
            Err(e) => {
                let reason = match e {
                    ProbeError::TooLarge { .. } => "too_large",
                    ProbeError::Io { .. } | ProbeError::NotAFile(_) => "unreadable",
                };
                self.track_rejection(reason, "import");
                return Err(e.into());
            }
        };
        let name = name.unwrap_or(&info.suggested_name).to_string();
        Ok(self.save_probed(&info, &name)?)
    }

    pub fn save_probed(&mut self, info: &ProbeInfo, name: &str) -> Result<SoundEntry, StoreError> {
        self.save(name, &info.path, info.duration_seconds, "import")
    }

    /// Where the next recording is captured before it is saved.
    pub fn staging_path(&self) -> PathBuf {
        let stamp = Utc::now().format("%Y%m%d-%H%M%S%3f");
        self.data_dir
            .join(STAGING_DIR)
            .join(format!("rec-{stamp}.wav"))
    }

    pub fn start_recording(&self) -> Result<Recorder, AudioError> {
        let format = RecordFormat::from(self.settings.recording.format);
        Recorder::start(&self.staging_path(), format)
    }

    /// Save a finished recording; the staged file is removed either way.
    pub fn save_recording(
        &mut self,
        recording: &Recording,
        name: &str,
    ) -> Result<SoundEntry, StoreError> {
        let result = self.save(name, &recording.path, recording.duration_seconds, "record");
        discard_staged(&recording.path);
        result
    }

    pub fn rename(&mut self, id: &str, name: &str) -> Result<(), StoreError> {
        self.store.rename(id, name)?;
        self.analytics
            .track(analytics::SOUND_RENAMED, &[("id", id.to_string())]);
        Ok(())
    }

    /// Delete a sound; if it is the one playing, playback stops once the
    /// index no longer lists it.
    pub fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        self.store.delete(id)?;
        if self.playing_id() == Some(id) {
            self.stop_with_reason("deleted");
        }
        self.analytics.track(
            analytics::SOUND_DELETED,
            &[
                ("id", id.to_string()),
                ("remaining", self.store.count().to_string()),
            ],
        );
        Ok(())
    }

    pub fn prune(&mut self) -> Result<Vec<SoundEntry>, StoreError> {
        self.store.prune_missing()
    }

    /// Loop sound `id` under `mode`; returns the stop instant if there is one.
    pub fn play(&mut self, id: &str, mode: StopMode) -> Result<Option<DateTime<Utc>>, BoxError> {
        let entry = self
            .store
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let previous = self.playing_id().map(str::to_string);

        let result = self.session.start(&entry, mode);
        if let Some(prev) = previous {
            self.analytics.track(
                analytics::PLAYBACK_STOPPED,
                &[("id", prev), ("reason", "replaced".to_string())],
            );
        }
        let end = result?;

        let mut props = vec![
            ("id", entry.id.clone()),
            ("mode", mode.label().to_string()),
        ];
        if let StopMode::Duration(d) = mode {
            props.push(("minutes", (d.as_secs() / 60).to_string()));
        }
        self.analytics.track(analytics::PLAYBACK_STARTED, &props);
        Ok(end)
    }

    pub fn stop(&mut self) -> Option<ActiveSession> {
        self.stop_with_reason("user")
    }

    /// Advance the session; reports an auto-stop once.
    pub fn tick(&mut self) -> SessionTick {
        let tick = self.session.tick();
        if let SessionTick::Stopped(stopped) = &tick {
            self.analytics.track(
                analytics::PLAYBACK_STOPPED,
                &[
                    ("id", stopped.sound_id.clone()),
                    ("reason", stopped.mode.label().to_string()),
                ],
            );
        }
        tick
    }

    pub fn now_playing(&self) -> Option<NowPlaying> {
        self.session.now_playing()
    }

    pub fn is_playing(&self) -> bool {
        self.session.is_active()
    }

    /// True while an auto-stop is pending.
    pub fn has_deadline(&self) -> bool {
        self.session.timer().is_armed()
    }

    pub fn playing_entry(&self) -> Option<&SoundEntry> {
        self.playing_id().and_then(|id| self.store.get(id))
    }

    fn playing_id(&self) -> Option<&str> {
        self.session.current().map(|s| s.sound_id.as_str())
    }

    fn stop_with_reason(&mut self, reason: &str) -> Option<ActiveSession> {
        let stopped = self.session.stop()?;
        self.analytics.track(
            analytics::PLAYBACK_STOPPED,
            &[
                ("id", stopped.sound_id.clone()),
                ("reason", reason.to_string()),
            ],
        );
        Some(stopped)
    }

    fn save(
        &mut self,
        name: &str,
        source: &Path,
        duration_seconds: u32,
        origin: &str,
    ) -> Result<SoundEntry, StoreError> {
        match self.store.save(name, source, duration_seconds) {
            Ok(entry) => {
                self.analytics.track(
                    analytics::SOUND_SAVED,
                    &[
                        ("id", entry.id.clone()),
                        ("origin", origin.to_string()),
                        ("duration", entry.duration_seconds.to_string()),
                        ("count", self.store.count().to_string()),
                    ],
                );
                Ok(entry)
            }
            Err(e) => {
                self.track_rejection(e.kind(), origin);
                Err(e)
            }
        }
    }

    fn track_rejection(&self, reason: &str, origin: &str) {
        self.analytics.track(
            analytics::SAVE_REJECTED,
            &[
                ("reason", reason.to_string()),
                ("origin", origin.to_string()),
            ],
        );
    }
}

impl Context<AudioPlayer> {
    /// Stop playback and let the audio thread fade out and exit.
    pub fn shutdown(&mut self) {
        self.stop_with_reason("quit");
        let fade = Duration::from_millis(self.settings.playback.quit_fade_out_ms);
        self.session.output().quit_softly(fade);
    }
}

fn discard_staged(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        tracing::debug!(?path, error = %e, "could not remove staged recording");
    }
}
