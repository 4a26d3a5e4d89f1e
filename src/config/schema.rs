use std::path::PathBuf;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/soundloop/config.toml` or `~/.config/soundloop/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `SOUNDLOOP__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub library: LibrarySettings,
    pub playback: PlaybackSettings,
    pub recording: RecordingSettings,
    pub ui: UiSettings,
    pub analytics: AnalyticsSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Where the sound index and copied sounds live.
    /// Defaults to `$XDG_DATA_HOME/soundloop` or `~/.local/share/soundloop`.
    pub data_dir: Option<PathBuf>,
    /// Directory the import picker starts in. Defaults to the working directory.
    pub import_dir: Option<PathBuf>,
    /// File extensions offered for import (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks while scanning for importable files.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            data_dir: None,
            import_dir: None,
            extensions: vec![
                "mp3".into(),
                "m4a".into(),
                "wav".into(),
                "ogg".into(),
                "flac".into(),
            ],
            follow_links: true,
            include_hidden: false,
            recursive: true,
            max_depth: Some(4),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Stop policy preselected when the app starts.
    pub default_mode: StopModeSetting,
    /// Length of the `duration` mode, in minutes.
    pub duration_minutes: u64,
    /// Wall-clock time used by the `alarm` mode, `HH:MM` (24h).
    pub alarm_time: String,
    /// Output volume, 0.0 ..= 1.0.
    pub volume: f32,
    /// Fade-out duration when quitting (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            default_mode: StopModeSetting::Indefinite,
            duration_minutes: 30,
            alarm_time: "07:00".to_string(),
            volume: 1.0,
            quit_fade_out_ms: 500,
        }
    }
}

impl PlaybackSettings {
    pub fn alarm_time(&self) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(self.alarm_time.trim(), "%H:%M").ok()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopModeSetting {
    #[serde(alias = "forever", alias = "loop")]
    Indefinite,
    #[serde(alias = "timer", alias = "for")]
    Duration,
    #[serde(alias = "until", alias = "at")]
    Alarm,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RecordingSettings {
    /// Container/sample layout written by the recorder.
    pub format: RecordFormatSetting,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordFormatSetting {
    #[default]
    #[serde(alias = "wav", alias = "wav_16", alias = "wav-16")]
    Wav16,
    #[serde(alias = "wav_float", alias = "wavfloat")]
    WavFloat,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// Ask before deleting a sound.
    pub confirm_delete: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ loop it, then let it go ~ ".to_string(),
            confirm_delete: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalyticsSettings {
    /// Forward usage events to the analytics log target.
    pub enabled: bool,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive. `SOUNDLOOP_LOG` wins when set.
    pub filter: String,
    /// Log file path. Defaults to `<data_dir>/soundloop.log`.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            file: None,
        }
    }
}
