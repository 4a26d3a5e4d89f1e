use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A saved sound as persisted in the index.
///
/// Only `name` changes after creation (through `SoundStore::rename`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoundEntry {
    pub id: String,
    pub name: String,
    pub file_path: PathBuf,
    #[serde(rename = "duration")]
    pub duration_seconds: u32,
    pub created_at: DateTime<Utc>,
}

impl SoundEntry {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.duration_seconds))
    }
}

/// An audio file found on disk that can be imported into the library.
#[derive(Debug, Clone)]
pub struct ImportCandidate {
    pub path: PathBuf,
    pub display: String,
    pub size_bytes: u64,
}
