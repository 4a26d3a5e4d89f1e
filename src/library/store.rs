use std::io;
use std::path::Path;

use chrono::{DateTime, SubsecRound, Utc};
use rand::Rng;

use super::error::StoreError;
use super::index::{IndexSlot, JsonFileSlot};
use super::limits::{LimitStatus, Limits};
use super::model::SoundEntry;
use super::payload::{PayloadArea, PayloadDir};

const INDEX_FILE: &str = "sounds.json";
const PAYLOAD_DIR: &str = "sounds";

/// Durable list of saved sounds plus their audio payloads.
///
/// The index is loaded once on open and rewritten wholesale after every
/// mutation. In-memory state only changes once the index write succeeded, so
/// a failed write leaves the store exactly as it was.
pub struct SoundStore<S = JsonFileSlot, P = PayloadDir> {
    slot: S,
    payloads: P,
    limits: Limits,
    entries: Vec<SoundEntry>,
}

impl SoundStore<JsonFileSlot, PayloadDir> {
    /// Open the on-disk store rooted at `data_dir` with the free-tier limits.
    pub fn open_dir(data_dir: &Path) -> Self {
        Self::open(
            JsonFileSlot::new(data_dir.join(INDEX_FILE)),
            PayloadDir::new(data_dir.join(PAYLOAD_DIR)),
            Limits::FREE,
        )
    }
}

impl<S: IndexSlot, P: PayloadArea> SoundStore<S, P> {
    pub fn open(slot: S, payloads: P, limits: Limits) -> Self {
        let entries = load_entries(&slot);
        tracing::debug!(count = entries.len(), "sound index loaded");
        Self {
            slot,
            payloads,
            limits,
            entries,
        }
    }

    /// All saved sounds in insertion order.
    pub fn list(&self) -> &[SoundEntry] {
        &self.entries
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, id: &str) -> Option<&SoundEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn status(&self) -> LimitStatus {
        self.limits.status(self.count())
    }

    /// Copy `source` into the library as a new sound.
    pub fn save(
        &mut self,
        name: &str,
        source: &Path,
        duration_seconds: u32,
    ) -> Result<SoundEntry, StoreError> {
        let name = clean_name(name)?;

        if self.count() >= self.limits.max_sounds {
            return Err(StoreError::CapacityExceeded {
                max: self.limits.max_sounds,
            });
        }
        if duration_seconds > self.limits.max_duration_seconds {
            return Err(StoreError::DurationExceeded {
                actual: duration_seconds,
                max: self.limits.max_duration_seconds,
            });
        }

        let created_at = Utc::now().trunc_subsecs(3);
        let id = self.fresh_id(created_at);
        let file_path = self
            .payloads
            .import(source, &id)
            .map_err(|e| StoreError::storage("copy the audio file into the library", e))?;

        let entry = SoundEntry {
            id,
            name,
            file_path,
            duration_seconds,
            created_at,
        };

        let mut next = self.entries.clone();
        next.push(entry.clone());
        if let Err(e) = self.write(&next) {
            // Nothing references the copy; try not to leave it lying around.
            if let Err(rm) = self.payloads.remove(&entry.file_path) {
                tracing::debug!(path = ?entry.file_path, error = %rm, "orphaned payload left behind");
            }
            return Err(e);
        }
        self.entries = next;

        tracing::info!(
            id = %entry.id,
            name = %entry.name,
            duration = entry.duration_seconds,
            "sound saved"
        );
        Ok(entry)
    }

    /// Replace the display name of an existing sound. No other field changes.
    pub fn rename(&mut self, id: &str, new_name: &str) -> Result<(), StoreError> {
        let name = clean_name(new_name)?;
        let pos = self.position(id)?;

        let mut next = self.entries.clone();
        next[pos].name = name;
        self.write(&next)?;
        self.entries = next;

        tracing::info!(id, "sound renamed");
        Ok(())
    }

    /// Remove a sound from the index and delete its payload.
    ///
    /// Failing to delete the payload file is logged and otherwise ignored.
    pub fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        let pos = self.position(id)?;

        let mut next = self.entries.clone();
        let removed = next.remove(pos);
        self.write(&next)?;
        self.entries = next;

        if let Err(e) = self.payloads.remove(&removed.file_path) {
            tracing::warn!(path = ?removed.file_path, error = %e, "could not delete sound file");
        }

        tracing::info!(id, "sound deleted");
        Ok(())
    }

    /// Drop entries whose payload file has disappeared. Returns what was dropped.
    pub fn prune_missing(&mut self) -> Result<Vec<SoundEntry>, StoreError> {
        let (kept, missing): (Vec<SoundEntry>, Vec<SoundEntry>) = self
            .entries
            .iter()
            .cloned()
            .partition(|e| self.payloads.exists(&e.file_path));

        if missing.is_empty() {
            return Ok(missing);
        }

        self.write(&kept)?;
        self.entries = kept;
        for e in &missing {
            tracing::warn!(id = %e.id, path = ?e.file_path, "dropped sound with missing file");
        }
        Ok(missing)
    }

    fn position(&self, id: &str) -> Result<usize, StoreError> {
        self.entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn write(&self, entries: &[SoundEntry]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| StoreError::storage("encode the sound index", io::Error::from(e)))?;
        self.slot
            .store(&json)
            .map_err(|e| StoreError::storage("write the sound index", e))
    }

    /// `sound_<creation millis as 12 hex><24 random bits as 6 hex>`.
    ///
    /// A deleted id only comes back if the clock revisits its millisecond and
    /// the random suffix repeats too; live collisions are regenerated.
    fn fresh_id(&self, created_at: DateTime<Utc>) -> String {
        let stamp = u64::try_from(created_at.timestamp_millis()).unwrap_or(0) & 0xffff_ffff_ffff;
        let mut rng = rand::thread_rng();
        loop {
            let id = format!("sound_{stamp:012x}{:06x}", rng.r#gen::<u32>() & 0xff_ffff);
            if self.get(&id).is_none() {
                return id;
            }
        }
    }
}

fn clean_name(name: &str) -> Result<String, StoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::InvalidName);
    }
    Ok(name.to_string())
}

fn load_entries<S: IndexSlot>(slot: &S) -> Vec<SoundEntry> {
    match slot.load() {
        Ok(Some(raw)) => match serde_json::from_str::<Vec<SoundEntry>>(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "sound index is unreadable; starting empty");
                Vec::new()
            }
        },
        Ok(None) => Vec::new(),
        Err(e) => {
            tracing::warn!(error = %e, "could not read sound index; starting empty");
            Vec::new()
        }
    }
}
