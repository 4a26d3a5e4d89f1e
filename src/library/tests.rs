use super::index::{IndexSlot, JsonFileSlot};
use super::limits::{MAX_DURATION_SECONDS, MAX_SOUNDS};
use super::payload::PayloadDir;
use super::*;
use crate::config::LibrarySettings;
use std::cell::{Cell, RefCell};
use std::io;
use std::path::{Path, PathBuf};

/// In-memory index slot that can be told to fail writes.
#[derive(Default)]
struct MemorySlot {
    contents: RefCell<Option<String>>,
    fail_writes: Cell<bool>,
}

impl IndexSlot for &MemorySlot {
    fn load(&self) -> io::Result<Option<String>> {
        Ok(self.contents.borrow().clone())
    }

    fn store(&self, contents: &str) -> io::Result<()> {
        if self.fail_writes.get() {
            return Err(io::Error::other("disk full"));
        }
        *self.contents.borrow_mut() = Some(contents.to_string());
        Ok(())
    }
}

fn source_file(dir: &Path, name: &str) -> PathBuf {
    let p = dir.join(name);
    std::fs::write(&p, b"RIFF....WAVEfmt fake audio payload").unwrap();
    p
}

fn payload_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|rd| rd.count()).unwrap_or(0)
}

#[test]
fn save_then_get_returns_the_saved_entry() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source_file(tmp.path(), "rain.wav");
    let mut store = SoundStore::open_dir(&tmp.path().join("data"));

    let saved = store.save("Rain", &src, 120).unwrap();

    assert_eq!(store.count(), 1);
    assert_eq!(store.get(&saved.id), Some(&saved));
    assert_eq!(saved.name, "Rain");
    assert_eq!(saved.duration_seconds, 120);
    assert!(saved.file_path.is_file());
    assert_eq!(
        saved.file_path.file_name().unwrap().to_str().unwrap(),
        format!("{}.wav", saved.id)
    );
}

#[test]
fn sixth_save_is_rejected_and_leaves_index_unchanged() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source_file(tmp.path(), "rain.wav");
    let slot = MemorySlot::default();
    let payloads = PayloadDir::new(tmp.path().join("sounds"));
    let mut store = SoundStore::open(&slot, payloads, Limits::FREE);

    for name in ["Rain", "Fan", "Waves", "Brown noise", "Train"] {
        store.save(name, &src, 120).unwrap();
    }
    assert_eq!(store.count(), MAX_SOUNDS);

    let before = slot.contents.borrow().clone();
    let err = store.save("One more", &src, 10).unwrap_err();
    assert!(matches!(err, StoreError::CapacityExceeded { max: 5 }));
    assert_eq!(store.count(), 5);
    assert_eq!(*slot.contents.borrow(), before);
    assert_eq!(payload_files(&tmp.path().join("sounds")), 5);
}

#[test]
fn over_long_sound_is_rejected_without_copying() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source_file(tmp.path(), "long.mp3");
    let sounds = tmp.path().join("sounds");
    let slot = MemorySlot::default();
    let mut store = SoundStore::open(&slot, PayloadDir::new(&sounds), Limits::FREE);

    let err = store
        .save("Long", &src, MAX_DURATION_SECONDS + 1)
        .unwrap_err();

    assert!(matches!(
        err,
        StoreError::DurationExceeded {
            actual: 301,
            max: 300
        }
    ));
    assert!(err.to_string().contains("5 minute limit"));
    assert_eq!(store.count(), 0);
    assert_eq!(payload_files(&sounds), 0);
    assert!(slot.contents.borrow().is_none());
}

#[test]
fn duration_at_the_limit_is_accepted() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source_file(tmp.path(), "edge.ogg");
    let mut store = SoundStore::open_dir(&tmp.path().join("data"));

    assert!(store.save("Edge", &src, MAX_DURATION_SECONDS).is_ok());
}

#[test]
fn capacity_is_checked_before_duration() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source_file(tmp.path(), "a.wav");
    let limits = Limits {
        max_sounds: 1,
        ..Limits::FREE
    };
    let slot = MemorySlot::default();
    let mut store = SoundStore::open(&slot, PayloadDir::new(tmp.path().join("s")), limits);

    store.save("A", &src, 1).unwrap();
    let err = store.save("B", &src, 10_000).unwrap_err();
    assert!(matches!(err, StoreError::CapacityExceeded { max: 1 }));
}

#[test]
fn delete_removes_entry_and_file_then_reports_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source_file(tmp.path(), "rain.wav");
    let mut store = SoundStore::open_dir(&tmp.path().join("data"));
    let saved = store.save("Rain", &src, 30).unwrap();

    store.delete(&saved.id).unwrap();

    assert!(store.get(&saved.id).is_none());
    assert!(!saved.file_path.exists());
    assert!(matches!(
        store.delete(&saved.id),
        Err(StoreError::NotFound(id)) if id == saved.id
    ));
}

#[test]
fn delete_succeeds_when_file_is_already_gone() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source_file(tmp.path(), "rain.wav");
    let mut store = SoundStore::open_dir(&tmp.path().join("data"));
    let saved = store.save("Rain", &src, 30).unwrap();
    std::fs::remove_file(&saved.file_path).unwrap();

    store.delete(&saved.id).unwrap();
    assert_eq!(store.count(), 0);
}

#[test]
fn failed_index_write_on_delete_keeps_entry_and_file() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source_file(tmp.path(), "rain.wav");
    let slot = MemorySlot::default();
    let mut store = SoundStore::open(&slot, PayloadDir::new(tmp.path().join("s")), Limits::FREE);
    let saved = store.save("Rain", &src, 30).unwrap();

    slot.fail_writes.set(true);
    let err = store.delete(&saved.id).unwrap_err();

    assert!(matches!(err, StoreError::Storage { .. }));
    assert_eq!(store.get(&saved.id), Some(&saved));
    assert!(saved.file_path.is_file());
}

#[test]
fn rename_changes_only_the_name() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source_file(tmp.path(), "rain.wav");
    let mut store = SoundStore::open_dir(&tmp.path().join("data"));
    let saved = store.save("Rain", &src, 45).unwrap();

    store.rename(&saved.id, "  Heavy rain ").unwrap();

    let renamed = store.get(&saved.id).unwrap();
    assert_eq!(renamed.name, "Heavy rain");
    assert_eq!(
        SoundEntry {
            name: saved.name.clone(),
            ..renamed.clone()
        },
        saved
    );
}

#[test]
fn rename_unknown_id_is_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let mut store = SoundStore::open_dir(tmp.path());
    assert!(matches!(
        store.rename("sound_000000000000", "x"),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn blank_names_are_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source_file(tmp.path(), "rain.wav");
    let mut store = SoundStore::open_dir(&tmp.path().join("data"));

    assert!(matches!(
        store.save("   ", &src, 10),
        Err(StoreError::InvalidName)
    ));
    let saved = store.save("Rain", &src, 10).unwrap();
    assert!(matches!(
        store.rename(&saved.id, ""),
        Err(StoreError::InvalidName)
    ));
    assert_eq!(store.get(&saved.id).unwrap().name, "Rain");
}

#[test]
fn reopening_preserves_entries_and_order() {
    let tmp = tempfile::tempdir().unwrap();
    let data = tmp.path().join("data");
    let src = source_file(tmp.path(), "rain.wav");

    let saved: Vec<SoundEntry> = {
        let mut store = SoundStore::open_dir(&data);
        ["Rain", "Fan", "Waves"]
            .iter()
            .map(|n| store.save(n, &src, 60).unwrap())
            .collect()
    };

    let reopened = SoundStore::open_dir(&data);
    assert_eq!(reopened.list(), saved.as_slice());
}

#[test]
fn unreadable_index_is_treated_as_empty() {
    let slot = MemorySlot::default();
    *slot.contents.borrow_mut() = Some("{ not json".to_string());
    let tmp = tempfile::tempdir().unwrap();

    let store = SoundStore::open(&slot, PayloadDir::new(tmp.path()), Limits::FREE);
    assert!(store.list().is_empty());
    assert_eq!(store.count(), 0);
}

#[test]
fn index_uses_the_documented_field_names() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source_file(tmp.path(), "rain.wav");
    let slot = MemorySlot::default();
    let mut store = SoundStore::open(&slot, PayloadDir::new(tmp.path().join("s")), Limits::FREE);
    store.save("Rain", &src, 12).unwrap();

    let raw = slot.contents.borrow().clone().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let record = &value.as_array().unwrap()[0];
    for key in ["id", "name", "filePath", "duration", "createdAt"] {
        assert!(record.get(key).is_some(), "missing key: {key}");
    }
    assert_eq!(record["duration"], 12);
}

#[test]
fn missing_source_file_is_a_storage_failure_with_no_entry() {
    let tmp = tempfile::tempdir().unwrap();
    let slot = MemorySlot::default();
    let mut store = SoundStore::open(&slot, PayloadDir::new(tmp.path().join("s")), Limits::FREE);

    let err = store
        .save("Ghost", &tmp.path().join("nope.wav"), 10)
        .unwrap_err();

    assert!(matches!(err, StoreError::Storage { .. }));
    assert_eq!(store.count(), 0);
    assert!(slot.contents.borrow().is_none());
}

#[test]
fn failed_index_write_on_save_leaves_no_referenced_file() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source_file(tmp.path(), "rain.wav");
    let sounds = tmp.path().join("s");
    let slot = MemorySlot::default();
    slot.fail_writes.set(true);
    let mut store = SoundStore::open(&slot, PayloadDir::new(&sounds), Limits::FREE);

    let err = store.save("Rain", &src, 10).unwrap_err();

    assert_eq!(err.kind(), "storage_failure");
    assert_eq!(store.count(), 0);
    assert_eq!(payload_files(&sounds), 0);
}

#[test]
fn ids_are_unique_and_well_formed() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source_file(tmp.path(), "rain.wav");
    let mut store = SoundStore::open_dir(&tmp.path().join("data"));

    let a = store.save("A", &src, 1).unwrap();
    store.delete(&a.id).unwrap();
    let b = store.save("B", &src, 1).unwrap();
    let c = store.save("C", &src, 1).unwrap();

    for e in [&a, &b, &c] {
        let hex = e.id.strip_prefix("sound_").unwrap();
        assert_eq!(hex.len(), 18);
        assert!(hex.chars().all(|ch| ch.is_ascii_hexdigit() && !ch.is_ascii_uppercase()));
        let stamp = u64::from_str_radix(&hex[..12], 16).unwrap();
        assert_eq!(stamp as i64, e.created_at.timestamp_millis());
    }
    assert_ne!(a.id, b.id);
    assert_ne!(b.id, c.id);
}

#[test]
fn ids_issued_after_a_delete_are_stamped_later() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source_file(tmp.path(), "rain.wav");
    let mut store = SoundStore::open_dir(&tmp.path().join("data"));

    let old = store.save("Old", &src, 1).unwrap();
    store.delete(&old.id).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let new = store.save("New", &src, 1).unwrap();

    assert_ne!(old.id, new.id);
    assert!(new.id[6..18] > old.id[6..18]);
}

#[test]
fn prune_missing_drops_entries_without_files() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source_file(tmp.path(), "rain.wav");
    let mut store = SoundStore::open_dir(&tmp.path().join("data"));
    let keep = store.save("Keep", &src, 5).unwrap();
    let lost = store.save("Lost", &src, 5).unwrap();
    std::fs::remove_file(&lost.file_path).unwrap();

    let dropped = store.prune_missing().unwrap();

    assert_eq!(dropped, vec![lost]);
    assert_eq!(store.list(), &[keep]);
    assert!(store.prune_missing().unwrap().is_empty());
}

#[test]
fn status_reports_remaining_quota() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source_file(tmp.path(), "rain.wav");
    let mut store = SoundStore::open_dir(&tmp.path().join("data"));
    store.save("Rain", &src, 5).unwrap();
    store.save("Fan", &src, 5).unwrap();

    let status = store.status();
    assert_eq!(status.count, 2);
    assert_eq!(status.max_sounds, 5);
    assert_eq!(status.remaining, 3);
    assert_eq!(status.max_duration_seconds, 300);
    assert!(!status.is_full());
}

#[test]
fn json_file_slot_replaces_contents() {
    let tmp = tempfile::tempdir().unwrap();
    let slot = JsonFileSlot::new(tmp.path().join("nested").join("index.json"));

    assert_eq!(slot.load().unwrap(), None);
    slot.store("[1]").unwrap();
    slot.store("[2]").unwrap();
    assert_eq!(slot.load().unwrap().as_deref(), Some("[2]"));
}

#[test]
fn scan_filters_by_extension_and_hidden_files() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    std::fs::create_dir_all(root.join("sub")).unwrap();
    std::fs::create_dir_all(root.join(".hidden")).unwrap();
    std::fs::write(root.join("b.MP3"), b"x").unwrap();
    std::fs::write(root.join("a.wav"), b"xy").unwrap();
    std::fs::write(root.join("notes.txt"), b"x").unwrap();
    std::fs::write(root.join("sub").join("c.ogg"), b"x").unwrap();
    std::fs::write(root.join(".hidden").join("d.wav"), b"x").unwrap();

    let settings = LibrarySettings {
        include_hidden: false,
        ..LibrarySettings::default()
    };
    let found: Vec<String> = scan(root, &settings)
        .into_iter()
        .map(|c| c.display.replace('\\', "/"))
        .collect();
    assert_eq!(found, vec!["a.wav", "b.MP3", "sub/c.ogg"]);

    let flat = LibrarySettings {
        recursive: false,
        include_hidden: false,
        ..LibrarySettings::default()
    };
    assert_eq!(scan(root, &flat).len(), 2);
}
