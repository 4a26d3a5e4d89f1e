//! Private storage area for copied audio payloads.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Where the store keeps one audio file per saved sound.
pub trait PayloadArea {
    /// Copy `source` into the area under a name derived from `stem` and
    /// return the new location.
    fn import(&self, source: &Path, stem: &str) -> io::Result<PathBuf>;
    fn remove(&self, path: &Path) -> io::Result<()>;
    fn exists(&self, path: &Path) -> bool;
}

/// Payload area backed by a plain directory.
#[derive(Debug, Clone)]
pub struct PayloadDir {
    root: PathBuf,
}

impl PayloadDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

/// `<stem>.<ext>` using the source's extension, lower-cased.
pub(crate) fn payload_file_name(source: &Path, stem: &str) -> String {
    let ext = source
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.trim().to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| "bin".to_string());
    format!("{stem}.{ext}")
}

impl PayloadArea for PayloadDir {
    fn import(&self, source: &Path, stem: &str) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.root)?;
        let dest = self.root.join(payload_file_name(source, stem));
        if let Err(e) = fs::copy(source, &dest) {
            // Don't leave a truncated copy behind.
            let _ = fs::remove_file(&dest);
            return Err(e);
        }
        Ok(dest)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}
