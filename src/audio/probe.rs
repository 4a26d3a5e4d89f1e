//! Size and length of a file the user wants to import.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lofty::prelude::*;
use thiserror::Error;

/// Bit rate assumed when a file's real length cannot be measured.
const ESTIMATE_BITS_PER_SECOND: u64 = 128_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeInfo {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub duration_seconds: u32,
    /// False when `duration_seconds` was estimated from the file size.
    pub measured: bool,
    /// Title tag if present, else the file stem.
    pub suggested_name: String,
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("cannot read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not a regular file", .0.display())]
    NotAFile(PathBuf),

    #[error("file is {} MB; imports are limited to {} MB", mb(.size_bytes), mb(.max_bytes))]
    TooLarge { size_bytes: u64, max_bytes: u64 },
}

fn mb(bytes: &u64) -> String {
    let mb = *bytes as f64 / (1024.0 * 1024.0);
    if mb.fract() == 0.0 {
        format!("{mb:.0}")
    } else {
        format!("{mb:.1}")
    }
}

/// Inspect `path` ahead of an import, rejecting files over `max_bytes`.
pub fn probe(path: &Path, max_bytes: u64) -> Result<ProbeInfo, ProbeError> {
    let meta = fs::metadata(path).map_err(|source| ProbeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if !meta.is_file() {
        return Err(ProbeError::NotAFile(path.to_path_buf()));
    }

    let size_bytes = meta.len();
    if size_bytes > max_bytes {
        return Err(ProbeError::TooLarge {
            size_bytes,
            max_bytes,
        });
    }

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Untitled")
        .to_string();

    let (measured, title) = match lofty::read_from_path(path) {
        Ok(tagged) => {
            let duration = tagged.properties().duration();
            let title = tagged
                .primary_tag()
                .or_else(|| tagged.first_tag())
                .and_then(|tag| tag.title().map(|t| t.trim().to_string()))
                .filter(|t| !t.is_empty());
            ((!duration.is_zero()).then_some(duration), title)
        }
        Err(e) => {
            tracing::debug!(?path, error = %e, "could not read audio properties");
            (None, None)
        }
    };

    let duration_seconds = match measured {
        Some(d) => whole_seconds(d),
        None => estimate_seconds(size_bytes),
    };

    Ok(ProbeInfo {
        path: path.to_path_buf(),
        size_bytes,
        duration_seconds,
        measured: measured.is_some(),
        suggested_name: title.unwrap_or(stem),
    })
}

/// Nearest whole second.
pub(crate) fn whole_seconds(d: Duration) -> u32 {
    d.as_secs_f64().round().min(f64::from(u32::MAX)) as u32
}

pub(crate) fn estimate_seconds(size_bytes: u64) -> u32 {
    let secs = (size_bytes * 8 + ESTIMATE_BITS_PER_SECOND / 2) / ESTIMATE_BITS_PER_SECOND;
    u32::try_from(secs).unwrap_or(u32::MAX)
}
