use std::path::Path;

use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::ImportCandidate;

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Find importable audio files under `dir`, sorted by name.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<ImportCandidate> {
    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    let mut found: Vec<ImportCandidate> = walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() || (settings.follow_links && e.path().is_file()))
        .filter(|e| is_audio_file(e.path(), settings))
        .map(|e| {
            let path = e.path().to_path_buf();
            let display = path
                .strip_prefix(dir)
                .unwrap_or(&path)
                .display()
                .to_string();
            let size_bytes = e.metadata().map(|m| m.len()).unwrap_or(0);
            ImportCandidate {
                path,
                display,
                size_bytes,
            }
        })
        .collect();

    found.sort_by_key(|c| c.display.to_lowercase());
    found
}
