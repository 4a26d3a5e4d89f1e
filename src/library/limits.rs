//! Fixed free-tier limits.

/// Maximum number of saved sounds.
pub const MAX_SOUNDS: usize = 5;
/// Maximum length of a saved sound, in seconds.
pub const MAX_DURATION_SECONDS: u32 = 5 * 60;
/// Maximum size of an imported file, in megabytes.
pub const MAX_UPLOAD_SIZE_MB: u64 = 10;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Limits {
    pub max_sounds: usize,
    pub max_duration_seconds: u32,
    pub max_upload_bytes: u64,
}

impl Limits {
    pub const FREE: Limits = Limits {
        max_sounds: MAX_SOUNDS,
        max_duration_seconds: MAX_DURATION_SECONDS,
        max_upload_bytes: MAX_UPLOAD_SIZE_MB * 1024 * 1024,
    };

    pub fn status(&self, count: usize) -> LimitStatus {
        LimitStatus {
            count,
            max_sounds: self.max_sounds,
            remaining: self.max_sounds.saturating_sub(count),
            max_duration_seconds: self.max_duration_seconds,
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::FREE
    }
}

/// Snapshot of how much of the library quota is in use.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LimitStatus {
    pub count: usize,
    pub max_sounds: usize,
    pub remaining: usize,
    pub max_duration_seconds: u32,
}

impl LimitStatus {
    pub fn is_full(&self) -> bool {
        self.remaining == 0
    }
}
