use std::io;

use thiserror::Error;

/// Failures surfaced by [`SoundStore`](super::SoundStore).
///
/// Limit and lookup failures are expected outcomes; anything the filesystem
/// throws at us is folded into [`StoreError::Storage`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sound limit reached ({max} sounds); delete a sound to make room")]
    CapacityExceeded { max: usize },

    #[error("sound duration exceeds the {} minute limit ({actual}s > {max}s)", .max / 60)]
    DurationExceeded { actual: u32, max: u32 },

    #[error("no sound with id {0}")]
    NotFound(String),

    #[error("sound name must not be empty")]
    InvalidName,

    #[error("failed to {action}")]
    Storage {
        action: &'static str,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    pub(super) fn storage(action: &'static str, source: io::Error) -> Self {
        Self::Storage { action, source }
    }

    /// Short machine-friendly reason, used as an analytics property.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CapacityExceeded { .. } => "capacity_exceeded",
            Self::DurationExceeded { .. } => "duration_exceeded",
            Self::NotFound(_) => "not_found",
            Self::InvalidName => "invalid_name",
            Self::Storage { .. } => "storage_failure",
        }
    }
}
