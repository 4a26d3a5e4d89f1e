//! Audio-related small types: commands, errors and the playback seam.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

use thiserror::Error;

/// Anything that can loop one file at a time.
///
/// Both calls return once the audio side has acted on them.
pub trait LoopOutput {
    /// Replace whatever is loaded with `path`, looping forever.
    fn start_loop(&mut self, path: &Path) -> Result<(), AudioError>;
    /// Stop and release the loaded file.
    fn stop(&mut self) -> Result<(), AudioError>;
}

pub type Reply = Sender<Result<(), AudioError>>;

#[derive(Debug)]
pub enum AudioCmd {
    /// Load `path` and start looping it, replacing the current sound.
    Load { path: PathBuf, reply: Reply },
    /// Stop playback and drop the current sound.
    Stop { reply: Reply },
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output device available")]
    NoOutputDevice,

    #[error("no audio input device available")]
    NoInputDevice,

    #[error("nothing is loaded")]
    NotLoaded,

    #[error("cannot open {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot decode {}: {reason}", .path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("recording failed: {0}")]
    Input(String),

    #[error("cannot write recording {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    #[error("audio thread has stopped")]
    Disconnected,
}
