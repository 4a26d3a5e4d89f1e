//! Audio subsystem boundary.
//!
//! Playback runs on a dedicated thread driven by `AudioCmd` messages, file
//! probing measures what an import would cost against the limits, and the
//! recorder captures the default microphone into a WAV file.

mod player;
mod probe;
mod recorder;
mod sink;
mod thread;
mod types;

pub use player::AudioPlayer;
pub use probe::{ProbeError, ProbeInfo, probe};
pub use recorder::{RecordFormat, Recorder, Recording};
pub use types::{AudioError, LoopOutput};

#[cfg(test)]
mod tests;
