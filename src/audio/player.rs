use std::path::Path;
use std::sync::Mutex;
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use super::thread::spawn_audio_thread;
use super::types::{AudioCmd, AudioError, LoopOutput, Reply};

/// Handle to the playback thread.
///
/// The thread (and with it the output device) is only opened by the first
/// `start_loop`, so commands that never play leave audio alone.
pub struct AudioPlayer {
    tx: Option<Sender<AudioCmd>>,
    join: Mutex<Option<JoinHandle<()>>>,
    volume: f32,
}

impl AudioPlayer {
    pub fn new(volume: f32) -> Self {
        Self {
            tx: None,
            join: Mutex::new(None),
            volume: volume.clamp(0.0, 1.0),
        }
    }

    fn send(&self, cmd: AudioCmd) -> Result<(), AudioError> {
        match self.tx.as_ref() {
            Some(tx) => tx.send(cmd).map_err(|_| AudioError::Disconnected),
            None => Err(AudioError::NotLoaded),
        }
    }

    /// Fade out, stop the thread and wait for it.
    pub fn quit_softly(&self, fade_out: Duration) {
        if self.tx.is_none() {
            return;
        }
        let _ = self.send(AudioCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }

    fn sender(&mut self) -> &Sender<AudioCmd> {
        let volume = self.volume;
        let join = &self.join;
        self.tx.get_or_insert_with(|| {
            let (tx, rx) = mpsc::channel::<AudioCmd>();
            let handle = spawn_audio_thread(rx, volume);
            if let Ok(mut j) = join.lock() {
                *j = Some(handle);
            }
            tx
        })
    }

    /// Send a command carrying a reply channel and wait for the answer.
    fn request(&mut self, make: impl FnOnce(Reply) -> AudioCmd) -> Result<(), AudioError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.sender()
            .send(make(reply_tx))
            .map_err(|_| AudioError::Disconnected)?;
        reply_rx.recv().map_err(|_| AudioError::Disconnected)?
    }
}

impl LoopOutput for AudioPlayer {
    fn start_loop(&mut self, path: &Path) -> Result<(), AudioError> {
        self.request(|reply| AudioCmd::Load {
            path: path.to_path_buf(),
            reply,
        })
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        if self.tx.is_none() {
            return Err(AudioError::NotLoaded);
        }
        self.request(|reply| AudioCmd::Stop { reply })
    }
}
