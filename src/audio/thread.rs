use std::sync::mpsc::Receiver;
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use rodio::{OutputStreamBuilder, Sink};

use super::sink::create_looping_sink;
use super::types::{AudioCmd, AudioError};

pub(super) fn spawn_audio_thread(rx: Receiver<AudioCmd>, initial_volume: f32) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(s) => Some(s),
            Err(e) => {
                tracing::error!(error = %e, "no audio output device; playback disabled");
                None
            }
        };
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy for a TUI app.
        if let Some(s) = stream.as_mut() {
            s.log_on_drop(false);
        }

        let mut sink: Option<Sink> = None;
        let volume = initial_volume;

        while let Ok(cmd) = rx.recv() {
            match cmd {
                AudioCmd::Load { path, reply } => {
                    // Never two handles at once: drop the old sink before decoding the new one.
                    if let Some(old) = sink.take() {
                        old.stop();
                    }

                    let result = match stream.as_ref() {
                        None => Err(AudioError::NoOutputDevice),
                        Some(stream) => create_looping_sink(stream, &path).map(|new_sink| {
                            new_sink.set_volume(volume);
                            new_sink.play();
                            sink = Some(new_sink);
                        }),
                    };

                    match &result {
                        Ok(()) => tracing::debug!(?path, "loop started"),
                        Err(e) => tracing::warn!(?path, error = %e, "loop failed to start"),
                    }
                    let _ = reply.send(result);
                }

                AudioCmd::Stop { reply } => {
                    let result = match sink.take() {
                        Some(s) => {
                            s.stop();
                            Ok(())
                        }
                        None => Err(AudioError::NotLoaded),
                    };
                    let _ = reply.send(result);
                }

                AudioCmd::Quit { fade_out_ms } => {
                    if let Some(s) = sink.take() {
                        fade_out_sink(&s, volume, fade_out_ms);
                        s.stop();
                    }
                    break;
                }
            }
        }

        tracing::debug!("audio thread exiting");
    })
}

fn fade_out_sink(sink: &Sink, from: f32, fade_out_ms: u64) {
    if fade_out_ms == 0 || sink.is_paused() {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        sink.set_volume(from * (1.0 - t));
        thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}
