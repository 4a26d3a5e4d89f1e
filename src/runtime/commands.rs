//! Headless subcommands.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use chrono::Local;

use crate::audio::LoopOutput;
use crate::cli::{Command, StopArgs};
use crate::config::{PlaybackSettings, Settings};
use crate::session::SessionTick;
use crate::timer::StopMode;
use crate::ui::format_clock;

use super::BoxError;
use super::context::Context;

const POLL: Duration = Duration::from_millis(100);

pub fn run<O: LoopOutput>(command: Command, ctx: &mut Context<O>) -> Result<(), BoxError> {
    let mut out = io::stdout().lock();
    match command {
        Command::List => list(ctx, &mut out),
        Command::Status => status(ctx, &mut out),
        Command::Import { path, name } => import(ctx, &path, name.as_deref(), &mut out),
        Command::Record { name, seconds } => record(ctx, &name, seconds, &mut out),
        Command::Rename { id, name } => {
            ctx.rename(&id, &name)?;
            writeln!(out, "renamed {id} to {}", name.trim())?;
            Ok(())
        }
        Command::Delete { id } => {
            ctx.delete(&id)?;
            writeln!(out, "deleted {id}")?;
            Ok(())
        }
        Command::Play { id, stop } => play(ctx, &id, &stop, &mut out),
        Command::Prune => prune(ctx, &mut out),
        Command::Config => show_config(&ctx.settings, &mut out),
    }
}

pub fn list<O: LoopOutput>(ctx: &Context<O>, out: &mut impl Write) -> Result<(), BoxError> {
    let sounds = ctx.sounds();
    if sounds.is_empty() {
        writeln!(out, "no sounds saved")?;
        return Ok(());
    }
    for e in sounds {
        writeln!(
            out,
            "{}  {:>5}  {}  {}",
            e.id,
            format_clock(e.duration()),
            e.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            e.name
        )?;
    }
    Ok(())
}

pub fn status<O: LoopOutput>(ctx: &Context<O>, out: &mut impl Write) -> Result<(), BoxError> {
    let s = ctx.status();
    writeln!(
        out,
        "{}/{} sounds, {} remaining; up to {} min per sound",
        s.count,
        s.max_sounds,
        s.remaining,
        s.max_duration_seconds / 60
    )?;
    Ok(())
}

pub fn show_config(settings: &Settings, out: &mut impl Write) -> Result<(), BoxError> {
    let text = toml::to_string_pretty(settings)?;
    write!(out, "{text}")?;
    Ok(())
}

fn import<O: LoopOutput>(
    ctx: &mut Context<O>,
    path: &Path,
    name: Option<&str>,
    out: &mut impl Write,
) -> Result<(), BoxError> {
    let entry = ctx.import(path, name)?;
    writeln!(
        out,
        "saved {} \"{}\" ({})",
        entry.id,
        entry.name,
        format_clock(entry.duration())
    )?;
    Ok(())
}

fn prune<O: LoopOutput>(ctx: &mut Context<O>, out: &mut impl Write) -> Result<(), BoxError> {
    let dropped = ctx.prune()?;
    if dropped.is_empty() {
        writeln!(out, "index is consistent")?;
    }
    for e in dropped {
        writeln!(out, "dropped {} \"{}\" (file missing)", e.id, e.name)?;
    }
    Ok(())
}

/// The stop policy for `play`: flags first, then the configured default.
pub fn stop_mode_for(stop: &StopArgs, playback: &PlaybackSettings) -> StopMode {
    if let Some(m) = stop.minutes {
        return StopMode::Duration(Duration::from_secs(m * 60));
    }
    if let Some(at) = stop.until {
        return StopMode::Alarm(at);
    }
    match playback.default_mode {
        crate::config::StopModeSetting::Indefinite => StopMode::Indefinite,
        crate::config::StopModeSetting::Duration => {
            StopMode::Duration(Duration::from_secs(playback.duration_minutes * 60))
        }
        crate::config::StopModeSetting::Alarm => match playback.alarm_time() {
            Some(at) => StopMode::Alarm(at),
            None => StopMode::Indefinite,
        },
    }
}

fn play<O: LoopOutput>(
    ctx: &mut Context<O>,
    id: &str,
    stop: &StopArgs,
    out: &mut impl Write,
) -> Result<(), BoxError> {
    let mode = stop_mode_for(stop, &ctx.settings.playback);
    let end = ctx.play(id, mode)?;
    let name = ctx.get(id).map(|e| e.name.clone()).unwrap_or_default();
    match end {
        Some(end) => writeln!(
            out,
            "looping \"{name}\" until {} (Enter stops)",
            end.with_timezone(&Local).format("%H:%M:%S")
        )?,
        None => writeln!(out, "looping \"{name}\" (Enter stops)")?,
    }

    let enter = spawn_enter_listener();
    let mut stdin_open = true;
    loop {
        match ctx.tick() {
            SessionTick::Stopped(_) => {
                writeln!(out, "\rtime is up, stopped.          ")?;
                break;
            }
            SessionTick::Idle => break,
            SessionTick::Remaining(left) => {
                write!(out, "\r{} left   ", format_clock(left))?;
                out.flush()?;
            }
            SessionTick::Looping => {}
        }

        if !stdin_open {
            thread::sleep(Duration::from_secs(1));
            continue;
        }
        match enter.recv_timeout(Duration::from_secs(1)) {
            Ok(()) => {
                ctx.stop();
                writeln!(out, "stopped.")?;
                break;
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => stdin_open = false,
        }
    }
    Ok(())
}

fn record<O: LoopOutput>(
    ctx: &mut Context<O>,
    name: &str,
    seconds: Option<u32>,
    out: &mut impl Write,
) -> Result<(), BoxError> {
    let status = ctx.status();
    if status.is_full() {
        return Err(crate::library::StoreError::CapacityExceeded {
            max: status.max_sounds,
        }
        .into());
    }

    let max = ctx.max_recording();
    let limit = seconds
        .map(|s| Duration::from_secs(u64::from(s)).min(max))
        .unwrap_or(max);

    let recorder = ctx.start_recording()?;
    writeln!(
        out,
        "recording \"{name}\" for up to {} (Enter stops)",
        format_clock(limit)
    )?;

    let enter = spawn_enter_listener();
    loop {
        let elapsed = recorder.elapsed();
        write!(out, "\r{}   ", format_clock(elapsed))?;
        out.flush()?;
        // Stop a poll early so the rounded length never exceeds the limit.
        if elapsed + POLL >= limit {
            break;
        }
        match enter.recv_timeout(POLL) {
            Ok(()) => break,
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => thread::sleep(POLL),
        }
    }

    let recording = recorder.finish()?;
    let entry = ctx.save_recording(&recording, name)?;
    writeln!(
        out,
        "\rsaved {} \"{}\" ({})",
        entry.id,
        entry.name,
        format_clock(entry.duration())
    )?;
    Ok(())
}

/// Sends once per line read from stdin; the channel closes at EOF.
fn spawn_enter_listener() -> Receiver<()> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        let mut line = String::new();
        loop {
            line.clear();
            match stdin.lock().read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    if tx.send(()).is_err() {
                        break;
                    }
                }
            }
        }
    });
    rx
}
