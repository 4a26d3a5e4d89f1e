use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{Action, App, PlaybackState, RecordingStatus};
use crate::audio::{AudioPlayer, Recorder};
use crate::library::scan;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::runtime::mpris_sync::update_mpris;
use crate::session::SessionTick;
use crate::timer::Ticker;
use crate::ui;

use super::BoxError;
use super::context::Context;
use super::describe;

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// ≈1 Hz deadline driving the auto-stop check and the recording clock.
    pub ticker: Ticker,
    /// Capture in progress and the name it will be saved under.
    recorder: Option<(Recorder, String)>,
    /// Last-known playing sound as emitted to MPRIS.
    last_mpris_sound: Option<String>,
    last_mpris_playback: PlaybackState,
}

impl EventLoopState {
    pub fn new() -> Self {
        Self {
            ticker: Ticker::every_second(),
            recorder: None,
            last_mpris_sound: None,
            last_mpris_playback: PlaybackState::Stopped,
        }
    }
}

/// Main terminal event loop: handles input, UI drawing, the session tick and
/// MPRIS. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    ctx: &mut Context<AudioPlayer>,
    app: &mut App,
    mpris: &MprisHandle,
    control_rx: &mpsc::Receiver<ControlCmd>,
    state: &mut EventLoopState,
) -> Result<(), BoxError> {
    loop {
        if state.ticker.poll(Instant::now()) {
            on_tick(ctx, app, state);
        }

        // Keep MPRIS in sync even when playback changes come from media keys or the timer.
        let playing = app.now_playing.as_ref().map(|np| np.sound_id.clone());
        if playing != state.last_mpris_sound || app.playback != state.last_mpris_playback {
            update_mpris(mpris, ctx, app);
            state.last_mpris_sound = playing;
            state.last_mpris_playback = app.playback;
        }

        terminal.draw(|f| ui::draw(f, app, &ctx.settings.ui))?;

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, ctx, app, state) {
                return Ok(());
            }
        }

        let timeout = state
            .ticker
            .until_next(Instant::now())
            .map_or(Duration::from_millis(50), |d| d.min(Duration::from_millis(50)));
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(action) = app.handle_key(key) {
                    if perform(action, ctx, app, state) {
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}

fn on_tick(ctx: &mut Context<AudioPlayer>, app: &mut App, state: &mut EventLoopState) {
    if let SessionTick::Stopped(stopped) = ctx.tick() {
        app.set_info(format!("time is up: stopped \"{}\"", stopped.name));
    }
    app.set_now_playing(ctx.now_playing());

    let mut limit_hit = false;
    if let (Some((rec, _)), Some(status)) = (state.recorder.as_ref(), app.recording.as_mut()) {
        status.elapsed = rec.elapsed();
        limit_hit = status.elapsed + Duration::from_secs(1) >= status.max;
    }
    if limit_hit {
        finish_recording(ctx, app, state);
    }

    // A plain loop has nothing to count down.
    if state.ticker.is_running() && !ctx.has_deadline() && state.recorder.is_none() {
        state.ticker.cancel();
        tracing::debug!("ticker parked");
    }
}

fn handle_control_cmd(
    cmd: ControlCmd,
    ctx: &mut Context<AudioPlayer>,
    app: &mut App,
    state: &mut EventLoopState,
) -> bool {
    let action = match cmd {
        ControlCmd::Quit => Action::Quit,
        ControlCmd::Stop => Action::Stop,
        ControlCmd::PlayPause => match ctx.is_playing() {
            true => Action::Stop,
            false => match app.selected_entry() {
                Some(e) => Action::Play {
                    id: e.id.clone(),
                    mode: app.stop_mode(),
                },
                None => return false,
            },
        },
    };
    perform(action, ctx, app, state)
}

/// Carry out `action`. Returns true when the app should quit.
fn perform(
    action: Action,
    ctx: &mut Context<AudioPlayer>,
    app: &mut App,
    state: &mut EventLoopState,
) -> bool {
    match action {
        Action::Quit => {
            if let Some((rec, name)) = state.recorder.take() {
                let path = rec.path().to_path_buf();
                drop(rec);
                let _ = std::fs::remove_file(&path);
                tracing::info!(%name, ?path, "recording discarded on quit");
            }
            return true;
        }
        Action::Play { id, mode } => match ctx.play(&id, mode) {
            Ok(end) => {
                let name = ctx.get(&id).map(|e| e.name.clone()).unwrap_or_default();
                match end {
                    Some(end) => app.set_info(format!(
                        "playing \"{name}\" until {}",
                        end.with_timezone(&chrono::Local).format("%H:%M")
                    )),
                    None => app.set_info(format!("looping \"{name}\"")),
                }
                state.ticker.start(Instant::now());
            }
            Err(e) => app.set_error(describe(e.as_ref())),
        },
        Action::Stop => {
            if let Some(stopped) = ctx.stop() {
                app.set_info(format!("stopped \"{}\"", stopped.name));
            }
        }
        Action::Rename { id, name } => match ctx.rename(&id, &name) {
            Ok(()) => app.set_info(format!("renamed to \"{name}\"")),
            Err(e) => app.set_error(describe(&e)),
        },
        Action::Delete { id } => match ctx.delete(&id) {
            Ok(()) => app.set_info("sound deleted"),
            Err(e) => app.set_error(describe(&e)),
        },
        Action::BrowseImports => {
            let dir = ctx.settings.library.resolved_import_dir();
            let candidates = scan(&dir, &ctx.settings.library);
            tracing::debug!(?dir, found = candidates.len(), "import scan");
            app.open_import_picker(candidates);
        }
        Action::PickImport(path) => match ctx.probe(&path) {
            Ok(info) => app.open_import_name(info),
            Err(e) => app.set_error(describe(&e)),
        },
        Action::Import { info, name } => match ctx.save_probed(&info, &name) {
            Ok(entry) => app.set_info(format!("saved \"{}\"", entry.name)),
            Err(e) => app.set_error(describe(&e)),
        },
        Action::StartRecording { name } => match ctx.start_recording() {
            Ok(rec) => {
                app.recording = Some(RecordingStatus {
                    name: name.clone(),
                    elapsed: Duration::ZERO,
                    max: ctx.max_recording(),
                });
                app.set_info(format!("recording \"{name}\"; press R to stop"));
                state.recorder = Some((rec, name));
                state.ticker.start(Instant::now());
            }
            Err(e) => app.set_error(describe(&e)),
        },
        Action::StopRecording => finish_recording(ctx, app, state),
    }

    app.set_library(ctx.sounds(), ctx.status());
    app.set_now_playing(ctx.now_playing());
    false
}

fn finish_recording(ctx: &mut Context<AudioPlayer>, app: &mut App, state: &mut EventLoopState) {
    app.recording = None;
    let Some((rec, name)) = state.recorder.take() else {
        return;
    };
    let saved = rec
        .finish()
        .map_err(BoxError::from)
        .and_then(|recording| Ok(ctx.save_recording(&recording, &name)?));
    match saved {
        Ok(entry) => app.set_info(format!("saved \"{}\"", entry.name)),
        Err(e) => app.set_error(describe(e.as_ref())),
    }
    app.set_library(ctx.sounds(), ctx.status());
}
