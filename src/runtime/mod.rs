use std::error::Error;
use std::sync::mpsc;

use clap::Parser;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::analytics;
use crate::app::App;
use crate::audio::AudioPlayer;
use crate::cli::{Cli, Command};
use crate::library::SoundStore;
use crate::mpris::ControlCmd;

mod commands;
mod context;
mod event_loop;
mod logging;
mod mpris_sync;
mod settings;

pub use context::Context;

pub type BoxError = Box<dyn Error>;

/// Error message including its chain of causes.
pub fn describe(err: &dyn Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}

pub fn run() -> Result<(), BoxError> {
    let cli = Cli::parse();
    let (settings, config_warning) = settings::load_settings();

    let data_dir = settings.library.resolved_data_dir();
    let _log_guard = logging::init(&settings.logging, &data_dir);
    if let Some(w) = config_warning {
        tracing::warn!("{w}");
    }

    if let Some(Command::Config) = cli.command {
        return commands::show_config(&settings, &mut std::io::stdout().lock());
    }

    let mut store = SoundStore::open_dir(&data_dir);
    match store.prune_missing() {
        Ok(dropped) if !dropped.is_empty() => {
            tracing::warn!(count = dropped.len(), "dropped sounds whose file is missing");
        }
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %describe(&e), "could not prune sound index"),
    }

    let analytics = analytics::from_settings(&settings.analytics);
    analytics.track(
        analytics::APP_OPENED,
        &[
            ("sounds", store.count().to_string()),
            (
                "surface",
                if cli.command.is_some() { "cli" } else { "tui" }.to_string(),
            ),
        ],
    );

    let volume = settings.playback.volume;
    let mut ctx = Context::new(settings, store, AudioPlayer::new(volume), analytics);

    let result = match cli.command {
        Some(command) => commands::run(command, &mut ctx),
        None => run_tui(&mut ctx),
    };
    ctx.shutdown();

    if let Err(e) = &result {
        tracing::error!(error = %describe(e.as_ref()), "exiting with error");
    }
    result
}

fn run_tui(ctx: &mut Context<AudioPlayer>) -> Result<(), BoxError> {
    let mut app = App::new(ctx.sounds(), ctx.status(), &ctx.settings.playback);
    app.confirm_delete = ctx.settings.ui.confirm_delete;

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx);
    mpris_sync::update_mpris(&mpris, ctx, &app);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = event_loop::EventLoopState::new();
    let run_result = event_loop::run(
        &mut terminal,
        ctx,
        &mut app,
        &mpris,
        &control_rx,
        &mut state,
    );

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
