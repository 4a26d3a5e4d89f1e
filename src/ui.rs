//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::Line,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::time::Duration;

use crate::app::{App, CONTROLS, ModeKind, Overlay};
use crate::config::UiSettings;

const LEFT_PAD: Padding = Padding {
    left: 1,
    right: 0,
    top: 0,
    bottom: 0,
};

fn controls_text() -> String {
    CONTROLS
        .iter()
        .map(|(k, v)| format!("[{k}] {v}"))
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `MM:SS`, or `H:MM:SS` past an hour.
pub(crate) fn format_clock(d: Duration) -> String {
    let secs = d.as_secs();
    if secs >= 3600 {
        format!("{}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
    } else {
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }
}

/// Mode picker text, marking the active choice.
fn mode_text(app: &App) -> String {
    let options = [
        (ModeKind::Indefinite, "loop".to_string()),
        (
            ModeKind::Duration,
            format!("for {} min", app.duration_minutes),
        ),
        (
            ModeKind::Alarm,
            format!("until {}", app.alarm_time.format("%H:%M")),
        ),
    ];
    options
        .iter()
        .map(|(kind, label)| {
            if *kind == app.mode {
                format!("[{label}]")
            } else {
                format!(" {label} ")
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn status_text(app: &App) -> String {
    let mut parts: Vec<String> = Vec::new();

    match app.now_playing.as_ref() {
        Some(np) => {
            let mut playing = format!("PLAYING: {}", np.name);
            match np.remaining {
                Some(left) => playing.push_str(&format!(" [{} left]", format_clock(left))),
                None => playing.push_str(" [looping]"),
            }
            parts.push(playing);
            parts.push(np.mode.to_string());
        }
        None => parts.push("Stopped".to_string()),
    }

    if let Some(rec) = app.recording.as_ref() {
        parts.push(format!(
            "REC: {} {}/{}",
            rec.name,
            format_clock(rec.elapsed),
            format_clock(rec.max)
        ));
    }

    parts.push(format!(
        "Sounds: {}/{}",
        app.limits.count, app.limits.max_sounds
    ));
    parts.push(format!("MODE: {}", mode_text(app)));
    parts.join(" • ")
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Render the entire UI into the provided `frame`.
pub fn draw(frame: &mut Frame, app: &App, ui_settings: &UiSettings) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" soundloop ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Status box
    let mut status_par = Paragraph::new(status_text(app))
        .block(Block::bordered().padding(LEFT_PAD).title(" status "))
        .wrap(Wrap { trim: true });
    if app.now_playing.is_some() {
        status_par = status_par.slow_blink();
    }
    frame.render_widget(status_par, chunks[1]);

    draw_library(frame, app, chunks[2]);

    // Message line
    let (msg, style) = match app.status.as_ref() {
        Some(s) if s.is_error => (s.text.as_str(), Style::default().fg(Color::Red)),
        Some(s) => (s.text.as_str(), Style::default()),
        None => ("", Style::default()),
    };
    let message = Paragraph::new(Line::styled(msg, style))
        .block(Block::bordered().padding(LEFT_PAD).title(" messages "));
    frame.render_widget(message, chunks[3]);

    if let Some(overlay) = app.overlay.as_ref() {
        draw_overlay(frame, overlay, chunks[2]);
    }

    let footer = Paragraph::new(controls_text())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(LEFT_PAD),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);
}

fn draw_library(frame: &mut Frame, app: &App, area: Rect) {
    let playing = app.playing_index();
    let items: Vec<ListItem> = app
        .sounds
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let marker = if playing == Some(i) { "♪ " } else { "  " };
            let text = format!(
                "{marker}{}  ({})",
                e.name,
                format_clock(e.duration())
            );
            ListItem::new(text)
        })
        .collect();

    let title = format!(
        " sounds {}/{} ",
        app.limits.count, app.limits.max_sounds
    );
    if items.is_empty() {
        let empty = Paragraph::new("No sounds yet. Press [i] to import or [R] to record.")
            .block(Block::bordered().padding(LEFT_PAD).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(empty, area);
        return;
    }

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(Some(app.selected));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_overlay(frame: &mut Frame, overlay: &Overlay, area: Rect) {
    let (body, height) = match overlay {
        Overlay::Rename { input, .. } | Overlay::RecordName { input } => {
            (format!("Name: {input}_\n\n[enter] ok | [esc] cancel"), 6)
        }
        Overlay::ImportName { info, input } => {
            let length = if info.measured {
                format_clock(Duration::from_secs(u64::from(info.duration_seconds)))
            } else {
                format!(
                    "~{}",
                    format_clock(Duration::from_secs(u64::from(info.duration_seconds)))
                )
            };
            (
                format!(
                    "File: {}\nLength: {length}\nName: {input}_\n\n[enter] save | [esc] cancel",
                    info.path.display()
                ),
                8,
            )
        }
        Overlay::ConfirmDelete { name, .. } => {
            (format!("Delete \"{name}\"?\n\n[y] yes | [n] no"), 6)
        }
        Overlay::ImportPicker {
            candidates,
            selected,
        } => {
            draw_picker(frame, candidates, *selected, area);
            return;
        }
    };

    let popup_area = centered_rect_sized(60, height, area);
    frame.render_widget(Clear, popup_area);
    let popup = Paragraph::new(body)
        .block(
            Block::default()
                .padding(LEFT_PAD)
                .borders(Borders::ALL)
                .title(overlay.title()),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(popup, popup_area);
}

fn draw_picker(
    frame: &mut Frame,
    candidates: &[crate::library::ImportCandidate],
    selected: usize,
    area: Rect,
) {
    let popup_area = centered_rect_sized(72, area.height.saturating_sub(2), area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" import (enter picks, esc closes) ");
    if candidates.is_empty() {
        let empty = Paragraph::new("No audio files found.").block(block.padding(LEFT_PAD));
        frame.render_widget(empty, popup_area);
        return;
    }

    let items: Vec<ListItem> = candidates
        .iter()
        .map(|c| {
            let mb = c.size_bytes as f64 / (1024.0 * 1024.0);
            ListItem::new(format!("{}  ({mb:.1} MB)", c.display))
        })
        .collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(Some(selected));
    frame.render_stateful_widget(list, popup_area, &mut state);
}
