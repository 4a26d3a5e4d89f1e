//! Key bindings.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::model::{App, PlaybackState};
use super::overlay::{Action, Overlay};

/// Rendered in the footer; keep in sync with `handle_key`.
pub const CONTROLS: &[(&str, &str)] = &[
    ("j/k", "up/down"),
    ("gg/G", "top/bottom"),
    ("enter", "play"),
    ("space", "play/stop"),
    ("s", "stop"),
    ("m", "stop mode"),
    ("+/-", "adjust"),
    ("r", "rename"),
    ("d", "delete"),
    ("i", "import"),
    ("R", "record"),
    ("q", "quit"),
];

impl App {
    /// Apply `key` to the model; returns work for the runtime, if any.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Action::Quit);
        }
        if self.overlay.is_some() {
            self.pending_g = false;
            return self.handle_overlay_key(key);
        }

        let was_g = std::mem::take(&mut self.pending_g);
        match key.code {
            KeyCode::Char('q') => return Some(Action::Quit),
            KeyCode::Char('j') | KeyCode::Down => self.next(),
            KeyCode::Char('k') | KeyCode::Up => self.prev(),
            KeyCode::Char('g') => {
                if was_g {
                    self.first();
                } else {
                    self.pending_g = true;
                }
            }
            KeyCode::Char('G') => self.last(),
            KeyCode::Enter => return self.play_selected(),
            KeyCode::Char(' ') => {
                return match self.playback {
                    PlaybackState::Playing => Some(Action::Stop),
                    PlaybackState::Stopped => self.play_selected(),
                };
            }
            KeyCode::Char('s') => {
                if self.playback == PlaybackState::Playing {
                    return Some(Action::Stop);
                }
            }
            KeyCode::Char('m') => self.cycle_mode(),
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right => self.adjust(1),
            KeyCode::Char('-') | KeyCode::Left => self.adjust(-1),
            KeyCode::Char('r') => self.open_rename(),
            KeyCode::Char('d') => {
                if self.confirm_delete {
                    self.open_delete_confirm();
                } else if let Some(e) = self.selected_entry() {
                    return Some(Action::Delete { id: e.id.clone() });
                }
            }
            KeyCode::Char('i') => {
                if self.limits.is_full() {
                    self.set_error(self.capacity_message());
                } else {
                    return Some(Action::BrowseImports);
                }
            }
            KeyCode::Char('R') => {
                if self.recording.is_some() {
                    return Some(Action::StopRecording);
                }
                if self.limits.is_full() {
                    self.set_error(self.capacity_message());
                } else {
                    self.open_record_name();
                }
            }
            KeyCode::Esc => self.clear_status(),
            _ => {}
        }
        None
    }

    fn play_selected(&mut self) -> Option<Action> {
        let id = self.selected_entry()?.id.clone();
        Some(Action::Play {
            id,
            mode: self.stop_mode(),
        })
    }

    fn handle_overlay_key(&mut self, key: KeyEvent) -> Option<Action> {
        match self.overlay.as_ref()? {
            Overlay::ConfirmDelete { .. } => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => self.submit_overlay(),
                KeyCode::Char('n') | KeyCode::Esc => {
                    self.close_overlay();
                    None
                }
                _ => None,
            },
            Overlay::ImportPicker { .. } => {
                match key.code {
                    KeyCode::Esc | KeyCode::Char('q') => self.close_overlay(),
                    KeyCode::Char('j') | KeyCode::Down => self.move_picker(true),
                    KeyCode::Char('k') | KeyCode::Up => self.move_picker(false),
                    KeyCode::Enter => return self.submit_overlay(),
                    _ => {}
                }
                None
            }
            Overlay::Rename { .. } | Overlay::ImportName { .. } | Overlay::RecordName { .. } => {
                match key.code {
                    KeyCode::Esc => self.close_overlay(),
                    KeyCode::Enter => return self.submit_overlay(),
                    KeyCode::Backspace => self.pop_input(),
                    KeyCode::Char(c) if !c.is_control() => self.push_input(c),
                    _ => {}
                }
                None
            }
        }
    }
}
