//! Popups drawn over the library list and the actions they produce.

use std::path::PathBuf;

use crate::audio::ProbeInfo;
use crate::library::ImportCandidate;
use crate::timer::StopMode;

use super::model::App;

#[derive(Clone, Debug)]
pub enum Overlay {
    /// Editing the name of an existing sound.
    Rename { id: String, input: String },
    /// Choosing a file to import.
    ImportPicker {
        candidates: Vec<ImportCandidate>,
        selected: usize,
    },
    /// Naming a probed file before it is saved.
    ImportName { info: ProbeInfo, input: String },
    /// Naming a recording before capture starts.
    RecordName { input: String },
    ConfirmDelete { id: String, name: String },
}

impl Overlay {
    pub fn title(&self) -> &'static str {
        match self {
            Overlay::Rename { .. } => " rename ",
            Overlay::ImportPicker { .. } => " import ",
            Overlay::ImportName { .. } => " name this sound ",
            Overlay::RecordName { .. } => " record ",
            Overlay::ConfirmDelete { .. } => " delete ",
        }
    }

    /// Text being edited, for overlays that take text.
    pub fn input(&self) -> Option<&str> {
        match self {
            Overlay::Rename { input, .. }
            | Overlay::ImportName { input, .. }
            | Overlay::RecordName { input } => Some(input),
            Overlay::ImportPicker { .. } | Overlay::ConfirmDelete { .. } => None,
        }
    }

    fn input_mut(&mut self) -> Option<&mut String> {
        match self {
            Overlay::Rename { input, .. }
            | Overlay::ImportName { input, .. }
            | Overlay::RecordName { input } => Some(input),
            Overlay::ImportPicker { .. } | Overlay::ConfirmDelete { .. } => None,
        }
    }
}

/// Work the runtime performs on behalf of the UI.
#[derive(Clone, Debug)]
pub enum Action {
    Play { id: String, mode: StopMode },
    Stop,
    Rename { id: String, name: String },
    Delete { id: String },
    /// Scan the import directory and open the picker.
    BrowseImports,
    /// Probe a picked file and ask for its name.
    PickImport(PathBuf),
    Import { info: ProbeInfo, name: String },
    StartRecording { name: String },
    StopRecording,
    Quit,
}

impl App {
    pub fn open_rename(&mut self) {
        if let Some(e) = self.selected_entry() {
            self.overlay = Some(Overlay::Rename {
                id: e.id.clone(),
                input: e.name.clone(),
            });
        }
    }

    pub fn open_import_picker(&mut self, candidates: Vec<ImportCandidate>) {
        self.overlay = Some(Overlay::ImportPicker {
            candidates,
            selected: 0,
        });
    }

    pub fn open_import_name(&mut self, info: ProbeInfo) {
        let input = info.suggested_name.clone();
        self.overlay = Some(Overlay::ImportName { info, input });
    }

    pub fn open_record_name(&mut self) {
        self.overlay = Some(Overlay::RecordName {
            input: String::new(),
        });
    }

    pub fn open_delete_confirm(&mut self) {
        if let Some(e) = self.selected_entry() {
            self.overlay = Some(Overlay::ConfirmDelete {
                id: e.id.clone(),
                name: e.name.clone(),
            });
        }
    }

    pub fn close_overlay(&mut self) {
        self.overlay = None;
    }

    pub(super) fn push_input(&mut self, c: char) {
        if let Some(input) = self.overlay.as_mut().and_then(Overlay::input_mut) {
            input.push(c);
        }
    }

    pub(super) fn pop_input(&mut self) {
        if let Some(input) = self.overlay.as_mut().and_then(Overlay::input_mut) {
            input.pop();
        }
    }

    pub(super) fn move_picker(&mut self, forward: bool) {
        if let Some(Overlay::ImportPicker {
            candidates,
            selected,
        }) = self.overlay.as_mut()
        {
            if candidates.is_empty() {
                return;
            }
            *selected = if forward {
                (*selected + 1) % candidates.len()
            } else {
                selected.checked_sub(1).unwrap_or(candidates.len() - 1)
            };
        }
    }

    /// Confirm the open overlay. Returns the resulting action, if any.
    ///
    /// Text overlays with a blank name stay open and show an error instead.
    pub fn submit_overlay(&mut self) -> Option<Action> {
        let overlay = self.overlay.take()?;

        if let Some(input) = overlay.input() {
            if input.trim().is_empty() {
                self.overlay = Some(overlay);
                self.set_error("name cannot be empty");
                return None;
            }
        }

        match overlay {
            Overlay::Rename { id, input } => Some(Action::Rename {
                id,
                name: input.trim().to_string(),
            }),
            Overlay::ImportName { info, input } => Some(Action::Import {
                info,
                name: input.trim().to_string(),
            }),
            Overlay::RecordName { input } => Some(Action::StartRecording {
                name: input.trim().to_string(),
            }),
            Overlay::ConfirmDelete { id, .. } => Some(Action::Delete { id }),
            Overlay::ImportPicker {
                candidates,
                selected,
            } => match candidates.get(selected) {
                Some(c) => Some(Action::PickImport(c.path.clone())),
                None => {
                    self.set_info("nothing to import here");
                    None
                }
            },
        }
    }
}
