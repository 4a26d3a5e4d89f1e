//! Application module: the TUI model and its key bindings.
//!
//! `App` holds a snapshot of the library, the selection, the stop-mode picker
//! and any open popup. Key handling only edits this state or returns an
//! [`Action`] for the runtime to carry out against the store and player.

mod keys;
mod model;
mod overlay;

pub use keys::CONTROLS;
pub use model::*;
pub use overlay::{Action, Overlay};
