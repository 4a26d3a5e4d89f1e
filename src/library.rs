//! The local sound library.
//!
//! Saved sounds are kept as a small JSON index (one record per sound) plus a
//! private directory holding one copied audio payload per record. The
//! [`SoundStore`] owns both and enforces the free-tier limits at save time.

mod error;
mod index;
mod limits;
mod model;
mod payload;
mod scan;
mod store;

pub use error::StoreError;
pub use limits::{LimitStatus, Limits};
pub use model::{ImportCandidate, SoundEntry};
pub use scan::scan;
pub use store::SoundStore;

#[cfg(test)]
mod tests;
