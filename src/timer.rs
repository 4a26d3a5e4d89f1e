//! Auto-stop timer for looping playback.
//!
//! The timer stores one absolute end instant and compares the wall clock
//! against it whenever it is ticked. Nothing counts down, so missed ticks
//! (a suspended process, a sleeping laptop) never delay the stop: the first
//! tick after resuming sees the elapsed instant and fires.

mod clock;
mod mode;
mod state;
mod ticker;

pub use clock::{Clock, SystemClock};
pub use mode::StopMode;
pub use state::{PlaybackTimer, Tick, TimerState};
pub use ticker::Ticker;
