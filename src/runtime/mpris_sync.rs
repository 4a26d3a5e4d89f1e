use crate::app::App;
use crate::audio::LoopOutput;
use crate::mpris::MprisHandle;

use super::context::Context;

pub fn update_mpris<O: LoopOutput>(mpris: &MprisHandle, ctx: &Context<O>, app: &App) {
    mpris.set_sound(ctx.playing_entry());
    mpris.set_playback(app.playback);
}
