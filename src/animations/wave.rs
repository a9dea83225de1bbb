use super::common::{Animation, AnimationContext, sine_index};

/// Temporal frequency of the wave, in radians per frame.
pub(crate) const WAVE_SPEED: f64 = 0.1;
/// Spatial frequency of the wave, in radians per character.
pub(crate) const WAVE_LENGTH: f64 = 0.5;

/// Wave animation - palette position oscillates along a sine wave that travels through the text
pub(crate) struct Wave;

impl Animation for Wave {
    fn color_index(&self, ctx: &AnimationContext) -> usize {
        let phase = ctx.frame as f64 * WAVE_SPEED + ctx.char_index as f64 * WAVE_LENGTH;
        sine_index(phase.sin(), ctx.palette_len)
    }
}
