use super::common::{Animation, AnimationContext, sine_index};

/// Angular step per frame of the pulse sweep.
pub(crate) const PULSE_FREQUENCY: f64 = 0.2;

/// Pulse animation - all characters share one color that sweeps back and forth
/// across the whole palette
pub(crate) struct Pulse;

impl Animation for Pulse {
    fn color_index(&self, ctx: &AnimationContext) -> usize {
        // Synchronized: the character index plays no part
        sine_index((ctx.frame as f64 * PULSE_FREQUENCY).sin(), ctx.palette_len)
    }
}
