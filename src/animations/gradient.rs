use super::common::{Animation, AnimationContext, palette_index};

/// How far the gradient drifts along the palette on every frame.
pub(crate) const GRADIENT_DRIFT: f64 = 0.01;

/// Gradient animation - the palette is stretched across the text and drifts slowly
pub(crate) struct Gradient;

impl Animation for Gradient {
    fn color_index(&self, ctx: &AnimationContext) -> usize {
        if ctx.total_chars <= 1 {
            return (ctx.frame % ctx.palette_len as u64) as usize;
        }
        let progress = ctx.char_index as f64 / (ctx.total_chars - 1) as f64;
        palette_index(progress + ctx.frame as f64 * GRADIENT_DRIFT, ctx.palette_len)
    }
}
