use super::common::{Animation, AnimationContext};

/// Cycling animation - every character is one palette step ahead of the previous one
/// and the whole run shifts by one step per frame
pub(crate) struct Cycling;

impl Animation for Cycling {
    fn color_index(&self, ctx: &AnimationContext) -> usize {
        let frame_offset = (ctx.frame % ctx.palette_len as u64) as usize;
        (frame_offset + ctx.char_index % ctx.palette_len) % ctx.palette_len
    }
}
