/// Animation context passed to every pattern
#[derive(Debug, Clone, Copy)]
pub(crate) struct AnimationContext {
    /// Current frame index - drives animation progression
    pub frame: u64,
    /// Character index within the source text
    pub char_index: usize,
    /// Total characters in the source text
    pub total_chars: usize,
    /// Number of colors in the palette, never zero
    pub palette_len: usize,
}

/// Trait for animation patterns
pub(crate) trait Animation {
    /// Pick the palette index used for a single character
    fn color_index(&self, ctx: &AnimationContext) -> usize;
}

/// Scale a position onto the palette and wrap it into `0..palette_len`.
pub(crate) fn palette_index(position: f64, palette_len: usize) -> usize {
    let scaled = (position * palette_len as f64).floor() as i64;
    scaled.rem_euclid(palette_len as i64) as usize
}

/// Map a sine sample in `-1..=1` across the whole palette.
pub(crate) fn sine_index(sample: f64, palette_len: usize) -> usize {
    palette_index((sample + 1.0) / 2.0, palette_len)
}
