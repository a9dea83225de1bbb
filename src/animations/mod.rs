mod common;

// Individual animation modules
mod cycling;
mod gradient;
mod pulse;
mod wave;

use crate::color::{Color, Palette};
use crate::lifecycle::{Lifecycle, NotReady};
use chrono::{DateTime, Local};
use common::{Animation, AnimationContext};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::trace;

/// The color pattern applied to the banner characters.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display,
    strum::VariantArray,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum AnimationPattern {
    /// Rotating offset through the palette, also known as `rainbow`.
    #[default]
    #[serde(alias = "rainbow")]
    #[strum(to_string = "cycling", serialize = "rainbow")]
    Cycling,

    /// The palette stretched across the text, drifting slowly.
    #[strum(to_string = "gradient")]
    Gradient,

    /// One color for the whole text, sweeping across the palette.
    #[strum(to_string = "pulse")]
    Pulse,

    /// A sine wave travelling through the text.
    #[strum(to_string = "wave")]
    Wave,
}

/// Get the animation implementation for a given pattern
fn get_animation(pattern: AnimationPattern) -> Box<dyn Animation> {
    match pattern {
        AnimationPattern::Cycling => Box::new(cycling::Cycling),
        AnimationPattern::Gradient => Box::new(gradient::Gradient),
        AnimationPattern::Pulse => Box::new(pulse::Pulse),
        AnimationPattern::Wave => Box::new(wave::Wave),
    }
}

/// Compute one color per character for the given frame.
///
/// This is a pure function: the same inputs always give the same colors.
pub fn pattern_colors(pattern: AnimationPattern, palette: &Palette, frame: u64, total_chars: usize) -> Vec<Color> {
    let animation = get_animation(pattern);
    (0..total_chars)
        .map(|char_index| {
            let ctx = AnimationContext { frame, char_index, total_chars, palette_len: palette.len() };
            palette.get(animation.color_index(&ctx))
        })
        .collect()
}

/// Validated animation settings.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationSettings {
    enabled: bool,
    speed: Duration,
    pattern: AnimationPattern,
    palette: Palette,
}

impl AnimationSettings {
    pub fn new(
        enabled: bool,
        speed: Duration,
        pattern: AnimationPattern,
        palette: Palette,
    ) -> Result<Self, AnimationError> {
        if speed.is_zero() {
            return Err(AnimationError::NonPositiveSpeed);
        }
        Ok(Self { enabled, speed, pattern, palette })
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// The interval between two animation ticks.
    pub fn speed(&self) -> Duration {
        self.speed
    }

    pub fn pattern(&self) -> AnimationPattern {
        self.pattern
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            speed: Duration::from_millis(100),
            pattern: AnimationPattern::default(),
            palette: Palette::default(),
        }
    }
}

/// A single frame of animation: one color per source character.
#[derive(Clone, Debug)]
pub struct AnimationFrame {
    pub colors: Vec<Color>,
    pub text: String,
    pub generated_at: DateTime<Local>,
}

/// Generates animation frames for the banner text.
#[derive(Debug)]
pub struct ColorGenerator {
    lifecycle: Lifecycle,
}

impl ColorGenerator {
    pub const NAME: &'static str = "color-generator";

    pub fn new() -> Self {
        Self { lifecycle: Lifecycle::new(Self::NAME) }
    }

    pub fn initialize(&mut self) {
        self.lifecycle.initialize();
    }

    pub fn shutdown(&mut self) {
        self.lifecycle.shutdown();
    }

    pub fn is_ready(&self) -> bool {
        self.lifecycle.is_ready()
    }

    pub fn supported_patterns() -> &'static [AnimationPattern] {
        <AnimationPattern as strum::VariantArray>::VARIANTS
    }

    /// Compute the colors for `total_chars` characters at `frame`.
    ///
    /// When animation is disabled every character is white regardless of the pattern.
    pub fn generate(
        &self,
        settings: &AnimationSettings,
        frame: u64,
        total_chars: usize,
    ) -> Result<Vec<Color>, AnimationError> {
        self.lifecycle.ensure_ready()?;
        if !settings.enabled {
            return Ok(vec![Color::WHITE; total_chars]);
        }
        trace!(frame, total_chars, pattern = %settings.pattern, "generating colors");
        Ok(pattern_colors(settings.pattern, &settings.palette, frame, total_chars))
    }

    pub fn generate_frame(
        &self,
        text: &str,
        frame: u64,
        settings: &AnimationSettings,
    ) -> Result<AnimationFrame, AnimationError> {
        let colors = self.generate(settings, frame, text.chars().count())?;
        Ok(AnimationFrame { colors, text: text.to_string(), generated_at: Local::now() })
    }
}

impl Default for ColorGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when generating animation frames
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AnimationError {
    #[error("animation speed must be positive")]
    NonPositiveSpeed,

    #[error(transparent)]
    NotReady(#[from] NotReady),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashSet;

    fn palette(entries: &[&str]) -> Palette {
        Palette::parse(entries).expect("valid palette")
    }

    fn rgb() -> Palette {
        palette(&["#FF0000", "#00FF00", "#0000FF"])
    }

    fn ready_generator() -> ColorGenerator {
        let mut generator = ColorGenerator::new();
        generator.initialize();
        generator
    }

    fn settings(enabled: bool, pattern: AnimationPattern, palette: Palette) -> AnimationSettings {
        AnimationSettings::new(enabled, Duration::from_millis(100), pattern, palette).expect("valid settings")
    }

    #[test]
    fn cycling_dollar_amount() {
        let generator = ready_generator();
        let frame = generator
            .generate_frame("$42.50", 0, &settings(true, AnimationPattern::Cycling, rgb()))
            .expect("frame generated");
        let colors: Vec<_> = frame.colors.iter().map(ToString::to_string).collect();
        assert_eq!(colors, ["#FF0000", "#00FF00", "#0000FF", "#FF0000", "#00FF00", "#0000FF"]);
        assert_eq!(frame.text, "$42.50");
    }

    #[rstest]
    fn disabled_is_white(
        #[values(
            AnimationPattern::Cycling,
            AnimationPattern::Gradient,
            AnimationPattern::Pulse,
            AnimationPattern::Wave
        )]
        pattern: AnimationPattern,
    ) {
        let generator = ready_generator();
        let colors = generator.generate(&settings(false, pattern, rgb()), 17, 4).expect("colors generated");
        assert_eq!(colors, vec![Color::WHITE; 4]);
    }

    #[rstest]
    fn single_color_palette(
        #[values(
            AnimationPattern::Cycling,
            AnimationPattern::Gradient,
            AnimationPattern::Pulse,
            AnimationPattern::Wave
        )]
        pattern: AnimationPattern,
        #[values(0, 1, 7, 1_000)] frame: u64,
        #[values(1, 2, 9)] total_chars: usize,
    ) {
        let palette = palette(&["#123456"]);
        let only = palette.get(0);
        assert_eq!(pattern_colors(pattern, &palette, frame, total_chars), vec![only; total_chars]);
    }

    #[rstest]
    fn empty_text(
        #[values(
            AnimationPattern::Cycling,
            AnimationPattern::Gradient,
            AnimationPattern::Pulse,
            AnimationPattern::Wave
        )]
        pattern: AnimationPattern,
    ) {
        assert!(pattern_colors(pattern, &rgb(), 3, 0).is_empty());
    }

    #[rstest]
    #[case(0, 1)]
    #[case(0, 2)]
    #[case(4, 5)]
    #[case(10, 23)]
    fn cycling_moves_between_frames(#[case] first: u64, #[case] second: u64) {
        let palette = Palette::default();
        let a = pattern_colors(AnimationPattern::Cycling, &palette, first, 6);
        let b = pattern_colors(AnimationPattern::Cycling, &palette, second, 6);
        assert_ne!(a, b);
    }

    #[test]
    fn pulse_is_uniform_within_frame() {
        let palette = Palette::default();
        for frame in 0..50 {
            let colors = pattern_colors(AnimationPattern::Pulse, &palette, frame, 8);
            assert!(colors.iter().all(|color| *color == colors[0]), "frame {frame}");
        }
    }

    #[test]
    fn pulse_visits_whole_palette() {
        let palette = Palette::default();
        let seen: HashSet<_> =
            (0..100).map(|frame| pattern_colors(AnimationPattern::Pulse, &palette, frame, 1)[0]).collect();
        assert!(seen.len() >= 6, "only {} colors used", seen.len());
    }

    #[test]
    fn gradient_spans_palette() {
        let colors = pattern_colors(AnimationPattern::Gradient, &rgb(), 0, 7);
        assert_eq!(colors.first(), Some(&rgb().get(0)));
        assert_eq!(colors[3], rgb().get(1));
        // i = N-1 lands on position 1.0 which wraps back to the start
        assert_eq!(colors.last(), Some(&rgb().get(0)));
    }

    #[test]
    fn gradient_single_character_follows_frame() {
        let colors = pattern_colors(AnimationPattern::Gradient, &rgb(), 4, 1);
        assert_eq!(colors, vec![rgb().get(1)]);
    }

    #[test]
    fn wave_matches_formula() {
        let palette = Palette::default();
        let colors = pattern_colors(AnimationPattern::Wave, &palette, 3, 5);
        for (i, color) in colors.iter().enumerate() {
            let sample = (3.0 * 0.1 + i as f64 * 0.5).sin();
            let index = (((sample + 1.0) / 2.0) * 12.0).floor() as usize % 12;
            assert_eq!(*color, palette.get(index));
        }
    }

    #[rstest]
    fn deterministic(
        #[values(
            AnimationPattern::Cycling,
            AnimationPattern::Gradient,
            AnimationPattern::Pulse,
            AnimationPattern::Wave
        )]
        pattern: AnimationPattern,
    ) {
        let palette = Palette::default();
        assert_eq!(pattern_colors(pattern, &palette, 42, 8), pattern_colors(pattern, &palette, 42, 8));
    }

    #[test]
    fn not_ready() {
        let generator = ColorGenerator::new();
        let err = generator.generate(&AnimationSettings::default(), 0, 3).unwrap_err();
        assert_eq!(err, AnimationError::NotReady(NotReady { component: ColorGenerator::NAME }));
    }

    #[test]
    fn shut_down_generator_fails() {
        let mut generator = ready_generator();
        generator.shutdown();
        assert!(generator.generate(&AnimationSettings::default(), 0, 3).is_err());
    }

    #[test]
    fn zero_speed_rejected() {
        let result = AnimationSettings::new(true, Duration::ZERO, AnimationPattern::Wave, rgb());
        assert_eq!(result, Err(AnimationError::NonPositiveSpeed));
    }

    #[rstest]
    #[case("cycling", AnimationPattern::Cycling)]
    #[case("rainbow", AnimationPattern::Cycling)]
    #[case("Gradient", AnimationPattern::Gradient)]
    #[case("pulse", AnimationPattern::Pulse)]
    #[case("wave", AnimationPattern::Wave)]
    fn parse_pattern(#[case] input: &str, #[case] expected: AnimationPattern) {
        assert_eq!(input.parse::<AnimationPattern>(), Ok(expected));
    }

    #[test]
    fn unknown_pattern() {
        assert!("sparkle".parse::<AnimationPattern>().is_err());
    }

    #[test]
    fn pattern_names() {
        assert_eq!(AnimationPattern::Cycling.to_string(), "cycling");
        assert_eq!(ColorGenerator::supported_patterns().len(), 4);
    }
}
