mod compositor;
pub mod glyphs;
mod layout;
mod raster;

pub use compositor::composite;
pub use glyphs::GlyphSet;
pub use layout::center;
pub use raster::{Canvas, GLYPH_GAP, GlyphSpan, rasterize};

use crate::animations::AnimationFrame;
use crate::lifecycle::{Lifecycle, NotReady};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The visible area, in terminal cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Viewport {
    pub width: usize,
    pub height: usize,
}

impl Viewport {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }
}

/// Below either of these dimensions the compact glyph set is used.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactThresholds {
    pub width: usize,
    pub height: usize,
}

impl Default for CompactThresholds {
    fn default() -> Self {
        Self { width: 100, height: 25 }
    }
}

/// Format a cost the way it is drawn: a dollar sign and exactly two decimals.
pub fn format_cost(value: f64) -> Result<String, BannerError> {
    if !value.is_finite() {
        return Err(BannerError::NonFiniteValue(value));
    }
    Ok(format!("${value:.2}"))
}

/// Renders cost values as centered, colored block-letter banners.
#[derive(Debug)]
pub struct BannerRenderer {
    lifecycle: Lifecycle,
    thresholds: CompactThresholds,
}

impl BannerRenderer {
    pub const NAME: &'static str = "banner-renderer";

    pub fn new(thresholds: CompactThresholds) -> Self {
        Self { lifecycle: Lifecycle::new(Self::NAME), thresholds }
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

    pub fn thresholds(&self) -> &CompactThresholds {
        &self.thresholds
    }

    /// Render a cost value.
    ///
    /// A missing value renders as an empty string and a missing frame renders
    /// the banner without colors.
    pub fn render(
        &self,
        cost: Option<f64>,
        frame: Option<&AnimationFrame>,
        viewport: Viewport,
    ) -> Result<String, BannerError> {
        self.lifecycle.ensure_ready()?;
        let Some(cost) = cost else {
            return Ok(String::new());
        };
        let text = format_cost(cost)?;
        self.render_text(&text, frame, viewport)
    }

    /// Render already formatted text.
    pub fn render_text(
        &self,
        text: &str,
        frame: Option<&AnimationFrame>,
        viewport: Viewport,
    ) -> Result<String, BannerError> {
        self.lifecycle.ensure_ready()?;
        let glyph_set = GlyphSet::for_viewport(viewport, &self.thresholds);
        debug!(text, %glyph_set, width = viewport.width, height = viewport.height, "rendering banner");
        let canvas = rasterize(text, glyph_set)?;
        let canvas = center(&canvas, viewport);
        composite(&canvas, frame)
    }
}

/// Errors that can occur when rendering banners
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BannerError {
    #[error("character {ch:?} at position {position} has no glyph")]
    UnsupportedCharacter { ch: char, position: usize },

    #[error("cost value {0} cannot be displayed")]
    NonFiniteValue(f64),

    #[error("animation frame has {actual} colors but the banner has {expected} characters")]
    FrameMismatch { expected: usize, actual: usize },

    #[error(transparent)]
    NotReady(#[from] NotReady),
}
