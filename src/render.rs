use crate::animations::{AnimationError, AnimationSettings, ColorGenerator};
use crate::banner::{BannerError, BannerRenderer, CompactThresholds, Viewport, format_cost};

/// Everything the render pipeline needs from the configuration, already validated.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderConfig {
    pub animation: AnimationSettings,
    pub thresholds: CompactThresholds,
}

/// The full render pipeline: format, rasterize, center, color and composite.
#[derive(Debug)]
pub struct Pipeline {
    renderer: BannerRenderer,
    colors: ColorGenerator,
}

impl Pipeline {
    pub fn new(thresholds: CompactThresholds) -> Self {
        Self { renderer: BannerRenderer::new(thresholds), colors: ColorGenerator::new() }
    }

    pub fn initialize(&mut self) {
        self.renderer.initialize();
        self.colors.initialize();
    }

    pub fn shutdown(&mut self) {
        self.colors.shutdown();
        self.renderer.shutdown();
    }

    /// Render one frame.
    ///
    /// The output only depends on the arguments, so two calls with the same
    /// inputs produce the same string.
    pub fn render(
        &self,
        cost: Option<f64>,
        frame_index: u64,
        viewport: Viewport,
        config: &RenderConfig,
    ) -> Result<String, RenderError> {
        let Some(cost) = cost else {
            return Ok(self.renderer.render(None, None, viewport)?);
        };
        let text = format_cost(cost)?;
        let frame = self.colors.generate_frame(&text, frame_index, &config.animation)?;
        Ok(self.renderer.render_text(&text, Some(&frame), viewport)?)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error(transparent)]
    Banner(#[from] BannerError),

    #[error(transparent)]
    Animation(#[from] AnimationError),
}
