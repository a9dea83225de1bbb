//! Shows the cost reported by `ccusage` as animated block-letter art in the terminal.

pub mod animations;
pub mod app;
pub mod banner;
pub mod color;
pub mod config;
pub mod lifecycle;
pub mod logging;
pub mod render;
pub mod source;

pub use render::{Pipeline, RenderConfig, RenderError};
