use crate::animations::{AnimationError, AnimationPattern, AnimationSettings};
use crate::banner::CompactThresholds;
use crate::color::{ColorError, DEFAULT_COLORS, Palette};
use crate::render::RenderConfig;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// The application configuration.
///
/// Built from defaults, then an optional YAML file, then command line and
/// environment overrides (see [`Overrides`]).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub app: AppConfig,
    pub display: DisplayConfig,
    pub animation: AnimationConfig,
    pub source: SourceConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// The default log level, `RUST_LOG` takes precedence.
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { log_level: "info".into() }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    /// Terminals narrower than this use the compact glyphs.
    pub compact_width: usize,

    /// Terminals shorter than this use the compact glyphs.
    pub compact_height: usize,

    /// Whether the status line shows when the cost was last fetched.
    pub show_timestamp: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let thresholds = CompactThresholds::default();
        Self { compact_width: thresholds.width, compact_height: thresholds.height, show_timestamp: true }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationConfig {
    pub enabled: bool,

    /// Time between two frames.
    #[serde(with = "duration_format")]
    pub speed: Duration,

    /// One of `cycling` (or `rainbow`), `gradient`, `pulse` or `wave`.
    pub pattern: String,

    /// The palette, as `#RRGGBB` strings.
    pub colors: Vec<String>,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            speed: Duration::from_millis(100),
            pattern: AnimationPattern::default().to_string(),
            colors: DEFAULT_COLORS.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Where cost values come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SourceKind {
    /// Run the `ccusage` command line tool.
    #[default]
    Ccusage,

    /// Always report the same, very large, amount.
    Bankruptcy,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub kind: SourceKind,

    /// The `ccusage` executable. The default runs it through `npx`.
    pub command: String,

    /// How long a single `ccusage` run may take.
    #[serde(with = "duration_format")]
    pub timeout: Duration,

    /// How long a fetched value is reused before running `ccusage` again.
    /// Zero turns the cache off.
    #[serde(with = "duration_format")]
    pub cache_time: Duration,

    /// How often the running application asks for a fresh value.
    #[serde(with = "duration_format")]
    pub refresh_rate: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            command: "ccusage".into(),
            timeout: Duration::from_secs(30),
            cache_time: Duration::from_secs(10),
            refresh_rate: Duration::from_secs(30),
        }
    }
}

/// Values coming from the command line or the environment.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub animation_speed: Option<Duration>,
    pub animation_pattern: Option<String>,
    pub no_animation: bool,
    pub bankruptcy: bool,
    pub log_level: Option<String>,
}

impl Config {
    /// The file looked up when no explicit path is given.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "costglow").map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Load the configuration.
    ///
    /// An explicit path must exist. Without one the default path is used if a
    /// file is there, and the built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => {
                debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        debug!("loading config from {}", path.display());
        let contents =
            fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Apply command line and environment overrides on top of this config.
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(speed) = overrides.animation_speed {
            self.animation.speed = speed;
        }
        if let Some(pattern) = &overrides.animation_pattern {
            self.animation.pattern = pattern.clone();
        }
        if overrides.no_animation {
            self.animation.enabled = false;
        }
        if overrides.bankruptcy {
            self.source.kind = SourceKind::Bankruptcy;
        }
        if let Some(level) = &overrides.log_level {
            self.app.log_level = level.clone();
        }
    }

    pub fn pattern(&self) -> Result<AnimationPattern, ConfigError> {
        AnimationPattern::from_str(&self.animation.pattern)
            .map_err(|_| ConfigError::UnknownPattern(self.animation.pattern.clone()))
    }

    pub fn log_level(&self) -> Result<tracing::Level, ConfigError> {
        tracing::Level::from_str(&self.app.log_level)
            .map_err(|_| ConfigError::InvalidLogLevel(self.app.log_level.clone()))
    }

    pub fn thresholds(&self) -> CompactThresholds {
        CompactThresholds { width: self.display.compact_width, height: self.display.compact_height }
    }

    /// Check every section, returning the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.log_level()?;
        self.resolve()?;
        for (field, value) in [
            ("source.timeout", self.source.timeout),
            ("source.refresh_rate", self.source.refresh_rate),
        ] {
            if value.is_zero() {
                return Err(ConfigError::Zero { field });
            }
        }
        Ok(())
    }

    /// Turn the animation and display sections into the render configuration.
    pub fn resolve(&self) -> Result<RenderConfig, ConfigError> {
        if self.display.compact_width == 0 {
            return Err(ConfigError::Zero { field: "display.compact_width" });
        }
        if self.display.compact_height == 0 {
            return Err(ConfigError::Zero { field: "display.compact_height" });
        }
        let palette = Palette::parse(&self.animation.colors)?;
        let animation =
            AnimationSettings::new(self.animation.enabled, self.animation.speed, self.pattern()?, palette)?;
        Ok(RenderConfig { animation, thresholds: self.thresholds() })
    }
}

/// Parse a duration such as `100ms`, `1.5s`, `2m` or `1h`.
pub fn parse_duration(input: &str) -> Result<Duration, ConfigError> {
    let invalid = || ConfigError::InvalidDuration(input.to_string());
    let trimmed = input.trim();
    let split = trimmed.find(|c: char| !(c.is_ascii_digit() || c == '.')).unwrap_or(trimmed.len());
    let (amount, unit) = trimmed.split_at(split);
    let millis_per_unit: u64 = match unit.trim() {
        "ms" => 1,
        "s" => 1_000,
        "m" => 60_000,
        "h" => 3_600_000,
        _ => return Err(invalid()),
    };
    if let Ok(whole) = amount.parse::<u64>() {
        return whole.checked_mul(millis_per_unit).map(Duration::from_millis).ok_or_else(invalid);
    }
    let fractional: f64 = amount.parse().map_err(|_| invalid())?;
    Duration::try_from_secs_f64(fractional * millis_per_unit as f64 / 1_000.0).map_err(|_| invalid())
}

/// Format a duration the way [`parse_duration`] reads it.
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis % 1_000 == 0 { format!("{}s", millis / 1_000) } else { format!("{millis}ms") }
}

mod duration_format {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub(super) fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_duration(*duration))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when loading or validating the configuration
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid duration '{0}': expected a number followed by ms, s, m or h")]
    InvalidDuration(String),

    #[error("invalid animation pattern '{0}'. Valid patterns: cycling, gradient, pulse, wave")]
    UnknownPattern(String),

    #[error("invalid log level '{0}'")]
    InvalidLogLevel(String),

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error(transparent)]
    Color(#[from] ColorError),

    #[error(transparent)]
    Animation(#[from] AnimationError),
}
