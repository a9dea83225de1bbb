use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An RGB color written as `#RRGGBB`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// The neutral color used whenever animation is turned off.
    pub const WHITE: Self = Self::new(0xFF, 0xFF, 0xFF);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let digits = input
            .strip_prefix('#')
            .filter(|digits| digits.len() == 6)
            .ok_or_else(|| ColorError::Malformed(input.to_string()))?;
        let mut rgb = [0; 3];
        hex::decode_to_slice(digits, &mut rgb).map_err(|_| ColorError::Malformed(input.to_string()))?;
        Ok(Self::new(rgb[0], rgb[1], rgb[2]))
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", hex::encode_upper([self.r, self.g, self.b]))
    }
}

impl From<Color> for crossterm::style::Color {
    fn from(color: Color) -> Self {
        Self::Rgb { r: color.r, g: color.g, b: color.b }
    }
}

/// An ordered, non-empty list of colors.
///
/// Colors are looked up modulo the palette length so any index is valid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette(Vec<Color>);

impl Palette {
    pub fn new(colors: Vec<Color>) -> Result<Self, ColorError> {
        if colors.is_empty() {
            return Err(ColorError::EmptyPalette);
        }
        Ok(Self(colors))
    }

    /// Parse every entry strictly, reporting the index of the first bad one.
    pub fn parse<S: AsRef<str>>(entries: &[S]) -> Result<Self, ColorError> {
        let colors = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let entry = entry.as_ref();
                entry.parse().map_err(|_| ColorError::InvalidEntry { index, value: entry.to_string() })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(colors)
    }

    /// Always at least one.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, index: usize) -> Color {
        self.0[index % self.0.len()]
    }

    pub fn colors(&self) -> &[Color] {
        &self.0
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self(DEFAULT_COLORS.to_vec())
    }
}

/// The twelve-step rainbow used when no palette is configured.
pub const DEFAULT_COLORS: [Color; 12] = [
    Color::new(0xFF, 0x00, 0x00),
    Color::new(0xFF, 0x80, 0x00),
    Color::new(0xFF, 0xFF, 0x00),
    Color::new(0x80, 0xFF, 0x00),
    Color::new(0x00, 0xFF, 0x00),
    Color::new(0x00, 0xFF, 0x80),
    Color::new(0x00, 0xFF, 0xFF),
    Color::new(0x00, 0x80, 0xFF),
    Color::new(0x00, 0x00, 0xFF),
    Color::new(0x80, 0x00, 0xFF),
    Color::new(0xFF, 0x00, 0xFF),
    Color::new(0xFF, 0x00, 0x80),
];

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ColorError {
    #[error("invalid color '{0}': expected #RRGGBB")]
    Malformed(String),

    #[error("invalid color format at index {index}: '{value}'")]
    InvalidEntry { index: usize, value: String },

    #[error("at least one color must be specified")]
    EmptyPalette,
}
