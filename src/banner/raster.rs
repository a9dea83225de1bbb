use super::{BannerError, GlyphSet};
use unicode_width::UnicodeWidthStr;

/// Separator between two consecutive glyphs.
pub const GLYPH_GAP: &str = "  ";

/// The columns occupied by one source character's glyph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphSpan {
    pub start: usize,
    pub width: usize,
}

impl GlyphSpan {
    pub fn end(&self) -> usize {
        self.start + self.width
    }

    pub fn contains(&self, column: usize) -> bool {
        column >= self.start && column < self.end()
    }
}

/// A block of text lines with the glyph columns of each source character.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Canvas {
    lines: Vec<String>,
    spans: Vec<GlyphSpan>,
}

impl Canvas {
    pub(crate) fn new(lines: Vec<String>, spans: Vec<GlyphSpan>) -> Self {
        Self { lines, spans }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// One span per source character, left to right.
    pub fn spans(&self) -> &[GlyphSpan] {
        &self.spans
    }

    pub fn height(&self) -> usize {
        self.lines.len()
    }

    /// The widest line, in display cells.
    pub fn width(&self) -> usize {
        self.lines.iter().map(|line| line.width()).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn to_plain_string(&self) -> String {
        self.lines.join("\n")
    }
}

/// Turn `text` into block letters.
///
/// Every character must have a glyph in `glyph_set`; nothing is skipped or
/// substituted. An empty text produces a canvas with no lines.
pub fn rasterize(text: &str, glyph_set: GlyphSet) -> Result<Canvas, BannerError> {
    let glyphs = text
        .chars()
        .enumerate()
        .map(|(position, ch)| glyph_set.glyph(ch).ok_or(BannerError::UnsupportedCharacter { ch, position }))
        .collect::<Result<Vec<_>, _>>()?;
    if glyphs.is_empty() {
        return Ok(Canvas::default());
    }

    let mut lines = vec![String::new(); glyph_set.height()];
    let mut spans = Vec::with_capacity(glyphs.len());
    let mut column = 0;
    for (index, rows) in glyphs.into_iter().enumerate() {
        if index > 0 {
            lines.iter_mut().for_each(|line| line.push_str(GLYPH_GAP));
            column += GLYPH_GAP.len();
        }
        let width = rows.first().map_or(0, |row| row.width());
        for (line, row) in lines.iter_mut().zip(rows) {
            line.push_str(row);
        }
        spans.push(GlyphSpan { start: column, width });
        column += width;
    }
    Ok(Canvas::new(lines, spans))
}
