//! Block-letter glyphs for the characters a formatted cost can contain.
//!
//! Every glyph in a set has the same number of rows and every row of a single
//! glyph has the same width. A `█` is a filled cell, a space is an empty one.

use super::{CompactThresholds, Viewport};

/// Every character that has a glyph in both sets.
pub const SUPPORTED_CHARS: [char; 13] = ['0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '$', '.', ' '];

/// The two glyph resolutions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum GlyphSet {
    /// 7 rows, used on small terminals.
    Compact,
    /// 10 rows.
    Full,
}

impl GlyphSet {
    /// Pick the set that fits the viewport.
    pub fn for_viewport(viewport: Viewport, thresholds: &CompactThresholds) -> Self {
        if viewport.width < thresholds.width || viewport.height < thresholds.height {
            Self::Compact
        } else {
            Self::Full
        }
    }

    /// The row count shared by every glyph in this set.
    pub const fn height(self) -> usize {
        match self {
            Self::Compact => 7,
            Self::Full => 10,
        }
    }

    /// Look up the rows for `ch`, or `None` if the set has no glyph for it.
    pub fn glyph(self, ch: char) -> Option<&'static [&'static str]> {
        match self {
            Self::Compact => compact_glyph(ch),
            Self::Full => full_glyph(ch),
        }
    }
}

fn compact_glyph(ch: char) -> Option<&'static [&'static str]> {
    let rows: &'static [&'static str; 7] = match ch {
        '0' => &[
            " ███████ ",
            "███   ███",
            "███   ███",
            "███   ███",
            "███   ███",
            "███   ███",
            " ███████ ",
        ],
        '1' => &[
            "   ███   ",
            " █████   ",
            "   ███   ",
            "   ███   ",
            "   ███   ",
            "   ███   ",
            " ███████ ",
        ],
        '2' => &[
            " ███████ ",
            "███   ███",
            "      ███",
            " ███████ ",
            "███      ",
            "███      ",
            "█████████",
        ],
        '3' => &[
            " ███████ ",
            "███   ███",
            "      ███",
            "   █████ ",
            "      ███",
            "███   ███",
            " ███████ ",
        ],
        '4' => &[
            "███   ███",
            "███   ███",
            "███   ███",
            "█████████",
            "      ███",
            "      ███",
            "      ███",
        ],
        '5' => &[
            "█████████",
            "███      ",
            "███      ",
            "████████ ",
            "      ███",
            "███   ███",
            " ███████ ",
        ],
        '6' => &[
            " ███████ ",
            "███   ███",
            "███      ",
            "████████ ",
            "███   ███",
            "███   ███",
            " ███████ ",
        ],
        '7' => &[
            "█████████",
            "      ███",
            "     ███ ",
            "    ███  ",
            "   ███   ",
            "  ███    ",
            " ███     ",
        ],
        '8' => &[
            " ███████ ",
            "███   ███",
            "███   ███",
            " ███████ ",
            "███   ███",
            "███   ███",
            " ███████ ",
        ],
        '9' => &[
            " ███████ ",
            "███   ███",
            "███   ███",
            " ████████",
            "      ███",
            "███   ███",
            " ███████ ",
        ],
        '$' => &[
            "    ███  ",
            " ███████ ",
            "███ ███  ",
            " ███████ ",
            "  ███ ███",
            " ███████ ",
            "   ███   ",
        ],
        '.' => &[
            "      ",
            "      ",
            "      ",
            "      ",
            "      ",
            " ███  ",
            " ███  ",
        ],
        ' ' => &[
            "         ",
            "         ",
            "         ",
            "         ",
            "         ",
            "         ",
            "         ",
        ],
        _ => return None,
    };
    Some(rows)
}

fn full_glyph(ch: char) -> Option<&'static [&'static str]> {
    let rows: &'static [&'static str; 10] = match ch {
        '0' => &[
            "  ██████████  ",
            " ████    ████ ",
            "████      ████",
            "████      ████",
            "████      ████",
            "████      ████",
            "████      ████",
            "████      ████",
            " ████    ████ ",
            "  ██████████  ",
        ],
        '1' => &[
            "     ████     ",
            "  ███████     ",
            "     ████     ",
            "     ████     ",
            "     ████     ",
            "     ████     ",
            "     ████     ",
            "     ████     ",
            "     ████     ",
            "██████████████",
        ],
        '2' => &[
            "  ███████████ ",
            " ████     ████",
            "          ████",
            "         ████ ",
            "       ████   ",
            "     ████     ",
            "   ████       ",
            " ████         ",
            "████          ",
            "██████████████",
        ],
        '3' => &[
            "  ███████████ ",
            " ████     ████",
            "          ████",
            "          ████",
            "     █████████",
            "          ████",
            "          ████",
            "          ████",
            " ████     ████",
            "  ███████████ ",
        ],
        '4' => &[
            "████      ████",
            "████      ████",
            "████      ████",
            "████      ████",
            "██████████████",
            "          ████",
            "          ████",
            "          ████",
            "          ████",
            "          ████",
        ],
        '5' => &[
            "██████████████",
            "████          ",
            "████          ",
            "████          ",
            "█████████████ ",
            "          ████",
            "          ████",
            "          ████",
            " ████     ████",
            "  ███████████ ",
        ],
        '6' => &[
            "  ███████████ ",
            " ████     ████",
            "████          ",
            "████          ",
            "█████████████ ",
            "████      ████",
            "████      ████",
            "████      ████",
            " ████     ████",
            "  ███████████ ",
        ],
        '7' => &[
            "██████████████",
            "          ████",
            "         ████ ",
            "        ████  ",
            "       ████   ",
            "      ████    ",
            "     ████     ",
            "    ████      ",
            "   ████       ",
            "  ████        ",
        ],
        '8' => &[
            "  ██████████  ",
            " ████    ████ ",
            "████      ████",
            " ████    ████ ",
            "  ██████████  ",
            " ████    ████ ",
            "████      ████",
            "████      ████",
            " ████    ████ ",
            "  ██████████  ",
        ],
        '9' => &[
            "  ██████████  ",
            " ████    ████ ",
            "████      ████",
            "████      ████",
            " █████████████",
            "          ████",
            "          ████",
            "          ████",
            " ████     ████",
            "  ██████████  ",
        ],
        '$' => &[
            "     ████     ",
            "  ███████████ ",
            " ████ ███     ",
            "████  ████    ",
            " ███████████  ",
            "  ███████████ ",
            "     ████ ████",
            "████████  ████",
            " ███████████  ",
            "     ████     ",
        ],
        '.' => &[
            "         ",
            "         ",
            "         ",
            "         ",
            "         ",
            "         ",
            "         ",
            " ██████  ",
            " ██████  ",
            " ██████  ",
        ],
        ' ' => &[
            "              ",
            "              ",
            "              ",
            "              ",
            "              ",
            "              ",
            "              ",
            "              ",
            "              ",
            "              ",
        ],
        _ => return None,
    };
    Some(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use unicode_width::UnicodeWidthStr;

    #[rstest]
    fn glyphs_are_rectangular(#[values(GlyphSet::Compact, GlyphSet::Full)] set: GlyphSet) {
        for ch in SUPPORTED_CHARS {
            let rows = set.glyph(ch).unwrap_or_else(|| panic!("missing {ch:?} in {set}"));
            assert_eq!(rows.len(), set.height(), "{ch:?} in {set}");
            let width = rows[0].width();
            assert!(rows.iter().all(|row| row.width() == width), "{ch:?} in {set} is ragged");
        }
    }

    #[rstest]
    fn only_block_cells(#[values(GlyphSet::Compact, GlyphSet::Full)] set: GlyphSet) {
        for ch in SUPPORTED_CHARS {
            let rows = set.glyph(ch).unwrap_or_default();
            assert!(rows.iter().flat_map(|row| row.chars()).all(|cell| cell == '█' || cell == ' '));
        }
    }

    #[rstest]
    #[case('a')]
    #[case('-')]
    #[case(',')]
    #[case('€')]
    fn unsupported(#[case] ch: char) {
        assert!(GlyphSet::Compact.glyph(ch).is_none());
        assert!(GlyphSet::Full.glyph(ch).is_none());
    }

    #[rstest]
    #[case(30, 8, GlyphSet::Compact)]
    #[case(120, 30, GlyphSet::Full)]
    #[case(99, 40, GlyphSet::Compact)]
    #[case(200, 24, GlyphSet::Compact)]
    #[case(100, 25, GlyphSet::Full)]
    fn selection(#[case] width: usize, #[case] height: usize, #[case] expected: GlyphSet) {
        let viewport = Viewport::new(width, height);
        assert_eq!(GlyphSet::for_viewport(viewport, &CompactThresholds::default()), expected);
    }

    #[test]
    fn custom_thresholds() {
        let thresholds = CompactThresholds { width: 40, height: 10 };
        assert_eq!(GlyphSet::for_viewport(Viewport::new(60, 12), &thresholds), GlyphSet::Full);
    }
}
