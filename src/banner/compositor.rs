use super::{BannerError, Canvas, GlyphSpan};
use crate::animations::AnimationFrame;
use crate::color::Color;
use crossterm::style::ContentStyle;
use itertools::Itertools;
use unicode_width::UnicodeWidthChar;

/// Merge a canvas with an animation frame into a styled string.
///
/// Every glyph cell takes the color of the source character it belongs to. Gaps,
/// padding and blank lines stay unstyled. Without a frame the canvas is returned
/// as plain text.
pub fn composite(canvas: &Canvas, frame: Option<&AnimationFrame>) -> Result<String, BannerError> {
    let Some(frame) = frame else {
        return Ok(canvas.to_plain_string());
    };
    if frame.colors.len() != canvas.spans().len() {
        return Err(BannerError::FrameMismatch { expected: canvas.spans().len(), actual: frame.colors.len() });
    }
    Ok(canvas.lines().iter().map(|line| style_line(line, canvas.spans(), &frame.colors)).join("\n"))
}

fn style_line(line: &str, spans: &[GlyphSpan], colors: &[Color]) -> String {
    let mut output = String::with_capacity(line.len() * 2);
    let mut run = String::new();
    let mut run_owner = None;
    let mut column = 0;
    let mut next_span = 0;
    for ch in line.chars() {
        while spans.get(next_span).is_some_and(|span| column >= span.end()) {
            next_span += 1;
        }
        let owner = spans.get(next_span).filter(|span| span.contains(column)).map(|_| next_span);
        if owner != run_owner {
            flush_run(&mut output, &run, run_owner.map(|index| colors[index]));
            run.clear();
            run_owner = owner;
        }
        run.push(ch);
        column += ch.width().unwrap_or(0);
    }
    flush_run(&mut output, &run, run_owner.map(|index| colors[index]));
    output
}

fn flush_run(output: &mut String, run: &str, color: Option<Color>) {
    match color {
        Some(color) if run.chars().any(|ch| !ch.is_whitespace()) => {
            let style = ContentStyle { foreground_color: Some(color.into()), ..Default::default() };
            output.push_str(&style.apply(run).to_string());
        }
        _ => output.push_str(run),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banner::{GlyphSet, Viewport, center, rasterize};
    use chrono::Local;

    fn frame(colors: Vec<Color>) -> AnimationFrame {
        AnimationFrame { colors, text: String::new(), generated_at: Local::now() }
    }

    fn styled(text: &str, color: Color) -> String {
        ContentStyle { foreground_color: Some(color.into()), ..Default::default() }.apply(text).to_string()
    }

    const RED: Color = Color::new(255, 0, 0);
    const BLUE: Color = Color::new(0, 0, 255);

    #[test]
    fn plain_without_frame() {
        let canvas = rasterize("$1", GlyphSet::Compact).expect("supported");
        assert_eq!(composite(&canvas, None), Ok(canvas.to_plain_string()));
    }

    #[test]
    fn colors_each_glyph() {
        let canvas = rasterize("11", GlyphSet::Compact).expect("supported");
        let output = composite(&canvas, Some(&frame(vec![RED, BLUE]))).expect("composited");
        let lines: Vec<_> = output.split('\n').collect();
        // bottom row of '1' is " ███████ "
        assert_eq!(lines[6], format!("{}  {}", styled(" ███████ ", RED), styled(" ███████ ", BLUE)));
    }

    #[test]
    fn padding_stays_plain() {
        let canvas = center(&rasterize("1", GlyphSet::Compact).expect("supported"), Viewport::new(13, 9));
        let output = composite(&canvas, Some(&frame(vec![RED]))).expect("composited");
        let lines: Vec<_> = output.split('\n').collect();
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], " ".repeat(13));
        assert_eq!(lines[8], " ".repeat(13));
        assert_eq!(lines[1], format!("  {}  ", styled("   ███   ", RED)));
    }

    #[test]
    fn frame_length_must_match() {
        let canvas = rasterize("$42.50", GlyphSet::Full).expect("supported");
        let result = composite(&canvas, Some(&frame(vec![RED; 5])));
        assert_eq!(result, Err(BannerError::FrameMismatch { expected: 6, actual: 5 }));
    }

    #[test]
    fn empty_canvas_with_empty_frame() {
        assert_eq!(composite(&Canvas::default(), Some(&frame(Vec::new()))), Ok(String::new()));
    }
}
