use super::{Canvas, GlyphSpan, Viewport};
use unicode_width::UnicodeWidthStr;

/// Center a canvas inside the viewport.
///
/// Padding is only ever added: a dimension where the content does not fit is
/// left untouched and nothing is clipped. Odd leftovers go to the right and to
/// the bottom. The result fills the viewport exactly in every dimension that
/// was padded, so centering twice is the same as centering once.
pub fn center(canvas: &Canvas, viewport: Viewport) -> Canvas {
    let content_width = canvas.width();
    let content_height = canvas.height();

    let (left, width) = if viewport.width > content_width {
        ((viewport.width - content_width) / 2, viewport.width)
    } else {
        (0, content_width)
    };
    let (top, bottom) = if viewport.height > content_height {
        let top = (viewport.height - content_height) / 2;
        (top, viewport.height - content_height - top)
    } else {
        (0, 0)
    };

    let blank = " ".repeat(width);
    let mut lines = Vec::with_capacity(top + content_height + bottom);
    lines.extend(std::iter::repeat(blank.clone()).take(top));
    for line in canvas.lines() {
        let right = width.saturating_sub(left + line.width());
        lines.push(format!("{}{line}{}", " ".repeat(left), " ".repeat(right)));
    }
    lines.extend(std::iter::repeat(blank).take(bottom));

    let spans = canvas.spans().iter().map(|span| GlyphSpan { start: span.start + left, width: span.width }).collect();
    Canvas::new(lines, spans)
}
