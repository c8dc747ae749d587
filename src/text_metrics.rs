//! Mirror layout backed by the window's text system.

use gpui::{SharedString, TextRun, Window, black, font, px};
use textbox_intellisense::{
    ComputedStyle, GeometryError, MirrorDocument, StyleProperty, TextLayout,
};

const FALLBACK_FONT_SIZE: f32 = 14.0;

/// A mirror host whose glyph positions come from the real font metrics.
pub type GpuiMirrorHost<'a> = MirrorDocument<WindowTextLayout<'a>>;

pub fn mirror_host(window: &Window) -> GpuiMirrorHost<'_> {
    MirrorDocument::with_layout(WindowTextLayout { window })
}

pub struct WindowTextLayout<'a> {
    window: &'a Window,
}

impl TextLayout for WindowTextLayout<'_> {
    fn locate(
        &self,
        style: &ComputedStyle,
        text: &str,
        target: usize,
    ) -> Result<(f32, f32), GeometryError> {
        let font_size = style
            .px_exact(StyleProperty::FontSize)
            .unwrap_or(FALLBACK_FONT_SIZE);
        let line_height = style
            .px_exact(StyleProperty::LineHeight)
            .unwrap_or(font_size * 1.2);
        let padding_top = style.px_exact(StyleProperty::PaddingTop).unwrap_or(0.0);
        let padding_left = style.px_exact(StyleProperty::PaddingLeft).unwrap_or(0.0);

        // Single-line mirrors never wrap; their spaces are already U+00A0.
        let wrap_width = if style.get(StyleProperty::WordWrap) == "break-word" {
            content_width(style).map(px)
        } else {
            None
        };

        let family = match style.get(StyleProperty::FontFamily) {
            "" => "monospace",
            family => family,
        };
        let runs = [TextRun {
            len: text.len(),
            font: font(family.to_string()),
            color: black(),
            background_color: None,
            underline: None,
            strikethrough: None,
        }];

        let lines = self
            .window
            .text_system()
            .shape_text(
                SharedString::from(text.to_string()),
                px(font_size),
                &runs,
                wrap_width,
                None,
            )
            .map_err(|err| GeometryError::Layout(err.to_string()))?;

        let mut top = 0.0;
        let mut line_start = 0;
        for line in &lines {
            let line_end = line_start + line.len();
            if target <= line_end {
                let point = line
                    .position_for_index(target - line_start, px(line_height))
                    .ok_or_else(|| {
                        GeometryError::Layout(format!("no glyph position for byte {target}"))
                    })?;
                let y: f32 = point.y.into();
                let x: f32 = point.x.into();
                return Ok((padding_top + top + y, padding_left + x));
            }
            let height: f32 = line.size(px(line_height)).height.into();
            top += height;
            // Skip the '\n' that ended this line.
            line_start = line_end + 1;
        }

        Err(GeometryError::Layout(format!(
            "byte {target} is past the end of the mirror text"
        )))
    }
}

fn content_width(style: &ComputedStyle) -> Option<f32> {
    let width = style.px_exact(StyleProperty::Width)?;
    if style.get(StyleProperty::BoxSizing) != "border-box" {
        return Some(width);
    }
    let inset: f32 = [
        StyleProperty::PaddingLeft,
        StyleProperty::PaddingRight,
        StyleProperty::BorderLeftWidth,
        StyleProperty::BorderRightWidth,
    ]
    .into_iter()
    .filter_map(|property| style.px_exact(property))
    .sum();
    Some((width - inset).max(0.0))
}
