//! CSS properties copied from a text control onto its layout mirror.

use std::collections::HashMap;

/// Style properties the caret mirror reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleProperty {
    Direction,
    BoxSizing,
    Width,
    Height,
    OverflowX,
    OverflowY,
    BorderTopWidth,
    BorderRightWidth,
    BorderBottomWidth,
    BorderLeftWidth,
    PaddingTop,
    PaddingRight,
    PaddingBottom,
    PaddingLeft,
    FontStyle,
    FontVariant,
    FontWeight,
    FontStretch,
    FontSize,
    FontSizeAdjust,
    LineHeight,
    FontFamily,
    TextAlign,
    TextTransform,
    TextIndent,
    TextDecoration,
    LetterSpacing,
    WordSpacing,
    // Forced onto the mirror, never copied.
    WhiteSpace,
    WordWrap,
    Position,
    Visibility,
    Overflow,
}

/// Every property whose computed value must be copied verbatim from the live
/// control onto the mirror. Shorthands are not reliably reported by every
/// engine, so each longhand is listed on its own.
pub const MIRRORED_PROPERTIES: [StyleProperty; 28] = [
    StyleProperty::Direction,
    StyleProperty::BoxSizing,
    StyleProperty::Width,
    StyleProperty::Height,
    StyleProperty::OverflowX,
    StyleProperty::OverflowY,
    StyleProperty::BorderTopWidth,
    StyleProperty::BorderRightWidth,
    StyleProperty::BorderBottomWidth,
    StyleProperty::BorderLeftWidth,
    StyleProperty::PaddingTop,
    StyleProperty::PaddingRight,
    StyleProperty::PaddingBottom,
    StyleProperty::PaddingLeft,
    StyleProperty::FontStyle,
    StyleProperty::FontVariant,
    StyleProperty::FontWeight,
    StyleProperty::FontStretch,
    StyleProperty::FontSize,
    StyleProperty::FontSizeAdjust,
    StyleProperty::LineHeight,
    StyleProperty::FontFamily,
    StyleProperty::TextAlign,
    StyleProperty::TextTransform,
    StyleProperty::TextIndent,
    StyleProperty::TextDecoration,
    StyleProperty::LetterSpacing,
    StyleProperty::WordSpacing,
];

impl StyleProperty {
    pub fn css_name(self) -> &'static str {
        match self {
            StyleProperty::Direction => "direction",
            StyleProperty::BoxSizing => "box-sizing",
            StyleProperty::Width => "width",
            StyleProperty::Height => "height",
            StyleProperty::OverflowX => "overflow-x",
            StyleProperty::OverflowY => "overflow-y",
            StyleProperty::BorderTopWidth => "border-top-width",
            StyleProperty::BorderRightWidth => "border-right-width",
            StyleProperty::BorderBottomWidth => "border-bottom-width",
            StyleProperty::BorderLeftWidth => "border-left-width",
            StyleProperty::PaddingTop => "padding-top",
            StyleProperty::PaddingRight => "padding-right",
            StyleProperty::PaddingBottom => "padding-bottom",
            StyleProperty::PaddingLeft => "padding-left",
            StyleProperty::FontStyle => "font-style",
            StyleProperty::FontVariant => "font-variant",
            StyleProperty::FontWeight => "font-weight",
            StyleProperty::FontStretch => "font-stretch",
            StyleProperty::FontSize => "font-size",
            StyleProperty::FontSizeAdjust => "font-size-adjust",
            StyleProperty::LineHeight => "line-height",
            StyleProperty::FontFamily => "font-family",
            StyleProperty::TextAlign => "text-align",
            StyleProperty::TextTransform => "text-transform",
            StyleProperty::TextIndent => "text-indent",
            StyleProperty::TextDecoration => "text-decoration",
            StyleProperty::LetterSpacing => "letter-spacing",
            StyleProperty::WordSpacing => "word-spacing",
            StyleProperty::WhiteSpace => "white-space",
            StyleProperty::WordWrap => "word-wrap",
            StyleProperty::Position => "position",
            StyleProperty::Visibility => "visibility",
            StyleProperty::Overflow => "overflow",
        }
    }
}

/// Resolved style values of an element, keyed by property.
///
/// Values are kept as the CSS strings the engine reports (`"12px"`,
/// `"border-box"`, `"normal"`). Missing properties read as the empty string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComputedStyle {
    values: HashMap<StyleProperty, String>,
}

impl ComputedStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, property: StyleProperty) -> &str {
        self.values.get(&property).map_or("", String::as_str)
    }

    pub fn set(&mut self, property: StyleProperty, value: impl Into<String>) {
        self.values.insert(property, value.into());
    }

    pub fn with(mut self, property: StyleProperty, value: impl Into<String>) -> Self {
        self.set(property, value);
        self
    }

    /// Integer pixel value of `property`, truncated the way `parseInt` reads
    /// `"12.7px"` as 12.
    pub fn px(&self, property: StyleProperty) -> Option<f32> {
        parse_int(self.get(property))
    }

    /// Pixel value of `property` keeping its fractional part.
    pub fn px_exact(&self, property: StyleProperty) -> Option<f32> {
        let value = self.get(property).trim();
        let number = value.strip_suffix("px").unwrap_or(value);
        number.trim().parse().ok()
    }
}

/// Leading integer of a CSS length; `None` when there are no digits.
pub fn parse_int(value: &str) -> Option<f32> {
    let value = value.trim_start();
    let (sign, digits) = match value.as_bytes().first() {
        Some(b'-') => (-1.0, &value[1..]),
        Some(b'+') => (1.0, &value[1..]),
        _ => (1.0, value),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end].parse::<f32>().ok().map(|n| sign * n)
}
