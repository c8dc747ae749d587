//! Caret pixel position through a mirror element.
//!
//! Text controls do not report where their caret is drawn. To find out, the
//! control is replicated off-screen: a container gets the control's text
//! metrics and box model, is filled with the text before the caret, and is
//! followed by a marker holding the rest of the text. The marker's offset in
//! the container is the caret position.

use serde::{Deserialize, Serialize};

use crate::control::{ControlKind, TextControl, floor_char_boundary};
use crate::error::GeometryError;
use crate::style::{MIRRORED_PROPERTIES, StyleProperty};

/// Stands in for the marker text when the caret is at the very end. An empty
/// marker is not laid out at all and would report a bogus position.
const EMPTY_MARKER: &str = ".";

/// Layout engine families with known text control quirks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// Over-reports text control padding by 2px and misreports textarea
    /// overflow.
    Gecko,
    #[default]
    Other,
}

/// Pixel offset relative to the control's own top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CaretCoordinate {
    pub top: f32,
    pub left: f32,
}

impl CaretCoordinate {
    pub fn new(top: f32, left: f32) -> Self {
        Self { top, left }
    }

    pub fn translate(self, dx: f32, dy: f32) -> Self {
        Self {
            top: self.top + dy,
            left: self.left + dx,
        }
    }
}

/// An off-screen layout surface that can host mirror elements.
///
/// Mirrors must take part in layout (hidden, never removed from rendering),
/// otherwise their offsets are meaningless.
pub trait MirrorHost {
    type Element: Copy;

    fn engine(&self) -> Engine;

    /// Creates an empty container attached to the surface.
    fn create_mirror(&mut self) -> Self::Element;

    fn set_style(&mut self, element: Self::Element, property: StyleProperty, value: &str);

    fn set_text(&mut self, element: Self::Element, text: &str);

    /// Appends an inline child carrying `text` to `parent`.
    fn append_marker(&mut self, parent: Self::Element, text: &str) -> Self::Element;

    /// `(top, left)` of `marker` relative to the padding edge of its container.
    fn marker_offset(&self, marker: Self::Element) -> Result<(f32, f32), GeometryError>;

    /// Detaches `element` and everything inside it.
    fn remove_mirror(&mut self, element: Self::Element);
}

/// A mirror container that is removed from its host when dropped.
pub struct MirrorGuard<'a, H: MirrorHost> {
    host: &'a mut H,
    element: H::Element,
}

impl<'a, H: MirrorHost> MirrorGuard<'a, H> {
    pub fn new(host: &'a mut H) -> Self {
        let element = host.create_mirror();
        Self { host, element }
    }

    pub fn element(&self) -> H::Element {
        self.element
    }

    pub fn set_style(&mut self, property: StyleProperty, value: &str) {
        self.host.set_style(self.element, property, value);
    }

    pub fn set_text(&mut self, text: &str) {
        self.host.set_text(self.element, text);
    }

    pub fn append_marker(&mut self, text: &str) -> H::Element {
        self.host.append_marker(self.element, text)
    }

    pub fn marker_offset(&self, marker: H::Element) -> Result<(f32, f32), GeometryError> {
        self.host.marker_offset(marker)
    }
}

impl<H: MirrorHost> Drop for MirrorGuard<'_, H> {
    fn drop(&mut self) {
        self.host.remove_mirror(self.element);
    }
}

/// Measures where the caret would be drawn if it sat at byte `offset` of the
/// control's value.
pub fn measure_caret<H, C>(
    host: &mut H,
    control: &C,
    offset: usize,
) -> Result<CaretCoordinate, GeometryError>
where
    H: MirrorHost,
    C: TextControl + ?Sized,
{
    let engine = host.engine();
    measure_caret_for_engine(host, control, offset, engine)
}

/// [`measure_caret`] with the quirk branch chosen by the caller instead of
/// the host.
pub fn measure_caret_for_engine<H, C>(
    host: &mut H,
    control: &C,
    offset: usize,
    engine: Engine,
) -> Result<CaretCoordinate, GeometryError>
where
    H: MirrorHost,
    C: TextControl + ?Sized,
{
    let computed = control.resolved_style();
    let kind = control.kind();
    let mut mirror = MirrorGuard::new(host);

    mirror.set_style(StyleProperty::WhiteSpace, "pre-wrap");
    if kind == ControlKind::MultiLine {
        mirror.set_style(StyleProperty::WordWrap, "break-word");
    }
    mirror.set_style(StyleProperty::Position, "absolute");
    mirror.set_style(StyleProperty::Visibility, "hidden");

    for property in MIRRORED_PROPERTIES {
        mirror.set_style(property, computed.get(property));
    }

    match engine {
        Engine::Gecko => {
            if let Some(width) = computed.px(StyleProperty::Width) {
                mirror.set_style(StyleProperty::Width, &format!("{}px", width - 2.0));
            }
            let overflows = computed
                .px(StyleProperty::Height)
                .is_some_and(|height| control.scroll_height() > height);
            if overflows {
                mirror.set_style(StyleProperty::OverflowY, "scroll");
            }
        }
        Engine::Other => mirror.set_style(StyleProperty::Overflow, "hidden"),
    }

    let value = control.value();
    let offset = floor_char_boundary(value, offset);
    let (before, after) = value.split_at(offset);

    // Regular spaces collapse inside an inline box, non-breaking ones keep
    // their width.
    let before: String = match kind {
        ControlKind::SingleLine => before
            .chars()
            .map(|c| if c.is_whitespace() { '\u{a0}' } else { c })
            .collect(),
        ControlKind::MultiLine => before.to_string(),
    };
    mirror.set_text(&before);

    // The marker takes the whole remainder, not just the next character, so
    // the mirror wraps the caret's word exactly like the control does.
    let marker = mirror.append_marker(if after.is_empty() { EMPTY_MARKER } else { after });

    let (top, left) = mirror.marker_offset(marker)?;
    let coordinate = CaretCoordinate {
        top: top + computed.px(StyleProperty::BorderTopWidth).unwrap_or(0.0),
        left: left + computed.px(StyleProperty::BorderLeftWidth).unwrap_or(0.0),
    };

    tracing::trace!(
        target: "intellisense",
        offset,
        ?engine,
        top = coordinate.top,
        left = coordinate.left,
        "measured caret"
    );
    Ok(coordinate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Records every call so tests can inspect what the mirror received.
    #[derive(Default)]
    struct RecordingHost {
        engine: Engine,
        styles: Vec<(StyleProperty, String)>,
        text: String,
        marker: String,
        created: usize,
        removed: usize,
        fail: bool,
    }

    impl MirrorHost for RecordingHost {
        type Element = usize;

        fn engine(&self) -> Engine {
            self.engine
        }

        fn create_mirror(&mut self) -> usize {
            self.created += 1;
            0
        }

        fn set_style(&mut self, _: usize, property: StyleProperty, value: &str) {
            self.styles.push((property, value.to_string()));
        }

        fn set_text(&mut self, _: usize, text: &str) {
            self.text = text.to_string();
        }

        fn append_marker(&mut self, _: usize, text: &str) -> usize {
            self.marker = text.to_string();
            1
        }

        fn marker_offset(&self, marker: usize) -> Result<(f32, f32), GeometryError> {
            if self.fail {
                return Err(GeometryError::MissingElement(marker));
            }
            Ok((10.0, 20.0))
        }

        fn remove_mirror(&mut self, _: usize) {
            self.removed += 1;
        }
    }

    impl RecordingHost {
        fn last_style(&self, property: StyleProperty) -> Option<&str> {
            self.styles
                .iter()
                .rev()
                .find(|(p, _)| *p == property)
                .map(|(_, v)| v.as_str())
        }
    }

    fn style() -> crate::style::ComputedStyle {
        crate::style::ComputedStyle::new()
            .with(StyleProperty::Width, "200px")
            .with(StyleProperty::Height, "40px")
            .with(StyleProperty::BorderTopWidth, "2px")
            .with(StyleProperty::BorderLeftWidth, "3.6px")
            .with(StyleProperty::FontSize, "10px")
    }

    #[test]
    fn single_line_uses_non_breaking_spaces_and_no_word_wrap() {
        let mut host = RecordingHost::default();
        let control = crate::control::TextField::single_line(style()).with_value("a b\tc d");

        let coordinate = measure_caret(&mut host, &control, 5).expect("coordinate");

        assert_eq!(host.text, "a\u{a0}b\u{a0}c");
        assert_eq!(host.marker, " d");
        assert_eq!(host.last_style(StyleProperty::WordWrap), None);
        assert_eq!(host.last_style(StyleProperty::WhiteSpace), Some("pre-wrap"));
        assert_eq!(coordinate, CaretCoordinate::new(12.0, 23.0));
    }

    #[test]
    fn multi_line_keeps_spaces_and_wraps_words() {
        let mut host = RecordingHost::default();
        let control = crate::control::TextField::multi_line(style()).with_value("a b");

        measure_caret(&mut host, &control, 3).expect("coordinate");

        assert_eq!(host.text, "a b");
        assert_eq!(host.marker, EMPTY_MARKER);
        assert_eq!(host.last_style(StyleProperty::WordWrap), Some("break-word"));
        assert_eq!(host.last_style(StyleProperty::Overflow), Some("hidden"));
        assert_eq!(host.last_style(StyleProperty::Visibility), Some("hidden"));
        assert_eq!(host.last_style(StyleProperty::Position), Some("absolute"));
    }

    #[test]
    fn every_mirrored_property_is_copied() {
        let mut host = RecordingHost::default();
        let control = crate::control::TextField::multi_line(style());

        measure_caret(&mut host, &control, 0).expect("coordinate");

        for property in MIRRORED_PROPERTIES {
            assert!(
                host.styles.iter().any(|(p, _)| *p == property),
                "{} not copied",
                property.css_name()
            );
        }
    }

    #[test]
    fn gecko_shrinks_width_and_forces_scroll_on_overflow() {
        let mut host = RecordingHost {
            engine: Engine::Gecko,
            ..Default::default()
        };
        let control = crate::control::TextField::multi_line(style())
            .with_value("text")
            .with_scroll_height(90.0);

        measure_caret(&mut host, &control, 2).expect("coordinate");

        assert_eq!(host.last_style(StyleProperty::Width), Some("198px"));
        assert_eq!(host.last_style(StyleProperty::OverflowY), Some("scroll"));
        assert_eq!(host.last_style(StyleProperty::Overflow), None);
    }

    #[test]
    fn gecko_leaves_overflow_alone_when_content_fits() {
        let mut host = RecordingHost {
            engine: Engine::Gecko,
            ..Default::default()
        };
        let control = crate::control::TextField::multi_line(style()).with_value("text");

        measure_caret(&mut host, &control, 2).expect("coordinate");

        assert_eq!(host.last_style(StyleProperty::OverflowY), Some(""));
    }

    #[test]
    fn mirror_is_removed_even_when_measuring_fails() {
        let mut host = RecordingHost {
            fail: true,
            ..Default::default()
        };
        let control = crate::control::TextField::multi_line(style()).with_value("x");

        assert!(measure_caret(&mut host, &control, 1).is_err());
        assert_eq!(host.created, 1);
        assert_eq!(host.removed, 1);
    }
}
