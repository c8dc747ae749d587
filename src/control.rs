//! The text control the intellisense is attached to.
//!
//! Offsets into the value are byte offsets, as everywhere else in the crate.
//! Writers clamp them to the nearest preceding character boundary.

use std::collections::HashMap;

use crate::style::ComputedStyle;

/// Single-line controls never wrap and collapse whitespace differently, so
/// caret measurement needs to know which one it is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlKind {
    /// An `<input>`-like box.
    SingleLine,
    /// A `<textarea>`-like box.
    #[default]
    MultiLine,
}

pub trait TextControl {
    fn value(&self) -> &str;
    fn set_value(&mut self, value: String);

    fn selection_start(&self) -> usize;
    fn selection_end(&self) -> usize;
    fn set_selection(&mut self, start: usize, end: usize);

    fn kind(&self) -> ControlKind;

    /// Position of the control's border box relative to the surface the
    /// popups are positioned on.
    fn offset_left(&self) -> f32;
    fn offset_top(&self) -> f32;

    /// Height of the full content, including what is scrolled out of view.
    fn scroll_height(&self) -> f32;

    /// Resolved style, when the host has a computed-style reader.
    fn computed_style(&self) -> Option<ComputedStyle>;

    /// Style as reported by the host's legacy reader.
    fn current_style(&self) -> ComputedStyle;

    fn caret_offset(&self) -> usize {
        self.selection_start()
    }

    fn resolved_style(&self) -> ComputedStyle {
        self.computed_style()
            .unwrap_or_else(|| self.current_style())
    }
}

/// Hands out text controls by identifier.
pub trait ControlRegistry {
    type Control: TextControl;

    /// Removes and returns the control registered as `id`.
    fn take_control(&mut self, id: &str) -> Option<Self::Control>;
}

impl<C: TextControl> ControlRegistry for HashMap<String, C> {
    type Control = C;

    fn take_control(&mut self, id: &str) -> Option<C> {
        self.remove(id)
    }
}

/// An in-memory text control.
#[derive(Debug, Clone, Default)]
pub struct TextField {
    value: String,
    selection_start: usize,
    selection_end: usize,
    kind: ControlKind,
    offset_left: f32,
    offset_top: f32,
    scroll_height: Option<f32>,
    style: ComputedStyle,
    legacy_style_only: bool,
}

impl TextField {
    pub fn new(kind: ControlKind, style: ComputedStyle) -> Self {
        Self {
            kind,
            style,
            ..Default::default()
        }
    }

    pub fn single_line(style: ComputedStyle) -> Self {
        Self::new(ControlKind::SingleLine, style)
    }

    pub fn multi_line(style: ComputedStyle) -> Self {
        Self::new(ControlKind::MultiLine, style)
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.set_value(value.into());
        let end = self.value.len();
        self.set_selection(end, end);
        self
    }

    pub fn with_offset(mut self, left: f32, top: f32) -> Self {
        self.offset_left = left;
        self.offset_top = top;
        self
    }

    /// Reports `height` as the content height instead of the styled height.
    pub fn with_scroll_height(mut self, height: f32) -> Self {
        self.scroll_height = Some(height);
        self
    }

    /// Makes the control behave like a host without a computed-style API.
    pub fn legacy_style_only(mut self) -> Self {
        self.legacy_style_only = true;
        self
    }

    pub fn style(&self) -> &ComputedStyle {
        &self.style
    }

    pub fn style_mut(&mut self) -> &mut ComputedStyle {
        &mut self.style
    }

    pub fn set_caret(&mut self, offset: usize) {
        self.set_selection(offset, offset);
    }

    pub fn insert_str(&mut self, text: &str) {
        let start = self.selection_start.min(self.selection_end);
        let end = self.selection_start.max(self.selection_end);
        self.value.replace_range(start..end, text);
        self.set_caret(start + text.len());
    }

    /// Deletes the selection, or the character before the caret.
    pub fn delete_backward(&mut self) {
        let start = self.selection_start.min(self.selection_end);
        let end = self.selection_start.max(self.selection_end);
        if start != end {
            self.value.replace_range(start..end, "");
            self.set_caret(start);
            return;
        }
        if let Some((prev, _)) = self.value[..start].char_indices().next_back() {
            self.value.replace_range(prev..start, "");
            self.set_caret(prev);
        }
    }

    pub fn move_left(&mut self) {
        let caret = self.caret_offset();
        let prev = self.value[..caret]
            .char_indices()
            .next_back()
            .map_or(0, |(i, _)| i);
        self.set_caret(prev);
    }

    pub fn move_right(&mut self) {
        let caret = self.caret_offset();
        let next = self.value[caret..]
            .chars()
            .next()
            .map_or(caret, |c| caret + c.len_utf8());
        self.set_caret(next);
    }
}

impl TextControl for TextField {
    fn value(&self) -> &str {
        &self.value
    }

    fn set_value(&mut self, value: String) {
        self.value = value;
        self.selection_start = floor_char_boundary(&self.value, self.selection_start);
        self.selection_end = floor_char_boundary(&self.value, self.selection_end);
    }

    fn selection_start(&self) -> usize {
        self.selection_start
    }

    fn selection_end(&self) -> usize {
        self.selection_end
    }

    fn set_selection(&mut self, start: usize, end: usize) {
        self.selection_start = floor_char_boundary(&self.value, start);
        self.selection_end = floor_char_boundary(&self.value, end);
    }

    fn kind(&self) -> ControlKind {
        self.kind
    }

    fn offset_left(&self) -> f32 {
        self.offset_left
    }

    fn offset_top(&self) -> f32 {
        self.offset_top
    }

    fn scroll_height(&self) -> f32 {
        self.scroll_height
            .or_else(|| self.style.px_exact(crate::style::StyleProperty::Height))
            .unwrap_or(0.0)
    }

    fn computed_style(&self) -> Option<ComputedStyle> {
        (!self.legacy_style_only).then(|| self.style.clone())
    }

    fn current_style(&self) -> ComputedStyle {
        self.style.clone()
    }
}

/// Largest char boundary in `text` that is not past `offset`.
pub(crate) fn floor_char_boundary(text: &str, offset: usize) -> usize {
    if offset >= text.len() {
        return text.len();
    }
    (0..=offset)
        .rev()
        .find(|&i| text.is_char_boundary(i))
        .unwrap_or(0)
}
