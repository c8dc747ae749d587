//! Mirror hosts built from an element tree and a pluggable text layout.
//!
//! [`MirrorDocument`] keeps the mirror containers and markers the caret
//! measurement creates; a [`TextLayout`] decides where the marker lands.
//! [`HeadlessDocument`] pairs it with [`MonospaceLayout`], a deterministic
//! layout for places without a real layout engine: terminals, tests, and
//! server-side previews. Every glyph has the same advance, derived from the
//! font size. Lines wrap the way `white-space: pre-wrap` does: after spaces
//! and tabs, never at U+00A0, and inside a word only with
//! `word-wrap: break-word`.

use crate::error::GeometryError;
use crate::geometry::{Engine, MirrorHost};
use crate::style::{ComputedStyle, StyleProperty};

const DEFAULT_FONT_SIZE: f32 = 16.0;
const DEFAULT_GLYPH_RATIO: f32 = 0.6;
const DEFAULT_SCROLLBAR_WIDTH: f32 = 17.0;
const TAB_COLUMNS: f32 = 8.0;

/// Places text inside a styled mirror container.
pub trait TextLayout {
    /// `(top, left)` of byte `target` of `text` when laid out in a container
    /// styled with `style`, measured from the container's padding edge.
    fn locate(
        &self,
        style: &ComputedStyle,
        text: &str,
        target: usize,
    ) -> Result<(f32, f32), GeometryError>;
}

#[derive(Debug, Default)]
struct Node {
    parent: Option<usize>,
    style: ComputedStyle,
    text: String,
    children: Vec<usize>,
}

/// Mirror elements stored in slots. Detached slots are reused by later
/// allocations.
#[derive(Debug)]
pub struct MirrorDocument<L> {
    layout: L,
    engine: Engine,
    nodes: Vec<Option<Node>>,
    free: Vec<usize>,
    fail_measurement: bool,
}

/// A mirror host with deterministic monospace layout.
pub type HeadlessDocument = MirrorDocument<MonospaceLayout>;

impl Default for HeadlessDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessDocument {
    pub fn new() -> Self {
        Self::with_layout(MonospaceLayout::default())
    }

    /// Glyph advance as a fraction of the font size.
    pub fn with_glyph_ratio(mut self, ratio: f32) -> Self {
        self.layout.glyph_ratio = ratio;
        self
    }
}

impl<L: TextLayout> MirrorDocument<L> {
    pub fn with_layout(layout: L) -> Self {
        Self {
            layout,
            engine: Engine::Other,
            nodes: Vec::new(),
            free: Vec::new(),
            fail_measurement: false,
        }
    }

    pub fn with_engine(mut self, engine: Engine) -> Self {
        self.engine = engine;
        self
    }

    /// Makes every following `marker_offset` call fail.
    pub fn fail_measurement(&mut self, fail: bool) {
        self.fail_measurement = fail;
    }

    /// Number of elements currently attached.
    pub fn live_elements(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    fn node(&self, element: usize) -> Result<&Node, GeometryError> {
        self.nodes
            .get(element)
            .and_then(Option::as_ref)
            .ok_or(GeometryError::MissingElement(element))
    }

    fn node_mut(&mut self, element: usize) -> Option<&mut Node> {
        self.nodes.get_mut(element).and_then(Option::as_mut)
    }

    fn insert(&mut self, node: Node) -> usize {
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                slot
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        }
    }

    fn detach(&mut self, element: usize) {
        let Some(node) = self.nodes.get_mut(element).and_then(Option::take) else {
            return;
        };
        self.free.push(element);
        for child in node.children {
            self.detach(child);
        }
    }
}

impl<L: TextLayout> MirrorHost for MirrorDocument<L> {
    type Element = usize;

    fn engine(&self) -> Engine {
        self.engine
    }

    fn create_mirror(&mut self) -> usize {
        self.insert(Node::default())
    }

    fn set_style(&mut self, element: usize, property: StyleProperty, value: &str) {
        let Some(node) = self.node_mut(element) else {
            return;
        };
        if property == StyleProperty::Overflow {
            node.style.set(StyleProperty::OverflowX, value);
            node.style.set(StyleProperty::OverflowY, value);
        }
        node.style.set(property, value);
    }

    fn set_text(&mut self, element: usize, text: &str) {
        let children = match self.node_mut(element) {
            Some(node) => {
                node.text = text.to_string();
                std::mem::take(&mut node.children)
            }
            None => return,
        };
        for child in children {
            self.detach(child);
        }
    }

    fn append_marker(&mut self, parent: usize, text: &str) -> usize {
        let marker = self.insert(Node {
            parent: Some(parent),
            text: text.to_string(),
            ..Default::default()
        });
        if let Some(node) = self.node_mut(parent) {
            node.children.push(marker);
        }
        marker
    }

    fn marker_offset(&self, marker: usize) -> Result<(f32, f32), GeometryError> {
        if self.fail_measurement {
            return Err(GeometryError::Layout("measurement disabled".to_string()));
        }
        let marker_node = self.node(marker)?;
        let parent = marker_node.parent.ok_or(GeometryError::MissingElement(marker))?;
        let container = self.node(parent)?;

        let mut text = container.text.clone();
        for &child in &container.children {
            if child == marker {
                break;
            }
            text.push_str(&self.node(child)?.text);
        }
        let target = text.len();
        text.push_str(&marker_node.text);

        self.layout.locate(&container.style, &text, target)
    }

    fn remove_mirror(&mut self, element: usize) {
        self.detach(element);
    }
}

/// Fixed-advance layout.
#[derive(Debug, Clone, Copy)]
pub struct MonospaceLayout {
    /// Glyph advance as a fraction of the font size.
    pub glyph_ratio: f32,
    /// Width taken from the content box by `overflow-y: scroll`.
    pub scrollbar_width: f32,
}

impl Default for MonospaceLayout {
    fn default() -> Self {
        Self {
            glyph_ratio: DEFAULT_GLYPH_RATIO,
            scrollbar_width: DEFAULT_SCROLLBAR_WIDTH,
        }
    }
}

impl TextLayout for MonospaceLayout {
    fn locate(
        &self,
        style: &ComputedStyle,
        text: &str,
        target: usize,
    ) -> Result<(f32, f32), GeometryError> {
        let metrics = Metrics::resolve(style, self.glyph_ratio, self.scrollbar_width);
        let (line, x) = metrics.locate(text, target);
        Ok((
            metrics.padding_top + line as f32 * metrics.line_height,
            metrics.padding_left + x,
        ))
    }
}

/// Text metrics of a mirror container.
struct Metrics {
    advance: f32,
    word_spacing: f32,
    line_height: f32,
    text_indent: f32,
    padding_top: f32,
    padding_left: f32,
    wrap_width: Option<f32>,
    break_words: bool,
}

impl Metrics {
    fn resolve(style: &ComputedStyle, glyph_ratio: f32, scrollbar_width: f32) -> Self {
        let px = |property| style.px_exact(property).unwrap_or(0.0);
        let font_size = style
            .px_exact(StyleProperty::FontSize)
            .unwrap_or(DEFAULT_FONT_SIZE);
        let line_height = style
            .px_exact(StyleProperty::LineHeight)
            .unwrap_or(font_size * 1.2);

        let wraps = !matches!(style.get(StyleProperty::WhiteSpace), "pre" | "nowrap");
        let wrap_width = style.px_exact(StyleProperty::Width).filter(|_| wraps).map(|width| {
            let mut content = width;
            if style.get(StyleProperty::BoxSizing) == "border-box" {
                content -= px(StyleProperty::PaddingLeft)
                    + px(StyleProperty::PaddingRight)
                    + px(StyleProperty::BorderLeftWidth)
                    + px(StyleProperty::BorderRightWidth);
            }
            if style.get(StyleProperty::OverflowY) == "scroll" {
                content -= scrollbar_width;
            }
            content.max(0.0)
        });

        Self {
            advance: font_size * glyph_ratio + px(StyleProperty::LetterSpacing),
            word_spacing: px(StyleProperty::WordSpacing),
            line_height,
            text_indent: px(StyleProperty::TextIndent),
            padding_top: px(StyleProperty::PaddingTop),
            padding_left: px(StyleProperty::PaddingLeft),
            wrap_width,
            break_words: style.get(StyleProperty::WordWrap) == "break-word",
        }
    }

    fn char_width(&self, c: char, x: f32) -> f32 {
        match c {
            '\t' => {
                let stop = self.advance * TAB_COLUMNS;
                if stop <= 0.0 {
                    0.0
                } else {
                    stop - x % stop
                }
            }
            ' ' | '\u{a0}' => self.advance + self.word_spacing,
            _ => self.advance,
        }
    }

    fn overflows(&self, end: f32) -> bool {
        self.wrap_width.is_some_and(|limit| end > limit)
    }

    /// Line index and horizontal offset of byte `target` in `text`.
    fn locate(&self, text: &str, target: usize) -> (usize, f32) {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let mut line = 0;
        let mut line_start = self.text_indent;
        let mut x = line_start;
        let mut i = 0;

        while i < chars.len() {
            let (index, c) = chars[i];
            if c == '\n' {
                if index == target {
                    return (line, x);
                }
                line += 1;
                line_start = 0.0;
                x = 0.0;
                i += 1;
                continue;
            }

            let word_start = i;
            let mut word_width = 0.0;
            while i < chars.len() && !is_break_space(chars[i].1) && chars[i].1 != '\n' {
                word_width += self.char_width(chars[i].1, x + word_width);
                i += 1;
            }
            if x > line_start && self.overflows(x + word_width) {
                line += 1;
                line_start = 0.0;
                x = 0.0;
            }
            for &(index, c) in &chars[word_start..i] {
                let width = self.char_width(c, x);
                if self.break_words && x > line_start && self.overflows(x + width) {
                    line += 1;
                    line_start = 0.0;
                    x = 0.0;
                }
                if index == target {
                    return (line, x);
                }
                x += width;
            }

            // Trailing spaces hang past the edge instead of wrapping.
            while i < chars.len() && is_break_space(chars[i].1) {
                let (index, c) = chars[i];
                if index == target {
                    return (line, x);
                }
                x += self.char_width(c, x);
                i += 1;
            }
        }
        (line, x)
    }
}

fn is_break_space(c: char) -> bool {
    c == ' ' || c == '\t'
}
