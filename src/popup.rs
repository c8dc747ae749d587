//! Suggestion popups the controller drives.
//!
//! The traits describe what the controller needs from a popup; rendering is
//! left to the host. [`DeclarationList`] and [`MethodList`] are plain state
//! implementations a host can render directly.

use serde::{Deserialize, Serialize};

use crate::keys::{KeyEvent, code};

/// Capabilities shared by both popups.
pub trait Popup {
    fn is_visible(&self) -> bool;
    fn set_visible(&mut self, visible: bool);
    fn set_filter(&mut self, text: &str);
    /// Places the popup's top-left corner, in the coordinates of the surface
    /// the text control sits on.
    fn set_position(&mut self, x: f32, y: f32);
    /// Receives key-down events while the popup is visible. Keys the popup
    /// consumes should be marked with [`KeyEvent::prevent_default`].
    fn handle_key_down(&mut self, event: &mut KeyEvent);
}

pub trait DeclarationsPopup: Popup {
    fn set_declarations(&mut self, declarations: Vec<Declaration>);
    /// The item the user picked during the last key event, if any.
    fn take_chosen(&mut self) -> Option<Declaration>;
}

pub trait MethodsPopup: Popup {
    fn set_methods(&mut self, methods: Vec<String>);
}

/// One completion entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glyph: Option<String>,
}

impl Declaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    /// Text inserted when the declaration is chosen: the value, or the name
    /// when there is no value.
    pub fn insert_text(&self) -> &str {
        self.value
            .as_deref()
            .filter(|value| !value.is_empty())
            .unwrap_or(&self.name)
    }
}

/// Declarations filtered by the text typed since the popup opened.
#[derive(Debug, Clone, Default)]
pub struct DeclarationList {
    declarations: Vec<Declaration>,
    /// Indices into `declarations` that pass the filter.
    filtered: Vec<usize>,
    filter: String,
    selected_index: usize,
    visible: bool,
    position: (f32, f32),
    chosen: Option<Declaration>,
}

impl DeclarationList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn position(&self) -> (f32, f32) {
        self.position
    }

    /// Returns the currently selected declaration.
    pub fn selected(&self) -> Option<&Declaration> {
        self.filtered
            .get(self.selected_index)
            .map(|&index| &self.declarations[index])
    }

    /// Returns the filtered declarations with their selection state.
    pub fn visible_items(&self) -> Vec<(bool, &Declaration)> {
        self.filtered
            .iter()
            .enumerate()
            .map(|(idx, &index)| (idx == self.selected_index, &self.declarations[index]))
            .collect()
    }

    /// Moves selection up in the list.
    pub fn move_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    /// Moves selection down in the list.
    pub fn move_down(&mut self) {
        if self.selected_index < self.filtered.len().saturating_sub(1) {
            self.selected_index += 1;
        }
    }

    /// Marks the selected declaration as chosen.
    pub fn choose_selected(&mut self) {
        self.chosen = self.selected().cloned();
    }

    fn refilter(&mut self) {
        let needle = self.filter.to_lowercase();
        self.filtered = self
            .declarations
            .iter()
            .enumerate()
            .filter(|(_, decl)| decl.name.to_lowercase().starts_with(&needle))
            .map(|(index, _)| index)
            .collect();
        self.selected_index = 0;
    }
}

impl Popup for DeclarationList {
    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn set_filter(&mut self, text: &str) {
        if self.filter != text {
            self.filter = text.to_string();
            self.refilter();
        }
    }

    fn set_position(&mut self, x: f32, y: f32) {
        self.position = (x, y);
    }

    fn handle_key_down(&mut self, event: &mut KeyEvent) {
        match event.key_code {
            code::UP => self.move_up(),
            code::DOWN => self.move_down(),
            code::ENTER | code::TAB => self.choose_selected(),
            code::ESCAPE => self.visible = false,
            _ => return,
        }
        event.prevent_default();
    }
}

impl DeclarationsPopup for DeclarationList {
    fn set_declarations(&mut self, declarations: Vec<Declaration>) {
        self.declarations = declarations;
        self.refilter();
    }

    fn take_chosen(&mut self) -> Option<Declaration> {
        self.chosen.take()
    }
}

/// Overloaded signatures of the method being called.
#[derive(Debug, Clone, Default)]
pub struct MethodList {
    methods: Vec<String>,
    selected_index: usize,
    filter: String,
    visible: bool,
    position: (f32, f32),
}

impl MethodList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> (f32, f32) {
        self.position
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// The signature on display and its 1-based overload number.
    pub fn current(&self) -> Option<(usize, &str)> {
        self.methods
            .get(self.selected_index)
            .map(|method| (self.selected_index + 1, method.as_str()))
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl Popup for MethodList {
    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn set_filter(&mut self, text: &str) {
        self.filter = text.to_string();
    }

    fn set_position(&mut self, x: f32, y: f32) {
        self.position = (x, y);
    }

    fn handle_key_down(&mut self, event: &mut KeyEvent) {
        match event.key_code {
            code::UP if self.selected_index > 0 => self.selected_index -= 1,
            code::DOWN if self.selected_index + 1 < self.methods.len() => {
                self.selected_index += 1
            }
            code::ESCAPE => self.visible = false,
            _ => return,
        }
        event.prevent_default();
    }
}

impl MethodsPopup for MethodList {
    fn set_methods(&mut self, methods: Vec<String>) {
        self.methods = methods;
        self.selected_index = 0;
    }
}
