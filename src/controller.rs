//! Binds triggers, popups and caret geometry to one text control.
//!
//! The host forwards the control's key-up and key-down events to
//! [`IntellisenseController::handle_key_up`] and
//! [`IntellisenseController::handle_key_down`]. Each call runs to completion:
//! popup filtering, key forwarding, trigger matching, and positioning of any
//! popup that became visible along the way.

use crate::config::IntellisenseOptions;
use crate::control::{ControlRegistry, TextControl, floor_char_boundary};
use crate::error::{GeometryError, IntellisenseError};
use crate::geometry::{CaretCoordinate, MirrorHost, measure_caret_for_engine};
use crate::keys::KeyEvent;
use crate::popup::{Declaration, DeclarationList, DeclarationsPopup, MethodList, MethodsPopup};
use crate::trigger::{Kind, Phase, Trigger, TriggerSet, filter_root};

/// The two popups, handed to trigger callbacks so they can fill and show them.
#[derive(Debug, Default)]
pub struct Popups<D, M> {
    pub decls: D,
    pub meths: M,
}

/// Invoked when a trigger of the matching kind fires.
pub type TriggerCallback<D, M> = Box<dyn FnMut(&Trigger, &mut Popups<D, M>)>;

/// Intellisense attached to one text control.
///
/// Owns the trigger lists, the two popups and the filter window. The host
/// feeds it key events together with a [`MirrorHost`] for caret measurement.
pub struct IntellisenseController<C, D = DeclarationList, M = MethodList> {
    control: C,
    popups: Popups<D, M>,
    triggers: TriggerSet,
    declarations_callback: Option<TriggerCallback<D, M>>,
    methods_callback: Option<TriggerCallback<D, M>>,
    /// Start of the filter window; the window ends at the caret.
    start_column_index: usize,
    options: IntellisenseOptions,
    /// Visibility last seen by the controller, used to spot popups that were
    /// just shown.
    decls_shown: bool,
    meths_shown: bool,
}

impl<C, D, M> IntellisenseController<C, D, M>
where
    C: TextControl,
    D: DeclarationsPopup + Default,
    M: MethodsPopup + Default,
{
    /// Attaches to `control` with default popups.
    pub fn new(control: C) -> Self {
        Self::with_popups(control, D::default(), M::default())
    }

    /// Attaches to the control registered under `id`.
    pub fn from_registry<R>(registry: &mut R, id: &str) -> Result<Self, IntellisenseError>
    where
        R: ControlRegistry<Control = C>,
    {
        let control = registry
            .take_control(id)
            .ok_or_else(|| IntellisenseError::ControlNotFound(id.to_string()))?;
        tracing::debug!(target: "intellisense", id, "attached to text control");
        Ok(Self::new(control))
    }
}

impl<C, D, M> IntellisenseController<C, D, M>
where
    C: TextControl,
    D: DeclarationsPopup,
    M: MethodsPopup,
{
    /// Attaches to `control` with caller-supplied popups.
    pub fn with_popups(control: C, decls: D, meths: M) -> Self {
        let decls_shown = decls.is_visible();
        let meths_shown = meths.is_visible();
        Self {
            control,
            popups: Popups { decls, meths },
            triggers: TriggerSet::new(),
            declarations_callback: None,
            methods_callback: None,
            start_column_index: 0,
            options: IntellisenseOptions::default(),
            decls_shown,
            meths_shown,
        }
    }

    /// Replaces the default options.
    pub fn with_options(mut self, options: IntellisenseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &IntellisenseOptions {
        &self.options
    }

    /// Registers a trigger that opens the declarations popup.
    pub fn add_declaration_trigger(&mut self, trigger: Trigger) {
        self.triggers.add(Kind::Declaration, trigger);
    }

    /// Registers a trigger that opens the methods popup.
    pub fn add_methods_trigger(&mut self, trigger: Trigger) {
        self.triggers.add(Kind::Method, trigger);
    }

    pub fn triggers(&self) -> &TriggerSet {
        &self.triggers
    }

    /// Sets the callback for declaration triggers, replacing any previous one.
    pub fn on_declaration<F>(&mut self, callback: F)
    where
        F: FnMut(&Trigger, &mut Popups<D, M>) + 'static,
    {
        self.declarations_callback = Some(Box::new(callback));
    }

    /// Sets the callback for method triggers, replacing any previous one.
    pub fn on_method<F>(&mut self, callback: F)
    where
        F: FnMut(&Trigger, &mut Popups<D, M>) + 'static,
    {
        self.methods_callback = Some(Box::new(callback));
    }

    pub fn caret_offset(&self) -> usize {
        self.control.caret_offset()
    }

    pub fn start_column_index(&self) -> usize {
        self.start_column_index
    }

    /// Overrides where filtering starts, for callers that find the filter
    /// root themselves.
    pub fn set_start_column_index(&mut self, index: usize) {
        self.start_column_index = index;
    }

    /// Text between the filter start and the caret.
    ///
    /// Both ends are clamped to the value, and reversed when the caret sits
    /// before the filter start.
    pub fn filter_text(&self) -> String {
        let value = self.control.value();
        let a = floor_char_boundary(value, self.start_column_index);
        let b = floor_char_boundary(value, self.caret_offset());
        value[a.min(b)..a.max(b)].to_string()
    }

    pub fn set_declarations(&mut self, declarations: Vec<Declaration>) {
        self.popups.decls.set_declarations(declarations);
    }

    pub fn set_methods(&mut self, methods: Vec<String>) {
        self.popups.meths.set_methods(methods);
    }

    pub fn decls(&self) -> &D {
        &self.popups.decls
    }

    pub fn decls_mut(&mut self) -> &mut D {
        &mut self.popups.decls
    }

    pub fn meths(&self) -> &M {
        &self.popups.meths
    }

    pub fn meths_mut(&mut self) -> &mut M {
        &mut self.popups.meths
    }

    pub fn control(&self) -> &C {
        &self.control
    }

    pub fn control_mut(&mut self) -> &mut C {
        &mut self.control
    }

    /// Caret position relative to the control's top-left corner.
    pub fn caret_coordinates<H: MirrorHost>(
        &self,
        host: &mut H,
    ) -> Result<CaretCoordinate, GeometryError> {
        let engine = self.options.engine_override.unwrap_or_else(|| host.engine());
        measure_caret_for_engine(host, &self.control, self.caret_offset(), engine)
    }

    /// Refreshes the declarations filter, then runs key-up triggers.
    pub fn handle_key_up<H: MirrorHost>(&mut self, event: &mut KeyEvent, host: &mut H) {
        if self.popups.decls.is_visible() {
            let filter = self.filter_text();
            self.popups.decls.set_filter(&filter);
        }
        self.dispatch(Phase::Up, event);
        self.sync_popups(host);
    }

    /// Forwards the key to the declarations popup, runs key-down triggers,
    /// then forwards it to the methods popup.
    pub fn handle_key_down<H: MirrorHost>(&mut self, event: &mut KeyEvent, host: &mut H) {
        if self.popups.decls.is_visible() {
            if event.is_backspace() {
                let filter = self.filter_text();
                self.popups.decls.set_filter(&filter);
            } else {
                self.popups.decls.handle_key_down(event);
                if let Some(item) = self.popups.decls.take_chosen() {
                    self.choose_declaration(&item);
                }
            }
            // A popup hidden here and reopened by a trigger below counts as
            // newly shown.
            self.sync_popups(host);
        }
        if self.dispatch(Phase::Down, event) {
            self.sync_popups(host);
        }
        if self.popups.meths.is_visible() {
            self.popups.meths.handle_key_down(event);
        }
        self.sync_popups(host);
    }

    /// Replaces the filter window with the declaration's text, puts the caret
    /// right after it and hides the declarations popup.
    pub fn choose_declaration(&mut self, item: &Declaration) {
        let insert = item.insert_text();
        let value = self.control.value();
        let left = &value[..floor_char_boundary(value, self.start_column_index)];
        let right = &value[floor_char_boundary(value, self.caret_offset())..];
        let caret = left.len() + insert.len();
        let new_value = format!("{left}{insert}{right}");

        tracing::debug!(
            target: "intellisense",
            name = %item.name,
            start = self.start_column_index,
            caret,
            "declaration chosen"
        );
        self.control.set_value(new_value);
        self.control.set_selection(caret, caret);
        self.popups.decls.set_visible(false);
    }

    /// Positions every popup that became visible since the last call.
    ///
    /// Key handlers call this on their own; hosts that show a popup outside
    /// of key handling call it afterwards.
    pub fn sync_popups<H: MirrorHost>(&mut self, host: &mut H) {
        let decls_visible = self.popups.decls.is_visible();
        if decls_visible && !self.decls_shown {
            if let Some((x, y)) = self.popup_anchor(host) {
                self.popups.decls.set_position(x, y);
            }
        }
        self.decls_shown = decls_visible;

        let meths_visible = self.popups.meths.is_visible();
        if meths_visible && !self.meths_shown {
            if let Some((x, y)) = self.popup_anchor(host) {
                self.popups.meths.set_position(x, y);
            }
        }
        self.meths_shown = meths_visible;
    }

    /// Runs the first matching trigger of `phase`, declarations before
    /// methods. Returns whether one fired.
    fn dispatch(&mut self, phase: Phase, event: &mut KeyEvent) -> bool {
        let Some((kind, trigger)) = self
            .triggers
            .route(phase, event)
            .map(|(kind, trigger)| (kind, trigger.clone()))
        else {
            return false;
        };

        self.start_column_index =
            filter_root(event.key_code, self.control.value(), self.caret_offset());
        tracing::debug!(
            target: "intellisense",
            ?kind,
            ?phase,
            key_code = event.key_code,
            start = self.start_column_index,
            "trigger fired"
        );

        let callback = match kind {
            Kind::Declaration => self.declarations_callback.as_mut(),
            Kind::Method => self.methods_callback.as_mut(),
        };
        match callback {
            Some(callback) => callback(&trigger, &mut self.popups),
            None => tracing::trace!(target: "intellisense", ?kind, "no callback registered"),
        }

        if trigger.prevent_default {
            event.prevent_default();
            event.stop_propagation();
        }
        true
    }

    /// Where a popup goes: just below the caret's line, in the coordinates of
    /// the surface the control sits on.
    fn popup_anchor<H: MirrorHost>(&self, host: &mut H) -> Option<(f32, f32)> {
        match self.caret_coordinates(host) {
            Ok(caret) => Some((
                caret.left + self.control.offset_left(),
                caret.top + self.control.offset_top() + self.options.popup_line_offset,
            )),
            Err(err) => {
                tracing::warn!(target: "intellisense", %err, "could not measure caret");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::TextField;
    use crate::document::HeadlessDocument;
    use crate::keys::code;
    use crate::popup::Popup;
    use crate::style::{ComputedStyle, StyleProperty};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Controller = IntellisenseController<TextField>;

    fn field(value: &str) -> TextField {
        let style = ComputedStyle::new()
            .with(StyleProperty::FontSize, "10px")
            .with(StyleProperty::LineHeight, "12px")
            .with(StyleProperty::Width, "600px");
        TextField::multi_line(style)
            .with_value(value)
            .with_offset(100.0, 50.0)
    }

    #[test]
    fn key_up_trigger_sets_filter_start_and_positions_popup() {
        let mut host = HeadlessDocument::new();
        let mut controller = Controller::new(field("foo."));
        let fired = Rc::new(RefCell::new(Vec::new()));

        controller.add_declaration_trigger(Trigger::new(code::PERIOD));
        let log = Rc::clone(&fired);
        controller.on_declaration(move |trigger, popups| {
            log.borrow_mut().push(trigger.key_code);
            popups.decls.set_visible(true);
        });

        controller.handle_key_up(&mut KeyEvent::new(code::PERIOD), &mut host);

        assert_eq!(*fired.borrow(), vec![code::PERIOD]);
        assert_eq!(controller.start_column_index(), 4);
        assert!(controller.decls().is_visible());
        // Four glyphs of 6px, plus the control offset and the line offset.
        assert_eq!(controller.decls().position(), (124.0, 65.0));
        assert_eq!(host.live_elements(), 0);
    }

    #[test]
    fn last_registered_callback_wins() {
        let mut host = HeadlessDocument::new();
        let mut controller = Controller::new(field("a."));
        let calls = Rc::new(RefCell::new(Vec::new()));

        controller.add_methods_trigger(Trigger::new(code::PERIOD));
        let first = Rc::clone(&calls);
        controller.on_method(move |_, _| first.borrow_mut().push("first"));
        let second = Rc::clone(&calls);
        controller.on_method(move |_, _| second.borrow_mut().push("second"));

        controller.handle_key_up(&mut KeyEvent::new(code::PERIOD), &mut host);
        assert_eq!(*calls.borrow(), vec!["second"]);
    }

    #[test]
    fn prevent_default_only_when_requested() {
        let mut host = HeadlessDocument::new();
        let mut controller = Controller::new(field(""));
        controller.add_declaration_trigger(
            Trigger::new(code::SPACE)
                .with_ctrl()
                .on_key_down()
                .preventing_default(),
        );
        controller.add_methods_trigger(Trigger::new(code::NINE).with_shift().on_key_down());

        let mut event = KeyEvent::new(code::SPACE).with_ctrl();
        controller.handle_key_down(&mut event, &mut host);
        assert!(event.default_prevented());
        assert!(event.propagation_stopped());

        let mut event = KeyEvent::new(code::NINE).with_shift();
        controller.handle_key_down(&mut event, &mut host);
        assert!(!event.default_prevented());
    }

    #[test]
    fn filter_text_swaps_reversed_bounds() {
        let mut controller = Controller::new(field("foo.bar"));
        controller.set_start_column_index(4);
        assert_eq!(controller.filter_text(), "bar");

        controller.control_mut().set_caret(2);
        assert_eq!(controller.filter_text(), "o.");

        controller.set_start_column_index(99);
        controller.control_mut().set_caret(5);
        assert_eq!(controller.filter_text(), "ar");
    }

    #[test]
    fn choosing_splices_the_filter_window() {
        let mut controller = Controller::new(field("foo.ba"));
        controller.set_start_column_index(4);
        controller.decls_mut().set_visible(true);

        controller.choose_declaration(&Declaration::new("bar"));

        assert_eq!(controller.control().value(), "foo.bar");
        assert_eq!(controller.caret_offset(), 7);
        assert_eq!(controller.control().selection_end(), 7);
        assert!(!controller.decls().is_visible());
    }

    #[test]
    fn unknown_id_is_reported() {
        let mut registry: std::collections::HashMap<String, TextField> = Default::default();
        let result = Controller::from_registry(&mut registry, "missing");
        assert!(matches!(result, Err(IntellisenseError::ControlNotFound(id)) if id == "missing"));
    }

    #[test]
    fn geometry_failure_leaves_popup_unpositioned() {
        let mut host = HeadlessDocument::new();
        host.fail_measurement(true);
        let mut controller = Controller::new(field("x."));
        controller.add_declaration_trigger(Trigger::new(code::PERIOD));
        controller.on_declaration(|_, popups| popups.decls.set_visible(true));

        controller.handle_key_up(&mut KeyEvent::new(code::PERIOD), &mut host);

        assert!(controller.decls().is_visible());
        assert_eq!(controller.decls().position(), (0.0, 0.0));
        assert_eq!(host.live_elements(), 0);
    }
}
