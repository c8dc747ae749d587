//! Keyboard events as the intellisense sees them.

/// Legacy DOM `keyCode` values used by triggers and popups.
pub mod code {
    pub const BACKSPACE: u32 = 8;
    pub const TAB: u32 = 9;
    pub const ENTER: u32 = 13;
    pub const ESCAPE: u32 = 27;
    pub const SPACE: u32 = 32;
    pub const LEFT: u32 = 37;
    pub const UP: u32 = 38;
    pub const RIGHT: u32 = 39;
    pub const DOWN: u32 = 40;
    pub const NINE: u32 = 57;
    pub const PERIOD: u32 = 190;
}

/// A key-up or key-down event delivered by the text control.
///
/// Besides the key code and modifiers, the event carries the two flags a
/// handler may flip: whether the control should skip its default action
/// (inserting the character, moving the caret) and whether the event should
/// stop bubbling to outer handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyEvent {
    pub key_code: u32,
    pub shift_key: bool,
    pub ctrl_key: bool,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl KeyEvent {
    /// A key event without modifiers.
    pub fn new(key_code: u32) -> Self {
        Self {
            key_code,
            ..Default::default()
        }
    }

    /// Marks Shift as held.
    pub fn with_shift(mut self) -> Self {
        self.shift_key = true;
        self
    }

    /// Marks Ctrl as held.
    pub fn with_ctrl(mut self) -> Self {
        self.ctrl_key = true;
        self
    }

    /// Tells the control to skip its own handling of the key.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Keeps the event from reaching outer handlers.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Whether a handler called [`KeyEvent::prevent_default`].
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Whether a handler called [`KeyEvent::stop_propagation`].
    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    /// Whether this is the Backspace key.
    pub fn is_backspace(&self) -> bool {
        self.key_code == code::BACKSPACE
    }
}
