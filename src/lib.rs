//! Intellisense for plain text boxes.
//!
//! Watches the keystrokes of a single-line or multi-line text control, decides
//! when a declarations or methods popup should open, and places that popup at
//! the pixel position of the caret. The caret position is derived by laying out
//! a mirror of the control off-screen, since text controls do not expose their
//! caret geometry.
//!
//! The crate talks to its surroundings through a handful of traits:
//!
//! - [`TextControl`] for the text box itself
//! - [`MirrorHost`] for the off-screen layout surface
//! - [`DeclarationsPopup`] / [`MethodsPopup`] for the suggestion lists
//!
//! [`IntellisenseController`] ties them together.

pub mod config;
pub mod control;
pub mod controller;
pub mod document;
pub mod error;
pub mod geometry;
pub mod keys;
pub mod popup;
pub mod style;
pub mod trigger;

pub use config::IntellisenseOptions;
pub use control::{ControlKind, ControlRegistry, TextControl, TextField};
pub use controller::{IntellisenseController, Popups, TriggerCallback};
pub use error::{GeometryError, IntellisenseError};
pub use geometry::{CaretCoordinate, Engine, MirrorGuard, MirrorHost, measure_caret};
pub use document::{HeadlessDocument, MirrorDocument, MonospaceLayout, TextLayout};
pub use keys::KeyEvent;
pub use popup::{Declaration, DeclarationList, DeclarationsPopup, MethodList, MethodsPopup, Popup};
pub use style::{ComputedStyle, MIRRORED_PROPERTIES, StyleProperty};
pub use trigger::{Kind, Phase, Trigger, TriggerSet, filter_root, match_trigger};
