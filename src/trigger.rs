//! Key triggers and the rules for matching them against key events.
//!
//! Triggers live in four ordered lists, one per combination of key phase
//! (up/down) and popup kind (declarations/methods). Matching scans a list in
//! insertion order and the first structural match wins, so a later trigger
//! with the same key combination is never reached.

use serde::{Deserialize, Serialize};

use crate::control::floor_char_boundary;
use crate::keys::{KeyEvent, code};

/// Which key event a trigger listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Up,
    Down,
    /// Any `type` string other than `up`/`down`. Such triggers are accepted
    /// by the deserializer and then ignored on registration.
    #[serde(other)]
    Unrecognized,
}

/// Which popup a trigger opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Declaration,
    Method,
}

/// A key combination that opens or refilters a popup.
///
/// Serialized with the field names of the classic JavaScript object form,
/// so `{"keyCode": 190}` is a key-up trigger on `.` with no modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trigger {
    #[serde(default)]
    pub key_code: u32,
    #[serde(default)]
    pub shift_key: bool,
    #[serde(default)]
    pub ctrl_key: bool,
    #[serde(default)]
    pub prevent_default: bool,
    #[serde(default, rename = "type")]
    pub phase: Phase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Trigger {
    /// A key-up trigger on `key_code` with no modifiers.
    pub fn new(key_code: u32) -> Self {
        Self {
            key_code,
            ..Default::default()
        }
    }

    pub fn on_key_down(mut self) -> Self {
        self.phase = Phase::Down;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift_key = true;
        self
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl_key = true;
        self
    }

    pub fn preventing_default(mut self) -> Self {
        self.prevent_default = true;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Key code and both modifier flags must agree. An unset modifier on the
    /// trigger therefore requires the modifier to be released.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        event.key_code == self.key_code
            && event.shift_key == self.shift_key
            && event.ctrl_key == self.ctrl_key
    }
}

/// Returns the first trigger in `triggers` that matches `event`.
pub fn match_trigger<'a>(triggers: &'a [Trigger], event: &KeyEvent) -> Option<&'a Trigger> {
    triggers.iter().find(|trigger| trigger.matches(event))
}

/// Where the filter window starts after a trigger on `key_code` fired with the
/// caret at `caret`.
///
/// Any key other than backspace roots the window at the caret. Backspace
/// re-derives the root from the nearest `.` before the caret so that deleting
/// through a member name keeps filtering from the member start.
pub fn filter_root(key_code: u32, value: &str, caret: usize) -> usize {
    if key_code != code::BACKSPACE {
        return caret;
    }
    let caret = floor_char_boundary(value, caret);
    value[..caret].rfind('.').map_or(0, |dot| dot + 1)
}

/// The four ordered trigger lists.
#[derive(Debug, Clone, Default)]
pub struct TriggerSet {
    up_decls: Vec<Trigger>,
    down_decls: Vec<Trigger>,
    up_meths: Vec<Trigger>,
    down_meths: Vec<Trigger>,
}

impl TriggerSet {
    /// Creates a set with all four lists empty.
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, phase: Phase, kind: Kind) -> Option<&mut Vec<Trigger>> {
        match (phase, kind) {
            (Phase::Up, Kind::Declaration) => Some(&mut self.up_decls),
            (Phase::Down, Kind::Declaration) => Some(&mut self.down_decls),
            (Phase::Up, Kind::Method) => Some(&mut self.up_meths),
            (Phase::Down, Kind::Method) => Some(&mut self.down_meths),
            (Phase::Unrecognized, _) => None,
        }
    }

    /// Appends `trigger` to the list selected by its phase and `kind`.
    /// Triggers with an unrecognized phase are dropped.
    pub fn add(&mut self, kind: Kind, trigger: Trigger) {
        let phase = trigger.phase;
        match self.slot_mut(phase, kind) {
            Some(list) => list.push(trigger),
            None => tracing::debug!(
                target: "intellisense",
                ?kind,
                key_code = trigger.key_code,
                "ignoring trigger with unrecognized phase"
            ),
        }
    }

    /// Triggers registered for `phase` and `kind`, in insertion order.
    pub fn list(&self, phase: Phase, kind: Kind) -> &[Trigger] {
        match (phase, kind) {
            (Phase::Up, Kind::Declaration) => &self.up_decls,
            (Phase::Down, Kind::Declaration) => &self.down_decls,
            (Phase::Up, Kind::Method) => &self.up_meths,
            (Phase::Down, Kind::Method) => &self.down_meths,
            (Phase::Unrecognized, _) => &[],
        }
    }

    /// First trigger of one list that matches `event`.
    pub fn find(&self, phase: Phase, kind: Kind, event: &KeyEvent) -> Option<&Trigger> {
        match_trigger(self.list(phase, kind), event)
    }

    /// Declaration triggers are tried before method triggers; the methods
    /// list is only consulted when no declaration trigger matches.
    pub fn route(&self, phase: Phase, event: &KeyEvent) -> Option<(Kind, &Trigger)> {
        [Kind::Declaration, Kind::Method]
            .into_iter()
            .find_map(|kind| self.find(phase, kind, event).map(|trigger| (kind, trigger)))
    }

    /// Returns `true` when no trigger has been registered.
    pub fn is_empty(&self) -> bool {
        self.up_decls.is_empty()
            && self.down_decls.is_empty()
            && self.up_meths.is_empty()
            && self.down_meths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn first_structural_match_wins() {
        let triggers = vec![
            Trigger::new(code::PERIOD).named("first"),
            Trigger::new(code::PERIOD).named("second"),
        ];
        let event = KeyEvent::new(code::PERIOD);
        let matched = match_trigger(&triggers, &event).expect("trigger");
        assert_eq!(matched.name.as_deref(), Some("first"));
    }

    #[test]
    fn modifiers_must_agree() {
        let triggers = vec![Trigger::new(code::SPACE).with_ctrl()];
        assert!(match_trigger(&triggers, &KeyEvent::new(code::SPACE)).is_none());
        assert!(match_trigger(&triggers, &KeyEvent::new(code::SPACE).with_ctrl()).is_some());
        assert!(
            match_trigger(&triggers, &KeyEvent::new(code::SPACE).with_ctrl().with_shift())
                .is_none()
        );
    }

    #[test]
    fn unpressed_modifier_is_required_by_default() {
        let triggers = vec![Trigger::new(code::PERIOD)];
        assert!(match_trigger(&triggers, &KeyEvent::new(code::PERIOD).with_shift()).is_none());
    }

    #[test]
    fn filter_root_for_regular_keys_is_the_caret() {
        assert_eq!(filter_root(code::PERIOD, "foo.", 4), 4);
        assert_eq!(filter_root(code::SPACE, "", 0), 0);
    }

    #[test]
    fn filter_root_for_backspace_follows_last_dot_before_caret() {
        assert_eq!(filter_root(code::BACKSPACE, "foo.ba", 6), 4);
        assert_eq!(filter_root(code::BACKSPACE, "a.b.cd", 6), 4);
        assert_eq!(filter_root(code::BACKSPACE, "a.bc.d", 3), 2);
        assert_eq!(filter_root(code::BACKSPACE, "foobar", 6), 0);
        assert_eq!(filter_root(code::BACKSPACE, "foo.bar", 2), 0);
    }

    #[test]
    fn unrecognized_phase_is_ignored() {
        let mut set = TriggerSet::new();
        let trigger = Trigger {
            phase: Phase::Unrecognized,
            ..Trigger::new(code::PERIOD)
        };
        set.add(Kind::Declaration, trigger);
        assert!(set.is_empty());
    }

    #[test]
    fn add_selects_list_by_phase_and_kind() {
        let mut set = TriggerSet::new();
        set.add(Kind::Declaration, Trigger::new(code::PERIOD));
        set.add(Kind::Method, Trigger::new(code::NINE).with_shift().on_key_down());

        assert_eq!(set.list(Phase::Up, Kind::Declaration).len(), 1);
        assert_eq!(set.list(Phase::Down, Kind::Method).len(), 1);
        assert!(set.list(Phase::Down, Kind::Declaration).is_empty());
        assert!(set.list(Phase::Up, Kind::Method).is_empty());
    }

    #[test]
    fn declarations_take_precedence_in_routing() {
        let mut set = TriggerSet::new();
        set.add(Kind::Method, Trigger::new(code::PERIOD).named("method"));
        set.add(Kind::Declaration, Trigger::new(code::PERIOD).named("decl"));

        let event = KeyEvent::new(code::PERIOD);
        let (kind, trigger) = set.route(Phase::Up, &event).expect("route");
        assert_eq!(kind, Kind::Declaration);
        assert_eq!(trigger.name.as_deref(), Some("decl"));
        assert!(set.route(Phase::Down, &event).is_none());
    }

    #[test]
    fn deserializes_object_form_with_defaults() {
        let trigger: Trigger = serde_json::from_str(r#"{"keyCode":190}"#).expect("trigger");
        assert_eq!(trigger, Trigger::new(code::PERIOD));

        let trigger: Trigger = serde_json::from_str(
            r#"{"keyCode":32,"ctrlKey":true,"preventDefault":true,"type":"down"}"#,
        )
        .expect("trigger");
        assert_eq!(
            trigger,
            Trigger::new(code::SPACE)
                .with_ctrl()
                .preventing_default()
                .on_key_down()
        );

        let trigger: Trigger =
            serde_json::from_str(r#"{"keyCode":32,"type":"press"}"#).expect("trigger");
        assert_eq!(trigger.phase, Phase::Unrecognized);
    }
}
