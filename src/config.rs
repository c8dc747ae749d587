use serde::{Deserialize, Serialize};

use crate::geometry::Engine;

/// Vertical distance between the caret's line top and a popup, in pixels.
pub const DEFAULT_POPUP_LINE_OFFSET: f32 = 15.0;

/// Tunables of an [`IntellisenseController`](crate::IntellisenseController).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IntellisenseOptions {
    /// Added to the caret's top so popups open below the current line.
    pub popup_line_offset: f32,
    /// Forces a quirk branch instead of the one the mirror host reports.
    pub engine_override: Option<Engine>,
}

impl Default for IntellisenseOptions {
    fn default() -> Self {
        Self {
            popup_line_offset: DEFAULT_POPUP_LINE_OFFSET,
            engine_override: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_options_keep_defaults() {
        let options: IntellisenseOptions =
            serde_json::from_str(r#"{"engineOverride":"gecko"}"#).expect("options");
        assert_eq!(options.popup_line_offset, DEFAULT_POPUP_LINE_OFFSET);
        assert_eq!(options.engine_override, Some(Engine::Gecko));
    }
}
