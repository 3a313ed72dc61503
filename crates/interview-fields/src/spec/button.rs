use serde::{Deserialize, Serialize};

/// A submit button of a question step.
///
/// `default` marks the button triggered by native submission (pressing enter);
/// the others have to trigger submission explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub default: bool,
}

impl Button {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }
}

/// Index of the button marked default, or the first button when none is.
pub fn default_button(buttons: &[Button]) -> Option<usize> {
    buttons
        .iter()
        .position(|button| button.default)
        .or_else(|| (!buttons.is_empty()).then_some(0))
}
