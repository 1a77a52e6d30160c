use serde::{Deserialize, Serialize};

/// Key code carried by a confirm/Enter key press.
pub const ENTER_KEY_CODE: u32 = 13;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    KeyDown,
    KeyUp,
}

/// Synthetic input signal delivered to a target control.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmitSignal {
    pub kind: SignalKind,
    pub key_code: u32,
    pub bubbles: bool,
    pub cancelable: bool,
}

impl SubmitSignal {
    /// The "user pressed Enter" key-down: bubbles and can be canceled.
    pub fn enter() -> Self {
        Self {
            kind: SignalKind::KeyDown,
            key_code: ENTER_KEY_CODE,
            bubbles: true,
            cancelable: true,
        }
    }

    pub fn is_enter_key_down(&self) -> bool {
        self.kind == SignalKind::KeyDown && self.key_code == ENTER_KEY_CODE
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DispatchOutcome {
    Delivered,
    /// A listener prevented the default action of a cancelable signal.
    Canceled,
}
