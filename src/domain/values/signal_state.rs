use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-strike lifecycle within a trading day: `None -> Watch -> Executed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalState {
    #[default]
    None,
    Watch,
    Executed,
}

impl SignalState {
    /// Position along the lifecycle; never decreases within a day.
    pub fn rank(self) -> u8 {
        match self {
            SignalState::None => 0,
            SignalState::Watch => 1,
            SignalState::Executed => 2,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == SignalState::Executed
    }
}

impl fmt::Display for SignalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalState::None => write!(f, "NONE"),
            SignalState::Watch => write!(f, "WATCH"),
            SignalState::Executed => write!(f, "EXECUTED"),
        }
    }
}
