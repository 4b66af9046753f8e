//! Connection state and serial monitor types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Transport the control service is using to reach the arm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkMode {
    /// Direct serial link to the arm controller
    Serial,
    /// Networked HTTP link
    Http,
}

impl Default for LinkMode {
    fn default() -> Self {
        Self::Serial
    }
}

impl LinkMode {
    /// Parse the wire representation ("serial" / "http")
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "serial" => Some(Self::Serial),
            "http" => Some(Self::Http),
            _ => None,
        }
    }
}

impl std::fmt::Display for LinkMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serial => write!(f, "serial"),
            Self::Http => write!(f, "http"),
        }
    }
}

/// Current connection to the control service
///
/// Mutated only by connect/disconnect responses and status/mode polls.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionState {
    /// Whether the service reports an open link to the arm
    pub connected: bool,
    /// Serial port name while connected
    pub port: Option<String>,
    /// Current transport mode
    pub mode: LinkMode,
}

/// One line read from the arm's serial output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialLine {
    /// When the line was received by the synchronizer
    pub at: DateTime<Utc>,
    pub text: String,
}

impl SerialLine {
    pub fn now(text: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            text: text.into(),
        }
    }
}
