//! Detected boxes reported by the camera pipeline

use serde::{Deserialize, Serialize};

/// One box detected in the camera image
///
/// The list is replaced wholesale on every poll; there is no incremental
/// diffing. Which box is "selected" is local UI state only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedBox {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}
