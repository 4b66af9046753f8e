//! Synchronization events for real-time observers

use crate::link::LinkMode;
use crate::position::{Frame, Position};

/// Event emitted by the synchronizer as state changes
///
/// These replace the dashboard's transient notifications: subscribers
/// decide how (and how long) to show them.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// Connection to the arm established
    Connected { port: String },
    /// Connection closed
    Disconnected,
    /// Servo descriptor set loaded
    ServosLoaded { count: usize },
    /// Authoritative position update (display millimeters)
    PositionUpdated { frame: Frame, position: Position },
    /// Authoritative servo angle update
    AngleUpdated { servo_id: u8, angle: f64 },
    /// Detected-box list replaced
    BoxesUpdated { count: usize },
    /// Camera frame received and decoded
    ImageReceived { bytes: usize },
    /// Transport mode changed
    ModeChanged(LinkMode),
    /// One line of serial output
    SerialLine(String),
    /// Transient informational message from the service
    Notice(String),
    /// Transient error to surface to the user
    Error(String),
}
