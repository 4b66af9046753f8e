//! Shared session state
//!
//! One [`SessionState`] is created per connection session and torn down
//! on disconnect. Local optimistic values (slider angles, typed
//! coordinates) may transiently diverge from the authoritative service
//! state; they reconverge when the corrective command response arrives.
//!
//! Positions carry a command revision counter to guard against the
//! poll-vs-command ordering hazard: a poll snapshots the revision
//! before issuing its request and its result is discarded if a command
//! response landed in between.

use armdash_core::{
    ConnectionState, DetectedBox, Frame, LinkMode, Position, SerialLine, ServoDescriptor,
    SyncEvent,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

/// Serial log lines kept in memory
const MAX_SERIAL_LINES: usize = 1000;

#[derive(Default)]
struct Inner {
    connection: ConnectionState,
    servos: Vec<ServoDescriptor>,
    angles: HashMap<u8, f64>,
    /// Display millimeters
    arm_position: Option<Position>,
    /// Display millimeters
    world_position: Option<Position>,
    boxes: Vec<DetectedBox>,
    selected_box: Option<String>,
    serial_log: Vec<SerialLine>,
    image: Option<Vec<u8>>,
    /// One-way latch, set on first decoded camera frame
    world_ready: bool,
    capture_waiting: bool,
    /// Command-write revisions per position frame
    arm_rev: u64,
    world_rev: u64,
}

/// Point-in-time copy of the session state for display
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub connection: ConnectionState,
    pub servos: Vec<ServoDescriptor>,
    pub angles: HashMap<u8, f64>,
    pub arm_position: Option<Position>,
    pub world_position: Option<Position>,
    pub boxes: Vec<DetectedBox>,
    pub selected_box: Option<String>,
    pub serial_lines: usize,
    pub image_bytes: usize,
    pub world_ready: bool,
}

/// Shared state for one connection session
pub struct SessionState {
    inner: RwLock<Inner>,
    events: broadcast::Sender<SyncEvent>,
}

impl SessionState {
    pub fn new() -> Arc<Self> {
        let (events, _) = broadcast::channel(100);
        Arc::new(Self {
            inner: RwLock::new(Inner::default()),
            events,
        })
    }

    /// Subscribe to state-change events
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    pub(crate) fn emit(&self, event: SyncEvent) {
        let _ = self.events.send(event);
    }

    pub async fn connection(&self) -> ConnectionState {
        self.inner.read().await.connection.clone()
    }

    pub async fn mode(&self) -> LinkMode {
        self.inner.read().await.connection.mode
    }

    pub async fn mark_connected(&self, port: &str, mode: LinkMode) {
        {
            let mut inner = self.inner.write().await;
            inner.connection.connected = true;
            inner.connection.port = Some(port.to_string());
            inner.connection.mode = mode;
        }
        self.emit(SyncEvent::Connected {
            port: port.to_string(),
        });
    }

    pub async fn mark_disconnected(&self) {
        {
            let mut inner = self.inner.write().await;
            inner.connection.connected = false;
            inner.connection.port = None;
        }
        self.emit(SyncEvent::Disconnected);
    }

    /// Apply a status poll; updates the connected flag and port only
    pub async fn apply_status(&self, connected: bool, port: Option<String>) {
        let mut inner = self.inner.write().await;
        inner.connection.connected = connected;
        if connected {
            if let Some(port) = port {
                inner.connection.port = Some(port);
            }
        } else {
            inner.connection.port = None;
        }
    }

    pub async fn set_mode(&self, mode: LinkMode) {
        let changed = {
            let mut inner = self.inner.write().await;
            let changed = inner.connection.mode != mode;
            inner.connection.mode = mode;
            changed
        };
        if changed {
            self.emit(SyncEvent::ModeChanged(mode));
        }
    }

    /// Load the servo descriptor set and seed live angles
    ///
    /// Descriptors are immutable for the rest of the session.
    pub async fn set_servos(&self, servos: Vec<ServoDescriptor>) {
        let count = servos.len();
        {
            let mut inner = self.inner.write().await;
            inner.angles = servos.iter().map(|s| (s.id, s.initial_angle)).collect();
            inner.servos = servos;
        }
        self.emit(SyncEvent::ServosLoaded { count });
    }

    pub async fn servos(&self) -> Vec<ServoDescriptor> {
        self.inner.read().await.servos.clone()
    }

    pub async fn servo(&self, id: u8) -> Option<ServoDescriptor> {
        self.inner.read().await.servos.iter().find(|s| s.id == id).cloned()
    }

    pub async fn angle(&self, id: u8) -> Option<f64> {
        self.inner.read().await.angles.get(&id).copied()
    }

    /// Local optimistic angle mirror; never bumps revisions
    pub async fn set_angle_optimistic(&self, id: u8, angle: f64) {
        self.inner.write().await.angles.insert(id, angle);
    }

    /// Authoritative angles from a command response
    pub async fn apply_command_angles(&self, angles: HashMap<u8, f64>) {
        {
            let mut inner = self.inner.write().await;
            for (&id, &angle) in &angles {
                inner.angles.insert(id, angle);
            }
        }
        for (id, angle) in angles {
            self.emit(SyncEvent::AngleUpdated {
                servo_id: id,
                angle,
            });
        }
    }

    /// Local optimistic position mirror; never bumps revisions
    pub async fn set_position_optimistic(&self, frame: Frame, position: Position) {
        let mut inner = self.inner.write().await;
        match frame {
            Frame::Arm => inner.arm_position = Some(position),
            Frame::World => inner.world_position = Some(position),
        }
    }

    pub async fn position(&self, frame: Frame) -> Option<Position> {
        let inner = self.inner.read().await;
        match frame {
            Frame::Arm => inner.arm_position,
            Frame::World => inner.world_position,
        }
    }

    /// Current command revision for a frame; polls snapshot this before
    /// issuing their request
    pub async fn position_revision(&self, frame: Frame) -> u64 {
        let inner = self.inner.read().await;
        match frame {
            Frame::Arm => inner.arm_rev,
            Frame::World => inner.world_rev,
        }
    }

    /// Apply a poll result; dropped when a command response landed
    /// after the poll was issued. Returns whether the value was applied.
    pub async fn apply_poll_position(
        &self,
        frame: Frame,
        position: Position,
        issued_rev: u64,
    ) -> bool {
        let applied = {
            let mut inner = self.inner.write().await;
            let current_rev = match frame {
                Frame::Arm => inner.arm_rev,
                Frame::World => inner.world_rev,
            };
            if current_rev != issued_rev {
                false
            } else {
                match frame {
                    Frame::Arm => inner.arm_position = Some(position),
                    Frame::World => inner.world_position = Some(position),
                }
                true
            }
        };
        if applied {
            self.emit(SyncEvent::PositionUpdated { frame, position });
        } else {
            debug!(frame = %frame, "Dropped stale poll position");
        }
        applied
    }

    /// Apply an authoritative command response; always wins over polls
    pub async fn apply_command_position(&self, frame: Frame, position: Position) {
        {
            let mut inner = self.inner.write().await;
            match frame {
                Frame::Arm => {
                    inner.arm_position = Some(position);
                    inner.arm_rev += 1;
                }
                Frame::World => {
                    inner.world_position = Some(position);
                    inner.world_rev += 1;
                }
            }
        }
        self.emit(SyncEvent::PositionUpdated { frame, position });
    }

    /// Replace the detected-box list wholesale
    ///
    /// The local selection is cleared if the selected id disappeared.
    pub async fn replace_boxes(&self, boxes: Vec<DetectedBox>) {
        let count = boxes.len();
        let changed = {
            let mut inner = self.inner.write().await;
            if let Some(selected) = &inner.selected_box {
                if !boxes.iter().any(|b| &b.id == selected) {
                    inner.selected_box = None;
                }
            }
            let changed = inner.boxes != boxes;
            inner.boxes = boxes;
            changed
        };
        if changed {
            self.emit(SyncEvent::BoxesUpdated { count });
        }
    }

    pub async fn boxes(&self) -> Vec<DetectedBox> {
        self.inner.read().await.boxes.clone()
    }

    pub async fn select_box(&self, id: Option<String>) {
        self.inner.write().await.selected_box = id;
    }

    pub async fn selected_box(&self) -> Option<String> {
        self.inner.read().await.selected_box.clone()
    }

    /// Store a decoded camera frame; clears the capture-waiting flag and
    /// sets the one-way `world_ready` latch
    pub async fn store_image(&self, bytes: Vec<u8>) {
        let len = bytes.len();
        {
            let mut inner = self.inner.write().await;
            inner.image = Some(bytes);
            inner.capture_waiting = false;
            inner.world_ready = true;
        }
        self.emit(SyncEvent::ImageReceived { bytes: len });
    }

    pub async fn image(&self) -> Option<Vec<u8>> {
        self.inner.read().await.image.clone()
    }

    /// Whether the world-frame UI region has been unlocked (first image)
    pub async fn world_ready(&self) -> bool {
        self.inner.read().await.world_ready
    }

    /// Mark a capture as in flight; returns false if one already is
    pub async fn try_begin_capture(&self) -> bool {
        let mut inner = self.inner.write().await;
        if inner.capture_waiting {
            false
        } else {
            inner.capture_waiting = true;
            true
        }
    }

    /// Clear the capture-waiting flag without a frame (trigger failed)
    pub async fn cancel_capture(&self) {
        self.inner.write().await.capture_waiting = false;
    }

    pub async fn capture_waiting(&self) -> bool {
        self.inner.read().await.capture_waiting
    }

    /// Append consumed serial output, newest last
    pub async fn append_serial(&self, lines: Vec<String>) {
        {
            let mut inner = self.inner.write().await;
            for line in &lines {
                inner.serial_log.push(SerialLine::now(line.clone()));
            }
            if inner.serial_log.len() > MAX_SERIAL_LINES {
                let excess = inner.serial_log.len() - MAX_SERIAL_LINES;
                inner.serial_log.drain(..excess);
            }
        }
        for line in lines {
            self.emit(SyncEvent::SerialLine(line));
        }
    }

    pub async fn serial_log(&self) -> Vec<SerialLine> {
        self.inner.read().await.serial_log.clone()
    }

    pub async fn snapshot(&self) -> Snapshot {
        let inner = self.inner.read().await;
        Snapshot {
            connection: inner.connection.clone(),
            servos: inner.servos.clone(),
            angles: inner.angles.clone(),
            arm_position: inner.arm_position,
            world_position: inner.world_position,
            boxes: inner.boxes.clone(),
            selected_box: inner.selected_box.clone(),
            serial_lines: inner.serial_log.len(),
            image_bytes: inner.image.as_ref().map(|i| i.len()).unwrap_or(0),
            world_ready: inner.world_ready,
        }
    }
}
