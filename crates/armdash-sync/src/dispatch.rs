//! Command dispatch with per-target debouncing
//!
//! User input is forwarded either immediately or through a per-target
//! debounce window, selected by the current transport mode. A debounced
//! target holds at most one pending send; superseding input aborts the
//! pending timer and restarts the window with the merged value, so only
//! the last value within the window reaches the wire.
//!
//! Position targets are keyed per coordinate frame, not per axis:
//! setting x then y inside one window collapses into a single send
//! carrying the latest x, y, z.

use armdash_core::{Axis, Frame, Position, SyncEvent, units};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::client::ArmClient;
use crate::config::{DispatchPolicy, SyncConfig};
use crate::error::SyncError;
use crate::state::SessionState;

/// Logical target of a debounced command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKey {
    /// One servo, keyed by id
    Servo(u8),
    /// One coordinate frame; all three axes share the entry
    Frame(Frame),
}

#[derive(Debug, Clone, Copy)]
enum PendingValue {
    Angle(f64),
    Coords(Position),
}

/// One scheduled send; replacement aborts the timer without sending
struct Pending {
    value: PendingValue,
    handle: JoinHandle<()>,
}

/// Forwards commands to the control service
#[derive(Clone)]
pub struct Dispatcher {
    client: ArmClient,
    state: Arc<SessionState>,
    config: SyncConfig,
    pending: Arc<Mutex<HashMap<TargetKey, Pending>>>,
}

impl Dispatcher {
    pub fn new(client: ArmClient, state: Arc<SessionState>, config: SyncConfig) -> Self {
        Self {
            client,
            state,
            config,
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Submit a servo angle change (degrees)
    ///
    /// The angle is clamped to the servo's descriptor range and mirrored
    /// locally right away; the send follows the dispatch policy.
    pub async fn submit_servo(&self, servo_id: u8, angle: f64) -> Result<(), SyncError> {
        let descriptor = self
            .state
            .servo(servo_id)
            .await
            .ok_or_else(|| SyncError::validation(format!("unknown servo id {}", servo_id)))?;
        let angle = descriptor.clamp(angle);

        self.state.set_angle_optimistic(servo_id, angle).await;

        match self.policy().await {
            DispatchPolicy::Immediate => {
                let dispatcher = self.clone();
                tokio::spawn(async move {
                    dispatcher.send_servo(servo_id, angle).await;
                });
            }
            DispatchPolicy::Debounced => {
                self.schedule(TargetKey::Servo(servo_id), PendingValue::Angle(angle))
                    .await;
            }
        }
        Ok(())
    }

    /// Submit one axis of a position target (display millimeters)
    ///
    /// World-frame targets are rejected until the first camera frame has
    /// unlocked the world region.
    pub async fn submit_axis(
        &self,
        frame: Frame,
        axis: Axis,
        value_mm: f64,
    ) -> Result<(), SyncError> {
        if frame == Frame::World && !self.state.world_ready().await {
            return Err(SyncError::validation(
                "world frame is locked until the first camera frame arrives",
            ));
        }

        let key = TargetKey::Frame(frame);
        let policy = self.policy().await;

        let mut pending = self.pending.lock().await;
        // Merge onto the pending coordinates if a send is already
        // scheduled for this frame, otherwise onto the known position.
        let base = match pending.get(&key) {
            Some(Pending {
                value: PendingValue::Coords(p),
                ..
            }) => *p,
            _ => self.state.position(frame).await.unwrap_or_default(),
        };
        let merged = base.with_axis(axis, value_mm);

        // Mirror the typed coordinates locally (like servo angles above)
        // so back-to-back submissions build on each other instead of on
        // the last server-confirmed position.
        self.state.set_position_optimistic(frame, merged).await;

        match policy {
            DispatchPolicy::Immediate => {
                drop(pending);
                let dispatcher = self.clone();
                tokio::spawn(async move {
                    dispatcher.send_position(frame, merged).await;
                });
            }
            DispatchPolicy::Debounced => {
                self.replace_entry(&mut pending, key, PendingValue::Coords(merged));
            }
        }
        Ok(())
    }

    /// Abort every pending timer without sending
    pub async fn cancel_pending(&self) {
        let mut pending = self.pending.lock().await;
        for (_, entry) in pending.drain() {
            entry.handle.abort();
        }
    }

    async fn policy(&self) -> DispatchPolicy {
        self.config.dispatch.policy_for(self.state.mode().await)
    }

    async fn schedule(&self, key: TargetKey, value: PendingValue) {
        let mut pending = self.pending.lock().await;
        self.replace_entry(&mut pending, key, value);
    }

    /// Replace a pending entry, aborting its predecessor's timer
    fn replace_entry(
        &self,
        pending: &mut HashMap<TargetKey, Pending>,
        key: TargetKey,
        value: PendingValue,
    ) {
        if let Some(old) = pending.remove(&key) {
            old.handle.abort();
            debug!(?key, "Superseded pending command");
        }

        let dispatcher = self.clone();
        let window = self.config.debounce_window();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            dispatcher.fire(key).await;
        });

        pending.insert(key, Pending { value, handle });
    }

    /// Debounce window expired: send whatever is still pending
    async fn fire(&self, key: TargetKey) {
        let value = self.pending.lock().await.remove(&key).map(|p| p.value);
        match (key, value) {
            (TargetKey::Servo(id), Some(PendingValue::Angle(angle))) => {
                self.send_servo(id, angle).await;
            }
            (TargetKey::Frame(frame), Some(PendingValue::Coords(position))) => {
                self.send_position(frame, position).await;
            }
            _ => {}
        }
    }

    /// Send a servo command and apply the authoritative response
    ///
    /// Corrections bypass the debounce on the receive side.
    async fn send_servo(&self, servo_id: u8, angle: f64) {
        let wire_angle = angle.round() as i64;
        match self.client.set_servo(servo_id, wire_angle).await {
            Ok(resp) => {
                match resp.angles {
                    Some(angles) => self.state.apply_command_angles(angles).await,
                    None => {
                        self.state
                            .apply_command_angles(HashMap::from([(servo_id, wire_angle as f64)]))
                            .await
                    }
                }
                if let Some(coords) = resp.arm_coords {
                    self.state
                        .apply_command_position(Frame::Arm, units::position_from_service(coords))
                        .await;
                }
                if let Some(coords) = resp.world_coords {
                    self.state
                        .apply_command_position(Frame::World, units::position_from_service(coords))
                        .await;
                }
            }
            Err(e) => {
                warn!(servo = servo_id, error = %e, "Servo command failed");
                self.state.emit(SyncEvent::Error(e.to_string()));
            }
        }
    }

    /// Send a position target; the service answers with the converted
    /// position in the other frame
    async fn send_position(&self, frame: Frame, position: Position) {
        let coords = units::position_to_service(position);
        match self
            .client
            .send_position(coords, frame == Frame::World)
            .await
        {
            Ok(resp) => {
                self.state.apply_command_position(frame, position).await;
                if let Some(other) = resp.other_frame_coords {
                    self.state
                        .apply_command_position(frame.other(), units::position_from_service(other))
                        .await;
                }
                if let Some(angles) = resp.angles {
                    self.state.apply_command_angles(angles).await;
                }
            }
            Err(e) => {
                warn!(frame = %frame, error = %e, "Position command failed");
                self.state.emit(SyncEvent::Error(e.to_string()));
            }
        }
    }
}
