//! Connection session lifecycle
//!
//! A [`Session`] is created by a successful connect and torn down by
//! disconnect. Connecting loads the servo descriptor set once and
//! starts the polling loop; disconnecting stops polling and cancels any
//! pending debounced sends. A failed connect leaves no session behind,
//! and a failed disconnect leaves the session running.

use armdash_core::{Frame, LinkMode, Position, SyncEvent, units};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::client::ArmClient;
use crate::config::{CapturePolicy, SyncConfig};
use crate::dispatch::Dispatcher;
use crate::error::SyncError;
use crate::poller::Poller;
use crate::state::SessionState;

/// One live connection to the control service
pub struct Session {
    client: ArmClient,
    config: SyncConfig,
    state: Arc<SessionState>,
    poller: Poller,
    dispatcher: Dispatcher,
}

impl Session {
    /// Connect to the arm on the given port and start synchronizing
    ///
    /// An empty port name is rejected locally and never reaches the
    /// network. A `success:false` connect response surfaces the
    /// service-provided error string verbatim.
    pub async fn connect(config: SyncConfig, port: &str) -> Result<Self, SyncError> {
        if port.trim().is_empty() {
            return Err(SyncError::validation("no port selected"));
        }

        let client = ArmClient::new(&config)?;
        let resp = client.connect(port).await?;

        let mode = match client.mode().await {
            Ok(mode) => mode,
            Err(e) => {
                debug!(error = %e, "Mode query failed after connect, assuming serial");
                LinkMode::default()
            }
        };

        let state = SessionState::new();
        state.mark_connected(port, mode).await;
        if let Some(message) = resp.message {
            state.emit(SyncEvent::Notice(message));
        }

        // The descriptor set is loaded once per session
        match client.servos().await {
            Ok(servos) => state.set_servos(servos).await,
            Err(e) => warn!(error = %e, "Failed to load servo descriptors"),
        }

        if let Some(coords) = resp.arm_position {
            state
                .apply_command_position(Frame::Arm, units::position_from_service(coords))
                .await;
        }

        let poller = Poller::new(client.clone(), state.clone(), config.clone());
        poller.start().await;

        let dispatcher = Dispatcher::new(client.clone(), state.clone(), config.clone());

        info!(port = %port, mode = %mode, "Session connected");

        Ok(Self {
            client,
            config,
            state,
            poller,
            dispatcher,
        })
    }

    /// Disconnect and tear the session down
    ///
    /// A service-reported failure leaves the session running and state
    /// unchanged.
    pub async fn disconnect(&self) -> Result<String, SyncError> {
        let message = match self.client.disconnect().await {
            Ok(message) => message,
            Err(e) => {
                self.state.emit(SyncEvent::Error(e.to_string()));
                return Err(e);
            }
        };

        self.poller.stop().await;
        self.dispatcher.cancel_pending().await;
        self.state.mark_disconnected().await;
        self.state.emit(SyncEvent::Notice(message.clone()));

        info!("Session disconnected");
        Ok(message)
    }

    /// Trigger an on-demand capture; returns whether a new capture was
    /// started (re-entry while one is in flight is a no-op)
    pub async fn request_capture(&self) -> Result<bool, SyncError> {
        if self.config.capture == CapturePolicy::Continuous {
            // Always-on acquisition, nothing to trigger
            return Ok(false);
        }
        if !self.state.try_begin_capture().await {
            return Ok(false);
        }
        if let Err(e) = self.client.trigger_capture().await {
            self.state.cancel_capture().await;
            self.state.emit(SyncEvent::Error(e.to_string()));
            return Err(e);
        }
        Ok(true)
    }

    /// Request a grab of a detected box
    ///
    /// The box list is never mutated here; a service failure (unknown
    /// id) surfaces the error and leaves state untouched.
    pub async fn grab_box(&self, box_id: &str) -> Result<(), SyncError> {
        match self.client.grab_box(box_id).await {
            Ok(()) => {
                self.state
                    .emit(SyncEvent::Notice(format!("Grabbed box {}", box_id)));
                Ok(())
            }
            Err(e) => {
                self.state.emit(SyncEvent::Error(e.to_string()));
                Err(e)
            }
        }
    }

    /// Report a position to the service's world-position endpoint
    pub async fn report_world_position(
        &self,
        position: Position,
        frame: Frame,
    ) -> Result<(), SyncError> {
        let coords = units::position_to_service(position);
        match self
            .client
            .report_world_position(coords, &frame.to_string())
            .await
        {
            Ok(()) => Ok(()),
            Err(e) => {
                self.state.emit(SyncEvent::Error(e.to_string()));
                Err(e)
            }
        }
    }

    /// Mark a box as selected in the local UI state
    pub async fn select_box(&self, box_id: Option<String>) {
        self.state.select_box(box_id).await;
    }

    pub fn state(&self) -> &Arc<SessionState> {
        &self.state
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn poller(&self) -> &Poller {
        &self.poller
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<SyncEvent> {
        self.state.subscribe()
    }
}
