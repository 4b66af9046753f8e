//! Fixed-interval polling loop
//!
//! A single repeating timer fans out independent read requests. Each
//! sub-poll is idempotent and isolated: a failure or empty result in
//! one never blocks or cancels the others, and transport errors on
//! polls are logged and dropped (the next tick retries naturally).

use armdash_core::Frame;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info};

use crate::client::ArmClient;
use crate::config::{CapturePolicy, SyncConfig};
use crate::state::SessionState;

/// Restartable polling task with an explicit start/stop lifecycle
///
/// Starting always clears any existing task first, so a stop/start (or
/// a double start) can never leave two timers running.
pub struct Poller {
    client: ArmClient,
    state: Arc<SessionState>,
    config: SyncConfig,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Poller {
    pub fn new(client: ArmClient, state: Arc<SessionState>, config: SyncConfig) -> Self {
        Self {
            client,
            state,
            config,
            handle: Mutex::new(None),
        }
    }

    /// Start (or restart) the polling loop
    pub async fn start(&self) {
        let mut handle = self.handle.lock().await;
        if let Some(old) = handle.take() {
            old.abort();
            debug!("Replaced existing poll timer");
        }

        let client = self.client.clone();
        let state = self.state.clone();
        let config = self.config.clone();
        let period = self.config.poll_interval();

        *handle = Some(tokio::spawn(async move {
            let mut ticker = interval(period);
            loop {
                ticker.tick().await;
                poll_tick(&client, &state, &config).await;
            }
        }));

        info!(period_ms = self.config.poll_interval_ms, "Polling started");
    }

    /// Stop the polling loop; a no-op when not running
    pub async fn stop(&self) {
        let mut handle = self.handle.lock().await;
        if let Some(task) = handle.take() {
            task.abort();
            info!("Polling stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.handle.lock().await.is_some()
    }
}

/// One poll cycle: fan out all sub-polls concurrently
async fn poll_tick(client: &ArmClient, state: &Arc<SessionState>, config: &SyncConfig) {
    tokio::join!(
        poll_status(client, state),
        poll_mode(client, state),
        poll_serial(client, state),
        poll_position(client, state),
        poll_capture(client, state, config),
    );
}

async fn poll_status(client: &ArmClient, state: &Arc<SessionState>) {
    match client.status().await {
        Ok(status) => state.apply_status(status.connected, status.port).await,
        Err(e) => debug!(error = %e, "Status poll failed"),
    }
}

async fn poll_mode(client: &ArmClient, state: &Arc<SessionState>) {
    match client.mode().await {
        Ok(mode) => state.set_mode(mode).await,
        Err(e) => debug!(error = %e, "Mode poll failed"),
    }
}

async fn poll_serial(client: &ArmClient, state: &Arc<SessionState>) {
    match client.serial_read().await {
        Ok(lines) if !lines.is_empty() => state.append_serial(lines).await,
        Ok(_) => {}
        Err(e) => debug!(error = %e, "Serial poll failed"),
    }
}

async fn poll_position(client: &ArmClient, state: &Arc<SessionState>) {
    // Snapshot the command revision before issuing the request; the
    // response is dropped if a command correction lands in between.
    let issued_rev = state.position_revision(Frame::Arm).await;
    match client.position().await {
        Ok(Some(position)) => {
            state
                .apply_poll_position(Frame::Arm, position, issued_rev)
                .await;
        }
        Ok(None) => {}
        Err(e) => debug!(error = %e, "Position poll failed"),
    }
}

/// Image and box-list reads, gated by the capture policy
async fn poll_capture(client: &ArmClient, state: &Arc<SessionState>, config: &SyncConfig) {
    let active = match config.capture {
        CapturePolicy::Continuous => true,
        CapturePolicy::OnDemand => state.capture_waiting().await,
    };
    if !active {
        return;
    }

    match client.boxes().await {
        Ok(boxes) => state.replace_boxes(boxes).await,
        Err(e) => debug!(error = %e, "Box poll failed"),
    }

    match client.image().await {
        Ok(Some(bytes)) => state.store_image(bytes).await,
        Ok(None) => {}
        Err(e) => debug!(error = %e, "Image poll failed"),
    }
}
