//! Synchronizer configuration

use armdash_core::LinkMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How user-initiated commands are dispatched to the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchPolicy {
    /// Every input sends a request right away
    Immediate,
    /// Per-target timer; only the last value within the window is sent
    Debounced,
}

/// How camera captures are acquired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapturePolicy {
    /// Image and box list refreshed on every poll
    Continuous,
    /// Capture explicitly triggered, then polled until a frame arrives
    OnDemand,
}

/// Dispatch policy per transport mode
///
/// The source dashboards disagreed on which mode debounces, so the
/// mapping is configuration rather than a fixed rule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DispatchConfig {
    #[serde(default = "default_serial_policy")]
    pub serial: DispatchPolicy,
    #[serde(default = "default_http_policy")]
    pub http: DispatchPolicy,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            serial: default_serial_policy(),
            http: default_http_policy(),
        }
    }
}

impl DispatchConfig {
    pub fn policy_for(&self, mode: LinkMode) -> DispatchPolicy {
        match mode {
            LinkMode::Serial => self.serial,
            LinkMode::Http => self.http,
        }
    }
}

fn default_serial_policy() -> DispatchPolicy {
    DispatchPolicy::Debounced
}

fn default_http_policy() -> DispatchPolicy {
    DispatchPolicy::Immediate
}

/// Main synchronizer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Base URL of the control service
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Polling period in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Debounce window in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default = "default_capture")]
    pub capture: CapturePolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            poll_interval_ms: default_poll_interval_ms(),
            debounce_ms: default_debounce_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            dispatch: DispatchConfig::default(),
            capture: default_capture(),
        }
    }
}

impl SyncConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_debounce_ms() -> u64 {
    1000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_capture() -> CapturePolicy {
    CapturePolicy::Continuous
}
