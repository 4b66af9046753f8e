//! Armdash Sync - Dashboard state synchronizer
//!
//! Reconciles authoritative control-service state with a live local
//! session. A fixed-interval poller fans out independent reads (status,
//! serial tail, position, boxes, camera image, mode) and merges the
//! responses into a shared [`SessionState`]; a [`Dispatcher`] forwards
//! user-initiated commands with per-target debouncing so rapid input
//! does not flood a possibly slow transport.

pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod poller;
pub mod session;
pub mod state;
pub mod wire;

pub use client::ArmClient;
pub use config::{CapturePolicy, DispatchConfig, DispatchPolicy, SyncConfig};
pub use dispatch::{Dispatcher, TargetKey};
pub use error::SyncError;
pub use poller::Poller;
pub use session::Session;
pub use state::{SessionState, Snapshot};
