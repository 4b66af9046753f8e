//! Armdash Core - Domain types for the dashboard state synchronizer
//!
//! This crate provides the foundational types shared by the synchronizer:
//! - Connection/link state and serial-log entries
//! - Servo descriptors and live angle handling
//! - Positions, coordinate frames and detected boxes
//! - Millimeter ↔ service-native unit conversion
//! - Synchronization event notifications

pub mod boxes;
pub mod event;
pub mod link;
pub mod position;
pub mod servo;
pub mod units;

pub use boxes::DetectedBox;
pub use event::SyncEvent;
pub use link::{ConnectionState, LinkMode, SerialLine};
pub use position::{Axis, Frame, Position};
pub use servo::ServoDescriptor;
