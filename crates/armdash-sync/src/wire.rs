//! Wire types for the control-service JSON contract
//!
//! Field names follow the service exactly (`armPosition`,
//! `otherFrameCoords`, `isWorldFrame`, ...). All coordinates cross this
//! boundary in the service-native scale; conversion to display
//! millimeters happens in the synchronizer, never here.

use armdash_core::{DetectedBox, ServoDescriptor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `GET /api/status`
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    pub connected: bool,
    #[serde(default)]
    pub port: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
}

/// `GET /api/ports`
#[derive(Debug, Clone, Deserialize)]
pub struct PortsResponse {
    pub success: bool,
    #[serde(default)]
    pub ports: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `POST /api/connect` request body
#[derive(Debug, Clone, Serialize)]
pub struct ConnectRequest {
    pub port: String,
}

/// `POST /api/connect`
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    /// Initial arm position in service-native units, if the service
    /// reports one on connect
    #[serde(default, rename = "armPosition")]
    pub arm_position: Option<[f64; 3]>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Generic `{success, message?, error?}` acknowledgement
#[derive(Debug, Clone, Deserialize)]
pub struct AckResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `GET /api/servos`
#[derive(Debug, Clone, Deserialize)]
pub struct ServosResponse {
    pub success: bool,
    #[serde(default)]
    pub servos: Vec<ServoDescriptor>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `POST /api/servo` request body
#[derive(Debug, Clone, Serialize)]
pub struct ServoRequest {
    pub servo_id: u8,
    /// Whole degrees; the service formats angles as integers
    pub angle: i64,
}

/// `POST /api/servo`
#[derive(Debug, Clone, Deserialize)]
pub struct ServoResponse {
    pub success: bool,
    #[serde(default, rename = "worldCoords")]
    pub world_coords: Option<[f64; 3]>,
    #[serde(default, rename = "armCoords")]
    pub arm_coords: Option<[f64; 3]>,
    /// Resulting servo angles keyed by servo id
    #[serde(default)]
    pub angles: Option<HashMap<u8, f64>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `GET /api/serial_read`
#[derive(Debug, Clone, Deserialize)]
pub struct SerialReadResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `POST /api/send_position` request body
#[derive(Debug, Clone, Serialize)]
pub struct SendPositionRequest {
    pub coordinates: [f64; 3],
    #[serde(rename = "isWorldFrame")]
    pub is_world_frame: bool,
}

/// `POST /api/send_position`
#[derive(Debug, Clone, Deserialize)]
pub struct SendPositionResponse {
    pub success: bool,
    /// The service performs the frame conversion and reports the
    /// resulting position in the other frame
    #[serde(default, rename = "otherFrameCoords")]
    pub other_frame_coords: Option<[f64; 3]>,
    #[serde(default)]
    pub angles: Option<HashMap<u8, f64>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `POST /api/world_position` request body
#[derive(Debug, Clone, Serialize)]
pub struct WorldPositionRequest {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub frame: String,
}

/// `GET /api/position`
#[derive(Debug, Clone, Deserialize)]
pub struct PositionResponse {
    pub success: bool,
    #[serde(default)]
    pub position: Option<WirePosition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WirePosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// `GET /api/boxes`
#[derive(Debug, Clone, Deserialize)]
pub struct BoxesResponse {
    pub success: bool,
    #[serde(default)]
    pub boxes: Vec<DetectedBox>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `GET /api/image`
#[derive(Debug, Clone, Deserialize)]
pub struct ImageResponse {
    pub success: bool,
    /// Base64-encoded camera frame, absent while no capture is ready
    #[serde(default)]
    pub image: Option<String>,
}

/// `GET /api/mode`
#[derive(Debug, Clone, Deserialize)]
pub struct ModeResponse {
    pub mode: String,
}

/// `POST /api/grab_box` request body
#[derive(Debug, Clone, Serialize)]
pub struct GrabBoxRequest {
    pub box_id: String,
}
