//! HTTP client for the arm control service
//!
//! One method per endpoint of the service contract. Transport failures
//! map to [`SyncError::Transport`]; `success:false` responses on
//! command endpoints map to [`SyncError::Service`] carrying the
//! service-provided error string verbatim.

use armdash_core::{DetectedBox, LinkMode, Position, ServoDescriptor, units};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::time::Duration;

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::wire;

/// Client for the control service's HTTP/JSON API
#[derive(Debug, Clone)]
pub struct ArmClient {
    http: reqwest::Client,
    base_url: String,
}

impl ArmClient {
    pub fn new(config: &SyncConfig) -> Result<Self, SyncError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET /api/status`
    pub async fn status(&self) -> Result<wire::StatusResponse, SyncError> {
        let resp = self.http.get(self.url("/api/status")).send().await?;
        Ok(resp.json().await?)
    }

    /// `GET /api/ports`
    pub async fn ports(&self) -> Result<Vec<String>, SyncError> {
        let resp: wire::PortsResponse =
            self.http.get(self.url("/api/ports")).send().await?.json().await?;
        if resp.success {
            Ok(resp.ports)
        } else {
            Err(SyncError::service(error_text(resp.error)))
        }
    }

    /// `POST /api/connect`
    pub async fn connect(&self, port: &str) -> Result<wire::ConnectResponse, SyncError> {
        let resp: wire::ConnectResponse = self
            .http
            .post(self.url("/api/connect"))
            .json(&wire::ConnectRequest {
                port: port.to_string(),
            })
            .send()
            .await?
            .json()
            .await?;
        if resp.success {
            Ok(resp)
        } else {
            Err(SyncError::service(error_text(resp.error)))
        }
    }

    /// `POST /api/disconnect`, returns the service message
    pub async fn disconnect(&self) -> Result<String, SyncError> {
        let resp: wire::AckResponse = self
            .http
            .post(self.url("/api/disconnect"))
            .send()
            .await?
            .json()
            .await?;
        if resp.success {
            Ok(resp.message.unwrap_or_else(|| "Disconnected".to_string()))
        } else {
            Err(SyncError::service(error_text(resp.error)))
        }
    }

    /// `GET /api/servos`
    pub async fn servos(&self) -> Result<Vec<ServoDescriptor>, SyncError> {
        let resp: wire::ServosResponse =
            self.http.get(self.url("/api/servos")).send().await?.json().await?;
        if resp.success {
            Ok(resp.servos)
        } else {
            Err(SyncError::service(error_text(resp.error)))
        }
    }

    /// `POST /api/servo`, angle in whole degrees
    pub async fn set_servo(&self, servo_id: u8, angle: i64) -> Result<wire::ServoResponse, SyncError> {
        let resp: wire::ServoResponse = self
            .http
            .post(self.url("/api/servo"))
            .json(&wire::ServoRequest { servo_id, angle })
            .send()
            .await?
            .json()
            .await?;
        if resp.success {
            Ok(resp)
        } else {
            Err(SyncError::service(error_text(resp.error)))
        }
    }

    /// `GET /api/serial_read`, the consumed tail since the last read
    pub async fn serial_read(&self) -> Result<Vec<String>, SyncError> {
        let resp: wire::SerialReadResponse = self
            .http
            .get(self.url("/api/serial_read"))
            .send()
            .await?
            .json()
            .await?;
        if resp.success {
            Ok(resp.data)
        } else {
            Err(SyncError::service(error_text(resp.error)))
        }
    }

    /// `POST /api/send_position`; coordinates already in service units
    pub async fn send_position(
        &self,
        coordinates: [f64; 3],
        is_world_frame: bool,
    ) -> Result<wire::SendPositionResponse, SyncError> {
        let resp: wire::SendPositionResponse = self
            .http
            .post(self.url("/api/send_position"))
            .json(&wire::SendPositionRequest {
                coordinates,
                is_world_frame,
            })
            .send()
            .await?
            .json()
            .await?;
        if resp.success {
            Ok(resp)
        } else {
            Err(SyncError::service(error_text(resp.error)))
        }
    }

    /// `POST /api/world_position`; coordinates already in service units
    pub async fn report_world_position(
        &self,
        coordinates: [f64; 3],
        frame: &str,
    ) -> Result<(), SyncError> {
        let resp: wire::AckResponse = self
            .http
            .post(self.url("/api/world_position"))
            .json(&wire::WorldPositionRequest {
                x: coordinates[0],
                y: coordinates[1],
                z: coordinates[2],
                frame: frame.to_string(),
            })
            .send()
            .await?
            .json()
            .await?;
        if resp.success {
            Ok(())
        } else {
            Err(SyncError::service(error_text(resp.error)))
        }
    }

    /// `GET /api/position`, converted to display millimeters
    pub async fn position(&self) -> Result<Option<Position>, SyncError> {
        let resp: wire::PositionResponse =
            self.http.get(self.url("/api/position")).send().await?.json().await?;
        if !resp.success {
            return Ok(None);
        }
        Ok(resp
            .position
            .map(|p| units::position_from_service([p.x, p.y, p.z])))
    }

    /// `GET /api/boxes`
    ///
    /// A `success:false` response is an error, not an empty list, so a
    /// failed poll never wipes the authoritative box list.
    pub async fn boxes(&self) -> Result<Vec<DetectedBox>, SyncError> {
        let resp: wire::BoxesResponse =
            self.http.get(self.url("/api/boxes")).send().await?.json().await?;
        if resp.success {
            Ok(resp.boxes)
        } else {
            Err(SyncError::service(error_text(resp.error)))
        }
    }

    /// `GET /api/image`, decoded from base64; `None` while no frame is ready
    pub async fn image(&self) -> Result<Option<Vec<u8>>, SyncError> {
        let resp: wire::ImageResponse =
            self.http.get(self.url("/api/image")).send().await?.json().await?;
        if !resp.success {
            return Ok(None);
        }
        let Some(encoded) = resp.image else {
            return Ok(None);
        };
        match BASE64.decode(encoded.as_bytes()) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) => Err(SyncError::service(format!("invalid image payload: {}", e))),
        }
    }

    /// `GET /api/cam` - fire-and-forget capture trigger
    pub async fn trigger_capture(&self) -> Result<(), SyncError> {
        self.http.get(self.url("/api/cam")).send().await?;
        Ok(())
    }

    /// `GET /api/mode`
    pub async fn mode(&self) -> Result<LinkMode, SyncError> {
        let resp: wire::ModeResponse =
            self.http.get(self.url("/api/mode")).send().await?.json().await?;
        LinkMode::from_wire(&resp.mode)
            .ok_or_else(|| SyncError::service(format!("unknown mode: {}", resp.mode)))
    }

    /// `POST /api/grab_box`
    pub async fn grab_box(&self, box_id: &str) -> Result<(), SyncError> {
        let resp: wire::AckResponse = self
            .http
            .post(self.url("/api/grab_box"))
            .json(&wire::GrabBoxRequest {
                box_id: box_id.to_string(),
            })
            .send()
            .await?
            .json()
            .await?;
        if resp.success {
            Ok(())
        } else {
            Err(SyncError::service(error_text(resp.error)))
        }
    }
}

fn error_text(error: Option<String>) -> String {
    error.unwrap_or_else(|| "unknown service error".to_string())
}
