//! Servo descriptors as reported by the control service

use serde::{Deserialize, Serialize};

/// Static description of one servo, loaded once per connection session
///
/// Wire field names match the service contract (`min_angle` etc.).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServoDescriptor {
    pub id: u8,
    pub name: String,
    pub min_angle: f64,
    pub max_angle: f64,
    pub initial_angle: f64,
}

impl ServoDescriptor {
    /// Clamp an angle into this servo's valid range
    pub fn clamp(&self, angle: f64) -> f64 {
        angle.clamp(self.min_angle, self.max_angle)
    }
}
