//! Millimeter ↔ service-native unit conversion
//!
//! The control service exchanges all coordinates in its native scale;
//! the dashboard displays millimeters. The two are related by a factor
//! of 1000: divide by 1000 when sending, multiply by 1000 when
//! receiving. Rounding to whole millimeters happens on the receive path
//! only, so integer-mm values survive a round trip exactly.

use crate::position::Position;

/// Millimeters per service-native unit
pub const MM_PER_UNIT: f64 = 1000.0;

/// Display millimeters → service-native scale (outbound)
pub fn mm_to_service(mm: f64) -> f64 {
    mm / MM_PER_UNIT
}

/// Service-native scale → display millimeters, rounded (inbound)
pub fn service_to_mm(value: f64) -> f64 {
    (value * MM_PER_UNIT).round()
}

/// Convert a display position to a service-native coordinate triple
pub fn position_to_service(pos: Position) -> [f64; 3] {
    [
        mm_to_service(pos.x),
        mm_to_service(pos.y),
        mm_to_service(pos.z),
    ]
}

/// Convert a service-native coordinate triple to a display position
pub fn position_from_service(coords: [f64; 3]) -> Position {
    Position::new(
        service_to_mm(coords[0]),
        service_to_mm(coords[1]),
        service_to_mm(coords[2]),
    )
}
