//! Speed conversions and display formatting.
//!
//! Formats match what the app shows on its live stats panel and route
//! cards.

use serde::{Deserialize, Serialize};

const METERS_PER_MILE: f64 = 1609.34;
const MILES_PER_METER: f64 = 0.000621371;
const FEET_PER_METER: f64 = 3.28084;

/// Unit system for distance display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

pub fn mps_to_kmh(speed_mps: f64) -> f64 {
    speed_mps * 3.6
}

pub fn mps_to_mph(speed_mps: f64) -> f64 {
    speed_mps * 2.237
}

/// Pace in minutes per kilometer (0 when not moving).
pub fn pace_min_per_km(speed_mps: f64) -> f64 {
    if speed_mps > 0.0 {
        1000.0 / (speed_mps * 60.0)
    } else {
        0.0
    }
}

/// Pace in minutes per mile (0 when not moving).
pub fn pace_min_per_mile(speed_mps: f64) -> f64 {
    if speed_mps > 0.0 {
        METERS_PER_MILE / (speed_mps * 60.0)
    } else {
        0.0
    }
}

/// "1.50 km" / "850 m", or "2.00 mi" / "328 ft" for imperial.
pub fn format_distance(meters: f64, units: UnitSystem) -> String {
    match units {
        UnitSystem::Imperial => {
            let miles = meters * MILES_PER_METER;
            if miles >= 1.0 {
                format!("{:.2} mi", miles)
            } else {
                format!("{:.0} ft", meters * FEET_PER_METER)
            }
        }
        UnitSystem::Metric => {
            if meters >= 1000.0 {
                format!("{:.2} km", meters / 1000.0)
            } else {
                format!("{:.0} m", meters)
            }
        }
    }
}

/// "HH:MM:SS" when at least an hour, otherwise "MM:SS".
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}
