//! Finalized routes produced by a stopped recording session.

use serde::{Deserialize, Serialize};

use crate::geo_utils::{haversine_distance, seconds_between, segment_speed};
use crate::{Bounds, GeoSample};

/// Kind of activity a route was recorded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    #[default]
    Running,
    Cycling,
    Walking,
}

impl ActivityType {
    /// Human-readable label used in route names.
    pub fn label(&self) -> &'static str {
        match self {
            ActivityType::Running => "Running",
            ActivityType::Cycling => "Cycling",
            ActivityType::Walking => "Walking",
        }
    }

    /// Lowercase identifier, as written to the GPX `<type>` element.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Running => "running",
            ActivityType::Cycling => "cycling",
            ActivityType::Walking => "walking",
        }
    }
}

/// Immutable record of a completed recording session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct FinalizedRoute {
    pub name: String,
    pub activity_type: ActivityType,
    /// Accepted samples in chronological order
    pub samples: Vec<GeoSample>,
    /// Total distance in meters
    pub total_distance_m: f64,
    /// Elapsed seconds at the last accepted sample
    pub duration_seconds: f64,
    /// Average speed in m/s
    pub average_speed_mps: f64,
    /// Session start (Unix ms)
    pub start_time: i64,
    /// Moment the session was stopped (Unix ms)
    pub end_time: i64,
    /// Bounding box of the samples, `None` for an empty route
    pub bounds: Option<Bounds>,
}

impl FinalizedRoute {
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Consecutive sample pairs with their distance, duration and speed.
    pub fn segments(&self) -> Vec<RouteSegment> {
        self.samples
            .windows(2)
            .map(|w| RouteSegment::between(w[0], w[1]))
            .collect()
    }
}

/// Interval between two consecutive accepted samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct RouteSegment {
    pub start: GeoSample,
    pub end: GeoSample,
    /// Distance in meters
    pub distance_m: f64,
    /// Duration in seconds
    pub duration_seconds: f64,
    /// Speed in m/s, 0 when the duration is not positive
    pub average_speed_mps: f64,
}

impl RouteSegment {
    pub fn between(start: GeoSample, end: GeoSample) -> Self {
        Self {
            distance_m: haversine_distance(&start, &end),
            duration_seconds: seconds_between(&start, &end),
            average_speed_mps: segment_speed(&start, &end),
            start,
            end,
        }
    }
}
