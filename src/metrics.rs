//! Route metrics accumulation.
//!
//! [`update`] is a pure step function: given the current snapshot, the last
//! accepted sample and a new one, it returns the next snapshot. Elapsed time
//! is always recomputed from the session start rather than summed, so it
//! cannot drift.

use serde::{Deserialize, Serialize};

use crate::geo_utils::{haversine_distance, segment_speed};
use crate::GeoSample;

/// Running aggregate for one recording session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct RouteMetrics {
    /// Total distance in meters (never decreases)
    pub total_distance_m: f64,
    /// Seconds since the session start, as of the latest accepted sample
    /// (never decreases)
    pub elapsed_seconds: f64,
    /// Speed over the most recent segment in m/s
    pub current_speed_mps: f64,
    /// total_distance_m / elapsed_seconds, or 0 when no time has elapsed
    pub average_speed_mps: f64,
}

impl RouteMetrics {
    /// Recompute metrics for a complete sequence, using the first sample's
    /// timestamp as the session start.
    pub fn from_samples(samples: &[GeoSample]) -> Self {
        let start = match samples.first() {
            Some(first) => first.timestamp,
            None => return Self::default(),
        };

        let mut metrics = Self::default();
        let mut previous: Option<&GeoSample> = None;
        for sample in samples {
            metrics = update(&metrics, previous, sample, start);
            previous = Some(sample);
        }
        metrics
    }
}

/// Fold one accepted sample into the metrics.
///
/// * `previous` - last accepted sample, `None` for the first of a session
/// * `session_start` - authoritative start time in milliseconds
pub fn update(
    metrics: &RouteMetrics,
    previous: Option<&GeoSample>,
    new: &GeoSample,
    session_start: i64,
) -> RouteMetrics {
    let (segment_distance, current_speed) = match previous {
        Some(prev) => (haversine_distance(prev, new), segment_speed(prev, new)),
        None => (0.0, 0.0),
    };

    let total_distance_m = metrics.total_distance_m + segment_distance.max(0.0);
    let elapsed_ms = new.timestamp.saturating_sub(session_start);
    let elapsed_seconds = (elapsed_ms as f64 / 1000.0).max(metrics.elapsed_seconds);
    let average_speed_mps = if elapsed_seconds > 0.0 {
        total_distance_m / elapsed_seconds
    } else {
        0.0
    };

    RouteMetrics {
        total_distance_m,
        elapsed_seconds,
        current_speed_mps: current_speed,
        average_speed_mps,
    }
}
