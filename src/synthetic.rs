//! Deterministic synthetic tracks for tests and demos.
//!
//! Walks from a start point along a bearing that wanders randomly around
//! the base heading, emitting one sample per step with positional jitter
//! and a random accuracy. The same seed always yields the same track.
//!
//! ```rust
//! use track_recorder::synthetic::SyntheticTrack;
//!
//! let track = SyntheticTrack::new(1.3521, 103.8198)
//!     .bearing(45.0)
//!     .distance(500.0)
//!     .seed(7)
//!     .generate();
//! assert_eq!(track.len(), 50);
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geo_utils::destination_point;
use crate::GeoSample;

/// Builder for a synthetic track.
#[derive(Debug, Clone)]
pub struct SyntheticTrack {
    start_lat: f64,
    start_lng: f64,
    start_time: i64,
    bearing_deg: f64,
    distance_m: f64,
    step_m: f64,
    interval_ms: i64,
    bearing_wander_deg: f64,
    jitter_deg: f64,
    accuracy_range: (f64, f64),
    altitude_range: Option<(f64, f64)>,
    seed: u64,
}

impl SyntheticTrack {
    /// Defaults: 1 km at bearing 0, 10 m steps one second apart, ±15°
    /// wander, 0.0001° jitter, 5–15 m accuracy, 50–70 m altitude.
    pub fn new(start_lat: f64, start_lng: f64) -> Self {
        Self {
            start_lat,
            start_lng,
            start_time: 0,
            bearing_deg: 0.0,
            distance_m: 1000.0,
            step_m: 10.0,
            interval_ms: 1000,
            bearing_wander_deg: 15.0,
            jitter_deg: 0.0001,
            accuracy_range: (5.0, 15.0),
            altitude_range: Some((50.0, 70.0)),
            seed: 0,
        }
    }

    pub fn start_time(mut self, timestamp_ms: i64) -> Self {
        self.start_time = timestamp_ms;
        self
    }

    pub fn bearing(mut self, degrees: f64) -> Self {
        self.bearing_deg = degrees;
        self
    }

    pub fn distance(mut self, meters: f64) -> Self {
        self.distance_m = meters;
        self
    }

    pub fn step(mut self, meters: f64, interval_ms: i64) -> Self {
        self.step_m = meters;
        self.interval_ms = interval_ms;
        self
    }

    /// Maximum deviation from the base bearing per step, in degrees.
    pub fn wander(mut self, degrees: f64) -> Self {
        self.bearing_wander_deg = degrees;
        self
    }

    /// Maximum positional noise in degrees. 0 produces a clean track.
    pub fn jitter(mut self, degrees: f64) -> Self {
        self.jitter_deg = degrees;
        self
    }

    pub fn accuracy(mut self, min_m: f64, max_m: f64) -> Self {
        self.accuracy_range = (min_m, max_m);
        self
    }

    pub fn altitude(mut self, range: Option<(f64, f64)>) -> Self {
        self.altitude_range = range;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Generate `distance / step` samples.
    pub fn generate(&self) -> Vec<GeoSample> {
        if self.step_m <= 0.0 || self.distance_m <= 0.0 {
            return Vec::new();
        }
        let count = (self.distance_m / self.step_m).floor() as usize;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut lat = self.start_lat;
        let mut lng = self.start_lng;
        let mut samples = Vec::with_capacity(count);

        for i in 0..count {
            let bearing = self.bearing_deg + spread(&mut rng, self.bearing_wander_deg);
            (lat, lng) = destination_point(lat, lng, bearing, self.step_m);

            let accuracy = if self.accuracy_range.1 > self.accuracy_range.0 {
                rng.gen_range(self.accuracy_range.0..self.accuracy_range.1)
            } else {
                self.accuracy_range.0
            };

            let mut sample = GeoSample::new(
                lat + spread(&mut rng, self.jitter_deg),
                lng + spread(&mut rng, self.jitter_deg),
                self.start_time + i as i64 * self.interval_ms,
                accuracy,
            );
            if let Some((lo, hi)) = self.altitude_range {
                let altitude = if hi > lo { rng.gen_range(lo..hi) } else { lo };
                sample = sample.with_altitude(altitude);
            }
            samples.push(sample);
        }

        samples
    }
}

/// Uniform value in [-max, max], or 0 when max is not positive.
fn spread(rng: &mut StdRng, max: f64) -> f64 {
    if max > 0.0 {
        rng.gen_range(-max..=max)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo_utils::polyline_length;

    #[test]
    fn test_deterministic() {
        let a = SyntheticTrack::new(1.3521, 103.8198).seed(42).generate();
        let b = SyntheticTrack::new(1.3521, 103.8198).seed(42).generate();
        let c = SyntheticTrack::new(1.3521, 103.8198).seed(43).generate();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_clean_track_length() {
        let track = SyntheticTrack::new(1.3521, 103.8198)
            .bearing(90.0)
            .distance(2000.0)
            .wander(0.0)
            .jitter(0.0)
            .generate();
        assert_eq!(track.len(), 200);
        // First sample is one step from the start, so 199 segments of 10 m
        assert!((polyline_length(&track) - 1990.0).abs() < 0.1);
        assert!(track.windows(2).all(|w| w[1].timestamp - w[0].timestamp == 1000));
    }

    #[test]
    fn test_ranges() {
        let track = SyntheticTrack::new(1.3521, 103.8198)
            .accuracy(3.0, 8.0)
            .altitude(None)
            .seed(9)
            .generate();
        assert!(track.iter().all(|s| s.accuracy >= 3.0 && s.accuracy < 8.0));
        assert!(track.iter().all(|s| s.altitude.is_none()));
        assert!(track.iter().all(|s| s.is_valid()));
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(SyntheticTrack::new(0.0, 0.0).distance(0.0).generate().is_empty());
        assert!(SyntheticTrack::new(0.0, 0.0).step(0.0, 1000).generate().is_empty());
    }
}
