//! # Track Recorder
//!
//! GPS track processing core for live activity recording.
//!
//! This library provides:
//! - Haversine distance and segment speed between GPS samples
//! - Accuracy filtering and positional smoothing of noisy samples
//! - Live route metrics (distance, current/average speed, elapsed time)
//! - A recording session state machine that produces a finalized route
//! - GPX and JSON export of finalized routes
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel batch post-processing with rayon
//! - **`synthetic`** - Deterministic synthetic tracks for tests and demos
//! - **`ffi`** - Enable FFI bindings for mobile platforms (iOS/Android)
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use track_recorder::{GeoSample, ManualClock, RecorderConfig, SessionRecorder};
//! use std::sync::Arc;
//!
//! let clock = Arc::new(ManualClock::new(0));
//! let mut recorder = SessionRecorder::with_clock(RecorderConfig::default(), clock);
//!
//! recorder.start().unwrap();
//! recorder.on_sample(GeoSample::new(1.3000, 103.8000, 0, 5.0));
//! recorder.on_sample(GeoSample::new(1.3010, 103.8000, 10_000, 5.0));
//!
//! let route = recorder.stop().unwrap();
//! println!("{:.0} m in {:.0} s", route.total_distance_m, route.duration_seconds);
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{RecorderError, RejectionStats, Result, SampleRejection};

// Geographic utilities (distance, speed, bounds)
pub mod geo_utils;
pub use geo_utils::{haversine_distance, segment_speed};

// Accuracy gate for incoming samples
pub mod filter;

// Positional smoothing (batch and rolling)
pub mod smoothing;
pub use smoothing::{smooth, RollingSmoother};

// Route metrics accumulation
pub mod metrics;
pub use metrics::RouteMetrics;

// Time source for the recorder
pub mod clock;
pub use clock::{Clock, ManualClock, SystemClock};

// Metrics subscriptions
pub mod observer;
pub use observer::{MetricsObserver, SubscriptionId};

// Recording lifecycle state machine
pub mod session;
pub use session::{SampleOutcome, SessionRecorder, SessionState};

// Finalized routes and their segments
pub mod route;
pub use route::{ActivityType, FinalizedRoute, RouteSegment};

// GPX / JSON export
pub mod export;
pub use export::{export, to_gpx, to_json, ExportFormat};

// Batch post-processing of recorded tracks
pub mod batch;
pub use batch::{process_track, ProcessedTrack};
#[cfg(feature = "parallel")]
pub use batch::process_tracks_parallel;

// Speed conversions and display formatting
pub mod units;

// Synthetic tracks for tests and demos
#[cfg(feature = "synthetic")]
pub mod synthetic;

// FFI bindings for mobile platforms (iOS/Android)
#[cfg(feature = "ffi")]
pub mod ffi;

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
pub(crate) fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("TrackRecorderRust"),
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
pub(crate) fn init_logging() {
    // No-op on non-Android platforms
}

// ============================================================================
// Core Types
// ============================================================================

/// One timestamped, accuracy-tagged location reading.
///
/// # Example
/// ```
/// use track_recorder::GeoSample;
/// let sample = GeoSample::new(1.3521, 103.8198, 1_700_000_000_000, 8.0)
///     .with_altitude(15.0);
/// assert!(sample.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct GeoSample {
    pub latitude: f64,
    pub longitude: f64,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    /// Horizontal accuracy in meters (lower is better)
    pub accuracy: f64,
    /// Altitude in meters, if the device reported one
    #[serde(default)]
    pub altitude: Option<f64>,
    /// Sensor-reported speed in m/s
    #[serde(default)]
    pub speed: Option<f64>,
}

impl GeoSample {
    /// Create a sample without altitude or sensor speed.
    pub fn new(latitude: f64, longitude: f64, timestamp: i64, accuracy: f64) -> Self {
        Self {
            latitude,
            longitude,
            timestamp,
            accuracy,
            altitude: None,
            speed: None,
        }
    }

    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = Some(altitude);
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    /// Check that coordinates are finite and in range and accuracy is a
    /// finite, non-negative number.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
            && self.accuracy.is_finite()
            && self.accuracy >= 0.0
    }
}

/// Bounding box of a set of samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from samples. Returns `None` for an empty slice.
    pub fn from_samples(samples: &[GeoSample]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lng = f64::MAX;
        let mut max_lng = f64::MIN;

        for s in samples {
            min_lat = min_lat.min(s.latitude);
            max_lat = max_lat.max(s.latitude);
            min_lng = min_lng.min(s.longitude);
            max_lng = max_lng.max(s.longitude);
        }

        Some(Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        })
    }

    /// Center of the bounds as (latitude, longitude).
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

/// How paused wall-clock time counts towards elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
#[serde(rename_all = "snake_case")]
pub enum ElapsedTimeMode {
    /// Elapsed time runs from session start, pauses included.
    #[default]
    WallClock,
    /// Time spent paused is subtracted from elapsed time.
    ExcludePauses,
}

/// Configuration for the recorder and batch post-processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[serde(default)]
pub struct RecorderConfig {
    /// Samples with a horizontal accuracy worse than this are dropped.
    /// Default: 50.0 meters
    pub max_accuracy_m: f64,

    /// Trailing smoothing window applied to live samples (0 or 1 = off).
    /// Must be odd when enabled. Default: 0 (disabled)
    pub live_smoothing_window: u32,

    /// Centered smoothing window used by batch post-processing (0 or 1 = off).
    /// Must be odd when enabled. Default: 3
    pub batch_smoothing_window: u32,

    /// Whether paused time counts towards elapsed time.
    /// Default: WallClock
    pub elapsed_mode: ElapsedTimeMode,

    /// How far a sample may be stamped before the session start or the last
    /// resume and still be accepted. Absorbs skew between the location
    /// source's fix times and the recorder clock.
    /// Default: 1000 ms
    pub clock_tolerance_ms: u32,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            max_accuracy_m: 50.0,
            live_smoothing_window: 0,
            batch_smoothing_window: 3,
            elapsed_mode: ElapsedTimeMode::WallClock,
            clock_tolerance_ms: 1000,
        }
    }
}

impl RecorderConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| RecorderError::InvalidConfig {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the threshold is usable and smoothing windows are odd.
    pub fn validate(&self) -> Result<()> {
        if !self.max_accuracy_m.is_finite() || self.max_accuracy_m < 0.0 {
            return Err(RecorderError::InvalidConfig {
                message: format!(
                    "max_accuracy_m must be a non-negative number, got {}",
                    self.max_accuracy_m
                ),
            });
        }
        for (name, window) in [
            ("live_smoothing_window", self.live_smoothing_window),
            ("batch_smoothing_window", self.batch_smoothing_window),
        ] {
            if window > 1 && window % 2 == 0 {
                return Err(RecorderError::InvalidConfig {
                    message: format!("{} must be odd, got {}", name, window),
                });
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
