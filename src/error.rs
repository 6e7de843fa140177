//! Unified error handling for the track-recorder library.
//!
//! Lifecycle, configuration and export failures are reported as
//! [`RecorderError`]. Dropped samples are not errors: the recorder keeps
//! streaming and reports them as a [`SampleRejection`] instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::SessionState;

/// Unified error type for track-recorder operations.
#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "ffi", derive(uniffi::Error), uniffi(flat_error))]
pub enum RecorderError {
    /// Lifecycle method called in a state that does not allow it
    #[error("Cannot {action} while session is {state}")]
    InvalidTransition {
        state: SessionState,
        action: &'static str,
    },
    /// Configuration error
    #[error("Configuration error: {message}")]
    InvalidConfig { message: String },
    /// Route could not be serialized
    #[error("{format} export failed: {message}")]
    Export {
        format: &'static str,
        message: String,
    },
}

/// Result type alias for track-recorder operations.
pub type Result<T> = std::result::Result<T, RecorderError>;

/// Why an incoming sample was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum SampleRejection {
    /// Latitude/longitude out of range or not finite, or unusable accuracy
    InvalidCoordinates,
    /// Timestamp not strictly after the last accepted sample
    NonMonotonicTimestamp { previous: i64, received: i64 },
    /// Timestamp earlier than the start of the session
    BeforeSessionStart { session_start: i64, received: i64 },
    /// Timestamp inside a pause that has already ended
    BeforeResume { resumed_at: i64, received: i64 },
    /// Reported accuracy worse than the configured threshold
    LowAccuracy { accuracy: f64, threshold: f64 },
}

impl SampleRejection {
    /// Low-accuracy drops are expected and frequent; everything else
    /// indicates a malformed sample.
    pub fn is_invalid_sample(&self) -> bool {
        !matches!(self, SampleRejection::LowAccuracy { .. })
    }
}

/// Counters of dropped samples for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct RejectionStats {
    pub invalid_coordinates: u32,
    pub non_monotonic: u32,
    pub before_start: u32,
    pub before_resume: u32,
    pub low_accuracy: u32,
}

impl RejectionStats {
    pub fn record(&mut self, rejection: &SampleRejection) {
        match rejection {
            SampleRejection::InvalidCoordinates => self.invalid_coordinates += 1,
            SampleRejection::NonMonotonicTimestamp { .. } => self.non_monotonic += 1,
            SampleRejection::BeforeSessionStart { .. } => self.before_start += 1,
            SampleRejection::BeforeResume { .. } => self.before_resume += 1,
            SampleRejection::LowAccuracy { .. } => self.low_accuracy += 1,
        }
    }

    /// Number of malformed samples (excludes low-accuracy drops).
    pub fn invalid_count(&self) -> u32 {
        self.invalid_coordinates + self.non_monotonic + self.before_start + self.before_resume
    }

    pub fn total(&self) -> u32 {
        self.invalid_count() + self.low_accuracy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RecorderError::InvalidTransition {
            state: SessionState::Idle,
            action: "pause",
        };
        assert_eq!(err.to_string(), "Cannot pause while session is idle");

        let err = RecorderError::Export {
            format: "GPX",
            message: "boom".to_string(),
        };
        assert!(err.to_string().contains("GPX"));
    }

    #[test]
    fn test_rejection_stats() {
        let mut stats = RejectionStats::default();
        stats.record(&SampleRejection::InvalidCoordinates);
        stats.record(&SampleRejection::LowAccuracy {
            accuracy: 80.0,
            threshold: 50.0,
        });
        stats.record(&SampleRejection::NonMonotonicTimestamp {
            previous: 10,
            received: 5,
        });
        stats.record(&SampleRejection::BeforeResume {
            resumed_at: 70_000,
            received: 65_000,
        });

        assert_eq!(stats.invalid_count(), 3);
        assert_eq!(stats.before_resume, 1);
        assert_eq!(stats.low_accuracy, 1);
        assert_eq!(stats.total(), 4);
    }

    #[test]
    fn test_low_accuracy_is_not_invalid() {
        assert!(!SampleRejection::LowAccuracy {
            accuracy: 60.0,
            threshold: 50.0
        }
        .is_invalid_sample());
        assert!(SampleRejection::InvalidCoordinates.is_invalid_sample());
    }
}
