//! Accuracy gate for incoming samples.
//!
//! This is the first stage of the pipeline. A sample that fails here is
//! dropped entirely: it is never stored and never contributes to metrics.

use crate::{GeoSample, SampleRejection};

/// Default accuracy threshold in meters.
pub const DEFAULT_MAX_ACCURACY_M: f64 = 50.0;

/// Returns `false` when the sample's accuracy is worse than `max_accuracy_m`.
pub fn accept(sample: &GeoSample, max_accuracy_m: f64) -> bool {
    sample.accuracy <= max_accuracy_m
}

/// Full gate used by the recorder: malformed samples first, then accuracy.
pub fn check(sample: &GeoSample, max_accuracy_m: f64) -> Result<(), SampleRejection> {
    if !sample.is_valid() {
        return Err(SampleRejection::InvalidCoordinates);
    }
    if !accept(sample, max_accuracy_m) {
        return Err(SampleRejection::LowAccuracy {
            accuracy: sample.accuracy,
            threshold: max_accuracy_m,
        });
    }
    Ok(())
}

/// Keep only samples whose accuracy is within the threshold.
pub fn filter_by_accuracy(samples: &[GeoSample], max_accuracy_m: f64) -> Vec<GeoSample> {
    samples
        .iter()
        .filter(|s| accept(s, max_accuracy_m))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_accuracy(accuracy: f64) -> GeoSample {
        GeoSample::new(1.3, 103.8, 0, accuracy)
    }

    #[test]
    fn test_accept_matches_threshold() {
        for threshold in [0.0, 5.0, 20.0, 50.0, 100.0] {
            for accuracy in [0.0, 4.9, 5.0, 19.99, 20.0, 50.0, 50.01, 120.0] {
                assert_eq!(
                    accept(&with_accuracy(accuracy), threshold),
                    accuracy <= threshold,
                    "accuracy {} threshold {}",
                    accuracy,
                    threshold
                );
            }
        }
    }

    #[test]
    fn test_check_reports_reason() {
        assert!(check(&with_accuracy(10.0), DEFAULT_MAX_ACCURACY_M).is_ok());
        assert_eq!(
            check(&with_accuracy(75.0), DEFAULT_MAX_ACCURACY_M),
            Err(SampleRejection::LowAccuracy {
                accuracy: 75.0,
                threshold: 50.0
            })
        );
        assert_eq!(
            check(&GeoSample::new(95.0, 0.0, 0, 5.0), DEFAULT_MAX_ACCURACY_M),
            Err(SampleRejection::InvalidCoordinates)
        );
    }

    #[test]
    fn test_filter_by_accuracy() {
        let samples = vec![with_accuracy(5.0), with_accuracy(60.0), with_accuracy(50.0)];
        let kept = filter_by_accuracy(&samples, DEFAULT_MAX_ACCURACY_M);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|s| s.accuracy <= 50.0));
    }
}
