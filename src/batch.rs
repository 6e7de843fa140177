//! Batch post-processing of recorded tracks.
//!
//! Applies the same gates as the live recorder to a complete sample
//! sequence, then smooths with the centered batch window and recomputes
//! metrics. Useful for cleaning imported or previously saved tracks.

use log::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::smoothing::smooth;
use crate::{filter, GeoSample, RecorderConfig, RejectionStats, RouteMetrics, SampleRejection};

/// A cleaned track with its metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedTrack {
    /// Accepted and smoothed samples
    pub samples: Vec<GeoSample>,
    pub metrics: RouteMetrics,
    /// Dropped samples by reason
    pub rejections: RejectionStats,
}

/// Filter, smooth and measure one track.
///
/// # Example
/// ```
/// use track_recorder::{process_track, GeoSample, RecorderConfig};
///
/// let raw = vec![
///     GeoSample::new(1.3000, 103.8, 0, 5.0),
///     GeoSample::new(1.3005, 103.8, 5_000, 90.0), // too inaccurate
///     GeoSample::new(1.3010, 103.8, 10_000, 5.0),
/// ];
/// let processed = process_track(&raw, &RecorderConfig::default());
/// assert_eq!(processed.samples.len(), 2);
/// assert_eq!(processed.rejections.low_accuracy, 1);
/// ```
pub fn process_track(samples: &[GeoSample], config: &RecorderConfig) -> ProcessedTrack {
    let mut rejections = RejectionStats::default();
    let mut kept: Vec<GeoSample> = Vec::with_capacity(samples.len());

    for sample in samples {
        let verdict = filter::check(sample, config.max_accuracy_m).and_then(|_| {
            match kept.last() {
                Some(prev) if sample.timestamp <= prev.timestamp => {
                    Err(SampleRejection::NonMonotonicTimestamp {
                        previous: prev.timestamp,
                        received: sample.timestamp,
                    })
                }
                _ => Ok(()),
            }
        });
        match verdict {
            Ok(()) => kept.push(*sample),
            Err(rejection) => rejections.record(&rejection),
        }
    }

    let smoothed = smooth(&kept, config.batch_smoothing_window as usize);
    let metrics = RouteMetrics::from_samples(&smoothed);

    debug!(
        "[Batch] {} -> {} samples ({} dropped), {:.0}m",
        samples.len(),
        smoothed.len(),
        rejections.total(),
        metrics.total_distance_m
    );

    ProcessedTrack {
        samples: smoothed,
        metrics,
        rejections,
    }
}

/// Process many tracks sequentially.
pub fn process_tracks(tracks: &[Vec<GeoSample>], config: &RecorderConfig) -> Vec<ProcessedTrack> {
    tracks.iter().map(|t| process_track(t, config)).collect()
}

/// Process many tracks in parallel. Output order matches input order.
#[cfg(feature = "parallel")]
pub fn process_tracks_parallel(
    tracks: &[Vec<GeoSample>],
    config: &RecorderConfig,
) -> Vec<ProcessedTrack> {
    if tracks.len() < 4 {
        return process_tracks(tracks, config);
    }
    tracks
        .par_iter()
        .map(|t| process_track(t, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_track() -> Vec<GeoSample> {
        vec![
            GeoSample::new(1.3000, 103.8000, 0, 5.0),
            GeoSample::new(1.3010, 103.8000, 10_000, 5.0),
            GeoSample::new(1.3010, 103.8000, 10_000, 5.0), // duplicate
            GeoSample::new(1.3015, 103.8000, 15_000, 75.0), // inaccurate
            GeoSample::new(f64::NAN, 103.8000, 16_000, 5.0), // malformed
            GeoSample::new(1.3020, 103.8000, 20_000, 5.0),
            GeoSample::new(1.3019, 103.8000, 18_000, 5.0), // out of order
        ]
    }

    #[test]
    fn test_process_track_drops_and_counts() {
        let config = RecorderConfig {
            batch_smoothing_window: 0,
            ..RecorderConfig::default()
        };
        let processed = process_track(&raw_track(), &config);

        assert_eq!(processed.samples.len(), 3);
        assert_eq!(processed.rejections.non_monotonic, 2);
        assert_eq!(processed.rejections.low_accuracy, 1);
        assert_eq!(processed.rejections.invalid_coordinates, 1);
        assert!((processed.metrics.total_distance_m - 222.4).abs() < 0.5);
        assert_eq!(processed.metrics.elapsed_seconds, 20.0);
    }

    #[test]
    fn test_process_track_smooths() {
        let zigzag = vec![
            GeoSample::new(1.3000, 103.8000, 0, 5.0),
            GeoSample::new(1.3010, 103.8006, 5_000, 5.0),
            GeoSample::new(1.3020, 103.8000, 10_000, 5.0),
            GeoSample::new(1.3030, 103.8006, 15_000, 5.0),
            GeoSample::new(1.3040, 103.8000, 20_000, 5.0),
        ];
        let raw = process_track(
            &zigzag,
            &RecorderConfig {
                batch_smoothing_window: 1,
                ..RecorderConfig::default()
            },
        );
        let smoothed = process_track(&zigzag, &RecorderConfig::default());

        assert_eq!(smoothed.samples.len(), zigzag.len());
        assert!(smoothed.metrics.total_distance_m < raw.metrics.total_distance_m);
    }

    #[test]
    fn test_process_track_extreme_timestamps() {
        let imported = vec![
            GeoSample::new(1.3000, 103.8000, i64::MIN, 5.0),
            GeoSample::new(1.3010, 103.8000, 0, 5.0),
        ];
        let processed = process_track(&imported, &RecorderConfig::default());
        assert_eq!(processed.samples.len(), 2);
        assert!(processed.metrics.elapsed_seconds.is_finite());
        assert!(processed.metrics.current_speed_mps >= 0.0);
    }

    #[test]
    fn test_process_tracks() {
        let tracks = vec![raw_track(), vec![], raw_track()];
        let out = process_tracks(&tracks, &RecorderConfig::default());
        assert_eq!(out.len(), 3);
        assert!(out[1].samples.is_empty());
        assert_eq!(out[1].metrics, RouteMetrics::default());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let tracks: Vec<Vec<GeoSample>> = (0..8).map(|_| raw_track()).collect();
        let config = RecorderConfig::default();
        assert_eq!(
            process_tracks_parallel(&tracks, &config),
            process_tracks(&tracks, &config)
        );
    }
}
