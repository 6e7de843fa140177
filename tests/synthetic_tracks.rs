//! Synthetic track tests: live recording vs batch post-processing.
//!
//! Run with: `cargo test --features synthetic --test synthetic_tracks`

use std::sync::Arc;

use track_recorder::geo_utils::polyline_length;
use track_recorder::synthetic::SyntheticTrack;
use track_recorder::{process_track, ManualClock, RecorderConfig, SessionRecorder};

fn singapore_run(seed: u64) -> SyntheticTrack {
    SyntheticTrack::new(1.3521, 103.8198)
        .start_time(1_760_000_000_000)
        .bearing(45.0)
        .distance(5200.0)
        .seed(seed)
}

#[test]
fn test_live_recording_matches_polyline() {
    let _ = env_logger::builder().is_test(true).try_init();
    let track = singapore_run(1).generate();

    let clock = Arc::new(ManualClock::new(1_760_000_000_000));
    let mut rec = SessionRecorder::with_clock(RecorderConfig::default(), clock);
    rec.start().unwrap();
    for s in &track {
        assert!(rec.on_sample(*s).is_accepted());
    }
    let route = rec.stop().unwrap();

    assert_eq!(route.sample_count(), track.len());
    assert!((route.total_distance_m - polyline_length(&track)).abs() < 1e-6);
    // One sample per second, first one at the session start
    assert_eq!(route.duration_seconds, (track.len() - 1) as f64);
}

#[test]
fn test_batch_smoothing_removes_jitter_length() {
    let noisy = singapore_run(2).jitter(0.0002).generate();

    let raw = process_track(
        &noisy,
        &RecorderConfig {
            batch_smoothing_window: 0,
            ..RecorderConfig::default()
        },
    );
    let smoothed = process_track(
        &noisy,
        &RecorderConfig {
            batch_smoothing_window: 5,
            ..RecorderConfig::default()
        },
    );

    assert_eq!(raw.samples.len(), noisy.len());
    assert_eq!(smoothed.samples.len(), noisy.len());
    assert!(smoothed.metrics.total_distance_m < raw.metrics.total_distance_m);
}

#[test]
fn test_low_accuracy_samples_filtered() {
    let track = singapore_run(3).accuracy(30.0, 70.0).generate();
    let processed = process_track(&track, &RecorderConfig::default());

    let expected_kept = track.iter().filter(|s| s.accuracy <= 50.0).count();
    assert_eq!(processed.samples.len(), expected_kept);
    assert_eq!(
        processed.rejections.low_accuracy as usize,
        track.len() - expected_kept
    );
}
