//! Positional smoothing of GPS samples.
//!
//! Two variants are provided:
//! - [`smooth`] - centered moving average over a finished (or partial) track
//! - [`RollingSmoother`] - trailing moving average for live recording, O(window)
//!   per sample with no recomputation of earlier output
//!
//! Only latitude, longitude and accuracy are averaged. Timestamp, altitude
//! and sensor speed always come from the sample being smoothed.

use std::collections::VecDeque;

use crate::GeoSample;

/// Smooth a track with a centered window of up to `window` samples.
///
/// Near the ends the window shrinks instead of wrapping or padding. A window
/// of 0 or 1 returns the input unchanged; an even window behaves as the next
/// odd size.
///
/// # Example
/// ```
/// use track_recorder::{smooth, GeoSample};
///
/// let track = vec![
///     GeoSample::new(1.3000, 103.8, 0, 5.0),
///     GeoSample::new(1.3030, 103.8, 1000, 5.0),
///     GeoSample::new(1.3000, 103.8, 2000, 5.0),
/// ];
/// let smoothed = smooth(&track, 3);
/// assert_eq!(smoothed.len(), 3);
/// assert!((smoothed[1].latitude - 1.3010).abs() < 1e-9);
/// ```
pub fn smooth(samples: &[GeoSample], window: usize) -> Vec<GeoSample> {
    if window <= 1 || samples.len() <= 1 {
        return samples.to_vec();
    }

    let half = window / 2;
    (0..samples.len())
        .map(|i| {
            let start = i.saturating_sub(half);
            let end = (i + half + 1).min(samples.len());
            averaged(&samples[i], samples[start..end].iter())
        })
        .collect()
}

/// Average position and accuracy over `window`, keeping the other fields of
/// `anchor`.
fn averaged<'a>(anchor: &GeoSample, window: impl Iterator<Item = &'a GeoSample>) -> GeoSample {
    let mut lat = 0.0;
    let mut lng = 0.0;
    let mut accuracy = 0.0;
    let mut n = 0usize;
    for s in window {
        lat += s.latitude;
        lng += s.longitude;
        accuracy += s.accuracy;
        n += 1;
    }
    if n == 0 {
        return *anchor;
    }
    let n = n as f64;
    GeoSample {
        latitude: lat / n,
        longitude: lng / n,
        accuracy: accuracy / n,
        ..*anchor
    }
}

/// Trailing moving average for live sessions.
///
/// Each pushed sample is replaced by the average of itself and up to
/// `window - 1` previously pushed raw samples.
#[derive(Debug, Clone)]
pub struct RollingSmoother {
    window: usize,
    buffer: VecDeque<GeoSample>,
}

impl RollingSmoother {
    /// Create a smoother. A window of 0 or 1 passes samples through.
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            buffer: VecDeque::with_capacity(window),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Add a raw sample and return its smoothed counterpart.
    pub fn push(&mut self, sample: GeoSample) -> GeoSample {
        if self.buffer.len() == self.window {
            self.buffer.pop_front();
        }
        self.buffer.push_back(sample);
        averaged(&sample, self.buffer.iter())
    }

    /// Forget all buffered samples.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(lat: f64, lng: f64, t: i64, accuracy: f64) -> GeoSample {
        GeoSample::new(lat, lng, t, accuracy)
    }

    #[test]
    fn test_length_preserved() {
        let track: Vec<GeoSample> = (0..7)
            .map(|i| at(1.3 + i as f64 * 0.001, 103.8, i * 1000, 5.0))
            .collect();
        for window in [1, 3, 5, 7, 9] {
            assert_eq!(smooth(&track, window).len(), track.len());
        }
        assert!(smooth(&[], 3).is_empty());
    }

    #[test]
    fn test_single_and_constant_unchanged() {
        let single = vec![at(1.3, 103.8, 0, 5.0).with_altitude(12.0)];
        assert_eq!(smooth(&single, 5), single);

        let constant: Vec<GeoSample> = (0..5).map(|i| at(1.3, 103.8, i * 1000, 7.0)).collect();
        let smoothed = smooth(&constant, 3);
        for (a, b) in constant.iter().zip(&smoothed) {
            assert!((a.latitude - b.latitude).abs() < 1e-12);
            assert!((a.longitude - b.longitude).abs() < 1e-12);
            assert!((a.accuracy - b.accuracy).abs() < 1e-12);
        }
    }

    #[test]
    fn test_window_shrinks_at_edges() {
        let track = vec![
            at(0.0, 0.0, 0, 2.0),
            at(3.0, 0.0, 1000, 4.0),
            at(6.0, 0.0, 2000, 6.0),
            at(9.0, 0.0, 3000, 8.0),
        ];
        let smoothed = smooth(&track, 3);
        // First sample averages indices 0..=1, last averages 2..=3
        assert!((smoothed[0].latitude - 1.5).abs() < 1e-12);
        assert!((smoothed[0].accuracy - 3.0).abs() < 1e-12);
        assert!((smoothed[1].latitude - 3.0).abs() < 1e-12);
        assert!((smoothed[2].latitude - 6.0).abs() < 1e-12);
        assert!((smoothed[3].latitude - 7.5).abs() < 1e-12);
    }

    #[test]
    fn test_pass_through_fields() {
        let track = vec![
            at(1.0, 1.0, 0, 5.0).with_altitude(10.0).with_speed(2.0),
            at(2.0, 2.0, 1000, 5.0).with_altitude(20.0),
            at(3.0, 3.0, 2000, 5.0).with_speed(4.0),
        ];
        let smoothed = smooth(&track, 3);
        for (raw, out) in track.iter().zip(&smoothed) {
            assert_eq!(raw.timestamp, out.timestamp);
            assert_eq!(raw.altitude, out.altitude);
            assert_eq!(raw.speed, out.speed);
        }
    }

    #[test]
    fn test_rolling_smoother_trailing_average() {
        let mut smoother = RollingSmoother::new(3);
        let a = smoother.push(at(0.0, 0.0, 0, 3.0));
        let b = smoother.push(at(3.0, 3.0, 1000, 6.0));
        let c = smoother.push(at(6.0, 6.0, 2000, 9.0));
        let d = smoother.push(at(9.0, 9.0, 3000, 12.0));

        assert_eq!(a.latitude, 0.0);
        assert!((b.latitude - 1.5).abs() < 1e-12);
        assert!((c.latitude - 3.0).abs() < 1e-12);
        assert!((d.latitude - 6.0).abs() < 1e-12);
        assert!((d.accuracy - 9.0).abs() < 1e-12);
        assert_eq!(d.timestamp, 3000);

        smoother.reset();
        let e = smoother.push(at(1.0, 1.0, 4000, 5.0));
        assert_eq!(e.latitude, 1.0);
    }

    #[test]
    fn test_rolling_smoother_disabled() {
        let mut smoother = RollingSmoother::new(0);
        assert_eq!(smoother.window(), 1);
        let s = at(1.2345, 103.8, 0, 5.0);
        assert_eq!(smoother.push(s), s);
    }
}
