//! Geographic utilities: great-circle distance, segment speed, bounds.
//!
//! All distances use a spherical Earth with the mean radius below. None of
//! these functions validate coordinate ranges; samples are checked before
//! they reach this module.

use crate::{Bounds, GeoSample};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two samples in meters (Haversine).
///
/// # Example
/// ```
/// use track_recorder::{GeoSample, haversine_distance};
///
/// let a = GeoSample::new(0.0, 0.0, 0, 5.0);
/// let b = GeoSample::new(0.01, 0.0, 0, 5.0);
/// let d = haversine_distance(&a, &b);
/// assert!((d - 1112.0).abs() < 11.0);
/// ```
pub fn haversine_distance(a: &GeoSample, b: &GeoSample) -> f64 {
    haversine_coords(a.latitude, a.longitude, b.latitude, b.longitude)
}

pub(crate) fn haversine_coords(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lng2 - lng1).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // Rounding can push h a hair outside [0, 1] for near-antipodal points
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Seconds between two samples (negative if `b` is earlier).
pub fn seconds_between(a: &GeoSample, b: &GeoSample) -> f64 {
    b.timestamp.saturating_sub(a.timestamp) as f64 / 1000.0
}

/// Speed over the segment from `a` to `b` in m/s.
///
/// Returns 0 when `b` is not strictly later than `a`.
pub fn segment_speed(a: &GeoSample, b: &GeoSample) -> f64 {
    let dt = seconds_between(a, b);
    if dt <= 0.0 {
        return 0.0;
    }
    haversine_distance(a, b) / dt
}

/// Total length of a sample sequence in meters.
pub fn polyline_length(samples: &[GeoSample]) -> f64 {
    samples
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

/// Average speed over a whole sequence: length divided by the first-to-last
/// time span. 0 for fewer than two samples or a non-positive span.
pub fn average_speed(samples: &[GeoSample]) -> f64 {
    let (first, last) = match (samples.first(), samples.last()) {
        (Some(f), Some(l)) if samples.len() >= 2 => (f, l),
        _ => return 0.0,
    };
    let span = seconds_between(first, last);
    if span <= 0.0 {
        return 0.0;
    }
    polyline_length(samples) / span
}

/// Bounding box for a sample sequence.
pub fn compute_bounds(samples: &[GeoSample]) -> Option<Bounds> {
    Bounds::from_samples(samples)
}

/// Point reached by travelling `distance_m` from (lat, lng) along the
/// initial bearing `bearing_deg` on the sphere. Returns (lat, lng).
pub fn destination_point(lat: f64, lng: f64, bearing_deg: f64, distance_m: f64) -> (f64, f64) {
    let delta = distance_m / EARTH_RADIUS_M;
    let theta = bearing_deg.to_radians();
    let phi1 = lat.to_radians();
    let lambda1 = lng.to_radians();

    let phi2 = (phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos()).asin();
    let lambda2 = lambda1
        + (theta.sin() * delta.sin() * phi1.cos()).atan2(delta.cos() - phi1.sin() * phi2.sin());

    let lng2 = (lambda2.to_degrees() + 540.0) % 360.0 - 180.0;
    (phi2.to_degrees(), lng2)
}
