//! Route export to GPX 1.1 and JSON.
//!
//! GPX output holds one track with one segment; every sample becomes a
//! `<trkpt>` with latitude, longitude, elevation (when known) and time.

use gpx::{Gpx, GpxVersion, Metadata, Time, Track, TrackSegment, Waypoint};
use log::debug;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{FinalizedRoute, GeoSample, RecorderError, Result};

const CREATOR: &str = "track-recorder";

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Gpx,
    Json,
}

/// Export a route in the requested format.
pub fn export(route: &FinalizedRoute, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Gpx => to_gpx(route),
        ExportFormat::Json => to_json(route),
    }
}

/// Serialize a route as a GPX 1.1 document.
pub fn to_gpx(route: &FinalizedRoute) -> Result<String> {
    let gpx = build_gpx(route);

    let mut buf = Vec::new();
    gpx::write(&gpx, &mut buf).map_err(|e| RecorderError::Export {
        format: "GPX",
        message: e.to_string(),
    })?;
    debug!(
        "[Export] GPX for '{}': {} points, {} bytes",
        route.name,
        route.samples.len(),
        buf.len()
    );

    String::from_utf8(buf).map_err(|e| RecorderError::Export {
        format: "GPX",
        message: e.to_string(),
    })
}

/// Serialize a route as pretty-printed JSON.
pub fn to_json(route: &FinalizedRoute) -> Result<String> {
    serde_json::to_string_pretty(route).map_err(|e| RecorderError::Export {
        format: "JSON",
        message: e.to_string(),
    })
}

fn build_gpx(route: &FinalizedRoute) -> Gpx {
    let mut segment = TrackSegment::new();
    segment.points = route.samples.iter().map(waypoint).collect();

    let track = Track {
        name: Some(route.name.clone()),
        type_: Some(route.activity_type.as_str().to_string()),
        segments: vec![segment],
        ..Default::default()
    };

    Gpx {
        version: GpxVersion::Gpx11,
        creator: Some(CREATOR.to_string()),
        metadata: Some(Metadata {
            name: Some(route.name.clone()),
            time: gpx_time(route.start_time),
            ..Default::default()
        }),
        tracks: vec![track],
        ..Default::default()
    }
}

fn waypoint(sample: &GeoSample) -> Waypoint {
    let mut point = Waypoint::new(geo::Point::new(sample.longitude, sample.latitude));
    point.elevation = sample.altitude;
    point.time = gpx_time(sample.timestamp);
    point
}

/// Unix milliseconds to a GPX timestamp; `None` if out of range.
fn gpx_time(timestamp_ms: i64) -> Option<Time> {
    OffsetDateTime::from_unix_timestamp_nanos(timestamp_ms as i128 * 1_000_000)
        .ok()
        .map(Time::from)
}
