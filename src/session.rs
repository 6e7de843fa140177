//! # Session Recorder
//!
//! Owns the recording lifecycle and drives every incoming sample through
//! the pipeline:
//!
//! ```text
//! sample -> filter::check -> timestamp gate -> RollingSmoother (optional)
//!        -> metrics::update -> append -> observers
//! ```
//!
//! ## States
//!
//! `Idle --start--> Recording --pause--> Paused --resume--> Recording`,
//! and `Recording | Paused --stop--> Stopped`. `Stopped` is terminal; create
//! a new recorder to record again. Any other call is rejected with
//! [`RecorderError::InvalidTransition`] and leaves the state untouched.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::observer::{MetricsObserver, ObserverSet, SubscriptionId};
use crate::route::{ActivityType, FinalizedRoute};
use crate::smoothing::RollingSmoother;
use crate::{
    filter, metrics, Bounds, ElapsedTimeMode, GeoSample, RecorderConfig, RecorderError,
    RejectionStats, Result, RouteMetrics, SampleRejection,
};

/// Lifecycle state of a recording session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Recording,
    Paused,
    Stopped,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Recording => "recording",
            SessionState::Paused => "paused",
            SessionState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// What happened to a delivered sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleOutcome {
    /// Sample was stored; carries the updated metrics snapshot.
    Accepted(RouteMetrics),
    /// Sample was dropped for the given reason.
    Rejected(SampleRejection),
    /// Recorder is not recording; sample was not looked at.
    Ignored(SessionState),
}

impl SampleOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SampleOutcome::Accepted(_))
    }
}

/// Data owned by an active (recording or paused) session.
#[derive(Debug)]
struct RecordingSession {
    started_at: i64,
    samples: Vec<GeoSample>,
    metrics: RouteMetrics,
    /// Raw timestamp of the last accepted sample (before smoothing)
    last_timestamp: Option<i64>,
    paused_total_ms: i64,
    paused_since: Option<i64>,
    /// Clock time of the most recent resume
    resumed_at: Option<i64>,
    rejections: RejectionStats,
}

impl RecordingSession {
    fn new(started_at: i64) -> Self {
        Self {
            started_at,
            samples: Vec::new(),
            metrics: RouteMetrics::default(),
            last_timestamp: None,
            paused_total_ms: 0,
            paused_since: None,
            resumed_at: None,
            rejections: RejectionStats::default(),
        }
    }

    /// Start time fed to the accumulator for the given pause policy.
    fn effective_start(&self, mode: ElapsedTimeMode) -> i64 {
        match mode {
            ElapsedTimeMode::WallClock => self.started_at,
            ElapsedTimeMode::ExcludePauses => self.started_at.saturating_add(self.paused_total_ms),
        }
    }
}

/// Live recording state machine.
///
/// The recorder is `Send`, so a host can move it into whichever thread
/// receives location callbacks. All work happens synchronously inside
/// [`SessionRecorder::on_sample`].
pub struct SessionRecorder {
    config: RecorderConfig,
    clock: Arc<dyn Clock>,
    state: SessionState,
    session: Option<RecordingSession>,
    smoother: Option<RollingSmoother>,
    observers: ObserverSet,
    activity_type: ActivityType,
    route_name: Option<String>,
}

impl SessionRecorder {
    /// Create a recorder that reads time from the system clock.
    pub fn new(config: RecorderConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a recorder with an explicit time source.
    pub fn with_clock(config: RecorderConfig, clock: Arc<dyn Clock>) -> Self {
        let smoother = match config.live_smoothing_window {
            0 | 1 => None,
            window => Some(RollingSmoother::new(window as usize)),
        };
        Self {
            config,
            clock,
            state: SessionState::Idle,
            session: None,
            smoother,
            observers: ObserverSet::default(),
            activity_type: ActivityType::default(),
            route_name: None,
        }
    }

    /// Label the route this session will produce. `name` overrides the
    /// generated "<Activity> - <date>" name.
    pub fn with_activity(mut self, activity_type: ActivityType, name: Option<String>) -> Self {
        self.activity_type = activity_type;
        self.route_name = name;
        self
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    pub fn subscribe(&mut self, observer: impl MetricsObserver + 'static) -> SubscriptionId {
        self.observers.subscribe(Box::new(observer))
    }

    /// Returns `false` if the id was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Idle -> Recording. Resets samples and metrics.
    pub fn start(&mut self) -> Result<()> {
        self.expect_state(&[SessionState::Idle], "start")?;

        let now = self.clock.now_ms();
        self.session = Some(RecordingSession::new(now));
        if let Some(smoother) = self.smoother.as_mut() {
            smoother.reset();
        }
        self.transition(SessionState::Recording);
        info!("[SessionRecorder] Started session at {}", now);
        Ok(())
    }

    /// Recording -> Paused. Samples are ignored until resumed.
    pub fn pause(&mut self) -> Result<()> {
        self.expect_state(&[SessionState::Recording], "pause")?;

        let now = self.clock.now_ms();
        if let Some(session) = self.session.as_mut() {
            session.paused_since = Some(now);
        }
        self.transition(SessionState::Paused);
        info!("[SessionRecorder] Paused");
        Ok(())
    }

    /// Paused -> Recording.
    pub fn resume(&mut self) -> Result<()> {
        self.expect_state(&[SessionState::Paused], "resume")?;

        let now = self.clock.now_ms();
        if let Some(session) = self.session.as_mut() {
            close_pause(session, now);
            session.resumed_at = Some(now);
            debug!(
                "[SessionRecorder] Resumed after {} ms paused in total",
                session.paused_total_ms
            );
        }
        self.transition(SessionState::Recording);
        info!("[SessionRecorder] Resumed");
        Ok(())
    }

    /// Recording | Paused -> Stopped. Produces the finalized route.
    ///
    /// A session without accepted samples still yields a route, with zero
    /// distance and duration, so the caller can decide whether to keep it.
    pub fn stop(&mut self) -> Result<FinalizedRoute> {
        self.expect_state(&[SessionState::Recording, SessionState::Paused], "stop")?;

        let now = self.clock.now_ms();
        let mut session = match self.session.take() {
            Some(session) => session,
            None => RecordingSession::new(now),
        };
        close_pause(&mut session, now);

        let route = self.finalize(session, now);
        self.transition(SessionState::Stopped);
        info!(
            "[SessionRecorder] Stopped: {} samples, {:.0}m in {:.0}s",
            route.samples.len(),
            route.total_distance_m,
            route.duration_seconds
        );
        Ok(route)
    }

    // ========================================================================
    // Sample Processing
    // ========================================================================

    /// Feed one location sample.
    ///
    /// Never fails: bad samples are dropped and reported through the
    /// returned outcome and `on_sample_rejected`, so a location source can
    /// keep streaming.
    pub fn on_sample(&mut self, sample: GeoSample) -> SampleOutcome {
        if self.state != SessionState::Recording {
            return SampleOutcome::Ignored(self.state);
        }
        let session = match self.session.as_mut() {
            Some(session) => session,
            None => return SampleOutcome::Ignored(self.state),
        };

        if let Err(rejection) = gate(session, &sample, &self.config) {
            session.rejections.record(&rejection);
            if rejection.is_invalid_sample() {
                warn!("[SessionRecorder] Dropped invalid sample: {:?}", rejection);
            } else {
                debug!("[SessionRecorder] Dropped low-accuracy sample: {:?}", rejection);
            }
            let stats = session.rejections;
            self.observers.notify_rejected(&rejection, &stats);
            return SampleOutcome::Rejected(rejection);
        }

        let accepted = match self.smoother.as_mut() {
            Some(smoother) => smoother.push(sample),
            None => sample,
        };

        let start = session.effective_start(self.config.elapsed_mode);
        session.metrics = metrics::update(
            &session.metrics,
            session.samples.last(),
            &accepted,
            start,
        );
        session.samples.push(accepted);
        session.last_timestamp = Some(sample.timestamp);

        let snapshot = session.metrics;
        self.observers.notify_metrics(&snapshot);
        SampleOutcome::Accepted(snapshot)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    /// Metrics as of the latest accepted sample (zero when idle or stopped).
    pub fn metrics(&self) -> RouteMetrics {
        self.session.as_ref().map(|s| s.metrics).unwrap_or_default()
    }

    /// Accepted samples of the active session.
    pub fn samples(&self) -> &[GeoSample] {
        self.session
            .as_ref()
            .map(|s| s.samples.as_slice())
            .unwrap_or(&[])
    }

    pub fn rejections(&self) -> RejectionStats {
        self.session.as_ref().map(|s| s.rejections).unwrap_or_default()
    }

    /// Elapsed time for display timers, read from the clock.
    ///
    /// Unlike [`RouteMetrics::elapsed_seconds`] this keeps ticking between
    /// samples. It never mutates the metrics. Under `ExcludePauses` the
    /// display freezes while paused.
    pub fn elapsed_display_seconds(&self) -> f64 {
        let session = match self.session.as_ref() {
            Some(session) => session,
            None => return 0.0,
        };
        let now = self.clock.now_ms();
        let mut elapsed_ms = now.saturating_sub(session.started_at);
        if self.config.elapsed_mode == ElapsedTimeMode::ExcludePauses {
            elapsed_ms = elapsed_ms.saturating_sub(session.paused_total_ms);
            if let Some(since) = session.paused_since {
                elapsed_ms = elapsed_ms.saturating_sub(now.saturating_sub(since));
            }
        }
        (elapsed_ms.max(0)) as f64 / 1000.0
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn expect_state(&self, allowed: &[SessionState], action: &'static str) -> Result<()> {
        if allowed.contains(&self.state) {
            return Ok(());
        }
        warn!("[SessionRecorder] Rejected {} while {}", action, self.state);
        Err(RecorderError::InvalidTransition {
            state: self.state,
            action,
        })
    }

    fn transition(&mut self, next: SessionState) {
        debug!("[SessionRecorder] {} -> {}", self.state, next);
        self.state = next;
        self.observers.notify_state(next);
    }

    fn finalize(&self, session: RecordingSession, ended_at: i64) -> FinalizedRoute {
        let name = self
            .route_name
            .clone()
            .unwrap_or_else(|| default_route_name(self.activity_type, session.started_at));
        let bounds = Bounds::from_samples(&session.samples);

        FinalizedRoute {
            name,
            activity_type: self.activity_type,
            total_distance_m: session.metrics.total_distance_m,
            duration_seconds: session.metrics.elapsed_seconds,
            average_speed_mps: session.metrics.average_speed_mps,
            start_time: session.started_at,
            end_time: ended_at,
            bounds,
            samples: session.samples,
        }
    }
}

/// Validity, accuracy and timestamp checks for a sample.
///
/// Samples stamped inside a pause that has since ended are dropped, so
/// elapsed time under `ExcludePauses` cannot step backwards.
fn gate(
    session: &RecordingSession,
    sample: &GeoSample,
    config: &RecorderConfig,
) -> std::result::Result<(), SampleRejection> {
    filter::check(sample, config.max_accuracy_m)?;

    if let Some(previous) = session.last_timestamp {
        if sample.timestamp <= previous {
            return Err(SampleRejection::NonMonotonicTimestamp {
                previous,
                received: sample.timestamp,
            });
        }
    }

    let tolerance = i64::from(config.clock_tolerance_ms);
    if sample.timestamp < session.started_at.saturating_sub(tolerance) {
        return Err(SampleRejection::BeforeSessionStart {
            session_start: session.started_at,
            received: sample.timestamp,
        });
    }
    if let Some(resumed_at) = session.resumed_at {
        if sample.timestamp < resumed_at.saturating_sub(tolerance) {
            return Err(SampleRejection::BeforeResume {
                resumed_at,
                received: sample.timestamp,
            });
        }
    }
    Ok(())
}

fn close_pause(session: &mut RecordingSession, now: i64) {
    if let Some(since) = session.paused_since.take() {
        let paused = now.saturating_sub(since).max(0);
        session.paused_total_ms = session.paused_total_ms.saturating_add(paused);
    }
}

/// "Running - 2026-10-16" style name from the session start (UTC).
pub fn default_route_name(activity_type: ActivityType, started_at: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(started_at) {
        Some(date) => format!("{} - {}", activity_type.label(), date.format("%Y-%m-%d")),
        None => activity_type.label().to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
