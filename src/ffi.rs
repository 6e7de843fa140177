//! FFI bindings for mobile platforms (iOS/Android).
//!
//! Exposes a recorder object and a listener callback interface to Kotlin
//! and Swift through UniFFI. Free functions are prefixed with `ffi_` to
//! avoid naming conflicts with the internal API.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};

use log::info;

use crate::{
    init_logging, to_gpx, to_json, ActivityType, FinalizedRoute, GeoSample, MetricsObserver,
    RecorderConfig, RejectionStats, Result, RouteMetrics, SampleRejection, SessionRecorder,
    SessionState,
};

// ============================================================================
// Listener Callback Interface
// ============================================================================

/// Implement in Kotlin/Swift to receive live updates.
///
/// Callbacks run after the recorder lock is released, so a listener may call
/// back into the [`FfiRecorder`] that notified it.
#[uniffi::export(callback_interface)]
pub trait RecordingListener: Send + Sync {
    /// Called after every accepted sample.
    fn on_metrics(&self, metrics: RouteMetrics);
    /// Called when a sample is dropped, with the running counts.
    fn on_sample_rejected(&self, rejection: SampleRejection, stats: RejectionStats);
    /// Called after every lifecycle transition.
    fn on_state_changed(&self, state: SessionState);
}

#[derive(Debug, Clone, Copy)]
enum RecorderEvent {
    Metrics(RouteMetrics),
    Rejected(SampleRejection, RejectionStats),
    State(SessionState),
}

type EventQueue = Arc<Mutex<VecDeque<RecorderEvent>>>;

/// Observer registered on the inner recorder. Only queues events; delivery
/// happens in [`FfiRecorder::dispatch`].
struct QueueingObserver(EventQueue);

impl QueueingObserver {
    fn push(&self, event: RecorderEvent) {
        lock(&self.0).push_back(event);
    }
}

impl MetricsObserver for QueueingObserver {
    fn on_metrics(&mut self, metrics: &RouteMetrics) {
        self.push(RecorderEvent::Metrics(*metrics));
    }

    fn on_sample_rejected(&mut self, rejection: &SampleRejection, stats: &RejectionStats) {
        self.push(RecorderEvent::Rejected(*rejection, *stats));
    }

    fn on_state_changed(&mut self, state: SessionState) {
        self.push(RecorderEvent::State(state));
    }
}

/// Lock a mutex, recovering the data if a previous holder panicked.
/// A panic in a listener must not brick the session.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ============================================================================
// Recorder Object
// ============================================================================

/// Thread-safe handle around a [`SessionRecorder`].
#[derive(uniffi::Object)]
pub struct FfiRecorder {
    inner: Mutex<SessionRecorder>,
    events: EventQueue,
    listeners: Mutex<Vec<Arc<dyn RecordingListener>>>,
    /// Held while events are delivered, keeps delivery in order
    dispatching: Mutex<()>,
}

impl FfiRecorder {
    /// Run `f` on the recorder, then deliver the events it produced once
    /// the recorder lock is released.
    fn with_recorder<T>(&self, f: impl FnOnce(&mut SessionRecorder) -> T) -> T {
        let out = {
            let mut recorder = lock(&self.inner);
            f(&mut recorder)
        };
        self.dispatch();
        out
    }

    fn dispatch(&self) {
        loop {
            // A listener that re-enters the recorder lands here with the
            // guard already held; the outer loop delivers its events.
            let guard = match self.dispatching.try_lock() {
                Ok(guard) => guard,
                Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
                Err(TryLockError::WouldBlock) => return,
            };
            loop {
                // Queue lock is released before any listener runs
                let next = lock(&self.events).pop_front();
                let Some(event) = next else { break };
                let listeners = lock(&self.listeners).clone();
                for listener in &listeners {
                    match event {
                        RecorderEvent::Metrics(metrics) => listener.on_metrics(metrics),
                        RecorderEvent::Rejected(rejection, stats) => {
                            listener.on_sample_rejected(rejection, stats)
                        }
                        RecorderEvent::State(state) => listener.on_state_changed(state),
                    }
                }
            }
            drop(guard);

            // Another thread may have queued events after the last pop but
            // before the guard was released.
            if lock(&self.events).is_empty() {
                return;
            }
        }
    }
}

#[uniffi::export]
impl FfiRecorder {
    /// Create a recorder. `name` overrides the generated route name.
    #[uniffi::constructor]
    pub fn new(
        config: RecorderConfig,
        activity_type: ActivityType,
        name: Option<String>,
    ) -> Result<Arc<Self>> {
        init_logging();
        config.validate()?;
        info!(
            "[TrackRecorderRust] New recorder for {} (max accuracy {}m)",
            activity_type.label(),
            config.max_accuracy_m
        );
        let events = EventQueue::default();
        let mut recorder = SessionRecorder::new(config).with_activity(activity_type, name);
        recorder.subscribe(QueueingObserver(Arc::clone(&events)));
        Ok(Arc::new(Self {
            inner: Mutex::new(recorder),
            events,
            listeners: Mutex::new(Vec::new()),
            dispatching: Mutex::new(()),
        }))
    }

    /// Register a listener. Listeners stay registered for the recorder's life.
    pub fn add_listener(&self, listener: Box<dyn RecordingListener>) {
        lock(&self.listeners).push(Arc::from(listener));
    }

    pub fn start(&self) -> Result<()> {
        self.with_recorder(|r| r.start())
    }

    pub fn pause(&self) -> Result<()> {
        self.with_recorder(|r| r.pause())
    }

    pub fn resume(&self) -> Result<()> {
        self.with_recorder(|r| r.resume())
    }

    pub fn stop(&self) -> Result<FinalizedRoute> {
        self.with_recorder(|r| r.stop())
    }

    /// Feed a location sample. Returns true if it was accepted.
    pub fn push_sample(&self, sample: GeoSample) -> bool {
        self.with_recorder(|r| r.on_sample(sample).is_accepted())
    }

    pub fn state(&self) -> SessionState {
        lock(&self.inner).state()
    }

    pub fn metrics(&self) -> RouteMetrics {
        lock(&self.inner).metrics()
    }

    pub fn rejections(&self) -> RejectionStats {
        lock(&self.inner).rejections()
    }

    /// Elapsed seconds for the on-screen timer.
    pub fn elapsed_display_seconds(&self) -> f64 {
        lock(&self.inner).elapsed_display_seconds()
    }
}

// ============================================================================
// Export Functions
// ============================================================================

/// Serialize a finalized route as GPX 1.1.
#[uniffi::export]
pub fn ffi_route_to_gpx(route: FinalizedRoute) -> Result<String> {
    to_gpx(&route)
}

/// Serialize a finalized route as pretty JSON.
#[uniffi::export]
pub fn ffi_route_to_json(route: FinalizedRoute) -> Result<String> {
    to_json(&route)
}

/// Parse and validate a JSON configuration from the host app.
#[uniffi::export]
pub fn ffi_parse_config(json: String) -> Result<RecorderConfig> {
    RecorderConfig::from_json(&json)
}
