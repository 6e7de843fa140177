//! Metrics subscriptions.
//!
//! The recorder pushes an immutable [`RouteMetrics`] snapshot to every
//! registered observer after each accepted sample. Closures and mpsc
//! senders can be registered directly.

use std::sync::mpsc::Sender;

use log::debug;

use crate::session::SessionState;
use crate::{RejectionStats, RouteMetrics, SampleRejection};

/// Receives updates from a [`SessionRecorder`](crate::SessionRecorder).
pub trait MetricsObserver: Send {
    /// Called after every accepted sample.
    fn on_metrics(&mut self, metrics: &RouteMetrics);

    /// Called when a sample is dropped, with the session's running counts.
    fn on_sample_rejected(&mut self, _rejection: &SampleRejection, _stats: &RejectionStats) {}

    /// Called after every successful lifecycle transition.
    fn on_state_changed(&mut self, _state: SessionState) {}
}

impl<F> MetricsObserver for F
where
    F: FnMut(&RouteMetrics) + Send,
{
    fn on_metrics(&mut self, metrics: &RouteMetrics) {
        self(metrics)
    }
}

impl MetricsObserver for Sender<RouteMetrics> {
    fn on_metrics(&mut self, metrics: &RouteMetrics) {
        // A dropped receiver just means nobody is listening any more
        if self.send(*metrics).is_err() {
            debug!("[Observer] metrics receiver disconnected");
        }
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Registered observers in subscription order.
#[derive(Default)]
pub(crate) struct ObserverSet {
    next_id: u64,
    observers: Vec<(SubscriptionId, Box<dyn MetricsObserver>)>,
}

impl ObserverSet {
    pub(crate) fn subscribe(&mut self, observer: Box<dyn MetricsObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    pub(crate) fn notify_metrics(&mut self, metrics: &RouteMetrics) {
        for (_, observer) in &mut self.observers {
            observer.on_metrics(metrics);
        }
    }

    pub(crate) fn notify_rejected(&mut self, rejection: &SampleRejection, stats: &RejectionStats) {
        for (_, observer) in &mut self.observers {
            observer.on_sample_rejected(rejection, stats);
        }
    }

    pub(crate) fn notify_state(&mut self, state: SessionState) {
        for (_, observer) in &mut self.observers {
            observer.on_state_changed(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_closure_and_channel_observers() {
        let mut set = ObserverSet::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        set.subscribe(Box::new(move |m: &RouteMetrics| {
            sink.lock().unwrap().push(m.total_distance_m)
        }));

        let (tx, rx) = mpsc::channel();
        set.subscribe(Box::new(tx));

        let metrics = RouteMetrics {
            total_distance_m: 42.0,
            ..RouteMetrics::default()
        };
        set.notify_metrics(&metrics);

        assert_eq!(*seen.lock().unwrap(), vec![42.0]);
        assert_eq!(rx.try_recv().unwrap().total_distance_m, 42.0);
    }

    #[test]
    fn test_unsubscribe() {
        let mut set = ObserverSet::default();
        let id = set.subscribe(Box::new(|_: &RouteMetrics| {}));
        let other = set.subscribe(Box::new(|_: &RouteMetrics| {}));
        assert_eq!(set.len(), 2);

        assert!(set.unsubscribe(id));
        assert!(!set.unsubscribe(id));
        assert_eq!(set.len(), 1);
        assert!(set.unsubscribe(other));
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn test_disconnected_channel_is_ignored() {
        let mut set = ObserverSet::default();
        let (tx, rx) = mpsc::channel::<RouteMetrics>();
        drop(rx);
        set.subscribe(Box::new(tx));
        set.notify_metrics(&RouteMetrics::default());
    }
}
