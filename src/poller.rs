//! Periodic media player polling.

use crate::cancel::{cancelled, CancellationState};
use crate::source::TrackSource;
use crate::track::TrackSnapshot;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);

/// Where the poller delivers every successfully queried snapshot.
pub trait SnapshotSink {
    fn publish(&self, snapshot: Option<TrackSnapshot>);
}

/// Clears the re-entrancy flag when the query task ends, however it ends.
struct InFlight(Rc<Cell<bool>>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Queries a [`TrackSource`] on a fixed period, never more than one query at a time.
#[derive(Clone)]
pub struct Poller {
    source: Rc<dyn TrackSource>,
    interval: Duration,
    in_flight: Rc<Cell<bool>>,
}

impl Poller {
    pub fn new(source: Rc<dyn TrackSource>, interval: Duration) -> Self {
        Self {
            source,
            interval,
            in_flight: Rc::new(Cell::new(false)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a source query is outstanding right now.
    pub fn is_query_in_flight(&self) -> bool {
        self.in_flight.get()
    }

    /// Handle one timer tick.
    ///
    /// Returns `false` without doing anything when the previous query is still
    /// running. Otherwise starts a query on the local task set; its result is
    /// published to `sink` unless `cancel` has fired by the time it settles.
    pub fn tick(&self, sink: &Rc<dyn SnapshotSink>, cancel: &CancellationState) -> bool {
        if self.in_flight.get() {
            log::debug!("Track query still outstanding, skipping tick");
            return false;
        }
        self.in_flight.set(true);
        let guard = InFlight(Rc::clone(&self.in_flight));

        let source = Rc::clone(&self.source);
        let sink = Rc::clone(sink);
        let cancel = cancel.clone();
        tokio::task::spawn_local(async move {
            let _guard = guard;
            let outcome = source.current_track().await;

            if cancel.is_cancelled() {
                log::debug!("Poller stopped during track query, dropping result");
                return;
            }

            match outcome {
                Ok(snapshot) => sink.publish(snapshot),
                Err(e) => log::warn!("Failed to query the media player: {e}"),
            }
        });

        true
    }

    /// Run the tick loop until `cancel` fires. The first tick is immediate.
    ///
    /// # Panics
    ///
    /// Panics if the interval is zero, or when called outside a
    /// [`tokio::task::LocalSet`].
    pub fn spawn(&self, sink: Rc<dyn SnapshotSink>, cancel: CancellationState) -> JoinHandle<()> {
        let poller = self.clone();
        tokio::task::spawn_local(async move {
            let mut cancel_rx = cancel.subscribe();
            let mut ticker = tokio::time::interval(poller.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            log::debug!("Polling every {:?}", poller.interval);
            loop {
                tokio::select! {
                    biased;
                    _ = cancelled(&mut cancel_rx) => {
                        log::debug!("Poll loop stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        poller.tick(&sink, &cancel);
                    }
                }
            }
        })
    }
}
