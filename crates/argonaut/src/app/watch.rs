//! Watch coordination: one active subscription, generational restarts,
//! scope-filter debouncing, and burst coalescing.
//!
//! The coordinator owns the bookkeeping only; I/O happens in tasks. A
//! forwarder task copies service events into an internal buffered channel,
//! and a consumer task drains that channel in 500 ms windows, emitting one
//! [`AppsBatch`] per window. Continuations are gated by generation so a
//! consumer bound to a replaced stream never schedules a successor.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::app::message::{Message, WatchStarted};
use crate::domain::application::{AppKey, Application};
use crate::infra::watch::WatchEvent;

/// Coalescing window for batchable watch events.
pub const BATCH_WINDOW: Duration = Duration::from_millis(500);
/// Quiet period after a scope change before the watch is restarted.
pub const SCOPE_DEBOUNCE: Duration = Duration::from_millis(500);
/// Internal buffer between the forwarder and the consumer.
const FORWARD_CAPACITY: usize = 128;

/// One store mutation extracted from a batchable watch event.
#[derive(Clone, Debug, PartialEq)]
pub enum BatchOp {
    Upsert(Application),
    Delete(AppKey),
}

impl BatchOp {
    fn from_event(event: WatchEvent) -> Option<Self> {
        match event {
            WatchEvent::Updated(app) => Some(BatchOp::Upsert(app)),
            WatchEvent::Deleted(key) => Some(BatchOp::Delete(key)),
            _ => None,
        }
    }
}

/// One coalesced window of watch events.
///
/// `operations` preserves arrival order; `immediate` holds the first
/// non-batchable event seen in the window, re-dispatched after the
/// operations are applied.
#[derive(Debug)]
pub struct AppsBatch {
    pub generation: u64,
    pub operations: Vec<BatchOp>,
    pub immediate: Option<WatchEvent>,
}

/// Shared handle to the internal event channel consumed in batches.
pub type SharedEventStream = Arc<tokio::sync::Mutex<mpsc::Receiver<WatchEvent>>>;

/// Outcome of offering a `WatchStarted` message to the coordinator.
pub enum StartOutcome {
    /// The start lost to a later one; its stream was cancelled.
    Superseded,
    /// The start was installed; stale tokens to cancel after wiring.
    Installed { stale: Vec<CancellationToken> },
}

/// Bookkeeping for the single active application watch.
pub struct WatchCoordinator {
    generation: u64,
    scope_version: u64,
    start_sequence: u64,
    accepted_sequence: u64,
    scope_projects: Vec<String>,
    last_resource_version: Option<String>,
    active_cancel: Option<CancellationToken>,
    forward_done: Option<CancellationToken>,
    stream: Option<SharedEventStream>,
}

impl WatchCoordinator {
    pub fn new() -> Self {
        Self {
            generation: 0,
            scope_version: 0,
            start_sequence: 0,
            accepted_sequence: 0,
            scope_projects: Vec::new(),
            last_resource_version: None,
            active_cancel: None,
            forward_done: None,
            stream: None,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn scope_projects(&self) -> &[String] {
        &self.scope_projects
    }

    pub fn resume_token(&self) -> Option<&str> {
        self.last_resource_version.as_deref()
    }

    /// Records the resume token from the last completed list.
    pub fn set_resume_token(&mut self, resource_version: String) {
        self.last_resource_version = Some(resource_version);
    }

    /// Reserves a new generation and start sequence for a watch start and
    /// records the filter it subscribes with.
    ///
    /// Returns `(generation, sequence, previous_cleanup)`; the previous
    /// cleanup travels with the start task so the old stream is stopped
    /// only once the new one is confirmed.
    pub fn begin_start(
        &mut self,
        projects: Vec<String>,
    ) -> (u64, u64, Option<CancellationToken>) {
        self.generation += 1;
        self.start_sequence += 1;
        self.scope_projects = projects;

        (
            self.generation,
            self.start_sequence,
            self.active_cancel.clone(),
        )
    }

    /// Installs a confirmed watch start, spawning its forwarder.
    ///
    /// When two starts race, only the highest sequence wins; the loser's
    /// fresh stream is cancelled on the spot. Stale tokens returned by the
    /// winner must be cancelled by the caller after the new consumer is
    /// scheduled, preserving the no-gap ordering.
    pub fn accept_start(&mut self, started: WatchStarted) -> StartOutcome {
        let WatchStarted {
            sequence,
            events,
            cancel,
            previous_cancel,
            ..
        } = started;
        if sequence < self.accepted_sequence {
            cancel.cancel();

            return StartOutcome::Superseded;
        }
        self.accepted_sequence = sequence;

        let done = CancellationToken::new();
        let (forward_tx, forward_rx) = mpsc::channel(FORWARD_CAPACITY);
        spawn_forwarder(events, forward_tx, done.clone());

        let mut stale = Vec::new();
        if let Some(old_done) = self.forward_done.replace(done) {
            stale.push(old_done);
        }
        if let Some(old_cancel) = self.active_cancel.replace(cancel) {
            stale.push(old_cancel);
        }
        if let Some(previous) = previous_cancel {
            stale.push(previous);
        }
        self.stream = Some(Arc::new(tokio::sync::Mutex::new(forward_rx)));

        StartOutcome::Installed { stale }
    }

    /// Returns the shared stream for consumer scheduling.
    pub fn stream(&self) -> Option<SharedEventStream> {
        self.stream.clone()
    }

    /// Bumps the scope version for a changed filter; returns the debounce
    /// version to schedule, or `None` when the filter already matches the
    /// subscription.
    pub fn scope_changed(&mut self, projects: &[String]) -> Option<u64> {
        if projects == self.scope_projects.as_slice() {
            return None;
        }
        self.scope_version += 1;

        Some(self.scope_version)
    }

    /// Returns whether a debounce tick is still the latest one.
    pub fn debounce_is_current(&self, version: u64) -> bool {
        version == self.scope_version
    }

    /// Stops the active stream and forwarder.
    pub fn shutdown(&mut self) {
        if let Some(done) = self.forward_done.take() {
            done.cancel();
        }
        if let Some(cancel) = self.active_cancel.take() {
            cancel.cancel();
        }
        self.stream = None;
    }
}

impl Default for WatchCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies service events into the internal channel until the service
/// stream closes or `done` fires. Dropping the sender closes the internal
/// channel, which terminates the consumer.
fn spawn_forwarder(
    mut events: mpsc::Receiver<WatchEvent>,
    tx: mpsc::Sender<WatchEvent>,
    done: CancellationToken,
) {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                () = done.cancelled() => break,
                event = events.recv() => {
                    let Some(event) = event else {
                        break;
                    };
                    if tx.send(event).await.is_err() {
                        break;
                    }
                }
            }
        }
    });
}

/// Schedules one consumer run; it posts at most one [`Message::AppsBatch`]
/// and terminates.
pub fn schedule_consumer(
    stream: SharedEventStream,
    generation: u64,
    tx: mpsc::UnboundedSender<Message>,
) {
    tokio::spawn(async move {
        if let Some(batch) = consume_events(stream, generation).await {
            let _ = tx.send(Message::AppsBatch(batch));
        }
    });
}

/// Drains one batching window from the stream.
///
/// Blocks for the first event; returns `None` when the channel closed with
/// nothing pending. An immediate first event flushes alone. Otherwise
/// batchable events accumulate until the window expires or the channel
/// closes, remembering the first immediate seen along the way.
pub async fn consume_events(stream: SharedEventStream, generation: u64) -> Option<AppsBatch> {
    let mut rx = stream.lock().await;
    let first = rx.recv().await?;

    if !first.is_batchable() {
        return Some(AppsBatch {
            generation,
            operations: Vec::new(),
            immediate: Some(first),
        });
    }

    let mut operations: Vec<BatchOp> = BatchOp::from_event(first).into_iter().collect();
    let mut immediate = None;
    let deadline = tokio::time::Instant::now() + BATCH_WINDOW;

    loop {
        let event = tokio::select! {
            event = rx.recv() => event,
            () = tokio::time::sleep_until(deadline) => break,
        };
        let Some(event) = event else {
            break;
        };
        if event.is_batchable() {
            if let Some(op) = BatchOp::from_event(event) {
                operations.push(op);
            }
        } else if immediate.is_none() {
            immediate = Some(event);
        }
    }

    Some(AppsBatch {
        generation,
        operations,
        immediate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::application::SyncStatus;
    use crate::domain::error::{ClassifiedError, ErrorCategory};
    use crate::infra::demo::seed_application;

    fn shared_stream() -> (mpsc::Sender<WatchEvent>, SharedEventStream) {
        let (tx, rx) = mpsc::channel(FORWARD_CAPACITY);

        (tx, Arc::new(tokio::sync::Mutex::new(rx)))
    }

    #[tokio::test(start_paused = true)]
    async fn test_consumer_returns_nothing_when_channel_closes_empty() {
        // Arrange
        let (tx, stream) = shared_stream();
        drop(tx);

        // Act
        let batch = consume_events(stream, 1).await;

        // Assert
        assert!(batch.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_first_event_flushes_alone() {
        // Arrange
        let (tx, stream) = shared_stream();
        let error = ClassifiedError::new(ErrorCategory::Auth, "401");
        tx.send(WatchEvent::AuthError(error.clone()))
            .await
            .expect("send should succeed");
        tx.send(WatchEvent::Updated(seed_application("a", "c", "ns", "p")))
            .await
            .expect("send should succeed");

        // Act
        let batch = consume_events(stream, 4).await.expect("batch expected");

        // Assert: only the immediate, no operations drained
        assert!(batch.operations.is_empty());
        assert_eq!(batch.immediate, Some(WatchEvent::AuthError(error)));
        assert_eq!(batch.generation, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_coalesces_in_arrival_order() {
        // Arrange
        let (tx, stream) = shared_stream();
        let mut a = seed_application("a", "c", "ns", "p");
        a.sync = SyncStatus::OutOfSync;
        tx.send(WatchEvent::Updated(a.clone()))
            .await
            .expect("send should succeed");
        tx.send(WatchEvent::Deleted(AppKey::named("b")))
            .await
            .expect("send should succeed");
        tx.send(WatchEvent::Updated(seed_application("d", "c", "ns", "p")))
            .await
            .expect("send should succeed");
        drop(tx);

        // Act
        let batch = consume_events(stream, 2).await.expect("batch expected");

        // Assert
        assert_eq!(batch.operations.len(), 3);
        assert!(matches!(&batch.operations[0], BatchOp::Upsert(app) if app.name == "a"));
        assert!(
            matches!(&batch.operations[1], BatchOp::Delete(key) if *key == AppKey::named("b"))
        );
        assert!(matches!(&batch.operations[2], BatchOp::Upsert(app) if app.name == "d"));
        assert!(batch.immediate.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_remembers_first_immediate_after_operations() {
        // Arrange
        let (tx, stream) = shared_stream();
        tx.send(WatchEvent::Updated(seed_application("a", "c", "ns", "p")))
            .await
            .expect("send should succeed");
        tx.send(WatchEvent::StatusChanged("first".to_string()))
            .await
            .expect("send should succeed");
        tx.send(WatchEvent::StatusChanged("second".to_string()))
            .await
            .expect("send should succeed");
        drop(tx);

        // Act
        let batch = consume_events(stream, 1).await.expect("batch expected");

        // Assert
        assert_eq!(batch.operations.len(), 1);
        assert_eq!(
            batch.immediate,
            Some(WatchEvent::StatusChanged("first".to_string()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_expiry_flushes_while_stream_stays_open() {
        // Arrange
        let (tx, stream) = shared_stream();
        tx.send(WatchEvent::Updated(seed_application("a", "c", "ns", "p")))
            .await
            .expect("send should succeed");

        // Act: no close; the 500 ms window must flush on its own
        let batch = consume_events(stream, 1).await.expect("batch expected");

        // Assert
        assert_eq!(batch.operations.len(), 1);
        drop(tx);
    }

    #[test]
    fn test_scope_changed_only_fires_on_filter_difference() {
        // Arrange
        let mut coordinator = WatchCoordinator::new();
        coordinator.begin_start(vec!["p1".to_string()]);

        // Act & Assert
        assert_eq!(coordinator.scope_changed(&["p1".to_string()]), None);
        assert_eq!(coordinator.scope_changed(&["p2".to_string()]), Some(1));
        assert_eq!(coordinator.scope_changed(&["p3".to_string()]), Some(2));
        assert!(!coordinator.debounce_is_current(1));
        assert!(coordinator.debounce_is_current(2));
    }

    #[test]
    fn test_begin_start_bumps_generation_and_sequence() {
        // Arrange
        let mut coordinator = WatchCoordinator::new();

        // Act
        let (first_generation, first_sequence, previous) =
            coordinator.begin_start(Vec::new());
        let (second_generation, second_sequence, _) = coordinator.begin_start(Vec::new());

        // Assert
        assert_eq!((first_generation, first_sequence), (1, 1));
        assert_eq!((second_generation, second_sequence), (2, 2));
        assert!(previous.is_none());
    }

    #[tokio::test]
    async fn test_accept_start_discards_superseded_sequences() {
        // Arrange
        let mut coordinator = WatchCoordinator::new();
        let (_, winner_sequence, _) = {
            coordinator.begin_start(Vec::new());
            coordinator.begin_start(Vec::new())
        };
        let (_loser_tx, loser_rx) = mpsc::channel(1);
        let (_winner_tx, winner_rx) = mpsc::channel(1);
        let loser_cancel = CancellationToken::new();

        // Act: the later start lands first
        let winner = coordinator.accept_start(WatchStarted {
            epoch: 0,
            generation: 2,
            sequence: winner_sequence,
            events: winner_rx,
            cancel: CancellationToken::new(),
            previous_cancel: None,
        });
        let loser = coordinator.accept_start(WatchStarted {
            epoch: 0,
            generation: 1,
            sequence: 1,
            events: loser_rx,
            cancel: loser_cancel.clone(),
            previous_cancel: None,
        });

        // Assert
        assert!(matches!(winner, StartOutcome::Installed { .. }));
        assert!(matches!(loser, StartOutcome::Superseded));
        assert!(loser_cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_accept_start_returns_replaced_stream_tokens_as_stale() {
        // Arrange
        let mut coordinator = WatchCoordinator::new();
        coordinator.begin_start(Vec::new());
        let (_first_tx, first_rx) = mpsc::channel(1);
        let first_cancel = CancellationToken::new();
        coordinator.accept_start(WatchStarted {
            epoch: 0,
            generation: 1,
            sequence: 1,
            events: first_rx,
            cancel: first_cancel.clone(),
            previous_cancel: None,
        });
        let (_, sequence, previous) = coordinator.begin_start(Vec::new());
        let (_second_tx, second_rx) = mpsc::channel(1);

        // Act
        let outcome = coordinator.accept_start(WatchStarted {
            epoch: 0,
            generation: 2,
            sequence,
            events: second_rx,
            cancel: CancellationToken::new(),
            previous_cancel: previous,
        });

        // Assert: the old stream's tokens are handed back, not yet fired
        let StartOutcome::Installed { stale } = outcome else {
            unreachable!("start must install");
        };
        assert!(!first_cancel.is_cancelled());
        assert!(stale.iter().any(|token| {
            token.cancel();
            first_cancel.is_cancelled()
        }));
    }
}
