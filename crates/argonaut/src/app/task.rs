//! Cancellable async task execution: one task, one message.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::app::message::Message;

/// Nominal per-operation deadlines.
pub mod timeouts {
    use std::time::Duration;

    pub const LIST: Duration = Duration::from_secs(5);
    pub const GET: Duration = Duration::from_secs(10);
    pub const TREE: Duration = Duration::from_secs(10);
    pub const METADATA: Duration = Duration::from_secs(10);
    pub const DIFF: Duration = Duration::from_secs(45);
    pub const SYNC: Duration = Duration::from_secs(60);
    pub const ROLLBACK: Duration = Duration::from_secs(60);
    pub const DELETE: Duration = Duration::from_secs(30);
    pub const WATCH_START: Duration = Duration::from_secs(10);
    pub const VERSION: Duration = Duration::from_secs(10);
    pub const UPGRADE: Duration = Duration::from_secs(120);
}

/// Runs tasks that each produce exactly one [`Message`] on the bus.
///
/// Tasks never mutate shared state; the dispatcher applies their result.
/// A task abandoned by a context switch keeps running until its deadline,
/// and its late message is discarded by the epoch gate.
#[derive(Clone)]
pub struct TaskRunner {
    tx: mpsc::UnboundedSender<Message>,
}

impl TaskRunner {
    pub fn new(tx: mpsc::UnboundedSender<Message>) -> Self {
        Self { tx }
    }

    /// Returns a sender for collaborators that post messages directly
    /// (watch forwarders, the runtime loop).
    pub fn sender(&self) -> mpsc::UnboundedSender<Message> {
        self.tx.clone()
    }

    /// Spawns `work` with a deadline; `on_timeout` supplies the message
    /// emitted when the deadline expires first.
    pub fn spawn<F, T>(&self, deadline: Duration, work: F, on_timeout: T)
    where
        F: Future<Output = Message> + Send + 'static,
        T: FnOnce() -> Message + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let message = match tokio::time::timeout(deadline, work).await {
                Ok(message) => message,
                Err(_) => on_timeout(),
            };
            let _ = tx.send(message);
        });
    }

    /// Sends `message` after `delay`; used for debounce ticks.
    pub fn schedule<T>(&self, delay: Duration, message: T)
    where
        T: FnOnce() -> Message + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(message());
        });
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_spawn_delivers_the_task_message() {
        // Arrange
        let (tx, mut rx) = mpsc::unbounded_channel();
        let runner = TaskRunner::new(tx);

        // Act
        runner.spawn(
            Duration::from_secs(5),
            async { Message::StatusChanged("done".to_string()) },
            || Message::StatusChanged("timeout".to_string()),
        );

        // Assert
        let message = rx.recv().await.expect("message expected");
        assert!(matches!(message, Message::StatusChanged(text) if text == "done"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_emits_timeout_message_when_deadline_expires() {
        // Arrange
        let (tx, mut rx) = mpsc::unbounded_channel();
        let runner = TaskRunner::new(tx);

        // Act: the work sleeps past the deadline
        runner.spawn(
            Duration::from_millis(100),
            async {
                tokio::time::sleep(Duration::from_secs(60)).await;

                Message::StatusChanged("late".to_string())
            },
            || Message::StatusChanged("timeout".to_string()),
        );

        // Assert
        let message = rx.recv().await.expect("message expected");
        assert!(matches!(message, Message::StatusChanged(text) if text == "timeout"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_fires_after_the_delay() {
        // Arrange
        let (tx, mut rx) = mpsc::unbounded_channel();
        let runner = TaskRunner::new(tx);

        // Act
        runner.schedule(Duration::from_millis(500), || Message::ScopeDebounce {
            version: 7,
        });
        tokio::time::advance(Duration::from_millis(499)).await;
        let early = rx.try_recv();
        tokio::time::advance(Duration::from_millis(2)).await;

        // Assert
        assert!(early.is_err());
        let message = rx.recv().await.expect("message expected");
        assert!(matches!(message, Message::ScopeDebounce { version: 7 }));
    }
}
