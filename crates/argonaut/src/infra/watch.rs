//! Watch stream event union and cancellable stream handles.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::domain::application::{AppKey, Application};
use crate::domain::error::ClassifiedError;
use crate::domain::tree::ResourceTree;

/// One event pushed by the application watch stream.
#[derive(Clone, Debug, PartialEq)]
pub enum WatchEvent {
    /// A full application list snapshot with its resume token.
    AppsLoaded {
        apps: Vec<Application>,
        resource_version: String,
    },
    /// An application was created or modified.
    Updated(Application),
    /// An application was removed.
    Deleted(AppKey),
    /// A human-readable connection status change.
    StatusChanged(String),
    /// The stream hit an authentication failure.
    AuthError(ClassifiedError),
    /// The stream hit a non-auth API failure.
    ApiError(ClassifiedError),
}

impl WatchEvent {
    /// Returns whether the event may be coalesced into a batch.
    ///
    /// Upserts and deletes batch; everything else is immediate and must
    /// flush on its own.
    pub fn is_batchable(&self) -> bool {
        matches!(self, WatchEvent::Updated(_) | WatchEvent::Deleted(_))
    }
}

/// An active application watch: its event channel plus the cleanup token
/// that tears the upstream subscription down.
pub struct WatchHandle {
    pub events: mpsc::Receiver<WatchEvent>,
    pub cancel: CancellationToken,
}

/// An active per-app resource-tree watch.
pub struct TreeWatchHandle {
    pub trees: mpsc::Receiver<ResourceTree>,
    pub cancel: CancellationToken,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::{ClassifiedError, ErrorCategory};

    #[test]
    fn test_batchable_classification() {
        // Arrange
        let update = WatchEvent::Updated(crate::infra::demo::seed_application("api", "c", "ns", "p"));
        let delete = WatchEvent::Deleted(AppKey::named("api"));
        let status = WatchEvent::StatusChanged("reconnected".to_string());
        let auth = WatchEvent::AuthError(ClassifiedError::new(ErrorCategory::Auth, "401"));

        // Assert
        assert!(update.is_batchable());
        assert!(delete.is_batchable());
        assert!(!status.is_batchable());
        assert!(!auth.is_batchable());
    }
}
