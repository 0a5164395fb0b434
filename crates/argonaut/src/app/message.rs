//! The typed message bus: every state change is one of these.

use crossterm::event::KeyEvent;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::app::watch::AppsBatch;
use crate::domain::application::AppKey;
use crate::domain::diff::ResourceDiff;
use crate::domain::error::ClassifiedError;
use crate::domain::rollback::{RevisionMetadata, RollbackRow};
use crate::domain::tree::ResourceTree;
use crate::infra::service::{DeleteResponse, ListResult};
use crate::infra::watch::WatchEvent;

/// What an external-process handoff was for; selects the completion
/// handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExternalIntent {
    Pager,
    DiffViewer,
    Upgrade,
}

/// Coordination payload for a confirmed watch start.
///
/// Carries the new stream, its cleanup token, and the cleanup of the
/// stream it replaces so the old one is stopped only after the new one is
/// wired.
pub struct WatchStarted {
    pub epoch: u64,
    pub generation: u64,
    pub sequence: u64,
    pub events: mpsc::Receiver<WatchEvent>,
    pub cancel: CancellationToken,
    pub previous_cancel: Option<CancellationToken>,
}

/// Every message the update loop dispatches.
///
/// Async task results carry the switch epoch captured at dispatch time;
/// the update loop drops results whose epoch is stale.
pub enum Message {
    /// Raw key input from the terminal reader thread.
    Key(KeyEvent),
    /// Render/spinner tick.
    Tick,
    /// Initial or re-list completed.
    AppsLoaded {
        epoch: u64,
        result: Result<ListResult, ClassifiedError>,
    },
    /// A watch subscription is confirmed started.
    WatchStarted(WatchStarted),
    /// A coalesced window of watch events.
    AppsBatch(AppsBatch),
    /// An immediate watch event re-dispatched outside a batch.
    WatchImmediate(WatchEvent),
    /// Resource tree fetched for an app.
    TreeLoaded {
        epoch: u64,
        app: AppKey,
        result: Result<ResourceTree, ClassifiedError>,
    },
    /// Per-app tree watch is running.
    TreeWatchStarted {
        epoch: u64,
        app: AppKey,
        trees: mpsc::Receiver<ResourceTree>,
        cancel: CancellationToken,
    },
    /// A pushed tree snapshot from an active tree watch.
    TreeSnapshot { app: AppKey, tree: ResourceTree },
    /// Diff entries fetched for an app.
    DiffLoaded {
        epoch: u64,
        app: AppKey,
        result: Result<Vec<ResourceDiff>, ClassifiedError>,
    },
    SyncCompleted {
        epoch: u64,
        app: AppKey,
        watch: bool,
        result: Result<(), ClassifiedError>,
    },
    MultiSyncCompleted {
        epoch: u64,
        apps: Vec<AppKey>,
        watch: bool,
        failures: Vec<(AppKey, ClassifiedError)>,
    },
    RefreshCompleted {
        epoch: u64,
        app: AppKey,
        result: Result<(), ClassifiedError>,
    },
    /// Deployment history for the rollback screen.
    HistoryLoaded {
        epoch: u64,
        app: AppKey,
        result: Result<(Vec<RollbackRow>, Option<String>), ClassifiedError>,
    },
    /// Lazily fetched git metadata for one history row.
    RevisionMetadataLoaded {
        epoch: u64,
        app: AppKey,
        row: usize,
        result: Result<RevisionMetadata, ClassifiedError>,
    },
    RollbackCompleted {
        epoch: u64,
        app: AppKey,
        watch: bool,
        result: Result<(), ClassifiedError>,
    },
    DeleteCompleted {
        epoch: u64,
        app: AppKey,
        result: Result<DeleteResponse, ClassifiedError>,
    },
    ApiVersionLoaded {
        epoch: u64,
        result: Result<String, ClassifiedError>,
    },
    /// Human-readable connection status for the status line.
    StatusChanged(String),
    /// Promoted authentication failure.
    AuthError(ClassifiedError),
    /// Non-auth API failure.
    ApiError(ClassifiedError),
    /// Scope-filter debounce tick; acted on only when `version` is still
    /// current.
    ScopeDebounce { version: u64 },
    /// Stop drawing frames while an external process owns the terminal.
    PauseRendering,
    ResumeRendering,
    /// An external process returned the terminal.
    ExternalDone {
        epoch: u64,
        intent: ExternalIntent,
        success: bool,
        detail: Option<String>,
    },
    Quit,
}

impl Message {
    /// Returns the switch epoch this message was started under, when it
    /// is an async task result subject to gating.
    pub fn epoch(&self) -> Option<u64> {
        match self {
            Message::AppsLoaded { epoch, .. }
            | Message::WatchStarted(WatchStarted { epoch, .. })
            | Message::TreeLoaded { epoch, .. }
            | Message::TreeWatchStarted { epoch, .. }
            | Message::DiffLoaded { epoch, .. }
            | Message::SyncCompleted { epoch, .. }
            | Message::MultiSyncCompleted { epoch, .. }
            | Message::RefreshCompleted { epoch, .. }
            | Message::HistoryLoaded { epoch, .. }
            | Message::RevisionMetadataLoaded { epoch, .. }
            | Message::RollbackCompleted { epoch, .. }
            | Message::DeleteCompleted { epoch, .. }
            | Message::ApiVersionLoaded { epoch, .. }
            | Message::ExternalDone { epoch, .. } => Some(*epoch),
            _ => None,
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Key(_) => "key",
            Message::Tick => "tick",
            Message::AppsLoaded { .. } => "apps-loaded",
            Message::WatchStarted(_) => "watch-started",
            Message::AppsBatch(_) => "apps-batch",
            Message::WatchImmediate(_) => "watch-immediate",
            Message::TreeLoaded { .. } => "tree-loaded",
            Message::TreeWatchStarted { .. } => "tree-watch-started",
            Message::TreeSnapshot { .. } => "tree-snapshot",
            Message::DiffLoaded { .. } => "diff-loaded",
            Message::SyncCompleted { .. } => "sync-completed",
            Message::MultiSyncCompleted { .. } => "multi-sync-completed",
            Message::RefreshCompleted { .. } => "refresh-completed",
            Message::HistoryLoaded { .. } => "history-loaded",
            Message::RevisionMetadataLoaded { .. } => "revision-metadata-loaded",
            Message::RollbackCompleted { .. } => "rollback-completed",
            Message::DeleteCompleted { .. } => "delete-completed",
            Message::ApiVersionLoaded { .. } => "api-version-loaded",
            Message::StatusChanged(_) => "status-changed",
            Message::AuthError(_) => "auth-error",
            Message::ApiError(_) => "api-error",
            Message::ScopeDebounce { .. } => "scope-debounce",
            Message::PauseRendering => "pause-rendering",
            Message::ResumeRendering => "resume-rendering",
            Message::ExternalDone { .. } => "external-done",
            Message::Quit => "quit",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_is_present_only_on_gated_results() {
        // Arrange
        let gated = Message::AppsLoaded {
            epoch: 3,
            result: Ok(ListResult {
                apps: Vec::new(),
                resource_version: "1".to_string(),
            }),
        };
        let ungated = Message::StatusChanged("ok".to_string());

        // Assert
        assert_eq!(gated.epoch(), Some(3));
        assert_eq!(ungated.epoch(), None);
    }
}
