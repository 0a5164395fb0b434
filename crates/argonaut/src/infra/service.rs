//! Narrow capability contract the core consumes from the control plane.
//!
//! Transport (HTTP/SSE) lives outside this crate; everything here is the
//! typed surface the reactive core talks to. Tests substitute the trait
//! with a mock; the binary can wire the in-memory demo plane.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::application::{AppKey, Application};
use crate::domain::diff::ResourceDiff;
use crate::domain::error::{ClassifiedError, classify};
use crate::domain::rollback::RevisionMetadata;
use crate::domain::server::ServerDescriptor;
use crate::domain::tree::ResourceTree;
use crate::infra::watch::{TreeWatchHandle, WatchHandle};

/// Error surface of the service boundary.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The server answered with a non-success HTTP status.
    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        code: Option<String>,
        message: String,
    },
    /// The server could not be reached at all.
    #[error("connection failed: {0}")]
    Connection(String),
    /// The operation's deadline expired.
    #[error("operation timed out: {0}")]
    Timeout(String),
    /// The response could not be interpreted.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl ServiceError {
    /// Maps this error into the display taxonomy.
    pub fn classify(&self) -> ClassifiedError {
        match self {
            ServiceError::Http {
                status,
                code,
                message,
            } => classify(None, Some(*status), code.as_deref(), message),
            ServiceError::Connection(message) => classify(
                Some(crate::domain::error::ErrorCategory::Connection),
                None,
                None,
                message,
            ),
            ServiceError::Timeout(message) => classify(
                Some(crate::domain::error::ErrorCategory::Connection),
                None,
                Some("DEADLINE_EXCEEDED"),
                message,
            ),
            ServiceError::Protocol(message) => classify(None, None, None, message),
        }
    }
}

/// Result of a full application list.
#[derive(Clone, Debug, PartialEq)]
pub struct ListResult {
    pub apps: Vec<Application>,
    pub resource_version: String,
}

/// Parameters for starting an application watch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WatchRequest {
    /// Resume token from the last completed list; `None` starts from now.
    pub resource_version: Option<String>,
    /// Server-side field selectors; empty means the server default.
    pub fields: Vec<String>,
    /// Server-side project filter; empty means all projects.
    pub projects: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncRequest {
    pub prune: bool,
    pub force: bool,
    /// Restrict the sync to specific resources; `None` syncs everything.
    pub resources: Option<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RollbackRequest {
    pub app: AppKey,
    /// Deployment history id to roll back to.
    pub id: i64,
    pub prune: bool,
    pub dry_run: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeleteRequest {
    pub app: AppKey,
    pub cascade: bool,
    pub propagation_policy: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeleteResponse {
    pub message: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeleteResourceRequest {
    pub app: AppKey,
    pub group: String,
    pub kind: String,
    pub namespace: String,
    pub name: String,
    pub force: bool,
}

/// The narrow capability set the core consumes.
///
/// Deadlines are enforced by the task runner wrapping each call, so
/// implementations may block until cancelled.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GitopsService: Send + Sync {
    async fn list_applications(
        &self,
        server: &ServerDescriptor,
    ) -> Result<ListResult, ServiceError>;

    async fn watch_applications(
        &self,
        server: &ServerDescriptor,
        request: WatchRequest,
    ) -> Result<WatchHandle, ServiceError>;

    async fn get_application(
        &self,
        server: &ServerDescriptor,
        app: &AppKey,
    ) -> Result<Application, ServiceError>;

    async fn get_resource_tree(
        &self,
        server: &ServerDescriptor,
        app: &AppKey,
    ) -> Result<ResourceTree, ServiceError>;

    async fn watch_resource_tree(
        &self,
        server: &ServerDescriptor,
        app: &AppKey,
    ) -> Result<TreeWatchHandle, ServiceError>;

    async fn get_resource_diffs(
        &self,
        server: &ServerDescriptor,
        app: &AppKey,
    ) -> Result<Vec<ResourceDiff>, ServiceError>;

    async fn sync_application(
        &self,
        server: &ServerDescriptor,
        app: &AppKey,
        request: SyncRequest,
    ) -> Result<(), ServiceError>;

    async fn refresh_application(
        &self,
        server: &ServerDescriptor,
        app: &AppKey,
        hard: bool,
    ) -> Result<(), ServiceError>;

    async fn rollback_application(
        &self,
        server: &ServerDescriptor,
        request: RollbackRequest,
    ) -> Result<(), ServiceError>;

    async fn delete_application(
        &self,
        server: &ServerDescriptor,
        request: DeleteRequest,
    ) -> Result<DeleteResponse, ServiceError>;

    async fn delete_resource(
        &self,
        server: &ServerDescriptor,
        request: DeleteResourceRequest,
    ) -> Result<(), ServiceError>;

    async fn get_revision_metadata(
        &self,
        server: &ServerDescriptor,
        app: &AppKey,
        revision: &str,
    ) -> Result<RevisionMetadata, ServiceError>;

    async fn get_api_version(&self, server: &ServerDescriptor) -> Result<String, ServiceError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorCategory;

    #[test]
    fn test_http_401_classifies_as_auth() {
        // Arrange
        let error = ServiceError::Http {
            status: 401,
            code: None,
            message: "token rejected".to_string(),
        };

        // Act
        let classified = error.classify();

        // Assert
        assert_eq!(classified.category, ErrorCategory::Auth);
        assert_eq!(classified.status, Some(401));
    }

    #[test]
    fn test_timeout_classifies_as_connection() {
        // Arrange
        let error = ServiceError::Timeout("list applications".to_string());

        // Act
        let classified = error.classify();

        // Assert
        assert_eq!(classified.category, ErrorCategory::Connection);
        assert_eq!(classified.code.as_deref(), Some("DEADLINE_EXCEEDED"));
    }

    #[test]
    fn test_http_410_is_stale_resume_token() {
        // Arrange
        let error = ServiceError::Http {
            status: 410,
            code: None,
            message: "resource version too old".to_string(),
        };

        // Act
        let classified = error.classify();

        // Assert
        assert!(classified.is_stale_resume_token());
    }
}
