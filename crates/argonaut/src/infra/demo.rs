//! In-memory demo control plane.
//!
//! Backs the `--demo` flag so the full UI loop is exercisable without an
//! upstream, and doubles as a deterministic fixture for integration-style
//! tests. State lives behind one mutex; watchers are plain channel senders
//! registered per subscription.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::domain::application::{AppKey, Application, DeploymentRecord, HealthStatus, SyncStatus};
use crate::domain::diff::ResourceDiff;
use crate::domain::rollback::RevisionMetadata;
use crate::domain::server::ServerDescriptor;
use crate::domain::tree::{ResourceTree, TreeNode};
use crate::infra::service::{
    DeleteRequest, DeleteResourceRequest, DeleteResponse, GitopsService, ListResult,
    RollbackRequest, ServiceError, SyncRequest, WatchRequest,
};
use crate::infra::watch::{TreeWatchHandle, WatchEvent, WatchHandle};

const WATCH_CHANNEL_CAPACITY: usize = 64;
const DEMO_ACTIVITY_INTERVAL: Duration = Duration::from_secs(3);

/// Builds a demo application with sensible defaults.
pub fn seed_application(name: &str, cluster: &str, namespace: &str, project: &str) -> Application {
    Application {
        name: name.to_string(),
        app_namespace: None,
        cluster: cluster.to_string(),
        namespace: namespace.to_string(),
        project: project.to_string(),
        app_set: None,
        sync: SyncStatus::Synced,
        health: HealthStatus::Healthy,
        resource_version: "1".to_string(),
        history: (0..3)
            .map(|id| DeploymentRecord {
                id,
                revision: format!("{name}-rev-{id}"),
                deployed_at: None,
            })
            .collect(),
    }
}

struct DemoWatcher {
    projects: Vec<String>,
    tx: mpsc::Sender<WatchEvent>,
}

struct DemoState {
    apps: Vec<Application>,
    resource_version: u64,
    watchers: Vec<DemoWatcher>,
    activity_cursor: usize,
}

impl DemoState {
    fn bump_version(&mut self) -> String {
        self.resource_version += 1;

        self.resource_version.to_string()
    }

    fn broadcast(&mut self, project: &str, event: &WatchEvent) {
        self.watchers.retain(|watcher| {
            if !watcher.projects.is_empty() && !watcher.projects.iter().any(|p| p == project) {
                return true;
            }

            watcher.tx.try_send(event.clone()).is_ok()
        });
    }
}

/// A self-contained control plane holding a handful of applications.
pub struct DemoControlPlane {
    state: Arc<Mutex<DemoState>>,
    /// Emit periodic demo activity on each watch stream.
    animate: bool,
}

impl DemoControlPlane {
    pub fn new(animate: bool) -> Self {
        let apps = vec![
            seed_application("guestbook", "prod-east", "default", "default"),
            seed_application("billing-api", "prod-east", "billing", "payments"),
            seed_application("billing-worker", "prod-east", "billing", "payments"),
            seed_application("metrics-agent", "prod-west", "observability", "platform"),
            seed_application("ingress", "prod-west", "network", "platform"),
            seed_application("staging-portal", "staging", "web", "web"),
        ];

        Self {
            state: Arc::new(Mutex::new(DemoState {
                apps,
                resource_version: 1,
                watchers: Vec::new(),
                activity_cursor: 0,
            })),
            animate,
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, DemoState>, ServiceError> {
        self.state
            .lock()
            .map_err(|_| ServiceError::Protocol("demo state poisoned".to_string()))
    }

    fn find_app(state: &DemoState, app: &AppKey) -> Result<Application, ServiceError> {
        state
            .apps
            .iter()
            .find(|candidate| candidate.key() == *app)
            .cloned()
            .ok_or_else(|| ServiceError::Http {
                status: 404,
                code: Some("NOT_FOUND".to_string()),
                message: format!("application {app} not found"),
            })
    }

    /// Flips one app between synced and drifted and broadcasts the update.
    fn animate_step(state: &Arc<Mutex<DemoState>>) {
        let Ok(mut guard) = state.lock() else {
            return;
        };
        if guard.apps.is_empty() {
            return;
        }
        let index = guard.activity_cursor % guard.apps.len();
        guard.activity_cursor += 1;
        let version = guard.bump_version();
        let app = &mut guard.apps[index];
        if app.sync == SyncStatus::Synced {
            app.sync = SyncStatus::OutOfSync;
            app.health = HealthStatus::Progressing;
        } else {
            app.sync = SyncStatus::Synced;
            app.health = HealthStatus::Healthy;
        }
        app.resource_version = version;
        let project = app.project.clone();
        let event = WatchEvent::Updated(app.clone());
        guard.broadcast(&project, &event);
    }

    fn mark_synced(&self, app: &AppKey) -> Result<(), ServiceError> {
        let mut state = self.lock()?;
        let version = state.bump_version();
        let Some(target) = state
            .apps
            .iter_mut()
            .find(|candidate| candidate.key() == *app)
        else {
            return Err(ServiceError::Http {
                status: 404,
                code: Some("NOT_FOUND".to_string()),
                message: format!("application {app} not found"),
            });
        };
        target.sync = SyncStatus::Synced;
        target.health = HealthStatus::Healthy;
        target.resource_version = version;
        let project = target.project.clone();
        let event = WatchEvent::Updated(target.clone());
        state.broadcast(&project, &event);

        Ok(())
    }
}

#[async_trait]
impl GitopsService for DemoControlPlane {
    async fn list_applications(
        &self,
        _server: &ServerDescriptor,
    ) -> Result<ListResult, ServiceError> {
        let state = self.lock()?;

        Ok(ListResult {
            apps: state.apps.clone(),
            resource_version: state.resource_version.to_string(),
        })
    }

    async fn watch_applications(
        &self,
        _server: &ServerDescriptor,
        request: WatchRequest,
    ) -> Result<WatchHandle, ServiceError> {
        let (tx, rx) = mpsc::channel(WATCH_CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();
        {
            let mut state = self.lock()?;
            state.watchers.push(DemoWatcher {
                projects: request.projects,
                tx: tx.clone(),
            });
        }

        if self.animate {
            let state = Arc::clone(&self.state);
            let stream_cancel = cancel.clone();
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(DEMO_ACTIVITY_INTERVAL);
                interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
                loop {
                    tokio::select! {
                        () = stream_cancel.cancelled() => break,
                        _ = interval.tick() => Self::animate_step(&state),
                    }
                }
                drop(tx);
            });
        }

        Ok(WatchHandle { events: rx, cancel })
    }

    async fn get_application(
        &self,
        _server: &ServerDescriptor,
        app: &AppKey,
    ) -> Result<Application, ServiceError> {
        let state = self.lock()?;

        Self::find_app(&state, app)
    }

    async fn get_resource_tree(
        &self,
        _server: &ServerDescriptor,
        app: &AppKey,
    ) -> Result<ResourceTree, ServiceError> {
        let state = self.lock()?;
        let found = Self::find_app(&state, app)?;

        Ok(demo_tree(&found))
    }

    async fn watch_resource_tree(
        &self,
        server: &ServerDescriptor,
        app: &AppKey,
    ) -> Result<TreeWatchHandle, ServiceError> {
        let tree = self.get_resource_tree(server, app).await?;
        let (tx, rx) = mpsc::channel(WATCH_CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();
        let stream_cancel = cancel.clone();
        tokio::spawn(async move {
            let _ = tx.send(tree).await;
            stream_cancel.cancelled().await;
        });

        Ok(TreeWatchHandle { trees: rx, cancel })
    }

    async fn get_resource_diffs(
        &self,
        _server: &ServerDescriptor,
        app: &AppKey,
    ) -> Result<Vec<ResourceDiff>, ServiceError> {
        let state = self.lock()?;
        let found = Self::find_app(&state, app)?;
        let drifted = found.sync == SyncStatus::OutOfSync;

        Ok(vec![ResourceDiff {
            group: "apps".to_string(),
            kind: "Deployment".to_string(),
            namespace: found.namespace.clone(),
            name: found.name.clone(),
            hook: false,
            normalized_live: format!("replicas: {}", if drifted { 2 } else { 3 }),
            predicted_live: "replicas: 3".to_string(),
            target: "replicas: 3".to_string(),
            live: format!("replicas: {}", if drifted { 2 } else { 3 }),
        }])
    }

    async fn sync_application(
        &self,
        _server: &ServerDescriptor,
        app: &AppKey,
        _request: SyncRequest,
    ) -> Result<(), ServiceError> {
        self.mark_synced(app)
    }

    async fn refresh_application(
        &self,
        _server: &ServerDescriptor,
        app: &AppKey,
        _hard: bool,
    ) -> Result<(), ServiceError> {
        let state = self.lock()?;
        Self::find_app(&state, app).map(|_| ())
    }

    async fn rollback_application(
        &self,
        _server: &ServerDescriptor,
        request: RollbackRequest,
    ) -> Result<(), ServiceError> {
        self.mark_synced(&request.app)
    }

    async fn delete_application(
        &self,
        _server: &ServerDescriptor,
        request: DeleteRequest,
    ) -> Result<DeleteResponse, ServiceError> {
        let mut state = self.lock()?;
        let Some(position) = state
            .apps
            .iter()
            .position(|candidate| candidate.key() == request.app)
        else {
            return Err(ServiceError::Http {
                status: 404,
                code: Some("NOT_FOUND".to_string()),
                message: format!("application {} not found", request.app),
            });
        };
        let removed = state.apps.remove(position);
        let event = WatchEvent::Deleted(removed.key());
        state.broadcast(&removed.project, &event);

        Ok(DeleteResponse {
            message: Some(format!("application {} deleted", removed.name)),
        })
    }

    async fn delete_resource(
        &self,
        _server: &ServerDescriptor,
        request: DeleteResourceRequest,
    ) -> Result<(), ServiceError> {
        let state = self.lock()?;
        Self::find_app(&state, &request.app).map(|_| ())
    }

    async fn get_revision_metadata(
        &self,
        _server: &ServerDescriptor,
        _app: &AppKey,
        revision: &str,
    ) -> Result<RevisionMetadata, ServiceError> {
        Ok(RevisionMetadata {
            author: "demo@argonaut".to_string(),
            date: None,
            message: format!("deploy {revision}"),
        })
    }

    async fn get_api_version(&self, _server: &ServerDescriptor) -> Result<String, ServiceError> {
        Ok("v2.9.3+demo".to_string())
    }
}

fn demo_tree(app: &Application) -> ResourceTree {
    let deploy_uid = format!("{}-deploy", app.name);
    let rs_uid = format!("{}-rs", app.name);

    ResourceTree {
        app: app.name.clone(),
        nodes: vec![
            TreeNode {
                uid: deploy_uid.clone(),
                group: "apps".to_string(),
                kind: "Deployment".to_string(),
                namespace: app.namespace.clone(),
                name: app.name.clone(),
                parent_uid: None,
                health: Some(app.health),
            },
            TreeNode {
                uid: rs_uid.clone(),
                group: "apps".to_string(),
                kind: "ReplicaSet".to_string(),
                namespace: app.namespace.clone(),
                name: format!("{}-6d9f", app.name),
                parent_uid: Some(deploy_uid),
                health: Some(app.health),
            },
            TreeNode {
                uid: format!("{}-pod", app.name),
                group: String::new(),
                kind: "Pod".to_string(),
                namespace: app.namespace.clone(),
                name: format!("{}-6d9f-x2c4", app.name),
                parent_uid: Some(rs_uid),
                health: Some(app.health),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> ServerDescriptor {
        ServerDescriptor::new("https://demo", "token")
    }

    #[tokio::test]
    async fn test_list_returns_seeded_apps_with_resource_version() {
        // Arrange
        let plane = DemoControlPlane::new(false);

        // Act
        let listed = plane
            .list_applications(&server())
            .await
            .expect("list should succeed");

        // Assert
        assert_eq!(listed.apps.len(), 6);
        assert_eq!(listed.resource_version, "1");
    }

    #[tokio::test]
    async fn test_delete_broadcasts_to_matching_watcher() {
        // Arrange
        let plane = DemoControlPlane::new(false);
        let mut handle = plane
            .watch_applications(&server(), WatchRequest::default())
            .await
            .expect("watch should start");

        // Act
        plane
            .delete_application(
                &server(),
                DeleteRequest {
                    app: AppKey::named("guestbook"),
                    cascade: true,
                    propagation_policy: None,
                },
            )
            .await
            .expect("delete should succeed");

        // Assert
        let event = handle.events.recv().await.expect("event expected");
        assert_eq!(event, WatchEvent::Deleted(AppKey::named("guestbook")));
    }

    #[tokio::test]
    async fn test_project_filtered_watcher_skips_other_projects() {
        // Arrange
        let plane = DemoControlPlane::new(false);
        let mut handle = plane
            .watch_applications(
                &server(),
                WatchRequest {
                    projects: vec!["platform".to_string()],
                    ..WatchRequest::default()
                },
            )
            .await
            .expect("watch should start");

        // Act
        plane
            .sync_application(&server(), &AppKey::named("guestbook"), SyncRequest::default())
            .await
            .expect("sync should succeed");
        plane
            .sync_application(
                &server(),
                &AppKey::named("metrics-agent"),
                SyncRequest::default(),
            )
            .await
            .expect("sync should succeed");

        // Assert: only the platform-project update arrives
        let event = handle.events.recv().await.expect("event expected");
        let updated_name = match event {
            WatchEvent::Updated(app) => Some(app.name),
            _ => None,
        };
        assert_eq!(updated_name.as_deref(), Some("metrics-agent"));
    }

    #[tokio::test]
    async fn test_sync_marks_app_synced_and_healthy() {
        // Arrange
        let plane = DemoControlPlane::new(false);

        // Act
        plane
            .sync_application(&server(), &AppKey::named("guestbook"), SyncRequest::default())
            .await
            .expect("sync should succeed");
        let app = plane
            .get_application(&server(), &AppKey::named("guestbook"))
            .await
            .expect("get should succeed");

        // Assert
        assert_eq!(app.sync, SyncStatus::Synced);
        assert_eq!(app.health, HealthStatus::Healthy);
    }
}
