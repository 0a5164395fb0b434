//! Outbound actions: every operation becomes one cancellable task that
//! posts exactly one message back onto the bus.

use tokio::sync::mpsc;

use crate::app::App;
use crate::app::message::{ExternalIntent, Message, WatchStarted};
use crate::app::navigation::View;
use crate::app::task::timeouts;
use crate::domain::application::AppKey;
use crate::domain::diff::ResourceDiff;
use crate::domain::error::ClassifiedError;
use crate::domain::rollback::{RollbackRow, RollbackSession, RollbackStage};
use crate::domain::tree::ResourceTree;
use crate::infra::service::{
    DeleteRequest, RollbackRequest, ServiceError, SyncRequest, WatchRequest,
};
use crate::ui::state::app_mode::{
    ActionTarget, ConfirmDeleteState, ConfirmSyncState, Mode,
};

fn timeout_error(operation: &str) -> ClassifiedError {
    ServiceError::Timeout(operation.to_string()).classify()
}

impl App {
    /// Schedules the initial (or re-)list with its short deadline.
    pub(crate) fn spawn_list(&mut self) {
        let Some(server) = self.server.clone() else {
            return;
        };
        let epoch = self.switch_epoch();
        let service = self.service();
        self.tasks.spawn(
            timeouts::LIST,
            async move {
                let result = service
                    .list_applications(&server)
                    .await
                    .map_err(|error| error.classify());

                Message::AppsLoaded { epoch, result }
            },
            move || Message::AppsLoaded {
                epoch,
                result: Err(timeout_error("list applications")),
            },
        );
    }

    pub(crate) fn spawn_api_version_probe(&mut self) {
        let Some(server) = self.server.clone() else {
            return;
        };
        let epoch = self.switch_epoch();
        let service = self.service();
        self.tasks.spawn(
            timeouts::VERSION,
            async move {
                let result = service
                    .get_api_version(&server)
                    .await
                    .map_err(|error| error.classify());

                Message::ApiVersionLoaded { epoch, result }
            },
            move || Message::ApiVersionLoaded {
                epoch,
                result: Err(timeout_error("api version")),
            },
        );
    }

    /// Starts a watch with the current resume token and project filter.
    ///
    /// The previous stream's cleanup travels with the start message and is
    /// invoked only after the new stream is confirmed.
    pub(crate) fn start_watch(&mut self) {
        let Some(server) = self.server.clone() else {
            return;
        };
        let projects = self.scopes.sorted_projects();
        let (generation, sequence, previous_cancel) = self.watch.begin_start(projects.clone());
        let resume = self.watch.resume_token().map(ToString::to_string);
        let epoch = self.switch_epoch();
        let service = self.service();
        self.tasks.spawn(
            timeouts::WATCH_START,
            async move {
                let request = WatchRequest {
                    resource_version: resume,
                    fields: Vec::new(),
                    projects,
                };
                match service.watch_applications(&server, request).await {
                    Ok(handle) => Message::WatchStarted(WatchStarted {
                        epoch,
                        generation,
                        sequence,
                        events: handle.events,
                        cancel: handle.cancel,
                        previous_cancel,
                    }),
                    Err(error) => Message::ApiError(error.classify()),
                }
            },
            || Message::ApiError(timeout_error("watch applications")),
        );
    }

    /// Enters Tree view for `targets`, starting a snapshot fetch and a
    /// tree watch per app.
    pub fn enter_tree(&mut self, targets: Vec<AppKey>) {
        if targets.is_empty() {
            return;
        }
        self.leave_tree();
        if self.nav.view != View::Tree {
            let scopes = self.scopes.clone();
            self.nav.enter_tree(&scopes);
        }
        self.tree_targets = targets.clone();
        self.mode = Mode::Normal;

        let Some(server) = self.server.clone() else {
            return;
        };
        for app in targets {
            let epoch = self.switch_epoch();
            let service = self.service();
            let load_server = server.clone();
            let load_app = app.clone();
            self.tasks.spawn(
                timeouts::TREE,
                async move {
                    let result = service
                        .get_resource_tree(&load_server, &load_app)
                        .await
                        .map_err(|error| error.classify());

                    Message::TreeLoaded {
                        epoch,
                        app: load_app,
                        result,
                    }
                },
                {
                    let app = app.clone();
                    move || Message::TreeLoaded {
                        epoch,
                        app,
                        result: Err(timeout_error("resource tree")),
                    }
                },
            );

            let service = self.service();
            let watch_server = server.clone();
            let watch_app = app.clone();
            self.tasks.spawn(
                timeouts::TREE,
                async move {
                    match service.watch_resource_tree(&watch_server, &watch_app).await {
                        Ok(handle) => Message::TreeWatchStarted {
                            epoch,
                            app: watch_app,
                            trees: handle.trees,
                            cancel: handle.cancel,
                        },
                        Err(error) => Message::ApiError(error.classify()),
                    }
                },
                || Message::ApiError(timeout_error("tree watch")),
            );
        }
    }

    /// Forwards pushed tree snapshots onto the bus until the stream
    /// closes.
    pub(crate) fn spawn_tree_forwarder(
        &self,
        app: AppKey,
        mut trees: mpsc::Receiver<ResourceTree>,
    ) {
        let tx = self.tasks.sender();
        tokio::spawn(async move {
            while let Some(tree) = trees.recv().await {
                if tx
                    .send(Message::TreeSnapshot {
                        app: app.clone(),
                        tree,
                    })
                    .is_err()
                {
                    break;
                }
            }
        });
    }

    /// Fetches diff entries for `app`; routing happens in the handler.
    pub fn request_diff(&mut self, app: AppKey) {
        let Some(server) = self.server.clone() else {
            return;
        };
        self.set_status(format!("Generating diff for {app}…"));
        let epoch = self.switch_epoch();
        let service = self.service();
        let task_app = app.clone();
        self.tasks.spawn(
            timeouts::DIFF,
            async move {
                let result = service
                    .get_resource_diffs(&server, &task_app)
                    .await
                    .map_err(|error| error.classify());

                Message::DiffLoaded {
                    epoch,
                    app: task_app,
                    result,
                }
            },
            move || Message::DiffLoaded {
                epoch,
                app,
                result: Err(timeout_error("diff generation")),
            },
        );
    }

    /// Routes loaded diff entries to the viewer, the diff pane, or the
    /// no-changes screen.
    pub(crate) fn on_diff_loaded(&mut self, app: AppKey, entries: Vec<ResourceDiff>) {
        let changed: Vec<ResourceDiff> = entries
            .into_iter()
            .filter(|entry| entry.has_changes() && !entry.hook)
            .collect();
        if changed.is_empty() {
            self.mode = Mode::NoDiff { app };

            return;
        }

        if let Some(template) = self.config.diff_viewer.clone() {
            match write_diff_inputs(&app, &changed) {
                Ok((left, right)) => {
                    let command = template.replace("{left}", &left).replace("{right}", &right);
                    self.queue_external_job(ExternalIntent::DiffViewer, command);

                    return;
                }
                Err(error) => {
                    self.set_status(format!("Failed to write diff inputs: {error}"));
                }
            }
        }

        self.mode = Mode::Diff {
            app,
            entries: changed,
            scroll: 0,
        };
    }

    /// Opens the sync confirmation for the resolved targets.
    pub fn open_sync_modal(&mut self, mut targets: Vec<AppKey>) {
        let target = match targets.len() {
            0 => return,
            1 => ActionTarget::Single(targets.remove(0)),
            _ => ActionTarget::Multi(targets),
        };
        self.mode = Mode::ConfirmSync(ConfirmSyncState::new(target));
    }

    /// Dispatches the sync task(s) for a committed confirmation.
    pub fn commit_sync(&mut self, state: ConfirmSyncState) {
        let Some(server) = self.server.clone() else {
            return;
        };
        self.mode = Mode::Normal;
        let epoch = self.switch_epoch();
        let service = self.service();
        let request = SyncRequest {
            prune: state.prune,
            force: false,
            resources: None,
        };

        match state.target {
            ActionTarget::Single(app) => {
                self.set_status(format!("Syncing {app}…"));
                let watch = state.watch;
                let task_app = app.clone();
                self.tasks.spawn(
                    timeouts::SYNC,
                    async move {
                        let result = service
                            .sync_application(&server, &task_app, request)
                            .await
                            .map_err(|error| error.classify());

                        Message::SyncCompleted {
                            epoch,
                            app: task_app,
                            watch,
                            result,
                        }
                    },
                    move || Message::SyncCompleted {
                        epoch,
                        app,
                        watch,
                        result: Err(timeout_error("sync")),
                    },
                );
            }
            ActionTarget::Multi(apps) => {
                self.set_status(format!("Syncing {} applications…", apps.len()));
                let watch = state.watch;
                let task_apps = apps.clone();
                self.tasks.spawn(
                    timeouts::SYNC,
                    async move {
                        let mut failures = Vec::new();
                        for app in &task_apps {
                            if let Err(error) = service
                                .sync_application(&server, app, request.clone())
                                .await
                            {
                                failures.push((app.clone(), error.classify()));
                            }
                        }

                        Message::MultiSyncCompleted {
                            epoch,
                            apps: task_apps,
                            watch,
                            failures,
                        }
                    },
                    move || Message::MultiSyncCompleted {
                        epoch,
                        apps: Vec::new(),
                        watch,
                        failures: vec![(
                            AppKey::named("sync"),
                            timeout_error("multi sync"),
                        )],
                    },
                );
            }
        }
    }

    /// Opens the delete confirmation for the resolved targets.
    pub fn open_delete_modal(&mut self, mut targets: Vec<AppKey>) {
        let target = match targets.len() {
            0 => return,
            1 => ActionTarget::Single(targets.remove(0)),
            _ => ActionTarget::Multi(targets),
        };
        self.mode = Mode::ConfirmAppDelete(ConfirmDeleteState::new(target));
    }

    /// Dispatches one delete task per confirmed target.
    pub fn commit_delete(&mut self, state: ConfirmDeleteState) {
        let Some(server) = self.server.clone() else {
            return;
        };
        self.mode = Mode::Normal;
        self.selected.clear();
        for app in state.target.keys() {
            let epoch = self.switch_epoch();
            let service = self.service();
            let request = DeleteRequest {
                app: app.clone(),
                cascade: state.cascade,
                propagation_policy: Some(state.propagation.label().to_string()),
            };
            let task_server = server.clone();
            let task_app = app.clone();
            self.tasks.spawn(
                timeouts::DELETE,
                async move {
                    let result = service
                        .delete_application(&task_server, request)
                        .await
                        .map_err(|error| error.classify());

                    Message::DeleteCompleted {
                        epoch,
                        app: task_app,
                        result,
                    }
                },
                move || Message::DeleteCompleted {
                    epoch,
                    app,
                    result: Err(timeout_error("delete")),
                },
            );
        }
    }

    /// Requests a (non-hard) refresh for `app`.
    pub fn request_refresh(&mut self, app: AppKey) {
        let Some(server) = self.server.clone() else {
            return;
        };
        self.set_status(format!("Refreshing {app}…"));
        let epoch = self.switch_epoch();
        let service = self.service();
        let task_app = app.clone();
        self.tasks.spawn(
            timeouts::GET,
            async move {
                let result = service
                    .refresh_application(&server, &task_app, false)
                    .await
                    .map_err(|error| error.classify());

                Message::RefreshCompleted {
                    epoch,
                    app: task_app,
                    result,
                }
            },
            move || Message::RefreshCompleted {
                epoch,
                app,
                result: Err(timeout_error("refresh")),
            },
        );
    }

    /// Enters the rollback screen and loads deployment history.
    pub fn enter_rollback(&mut self, app: AppKey) {
        let Some(server) = self.server.clone() else {
            return;
        };
        self.rollback = Some(RollbackSession::new(app.clone()));
        self.mode = Mode::Rollback;
        let epoch = self.switch_epoch();
        let service = self.service();
        let task_app = app.clone();
        self.tasks.spawn(
            timeouts::GET,
            async move {
                let result = service
                    .get_application(&server, &task_app)
                    .await
                    .map(|fetched| {
                        let current_revision = fetched
                            .history
                            .iter()
                            .max_by_key(|record| record.id)
                            .map(|record| record.revision.clone());
                        let mut rows: Vec<RollbackRow> = fetched
                            .history
                            .into_iter()
                            .map(RollbackRow::from_record)
                            .collect();
                        rows.sort_by(|a, b| b.id.cmp(&a.id));

                        (rows, current_revision)
                    })
                    .map_err(|error| error.classify());

                Message::HistoryLoaded {
                    epoch,
                    app: task_app,
                    result,
                }
            },
            move || Message::HistoryLoaded {
                epoch,
                app,
                result: Err(timeout_error("deployment history")),
            },
        );
    }

    /// Fetches revision metadata for the given history rows.
    pub(crate) fn spawn_revision_metadata(&mut self, rows: Vec<usize>) {
        let Some(server) = self.server.clone() else {
            return;
        };
        let Some(session) = self.rollback.as_ref() else {
            return;
        };
        let app = session.app.clone();
        for row in rows {
            let Some(revision) = session.rows.get(row).map(|r| r.revision.clone()) else {
                continue;
            };
            let epoch = self.switch_epoch();
            let service = self.service();
            let task_server = server.clone();
            let task_app = app.clone();
            self.tasks.spawn(
                timeouts::METADATA,
                async move {
                    let result = service
                        .get_revision_metadata(&task_server, &task_app, &revision)
                        .await
                        .map_err(|error| error.classify());

                    Message::RevisionMetadataLoaded {
                        epoch,
                        app: task_app,
                        row,
                        result,
                    }
                },
                {
                    let app = app.clone();
                    move || Message::RevisionMetadataLoaded {
                        epoch,
                        app,
                        row,
                        result: Err(timeout_error("revision metadata")),
                    }
                },
            );
        }
    }

    /// Fires the rollback for the selected history row.
    pub fn commit_rollback(&mut self) {
        let Some(server) = self.server.clone() else {
            return;
        };
        let Some(session) = self.rollback.as_mut() else {
            return;
        };
        let Some(row) = session.selected_row() else {
            return;
        };
        let request = RollbackRequest {
            app: session.app.clone(),
            id: row.id,
            prune: session.prune,
            dry_run: session.dry_run,
        };
        let watch = session.watch;
        session.loading = true;
        session.stage = RollbackStage::Confirm;

        let epoch = self.switch_epoch();
        let service = self.service();
        let app = request.app.clone();
        let task_app = app.clone();
        self.tasks.spawn(
            timeouts::ROLLBACK,
            async move {
                let result = service
                    .rollback_application(&server, request)
                    .await
                    .map_err(|error| error.classify());

                Message::RollbackCompleted {
                    epoch,
                    app: task_app,
                    watch,
                    result,
                }
            },
            move || Message::RollbackCompleted {
                epoch,
                app,
                watch,
                result: Err(timeout_error("rollback")),
            },
        );
    }

    /// Opens the argonaut log file in the configured pager.
    pub fn open_logs_pager(&mut self) {
        let pager = self.config.pager.clone().unwrap_or_else(|| "less".to_string());
        let path = self.config.log_file_path();
        self.queue_external_job(
            ExternalIntent::Pager,
            format!("{pager} {}", path.display()),
        );
    }

    /// Runs the configured upgrade command in the background.
    pub fn start_upgrade(&mut self) {
        let Some(command) = self.config.upgrade_command.clone() else {
            self.set_status("No upgrade command configured");

            return;
        };
        self.mode = Mode::Upgrade;
        let epoch = self.switch_epoch();
        self.tasks.spawn(
            timeouts::UPGRADE,
            async move {
                let output = tokio::process::Command::new("sh")
                    .arg("-c")
                    .arg(&command)
                    .output()
                    .await;
                let (success, detail) = match output {
                    Ok(output) if output.status.success() => (true, None),
                    Ok(output) => (
                        false,
                        Some(String::from_utf8_lossy(&output.stderr).trim().to_string()),
                    ),
                    Err(error) => (false, Some(error.to_string())),
                };

                Message::ExternalDone {
                    epoch,
                    intent: ExternalIntent::Upgrade,
                    success,
                    detail,
                }
            },
            move || Message::ExternalDone {
                epoch,
                intent: ExternalIntent::Upgrade,
                success: false,
                detail: Some("upgrade command timed out".to_string()),
            },
        );
    }
}

/// Writes the live/desired documents to per-invocation temp files and
/// returns their paths. Cleanup is left to the OS temp dir policy.
fn write_diff_inputs(
    app: &AppKey,
    entries: &[ResourceDiff],
) -> std::io::Result<(String, String)> {
    let token = uuid::Uuid::new_v4();
    let dir = std::env::temp_dir();
    let left_path = dir.join(format!("argonaut-{token}-{}-live.yaml", app.name));
    let right_path = dir.join(format!("argonaut-{token}-{}-desired.yaml", app.name));

    let mut left = String::new();
    let mut right = String::new();
    for entry in entries {
        left.push_str(&format!("# {}\n{}\n---\n", entry.heading(), entry.normalized_live));
        right.push_str(&format!("# {}\n{}\n---\n", entry.heading(), entry.predicted_live));
    }
    std::fs::write(&left_path, left)?;
    std::fs::write(&right_path, right)?;

    Ok((
        left_path.display().to_string(),
        right_path.display().to_string(),
    ))
}
