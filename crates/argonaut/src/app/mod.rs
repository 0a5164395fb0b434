//! App-layer composition root: all mutable state plus the single-writer
//! message dispatcher.
//!
//! Exactly one `dispatch` runs at a time (the runtime loop owns the
//! receiver), handlers never block, and long work leaves through
//! [`TaskRunner`] as a task that posts one message back.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub mod autocomplete;
pub mod command;
pub mod message;
pub mod navigation;
mod ops;
pub mod store;
pub mod task;
pub mod watch;

use crate::app::message::{ExternalIntent, Message, WatchStarted};
use crate::app::navigation::{Navigator, View};
use crate::app::store::{AppStore, SortSpec, VisibleItems};
use crate::app::task::TaskRunner;
use crate::app::watch::{AppsBatch, BatchOp, StartOutcome, WatchCoordinator, schedule_consumer};
use crate::domain::application::AppKey;
use crate::domain::error::{ClassifiedError, ErrorCategory};
use crate::domain::input::InputState;
use crate::domain::rollback::RollbackSession;
use crate::domain::scope::ScopeSet;
use crate::domain::server::ServerDescriptor;
use crate::domain::tree::ResourceTree;
use crate::infra::config::ArgonautConfig;
use crate::infra::service::GitopsService;
use crate::infra::watch::WatchEvent;
use crate::ui::state::app_mode::Mode;
use crate::ui::style::Theme;

/// An external process the runtime must hand the terminal to.
pub struct ExternalJob {
    pub intent: ExternalIntent,
    /// Shell command line, run via `sh -c`.
    pub command: String,
    pub epoch: u64,
}

/// Stores all application state and coordinates the reactive core.
pub struct App {
    pub mode: Mode,
    pub nav: Navigator,
    pub store: AppStore,
    pub scopes: ScopeSet,
    /// Multi-action selection, orthogonal to scopes.
    pub selected: BTreeSet<AppKey>,
    pub sort: SortSpec,
    /// Committed text filter applied last in derivation.
    pub filter: String,
    pub search_input: InputState,
    pub command_input: InputState,
    pub status_line: String,
    pub last_error: Option<ClassifiedError>,
    pub server: Option<ServerDescriptor>,
    pub config: ArgonautConfig,
    pub theme: Theme,
    /// Tree snapshots cached per app while in Tree view.
    pub trees: HashMap<AppKey, ResourceTree>,
    pub tree_targets: Vec<AppKey>,
    tree_watchers: HashMap<AppKey, CancellationToken>,
    pub rollback: Option<RollbackSession>,
    pub rendering_paused: bool,
    pending_external: Option<ExternalJob>,
    pub should_quit: bool,
    pub spinner_frame: usize,
    /// First key of a two-key chord (`gg`), if pending.
    pub pending_key: Option<char>,
    switch_epoch: u64,
    pub(crate) watch: WatchCoordinator,
    pub(crate) tasks: TaskRunner,
    service: Arc<dyn GitopsService>,
}

impl App {
    /// Builds the app state; no tasks are started until a server
    /// descriptor is set.
    pub fn new(
        service: Arc<dyn GitopsService>,
        config: ArgonautConfig,
    ) -> (Self, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let theme = config
            .theme
            .as_deref()
            .and_then(Theme::by_name)
            .unwrap_or_default();

        let app = Self {
            mode: Mode::Login,
            nav: Navigator::new(),
            store: AppStore::new(),
            scopes: ScopeSet::default(),
            selected: BTreeSet::new(),
            sort: SortSpec::default(),
            filter: String::new(),
            search_input: InputState::new(),
            command_input: InputState::new(),
            status_line: String::new(),
            last_error: None,
            server: None,
            config,
            theme,
            trees: HashMap::new(),
            tree_targets: Vec::new(),
            tree_watchers: HashMap::new(),
            rollback: None,
            rendering_paused: false,
            pending_external: None,
            should_quit: false,
            spinner_frame: 0,
            pending_key: None,
            switch_epoch: 0,
            watch: WatchCoordinator::new(),
            tasks: TaskRunner::new(tx),
            service,
        };

        (app, rx)
    }

    pub fn switch_epoch(&self) -> u64 {
        self.switch_epoch
    }

    pub(crate) fn service(&self) -> Arc<dyn GitopsService> {
        Arc::clone(&self.service)
    }

    /// Replaces the server descriptor, invalidating all in-flight results,
    /// and kicks off the initial list.
    pub fn set_server(&mut self, server: ServerDescriptor) {
        self.server = Some(server);
        self.switch_epoch += 1;
        self.watch.shutdown();
        self.mode = Mode::Loading;
        self.set_status("Connecting…");
        self.spawn_list();
        self.spawn_api_version_probe();
    }

    /// The filter in effect for derivation: the live search text while
    /// typing, the committed filter otherwise.
    pub fn active_filter(&self) -> &str {
        if matches!(self.mode, Mode::Search) {
            self.search_input.text()
        } else {
            &self.filter
        }
    }

    /// Derives the list the UI renders for the current view.
    pub fn visible(&self) -> VisibleItems {
        self.store
            .visible_items(self.nav.view, &self.scopes, self.sort, self.active_filter())
    }

    /// Returns the application under the cursor in Apps view.
    pub fn cursor_app(&self) -> Option<AppKey> {
        match self.visible() {
            VisibleItems::Apps(apps) => apps.get(self.nav.cursor).map(|app| app.key()),
            VisibleItems::Values(_) => None,
        }
    }

    /// Resolves the target for action verbs: explicit argument, else the
    /// selection set, else the cursor row.
    pub fn action_targets(&self) -> Vec<AppKey> {
        if !self.selected.is_empty() {
            return self.selected.iter().cloned().collect();
        }

        self.cursor_app().into_iter().collect()
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status_line = status.into();
    }

    /// Hands out a queued external-process job, if any.
    pub fn take_external_job(&mut self) -> Option<ExternalJob> {
        self.pending_external.take()
    }

    pub(crate) fn queue_external_job(&mut self, intent: ExternalIntent, command: String) {
        self.pending_external = Some(ExternalJob {
            intent,
            command,
            epoch: self.switch_epoch,
        });
        self.mode = Mode::External;
    }

    /// Applies one message; the only mutation path into this state.
    pub fn dispatch(&mut self, message: Message) {
        if let Some(epoch) = message.epoch()
            && epoch < self.switch_epoch
        {
            tracing::debug!(kind = message.kind(), epoch, "dropping stale message");
            // A dropped start still owns a live stream; tear it down
            // instead of leaking it.
            match message {
                Message::WatchStarted(started) => started.cancel.cancel(),
                Message::TreeWatchStarted { cancel, .. } => cancel.cancel(),
                _ => {}
            }

            return;
        }

        match message {
            // Keys are routed to mode handlers by the runtime before
            // reaching this dispatcher.
            Message::Key(_) => {}
            Message::Tick => {
                if !self.rendering_paused {
                    self.spinner_frame = self.spinner_frame.wrapping_add(1);
                }
            }
            Message::AppsLoaded { result, .. } => match result {
                Ok(list) => self.on_apps_loaded(list),
                Err(error) => self.route_error(error),
            },
            Message::WatchStarted(started) => self.on_watch_started(started),
            Message::AppsBatch(batch) => self.on_apps_batch(batch),
            Message::WatchImmediate(event) => self.on_watch_immediate(event),
            Message::TreeLoaded { app, result, .. } => match result {
                Ok(tree) => {
                    if self.nav.view == View::Tree {
                        self.trees.insert(app, tree);
                    }
                }
                Err(error) => self.route_error(error),
            },
            Message::TreeWatchStarted {
                app, trees, cancel, ..
            } => self.on_tree_watch_started(app, trees, cancel),
            Message::TreeSnapshot { app, tree } => {
                if self.tree_watchers.contains_key(&app) {
                    self.trees.insert(app, tree);
                }
            }
            Message::DiffLoaded { app, result, .. } => match result {
                Ok(entries) => self.on_diff_loaded(app, entries),
                Err(error) => self.route_error(error),
            },
            Message::SyncCompleted {
                app, watch, result, ..
            } => match result {
                Ok(()) => {
                    self.set_status(format!("Sync requested for {app}"));
                    if self.mode == Mode::Loading {
                        self.mode = Mode::Normal;
                    }
                    if watch {
                        self.enter_tree(vec![app]);
                    }
                }
                Err(error) => self.route_error(error),
            },
            Message::MultiSyncCompleted {
                apps,
                watch,
                failures,
                ..
            } => self.on_multi_sync_completed(apps, watch, failures),
            Message::RefreshCompleted { app, result, .. } => match result {
                Ok(()) => self.set_status(format!("Refresh requested for {app}")),
                Err(error) => self.route_error(error),
            },
            Message::HistoryLoaded { app, result, .. } => self.on_history_loaded(app, result),
            Message::RevisionMetadataLoaded {
                app, row, result, ..
            } => {
                if let Ok(metadata) = result
                    && let Some(session) = self.rollback.as_mut()
                    && session.app == app
                {
                    session.apply_metadata(row, metadata);
                }
            }
            Message::RollbackCompleted {
                app, watch, result, ..
            } => self.on_rollback_completed(app, watch, result),
            Message::DeleteCompleted { app, result, .. } => match result {
                Ok(response) => {
                    let detail = response
                        .message
                        .unwrap_or_else(|| format!("Delete requested for {app}"));
                    self.set_status(detail);
                }
                Err(error) => self.route_error(error),
            },
            Message::ApiVersionLoaded { result, .. } => {
                if let Ok(version) = result {
                    if version.starts_with("core") {
                        self.mode = Mode::CoreDetected { version };
                    } else {
                        tracing::info!(%version, "control plane version");
                    }
                }
            }
            Message::StatusChanged(status) => self.set_status(status),
            Message::AuthError(error) => self.on_auth_error(error),
            Message::ApiError(error) => self.on_api_error(error),
            Message::ScopeDebounce { version } => self.on_scope_debounce(version),
            Message::PauseRendering => self.rendering_paused = true,
            Message::ResumeRendering => self.rendering_paused = false,
            Message::ExternalDone {
                intent,
                success,
                detail,
                ..
            } => self.on_external_done(intent, success, detail),
            Message::Quit => self.should_quit = true,
        }
    }

    fn on_apps_loaded(&mut self, list: crate::infra::service::ListResult) {
        self.watch.set_resume_token(list.resource_version.clone());
        self.store.replace_all(list.apps, &list.resource_version);
        self.nav.clamp_cursor(self.visible().len());
        if self.mode == Mode::Loading {
            self.mode = Mode::Normal;
        }
        self.start_watch();
    }

    fn on_watch_started(&mut self, started: WatchStarted) {
        let generation = started.generation;
        match self.watch.accept_start(started) {
            StartOutcome::Superseded => {}
            StartOutcome::Installed { stale } => {
                if let Some(stream) = self.watch.stream() {
                    schedule_consumer(stream, generation, self.tasks.sender());
                }
                // Old stream teardown strictly after the new consumer is
                // wired, so no events fall in the gap.
                for token in stale {
                    token.cancel();
                }
                self.set_status("Watching for changes…");
            }
        }
    }

    fn on_apps_batch(&mut self, batch: AppsBatch) {
        for operation in batch.operations {
            match operation {
                BatchOp::Upsert(app) => self.store.upsert(app),
                BatchOp::Delete(key) => {
                    self.selected.remove(&key);
                    self.store.delete(&key);
                }
            }
        }
        self.nav.clamp_cursor(self.visible().len());

        if let Some(immediate) = batch.immediate {
            self.dispatch(Message::WatchImmediate(immediate));
        }

        // Stale generations apply their mutations (idempotent) but must
        // not schedule another consumer for a replaced channel.
        if batch.generation == self.watch.generation()
            && let Some(stream) = self.watch.stream()
        {
            schedule_consumer(stream, batch.generation, self.tasks.sender());
        }
    }

    fn on_watch_immediate(&mut self, event: WatchEvent) {
        match event {
            WatchEvent::AppsLoaded {
                apps,
                resource_version,
            } => {
                self.watch.set_resume_token(resource_version.clone());
                self.store.replace_all(apps, &resource_version);
                self.nav.clamp_cursor(self.visible().len());
            }
            WatchEvent::Updated(app) => self.store.upsert(app),
            WatchEvent::Deleted(key) => self.store.delete(&key),
            WatchEvent::StatusChanged(status) => self.set_status(status),
            WatchEvent::AuthError(error) => self.on_auth_error(error),
            WatchEvent::ApiError(error) => self.on_api_error(error),
        }
    }

    fn on_auth_error(&mut self, error: ClassifiedError) {
        if self.mode == Mode::AuthRequired {
            tracing::debug!(message = %error.message, "suppressing auth error while re-authenticating");

            return;
        }
        self.last_error = Some(error);
        self.mode = Mode::AuthRequired;
    }

    fn on_api_error(&mut self, error: ClassifiedError) {
        if error.is_auth() {
            self.on_auth_error(error);

            return;
        }
        if error.is_stale_resume_token() {
            // The resume token aged out; re-list and restart the watch.
            self.set_status("Watch expired, reloading…");
            self.spawn_list();

            return;
        }
        self.route_error(error);
    }

    /// Routes a classified error per its category.
    pub(crate) fn route_error(&mut self, error: ClassifiedError) {
        match error.category {
            ErrorCategory::Auth => self.on_auth_error(error),
            ErrorCategory::Validation => {
                self.set_status(error.message);
            }
            ErrorCategory::Connection => {
                if self.mode == Mode::Loading {
                    self.last_error = Some(error);
                    self.mode = Mode::ConnectionError;
                } else {
                    self.set_status(format!("Connection error: {}", error.message));
                }
            }
            ErrorCategory::Api
            | ErrorCategory::NotFound
            | ErrorCategory::Conflict
            | ErrorCategory::Internal => {
                if self.mode == Mode::AuthRequired {
                    tracing::debug!(message = %error.message, "suppressing error over auth prompt");

                    return;
                }
                self.last_error = Some(error);
                self.mode = Mode::Error;
            }
        }
    }

    fn on_scope_debounce(&mut self, version: u64) {
        if !self.watch.debounce_is_current(version) {
            return;
        }
        let projects = self.scopes.sorted_projects();
        if projects == self.watch.scope_projects() {
            return;
        }
        self.start_watch();
    }

    fn on_multi_sync_completed(
        &mut self,
        apps: Vec<AppKey>,
        watch: bool,
        failures: Vec<(AppKey, ClassifiedError)>,
    ) {
        self.selected.clear();
        if let Some((key, error)) = failures.into_iter().next() {
            self.set_status(format!("Sync failed for {key}"));
            self.route_error(error);

            return;
        }
        self.set_status(format!("Sync requested for {} applications", apps.len()));
        self.mode = Mode::Normal;
        if watch {
            self.enter_tree(apps);
        }
    }

    fn on_history_loaded(
        &mut self,
        app: AppKey,
        result: Result<
            (Vec<crate::domain::rollback::RollbackRow>, Option<String>),
            ClassifiedError,
        >,
    ) {
        let Some(session) = self.rollback.as_mut() else {
            return;
        };
        if session.app != app {
            return;
        }
        match result {
            Ok((rows, current_revision)) => {
                let scheduled = session.apply_history(rows, current_revision);
                self.spawn_revision_metadata(scheduled);
            }
            Err(error) => {
                session.loading = false;
                session.error = Some(error.message.clone());
            }
        }
    }

    fn on_rollback_completed(
        &mut self,
        app: AppKey,
        watch: bool,
        result: Result<(), ClassifiedError>,
    ) {
        match result {
            Ok(()) => {
                self.rollback = None;
                self.mode = Mode::Normal;
                self.set_status(format!("Rollback requested for {app}"));
                if watch {
                    self.enter_tree(vec![app]);
                }
            }
            Err(error) => {
                if let Some(session) = self.rollback.as_mut() {
                    session.stage = crate::domain::rollback::RollbackStage::List;
                    session.loading = false;
                    session.error = Some(error.message);
                } else {
                    self.route_error(error);
                }
            }
        }
    }

    fn on_tree_watch_started(
        &mut self,
        app: AppKey,
        trees: mpsc::Receiver<ResourceTree>,
        cancel: CancellationToken,
    ) {
        if self.nav.view != View::Tree || !self.tree_targets.contains(&app) {
            // Arrived after the view was left; tear it down right away.
            cancel.cancel();

            return;
        }
        if let Some(previous) = self.tree_watchers.insert(app.clone(), cancel) {
            previous.cancel();
        }
        self.spawn_tree_forwarder(app, trees);
    }

    fn on_external_done(&mut self, intent: ExternalIntent, success: bool, detail: Option<String>) {
        match intent {
            ExternalIntent::Pager | ExternalIntent::DiffViewer => {
                self.mode = Mode::Normal;
                if !success {
                    self.set_status(detail.unwrap_or_else(|| "Viewer exited with error".to_string()));
                }
            }
            ExternalIntent::Upgrade => {
                if success {
                    self.mode = Mode::UpgradeSuccess;
                } else {
                    self.mode = Mode::UpgradeError {
                        detail: detail.unwrap_or_else(|| "upgrade command failed".to_string()),
                    };
                }
            }
        }
    }

    /// Recomputes the project filter and schedules a debounced watch
    /// restart when it differs from the active subscription.
    pub fn sync_watch_scope(&mut self) {
        let projects = self.scopes.sorted_projects();
        if let Some(version) = self.watch.scope_changed(&projects) {
            self.tasks.schedule(crate::app::watch::SCOPE_DEBOUNCE, move || {
                Message::ScopeDebounce { version }
            });
        }
    }

    /// Stops tree watchers and discards snapshots when leaving Tree view.
    pub fn leave_tree(&mut self) {
        for (_, cancel) in self.tree_watchers.drain() {
            cancel.cancel();
        }
        self.trees.clear();
        self.tree_targets.clear();
    }

    /// Stops background streams on shutdown.
    pub fn shutdown(&mut self) {
        self.leave_tree();
        self.watch.shutdown();
    }
}
