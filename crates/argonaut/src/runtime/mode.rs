//! Mode-specific key handling.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::App;
use crate::ui::state::app_mode::Mode;

pub(crate) mod command_bar;
pub(crate) mod confirm;
pub(crate) mod diff;
pub(crate) mod normal;
pub(crate) mod overlay;
pub(crate) mod rollback;
pub(crate) mod search;
pub(crate) mod theme;

/// Routes a key to the active mode handler.
///
/// `Ctrl+C` quits from any mode.
pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;

        return;
    }

    match &app.mode {
        Mode::Normal | Mode::Loading => normal::handle(app, key),
        Mode::Search => search::handle(app, key),
        Mode::Command => command_bar::handle(app, key),
        Mode::ConfirmSync(_) => confirm::handle_sync(app, key),
        Mode::ConfirmAppDelete(_) => confirm::handle_delete(app, key),
        Mode::Rollback => rollback::handle(app, key),
        Mode::Diff { .. } | Mode::NoDiff { .. } => diff::handle(app, key),
        Mode::Theme { .. } => theme::handle(app, key),
        Mode::Help { .. }
        | Mode::Error
        | Mode::AuthRequired
        | Mode::ConnectionError
        | Mode::CoreDetected { .. }
        | Mode::Login
        | Mode::UpgradeError { .. }
        | Mode::UpgradeSuccess => overlay::handle(app, key),
        // The terminal belongs to someone else, or the upgrade command is
        // running; keys are swallowed until control returns.
        Mode::External | Mode::Upgrade => {}
    }
}
