//! Key handling for informational overlays: help, errors, auth prompt,
//! connection failure, detected core control plane, login, and upgrade
//! results.

use crossterm::event::{KeyCode, KeyEvent};

use crate::app::App;
use crate::ui::state::app_mode::Mode;

pub(crate) fn handle(app: &mut App, key: KeyEvent) {
    match &mut app.mode {
        Mode::Help { scroll } => match key.code {
            KeyCode::Char('j') | KeyCode::Down => *scroll = scroll.saturating_add(1),
            KeyCode::Char('k') | KeyCode::Up => *scroll = scroll.saturating_sub(1),
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => app.mode = Mode::Normal,
            _ => {}
        },
        Mode::Login => {
            // No descriptor was configured; there is nothing to go back
            // to.
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
                app.should_quit = true;
            }
        }
        Mode::Error
        | Mode::AuthRequired
        | Mode::ConnectionError
        | Mode::CoreDetected { .. }
        | Mode::UpgradeError { .. }
        | Mode::UpgradeSuccess => {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')
            ) {
                app.last_error = None;
                app.mode = Mode::Normal;
            }
        }
        _ => {}
    }
}
