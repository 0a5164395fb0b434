//! Rendering: a thin ratatui layer over read-only app state.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use crate::app::App;
use crate::app::navigation::View;
use crate::ui::state::app_mode::Mode;

pub mod components;
pub mod pages;
pub mod state;
pub mod style;

/// Draws one frame: header, the active page, the status bar, and any
/// modal overlay for the current mode.
pub fn render(frame: &mut Frame, app: &App) {
    let [header_area, content_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    components::header::render(frame, header_area, app);

    match (&app.mode, app.nav.view) {
        (Mode::Rollback, _) => pages::rollback::render(frame, content_area, app),
        (Mode::Diff { .. }, _) => pages::diff::render(frame, content_area, app),
        (_, View::Tree) => pages::tree::render(frame, content_area, app),
        _ => pages::list::render(frame, content_area, app),
    }

    components::status_bar::render(frame, status_area, app);
    components::overlay::render(frame, content_area, app);
}
