//! Key handling for the diff pane and the no-changes screen.

use crossterm::event::{KeyCode, KeyEvent};

use crate::app::App;
use crate::ui::state::app_mode::Mode;

pub(crate) fn handle(app: &mut App, key: KeyEvent) {
    match &mut app.mode {
        Mode::Diff { scroll, .. } => match key.code {
            KeyCode::Char('j') | KeyCode::Down => *scroll = scroll.saturating_add(1),
            KeyCode::Char('k') | KeyCode::Up => *scroll = scroll.saturating_sub(1),
            KeyCode::Char('g') => *scroll = 0,
            KeyCode::Esc | KeyCode::Char('q') => app.mode = Mode::Normal,
            _ => {}
        },
        Mode::NoDiff { .. } => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                app.mode = Mode::Normal;
            }
        }
        _ => {}
    }
}
