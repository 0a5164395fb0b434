//! Key handling for the theme picker.

use crossterm::event::{KeyCode, KeyEvent};

use crate::app::App;
use crate::ui::state::app_mode::Mode;
use crate::ui::style::Theme;

pub(crate) fn handle(app: &mut App, key: KeyEvent) {
    let Mode::Theme { cursor } = &mut app.mode else {
        return;
    };

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if *cursor + 1 < Theme::ALL.len() {
                *cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            *cursor = cursor.saturating_sub(1);
        }
        KeyCode::Enter => {
            let selected = Theme::ALL.get(*cursor).copied().unwrap_or_default();
            app.theme = selected;
            app.set_status(format!("Theme set to {}", selected.label()));
            app.mode = Mode::Normal;
        }
        KeyCode::Esc | KeyCode::Char('q') => {
            app.mode = Mode::Normal;
        }
        _ => {}
    }
}
