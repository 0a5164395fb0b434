//! Key handling for the search bar.
//!
//! The filter previews live while typing; `Enter` commits it, `Esc`
//! abandons the edit and keeps the previous filter.

use crossterm::event::{KeyCode, KeyEvent};

use crate::app::App;
use crate::ui::state::app_mode::Mode;

pub(crate) fn handle(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            app.filter = app.search_input.take_text();
            app.mode = Mode::Normal;
            app.nav.clamp_cursor(app.visible().len());
        }
        KeyCode::Esc => {
            app.search_input.take_text();
            app.mode = Mode::Normal;
        }
        KeyCode::Backspace => app.search_input.delete_backward(),
        KeyCode::Delete => app.search_input.delete_forward(),
        KeyCode::Left => app.search_input.move_left(),
        KeyCode::Right => app.search_input.move_right(),
        KeyCode::Home => app.search_input.move_home(),
        KeyCode::End => app.search_input.move_end(),
        KeyCode::Char(ch) => app.search_input.insert_char(ch),
        _ => {}
    }
}
