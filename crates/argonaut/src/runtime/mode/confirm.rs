//! Key handling for the sync and delete confirmation modals.

use crossterm::event::{KeyCode, KeyEvent};

use crate::app::App;
use crate::ui::state::app_mode::Mode;

/// Sync modal: `y`/`Enter` commits, `n`/`Esc` cancels, `p` toggles prune,
/// `w` toggles watch-after.
pub(crate) fn handle_sync(app: &mut App, key: KeyEvent) {
    let Mode::ConfirmSync(state) = &mut app.mode else {
        return;
    };

    match key.code {
        KeyCode::Char('p') => state.prune = !state.prune,
        KeyCode::Char('w') => state.watch = !state.watch,
        KeyCode::Char('y') | KeyCode::Enter => {
            let state = state.clone();
            app.commit_sync(state);
        }
        KeyCode::Char('n') | KeyCode::Esc => {
            app.mode = Mode::Normal;
        }
        _ => {}
    }
}

/// Delete modal: `y`/`Enter` commits, `n`/`Esc` cancels, `c` toggles
/// cascade, `p` cycles the propagation policy.
pub(crate) fn handle_delete(app: &mut App, key: KeyEvent) {
    let Mode::ConfirmAppDelete(state) = &mut app.mode else {
        return;
    };

    match key.code {
        KeyCode::Char('c') => state.cascade = !state.cascade,
        KeyCode::Char('p') => state.propagation = state.propagation.toggle(),
        KeyCode::Char('y') | KeyCode::Enter => {
            let state = state.clone();
            app.commit_delete(state);
        }
        KeyCode::Char('n') | KeyCode::Esc => {
            app.mode = Mode::Normal;
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crossterm::event::KeyModifiers;

    use super::*;
    use crate::domain::application::AppKey;
    use crate::infra::config::ArgonautConfig;
    use crate::infra::demo::DemoControlPlane;
    use crate::ui::state::app_mode::{ActionTarget, ConfirmSyncState};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_in_sync_modal() -> App {
        let (mut app, _rx) = App::new(
            Arc::new(DemoControlPlane::new(false)),
            ArgonautConfig::default(),
        );
        app.mode = Mode::ConfirmSync(ConfirmSyncState::new(ActionTarget::Single(
            AppKey::named("guestbook"),
        )));

        app
    }

    #[test]
    fn test_option_toggles_flip_flags() {
        // Arrange
        let mut app = app_in_sync_modal();

        // Act
        handle_sync(&mut app, key(KeyCode::Char('p')));
        handle_sync(&mut app, key(KeyCode::Char('w')));

        // Assert
        let Mode::ConfirmSync(state) = &app.mode else {
            unreachable!("mode must stay ConfirmSync");
        };
        assert!(state.prune);
        assert!(state.watch);
    }

    #[test]
    fn test_cancel_returns_to_normal_without_dispatch() {
        // Arrange
        let mut app = app_in_sync_modal();

        // Act
        handle_sync(&mut app, key(KeyCode::Esc));

        // Assert
        assert_eq!(app.mode, Mode::Normal);
    }
}
