//! Key handling for the rollback screen (list and confirm stages).

use crossterm::event::{KeyCode, KeyEvent};

use crate::app::App;
use crate::domain::rollback::RollbackStage;
use crate::ui::state::app_mode::Mode;

pub(crate) fn handle(app: &mut App, key: KeyEvent) {
    let Some(session) = app.rollback.as_mut() else {
        app.mode = Mode::Normal;

        return;
    };

    match session.stage {
        RollbackStage::List => handle_list(app, key),
        RollbackStage::Confirm => handle_confirm(app, key),
    }
}

fn handle_list(app: &mut App, key: KeyEvent) {
    let Some(session) = app.rollback.as_mut() else {
        return;
    };

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            // Down-moves lazily schedule git metadata for the rows coming
            // into view.
            let scheduled = session.move_down();
            app.spawn_revision_metadata(scheduled);
        }
        KeyCode::Char('k') | KeyCode::Up => session.move_up(),
        KeyCode::Char('p') => session.prune = !session.prune,
        KeyCode::Char('w') => session.watch = !session.watch,
        KeyCode::Char('d') => session.dry_run = !session.dry_run,
        KeyCode::Enter => {
            if session.selected_row().is_some() {
                session.stage = RollbackStage::Confirm;
            }
        }
        KeyCode::Esc | KeyCode::Char('q') => {
            app.rollback = None;
            app.mode = Mode::Normal;
        }
        _ => {}
    }
}

fn handle_confirm(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => app.commit_rollback(),
        KeyCode::Char('n') | KeyCode::Esc => {
            if let Some(session) = app.rollback.as_mut() {
                session.stage = RollbackStage::List;
            }
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
    use crate::domain::rollback::{RollbackRow, RollbackSession};
    use crate::infra::config::ArgonautConfig;
    use crate::infra::demo::DemoControlPlane;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn rows(count: usize) -> Vec<RollbackRow> {
        (0..count)
            .map(|index| RollbackRow {
                id: i64::try_from(index).unwrap_or(0),
                revision: format!("rev-{index}"),
                deployed_at: None,
                metadata: None,
                metadata_requested: false,
            })
            .collect()
    }

    fn app_in_rollback() -> App {
        let (mut app, _rx) = App::new(
            Arc::new(DemoControlPlane::new(false)),
            ArgonautConfig::default(),
        );
        let mut session = RollbackSession::new(AppKey::named("api"));
        session.apply_history(rows(5), None);
        app.rollback = Some(session);
        app.mode = Mode::Rollback;

        app
    }

    #[test]
    fn test_enter_switches_to_confirm_stage() {
        // Arrange
        let mut app = app_in_rollback();

        // Act
        handle(&mut app, key(KeyCode::Enter));

        // Assert
        assert!(matches!(
            app.rollback.as_ref().map(|session| session.stage),
            Some(RollbackStage::Confirm)
        ));
    }

    #[test]
    fn test_confirm_stage_esc_returns_to_list() {
        // Arrange
        let mut app = app_in_rollback();
        handle(&mut app, key(KeyCode::Enter));

        // Act
        handle(&mut app, key(KeyCode::Esc));

        // Assert
        assert!(matches!(
            app.rollback.as_ref().map(|session| session.stage),
            Some(RollbackStage::List)
        ));
    }

    #[test]
    fn test_esc_in_list_stage_leaves_rollback() {
        // Arrange
        let mut app = app_in_rollback();

        // Act
        handle(&mut app, key(KeyCode::Esc));

        // Assert
        assert!(app.rollback.is_none());
        assert_eq!(app.mode, Mode::Normal);
    }
}
