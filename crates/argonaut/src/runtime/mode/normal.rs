//! Key handling for normal (and loading) mode: navigation, selection, and
//! action entry points.

use crossterm::event::{KeyCode, KeyEvent};

use crate::app::App;
use crate::app::navigation::View;
use crate::ui::state::app_mode::Mode;

pub(crate) fn handle(app: &mut App, key: KeyEvent) {
    // `gg` chord: a pending `g` only combines with another `g`.
    let pending = app.pending_key.take();

    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            let count = app.visible().len();
            app.nav.move_down(count);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.nav.move_up();
        }
        KeyCode::Char('g') => {
            if pending == Some('g') {
                app.nav.move_top();
            } else {
                app.pending_key = Some('g');
            }
        }
        KeyCode::Char('G') => {
            let count = app.visible().len();
            app.nav.move_bottom(count);
        }
        KeyCode::Char(' ') => {
            toggle_selection(app);
        }
        KeyCode::Enter => {
            drill_down_or_open(app);
        }
        KeyCode::Esc => {
            escape(app);
        }
        KeyCode::Char('/') => {
            app.search_input.set_text(app.filter.clone());
            app.mode = Mode::Search;
        }
        KeyCode::Char(':') => {
            app.command_input.take_text();
            app.mode = Mode::Command;
        }
        KeyCode::Char('?') => {
            app.mode = Mode::Help { scroll: 0 };
        }
        KeyCode::Char('s') => {
            let targets = app.action_targets();
            app.open_sync_modal(targets);
        }
        KeyCode::Char('r') => {
            let targets = app.action_targets();
            app.enter_tree(targets);
        }
        KeyCode::Char('R') => {
            if let Some(target) = app.cursor_app() {
                app.enter_rollback(target);
            }
        }
        KeyCode::Char('d') => {
            if let Some(target) = app.cursor_app() {
                app.request_diff(target);
            }
        }
        KeyCode::Char('f') => {
            if let Some(target) = app.cursor_app() {
                app.request_refresh(target);
            }
        }
        _ => {}
    }
}

fn toggle_selection(app: &mut App) {
    if app.nav.view != View::Apps {
        return;
    }
    let Some(key) = app.cursor_app() else {
        return;
    };
    if !app.selected.remove(&key) {
        app.selected.insert(key);
    }
}

/// `Enter` commits the cursor value: grouping views drill down, the Apps
/// view opens the resource tree.
fn drill_down_or_open(app: &mut App) {
    match app.nav.view {
        View::Clusters | View::Namespaces | View::Projects | View::AppSets => {
            let Some(value) = app.visible().value_at(app.nav.cursor) else {
                return;
            };
            let mut scopes = app.scopes.clone();
            if app.nav.drill_down(&mut scopes, value) {
                app.scopes = scopes;
                app.sync_watch_scope();
            }
        }
        View::Apps => {
            if let Some(target) = app.cursor_app() {
                app.enter_tree(vec![target]);
            }
        }
        View::Tree => {}
    }
}

/// `Esc` pops one navigation level, or clears the text filter when there
/// is nothing to pop.
fn escape(app: &mut App) {
    if app.nav.view == View::Tree {
        app.leave_tree();
    }
    let mut scopes = app.scopes.clone();
    if app.nav.pop(&mut scopes) {
        app.scopes = scopes;
        app.sync_watch_scope();

        return;
    }
    if !app.filter.is_empty() {
        app.filter.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crossterm::event::KeyModifiers;

    use super::*;
    use crate::app::navigation::View;
    use crate::infra::config::ArgonautConfig;
    use crate::infra::demo::{DemoControlPlane, seed_application};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_app() -> App {
        let (mut app, _rx) = App::new(
            Arc::new(DemoControlPlane::new(false)),
            ArgonautConfig::default(),
        );
        app.mode = Mode::Normal;
        app.store.replace_all(
            vec![
                seed_application("alpha", "c1", "ns1", "p1"),
                seed_application("beta", "c1", "ns2", "p1"),
                seed_application("gamma", "c2", "ns3", "p2"),
            ],
            "1",
        );

        app
    }

    #[test]
    fn test_space_toggles_selection_in_apps_view() {
        // Arrange
        let mut app = test_app();

        // Act
        handle(&mut app, key(KeyCode::Char(' ')));
        let selected_after_first = app.selected.len();
        handle(&mut app, key(KeyCode::Char(' ')));

        // Assert
        assert_eq!(selected_after_first, 1);
        assert!(app.selected.is_empty());
    }

    #[test]
    fn test_gg_chord_jumps_to_top() {
        // Arrange
        let mut app = test_app();
        app.nav.move_down(3);
        app.nav.move_down(3);

        // Act
        handle(&mut app, key(KeyCode::Char('g')));
        handle(&mut app, key(KeyCode::Char('g')));

        // Assert
        assert_eq!(app.nav.cursor, 0);
    }

    #[test]
    fn test_single_g_then_other_key_cancels_chord() {
        // Arrange
        let mut app = test_app();
        app.nav.move_down(3);

        // Act
        handle(&mut app, key(KeyCode::Char('g')));
        handle(&mut app, key(KeyCode::Char('j')));
        handle(&mut app, key(KeyCode::Char('g')));

        // Assert: second lone `g` arms a fresh chord instead of jumping
        assert_eq!(app.pending_key, Some('g'));
        assert_eq!(app.nav.cursor, 2);
    }

    #[tokio::test]
    async fn test_enter_on_cluster_row_drills_into_namespaces() {
        // Arrange
        let mut app = test_app();
        app.nav.jump_to(View::Clusters);

        // Act
        handle(&mut app, key(KeyCode::Enter));

        // Assert
        assert_eq!(app.nav.view, View::Namespaces);
        assert!(app.scopes.clusters.contains("c1"));
    }

    #[test]
    fn test_esc_clears_filter_when_stack_is_empty() {
        // Arrange
        let mut app = test_app();
        app.filter = "alpha".to_string();

        // Act
        handle(&mut app, key(KeyCode::Esc));

        // Assert
        assert!(app.filter.is_empty());
    }

    #[tokio::test]
    async fn test_s_opens_sync_modal_for_cursor_app() {
        // Arrange
        let mut app = test_app();

        // Act
        handle(&mut app, key(KeyCode::Char('s')));

        // Assert
        assert!(matches!(app.mode, Mode::ConfirmSync(_)));
    }
}
