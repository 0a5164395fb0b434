//! Key handling for the `:` command bar with tab completion.

use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{App, autocomplete, command};
use crate::ui::state::app_mode::Mode;

pub(crate) fn handle(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            let line = app.command_input.text().to_string();
            if line.trim().is_empty() {
                app.mode = Mode::Normal;

                return;
            }
            // Validation failures keep the bar open with the input intact.
            if command::execute(app, &line) {
                app.command_input.take_text();
            }
        }
        KeyCode::Esc => {
            app.command_input.take_text();
            app.mode = Mode::Normal;
        }
        KeyCode::Tab => {
            if let Some(completed) = autocomplete::complete(app, app.command_input.text()) {
                app.command_input.set_text(completed);
            }
        }
        KeyCode::Backspace => app.command_input.delete_backward(),
        KeyCode::Delete => app.command_input.delete_forward(),
        KeyCode::Left => app.command_input.move_left(),
        KeyCode::Right => app.command_input.move_right(),
        KeyCode::Home => app.command_input.move_home(),
        KeyCode::End => app.command_input.move_end(),
        KeyCode::Char(ch) => app.command_input.insert_char(ch),
        _ => {}
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

    fn type_line(app: &mut App, line: &str) {
        for ch in line.chars() {
            handle(app, key(KeyCode::Char(ch)));
        }
    }

    fn test_app() -> App {
        let (mut app, _rx) = App::new(
            Arc::new(DemoControlPlane::new(false)),
            ArgonautConfig::default(),
        );
        app.mode = Mode::Command;
        app.store.replace_all(
            vec![seed_application("guestbook", "prod", "default", "default")],
            "1",
        );

        app
    }

    #[tokio::test]
    async fn test_enter_executes_navigation_command() {
        // Arrange
        let mut app = test_app();

        // Act
        type_line(&mut app, "cluster prod");
        handle(&mut app, key(KeyCode::Enter));

        // Assert
        assert_eq!(app.nav.view, View::Namespaces);
        assert!(app.scopes.clusters.contains("prod"));
        assert!(app.command_input.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_argument_keeps_the_bar_open() {
        // Arrange
        let mut app = test_app();

        // Act
        type_line(&mut app, "cluster nonexistent");
        handle(&mut app, key(KeyCode::Enter));

        // Assert
        assert_eq!(app.mode, Mode::Command);
        assert_eq!(app.command_input.text(), "cluster nonexistent");
        assert!(app.status_line.contains("No such cluster"));
    }

    #[test]
    fn test_tab_completes_the_first_candidate() {
        // Arrange
        let mut app = test_app();

        // Act
        type_line(&mut app, ":rol");
        handle(&mut app, key(KeyCode::Tab));

        // Assert
        assert_eq!(app.command_input.text(), ":rollback ");
    }

    #[test]
    fn test_esc_discards_the_input() {
        // Arrange
        let mut app = test_app();

        // Act
        type_line(&mut app, "sync");
        handle(&mut app, key(KeyCode::Esc));

        // Assert
        assert_eq!(app.mode, Mode::Normal);
        assert!(app.command_input.is_empty());
    }
}
