//! Centered modal overlays for the current mode.

use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Block, Clear, Paragraph, Wrap};

use crate::app::App;
use crate::ui::state::app_mode::{ConfirmDeleteState, ConfirmSyncState, Mode};
use crate::ui::style::Theme;

const HELP_TEXT: &str = "\
j/k      move cursor
space    toggle selection
enter    drill down / open resources
esc      back / clear filter
/        search
:        command
s        sync
r        resources
R        rollback
d        diff
f        refresh
gg / G   top / bottom
q        quit

Commands: :cluster :namespace :project :app :sync :diff
:rollback :delete :resources :logs :theme :all :up :upgrade :quit";

pub(crate) fn render(frame: &mut Frame, area: Rect, app: &App) {
    match &app.mode {
        Mode::Help { scroll } => render_help(frame, area, app, *scroll),
        Mode::ConfirmSync(state) => render_confirm_sync(frame, area, app, state),
        Mode::ConfirmAppDelete(state) => render_confirm_delete(frame, area, app, state),
        Mode::NoDiff { app: target } => render_box(
            frame,
            area,
            app,
            "No Differences",
            &format!("{target} is in sync with the desired state"),
        ),
        Mode::Error => render_error(frame, area, app, "Error"),
        Mode::AuthRequired => render_error(frame, area, app, "Authentication Required"),
        Mode::ConnectionError => render_error(frame, area, app, "Connection Error"),
        Mode::CoreDetected { version } => render_box(
            frame,
            area,
            app,
            "Core Control Plane",
            &format!(
                "The server reports {version}; some operations are \
                 unavailable against a core-mode control plane"
            ),
        ),
        Mode::Login => render_box(
            frame,
            area,
            app,
            "Not Connected",
            "No server configured. Start with --server and --token, or \
             --demo for the built-in control plane. Press q to exit.",
        ),
        Mode::Theme { cursor } => render_theme(frame, area, app, *cursor),
        Mode::Upgrade => render_box(frame, area, app, "Upgrade", "Running upgrade command…"),
        Mode::UpgradeError { detail } => render_box(frame, area, app, "Upgrade Failed", detail),
        Mode::UpgradeSuccess => render_box(
            frame,
            area,
            app,
            "Upgrade Complete",
            "Restart argonaut to use the new version",
        ),
        _ => {}
    }
}

fn render_help(frame: &mut Frame, area: Rect, app: &App, scroll: u16) {
    let popup = centered(area, 52, 22);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(HELP_TEXT)
            .scroll((scroll, 0))
            .block(Block::bordered().title("Help").border_style(app.theme.title())),
        popup,
    );
}

fn render_confirm_sync(frame: &mut Frame, area: Rect, app: &App, state: &ConfirmSyncState) {
    let body = format!(
        "Sync {}?\n\n[p] prune: {}\n[w] watch after sync: {}\n\ny to confirm, n to cancel",
        state.target.label(),
        on_off(state.prune),
        on_off(state.watch),
    );
    render_box(frame, area, app, "Confirm Sync", &body);
}

fn render_confirm_delete(frame: &mut Frame, area: Rect, app: &App, state: &ConfirmDeleteState) {
    let body = format!(
        "Delete {}?\n\n[c] cascade: {}\n[p] propagation: {}\n\ny to confirm, n to cancel",
        state.target.label(),
        on_off(state.cascade),
        state.propagation.label(),
    );
    render_box(frame, area, app, "Confirm Delete", &body);
}

fn render_theme(frame: &mut Frame, area: Rect, app: &App, cursor: usize) {
    let popup = centered(
        area,
        28,
        u16::try_from(Theme::ALL.len()).unwrap_or(0).saturating_add(2),
    );
    frame.render_widget(Clear, popup);
    let lines: Vec<Line> = Theme::ALL
        .iter()
        .enumerate()
        .map(|(index, theme)| {
            let style = if index == cursor {
                app.theme.selection()
            } else {
                Style::default()
            };

            Line::styled(format!(" {}", theme.label()), style)
        })
        .collect();
    frame.render_widget(
        Paragraph::new(lines).block(Block::bordered().title("Theme")),
        popup,
    );
}

fn render_error(frame: &mut Frame, area: Rect, app: &App, title: &str) {
    let Some(error) = &app.last_error else {
        render_box(frame, area, app, title, "Unknown error");

        return;
    };
    let mut body = format!("[{}] {}", error.category.label(), error.message);
    if let Some(status) = error.status {
        body.push_str(&format!("\nHTTP status: {status}"));
    }
    if let Some(code) = &error.code {
        body.push_str(&format!("\nCode: {code}"));
    }
    if let Some(hint) = &error.hint {
        body.push_str(&format!("\n\n{hint}"));
    }
    body.push_str(&format!(
        "\n{}",
        if error.recoverable {
            "Press esc to dismiss"
        } else {
            "Press esc to dismiss; see the log file for details"
        }
    ));
    render_box(frame, area, app, title, &body);
}

/// Draws a centered bordered box with wrapped body text.
pub(crate) fn render_box(frame: &mut Frame, area: Rect, app: &App, title: &str, body: &str) {
    let height = u16::try_from(body.lines().count()).unwrap_or(u16::MAX).saturating_add(2);
    let popup = centered(area, 56, height.max(5));
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(body.to_string())
            .wrap(Wrap { trim: false })
            .block(
                Block::bordered()
                    .title(title.to_string())
                    .border_style(app.theme.title()),
            ),
        popup,
    );
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [horizontal] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(area);
    let [centered] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(horizontal);

    centered
}

fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}
