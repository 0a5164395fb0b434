//! Bottom line: the input bar while typing, the status line otherwise.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{App, autocomplete};
use crate::ui::state::app_mode::Mode;

const SPINNER_FRAMES: [char; 4] = ['|', '/', '-', '\\'];

pub(crate) fn render(frame: &mut Frame, area: Rect, app: &App) {
    let line = match &app.mode {
        Mode::Search => Line::from(vec![
            Span::styled("/", app.theme.title()),
            Span::raw(app.search_input.text().to_string()),
            Span::styled("▏", Style::default().fg(app.theme.accent())),
        ]),
        Mode::Command => command_line(app),
        _ => status_line(app),
    };

    frame.render_widget(Paragraph::new(line), area);
}

fn command_line(app: &App) -> Line<'static> {
    let mut spans = vec![
        Span::styled(":", app.theme.title()),
        Span::raw(app.command_input.text().to_string()),
        Span::styled("▏", Style::default().fg(app.theme.accent())),
    ];

    let candidates = autocomplete::suggestions(app, app.command_input.text());
    if !candidates.is_empty() {
        let preview = candidates
            .iter()
            .take(6)
            .cloned()
            .collect::<Vec<_>>()
            .join(" ");
        spans.push(Span::styled(
            format!("  ({preview})"),
            Style::default().fg(app.theme.dim()),
        ));
    }

    Line::from(spans)
}

fn status_line(app: &App) -> Line<'static> {
    let mut spans = Vec::new();
    if app.mode.is_loading() {
        let spinner = SPINNER_FRAMES[app.spinner_frame % SPINNER_FRAMES.len()];
        spans.push(Span::styled(
            format!("{spinner} "),
            Style::default().fg(app.theme.accent()),
        ));
    }
    spans.push(Span::raw(app.status_line.clone()));

    let mut counters = format!("  {} apps", app.store.len());
    if !app.selected.is_empty() {
        counters.push_str(&format!(", {} selected", app.selected.len()));
    }
    spans.push(Span::styled(counters, Style::default().fg(app.theme.dim())));

    Line::from(spans)
}
