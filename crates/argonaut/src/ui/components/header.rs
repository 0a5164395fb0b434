//! Top line: product name, server host, and the navigation breadcrumb.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::App;

pub(crate) fn render(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![
        Span::styled("argonaut", app.theme.title()),
        Span::raw("  "),
    ];

    if let Some(server) = &app.server {
        spans.push(Span::styled(
            server.display_host().to_string(),
            Style::default().fg(app.theme.dim()),
        ));
        spans.push(Span::raw("  "));
    }

    spans.push(Span::raw(app.nav.view.title()));
    let breadcrumb = scope_breadcrumb(app);
    if !breadcrumb.is_empty() {
        spans.push(Span::styled(
            format!("  [{breadcrumb}]"),
            Style::default().fg(app.theme.accent()),
        ));
    }
    if !app.active_filter().is_empty() {
        spans.push(Span::styled(
            format!("  /{}", app.active_filter()),
            Style::default().fg(app.theme.dim()),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn scope_breadcrumb(app: &App) -> String {
    let mut parts = Vec::new();
    for (label, values) in [
        ("cluster", &app.scopes.clusters),
        ("ns", &app.scopes.namespaces),
        ("proj", &app.scopes.projects),
        ("set", &app.scopes.app_sets),
    ] {
        if !values.is_empty() {
            parts.push(format!(
                "{label}:{}",
                values.iter().cloned().collect::<Vec<_>>().join(",")
            ));
        }
    }

    parts.join(" ")
}
