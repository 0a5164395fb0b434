//! Rollback page: deployment history with lazily loaded git metadata.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Block, List, ListItem, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::App;
use crate::domain::rollback::RollbackStage;

pub(crate) fn render(frame: &mut Frame, area: Rect, app: &App) {
    let Some(session) = app.rollback.as_ref() else {
        return;
    };

    let title = format!(
        "Rollback {}  [prune:{} watch:{} dry-run:{}]",
        session.app,
        flag(session.prune),
        flag(session.watch),
        flag(session.dry_run),
    );

    if session.loading {
        frame.render_widget(
            Paragraph::new(Line::styled(
                "Loading deployment history…",
                Style::default().fg(app.theme.dim()),
            ))
            .block(Block::bordered().title(title)),
            area,
        );

        return;
    }

    let items: Vec<ListItem> = session
        .rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let current = session
                .current_revision
                .as_deref()
                .is_some_and(|revision| revision == row.revision);
            let marker = if current { "●" } else { " " };
            let metadata = row.metadata.as_ref().map_or_else(
                || "…".to_string(),
                |metadata| format!("{} - {}", metadata.author, metadata.message),
            );
            let text = format!(
                " {marker} {:>4}  {:<16} {}",
                row.id,
                truncated(&row.revision, 16),
                metadata
            );
            let style = if index == session.cursor {
                app.theme.selection()
            } else {
                Style::default()
            };

            ListItem::new(Line::raw(text)).style(style)
        })
        .collect();

    frame.render_widget(List::new(items).block(Block::bordered().title(title)), area);

    if session.stage == RollbackStage::Confirm
        && let Some(row) = session.selected_row()
    {
        let body = format!(
            "Roll back {} to {}? (y/n)",
            session.app,
            truncated(&row.revision, 16)
        );
        crate::ui::components::overlay::render_box(frame, area, app, "Confirm Rollback", &body);
    }

    if let Some(error) = &session.error {
        crate::ui::components::overlay::render_box(frame, area, app, "Rollback Error", error);
    }
}

fn flag(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

/// Truncates to a display width, not a byte count.
fn truncated(value: &str, max: usize) -> String {
    if value.width() <= max {
        return value.to_string();
    }

    let mut out = String::new();
    let mut width = 0;
    for ch in value.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width >= max {
            break;
        }
        width += ch_width;
        out.push(ch);
    }
    out.push('…');

    out
}
