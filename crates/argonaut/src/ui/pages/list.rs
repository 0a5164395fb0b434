//! The grouping lists and the applications table.

use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Block, Cell, List, ListItem, Paragraph, Row, Table};

use crate::app::App;
use crate::app::store::VisibleItems;
use crate::ui::style::{health_color, sync_color};

pub(crate) fn render(frame: &mut Frame, area: Rect, app: &App) {
    match app.visible() {
        VisibleItems::Values(values) => render_values(frame, area, app, &values),
        VisibleItems::Apps(apps) => render_apps(frame, area, app, &apps),
    }
}

fn render_values(frame: &mut Frame, area: Rect, app: &App, values: &[String]) {
    if values.is_empty() {
        frame.render_widget(empty_notice(app), area);

        return;
    }

    let items: Vec<ListItem> = values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let style = if index == app.nav.cursor {
                app.theme.selection()
            } else {
                Style::default()
            };

            ListItem::new(Line::raw(format!(" {value}"))).style(style)
        })
        .collect();

    frame.render_widget(
        List::new(items).block(Block::bordered().title(app.nav.view.title())),
        area,
    );
}

fn render_apps(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    apps: &[crate::domain::application::Application],
) {
    if apps.is_empty() {
        frame.render_widget(empty_notice(app), area);

        return;
    }

    let header = Row::new(vec!["", "NAME", "SYNC", "HEALTH", "CLUSTER", "NAMESPACE", "PROJECT"])
        .style(app.theme.title());
    let rows: Vec<Row> = apps
        .iter()
        .enumerate()
        .map(|(index, application)| {
            let marker = if app.selected.contains(&application.key()) {
                "*"
            } else {
                " "
            };
            let row = Row::new(vec![
                Cell::from(marker),
                Cell::from(application.name.clone()),
                Cell::from(application.sync.label())
                    .style(Style::default().fg(sync_color(application.sync))),
                Cell::from(application.health.label())
                    .style(Style::default().fg(health_color(application.health))),
                Cell::from(application.cluster.clone()),
                Cell::from(application.namespace.clone()),
                Cell::from(application.project.clone()),
            ]);

            if index == app.nav.cursor {
                row.style(app.theme.selection())
            } else {
                row
            }
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(1),
            Constraint::Min(16),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Min(10),
            Constraint::Min(10),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(Block::bordered().title(app.nav.view.title()));

    frame.render_widget(table, area);
}

fn empty_notice(app: &App) -> Paragraph<'static> {
    Paragraph::new(Line::styled(
        "No items match the current scope",
        Style::default().fg(app.theme.dim()),
    ))
    .block(Block::bordered().title(app.nav.view.title()))
}
