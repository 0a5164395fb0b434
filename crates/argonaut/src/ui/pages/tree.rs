//! Resource tree page: one indented block per watched application.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph};

use crate::app::App;
use crate::ui::style::health_color;

pub(crate) fn render(frame: &mut Frame, area: Rect, app: &App) {
    let mut lines = Vec::new();
    for target in &app.tree_targets {
        lines.push(Line::styled(target.qualified(), app.theme.title()));
        match app.trees.get(target) {
            Some(tree) => {
                for (depth, node) in tree.flattened() {
                    let health = node
                        .health
                        .map(|health| format!("  {}", health.label()))
                        .unwrap_or_default();
                    let style = node
                        .health
                        .map_or(Style::default(), |h| Style::default().fg(health_color(h)));
                    lines.push(Line::styled(
                        format!("{}{}{health}", "  ".repeat(depth + 1), node.label()),
                        style,
                    ));
                }
            }
            None => lines.push(Line::styled(
                "  loading…",
                Style::default().fg(app.theme.dim()),
            )),
        }
        lines.push(Line::raw(""));
    }

    frame.render_widget(
        Paragraph::new(lines).block(Block::bordered().title("Resources")),
        area,
    );
}
