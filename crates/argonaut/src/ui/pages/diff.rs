//! Diff pane: per-resource live/desired sections with scroll.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph};

use crate::app::App;
use crate::ui::state::app_mode::Mode;

pub(crate) fn render(frame: &mut Frame, area: Rect, app: &App) {
    let Mode::Diff {
        app: target,
        entries,
        scroll,
    } = &app.mode
    else {
        return;
    };

    let mut lines = Vec::new();
    for entry in entries {
        lines.push(Line::styled(entry.heading(), app.theme.title()));
        for line in entry.normalized_live.lines() {
            lines.push(Line::styled(
                format!("- {line}"),
                Style::default().fg(Color::Red),
            ));
        }
        for line in entry.predicted_live.lines() {
            lines.push(Line::styled(
                format!("+ {line}"),
                Style::default().fg(Color::Green),
            ));
        }
        lines.push(Line::raw(""));
    }

    frame.render_widget(
        Paragraph::new(lines)
            .scroll((*scroll, 0))
            .block(Block::bordered().title(format!("Diff {target}"))),
        area,
    );
}
