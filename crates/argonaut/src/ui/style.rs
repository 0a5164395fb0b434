//! Color themes and shared text styles.

use ratatui::style::{Color, Modifier, Style};

use crate::domain::application::{HealthStatus, SyncStatus};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Default,
    Dark,
    Light,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Default, Theme::Dark, Theme::Light];

    pub fn label(self) -> &'static str {
        match self {
            Theme::Default => "default",
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    /// Resolves a theme name case-insensitively.
    pub fn by_name(name: &str) -> Option<Theme> {
        Theme::ALL
            .into_iter()
            .find(|theme| theme.label().eq_ignore_ascii_case(name))
    }

    pub fn accent(self) -> Color {
        match self {
            Theme::Default => Color::Cyan,
            Theme::Dark => Color::Blue,
            Theme::Light => Color::Magenta,
        }
    }

    pub fn dim(self) -> Color {
        match self {
            Theme::Default | Theme::Dark => Color::DarkGray,
            Theme::Light => Color::Gray,
        }
    }

    pub fn selection(self) -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(self.accent())
            .add_modifier(Modifier::BOLD)
    }

    pub fn title(self) -> Style {
        Style::default().fg(self.accent()).add_modifier(Modifier::BOLD)
    }
}

pub fn sync_color(status: SyncStatus) -> Color {
    match status {
        SyncStatus::Synced => Color::Green,
        SyncStatus::OutOfSync => Color::Yellow,
        SyncStatus::Unknown => Color::DarkGray,
    }
}

pub fn health_color(status: HealthStatus) -> Color {
    match status {
        HealthStatus::Healthy => Color::Green,
        HealthStatus::Progressing => Color::Cyan,
        HealthStatus::Degraded => Color::Red,
        HealthStatus::Missing | HealthStatus::Unknown => Color::DarkGray,
        HealthStatus::Suspended => Color::Yellow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_lookup_is_case_insensitive() {
        // Assert
        assert_eq!(Theme::by_name("Dark"), Some(Theme::Dark));
        assert_eq!(Theme::by_name("LIGHT"), Some(Theme::Light));
        assert_eq!(Theme::by_name("neon"), None);
    }
}
