//! The mutually exclusive UI modes and their modal payloads.

use crate::domain::application::AppKey;
use crate::domain::diff::ResourceDiff;

/// What a confirmation modal or action task operates on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionTarget {
    Single(AppKey),
    Multi(Vec<AppKey>),
}

impl ActionTarget {
    pub fn keys(&self) -> Vec<AppKey> {
        match self {
            ActionTarget::Single(key) => vec![key.clone()],
            ActionTarget::Multi(keys) => keys.clone(),
        }
    }

    /// Short label for modal titles.
    pub fn label(&self) -> String {
        match self {
            ActionTarget::Single(key) => key.qualified(),
            ActionTarget::Multi(keys) => format!("{} applications", keys.len()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfirmSyncState {
    pub target: ActionTarget,
    pub prune: bool,
    pub watch: bool,
}

impl ConfirmSyncState {
    pub fn new(target: ActionTarget) -> Self {
        Self {
            target,
            prune: false,
            watch: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PropagationPolicy {
    #[default]
    Foreground,
    Background,
}

impl PropagationPolicy {
    pub fn label(self) -> &'static str {
        match self {
            PropagationPolicy::Foreground => "foreground",
            PropagationPolicy::Background => "background",
        }
    }

    #[must_use]
    pub fn toggle(self) -> Self {
        match self {
            PropagationPolicy::Foreground => PropagationPolicy::Background,
            PropagationPolicy::Background => PropagationPolicy::Foreground,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfirmDeleteState {
    pub target: ActionTarget,
    pub cascade: bool,
    pub propagation: PropagationPolicy,
}

impl ConfirmDeleteState {
    pub fn new(target: ActionTarget) -> Self {
        Self {
            target,
            cascade: true,
            propagation: PropagationPolicy::default(),
        }
    }
}

/// The active UI mode; exactly one at a time.
#[derive(Clone, Debug, PartialEq)]
pub enum Mode {
    Normal,
    Loading,
    Search,
    Command,
    Help { scroll: u16 },
    ConfirmSync(ConfirmSyncState),
    ConfirmAppDelete(ConfirmDeleteState),
    Rollback,
    Diff {
        app: AppKey,
        entries: Vec<ResourceDiff>,
        scroll: u16,
    },
    NoDiff { app: AppKey },
    Error,
    AuthRequired,
    ConnectionError,
    CoreDetected { version: String },
    Login,
    External,
    Theme { cursor: usize },
    Upgrade,
    UpgradeError { detail: String },
    UpgradeSuccess,
}

impl Mode {
    /// Returns whether a spinner should be drawn for this mode.
    pub fn is_loading(&self) -> bool {
        matches!(self, Mode::Loading | Mode::Upgrade)
    }

    /// Returns whether the mode is a text-entry bar.
    pub fn is_input(&self) -> bool {
        matches!(self, Mode::Search | Mode::Command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_target_labels() {
        // Arrange
        let single = ActionTarget::Single(AppKey::named("api"));
        let multi = ActionTarget::Multi(vec![AppKey::named("a"), AppKey::named("b")]);

        // Assert
        assert_eq!(single.label(), "api");
        assert_eq!(multi.label(), "2 applications");
        assert_eq!(multi.keys().len(), 2);
    }

    #[test]
    fn test_propagation_policy_toggles() {
        // Arrange
        let policy = PropagationPolicy::default();

        // Act
        let toggled = policy.toggle();

        // Assert
        assert_eq!(policy.label(), "foreground");
        assert_eq!(toggled.label(), "background");
    }
}
