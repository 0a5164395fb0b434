//! `:verb [arg]` parsing, validation against live data, and execution.

use crate::app::App;
use crate::app::autocomplete;
use crate::app::navigation::View;
use crate::app::store::VisibleItems;
use crate::domain::application::AppKey;
use crate::ui::state::app_mode::Mode;
use crate::ui::style::Theme;

/// Canonical command verbs; aliases resolve onto these.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verb {
    App,
    All,
    Cluster,
    Delete,
    Diff,
    Help,
    Logs,
    Namespace,
    Project,
    Quit,
    Resources,
    Rollback,
    Sync,
    Theme,
    Up,
    Upgrade,
}

impl Verb {
    /// Canonical verb table with aliases, alphabetical by canonical name.
    pub const TABLE: &'static [(Verb, &'static str, &'static [&'static str])] = &[
        (Verb::All, "all", &[]),
        (Verb::App, "app", &["apps"]),
        (Verb::Cluster, "cluster", &["clusters", "cls"]),
        (Verb::Delete, "delete", &["del"]),
        (Verb::Diff, "diff", &[]),
        (Verb::Help, "help", &[]),
        (Verb::Logs, "logs", &[]),
        (Verb::Namespace, "namespace", &["namespaces", "ns"]),
        (Verb::Project, "project", &["projects", "proj"]),
        (Verb::Quit, "quit", &["q", "q!", "wq", "wq!", "exit"]),
        (Verb::Resources, "resources", &["res", "r"]),
        (Verb::Rollback, "rollback", &[]),
        (Verb::Sync, "sync", &[]),
        (Verb::Theme, "theme", &[]),
        (Verb::Up, "up", &[]),
        (Verb::Upgrade, "upgrade", &["update"]),
    ];

    pub fn canonical(self) -> &'static str {
        Verb::TABLE
            .iter()
            .find(|(verb, _, _)| *verb == self)
            .map_or("", |(_, canonical, _)| canonical)
    }

    /// Resolves a typed verb (canonical or alias) case-insensitively.
    pub fn resolve(word: &str) -> Option<Verb> {
        let lowered = word.to_lowercase();

        Verb::TABLE
            .iter()
            .find(|(_, canonical, aliases)| {
                *canonical == lowered || aliases.contains(&lowered.as_str())
            })
            .map(|(verb, _, _)| *verb)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedCommand {
    pub verb: Verb,
    pub arg: Option<String>,
}

/// Parses `:verb [arg]`; extra tokens beyond the argument are ignored.
pub fn parse(input: &str) -> Option<ParsedCommand> {
    let trimmed = input.trim().trim_start_matches(':');
    let mut tokens = trimmed.split_whitespace();
    let verb = Verb::resolve(tokens.next()?)?;
    let arg = tokens.next().map(ToString::to_string);

    Some(ParsedCommand { verb, arg })
}

/// Executes a command line against the app.
///
/// Returns `false` when the input failed validation (the command bar
/// stays open); `true` when the command ran, whatever mode it left the
/// app in.
pub fn execute(app: &mut App, input: &str) -> bool {
    let Some(parsed) = parse(input) else {
        app.set_status(format!("Unknown command: {}", input.trim()));

        return false;
    };

    // Argument-taking verbs with finite domains validate before running.
    let arg = match validated_argument(app, &parsed) {
        Ok(arg) => arg,
        Err(status) => {
            app.set_status(status);

            return false;
        }
    };

    app.mode = Mode::Normal;
    run(app, parsed.verb, arg);

    true
}

/// Validates the argument against the verb's domain, resolving it to the
/// domain's canonical casing.
fn validated_argument(app: &App, parsed: &ParsedCommand) -> Result<Option<String>, String> {
    let Some(arg) = parsed.arg.as_deref() else {
        return Ok(None);
    };
    let Some(domain) = autocomplete::argument_domain(app, parsed.verb) else {
        return Ok(Some(arg.to_string()));
    };

    domain
        .into_iter()
        .find(|candidate| candidate.eq_ignore_ascii_case(arg))
        .map(Some)
        .ok_or_else(|| format!("No such {}: {arg}", parsed.verb.canonical()))
}

fn run(app: &mut App, verb: Verb, arg: Option<String>) {
    match verb {
        Verb::Cluster => match arg {
            Some(value) => {
                app.scopes.clusters = std::iter::once(value).collect();
                app.nav.jump_to(View::Namespaces);
                app.sync_watch_scope();
            }
            None => app.nav.jump_to(View::Clusters),
        },
        Verb::Namespace => match arg {
            Some(value) => {
                app.scopes.namespaces = std::iter::once(value).collect();
                app.nav.jump_to(View::Projects);
                app.sync_watch_scope();
            }
            None => app.nav.jump_to(View::Namespaces),
        },
        Verb::Project => match arg {
            Some(value) => {
                app.scopes.projects = std::iter::once(value).collect();
                app.nav.jump_to(View::Apps);
                app.sync_watch_scope();
            }
            None => app.nav.jump_to(View::Projects),
        },
        Verb::App => {
            app.nav.jump_to(View::Apps);
            if let Some(name) = arg
                && let VisibleItems::Apps(apps) = app.visible()
                && let Some(index) = apps
                    .iter()
                    .position(|candidate| candidate.name.eq_ignore_ascii_case(&name))
            {
                app.nav.cursor = index;
            }
        }
        Verb::All => {
            app.scopes.clear();
            app.filter.clear();
            app.selected.clear();
            app.nav.jump_to(View::Apps);
            app.sync_watch_scope();
        }
        Verb::Up => {
            let mut scopes = app.scopes.clone();
            if app.nav.pop(&mut scopes) {
                app.scopes = scopes;
                app.sync_watch_scope();
            }
        }
        Verb::Diff => {
            if let Some(target) = single_target(app, arg) {
                app.request_diff(target);
            }
        }
        Verb::Sync => {
            let targets = resolved_targets(app, arg);
            app.open_sync_modal(targets);
        }
        Verb::Delete => {
            let targets = resolved_targets(app, arg);
            app.open_delete_modal(targets);
        }
        Verb::Resources => {
            let targets = resolved_targets(app, arg);
            app.enter_tree(targets);
        }
        Verb::Rollback => {
            if let Some(target) = single_target(app, arg) {
                app.enter_rollback(target);
            }
        }
        Verb::Logs => app.open_logs_pager(),
        Verb::Help => app.mode = Mode::Help { scroll: 0 },
        Verb::Theme => match arg.as_deref().and_then(Theme::by_name) {
            Some(theme) => {
                app.theme = theme;
                app.set_status(format!("Theme set to {}", theme.label()));
            }
            None => {
                let cursor = Theme::ALL
                    .iter()
                    .position(|candidate| *candidate == app.theme)
                    .unwrap_or(0);
                app.mode = Mode::Theme { cursor };
            }
        },
        Verb::Quit => app.should_quit = true,
        Verb::Upgrade => app.start_upgrade(),
    }
}

/// Resolves an action's targets: argument first, else selection, else
/// cursor.
fn resolved_targets(app: &App, arg: Option<String>) -> Vec<AppKey> {
    if let Some(name) = arg {
        return find_app_key(app, &name).into_iter().collect();
    }

    app.action_targets()
}

/// Resolves a single-target action: argument first, else the cursor row.
fn single_target(app: &App, arg: Option<String>) -> Option<AppKey> {
    match arg {
        Some(name) => find_app_key(app, &name),
        None => app.cursor_app(),
    }
}

fn find_app_key(app: &App, name: &str) -> Option<AppKey> {
    app.store
        .iter()
        .filter(|candidate| app.scopes.matches(candidate))
        .find(|candidate| candidate.name.eq_ignore_ascii_case(name))
        .map(crate::domain::application::Application::key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resolves_aliases_case_insensitively() {
        // Arrange & Act
        let namespace = parse(":NS kube-system").expect("command expected");
        let quit = parse("wq!").expect("command expected");
        let cluster = parse(":cls").expect("command expected");

        // Assert
        assert_eq!(namespace.verb, Verb::Namespace);
        assert_eq!(namespace.arg.as_deref(), Some("kube-system"));
        assert_eq!(quit.verb, Verb::Quit);
        assert_eq!(cluster.verb, Verb::Cluster);
        assert_eq!(cluster.arg, None);
    }

    #[test]
    fn test_parse_ignores_extra_tokens() {
        // Arrange & Act
        let parsed = parse(":project payments extra tokens").expect("command expected");

        // Assert
        assert_eq!(parsed.arg.as_deref(), Some("payments"));
    }

    #[test]
    fn test_parse_rejects_unknown_verbs() {
        // Assert
        assert_eq!(parse(":frobnicate"), None);
        assert_eq!(parse(""), None);
    }
}
