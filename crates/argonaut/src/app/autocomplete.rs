//! Completion of command verbs and argument values from current state.

use crate::app::App;
use crate::app::command::Verb;
use crate::app::navigation::View;
use crate::app::store::VisibleItems;
use crate::domain::scope::ScopeSet;
use crate::ui::style::Theme;

/// Enumerates the finite argument domain for a verb, used both for
/// completion and for validation.
///
/// Returns `None` for verbs whose argument is free-form or absent.
pub fn argument_domain(app: &App, verb: Verb) -> Option<Vec<String>> {
    match verb {
        Verb::Cluster => Some(values(app, View::Clusters, &app.scopes)),
        Verb::Namespace => Some(values(app, View::Namespaces, &app.scopes)),
        Verb::Project => Some(values(app, View::Projects, &app.scopes)),
        Verb::App | Verb::Delete | Verb::Diff | Verb::Rollback | Verb::Resources | Verb::Sync => {
            Some(app_names(app))
        }
        Verb::Theme => Some(Theme::ALL.iter().map(|theme| theme.label().to_string()).collect()),
        Verb::All
        | Verb::Help
        | Verb::Logs
        | Verb::Quit
        | Verb::Up
        | Verb::Upgrade => None,
    }
}

/// Produces ordered candidates for the typed input, with or without the
/// leading `:`.
///
/// Without an argument separator the candidates are the matching canonical
/// verbs, alphabetical after alias deduplication. With one, they are the
/// resolved verb's argument values filtered by the argument prefix.
pub fn suggestions(app: &App, input: &str) -> Vec<String> {
    let line = input.trim_start().trim_start_matches(':');

    match line.split_once(char::is_whitespace) {
        None => verb_candidates(line),
        Some((verb_word, arg_prefix)) => {
            let Some(verb) = Verb::resolve(verb_word) else {
                return Vec::new();
            };
            let Some(domain) = argument_domain(app, verb) else {
                return Vec::new();
            };
            let prefix = arg_prefix.trim().to_lowercase();

            domain
                .into_iter()
                .filter(|value| value.to_lowercase().starts_with(&prefix))
                .collect()
        }
    }
}

/// Accepts the first candidate, returning the completed command line.
pub fn complete(app: &App, input: &str) -> Option<String> {
    let line = input.trim_start().trim_start_matches(':');
    let first = suggestions(app, input).into_iter().next()?;

    match line.split_once(char::is_whitespace) {
        // Completing the verb leaves the bar open for an argument.
        None => Some(format!(":{first} ")),
        Some((verb_word, _)) => Some(format!(":{verb_word} {first}")),
    }
}

fn verb_candidates(prefix: &str) -> Vec<String> {
    let prefix = prefix.to_lowercase();
    let mut candidates: Vec<String> = Verb::TABLE
        .iter()
        .filter(|(_, canonical, aliases)| {
            canonical.starts_with(&prefix)
                || aliases.iter().any(|alias| alias.starts_with(&prefix))
        })
        .map(|(_, canonical, _)| (*canonical).to_string())
        .collect();
    candidates.sort();
    candidates.dedup();

    candidates
}

fn values(app: &App, view: View, scopes: &ScopeSet) -> Vec<String> {
    match app.store.visible_items(view, scopes, app.sort, "") {
        VisibleItems::Values(values) => values,
        VisibleItems::Apps(_) => Vec::new(),
    }
}

fn app_names(app: &App) -> Vec<String> {
    match app
        .store
        .visible_items(View::Apps, &app.scopes, app.sort, "")
    {
        VisibleItems::Apps(apps) => apps.into_iter().map(|application| application.name).collect(),
        VisibleItems::Values(_) => Vec::new(),
    }
}
