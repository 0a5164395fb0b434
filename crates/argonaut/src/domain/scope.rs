//! Set-valued scope filters narrowing the visible application list.

use std::collections::BTreeSet;

use crate::domain::application::Application;

/// AND-composed filters over cluster, destination namespace, project, and
/// application set.
///
/// An empty set at a level means "no filter at this level". The scope set
/// narrows visibility; it is independent of the multi-action selection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScopeSet {
    pub clusters: BTreeSet<String>,
    pub namespaces: BTreeSet<String>,
    pub projects: BTreeSet<String>,
    pub app_sets: BTreeSet<String>,
}

impl ScopeSet {
    /// Returns whether an application passes every non-empty dimension.
    pub fn matches(&self, app: &Application) -> bool {
        self.matches_clusters(app) && self.matches_namespaces(app) && self.matches_projects(app) && self.matches_app_sets(app)
    }

    pub(crate) fn matches_clusters(&self, app: &Application) -> bool {
        self.clusters.is_empty() || self.clusters.contains(&app.cluster)
    }

    pub(crate) fn matches_namespaces(&self, app: &Application) -> bool {
        self.namespaces.is_empty() || self.namespaces.contains(&app.namespace)
    }

    pub(crate) fn matches_projects(&self, app: &Application) -> bool {
        self.projects.is_empty() || self.projects.contains(&app.project)
    }

    pub(crate) fn matches_app_sets(&self, app: &Application) -> bool {
        self.app_sets.is_empty()
            || app
                .app_set
                .as_ref()
                .is_some_and(|set| self.app_sets.contains(set))
    }

    /// Returns the sorted project list used as the server-side watch filter.
    pub fn sorted_projects(&self) -> Vec<String> {
        self.projects.iter().cloned().collect()
    }

    /// Returns whether no dimension is constrained.
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
            && self.namespaces.is_empty()
            && self.projects.is_empty()
            && self.app_sets.is_empty()
    }

    /// Clears every dimension.
    pub fn clear(&mut self) {
        self.clusters.clear();
        self.namespaces.clear();
        self.projects.clear();
        self.app_sets.clear();
    }
}
