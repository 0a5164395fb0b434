//! In-memory application store and the derivation of visible items.

use crate::app::navigation::View;
use crate::domain::application::{AppKey, Application};
use crate::domain::scope::ScopeSet;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    Name,
    Sync,
    Health,
}

/// Active sort spec for the Apps view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub ascending: bool,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            field: SortField::Name,
            ascending: true,
        }
    }
}

/// Items the UI renders for the current view.
#[derive(Clone, Debug, PartialEq)]
pub enum VisibleItems {
    /// Distinct attribute values for the grouping views.
    Values(Vec<String>),
    /// Fully scoped, sorted, filtered applications.
    Apps(Vec<Application>),
}

impl VisibleItems {
    pub fn len(&self) -> usize {
        match self {
            VisibleItems::Values(values) => values.len(),
            VisibleItems::Apps(apps) => apps.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the display value at `index` (app name for app rows).
    pub fn value_at(&self, index: usize) -> Option<String> {
        match self {
            VisibleItems::Values(values) => values.get(index).cloned(),
            VisibleItems::Apps(apps) => apps.get(index).map(|app| app.name.clone()),
        }
    }
}

/// Order-agnostic collection of applications keyed by identity.
#[derive(Default)]
pub struct AppStore {
    apps: Vec<Application>,
    last_resource_version: Option<String>,
}

impl AppStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    pub fn get(&self, key: &AppKey) -> Option<&Application> {
        self.apps.iter().find(|app| app.key() == *key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Application> {
        self.apps.iter()
    }

    /// Resume token captured from the last completed list.
    pub fn last_resource_version(&self) -> Option<&str> {
        self.last_resource_version.as_deref()
    }

    /// Replaces or appends by identity; idempotent for identical input.
    pub fn upsert(&mut self, app: Application) {
        let key = app.key();
        if let Some(existing) = self.apps.iter_mut().find(|candidate| candidate.key() == key) {
            *existing = app;
        } else {
            self.apps.push(app);
        }
    }

    /// Removes by identity; removing an absent key is a no-op.
    pub fn delete(&mut self, key: &AppKey) {
        self.apps.retain(|app| app.key() != *key);
    }

    /// Swaps the contents atomically and records the list's resume token.
    pub fn replace_all(&mut self, apps: Vec<Application>, resource_version: &str) {
        self.apps = apps;
        self.last_resource_version = Some(resource_version.to_string());
    }

    /// Returns what the UI renders for `view` under the active scopes,
    /// sort spec, and text filter. Pure over the store.
    ///
    /// Clusters derive from the full set; namespaces apply the cluster
    /// scope; projects apply cluster plus namespace; app sets and apps
    /// apply everything. The text filter is applied last.
    pub fn visible_items(
        &self,
        view: View,
        scopes: &ScopeSet,
        sort: SortSpec,
        filter: &str,
    ) -> VisibleItems {
        match view {
            View::Clusters => VisibleItems::Values(filtered_values(
                self.distinct(|_| true, |app| Some(app.cluster.clone())),
                filter,
            )),
            View::Namespaces => VisibleItems::Values(filtered_values(
                self.distinct(
                    |app| scopes.matches_clusters(app),
                    |app| Some(app.namespace.clone()),
                ),
                filter,
            )),
            View::Projects => VisibleItems::Values(filtered_values(
                self.distinct(
                    |app| scopes.matches_clusters(app) && scopes.matches_namespaces(app),
                    |app| Some(app.project.clone()),
                ),
                filter,
            )),
            View::AppSets => VisibleItems::Values(filtered_values(
                self.distinct(|app| scopes.matches(app), |app| app.app_set.clone()),
                filter,
            )),
            View::Apps | View::Tree => {
                let mut apps: Vec<Application> = self
                    .apps
                    .iter()
                    .filter(|app| scopes.matches(app))
                    .cloned()
                    .collect();
                sort_apps(&mut apps, sort);
                apps.retain(|app| app.matches_filter(filter));

                VisibleItems::Apps(apps)
            }
        }
    }

    fn distinct(
        &self,
        keep: impl Fn(&Application) -> bool,
        value: impl Fn(&Application) -> Option<String>,
    ) -> Vec<String> {
        let mut values: Vec<String> = self
            .apps
            .iter()
            .filter(|app| keep(app))
            .filter_map(value)
            .collect();
        values.sort();
        values.dedup();

        values
    }
}

fn filtered_values(values: Vec<String>, filter: &str) -> Vec<String> {
    if filter.is_empty() {
        return values;
    }
    let needle = filter.to_lowercase();

    values
        .into_iter()
        .filter(|value| value.to_lowercase().contains(&needle))
        .collect()
}

fn sort_apps(apps: &mut [Application], sort: SortSpec) {
    apps.sort_by(|a, b| {
        let ordering = match sort.field {
            SortField::Name => a.name.cmp(&b.name),
            SortField::Sync => a.sync.rank().cmp(&b.sync.rank()).then(a.name.cmp(&b.name)),
            SortField::Health => a
                .health
                .rank()
                .cmp(&b.health.rank())
                .then(a.name.cmp(&b.name)),
        };

        if sort.ascending {
            ordering
        } else {
            ordering.reverse()
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::application::{HealthStatus, SyncStatus};
    use crate::infra::demo::seed_application;

    fn store_with(apps: Vec<Application>) -> AppStore {
        let mut store = AppStore::new();
        store.replace_all(apps, "42");

        store
    }

    #[test]
    fn test_upsert_replaces_matching_identity() {
        // Arrange
        let mut store = store_with(vec![seed_application("api", "c1", "ns1", "p1")]);
        let mut updated = seed_application("api", "c1", "ns1", "p1");
        updated.sync = SyncStatus::OutOfSync;

        // Act
        store.upsert(updated.clone());
        store.upsert(updated);

        // Assert: still one entry, attributes replaced
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get(&AppKey::named("api")).map(|app| app.sync),
            Some(SyncStatus::OutOfSync)
        );
    }

    #[test]
    fn test_upsert_distinguishes_app_namespaces() {
        // Arrange
        let mut store = AppStore::new();
        let mut namespaced = seed_application("api", "c1", "ns1", "p1");
        namespaced.app_namespace = Some("team-a".to_string());

        // Act
        store.upsert(seed_application("api", "c1", "ns1", "p1"));
        store.upsert(namespaced);

        // Assert
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_delete_is_idempotent() {
        // Arrange
        let mut store = store_with(vec![seed_application("api", "c1", "ns1", "p1")]);

        // Act
        store.delete(&AppKey::named("api"));
        store.delete(&AppKey::named("api"));
        store.delete(&AppKey::named("ghost"));

        // Assert
        assert!(store.is_empty());
    }

    #[test]
    fn test_replace_all_swaps_contents_and_resume_token() {
        // Arrange
        let mut store = store_with(vec![seed_application("old", "c1", "ns1", "p1")]);

        // Act
        store.replace_all(vec![seed_application("new", "c2", "ns2", "p2")], "99");

        // Assert
        assert!(store.get(&AppKey::named("old")).is_none());
        assert!(store.get(&AppKey::named("new")).is_some());
        assert_eq!(store.last_resource_version(), Some("99"));
    }

    #[test]
    fn test_clusters_derive_from_the_unscoped_set() {
        // Arrange
        let store = store_with(vec![
            seed_application("a", "c2", "ns1", "p1"),
            seed_application("b", "c1", "ns1", "p1"),
            seed_application("c", "c1", "ns2", "p2"),
        ]);
        let mut scopes = ScopeSet::default();
        scopes.clusters.insert("c1".to_string());

        // Act
        let items = store.visible_items(View::Clusters, &scopes, SortSpec::default(), "");

        // Assert: cluster scope does not narrow the cluster list itself
        assert_eq!(
            items,
            VisibleItems::Values(vec!["c1".to_string(), "c2".to_string()])
        );
    }

    #[test]
    fn test_namespaces_apply_cluster_scope_only() {
        // Arrange
        let store = store_with(vec![
            seed_application("a", "c1", "ns1", "p1"),
            seed_application("b", "c2", "ns2", "p1"),
        ]);
        let mut scopes = ScopeSet::default();
        scopes.clusters.insert("c1".to_string());
        scopes.projects.insert("p-unrelated".to_string());

        // Act
        let items = store.visible_items(View::Namespaces, &scopes, SortSpec::default(), "");

        // Assert
        assert_eq!(items, VisibleItems::Values(vec!["ns1".to_string()]));
    }

    #[test]
    fn test_apps_view_scopes_sorts_and_filters() {
        // Arrange
        let mut degraded = seed_application("zeta", "c1", "ns1", "p1");
        degraded.health = HealthStatus::Degraded;
        let store = store_with(vec![
            seed_application("alpha", "c1", "ns1", "p1"),
            degraded,
            seed_application("other", "c2", "ns1", "p1"),
        ]);
        let mut scopes = ScopeSet::default();
        scopes.clusters.insert("c1".to_string());
        let sort = SortSpec {
            field: SortField::Health,
            ascending: true,
        };

        // Act
        let items = store.visible_items(View::Apps, &scopes, sort, "");

        // Assert: degraded first, out-of-cluster app excluded
        let names: Vec<String> = match items {
            VisibleItems::Apps(apps) => apps.into_iter().map(|app| app.name).collect(),
            VisibleItems::Values(_) => Vec::new(),
        };
        assert_eq!(names, vec!["zeta".to_string(), "alpha".to_string()]);
    }

    #[test]
    fn test_apps_filter_matches_status_text() {
        // Arrange
        let mut drifted = seed_application("beta", "c1", "ns1", "p1");
        drifted.sync = SyncStatus::OutOfSync;
        let store = store_with(vec![seed_application("alpha", "c1", "ns1", "p1"), drifted]);

        // Act
        let items = store.visible_items(
            View::Apps,
            &ScopeSet::default(),
            SortSpec::default(),
            "outofsync",
        );

        // Assert
        assert_eq!(items.len(), 1);
        assert_eq!(items.value_at(0).as_deref(), Some("beta"));
    }
}
