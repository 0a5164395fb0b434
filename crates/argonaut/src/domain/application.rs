//! Application model shared by the store, the watch pipeline, and the UI.

use serde::{Deserialize, Serialize};

/// Identity of an application: name plus optional control-plane namespace.
///
/// Two applications with the same name may coexist when they live in
/// different control-plane namespaces, so both parts participate in
/// store uniqueness.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AppKey {
    pub name: String,
    pub namespace: Option<String>,
}

impl AppKey {
    /// Builds a key with no control-plane namespace.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
        }
    }

    /// Returns the `namespace/name` form used in status lines and logs.
    pub fn qualified(&self) -> String {
        match &self.namespace {
            Some(namespace) => format!("{namespace}/{}", self.name),
            None => self.name.clone(),
        }
    }
}

impl std::fmt::Display for AppKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.qualified())
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum SyncStatus {
    Synced,
    OutOfSync,
    #[default]
    Unknown,
}

impl SyncStatus {
    /// Returns the wire label used for display and text filtering.
    pub fn label(self) -> &'static str {
        match self {
            SyncStatus::Synced => "Synced",
            SyncStatus::OutOfSync => "OutOfSync",
            SyncStatus::Unknown => "Unknown",
        }
    }

    /// Rank used by the sync sort spec; out-of-sync sorts first.
    pub(crate) fn rank(self) -> u8 {
        match self {
            SyncStatus::OutOfSync => 0,
            SyncStatus::Unknown => 1,
            SyncStatus::Synced => 2,
        }
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for SyncStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Synced" => Ok(SyncStatus::Synced),
            "OutOfSync" => Ok(SyncStatus::OutOfSync),
            "Unknown" => Ok(SyncStatus::Unknown),
            _ => Err(format!("Unknown sync status: {s}")),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Progressing,
    Missing,
    Suspended,
    #[default]
    Unknown,
}

impl HealthStatus {
    pub fn label(self) -> &'static str {
        match self {
            HealthStatus::Healthy => "Healthy",
            HealthStatus::Degraded => "Degraded",
            HealthStatus::Progressing => "Progressing",
            HealthStatus::Missing => "Missing",
            HealthStatus::Suspended => "Suspended",
            HealthStatus::Unknown => "Unknown",
        }
    }

    /// Rank used by the health sort spec; degraded sorts first.
    pub(crate) fn rank(self) -> u8 {
        match self {
            HealthStatus::Degraded => 0,
            HealthStatus::Missing => 1,
            HealthStatus::Progressing => 2,
            HealthStatus::Suspended => 3,
            HealthStatus::Unknown => 4,
            HealthStatus::Healthy => 5,
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for HealthStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Healthy" => Ok(HealthStatus::Healthy),
            "Degraded" => Ok(HealthStatus::Degraded),
            "Progressing" => Ok(HealthStatus::Progressing),
            "Missing" => Ok(HealthStatus::Missing),
            "Suspended" => Ok(HealthStatus::Suspended),
            "Unknown" => Ok(HealthStatus::Unknown),
            _ => Err(format!("Unknown health status: {s}")),
        }
    }
}

/// One entry of an application's deployment history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub id: i64,
    pub revision: String,
    pub deployed_at: Option<String>,
}

/// A declarative application as reported by the control plane.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub name: String,
    pub app_namespace: Option<String>,
    pub cluster: String,
    pub namespace: String,
    pub project: String,
    pub app_set: Option<String>,
    pub sync: SyncStatus,
    pub health: HealthStatus,
    pub resource_version: String,
    pub history: Vec<DeploymentRecord>,
}

impl Application {
    /// Returns the identity used for store uniqueness.
    pub fn key(&self) -> AppKey {
        AppKey {
            name: self.name.clone(),
            namespace: self.app_namespace.clone(),
        }
    }

    /// Returns whether any searchable attribute matches `needle`
    /// case-insensitively.
    ///
    /// Matches across name, sync status, health status, destination
    /// namespace, and project.
    pub fn matches_filter(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        let needle = needle.to_lowercase();

        self.name.to_lowercase().contains(&needle)
            || self.sync.label().to_lowercase().contains(&needle)
            || self.health.label().to_lowercase().contains(&needle)
            || self.namespace.to_lowercase().contains(&needle)
            || self.project.to_lowercase().contains(&needle)
    }
}
