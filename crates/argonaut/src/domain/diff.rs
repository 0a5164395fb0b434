//! Live-versus-desired diff entries returned by the control plane.

/// One resource's diff material as served by the control plane.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResourceDiff {
    pub group: String,
    pub kind: String,
    pub namespace: String,
    pub name: String,
    pub hook: bool,
    pub normalized_live: String,
    pub predicted_live: String,
    pub target: String,
    pub live: String,
}

impl ResourceDiff {
    /// Returns whether the normalized live state differs from the
    /// predicted live state.
    pub fn has_changes(&self) -> bool {
        self.normalized_live != self.predicted_live
    }

    /// Returns the `group/kind namespace/name` heading for the diff pane.
    pub fn heading(&self) -> String {
        if self.group.is_empty() {
            format!("{} {}/{}", self.kind, self.namespace, self.name)
        } else {
            format!("{}/{} {}/{}", self.group, self.kind, self.namespace, self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_changes_compares_normalized_and_predicted() {
        // Arrange
        let unchanged = ResourceDiff {
            normalized_live: "a".to_string(),
            predicted_live: "a".to_string(),
            ..ResourceDiff::default()
        };
        let changed = ResourceDiff {
            normalized_live: "a".to_string(),
            predicted_live: "b".to_string(),
            ..ResourceDiff::default()
        };

        // Assert
        assert!(!unchanged.has_changes());
        assert!(changed.has_changes());
    }

    #[test]
    fn test_heading_omits_empty_group() {
        // Arrange
        let diff = ResourceDiff {
            kind: "Service".to_string(),
            namespace: "prod".to_string(),
            name: "api".to_string(),
            ..ResourceDiff::default()
        };

        // Act
        let heading = diff.heading();

        // Assert
        assert_eq!(heading, "Service prod/api");
    }
}
