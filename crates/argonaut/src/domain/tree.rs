//! Resource tree snapshots cached per application while in Tree view.

use serde::{Deserialize, Serialize};

use crate::domain::application::HealthStatus;

/// One deployed resource in an application's tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub uid: String,
    pub group: String,
    pub kind: String,
    pub namespace: String,
    pub name: String,
    pub parent_uid: Option<String>,
    pub health: Option<HealthStatus>,
}

impl TreeNode {
    /// Returns the `kind/name` label rendered in the tree widget.
    pub fn label(&self) -> String {
        format!("{}/{}", self.kind, self.name)
    }
}

/// A serializable snapshot of an application's deployed resources.
///
/// Snapshots are cached per app name, separate from the app store, and
/// discarded when the Tree view is left.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceTree {
    pub app: String,
    pub nodes: Vec<TreeNode>,
}

impl ResourceTree {
    /// Returns nodes in render order: roots first, each followed by its
    /// descendants depth-first, with the nesting depth attached.
    pub fn flattened(&self) -> Vec<(usize, &TreeNode)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for node in self.nodes.iter().filter(|node| node.parent_uid.is_none()) {
            self.push_subtree(node, 0, &mut out);
        }

        out
    }

    fn push_subtree<'a>(&'a self, node: &'a TreeNode, depth: usize, out: &mut Vec<(usize, &'a TreeNode)>) {
        out.push((depth, node));
        for child in self
            .nodes
            .iter()
            .filter(|candidate| candidate.parent_uid.as_deref() == Some(node.uid.as_str()))
        {
            self.push_subtree(child, depth + 1, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(uid: &str, parent: Option<&str>, kind: &str) -> TreeNode {
        TreeNode {
            uid: uid.to_string(),
            group: "apps".to_string(),
            kind: kind.to_string(),
            namespace: "default".to_string(),
            name: uid.to_string(),
            parent_uid: parent.map(ToString::to_string),
            health: None,
        }
    }

    #[test]
    fn test_flattened_orders_roots_then_children_depth_first() {
        // Arrange
        let tree = ResourceTree {
            app: "api".to_string(),
            nodes: vec![
                node("deploy", None, "Deployment"),
                node("rs", Some("deploy"), "ReplicaSet"),
                node("pod", Some("rs"), "Pod"),
                node("svc", None, "Service"),
            ],
        };

        // Act
        let flattened = tree.flattened();

        // Assert
        let labels: Vec<(usize, String)> = flattened
            .iter()
            .map(|(depth, node)| (*depth, node.uid.clone()))
            .collect();
        assert_eq!(
            labels,
            vec![
                (0, "deploy".to_string()),
                (1, "rs".to_string()),
                (2, "pod".to_string()),
                (0, "svc".to_string()),
            ]
        );
    }
}
