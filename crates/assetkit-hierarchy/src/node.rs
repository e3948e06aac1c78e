//! Hierarchy nodes and the forest built from them.
//!
//! A [`HierarchyNode`] is derived data: it pairs a spatial object with the
//! display object that names it and owns its components. Nodes own their
//! children, so a forest is always a finite tree structure regardless of
//! what the underlying links looked like.

use serde::{Deserialize, Serialize};

use assetkit_types::{ObjectKey, ObjectReference};
use assetkit_workspace::ObjectHandle;

/// One node of a reconstructed hierarchy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyNode {
    /// The object carrying the parent/child links.
    pub spatial: ObjectHandle,
    /// The object owning the name and component list.
    pub display: ObjectHandle,
    /// Display name, possibly empty.
    pub name: String,
    /// Child nodes in on-disk order.
    pub children: Vec<HierarchyNode>,
}

impl HierarchyNode {
    /// Returns `true` if `key` names this node's spatial or display object.
    pub fn is(&self, key: &ObjectKey) -> bool {
        self.spatial.key == *key || self.display.key == *key
    }

    /// Number of nodes in this subtree, including this one.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(|c| c.subtree_len()).sum::<usize>()
    }

    /// Depth-first pre-order iteration over this subtree.
    pub fn iter(&self) -> Preorder<'_> {
        Preorder { stack: vec![self] }
    }
}

/// Pre-order iterator over hierarchy nodes.
#[derive(Debug)]
pub struct Preorder<'a> {
    stack: Vec<&'a HierarchyNode>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a HierarchyNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Why a link was left out of the forest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// The reference did not resolve to a loaded object.
    Unresolved,
    /// The spatial object has no resolvable display object.
    MissingOwner,
    /// The link pointed at an object of a non-spatial class.
    NotSpatial,
    /// The father reference did not resolve, so no root reaches the object.
    MissingParent,
    /// The link points back at one of the node's own ancestors.
    Cycle,
    /// The object was already placed under another parent.
    AlreadyPlaced,
    /// The configured depth limit was reached.
    DepthLimit,
}

/// A link that was dropped while building.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedLink {
    /// Object holding the link.
    pub from: ObjectKey,
    pub reference: ObjectReference,
    pub reason: SkipReason,
}

/// The result of a hierarchy build.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyForest {
    pub roots: Vec<HierarchyNode>,
    /// Links dropped during the build, in encounter order.
    pub skipped: Vec<SkippedLink>,
}

impl HierarchyForest {
    pub fn roots(&self) -> &[HierarchyNode] {
        &self.roots
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.roots.iter().map(|r| r.subtree_len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Every node, roots in order, each subtree in pre-order.
    pub fn iter(&self) -> impl Iterator<Item = &HierarchyNode> {
        self.roots.iter().flat_map(|r| r.iter())
    }

    /// The node whose spatial or display object is `key`.
    pub fn find(&self, key: &ObjectKey) -> Option<&HierarchyNode> {
        self.iter().find(|n| n.is(key))
    }

    /// Children of the node at `key`.
    pub fn children_of(&self, key: &ObjectKey) -> Option<&[HierarchyNode]> {
        self.find(key).map(|n| n.children.as_slice())
    }

    /// Nodes from a root down to the node at `key`, inclusive.
    pub fn path_to(&self, key: &ObjectKey) -> Option<Vec<&HierarchyNode>> {
        fn walk<'a>(
            node: &'a HierarchyNode,
            key: &ObjectKey,
            path: &mut Vec<&'a HierarchyNode>,
        ) -> bool {
            path.push(node);
            if node.is(key) {
                return true;
            }
            for child in &node.children {
                if walk(child, key, path) {
                    return true;
                }
            }
            path.pop();
            false
        }

        let mut path = Vec::new();
        for root in &self.roots {
            if walk(root, key, &mut path) {
                return Some(path);
            }
        }
        None
    }

    /// Returns `true` if the node at `ancestor` is a strict ancestor of the
    /// node at `key`.
    pub fn has_ancestor(&self, key: &ObjectKey, ancestor: &ObjectKey) -> bool {
        match self.path_to(key) {
            Some(path) => path
                .iter()
                .take(path.len().saturating_sub(1))
                .any(|n| n.is(ancestor)),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetkit_types::{ClassId, ContainerId};

    fn node(id: i64, name: &str, children: Vec<HierarchyNode>) -> HierarchyNode {
        let c = ContainerId(0);
        HierarchyNode {
            spatial: ObjectHandle::new(ObjectKey::new(c, id * 10), ClassId::TRANSFORM),
            display: ObjectHandle::new(ObjectKey::new(c, id), ClassId::GAME_OBJECT),
            name: name.into(),
            children,
        }
    }

    fn key(id: i64) -> ObjectKey {
        ObjectKey::new(ContainerId(0), id)
    }

    /// A(B(C, D)), E
    fn forest() -> HierarchyForest {
        HierarchyForest {
            roots: vec![
                node(
                    1,
                    "A",
                    vec![node(2, "B", vec![node(3, "C", vec![]), node(4, "D", vec![])])],
                ),
                node(5, "E", vec![]),
            ],
            skipped: vec![],
        }
    }

    #[test]
    fn len_counts_every_node() {
        assert_eq!(forest().len(), 5);
        assert!(HierarchyForest::default().is_empty());
    }

    #[test]
    fn iter_is_preorder() {
        let f = forest();
        let names: Vec<&str> = f.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn find_by_spatial_or_display_key() {
        let f = forest();
        assert_eq!(f.find(&key(3)).unwrap().name, "C");
        assert_eq!(f.find(&key(30)).unwrap().name, "C");
        assert!(f.find(&key(99)).is_none());
    }

    #[test]
    fn children_of_node() {
        let f = forest();
        let names: Vec<&str> = f
            .children_of(&key(2))
            .unwrap()
            .iter()
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(names, vec!["C", "D"]);
        assert!(f.children_of(&key(5)).unwrap().is_empty());
    }

    #[test]
    fn path_to_and_ancestors() {
        let f = forest();
        let path: Vec<&str> = f
            .path_to(&key(4))
            .unwrap()
            .iter()
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(path, vec!["A", "B", "D"]);

        assert!(f.has_ancestor(&key(4), &key(1)));
        assert!(f.has_ancestor(&key(4), &key(20)));
        assert!(!f.has_ancestor(&key(4), &key(4)));
        assert!(!f.has_ancestor(&key(4), &key(5)));
        assert!(!f.has_ancestor(&key(1), &key(2)));
        assert!(!f.has_ancestor(&key(99), &key(1)));
    }
}
