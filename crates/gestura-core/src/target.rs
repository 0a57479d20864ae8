//! Logical targets and hit resolution against the manager's root.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identifier of a logical element on the host surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct TargetId(pub u32);

/// Parent relation of the host's element hierarchy.
pub trait TargetTree {
    /// Parent of `node`, or `None` at the top of the hierarchy.
    fn parent(&self, node: TargetId) -> Option<TargetId>;

    /// Whether `node` is `ancestor` or one of its descendants.
    fn is_within(&self, node: TargetId, ancestor: TargetId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }
}

/// Hierarchy with no parent links: only the root itself is inside the root.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlatTree;

impl TargetTree for FlatTree {
    fn parent(&self, _node: TargetId) -> Option<TargetId> {
        None
    }
}

/// Hierarchy backed by a child-to-parent map.
#[derive(Debug, Default, Clone)]
pub struct ParentMap {
    parents: HashMap<TargetId, TargetId>,
}

impl ParentMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `child` as a direct child of `parent`.
    pub fn insert(&mut self, child: TargetId, parent: TargetId) {
        self.parents.insert(child, parent);
    }

    /// Builder form of [`ParentMap::insert`].
    #[must_use]
    pub fn with(mut self, child: TargetId, parent: TargetId) -> Self {
        self.insert(child, parent);
        self
    }
}

impl TargetTree for ParentMap {
    fn parent(&self, node: TargetId) -> Option<TargetId> {
        self.parents.get(&node).copied()
    }
}

/// Resolve the frame target: the original hit if it lies within `root`,
/// otherwise `root`.
pub fn resolve(tree: &dyn TargetTree, root: TargetId, hit: Option<TargetId>) -> TargetId {
    match hit {
        Some(node) if tree.is_within(node, root) => node,
        _ => root,
    }
}
