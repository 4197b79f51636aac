//! Fiber Arena
//!
//! One [`Fiber`] per element position, stored in a [`FiberTree`] arena and
//! linked by id. Fibers are created by the reconciler (or as the synthetic
//! root of a render request), mutated in place by the scheduler while they
//! are expanded, and consumed by the committer.

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::element::{Attrs, Element, NodeKind};
use crate::fiber::hooks::HookList;

new_key_type! {
    /// Index of a fiber within one generation's arena.
    pub struct FiberId;
}

/// Diff verdict for one fiber, produced by reconciliation and consumed by
/// the commit pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectTag {
    /// A new host node must be appended under the nearest host ancestor.
    Placement,
    /// The existing host node is reused; attributes are diffed in place.
    Update,
    /// The old host node must be removed from its host parent.
    Deletion,
}

/// Mutable work node mirroring one element position.
///
/// `parent`, `child` and `sibling` index this fiber's own arena;
/// `alternate` indexes the *other* generation's arena and is used only for
/// diffing. Component fibers never own a host node (`host` stays `None`).
pub(crate) struct Fiber<H> {
    pub(crate) kind: NodeKind,
    pub(crate) attrs: Attrs,
    /// Child descriptions not yet consumed by reconciliation.
    pub(crate) pending_children: Vec<Element>,
    pub(crate) host: Option<H>,
    pub(crate) parent: Option<FiberId>,
    pub(crate) child: Option<FiberId>,
    pub(crate) sibling: Option<FiberId>,
    pub(crate) alternate: Option<FiberId>,
    pub(crate) effect: Option<EffectTag>,
    /// State cells, present only on component fibers.
    pub(crate) hooks: HookList,
}

impl<H> Fiber<H> {
    /// A fiber for an element with no predecessor at its position.
    pub(crate) fn placed(element: Element, parent: FiberId) -> Self {
        Self {
            kind: element.kind,
            attrs: element.attrs,
            pending_children: element.children,
            host: None,
            parent: Some(parent),
            child: None,
            sibling: None,
            alternate: None,
            effect: Some(EffectTag::Placement),
            hooks: HookList::new(),
        }
    }

    /// A fiber reusing the host node of its same-kind predecessor.
    pub(crate) fn reused(element: Element, parent: FiberId, old: FiberId, host: Option<H>) -> Self {
        Self {
            kind: element.kind,
            attrs: element.attrs,
            pending_children: element.children,
            host,
            parent: Some(parent),
            child: None,
            sibling: None,
            alternate: Some(old),
            effect: Some(EffectTag::Update),
            hooks: HookList::new(),
        }
    }

    /// The synthetic root of a render request, owning the container.
    pub(crate) fn root(container: H, children: Vec<Element>, alternate: Option<FiberId>) -> Self {
        Self {
            kind: NodeKind::Host("#root".into()),
            attrs: Attrs::new(),
            pending_children: children,
            host: Some(container),
            parent: None,
            child: None,
            sibling: None,
            alternate,
            effect: None,
            hooks: HookList::new(),
        }
    }
}

/// One generation's fibers.
pub(crate) struct FiberTree<H> {
    fibers: SlotMap<FiberId, Fiber<H>>,
}

impl<H> Default for FiberTree<H> {
    fn default() -> Self {
        Self {
            fibers: SlotMap::with_key(),
        }
    }
}

impl<H> FiberTree<H> {
    pub(crate) fn insert(&mut self, fiber: Fiber<H>) -> FiberId {
        self.fibers.insert(fiber)
    }
}

impl<H: Clone> FiberTree<H> {
    /// Handle of the nearest ancestor that owns a host node.
    ///
    /// Walks up through component fibers; the synthetic root always owns
    /// the container, so within a complete tree this only returns `None`
    /// for the root itself.
    pub(crate) fn host_ancestor(&self, id: FiberId) -> Option<H> {
        let mut cursor = self[id].parent;
        while let Some(ancestor) = cursor {
            if let Some(handle) = &self[ancestor].host {
                return Some(handle.clone());
            }
            cursor = self[ancestor].parent;
        }
        None
    }

    /// Handle of the nearest host node at or below `id`, descending
    /// through hostless component fibers.
    pub(crate) fn host_in_subtree(&self, id: FiberId) -> Option<H> {
        let mut cursor = Some(id);
        while let Some(fiber) = cursor {
            if let Some(handle) = &self[fiber].host {
                return Some(handle.clone());
            }
            cursor = self[fiber].child;
        }
        None
    }
}

impl<H> std::ops::Index<FiberId> for FiberTree<H> {
    type Output = Fiber<H>;

    fn index(&self, id: FiberId) -> &Fiber<H> {
        &self.fibers[id]
    }
}

impl<H> std::ops::IndexMut<FiberId> for FiberTree<H> {
    fn index_mut(&mut self, id: FiberId) -> &mut Fiber<H> {
        &mut self.fibers[id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(tree: &mut FiberTree<u32>, parent: FiberId, host: Option<u32>) -> FiberId {
        let mut fiber = Fiber::placed(Element::node("x", Attrs::new(), vec![]), parent);
        fiber.host = host;
        tree.insert(fiber)
    }

    #[test]
    fn root_owns_container_and_no_effect() {
        let mut tree = FiberTree::default();
        let root = tree.insert(Fiber::root(7u32, vec![], None));

        assert_eq!(tree[root].host, Some(7));
        assert_eq!(tree[root].effect, None);
        assert_eq!(tree[root].parent, None);
    }

    #[test]
    fn host_ancestor_skips_hostless_fibers() {
        let mut tree = FiberTree::default();
        let root = tree.insert(Fiber::root(1u32, vec![], None));
        // Component-like fiber without a host node of its own.
        let middle = leaf(&mut tree, root, None);
        let grandchild = leaf(&mut tree, middle, Some(2));
        tree[root].child = Some(middle);
        tree[middle].child = Some(grandchild);

        assert_eq!(tree.host_ancestor(grandchild), Some(1));
        assert_eq!(tree.host_ancestor(middle), Some(1));
        assert_eq!(tree.host_ancestor(root), None);
    }

    #[test]
    fn host_in_subtree_descends_through_hostless_fibers() {
        let mut tree = FiberTree::default();
        let root = tree.insert(Fiber::root(1u32, vec![], None));
        let middle = leaf(&mut tree, root, None);
        let grandchild = leaf(&mut tree, middle, Some(9));
        tree[middle].child = Some(grandchild);

        assert_eq!(tree.host_in_subtree(middle), Some(9));
        assert_eq!(tree.host_in_subtree(grandchild), Some(9));
    }
}
