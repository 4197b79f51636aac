//! Positional child reconciliation.
//!
//! # How It Works
//!
//! When a fiber expands its children, the fresh element list is walked in
//! lockstep with the child chain the fiber's alternate produced last
//! generation. At each position the old fiber and the new element are
//! compared by node kind:
//!
//! - Same kind: the old fiber's host handle is carried over and the fiber is
//!   tagged [`EffectTag::Update`], so commit only diffs attributes.
//! - Different kind (or one side exhausted): the new element yields a
//!   [`EffectTag::Placement`] fiber with no host, and the old fiber is
//!   tagged [`EffectTag::Deletion`] in the committed tree.
//!
//! # Design Decisions
//!
//! Matching is strictly positional. There is no keyed matching, so inserting
//! at the head of a list degrades to an update cascade plus one trailing
//! placement. That is the documented cost model, not a bug.
//!
//! Deletion tags are written into the *current* arena, never the
//! work-in-progress one: the fibers being deleted have no counterpart in the
//! new generation. The scheduler collects their ids and the commit pass
//! drains them before any placements or updates run.

use tracing::trace;

use crate::element::Element;
use crate::fiber::{EffectTag, Fiber, FiberId, FiberTree};

/// Diffs `elements` against the previously committed child chain of
/// `parent`'s alternate, producing the new chain under `parent` in `wip`.
///
/// Every new fiber is linked into the sibling chain in element order.
/// Old fibers with no same-kind counterpart at their position are tagged
/// for deletion in `current` and pushed onto `deletions`.
pub(crate) fn reconcile_children<H: Clone>(
    wip: &mut FiberTree<H>,
    current: &mut FiberTree<H>,
    deletions: &mut Vec<FiberId>,
    parent: FiberId,
    elements: Vec<Element>,
) {
    let mut old = wip[parent].alternate.and_then(|alt| current[alt].child);
    let mut prev_sibling: Option<FiberId> = None;

    let mut placements = 0usize;
    let mut updates = 0usize;
    let mut removals = 0usize;

    let mut elements = elements.into_iter();
    loop {
        let next = elements.next();
        if next.is_none() && old.is_none() {
            break;
        }

        let mut created: Option<FiberId> = None;

        match (next, old) {
            (Some(element), Some(o)) if element.kind == current[o].kind => {
                let host = current[o].host.clone();
                created = Some(wip.insert(Fiber::reused(element, parent, o, host)));
                updates += 1;
            }
            (element, o) => {
                if let Some(element) = element {
                    created = Some(wip.insert(Fiber::placed(element, parent)));
                    placements += 1;
                }
                if let Some(o) = o {
                    current[o].effect = Some(EffectTag::Deletion);
                    deletions.push(o);
                    removals += 1;
                }
            }
        }

        if let Some(id) = created {
            match prev_sibling {
                None => wip[parent].child = Some(id),
                Some(prev) => wip[prev].sibling = Some(id),
            }
            prev_sibling = Some(id);
        }

        old = old.and_then(|o| current[o].sibling);
    }

    trace!(updates, placements, removals, "reconciled child chain");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Element, NodeKind};
    use crate::fiber::Fiber;

    fn tree_with_root() -> (FiberTree<u32>, FiberId) {
        let mut tree = FiberTree::default();
        let root = tree.insert(Fiber::root(0, Vec::new(), None));
        (tree, root)
    }

    /// Collects the tags of a wip child chain in sibling order.
    fn chain(wip: &FiberTree<u32>, parent: FiberId) -> Vec<(NodeKind, Option<EffectTag>)> {
        let mut out = Vec::new();
        let mut cursor = wip[parent].child;
        while let Some(id) = cursor {
            out.push((wip[id].kind.clone(), wip[id].effect));
            cursor = wip[id].sibling;
        }
        out
    }

    fn host(tag: &str) -> Element {
        Element::node(tag, Vec::new(), Vec::new())
    }

    #[test]
    fn first_render_places_every_child() {
        let (mut wip, parent) = tree_with_root();
        let mut current = FiberTree::default();
        let mut deletions = Vec::new();

        reconcile_children(
            &mut wip,
            &mut current,
            &mut deletions,
            parent,
            vec![host("x"), host("y")],
        );

        let tags = chain(&wip, parent);
        assert_eq!(tags.len(), 2);
        assert!(tags.iter().all(|(_, e)| *e == Some(EffectTag::Placement)));
        assert!(deletions.is_empty());
    }

    /// A shared prefix of same-kind positions is reused; the tail beyond it
    /// is placed or deleted depending on which side is longer.
    #[test]
    fn shared_prefix_is_reused_and_tail_replaced() {
        // Committed generation: root -> [x, x, y].
        let mut current = FiberTree::default();
        let old_root = current.insert(Fiber::root(0u32, Vec::new(), None));
        let a = current.insert(Fiber::placed(host("x"), old_root));
        let b = current.insert(Fiber::placed(host("x"), old_root));
        let c = current.insert(Fiber::placed(host("y"), old_root));
        current[old_root].child = Some(a);
        current[a].sibling = Some(b);
        current[b].sibling = Some(c);
        current[a].host = Some(10);
        current[b].host = Some(11);
        current[c].host = Some(12);

        // New generation: [x, x, z, z].
        let mut wip = FiberTree::default();
        let parent = wip.insert(Fiber::root(0u32, Vec::new(), Some(old_root)));
        let mut deletions = Vec::new();

        reconcile_children(
            &mut wip,
            &mut current,
            &mut deletions,
            parent,
            vec![host("x"), host("x"), host("z"), host("z")],
        );

        let tags = chain(&wip, parent);
        assert_eq!(tags[0].1, Some(EffectTag::Update));
        assert_eq!(tags[1].1, Some(EffectTag::Update));
        assert_eq!(tags[2].1, Some(EffectTag::Placement));
        assert_eq!(tags[3].1, Some(EffectTag::Placement));
        assert_eq!(deletions, vec![c]);
        assert_eq!(current[c].effect, Some(EffectTag::Deletion));

        // Reused fibers carry the committed host handle forward.
        let first = wip[parent].child.unwrap();
        assert_eq!(wip[first].host, Some(10));
        assert_eq!(wip[first].alternate, Some(a));
    }

    #[test]
    fn kind_change_at_a_position_replaces_instead_of_mutating() {
        let mut current = FiberTree::default();
        let old_root = current.insert(Fiber::root(0u32, Vec::new(), None));
        let a = current.insert(Fiber::placed(host("x"), old_root));
        current[old_root].child = Some(a);

        let mut wip = FiberTree::default();
        let parent = wip.insert(Fiber::root(0u32, Vec::new(), Some(old_root)));
        let mut deletions = Vec::new();

        reconcile_children(
            &mut wip,
            &mut current,
            &mut deletions,
            parent,
            vec![host("y")],
        );

        let tags = chain(&wip, parent);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].1, Some(EffectTag::Placement));
        assert_eq!(deletions, vec![a]);
    }

    #[test]
    fn empty_element_list_deletes_the_whole_chain() {
        let mut current = FiberTree::default();
        let old_root = current.insert(Fiber::root(0u32, Vec::new(), None));
        let a = current.insert(Fiber::placed(host("x"), old_root));
        let b = current.insert(Fiber::placed(host("y"), old_root));
        current[old_root].child = Some(a);
        current[a].sibling = Some(b);

        let mut wip = FiberTree::default();
        let parent = wip.insert(Fiber::root(0u32, Vec::new(), Some(old_root)));
        let mut deletions = Vec::new();

        reconcile_children(&mut wip, &mut current, &mut deletions, parent, Vec::new());

        assert!(wip[parent].child.is_none());
        assert_eq!(deletions, vec![a, b]);
    }
}
