//! The atomic commit pass.
//!
//! Commit is the only phase allowed to mutate the host tree. It runs exactly
//! once per completed work-in-progress tree: deletions first (tagged in the
//! outgoing generation), then a single depth-first walk of the new tree that
//! appends placed nodes and diffs attributes on reused ones. Nothing here
//! can suspend, so observers never see a half-applied generation.

use crate::fiber::{EffectTag, FiberId, FiberTree};
use crate::host::HostAdapter;

/// Effect counts from one commit, surfaced through the scheduler's logging.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct CommitStats {
    pub placements: usize,
    pub updates: usize,
    pub deletions: usize,
}

/// Applies every pending effect of the completed tree rooted at `root`.
///
/// Deletions come out of `current` (the generation being replaced) and are
/// drained before any placement runs, so a kind change at a position frees
/// the old node before its replacement is appended.
pub(crate) fn commit_root<A: HostAdapter>(
    host: &mut A,
    wip: &mut FiberTree<A::Handle>,
    current: &FiberTree<A::Handle>,
    root: FiberId,
    deletions: &mut Vec<FiberId>,
) -> CommitStats {
    let mut stats = CommitStats::default();

    for id in deletions.drain(..) {
        commit_deletion(host, current, id);
        stats.deletions += 1;
    }

    commit_work(host, wip, current, wip[root].child, &mut stats);
    stats
}

/// Depth-first effect application over the new tree: node, then child
/// subtree, then sibling chain.
fn commit_work<A: HostAdapter>(
    host: &mut A,
    wip: &mut FiberTree<A::Handle>,
    current: &FiberTree<A::Handle>,
    fiber: Option<FiberId>,
    stats: &mut CommitStats,
) {
    let Some(id) = fiber else { return };

    let effect = wip[id].effect.take();
    match effect {
        Some(EffectTag::Placement) => {
            if let Some(handle) = wip[id].host.clone() {
                let parent = wip
                    .host_ancestor(id)
                    .expect("placed fiber has no host ancestor");
                host.append_child(&parent, &handle);
                stats.placements += 1;
            }
        }
        Some(EffectTag::Update) => {
            if let Some(handle) = wip[id].host.clone() {
                let alt = wip[id]
                    .alternate
                    .expect("update fiber with no alternate");
                host.apply_attributes(&handle, &current[alt].attrs, &wip[id].attrs);
                stats.updates += 1;
            }
        }
        Some(EffectTag::Deletion) | None => {}
    }

    // Alternate links point into the arena being discarded after this pass.
    wip[id].alternate = None;

    let child = wip[id].child;
    let sibling = wip[id].sibling;
    commit_work(host, wip, current, child, stats);
    commit_work(host, wip, current, sibling, stats);
}

/// Detaches the nearest materialized host node under a deleted fiber from
/// the nearest materialized host ancestor. Component fibers own no node
/// themselves, so both ends of the removal may sit several levels away.
fn commit_deletion<A: HostAdapter>(host: &mut A, current: &FiberTree<A::Handle>, id: FiberId) {
    let Some(parent) = current.host_ancestor(id) else {
        return;
    };
    if let Some(node) = current.host_in_subtree(id) {
        host.remove_child(&parent, &node);
    }
}
