//! Cooperative unit-of-work scheduling.
//!
//! # How It Works
//!
//! [`Renderer`] owns the host adapter and two fiber arenas: the committed
//! generation (`current`) and the one under construction (`wip`). A render
//! request seeds `wip` with a synthetic root fiber and points `next_unit` at
//! it. Each unit of work expands exactly one fiber (evaluating a component
//! or materializing a host node, then reconciling its children) and returns
//! the next fiber in depth-first order.
//!
//! [`Renderer::run_slice`] drives that loop against a [`Budget`]. The budget
//! is consulted between units, never inside one, so a fiber is always
//! expanded completely or not at all. When the budget drops below the yield
//! threshold the slice returns [`SliceOutcome::Suspended`] and a later slice
//! resumes from the exact fiber pointer left behind. Only when no work
//! remains does the slice commit the finished tree and swap generations.
//!
//! # Design Decisions
//!
//! There is no global scheduler state. Everything lives on the `Renderer`,
//! so independent renderers never interfere and tests need no teardown.
//!
//! Suspended work holds no locks and touches no host state, so a new render
//! request while a tree is in flight simply discards the half-built arena
//! and starts over from the stored root element. The committed tree remains
//! live and consistent throughout.
//!
//! State setters raise a shared invalidation flag instead of scheduling
//! directly. The next `run_slice` call notices the flag and begins a fresh
//! request, which keeps setters free of any back-reference to the renderer.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::element::{Attrs, Component, Element, NodeKind};
use crate::error::RenderError;
use crate::fiber::{Fiber, FiberId, FiberTree, Scope};
use crate::host::HostAdapter;
use crate::render::commit::commit_root;
use crate::render::reconcile::reconcile_children;

/// Minimum budget required to start another unit of work.
const YIELD_THRESHOLD: Duration = Duration::from_millis(1);

/// Time source a slice checks between units of work.
///
/// `remaining` is polled once per unit boundary. Implementations are free to
/// measure wall-clock time, frame deadlines, or anything else monotonic.
pub trait Budget {
    /// Budget left in the current slice.
    fn remaining(&mut self) -> Duration;
}

/// A budget that never runs out. [`Renderer::run_to_idle`] uses it to drain
/// all pending work synchronously.
pub struct Unlimited;

impl Budget for Unlimited {
    fn remaining(&mut self) -> Duration {
        Duration::MAX
    }
}

/// Wall-clock budget measured from a fixed deadline.
pub struct Deadline {
    end: Instant,
}

impl Deadline {
    /// A budget that expires `budget` from now.
    pub fn within(budget: Duration) -> Self {
        Deadline {
            end: Instant::now() + budget,
        }
    }
}

impl Budget for Deadline {
    fn remaining(&mut self) -> Duration {
        self.end.saturating_duration_since(Instant::now())
    }
}

/// What a call to [`Renderer::run_slice`] accomplished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceOutcome {
    /// All pending work finished and the new tree was committed.
    Completed,
    /// The budget ran out mid-tree. Call again to resume.
    Suspended,
    /// There was nothing to do.
    Idle,
}

/// The rendering engine: host adapter, both fiber generations, and the
/// scheduling pointers that let work suspend and resume between slices.
pub struct Renderer<A: HostAdapter> {
    host: A,
    current: FiberTree<A::Handle>,
    wip: FiberTree<A::Handle>,
    current_root: Option<FiberId>,
    wip_root: Option<FiberId>,
    next_unit: Option<FiberId>,
    deletions: Vec<FiberId>,
    container: Option<A::Handle>,
    root_element: Option<Element>,
    invalidated: Rc<Cell<bool>>,
}

impl<A: HostAdapter> Renderer<A> {
    pub fn new(host: A) -> Self {
        Renderer {
            host,
            current: FiberTree::default(),
            wip: FiberTree::default(),
            current_root: None,
            wip_root: None,
            next_unit: None,
            deletions: Vec::new(),
            container: None,
            root_element: None,
            invalidated: Rc::new(Cell::new(false)),
        }
    }

    pub fn host(&self) -> &A {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut A {
        &mut self.host
    }

    /// True when no work is pending and no state change awaits a re-render.
    pub fn is_idle(&self) -> bool {
        self.next_unit.is_none() && self.wip_root.is_none() && !self.invalidated.get()
    }

    /// Requests a render of `element` into `container`.
    ///
    /// The request only records intent; no fiber is expanded and no host
    /// node is touched until a slice runs. A request made while an earlier
    /// tree is still in flight discards that tree, so only the newest
    /// description is ever committed.
    pub fn render(
        &mut self,
        element: Element,
        container: Option<A::Handle>,
    ) -> Result<(), RenderError> {
        let container = container.ok_or(RenderError::InvalidContainer)?;
        debug!("render requested");
        self.container = Some(container);
        self.root_element = Some(element);
        self.invalidated.set(false);
        self.begin_request();
        Ok(())
    }

    /// Performs units of work until the tree completes or `budget` drops
    /// below the yield threshold.
    ///
    /// A pending invalidation (a state setter fired since the last slice)
    /// starts a fresh request first, discarding any in-flight tree. Errors
    /// from component evaluation or node creation abandon the in-flight
    /// tree; the committed tree is untouched.
    pub fn run_slice(&mut self, budget: &mut impl Budget) -> Result<SliceOutcome, RenderError> {
        if self.invalidated.replace(false) && self.root_element.is_some() {
            debug!("state invalidated, restarting render");
            self.begin_request();
        }

        if self.next_unit.is_none() && self.wip_root.is_none() {
            return Ok(SliceOutcome::Idle);
        }

        while let Some(unit) = self.next_unit {
            if budget.remaining() < YIELD_THRESHOLD {
                trace!("budget exhausted, suspending slice");
                return Ok(SliceOutcome::Suspended);
            }
            match self.perform_unit(unit) {
                Ok(next) => self.next_unit = next,
                Err(err) => {
                    self.abandon_request();
                    return Err(err);
                }
            }
        }

        if let Some(root) = self.wip_root {
            self.commit(root);
        }
        Ok(SliceOutcome::Completed)
    }

    /// Runs slices with an unlimited budget until the renderer is idle.
    pub fn run_to_idle(&mut self) -> Result<(), RenderError> {
        let mut budget = Unlimited;
        loop {
            if let SliceOutcome::Idle = self.run_slice(&mut budget)? {
                return Ok(());
            }
        }
    }

    /// Seeds a fresh work-in-progress tree from the stored root element.
    fn begin_request(&mut self) {
        let container = self
            .container
            .clone()
            .expect("render request without a container");
        let element = self
            .root_element
            .clone()
            .expect("render request without a root element");

        self.wip = FiberTree::default();
        self.deletions.clear();
        let root = self
            .wip
            .insert(Fiber::root(container, vec![element], self.current_root));
        self.wip_root = Some(root);
        self.next_unit = Some(root);
    }

    /// Drops the in-flight tree without committing anything.
    fn abandon_request(&mut self) {
        self.wip = FiberTree::default();
        self.wip_root = None;
        self.next_unit = None;
        self.deletions.clear();
    }

    /// Expands one fiber and returns the next one in depth-first order.
    fn perform_unit(&mut self, id: FiberId) -> Result<Option<FiberId>, RenderError> {
        match self.wip[id].kind.clone() {
            NodeKind::Component(component) => self.update_component(id, component)?,
            NodeKind::Host(_) | NodeKind::Text => self.update_host(id)?,
        }
        Ok(self.next_after(id))
    }

    /// Evaluates a component fiber: replays its hook cells from the previous
    /// generation, calls the function, and reconciles the returned element
    /// as the fiber's single child.
    fn update_component(&mut self, id: FiberId, component: Component) -> Result<(), RenderError> {
        let prev_hooks = self.wip[id]
            .alternate
            .map(|alt| self.current[alt].hooks.clone());
        let attrs = self.wip[id].attrs.clone();

        let mut scope = Scope::new(prev_hooks, Rc::clone(&self.invalidated));
        let element = component(&mut scope, &attrs)?;
        self.wip[id].hooks = scope.finish()?;

        reconcile_children(
            &mut self.wip,
            &mut self.current,
            &mut self.deletions,
            id,
            vec![element],
        );
        Ok(())
    }

    /// Expands a host or text fiber: materializes its node on first sight
    /// (detached, off-tree until commit) and reconciles its children.
    fn update_host(&mut self, id: FiberId) -> Result<(), RenderError> {
        if self.wip[id].host.is_none() {
            let handle = self.host.create_node(&self.wip[id].kind)?;
            let empty = Attrs::new();
            self.host
                .apply_attributes(&handle, &empty, &self.wip[id].attrs);
            self.wip[id].host = Some(handle);
        }

        let children = std::mem::take(&mut self.wip[id].pending_children);
        reconcile_children(
            &mut self.wip,
            &mut self.current,
            &mut self.deletions,
            id,
            children,
        );
        Ok(())
    }

    /// Depth-first successor: child, else nearest ancestor's sibling.
    fn next_after(&self, id: FiberId) -> Option<FiberId> {
        if let Some(child) = self.wip[id].child {
            return Some(child);
        }
        let mut cursor = Some(id);
        while let Some(fiber) = cursor {
            if let Some(sibling) = self.wip[fiber].sibling {
                return Some(sibling);
            }
            cursor = self.wip[fiber].parent;
        }
        None
    }

    /// Applies all effects and promotes the finished tree to current.
    fn commit(&mut self, root: FiberId) {
        let stats = commit_root(
            &mut self.host,
            &mut self.wip,
            &self.current,
            root,
            &mut self.deletions,
        );
        debug!(
            placements = stats.placements,
            updates = stats.updates,
            deletions = stats.deletions,
            "committed render"
        );

        self.current = std::mem::take(&mut self.wip);
        self.current_root = self.wip_root.take();
        self.next_unit = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopHost;

    impl HostAdapter for NoopHost {
        type Handle = u32;

        fn create_node(&mut self, _kind: &NodeKind) -> Result<u32, RenderError> {
            Ok(0)
        }

        fn apply_attributes(&mut self, _node: &u32, _prev: &Attrs, _next: &Attrs) {}

        fn append_child(&mut self, _parent: &u32, _child: &u32) {}

        fn remove_child(&mut self, _parent: &u32, _child: &u32) {}
    }

    /// Budget that grants a fixed number of units before expiring.
    struct Grants(usize);

    impl Budget for Grants {
        fn remaining(&mut self) -> Duration {
            if self.0 == 0 {
                Duration::ZERO
            } else {
                self.0 -= 1;
                Duration::from_millis(10)
            }
        }
    }

    fn small_tree() -> Element {
        Element::node(
            "div",
            Vec::new(),
            vec![
                Element::node("p", Vec::new(), vec![Element::text("a")]),
                Element::node("p", Vec::new(), vec![Element::text("b")]),
            ],
        )
    }

    #[test]
    fn slice_with_no_request_is_idle() {
        let mut renderer = Renderer::new(NoopHost);
        let outcome = renderer.run_slice(&mut Unlimited).unwrap();
        assert_eq!(outcome, SliceOutcome::Idle);
        assert!(renderer.is_idle());
    }

    #[test]
    fn render_with_no_container_is_rejected() {
        let mut renderer = Renderer::new(NoopHost);
        let err = renderer.render(small_tree(), None).unwrap_err();
        assert!(matches!(err, RenderError::InvalidContainer));
        assert!(renderer.is_idle());
    }

    #[test]
    fn exhausted_budget_suspends_and_a_later_slice_resumes() {
        let mut renderer = Renderer::new(NoopHost);
        renderer.render(small_tree(), Some(99)).unwrap();

        let outcome = renderer.run_slice(&mut Grants(2)).unwrap();
        assert_eq!(outcome, SliceOutcome::Suspended);
        assert!(!renderer.is_idle());

        let outcome = renderer.run_slice(&mut Unlimited).unwrap();
        assert_eq!(outcome, SliceOutcome::Completed);
        assert!(renderer.is_idle());
    }

    #[test]
    fn completed_request_leaves_the_renderer_idle() {
        let mut renderer = Renderer::new(NoopHost);
        renderer.render(small_tree(), Some(99)).unwrap();
        let outcome = renderer.run_slice(&mut Unlimited).unwrap();
        assert_eq!(outcome, SliceOutcome::Completed);
        assert_eq!(
            renderer.run_slice(&mut Unlimited).unwrap(),
            SliceOutcome::Idle
        );
    }

    #[test]
    fn deadline_budget_counts_down() {
        let mut deadline = Deadline::within(Duration::from_secs(60));
        let first = deadline.remaining();
        assert!(first > Duration::from_secs(59));
        assert!(deadline.remaining() <= first);
    }
}
