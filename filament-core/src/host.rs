//! Host Adapter
//!
//! The engine never touches the host tree directly. Everything it needs
//! from the outside world is the four operations of [`HostAdapter`]:
//! create a node for a kind, apply an attribute diff, append a child,
//! remove a child. A browser document, a terminal surface, or an in-memory
//! test double all fit behind the same trait.
//!
//! # Diff policy
//!
//! [`diff_attributes`] is the single shared implementation of the
//! attribute diff both the committer (for updates) and first
//! materialization (against an empty baseline) rely on. Given `prev` and
//! `next` it emits patches in a strict order:
//!
//! 1. unbind event handlers absent from `next` or whose identity changed,
//! 2. clear plain attributes absent from `next`,
//! 3. set plain attributes that are new or changed,
//! 4. bind event handlers that are new or whose identity changed.
//!
//! Removals strictly precede additions so a changed handler never has two
//! live bindings at once. Adapters are expected to apply exactly this
//! policy in `apply_attributes`; reusing [`diff_attributes`] keeps them
//! honest.

use crate::element::{AttrValue, Attrs, EventHandler, NodeKind};
use crate::error::RenderError;

/// The mutation surface of an external host tree.
pub trait HostAdapter {
    /// Opaque reference to one host node.
    type Handle: Clone;

    /// Materialize a host node for the given kind.
    ///
    /// The only fallible operation: adapters reject kinds they do not
    /// recognize with [`RenderError::UnknownNodeKind`], which aborts the
    /// render request expanding that subtree.
    fn create_node(&mut self, kind: &NodeKind) -> Result<Self::Handle, RenderError>;

    /// Apply the diff from `prev` to `next` to an existing node, following
    /// the policy of [`diff_attributes`].
    fn apply_attributes(&mut self, node: &Self::Handle, prev: &Attrs, next: &Attrs);

    /// Append `child` into `parent`.
    fn append_child(&mut self, parent: &Self::Handle, child: &Self::Handle);

    /// Remove `child` from `parent`.
    fn remove_child(&mut self, parent: &Self::Handle, child: &Self::Handle);
}

/// One step of an attribute diff.
#[derive(Debug, PartialEq)]
pub enum AttrPatch<'a> {
    /// Unbind an event handler that is gone or superseded.
    UnbindEvent {
        /// Attribute name of the binding.
        name: &'a str,
        /// The handler that was previously bound.
        handler: &'a EventHandler,
    },
    /// Reset a plain attribute that is gone to its empty/default value.
    ClearAttr {
        /// Attribute name.
        name: &'a str,
    },
    /// Set a plain attribute that is new or changed.
    SetAttr {
        /// Attribute name.
        name: &'a str,
        /// The new value.
        value: &'a AttrValue,
    },
    /// Bind an event handler that is new or superseding.
    BindEvent {
        /// Attribute name of the binding.
        name: &'a str,
        /// The handler to bind.
        handler: &'a EventHandler,
    },
}

/// Compute the ordered patch list taking `prev` to `next`.
pub fn diff_attributes<'a>(prev: &'a Attrs, next: &'a Attrs) -> Vec<AttrPatch<'a>> {
    let mut patches = Vec::new();

    // Stale event bindings: gone from `next`, or a different handler now.
    for (name, value) in prev {
        if let AttrValue::Handler(handler) = value {
            let still_bound = matches!(
                next.get(name),
                Some(AttrValue::Handler(current)) if current.ptr_eq(handler)
            );
            if !still_bound {
                patches.push(AttrPatch::UnbindEvent { name, handler });
            }
        }
    }

    // Plain attributes gone from `next` (including ones whose value turned
    // into a handler).
    for (name, value) in prev {
        if !value.is_handler() {
            let still_plain = matches!(next.get(name), Some(current) if !current.is_handler());
            if !still_plain {
                patches.push(AttrPatch::ClearAttr { name });
            }
        }
    }

    // New or changed plain attributes.
    for (name, value) in next {
        if !value.is_handler() && prev.get(name) != Some(value) {
            patches.push(AttrPatch::SetAttr { name, value });
        }
    }

    // New or changed event bindings.
    for (name, value) in next {
        if let AttrValue::Handler(handler) = value {
            let unchanged = matches!(
                prev.get(name),
                Some(AttrValue::Handler(previous)) if previous.ptr_eq(handler)
            );
            if !unchanged {
                patches.push(AttrPatch::BindEvent { name, handler });
            }
        }
    }

    patches
}
