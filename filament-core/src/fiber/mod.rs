//! Fiber Tree
//!
//! This module implements the mutable work representation of the engine:
//! one fiber per element position, stored in a generational arena, plus
//! the per-fiber state cells that survive across renders.
//!
//! # Double buffering
//!
//! At most two fiber trees exist at a time: the *current* tree (last
//! committed, host-accurate) and the *work-in-progress* tree being built
//! and diffed. Each tree is its own arena; a work fiber's `alternate` is
//! an index into the current tree's arena, pointing at the fiber that
//! occupied the same position (same parent, same child index) in the last
//! committed generation. Promotion at the end of commit is a single arena
//! move.
//!
//! # Design Decisions
//!
//! 1. Fibers live in a [`slotmap`] arena and link to each other by id
//!    rather than by reference. The tree shape is naturally cyclic
//!    (parent back-pointers, cross-generation alternates), and indices
//!    sidestep the ownership ambiguity entirely.
//!
//! 2. Hook cells are shared across generations by reference counting:
//!    carrying a cell forward is a pointer clone, and a setter created in
//!    any generation keeps feeding the same cell.

mod arena;
mod hooks;

pub use arena::{EffectTag, FiberId};
pub(crate) use arena::{Fiber, FiberTree};
pub(crate) use hooks::HookList;
pub use hooks::{Scope, Setter};
