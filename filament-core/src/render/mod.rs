//! Rendering Pipeline
//!
//! The three phases that turn an element description into host mutations:
//!
//! - `reconcile` — positional diffing of a parent's fresh child elements
//!   against the previously committed child chain, tagging each position
//!   placement, update, or deletion.
//! - `scheduler` — the cooperative unit-of-work loop. Work proceeds one
//!   fiber at a time inside a time slice and suspends at unit boundaries
//!   when the slice budget runs out, resuming later from the exact same
//!   pointer.
//! - `commit` — once no work remains, a single atomic pass applies every
//!   effect to the host tree and promotes the work-in-progress tree to
//!   current.
//!
//! Expansion never touches mounted host nodes; only the commit pass does,
//! and only over fully completed trees. A render request that fails or is
//! superseded mid-flight is simply never committed.

mod commit;
mod reconcile;
mod scheduler;

pub use scheduler::{Budget, Deadline, Renderer, SliceOutcome, Unlimited};
