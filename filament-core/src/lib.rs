//! # Filament
//!
//! An incremental UI rendering engine built around interruptible work.
//!
//! Filament turns an immutable tree of [`Element`] descriptions into
//! mutations on a host node tree, and keeps the two in sync across
//! re-renders by diffing against the previously committed generation
//! instead of rebuilding from scratch.
//!
//! # Architecture
//!
//! The pipeline has three phases, each owned by one module:
//!
//! 1. **Expansion** ([`fiber`], [`render`]) — each element becomes a fiber,
//!    a unit of work in an arena-backed tree. Components are evaluated with
//!    a fresh [`Scope`] replaying their hook state; host elements get a
//!    detached node. One fiber is expanded per unit of work.
//! 2. **Reconciliation** ([`render`]) — a fiber's fresh children are diffed
//!    positionally against the children its previous generation produced,
//!    tagging each new fiber with a placement or update effect and each
//!    orphaned old fiber with a deletion.
//! 3. **Commit** ([`render`], [`host`]) — when the whole tree has been
//!    expanded, a single uninterruptible pass applies every effect through
//!    a [`HostAdapter`] and promotes the new generation to current.
//!
//! Expansion and reconciliation are interruptible: [`Renderer::run_slice`]
//! works against a [`Budget`] and suspends between fibers when it runs out,
//! so long renders never block the caller for more than one unit of work.
//! The committed tree stays fully consistent while work is in flight.
//!
//! # Example
//!
//! ```rust,ignore
//! use filament_core::{attr, Attrs, Element, EventHandler, RenderError, Renderer, Scope};
//!
//! fn counter(scope: &mut Scope, _attrs: &Attrs) -> Result<Element, RenderError> {
//!     let (count, set_count) = scope.use_state(|| 0u32)?;
//!     let on_click = EventHandler::new(move || set_count.update(|n| *n + 1));
//!     Ok(Element::node(
//!         "button",
//!         vec![attr("on_click", on_click)],
//!         vec![Element::text(count.to_string())],
//!     ))
//! }
//!
//! let mut renderer = Renderer::new(my_host_adapter);
//! renderer.render(Element::component(counter, vec![]), Some(container))?;
//! renderer.run_to_idle()?;
//! ```

pub mod element;
pub mod error;
pub mod fiber;
pub mod host;
pub mod render;

pub use element::{attr, AttrValue, Attrs, Component, Element, EventHandler, NodeKind, TEXT_VALUE};
pub use error::RenderError;
pub use fiber::{EffectTag, FiberId, Scope, Setter};
pub use host::{diff_attributes, AttrPatch, HostAdapter};
pub use render::{Budget, Deadline, Renderer, SliceOutcome, Unlimited};
