//! Error Types
//!
//! Every failure this engine can surface is a programmer error, not an
//! environmental one, so none of them are retried. A failed render request
//! is abandoned before commit, which means the host tree always stays at
//! its last committed state.

use thiserror::Error;

/// Errors surfaced by a render request.
#[derive(Debug, Error)]
pub enum RenderError {
    /// `render` was called without a host container to mount into.
    ///
    /// Surfaced immediately, before any work is queued.
    #[error("render target container is missing")]
    InvalidContainer,

    /// The stateful-value primitive was used inconsistently across renders
    /// of the same tree position.
    ///
    /// Hook identity is purely positional: the Nth call in one render maps
    /// to the Nth call in the previous one. A differing call count or a
    /// differing value type would silently misalign unrelated state cells,
    /// so it is detected and surfaced instead.
    #[error("hook misuse: {0}")]
    HookMisuse(String),

    /// The host adapter does not recognize a node kind it was asked to
    /// materialize. Fatal for the subtree being expanded.
    #[error("unknown host node kind `{0}`")]
    UnknownNodeKind(String),
}
