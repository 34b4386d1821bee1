//! # sb-mirror
//!
//! The workspace mirroring subsystem: moving trees across the
//! host/container boundary, detecting divergence, and reconciling it
//! back to the host.
//!
//! - [`MirrorTransport`] — liveness-gated copy in/out of the container
//!   workspace; the only component that moves data through the backend.
//! - [`DiffEngine`] — pulls the mirrored tree into scratch space and
//!   compares it against the activation-time snapshot.
//! - [`PromoteEngine`] — overwrites the host workspace (preserving VCS
//!   metadata) with the mirrored tree and consumes the snapshot.
//!
//! Divergence is never a failure: a diff with changes is the expected,
//! actionable output. Failures here are preconditions (not running, no
//! baseline) or transfer problems, classified in [`MirrorError`].

pub mod diff;
pub mod error;
pub mod promote;
pub mod transport;

#[cfg(test)]
pub(crate) mod fake;

pub use diff::{ChangeKind, DiffEngine, DiffEntry, DiffReport};
pub use error::MirrorError;
pub use promote::PromoteEngine;
pub use transport::MirrorTransport;
