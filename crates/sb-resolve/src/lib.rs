//! # sb-resolve
//!
//! Module source references and fetch-URL rewriting.
//!
//! A shadow environment redirects module fetches to its own forge so
//! that "install from the internet" flows resolve against sandboxed
//! copies. The crate keeps two ideas strictly apart:
//!
//! - the **canonical** form of a source (`git+https://host/owner/name@ref`),
//!   which is what gets persisted in lock records for reproducibility;
//! - the **effective** fetch URL, derived on demand from an explicit
//!   [`RewriteConfig`] and never stored anywhere.
//!
//! Rewriting is pure: no network access, no ambient environment reads.
//! The binary reads its rewrite environment variable exactly once at
//! the edge and threads the value in here as data.

pub mod error;
pub mod source;

pub use error::ResolveError;
pub use source::{Resolution, RewriteConfig, SourceReference, DEFAULT_ORG};
