// error.rs — Error types for source resolution.

use thiserror::Error;

/// Errors that can occur parsing a module fetch URI.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The URI does not have the `scheme+origin-url[@ref]` shape.
    #[error("invalid fetch URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: &'static str },
}
