//! # sb-gateway
//!
//! Lifecycle controller for shadow environments.
//!
//! A [`Gateway`] binds one shadow name to the execution backend and the
//! three state stores, and composes them into the operations callers
//! use: activate, deactivate, run_command, diff, promote. It also talks
//! to the shadow's forge (artifact host): readiness polling, admin
//! bootstrap, and module publishing.
//!
//! Activation ordering is deliberate — backend start, mirror-in,
//! snapshot capture, config persist — so a failure partway never
//! leaves a stale config record pointing at an uninitialized mirror.

pub mod bootstrap;
pub mod error;
pub mod forge;
pub mod gateway;
pub mod publish;
#[cfg(test)]
pub(crate) mod testutil;

pub use bootstrap::ForgeAdmin;
pub use error::GatewayError;
pub use forge::ForgeClient;
pub use gateway::Gateway;
