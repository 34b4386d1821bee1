//! # sb-store
//!
//! Filesystem-as-database stores for Shadowbox.
//!
//! All persistent state lives in three parallel directories under one
//! state root (`~/.shadowbox` by default), each keyed by shadow name:
//!
//! - [`ConfigStore`] — one JSON record per shadow (workspace path, port).
//! - [`CredentialStore`] — one bearer-token file per shadow, mode 0600.
//! - [`SnapshotStore`] — one exclusion-filtered workspace copy per shadow.
//!
//! Each store is a narrow get/put/delete/exists surface so the backing
//! store could be swapped (embedded database, object store) without
//! touching callers. The state root deliberately sits *outside* any
//! workspace; [`ExcludeRules`] additionally filters the state directory
//! name so a nested root can never snapshot itself.

pub mod config;
pub mod credential;
pub mod error;
pub mod exclude;
mod fsutil;
pub mod layout;
pub mod snapshot;

pub use config::{ConfigStore, ShadowConfig};
pub use credential::CredentialStore;
pub use error::StoreError;
pub use exclude::ExcludeRules;
pub use fsutil::{copy_tree_filtered, walk_relative};
pub use layout::StateLayout;
pub use snapshot::SnapshotStore;
