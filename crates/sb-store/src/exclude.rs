// exclude.rs — The fixed exclusion set shared by capture and diff.
//
// Snapshot capture and divergence reporting must apply the *same*
// filter, otherwise tool-generated artifacts show up as false
// divergence. The set is deliberately fixed rather than user-editable:
// the testable properties of the mirroring subsystem depend on it
// being deterministic.

use std::path::{Component, Path};

use crate::layout::STATE_DIR_NAME;

/// Patterns excluded from snapshots and diffs.
///
/// - `name/` — matches a directory with this name at any depth
/// - `*.ext` — matches files by extension
/// - `name` — exact name match
const EXCLUDED_PATTERNS: &[&str] = &[
    // Version-control metadata
    ".git/",
    ".hg/",
    ".svn/",
    // Build caches
    "target/",
    "dist/",
    "build/",
    ".cache/",
    "__pycache__/",
    "*.pyc",
    // Dependency-install directories
    "node_modules/",
    ".venv/",
    "venv/",
];

/// The exclusion filter applied to every tree copy and comparison.
#[derive(Debug, Clone, Default)]
pub struct ExcludeRules {
    _priv: (),
}

impl ExcludeRules {
    /// The standard (and only) rule set.
    pub fn standard() -> Self {
        Self { _priv: () }
    }

    /// Should an entry with this name be excluded?
    ///
    /// Checks a single path component. The state directory name is
    /// always excluded so a state root accidentally nested inside a
    /// workspace never produces a self-referential snapshot.
    pub fn is_excluded(&self, name: &str) -> bool {
        if name == STATE_DIR_NAME {
            return true;
        }
        for pattern in EXCLUDED_PATTERNS {
            if let Some(dir_name) = pattern.strip_suffix('/') {
                if name == dir_name {
                    return true;
                }
            } else if let Some(suffix) = pattern.strip_prefix('*') {
                if name.ends_with(suffix) {
                    return true;
                }
            } else if name == *pattern {
                return true;
            }
        }
        false
    }

    /// Should a relative path be skipped? True if *any* component matches.
    pub fn is_excluded_path(&self, rel_path: &str) -> bool {
        for component in Path::new(rel_path).components() {
            if let Component::Normal(name) = component {
                if self.is_excluded(&name.to_string_lossy()) {
                    return true;
                }
            }
        }
        false
    }
}
