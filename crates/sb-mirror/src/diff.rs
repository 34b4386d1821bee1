// diff.rs — Divergence reporting between snapshot and mirrored tree.
//
// The mirrored tree is pulled into scratch space and compared against
// the activation-time snapshot with the same exclusion rules capture
// used. Content equality is decided by full byte comparison — mtimes
// are not preserved across the docker cp boundary and sizes can
// coincide.

use std::fmt;
use std::fs;
use std::path::Path;

use sb_backend::Backend;
use sb_store::{walk_relative, ExcludeRules, SnapshotStore};

use crate::error::MirrorError;
use crate::transport::MirrorTransport;

/// Classification of one diverging path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Present in the mirror, absent from the baseline.
    Added,
    /// Present in the baseline, absent from the mirror.
    Removed,
    /// Present in both with differing content.
    Modified,
}

impl ChangeKind {
    fn label(self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Removed => "removed",
            ChangeKind::Modified => "modified",
        }
    }
}

/// One diverging path in a divergence report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffEntry {
    pub path: String,
    pub kind: ChangeKind,
}

/// The outcome of a diff: an itemized, path-sorted divergence report.
///
/// Divergence is not a failure — an empty report renders as the fixed
/// "no changes" message, a non-empty one as one line per path.
#[derive(Debug, Clone)]
pub struct DiffReport {
    entries: Vec<DiffEntry>,
}

impl DiffReport {
    pub fn is_clean(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[DiffEntry] {
        &self.entries
    }
}

impl fmt::Display for DiffReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return write!(f, "No changes detected.");
        }
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {}", entry.kind.label(), entry.path)?;
        }
        Ok(())
    }
}

/// Compares the mirrored tree against the snapshot baseline.
pub struct DiffEngine<'a> {
    backend: &'a dyn Backend,
    snapshots: &'a SnapshotStore,
}

impl<'a> DiffEngine<'a> {
    pub fn new(backend: &'a dyn Backend, snapshots: &'a SnapshotStore) -> Self {
        Self { backend, snapshots }
    }

    /// Report divergence between the baseline and the current mirror.
    pub fn diff(&self, shadow: &str) -> Result<DiffReport, MirrorError> {
        if !self.backend.is_running(shadow) {
            return Err(MirrorError::NotRunning(shadow.to_string()));
        }
        if !self.snapshots.exists(shadow) {
            return Err(MirrorError::NoBaseline(shadow.to_string()));
        }

        // TempDir removes the scratch copy on drop — on every return
        // path, including errors.
        let scratch = tempfile::tempdir()
            .map_err(|source| MirrorError::io(std::env::temp_dir(), source))?;
        MirrorTransport::new(self.backend).copy_out(shadow, scratch.path())?;

        let report = compare_trees(
            &self.snapshots.path(shadow),
            scratch.path(),
            self.snapshots.rules(),
        )?;
        tracing::info!(shadow, changes = report.entries().len(), "computed diff");
        Ok(report)
    }
}

/// Recursively compare two trees, applying the exclusion rules to both
/// sides so tool-generated artifacts never show up as divergence.
fn compare_trees(
    baseline: &Path,
    current: &Path,
    rules: &ExcludeRules,
) -> Result<DiffReport, MirrorError> {
    let mut baseline_files = Vec::new();
    walk_relative(baseline, baseline, &mut baseline_files)?;
    let mut current_files = Vec::new();
    walk_relative(current, current, &mut current_files)?;

    let mut entries = Vec::new();

    for path in &current_files {
        if rules.is_excluded_path(path) {
            continue;
        }
        let base_path = baseline.join(path);
        // A baseline entry that is not a file here (absent, or a
        // directory this path now tunnels through) means the file is
        // new; the replaced file itself is reported by the removed
        // pass below.
        if !base_path.is_file() {
            entries.push(DiffEntry {
                path: path.clone(),
                kind: ChangeKind::Added,
            });
            continue;
        }
        let curr_path = current.join(path);
        let base_content =
            fs::read(&base_path).map_err(|source| MirrorError::io(&base_path, source))?;
        let curr_content =
            fs::read(&curr_path).map_err(|source| MirrorError::io(&curr_path, source))?;
        if base_content != curr_content {
            entries.push(DiffEntry {
                path: path.clone(),
                kind: ChangeKind::Modified,
            });
        }
    }

    for path in &baseline_files {
        if rules.is_excluded_path(path) {
            continue;
        }
        // is_file, not exists: a directory that took over this name
        // still means the original file is gone.
        if !current.join(path).is_file() {
            entries.push(DiffEntry {
                path: path.clone(),
                kind: ChangeKind::Removed,
            });
        }
    }

    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(DiffReport { entries })
}
