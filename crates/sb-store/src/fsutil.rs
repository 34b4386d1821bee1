// fsutil.rs — Recursive tree copy and walk, shared by snapshot and diff.

use std::fs;
use std::path::Path;

use crate::error::StoreError;
use crate::exclude::ExcludeRules;

/// Recursively copy `src` into `dst`, skipping excluded entries.
///
/// `dst` must already exist. Symlinks are followed (the mirrored copy
/// is a plain tree, like the container-side copy it is compared with).
pub fn copy_tree_filtered(
    src: &Path,
    dst: &Path,
    rules: &ExcludeRules,
) -> Result<(), StoreError> {
    let entries = fs::read_dir(src).map_err(|source| StoreError::io(src, source))?;

    for entry in entries {
        let entry = entry.map_err(|source| StoreError::io(src, source))?;
        let file_name = entry.file_name();
        if rules.is_excluded(&file_name.to_string_lossy()) {
            continue;
        }

        let src_path = entry.path();
        let dst_path = dst.join(&file_name);

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)
                .map_err(|source| StoreError::io(&dst_path, source))?;
            copy_tree_filtered(&src_path, &dst_path, rules)?;
        } else {
            fs::copy(&src_path, &dst_path)
                .map_err(|source| StoreError::io(&dst_path, source))?;
        }
    }

    Ok(())
}

/// Walk a directory tree and collect file paths relative to `root`.
///
/// Missing directories yield an empty result rather than an error, so
/// callers can uniformly walk trees that may not have been created yet.
pub fn walk_relative(dir: &Path, root: &Path, files: &mut Vec<String>) -> Result<(), StoreError> {
    if !dir.exists() {
        return Ok(());
    }

    let entries = fs::read_dir(dir).map_err(|source| StoreError::io(dir, source))?;

    for entry in entries {
        let entry = entry.map_err(|source| StoreError::io(dir, source))?;
        let path = entry.path();

        if path.is_dir() {
            walk_relative(&path, root, files)?;
        } else if let Ok(rel) = path.strip_prefix(root) {
            files.push(rel.to_string_lossy().to_string());
        }
    }

    Ok(())
}
