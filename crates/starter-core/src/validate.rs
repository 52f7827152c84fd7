//! Target directory validation

use crate::error::{ConflictEntry, Result, ScaffoldError};
use std::path::Path;
use tracing::debug;

/// Check that `target` is absent or empty.
///
/// Never touches the filesystem beyond reading the directory listing.
pub fn validate_target(target: &Path) -> Result<()> {
    if !target.exists() {
        debug!("Target {} does not exist yet", target.display());
        return Ok(());
    }

    if !target.is_dir() {
        return Err(ScaffoldError::ValidationConflict {
            path: target.to_path_buf(),
            entries: vec![ConflictEntry {
                path: target.to_path_buf(),
                is_dir: false,
            }],
        });
    }

    let mut entries = Vec::new();
    // An unreadable directory cannot be proven empty
    let listing = std::fs::read_dir(target).map_err(|e| {
        debug!("Cannot list {}: {}", target.display(), e);
        ScaffoldError::ValidationConflict {
            path: target.to_path_buf(),
            entries: vec![ConflictEntry {
                path: target.to_path_buf(),
                is_dir: true,
            }],
        }
    })?;

    for entry in listing.flatten() {
        let path = entry.path();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        entries.push(ConflictEntry { path, is_dir });
    }

    if entries.is_empty() {
        debug!("Target {} exists and is empty", target.display());
        return Ok(());
    }

    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Err(ScaffoldError::ValidationConflict {
        path: target.to_path_buf(),
        entries,
    })
}
