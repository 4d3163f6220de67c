//! File system helpers: repository discovery and atomic writes.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Walks up from `start` looking for a directory that contains `.git`.
///
/// Returns the first such directory, or `None` when the filesystem root is reached.
/// `.git` may be a directory (regular checkout) or a file (worktrees, submodules).
///
/// # Examples
///
/// ```rust,no_run
/// use git_variables::utils::find_repo_root;
/// use std::path::Path;
///
/// if let Some(root) = find_repo_root(Path::new("services/api")) {
///     println!("repository at {}", root.display());
/// }
/// ```
#[must_use]
pub fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let start = if start.is_absolute() {
        start.to_path_buf()
    } else {
        std::env::current_dir().ok()?.join(start)
    };

    start.ancestors().find(|dir| dir.join(".git").exists()).map(Path::to_path_buf)
}

/// Writes a file atomically by writing to a temporary sibling and renaming.
///
/// Parent directories are created when missing.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let temp_path = path.with_extension("tmp");

    {
        let mut file = fs::File::create(&temp_path)
            .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

        file.write_all(content)
            .with_context(|| format!("Failed to write to temp file: {}", temp_path.display()))?;

        file.sync_all().with_context(|| "Failed to sync file to disk")?;
    }

    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;

    Ok(())
}
