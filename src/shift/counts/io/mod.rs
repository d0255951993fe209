use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::shift::counts::error::Result;

pub mod excel_read;
pub mod excel_write;
pub mod store;

/// Sibling path a file is written to before it replaces `path`.
pub(crate) fn temporary_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Moves a fully written temporary file over its target. The temporary file
/// is removed when the move fails so the target keeps its previous content.
pub(crate) fn commit_temporary(temporary: &Path, target: &Path) -> Result<()> {
    if let Err(error) = fs::rename(temporary, target) {
        let _ = fs::remove_file(temporary);
        return Err(error.into());
    }
    Ok(())
}

/// Creates the parent directory of `path` when it does not exist yet.
pub(crate) fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
