//! Disk output: atomic writes and the module tree flush.
//!
//! Every file is written to a `.part` sibling first and renamed into place,
//! so a crashed run never leaves a truncated module or import map behind.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::VendorError;
use crate::module_table::ModuleEntry;

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `a.js` → `a.js.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Creates `dir` and its parents.
pub fn ensure_dir(dir: &Path) -> Result<(), VendorError> {
    fs::create_dir_all(dir).map_err(|e| VendorError::fs("create directory", dir, e))
}

/// Writes `contents` to `path` via a temp file and rename, creating parent
/// directories as needed.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), VendorError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let tmp = temp_path(path);
    fs::write(&tmp, contents).map_err(|e| VendorError::fs("write", &tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        VendorError::fs("rename", path, e)
    })
}

/// Writes every entry to `output_dir/<local_path>`. Returns the number of files written.
pub fn write_modules(output_dir: &Path, entries: &[ModuleEntry]) -> Result<usize, VendorError> {
    for entry in entries {
        let path = output_dir.join(&entry.local_path);
        write_atomic(&path, entry.content.as_bytes())?;
        tracing::debug!(url = entry.url.as_str(), path = %path.display(), "module written");
    }
    Ok(entries.len())
}
