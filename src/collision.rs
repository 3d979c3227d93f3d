use crate::error::{RenamerError, Result};
use log::{debug, info};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Upper bound on `name (N).ext` probes before giving up on a file.
pub const MAX_COLLISION_ATTEMPTS: usize = 10_000;

/// `candidate` + ` (index)` + `extension`, without the suffix for index 1.
fn numbered_path(candidate: &Path, index: usize, extension: &str) -> PathBuf {
    let mut name = OsString::from(candidate.as_os_str());
    if index > 1 {
        name.push(format!(" ({})", index));
    }
    name.push(extension);
    PathBuf::from(name)
}

/// Finds the path `original` would be renamed to, without touching the disk.
///
/// `original` itself counts as free, so a file that already carries the
/// generated name keeps it.
pub fn probe_path(original: &Path, candidate: &Path, extension: &str) -> Result<PathBuf> {
    for index in 1..=MAX_COLLISION_ATTEMPTS {
        let path = numbered_path(candidate, index, extension);
        if path == original {
            return Ok(path);
        }

        let taken = path
            .try_exists()
            .map_err(|e| RenamerError::rename(original, format!("cannot check {:?}: {}", path, e)))?;
        if !taken {
            return Ok(path);
        }
        debug!("{:?} already exists", path);
    }

    Err(RenamerError::rename(
        original,
        format!(
            "no free name found for {:?} after {} attempts",
            candidate, MAX_COLLISION_ATTEMPTS
        ),
    ))
}

/// Renames `original` to `candidate` + `extension`, adding ` (2)`, ` (3)`, ...
/// when that name is taken by another file. Never overwrites an existing file.
pub fn resolve_path(original: &Path, candidate: &Path, extension: &str) -> Result<PathBuf> {
    if !original.exists() {
        return Err(RenamerError::rename(original, "the file does not exist"));
    }

    let target = probe_path(original, candidate, extension)?;
    if target == original {
        info!("The new file name is identical to the old one. Nothing will be changed");
        return Ok(target);
    }

    fs::rename(original, &target).map_err(|e| RenamerError::rename(original, e))?;
    if target != numbered_path(candidate, 1, extension) {
        info!("Another file with the same name was already present, a numerical index was added");
    }
    Ok(target)
}
