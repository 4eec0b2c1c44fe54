//! File operations: rename, create folder and delete.
//!
//! These are the only places the engine mutates the filesystem. None of them
//! refresh a listing; callers rebuild the displayed list after a confirmed
//! success.

use std::path::{Path, PathBuf};

use canopy_core::logging::targets;

use crate::entry::{join_name, split_name};
use crate::error::{BrowseError, BrowseResult};
use crate::fs::FileSystem;

/// Check that `name` can be used as a single path component.
///
/// Blank names (empty or whitespace only) give `EmptyName`; names holding a
/// path separator or a NUL, and the `.`/`..` pseudo-entries, give
/// `InvalidName`.
pub fn validate_name(name: &str) -> BrowseResult<()> {
    if name.trim().is_empty() {
        return Err(BrowseError::EmptyName);
    }
    let has_separator = name.contains('/') || name.contains(std::path::MAIN_SEPARATOR);
    if has_separator || name.contains('\0') || name == "." || name == ".." {
        return Err(BrowseError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Rename `from` to `new_name` within the same directory.
///
/// Never overwrites: an existing target gives `NameConflict` and leaves both
/// entries untouched. A target that is the same filesystem object as `from`
/// (a case-only change on a case-insensitive volume) is allowed.
#[tracing::instrument(skip(fs), target = "canopy::rename", level = "debug")]
pub fn rename_to(fs: &dyn FileSystem, from: &Path, new_name: &str) -> BrowseResult<PathBuf> {
    validate_name(new_name)?;
    let parent = from.parent().ok_or_else(|| BrowseError::not_found(from))?;
    let target = parent.join(new_name);

    if !fs.path_exists(from) {
        return Err(BrowseError::not_found(from));
    }
    if target == from {
        return Ok(target);
    }
    if fs.path_exists(&target) && !fs.is_same_entry(from, &target) {
        return Err(BrowseError::name_conflict(target));
    }

    fs.rename(from, &target)?;
    tracing::debug!(target: targets::RENAME, from = %from.display(), to = %target.display(), "renamed");
    Ok(target)
}

/// Rename the entry at `path`, keeping its extension.
///
/// `new_base` replaces the part of the name before the extension; see
/// [`split_name`]. Directories are renamed whole.
pub fn rename_entry(fs: &dyn FileSystem, path: &Path, new_base: &str) -> BrowseResult<PathBuf> {
    if new_base.trim().is_empty() {
        return Err(BrowseError::EmptyName);
    }
    let name = path
        .file_name()
        .ok_or_else(|| BrowseError::not_found(path))?
        .to_string_lossy();
    let (_, extension) = split_name(&name, fs.is_directory(path));
    let new_name = join_name(new_base, extension);
    rename_to(fs, path, &new_name)
}

/// Create the directory `name` inside `parent`.
#[tracing::instrument(skip(fs), target = "canopy::navigation", level = "debug")]
pub fn create_folder(fs: &dyn FileSystem, parent: &Path, name: &str) -> BrowseResult<PathBuf> {
    validate_name(name)?;
    if !fs.is_directory(parent) {
        return Err(BrowseError::not_found(parent));
    }
    let target = parent.join(name);
    if fs.path_exists(&target) {
        return Err(BrowseError::name_conflict(target));
    }
    fs.create_directory(&target)?;
    Ok(target)
}

/// Delete a file, or a directory with everything below it.
#[tracing::instrument(skip(fs), target = "canopy::navigation", level = "debug")]
pub fn delete_entry(fs: &dyn FileSystem, path: &Path) -> BrowseResult<()> {
    if !fs.path_exists(path) {
        return Err(BrowseError::not_found(path));
    }
    fs.remove(path)
}
