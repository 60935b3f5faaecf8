//! Generated-file manifest (`_s4g/manifest`).
//!
//! Records every file the last rebuild wrote, one site-relative path per
//! line, so the next rebuild can delete outputs that are no longer
//! produced.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;

use super::BuildError;
use crate::debug;
use crate::utils::path::is_contained;

pub const MANIFEST_PATH: &str = "_s4g/manifest";

pub type FileSet = BTreeSet<String>;

/// Previous rebuild's outputs. A missing manifest is an empty set.
pub fn read(site_dir: &Path) -> Result<FileSet, BuildError> {
    let path = site_dir.join(MANIFEST_PATH);
    match fs::read_to_string(&path) {
        Ok(text) => Ok(text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(FileSet::new()),
        Err(e) => Err(BuildError::io(path, e)),
    }
}

pub fn write(site_dir: &Path, files: &FileSet) -> Result<(), BuildError> {
    let path = site_dir.join(MANIFEST_PATH);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
    }
    let mut text = String::new();
    for file in files {
        text.push_str(file);
        text.push('\n');
    }
    fs::write(&path, text).map_err(|e| BuildError::io(path, e))
}

/// Delete every file in `old` that is not in `new`. Returns what was
/// removed. Entries that would escape the site folder are skipped.
pub fn prune(site_dir: &Path, old: &FileSet, new: &FileSet) -> Result<Vec<String>, BuildError> {
    let mut removed = Vec::new();
    for stale in old.difference(new) {
        if !is_contained(stale) {
            debug!("build"; "refusing to prune {:?}", stale);
            continue;
        }
        let path = site_dir.join(stale);
        match fs::remove_file(&path) {
            Ok(()) => removed.push(stale.clone()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(BuildError::io(path, e)),
        }
    }
    Ok(removed)
}
