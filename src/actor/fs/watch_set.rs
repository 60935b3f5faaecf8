//! Directories registered with the watcher.
//!
//! Each folder is watched non-recursively so hidden trees (`.git`,
//! `node_modules/.cache`) never produce events. The set only grows:
//! folders created or moved in are added as their events arrive, and a
//! removed folder's watch dies with it.

use std::path::{Path, PathBuf};

use jwalk::WalkDir;
use notify::{RecursiveMode, Watcher};
use rustc_hash::FxHashSet;

use crate::{debug, log};

#[derive(Debug, Default)]
pub(super) struct WatchSet {
    dirs: FxHashSet<PathBuf>,
}

impl WatchSet {
    pub(super) fn new() -> Self {
        Self::default()
    }

    /// Watch `root` and every non-hidden folder below it. Returns how many
    /// folders were newly added.
    pub(super) fn register_tree(&mut self, watcher: &mut impl Watcher, root: &Path) -> usize {
        collect_dirs(root)
            .into_iter()
            .filter(|dir| self.register(watcher, dir))
            .count()
    }

    fn register(&mut self, watcher: &mut impl Watcher, dir: &Path) -> bool {
        if self.dirs.contains(dir) {
            return false;
        }
        match watcher.watch(dir, RecursiveMode::NonRecursive) {
            Ok(()) => {
                debug!("watch"; "watching {}", dir.display());
                self.dirs.insert(dir.to_path_buf());
                true
            }
            Err(e) => {
                log!("watch"; "cannot watch {}: {}", dir.display(), e);
                false
            }
        }
    }

    #[cfg(test)]
    pub(super) fn contains(&self, dir: &Path) -> bool {
        self.dirs.contains(dir)
    }

    pub(super) fn len(&self) -> usize {
        self.dirs.len()
    }
}

/// `root` plus all non-hidden folders below it, sorted.
pub(super) fn collect_dirs(root: &Path) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = WalkDir::new(root)
        .skip_hidden(true)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.path())
        .collect();
    dirs.sort();
    dirs
}
