//! Files earlier rebuilds generated. Creating, replacing or pruning them is
//! the rebuild's own doing and must not schedule another one.

use std::path::{Path, PathBuf};

use crate::build::manifest::{self, FileSet};
use crate::debug;

pub(super) struct GeneratedFiles {
    site_dir: PathBuf,
    /// Union of every manifest seen, so pruned outputs stay known.
    files: FileSet,
}

impl GeneratedFiles {
    pub(super) fn load(site_dir: &Path) -> Self {
        let mut outputs = Self {
            site_dir: site_dir.to_path_buf(),
            files: FileSet::new(),
        };
        outputs.refresh();
        outputs
    }

    /// Merge in the manifest currently on disk.
    pub(super) fn refresh(&mut self) {
        match manifest::read(&self.site_dir) {
            Ok(files) => self.files.extend(files),
            Err(e) => debug!("watch"; "manifest unreadable: {}", e),
        }
    }

    /// `rel` is a generated file or a folder holding one.
    pub(super) fn covers(&self, rel: &str) -> bool {
        if self.files.contains(rel) {
            return true;
        }
        let prefix = format!("{rel}/");
        self.files
            .range(prefix.clone()..)
            .next()
            .is_some_and(|file| file.starts_with(&prefix))
    }

    #[cfg(test)]
    pub(super) fn from_files(files: &[&str]) -> Self {
        Self {
            site_dir: PathBuf::new(),
            files: files.iter().map(|f| f.to_string()).collect(),
        }
    }
}
