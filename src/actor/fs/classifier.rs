//! Decides which raw notify events count as a change to the site.

use std::path::Path;

use notify::EventKind;
use notify::event::ModifyKind;

use crate::build::manifest::MANIFEST_PATH;
use crate::utils::path::{is_hidden, to_site_path};

/// Extensions whose plain writes trigger a rebuild: content, templates,
/// settings and redirect rules.
pub(super) const WATCHED_EXTS: &[&str] = &["dj", "tmpl", "txt"];

/// Coarse kind of a notify event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ChangeKind {
    Created,
    Renamed,
    Written,
    Removed,
}

impl ChangeKind {
    /// `None` for events that never matter (access, chmod, mtime).
    pub(super) fn from_event(kind: &EventKind) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(Self::Created),
            EventKind::Remove(_) => Some(Self::Removed),
            EventKind::Modify(ModifyKind::Name(_)) => Some(Self::Renamed),
            EventKind::Modify(ModifyKind::Metadata(_)) => None,
            EventKind::Modify(_) | EventKind::Any | EventKind::Other => Some(Self::Written),
            EventKind::Access(_) => None,
        }
    }

    /// Kinds that may introduce a new folder to watch.
    pub(super) fn may_add_dir(self) -> bool {
        matches!(self, Self::Created | Self::Renamed)
    }

    pub(super) fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Renamed => "renamed",
            Self::Written => "written",
            Self::Removed => "removed",
        }
    }
}

/// Hidden entries (anywhere on the path below the site folder), the
/// manifest and editor swap files.
pub(super) fn should_ignore(site_dir: &Path, path: &Path) -> bool {
    let Some(rel) = to_site_path(site_dir, path) else {
        return true;
    };
    if rel == MANIFEST_PATH {
        return true;
    }
    if rel.split('/').any(is_hidden) {
        return true;
    }
    let name = rel.rsplit('/').next().unwrap_or("");
    name.ends_with(".swp") || name.ends_with(".swo") || name.ends_with('~')
}

/// Whether one path of one event should reset the debounce timer.
///
/// Plain writes only count for watched extensions, otherwise generated
/// `.html` output would retrigger the rebuild that wrote it.
pub(super) fn is_relevant(site_dir: &Path, path: &Path, kind: ChangeKind) -> bool {
    if should_ignore(site_dir, path) {
        return false;
    }
    if kind == ChangeKind::Written {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        return WATCHED_EXTS.contains(&ext);
    }
    true
}
