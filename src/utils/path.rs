//! Path helpers shared by discovery, the watcher and the dev server.

use std::path::{Component, Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Site-relative `/`-separated form of `path`, or `None` when `path` is
/// not under `root`.
pub fn to_site_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect();
    Some(parts.join("/"))
}

/// Hidden entries start with a dot (`.git`, `.DS_Store`, editor temp files).
#[inline]
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Parent folder of a site path, `""` at the top level.
#[inline]
pub fn parent_dir(site_path: &str) -> &str {
    site_path.rfind('/').map_or("", |i| &site_path[..i])
}

/// Relative `/`-separated path that cannot leave the folder it is joined
/// to: no leading `/`, no backslash, no empty or `..` segment.
pub fn is_contained(rel: &str) -> bool {
    !rel.starts_with('/') && !rel.contains('\\') && rel.split('/').all(|s| !s.is_empty() && s != "..")
}

/// Join a site folder and a relative name without doubling slashes.
pub fn join_site_path(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}
