//! URL routing and URL to filesystem path resolution.

use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

use crate::embed::serve::LIVERELOAD_ENDPOINT;

/// What a request path asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Live-reload poll.
    Poll,
    /// Outside the active root: temporary redirect there.
    Redirect(String),
    /// Page (`.html` or folder), relative to the site folder.
    Page(String),
    /// Anything else, relative to the site folder.
    Static(String),
}

/// `root` always starts and ends with `/`.
pub fn route(url: &str, root: &str) -> Route {
    let path = url.split(['?', '#']).next().unwrap_or(url);

    if path == LIVERELOAD_ENDPOINT {
        return Route::Poll;
    }

    let Some(rel) = path.strip_prefix(root) else {
        return Route::Redirect(root.to_string());
    };

    if path.ends_with('/') {
        Route::Page(format!("{rel}index.html"))
    } else if path.ends_with(".html") {
        Route::Page(rel.to_string())
    } else {
        Route::Static(rel.to_string())
    }
}

/// Resolve a site-relative URL path to a file or folder inside `site_dir`.
///
/// Percent-decodes, rejects `..`, then canonicalizes so symlinks cannot
/// lead outside the site folder.
pub fn resolve_path(rel: &str, site_dir: &Path) -> Option<PathBuf> {
    let decoded = percent_decode_str(rel).decode_utf8().ok()?;
    let clean = decoded.trim_matches('/');

    if clean.split(['/', '\\']).any(|s| s == "..") {
        return None;
    }

    let canonical = site_dir.join(clean).canonicalize().ok()?;
    let root_canonical = site_dir.canonicalize().ok()?;

    canonical.starts_with(&root_canonical).then_some(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_route_at_top_root() {
        assert_eq!(route("/_livereload", "/"), Route::Poll);
        assert_eq!(route("/", "/"), Route::Page("index.html".into()));
        assert_eq!(route("/posts/", "/"), Route::Page("posts/index.html".into()));
        assert_eq!(route("/a.html?x=1", "/"), Route::Page("a.html".into()));
        assert_eq!(route("/style.css", "/"), Route::Static("style.css".into()));
        assert_eq!(route("/posts", "/"), Route::Static("posts".into()));
    }

    #[test]
    fn test_route_under_prefix() {
        let root = "/blog/";
        assert_eq!(route("/_livereload", root), Route::Poll);
        assert_eq!(route("/blog/", root), Route::Page("index.html".into()));
        assert_eq!(route("/blog/a.html", root), Route::Page("a.html".into()));
        assert_eq!(route("/", root), Route::Redirect("/blog/".into()));
        assert_eq!(route("/blog", root), Route::Redirect("/blog/".into()));
        assert_eq!(route("/other/a.html", root), Route::Redirect("/blog/".into()));
    }

    #[test]
    fn test_resolve_path() {
        let outer = TempDir::new().unwrap();
        let site = outer.path().join("site");
        fs::create_dir_all(site.join("posts")).unwrap();
        fs::write(site.join("posts/my post.html"), "x").unwrap();
        fs::write(outer.path().join("secret.txt"), "s").unwrap();

        let found = resolve_path("posts/my%20post.html", &site).unwrap();
        assert!(found.ends_with("posts/my post.html"));
        assert!(resolve_path("posts", &site).unwrap().is_dir());
        assert!(resolve_path("", &site).unwrap().is_dir());

        assert_eq!(resolve_path("../secret.txt", &site), None);
        assert_eq!(resolve_path("posts/%2e%2e/%2e%2e/secret.txt", &site), None);
        assert_eq!(resolve_path("missing.html", &site), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_rejects_symlink_escape() {
        let outer = TempDir::new().unwrap();
        let site = outer.path().join("site");
        fs::create_dir_all(&site).unwrap();
        fs::write(outer.path().join("secret.txt"), "s").unwrap();
        std::os::unix::fs::symlink(outer.path().join("secret.txt"), site.join("link.txt")).unwrap();

        assert_eq!(resolve_path("link.txt", &site), None);
    }
}
