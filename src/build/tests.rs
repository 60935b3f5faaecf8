use super::*;
use crate::embed::theme;
use crate::renderer::RendererError;
use crate::site::SETTINGS_PATH;
use std::fs;
use tempfile::TempDir;

/// Wraps the body in `<p>` and counts calls.
#[derive(Default)]
struct FakeRenderer {
    calls: usize,
    fail: bool,
}

impl Render for FakeRenderer {
    fn render(&mut self, body: &str) -> Result<String, RendererError> {
        if self.fail {
            return Err(RendererError::Closed);
        }
        self.calls += 1;
        Ok(format!("<p>{}</p>", body.trim()))
    }
}

fn write(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn read(dir: &Path, rel: &str) -> String {
    fs::read_to_string(dir.join(rel)).unwrap()
}

/// Site folder with the default theme and the given settings.
fn site(settings: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), SETTINGS_PATH, settings);
    for (name, content) in theme::FILES {
        write(dir.path(), &format!("_s4g/theme/{name}"), content);
    }
    dir
}

fn rebuilder(dir: &TempDir) -> Rebuilder<FakeRenderer> {
    Rebuilder::new(dir.path(), FakeRenderer::default())
}

fn manifest_lines(dir: &Path) -> Vec<String> {
    read(dir, manifest::MANIFEST_PATH)
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_full_pass_writes_pages_feed_and_manifest() {
    let dir = site("Name: Test\nNavbarLinks: index.dj\n");
    write(dir.path(), "index.dj", "Title: Home\nPageType: home\nShowInFeed: false\n---\nwelcome\n");
    write(dir.path(), "posts/first.dj", "Title: First\nPostedAt: 2024-01-02\n---\nhello\n");

    let mut rb = rebuilder(&dir);
    let report = rb.run().unwrap();

    assert_eq!(report.root, "/");
    assert_eq!(report.pages, 2);
    assert_eq!(report.feed_entries, 1);
    assert_eq!(rb.renderer.calls, 2);

    let home = read(dir.path(), "index.html");
    assert!(home.contains("<p>welcome</p>"));
    assert!(home.contains("href=\"/posts/first.html\""));
    assert!(home.contains("<title>Home | Test</title>"));

    let post = read(dir.path(), "posts/first.html");
    assert!(post.contains("<p>hello</p>"));
    assert!(post.contains("Jan 02, 2024"));

    assert!(read(dir.path(), FEED_PATH).contains("<feed"));
    assert_eq!(
        manifest_lines(dir.path()),
        vec!["feed.xml", "index.html", "posts/first.html"]
    );
}

#[test]
fn test_stale_outputs_are_pruned() {
    let dir = site("Name: Test\n");
    for name in ["a", "b", "c"] {
        write(dir.path(), &format!("{name}.dj"), "ShowInFeed: false\n---\nx\n");
    }
    let mut rb = rebuilder(&dir);
    rb.run().unwrap();
    assert_eq!(manifest_lines(dir.path()), vec!["a.html", "b.html", "c.html"]);

    fs::remove_file(dir.path().join("c.dj")).unwrap();
    let report = rb.run().unwrap();

    assert_eq!(report.pruned, 1);
    assert!(dir.path().join("a.html").exists());
    assert!(dir.path().join("b.html").exists());
    assert!(!dir.path().join("c.html").exists());
    assert_eq!(manifest_lines(dir.path()), vec!["a.html", "b.html"]);
}

#[test]
fn test_bad_nav_reference_writes_nothing() {
    let dir = site("Name: Test\n");
    write(dir.path(), "a.dj", "Title: A\n---\nx\n");
    write(dir.path(), "b.dj", "Title: B\n---\ny\n");
    let mut rb = rebuilder(&dir);
    rb.run().unwrap();
    let manifest_before = read(dir.path(), manifest::MANIFEST_PATH);
    let a_before = read(dir.path(), "a.html");

    write(dir.path(), SETTINGS_PATH, "Name: Test\nNavbarLinks: missing.dj\n");
    write(dir.path(), "a.dj", "Title: A2\n---\nchanged\n");
    fs::remove_file(dir.path().join("b.dj")).unwrap();
    rb.renderer.calls = 0;

    let err = rb.run().unwrap_err();
    let BuildError::User(site_err) = &err else {
        panic!("expected a user error, got {err:?}");
    };
    assert_eq!(site_err.file, SETTINGS_PATH);
    assert_eq!(site_err.field.as_deref(), Some("NavbarLinks"));
    assert!(!err.is_fatal());

    // nothing rendered, written or pruned
    assert_eq!(rb.renderer.calls, 0);
    assert_eq!(read(dir.path(), "a.html"), a_before);
    assert!(dir.path().join("b.html").exists());
    assert_eq!(read(dir.path(), manifest::MANIFEST_PATH), manifest_before);
}

#[test]
fn test_editing_one_page_regenerates_all() {
    let dir = site("Name: Test\nNavbarLinks: b.dj\n");
    write(dir.path(), "a.dj", "Title: A\n---\nfirst\n");
    write(dir.path(), "b.dj", "Title: B\n---\nbee\n");
    let mut rb = rebuilder(&dir);
    rb.run().unwrap();

    write(dir.path(), "a.dj", "Title: A\n---\nsecond\n");
    rb.renderer.calls = 0;
    rb.run().unwrap();

    assert_eq!(rb.renderer.calls, 2);
    let a = read(dir.path(), "a.html");
    assert!(a.contains("<p>second</p>"));
    assert!(a.contains("href=\"/b.html\""));
    let b = read(dir.path(), "b.html");
    assert!(b.contains("<p>bee</p>"));
    assert!(b.contains("class=\"current\""));
}

#[test]
fn test_renderer_failure_is_fatal() {
    let dir = site("Name: Test\n");
    write(dir.path(), "a.dj", "Title: A\n---\nx\n");
    let mut rb = Rebuilder::new(dir.path(), FakeRenderer { calls: 0, fail: true });

    let err = rb.run().unwrap_err();
    assert!(err.is_fatal());
    assert!(!dir.path().join("a.html").exists());
}

#[test]
fn test_unknown_placeholder_writes_nothing() {
    let dir = site("Name: Test\n");
    write(dir.path(), "_s4g/theme/post.tmpl", "<article>\n{{ content }}\n{{ nonsense }}\n</article>\n");
    write(dir.path(), "a.dj", "Title: A\n---\nx\n");

    let err = rebuilder(&dir).run().unwrap_err();
    let BuildError::User(site_err) = err else {
        panic!("expected a user error");
    };
    assert_eq!(site_err.file, "_s4g/theme/post.tmpl");
    assert_eq!(site_err.line, Some(3));
    assert!(!dir.path().join("a.html").exists());
    assert!(!dir.path().join(manifest::MANIFEST_PATH).exists());
}

#[test]
fn test_redirects_are_generated_and_tracked() {
    let dir = site("Name: Test\nRoot: blog\n");
    write(dir.path(), "new.dj", "ShowInFeed: false\n---\nx\n");
    write(dir.path(), "_s4g/redirects.txt", "old/page.html -> new.html\n");

    let report = rebuilder(&dir).run().unwrap();
    assert_eq!(report.root, "/blog/");
    assert_eq!(report.redirects, 1);
    assert!(read(dir.path(), "old/page.html").contains("URL=/blog/new.html"));
    assert_eq!(manifest_lines(dir.path()), vec!["new.html", "old/page.html"]);
}

#[test]
fn test_bad_redirect_rule_writes_nothing() {
    let dir = site("Name: Test\n");
    write(dir.path(), "a.dj", "Title: A\n---\nx\n");
    write(dir.path(), "_s4g/redirects.txt", "# rules\nno arrow here\n");

    let err = rebuilder(&dir).run().unwrap_err();
    let BuildError::User(site_err) = err else {
        panic!("expected a user error");
    };
    assert_eq!(site_err.line, Some(2));
    assert!(!dir.path().join("a.html").exists());
}

#[test]
fn test_feed_is_pruned_when_empty() {
    let dir = site("Name: Test\n");
    write(dir.path(), "a.dj", "Title: A\nPostedAt: 2024-01-01\n---\nx\n");
    let mut rb = rebuilder(&dir);
    rb.run().unwrap();
    assert!(dir.path().join(FEED_PATH).exists());

    write(dir.path(), "a.dj", "Title: A\nShowInFeed: false\n---\nx\n");
    rb.run().unwrap();
    assert!(!dir.path().join(FEED_PATH).exists());
}

#[test]
fn test_redirect_over_page_writes_nothing() {
    let dir = site("Name: Test\n");
    write(dir.path(), "a.dj", "Title: A\nShowInFeed: false\n---\nx\n");
    write(dir.path(), "b.dj", "Title: B\nShowInFeed: false\n---\ny\n");
    write(dir.path(), "_s4g/redirects.txt", "old.html -> a.html\nb.html -> a.html\n");

    let err = rebuilder(&dir).run().unwrap_err();
    let BuildError::User(site_err) = err else {
        panic!("expected a user error");
    };
    assert_eq!(site_err.file, "_s4g/redirects.txt");
    assert_eq!(site_err.line, Some(2));
    assert!(site_err.msg.contains("b.dj"));
    assert!(!dir.path().join("a.html").exists());
    assert!(!dir.path().join("b.html").exists());
    assert!(!dir.path().join("old.html").exists());
}

#[test]
fn test_redirect_over_feed_is_rejected() {
    let dir = site("Name: Test\n");
    write(dir.path(), "a.dj", "Title: A\nPostedAt: 2024-01-01\n---\nx\n");
    write(dir.path(), "_s4g/redirects.txt", "feed.xml -> a.html\n");

    let err = rebuilder(&dir).run().unwrap_err();
    assert!(err.detail().contains("the feed"));
    assert!(!dir.path().join(FEED_PATH).exists());
}

#[test]
fn test_redirect_cannot_leave_site_folder() {
    let outer = TempDir::new().unwrap();
    let root = outer.path().join("site");
    write(&root, SETTINGS_PATH, "Name: Test\n");
    for (name, content) in theme::FILES {
        write(&root, &format!("_s4g/theme/{name}"), content);
    }
    write(&root, "a.dj", "Title: A\n---\nx\n");
    write(&root, "_s4g/redirects.txt", "../escaped.html -> a.html\n");

    let err = Rebuilder::new(&root, FakeRenderer::default()).run().unwrap_err();
    assert!(matches!(err, BuildError::User(_)));
    assert!(!outer.path().join("escaped.html").exists());
    assert!(!root.join("a.html").exists());
}

#[test]
fn test_redirect_cannot_overwrite_sources() {
    let dir = site("Name: Test\n");
    write(dir.path(), "a.dj", "Title: A\n---\nx\n");
    for rule in ["_s4g/settings.txt -> a.html\n", "a.dj -> a.html\n"] {
        write(dir.path(), "_s4g/redirects.txt", rule);
        let err = rebuilder(&dir).run().unwrap_err();
        assert!(matches!(err, BuildError::User(_)), "{rule}");
    }
    assert_eq!(read(dir.path(), SETTINGS_PATH), "Name: Test\n");
    assert_eq!(read(dir.path(), "a.dj"), "Title: A\n---\nx\n");
}
