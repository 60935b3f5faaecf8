//! Redirect rules (`_s4g/redirects.txt`).
//!
//! One rule per line, `old/path.html -> new/path.html`. Each rule produces
//! a meta-refresh page at the source path pointing at `root + dest`.

use std::fs;
use std::path::Path;

use crate::embed::build::{REDIRECT_HTML, RedirectVars};
use crate::site::{CONTENT_EXT, SITE_DATA_DIR, SiteError};
use crate::utils::path::is_contained;

pub const REDIRECTS_PATH: &str = "_s4g/redirects.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// Site-relative output path of the refresh page.
    pub src: String,
    /// Target, relative to the web root.
    pub dest: String,
    /// 1-based line in the rules file.
    pub line: usize,
}

impl Redirect {
    /// Page written at `src`.
    pub fn page(&self, root: &str) -> String {
        let target = format!("{root}{}", self.dest);
        REDIRECT_HTML.render(&RedirectVars { target: &target })
    }
}

/// Read and validate the rules under `site_dir`. A missing file means no
/// redirects.
pub fn load(site_dir: &Path) -> Result<Vec<Redirect>, SiteError> {
    let text = match fs::read_to_string(site_dir.join(REDIRECTS_PATH)) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(SiteError::new(
                REDIRECTS_PATH,
                format!("cannot read redirects: {e}"),
            ));
        }
    };
    parse(&text, |src| site_dir.join(src).is_dir())
}

/// Parse rule lines. `is_dir` tells whether a source names an existing
/// folder.
pub fn parse(text: &str, is_dir: impl Fn(&str) -> bool) -> Result<Vec<Redirect>, SiteError> {
    let mut rules = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let err = |msg: String| SiteError::new(REDIRECTS_PATH, msg).with_line(idx + 1);

        let Some((src, dest)) = line.split_once("->") else {
            return Err(err(format!("expected \"src -> dest\", found \"{line}\"")));
        };
        let src = src.trim().trim_start_matches('/');
        let dest = dest.trim().trim_start_matches('/');

        if src.is_empty() {
            return Err(err(format!("source must not be empty (found \"{line}\")")));
        }
        if src.ends_with('/') {
            return Err(err(format!(
                "source must not end with a \"/\" (found \"{line}\")"
            )));
        }
        if !is_contained(src) {
            return Err(err(format!(
                "source must stay inside the site folder (found \"{line}\")"
            )));
        }
        if src == SITE_DATA_DIR || src.starts_with(&format!("{SITE_DATA_DIR}/")) {
            return Err(err(format!(
                "source must not be inside {SITE_DATA_DIR}/ (found \"{line}\")"
            )));
        }
        if src.ends_with(CONTENT_EXT) {
            return Err(err(format!(
                "source must not be a {CONTENT_EXT} file (found \"{line}\")"
            )));
        }
        if is_dir(src) {
            return Err(err(format!("source must not be a folder (found \"{line}\")")));
        }

        rules.push(Redirect {
            src: src.to_string(),
            dest: dest.to_string(),
            line: idx + 1,
        });
    }
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_dirs(_: &str) -> bool {
        false
    }

    #[test]
    fn test_parse_rules() {
        let text = "# moved posts\n\n/old.html -> /new.html\nblog/a.html->posts/a.html\n";
        let rules = parse(text, no_dirs).unwrap();
        assert_eq!(
            rules,
            vec![
                Redirect { src: "old.html".into(), dest: "new.html".into(), line: 3 },
                Redirect { src: "blog/a.html".into(), dest: "posts/a.html".into(), line: 4 },
            ]
        );
    }

    #[test]
    fn test_missing_arrow() {
        let err = parse("a.html -> b.html\nbroken line\n", no_dirs).unwrap_err();
        assert_eq!(err.file, REDIRECTS_PATH);
        assert_eq!(err.line, Some(2));
        assert!(err.msg.contains("src -> dest"));
    }

    #[test]
    fn test_source_trailing_slash() {
        let err = parse("old/ -> new.html\n", no_dirs).unwrap_err();
        assert_eq!(err.line, Some(1));
        assert!(err.msg.contains("must not end"));
    }

    #[test]
    fn test_source_is_folder() {
        let err = parse("posts -> new.html\n", |src| src == "posts").unwrap_err();
        assert!(err.msg.contains("must not be a folder"));
    }

    #[test]
    fn test_source_leaving_site() {
        for text in [
            "../escaped.html -> a.html\n",
            "posts/../../x.html -> a.html\n",
            "a//b.html -> a.html\n",
            "..\\x.html -> a.html\n",
        ] {
            let err = parse(text, no_dirs).unwrap_err();
            assert_eq!(err.line, Some(1), "{text}");
            assert!(err.msg.contains("inside the site folder"), "{text}");
        }
    }

    #[test]
    fn test_source_in_site_data() {
        let err = parse("ok.html -> a.html\n_s4g/settings.txt -> a.html\n", no_dirs).unwrap_err();
        assert_eq!(err.line, Some(2));
        assert!(err.msg.contains("_s4g/"));

        let err = parse("_s4g -> a.html\n", no_dirs).unwrap_err();
        assert!(err.msg.contains("_s4g/"));
    }

    #[test]
    fn test_source_is_content_file() {
        let err = parse("posts/a.dj -> posts/b.html\n", no_dirs).unwrap_err();
        assert_eq!(err.line, Some(1));
        assert!(err.msg.contains(".dj"));
    }

    #[test]
    fn test_page_points_at_root_prefixed_dest() {
        let rule = Redirect { src: "old.html".into(), dest: "new.html".into(), line: 1 };
        let page = rule.page("/blog/");
        assert!(page.contains("URL=/blog/new.html"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(load(dir.path()).unwrap().is_empty());
    }
}
