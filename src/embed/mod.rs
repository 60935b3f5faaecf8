//! Embedded static resources.
//!
//! - `serve` - dev server snippets (livereload script, error overlay)
//! - `build` - generated pages (redirect.html)
//! - `renderer` - default djot renderer script
//! - `theme` - default theme written by `s4g new`
//!
//! # Usage
//!
//! ```ignore
//! use embed::build::{REDIRECT_HTML, RedirectVars};
//!
//! let html = REDIRECT_HTML.render(&RedirectVars { target: "/blog/new/" });
//! ```

mod template;

pub use template::{Template, TemplateVars, substitute};

pub mod serve {
    use super::{Template, TemplateVars, substitute};
    use crate::utils::html::escape;

    /// Polling endpoint path.
    pub const LIVERELOAD_ENDPOINT: &str = "/_livereload";
    /// Header carrying the tab's session token.
    pub const CLIENT_ID_HEADER: &str = "Client-Id";
    /// Poll reply: reload now.
    pub const RELOAD: &str = "1";
    /// Poll reply: nothing yet.
    pub const WAIT: &str = "0";

    pub struct LivereloadVars;

    impl TemplateVars for LivereloadVars {
        fn apply(&self, content: &str) -> String {
            substitute(
                content,
                &[
                    ("__ENDPOINT__", LIVERELOAD_ENDPOINT),
                    ("__HEADER__", CLIENT_ID_HEADER),
                    ("__RELOAD__", RELOAD),
                ],
            )
        }
    }

    /// Script tag injected into every served HTML page.
    pub const LIVERELOAD_JS: Template<LivereloadVars> =
        Template::new(include_str!("serve/livereload.js"));

    /// Variables for error.html.
    pub struct ErrorVars<'a> {
        /// Trusted HTML fragment.
        pub html: &'a str,
        /// Plain text, escaped on insertion.
        pub text: &'a str,
    }

    impl TemplateVars for ErrorVars<'_> {
        fn apply(&self, content: &str) -> String {
            let text = escape(self.text);
            substitute(content, &[("__TEXT__", &*text), ("__HTML__", self.html)])
        }
    }

    /// Build error overlay page.
    pub const ERROR_HTML: Template<ErrorVars<'static>> =
        Template::new(include_str!("serve/error.html"));
}

pub mod build {
    use super::{Template, TemplateVars};
    use crate::utils::html::escape;

    /// Variables for redirect.html.
    pub struct RedirectVars<'a> {
        pub target: &'a str,
    }

    impl TemplateVars for RedirectVars<'_> {
        fn apply(&self, content: &str) -> String {
            content.replace("__TARGET__", &escape(self.target))
        }
    }

    /// Meta-refresh page written for every redirect rule.
    pub const REDIRECT_HTML: Template<RedirectVars<'static>> =
        Template::new(include_str!("build/redirect.html"));
}

pub mod renderer {
    /// Node script speaking the frame protocol, requires `@djot/djot`.
    pub const RENDER_JS: &str = include_str!("renderer/render.js");

    /// Command used when `[renderer] command` is not configured.
    pub fn default_command() -> Vec<String> {
        vec!["node".into(), "-e".into(), RENDER_JS.into()]
    }
}

pub mod theme {
    /// Default theme files, relative to `_s4g/theme/`.
    pub const FILES: &[(&str, &str)] = &[
        ("base.tmpl", include_str!("theme/base.tmpl")),
        ("post.tmpl", include_str!("theme/post.tmpl")),
        ("home.tmpl", include_str!("theme/home.tmpl")),
        ("series-index.tmpl", include_str!("theme/series-index.tmpl")),
        ("style.css", include_str!("theme/style.css")),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_livereload_placeholders_filled() {
        let js = serve::LIVERELOAD_JS.render(&serve::LivereloadVars);
        assert!(js.contains("\"/_livereload\""));
        assert!(js.contains("\"Client-Id\""));
        assert!(js.contains("=== \"1\""));
        assert!(!js.contains("__"));
    }

    #[test]
    fn test_error_page_escapes_text_only() {
        let page = serve::ERROR_HTML.render(&serve::ErrorVars {
            html: "<p>In file <b>a.dj</b></p>",
            text: "a.dj <bad>",
        });
        assert!(page.contains("<p>In file <b>a.dj</b></p>"));
        assert!(page.contains("a.dj &lt;bad&gt;"));
    }

    #[test]
    fn test_error_text_mentioning_placeholder_stays_literal() {
        let page = serve::ERROR_HTML.render(&serve::ErrorVars {
            html: "<p>frag</p>",
            text: "unknown variable __HTML__ in post.tmpl",
        });
        assert_eq!(page.matches("<p>frag</p>").count(), 1);
        assert!(page.contains("<pre>unknown variable __HTML__ in post.tmpl</pre>"));
    }

    #[test]
    fn test_render_script_explains_missing_djot() {
        assert!(renderer::RENDER_JS.contains("npm install @djot/djot"));
        assert!(renderer::RENDER_JS.contains("process.exit(1)"));
    }

    #[test]
    fn test_redirect_page() {
        let page = build::REDIRECT_HTML.render(&build::RedirectVars { target: "/blog/new.html" });
        assert!(page.contains("content=\"0; URL=/blog/new.html\""));
        assert!(!page.contains("__TARGET__"));
    }

    #[test]
    fn test_theme_has_base_layout() {
        let base = theme::FILES.iter().find(|(name, _)| *name == "base.tmpl").unwrap();
        assert!(base.1.contains("{{ body }}"));
        assert!(base.1.contains("</body>"));
    }
}
