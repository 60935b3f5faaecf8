//! Page templating.
//!
//! Theme files are plain HTML with `{{ name }}` placeholders. A page's
//! template list is applied innermost-last: the last template is filled
//! first and its output becomes `{{ body }}` of the one before it.
//!
//! Plain values are HTML-escaped. Values named `content`, `body` or ending
//! in `_html` are trusted fragments and inserted as-is.

use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::site::{Article, NavItem, Site, SiteError};
use crate::utils::date::DateTimeUtc;
use crate::utils::html::escape;

/// Values available to templates.
#[derive(Debug, Default)]
pub struct PageVars {
    values: FxHashMap<&'static str, String>,
}

impl PageVars {
    pub fn set(&mut self, name: &'static str, value: impl Into<String>) -> &mut Self {
        self.values.insert(name, value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

#[inline]
fn is_raw(name: &str) -> bool {
    name == "content" || name == "body" || name.ends_with("_html")
}

#[inline]
fn is_ident(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Replace every `{{ name }}` in `template`.
///
/// `file` names the template in errors. Text between braces that is not an
/// identifier is left untouched.
pub fn fill(file: &str, template: &str, vars: &PageVars) -> Result<String, SiteError> {
    let mut out = String::with_capacity(template.len() * 2);
    let mut rest = template;
    let mut consumed = 0;

    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else { break };
        let name = after[..end].trim();

        out.push_str(&rest[..start]);
        if is_ident(name) {
            let Some(value) = vars.get(name) else {
                let line = template[..consumed + start].matches('\n').count() + 1;
                return Err(SiteError::new(file, format!("unknown placeholder \"{name}\"")).with_line(line));
            };
            if is_raw(name) {
                out.push_str(value);
            } else {
                out.push_str(&escape(value));
            }
        } else {
            out.push_str(&rest[start..start + 2 + end + 2]);
        }

        let advance = start + 2 + end + 2;
        consumed += advance;
        rest = &rest[advance..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Template files of one site, read at most once per rebuild.
pub struct Layouts {
    site_dir: PathBuf,
    cache: FxHashMap<String, String>,
}

impl Layouts {
    pub fn new(site_dir: &Path) -> Self {
        Self {
            site_dir: site_dir.to_path_buf(),
            cache: FxHashMap::default(),
        }
    }

    fn load(&mut self, path: &str) -> Result<&str, SiteError> {
        if !self.cache.contains_key(path) {
            let text = fs::read_to_string(self.site_dir.join(path))
                .map_err(|e| SiteError::new(path, format!("cannot read template: {e}")))?;
            self.cache.insert(path.to_string(), text);
        }
        Ok(self.cache.get(path).map_or("", String::as_str))
    }

    /// Check that every template exists before anything is written.
    pub fn preload(&mut self, paths: &[String]) -> Result<(), SiteError> {
        for path in paths {
            self.load(path)?;
        }
        Ok(())
    }

    /// Apply `paths` innermost-last with `vars`.
    pub fn render(&mut self, paths: &[String], vars: &mut PageVars) -> Result<String, SiteError> {
        let mut body = vars.get("content").unwrap_or_default().to_string();
        for path in paths.iter().rev() {
            vars.set("body", body);
            let template = self.load(path)?;
            body = fill(path, template, vars)?;
        }
        Ok(body)
    }
}

/// Per-rebuild values shared by every page.
pub struct SiteContext<'a> {
    pub site: &'a Site,
    pub nav: &'a [NavItem],
    pub feed: &'a [usize],
    pub now: DateTimeUtc,
}

impl SiteContext<'_> {
    /// Template values for `article` with its rendered `content`.
    pub fn page_vars(&self, article: &Article, content: String) -> PageVars {
        let settings = &self.site.settings;
        let root = settings.root.as_str();
        let meta = &article.meta;
        let start_year = self.site.start_year(self.now.year);

        let mut vars = PageVars::default();
        vars.set("title", meta.title.as_str())
            .set("description", meta.description.as_str())
            .set("page_type", meta.page_type.as_str())
            .set("is_draft", meta.is_draft.to_string())
            .set("web_path", article.web_path.as_str())
            .set(
                "posted_at",
                meta.posted_at.map(DateTimeUtc::to_human).unwrap_or_default(),
            )
            .set(
                "posted_at_iso",
                meta.posted_at.map(DateTimeUtc::to_rfc3339).unwrap_or_default(),
            )
            .set("og_image", article.og_image.clone().unwrap_or_default())
            .set("og_image_html", og_image_tag(article.og_image.as_deref()))
            .set("site_name", settings.name.as_str())
            .set("site_tagline", settings.tagline.as_str())
            .set("site_address", settings.address.as_str())
            .set("root", root)
            .set("theme_path", format!("{root}{}", crate::site::THEME_DIR))
            .set("feed_path", format!("{root}{}", super::FEED_PATH))
            .set("author_name", settings.author_name.as_str())
            .set("author_uri", settings.author_uri.as_str())
            .set("author_email", settings.author_email.as_str())
            .set("author_twitter", settings.author_twitter.as_str())
            .set("start_year", start_year.to_string())
            .set("current_year", self.now.year.to_string())
            .set("year_range", year_range(start_year, self.now.year))
            .set("nav_html", self.nav_html(article))
            .set("feed_html", self.feed_html())
            .set("series_html", self.series_html(article))
            .set("children_html", self.children_html(article))
            .set("footer_html", self.footer_html(start_year))
            .set("content", content);
        vars
    }

    fn nav_html(&self, current: &Article) -> String {
        self.nav
            .iter()
            .map(|item| match item {
                NavItem::Article(i) => {
                    let a = &self.site.articles[*i];
                    let class = if a.path == current.path {
                        " class=\"current\""
                    } else {
                        ""
                    };
                    format!(
                        "<a href=\"{}\"{class}>{}</a>",
                        escape(&a.web_path),
                        escape(&a.meta.title)
                    )
                }
                NavItem::External { label, url } => {
                    format!("<a href=\"{}\">{}</a>", escape(url), escape(label))
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn post_list(&self, indices: &[usize]) -> String {
        if indices.is_empty() {
            return String::new();
        }
        let items: String = indices
            .iter()
            .map(|&i| {
                let a = &self.site.articles[i];
                let date = a.meta.posted_at.map(DateTimeUtc::to_human).unwrap_or_default();
                format!(
                    "<li><time>{}</time> <a href=\"{}\">{}</a></li>\n",
                    escape(&date),
                    escape(&a.web_path),
                    escape(&a.meta.title)
                )
            })
            .collect();
        format!("<ul class=\"post-list\">\n{items}</ul>")
    }

    fn feed_html(&self) -> String {
        self.post_list(self.feed)
    }

    fn children_html(&self, article: &Article) -> String {
        self.post_list(&article.children)
    }

    fn series_html(&self, article: &Article) -> String {
        let Some(parent) = article.parent.map(|p| &self.site.articles[p]) else {
            return String::new();
        };
        format!(
            "<p class=\"series-nav\">Part of <a href=\"{}\">{}</a></p>",
            escape(&parent.web_path),
            escape(&parent.meta.title)
        )
    }

    fn footer_html(&self, start_year: u16) -> String {
        let settings = &self.site.settings;
        if !settings.show_footer {
            return String::new();
        }
        format!(
            "<footer>&copy; {} {} &middot; {}</footer>",
            year_range(start_year, self.now.year),
            escape(&settings.author_name),
            settings.footer_text
        )
    }
}

fn og_image_tag(url: Option<&str>) -> String {
    url.map(|u| format!("<meta property=\"og:image\" content=\"{}\">", escape(u)))
        .unwrap_or_default()
}

fn year_range(start: u16, now: u16) -> String {
    if start < now {
        format!("{start}-{now}")
    } else {
        now.to_string()
    }
}
