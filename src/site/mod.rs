//! Content model: site settings, articles and their relationships.
//!
//! Loading is two-phase. Discovery parses every `.dj` file into an arena of
//! [`Article`]s indexed by path; relationships (series parents and
//! children, navigation entries) are then resolved by index lookup.

mod article;
mod error;
pub mod meta;
mod settings;

pub use article::{Article, ArticleMeta, CONTENT_EXT, PageType, SITE_DATA_DIR, THEME_DIR};
pub use error::SiteError;
pub use settings::{SETTINGS_PATH, Settings};

use std::fs;
use std::path::{Path, PathBuf};

use jwalk::WalkDir;
use rustc_hash::FxHashMap;

use crate::debug;
use crate::utils::path::{is_hidden, parent_dir, to_site_path};

/// One navigation bar entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavItem {
    /// Index into [`Site::articles`].
    Article(usize),
    /// `#Label#URL` entry.
    External { label: String, url: String },
}

/// Everything discovered in one site folder.
#[derive(Debug)]
pub struct Site {
    pub settings: Settings,
    /// Articles in discovery order.
    pub articles: Vec<Article>,
    by_path: FxHashMap<String, usize>,
}

impl Site {
    /// Read settings and every article under `dir`.
    ///
    /// Stops at the first invalid file.
    pub fn load(dir: &Path) -> Result<Self, SiteError> {
        let settings = Settings::load(dir)?;
        Self::discover(dir, settings)
    }

    pub fn discover(dir: &Path, settings: Settings) -> Result<Self, SiteError> {
        let mut articles = Vec::new();
        for file in content_files(dir) {
            let Some(path) = to_site_path(dir, &file) else {
                continue;
            };
            let text = read_content(&path, &file)?;
            match Article::parse(&path, &text, &settings)? {
                Some(article) => articles.push(article),
                None => crate::log!("site"; "no metadata found in {}, skipping", path),
            }
        }

        let by_path = articles
            .iter()
            .enumerate()
            .map(|(i, a)| (a.path.clone(), i))
            .collect();

        let mut site = Self {
            settings,
            articles,
            by_path,
        };
        site.link_series();
        Ok(site)
    }

    /// Resolve `NavbarLinks` in declared order.
    pub fn nav(&self) -> Result<Vec<NavItem>, SiteError> {
        self.settings
            .navbar_links
            .iter()
            .map(|link| {
                if let Some(external) = parse_external(link) {
                    return Ok(external);
                }
                self.by_path
                    .get(link.as_str())
                    .map(|&i| NavItem::Article(i))
                    .ok_or_else(|| {
                        SiteError::new(SETTINGS_PATH, format!("\"{link}\" does not exist"))
                            .with_field("NavbarLinks")
                    })
            })
            .collect()
    }

    /// Indices of feed articles, newest first. Ties keep discovery order;
    /// undated articles sort last.
    pub fn feed(&self) -> Vec<usize> {
        let mut feed: Vec<usize> = (0..self.articles.len())
            .filter(|&i| self.articles[i].meta.show_in_feed)
            .collect();
        // stable sort keeps discovery order among equal dates
        feed.sort_by(|&a, &b| {
            self.articles[b]
                .meta
                .posted_at
                .cmp(&self.articles[a].meta.posted_at)
        });
        feed
    }

    /// Earliest year any article was posted, or `current` if none is older.
    pub fn start_year(&self, current: u16) -> u16 {
        self.articles
            .iter()
            .filter_map(|a| a.meta.posted_at)
            .map(|d| d.year)
            .fold(current, u16::min)
    }

    /// Attach every article to the nearest `series-index` article in its
    /// own folder or an ancestor folder.
    fn link_series(&mut self) {
        let index_by_dir: FxHashMap<String, usize> = self
            .articles
            .iter()
            .enumerate()
            .filter(|(_, a)| a.meta.page_type == PageType::SeriesIndex)
            .map(|(i, a)| (a.dir().to_string(), i))
            .collect();
        if index_by_dir.is_empty() {
            return;
        }

        let parents: Vec<Option<usize>> = (0..self.articles.len())
            .map(|i| {
                let mut dir = self.articles[i].dir();
                loop {
                    if let Some(&parent) = index_by_dir.get(dir) {
                        if parent != i {
                            return Some(parent);
                        }
                    }
                    if dir.is_empty() {
                        return None;
                    }
                    dir = parent_dir(dir);
                }
            })
            .collect();

        for (i, parent) in parents.into_iter().enumerate() {
            self.articles[i].parent = parent;
            if let Some(p) = parent {
                self.articles[p].children.push(i);
            }
        }
    }
}

/// `#Label#URL` -> external nav entry.
fn parse_external(link: &str) -> Option<NavItem> {
    let rest = link.strip_prefix('#')?;
    let (label, url) = rest.split_once('#')?;
    Some(NavItem::External {
        label: label.to_string(),
        url: url.to_string(),
    })
}

/// All non-hidden `.dj` files under `dir`, sorted.
fn content_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .skip_hidden(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_str().unwrap_or_default();
            !is_hidden(name) && name.ends_with(CONTENT_EXT)
        })
        .map(|e| e.path())
        .collect();
    files.sort();
    debug!("site"; "found {} content files", files.len());
    files
}

/// Content must be UTF-8, which also guarantees it never contains the
/// renderer's 0xFF frame terminator.
fn read_content(site_path: &str, file: &Path) -> Result<String, SiteError> {
    let bytes = fs::read(file)
        .map_err(|e| SiteError::new(site_path, format!("cannot read file: {e}")))?;
    String::from_utf8(bytes).map_err(|e| {
        let offset = e.utf8_error().valid_up_to();
        SiteError::new(site_path, format!("file is not valid UTF-8 (invalid byte at offset {offset})"))
    })
}
