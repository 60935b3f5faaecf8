//! Articles: one `.dj` content file and everything derived from it.

use std::fmt;
use std::str::FromStr;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use super::meta::{self, Field, parse_bool, parse_date, parse_list, show_list};
use super::{SiteError, Settings};
use crate::utils::date::DateTimeUtc;
use crate::utils::path::{join_site_path, parent_dir};

pub const CONTENT_EXT: &str = ".dj";
/// Folder holding settings, theme and generator state; never an output.
pub const SITE_DATA_DIR: &str = "_s4g";
pub const THEME_DIR: &str = "_s4g/theme";

/// Unreserved URL characters stay readable; everything else is escaped.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageType {
    #[default]
    Post,
    Home,
    SeriesIndex,
    Custom,
}

impl PageType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Home => "home",
            Self::SeriesIndex => "series-index",
            Self::Custom => "custom",
        }
    }
}

impl FromStr for PageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post" => Ok(Self::Post),
            "home" => Ok(Self::Home),
            "series-index" => Ok(Self::SeriesIndex),
            "custom" => Ok(Self::Custom),
            _ => Err(format!("\"{s}\" is not a valid PageType")),
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Author-provided metadata of one article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleMeta {
    pub title: String,
    pub description: String,
    pub is_draft: bool,
    pub posted_at: Option<DateTimeUtc>,
    pub page_type: PageType,
    pub templates: Vec<String>,
    pub show_in_feed: bool,
    pub thumb: String,
}

impl Default for ArticleMeta {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            is_draft: false,
            posted_at: None,
            page_type: PageType::Post,
            templates: Vec::new(),
            show_in_feed: true,
            thumb: String::new(),
        }
    }
}

static FIELDS: &[Field<ArticleMeta>] = &[
    Field {
        name: "Title",
        set: |m, v| {
            m.title = v.to_string();
            Ok(())
        },
        show: |m| m.title.clone(),
    },
    Field {
        name: "Description",
        set: |m, v| {
            m.description = v.to_string();
            Ok(())
        },
        show: |m| m.description.clone(),
    },
    Field {
        name: "IsDraft",
        set: |m, v| {
            m.is_draft = parse_bool(v)?;
            Ok(())
        },
        show: |m| m.is_draft.to_string(),
    },
    Field {
        name: "PostedAt",
        set: |m, v| {
            m.posted_at = if v.is_empty() {
                None
            } else {
                Some(parse_date(v)?)
            };
            Ok(())
        },
        show: |m| m.posted_at.map(|d| d.to_string()).unwrap_or_default(),
    },
    Field {
        name: "PageType",
        set: |m, v| {
            m.page_type = v.parse()?;
            Ok(())
        },
        show: |m| m.page_type.to_string(),
    },
    Field {
        name: "Templates",
        set: |m, v| {
            m.templates = parse_list(v);
            Ok(())
        },
        show: |m| show_list(&m.templates),
    },
    Field {
        name: "ShowInFeed",
        set: |m, v| {
            m.show_in_feed = parse_bool(v)?;
            Ok(())
        },
        show: |m| m.show_in_feed.to_string(),
    },
    Field {
        name: "Thumb",
        set: |m, v| {
            m.thumb = v.to_string();
            Ok(())
        },
        show: |m| m.thumb.clone(),
    },
];

impl ArticleMeta {
    /// Parse and validate the metadata block of `file`.
    pub fn parse(file: &str, text: &str) -> Result<Self, SiteError> {
        let mut meta = Self::default();
        meta::unmarshal(file, text, FIELDS, &mut meta)?;

        if meta.page_type != PageType::Custom && !meta.templates.is_empty() {
            return Err(SiteError::new(
                file,
                "you must set \"PageType: custom\" in order to use custom Templates",
            )
            .with_field("PageType"));
        }
        if meta.page_type == PageType::Custom && meta.templates.is_empty() {
            return Err(SiteError::new(
                file,
                "custom PageType requires a non-empty Templates list",
            )
            .with_field("Templates"));
        }
        Ok(meta)
    }

    pub fn to_text(&self) -> String {
        meta::marshal(FIELDS, self)
    }
}

/// A discovered content unit.
///
/// `parent` and `children` are indices into the owning [`super::Site`].
#[derive(Debug, Clone)]
pub struct Article {
    /// Site-relative source path, `/`-separated.
    pub path: String,
    pub output_path: String,
    pub body: String,
    pub meta: ArticleMeta,
    pub web_path: String,
    pub template_paths: Vec<String>,
    pub og_image: Option<String>,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

impl Article {
    /// Build an article from file contents.
    ///
    /// Returns `Ok(None)` when the file has no metadata separator.
    pub fn parse(path: &str, text: &str, settings: &Settings) -> Result<Option<Self>, SiteError> {
        let Some(split) = meta::split_metadata(text) else {
            return Ok(None);
        };
        let meta = ArticleMeta::parse(path, split.meta)?;

        let output_path = output_path_for(path);
        let web_path = web_path_for(&settings.root, &output_path);
        let template_paths = template_paths_for(path, &meta);
        let og_image = og_image_for(path, &meta, settings);

        Ok(Some(Self {
            path: path.to_string(),
            output_path,
            body: split.body.to_string(),
            meta,
            web_path,
            template_paths,
            og_image,
            parent: None,
            children: Vec::new(),
        }))
    }

    /// Folder containing the source file, `""` at the top level.
    pub fn dir(&self) -> &str {
        parent_dir(&self.path)
    }
}

/// `posts/a.dj` -> `posts/a.html`
pub fn output_path_for(path: &str) -> String {
    let stem = path.strip_suffix(CONTENT_EXT).unwrap_or(path);
    format!("{stem}.html")
}

/// Browser path: root + output path, trailing `index.html` dropped, every
/// segment percent-encoded.
pub fn web_path_for(root: &str, output_path: &str) -> String {
    let full = format!("{root}{output_path}");
    let full = match full.strip_suffix("index.html") {
        Some(dir) if dir.ends_with('/') => dir.to_string(),
        _ => full,
    };
    full.split('/')
        .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

fn template_paths_for(path: &str, meta: &ArticleMeta) -> Vec<String> {
    let names: Vec<String> = match meta.page_type {
        PageType::Post => vec!["$base.tmpl".into(), "$post.tmpl".into()],
        PageType::Home => vec!["$base.tmpl".into(), "$home.tmpl".into()],
        PageType::SeriesIndex => vec!["$base.tmpl".into(), "$series-index.tmpl".into()],
        PageType::Custom => meta.templates.clone(),
    };

    names
        .iter()
        .map(|name| match name.strip_prefix('$') {
            Some(theme_file) => format!("{THEME_DIR}/{theme_file}"),
            None => join_site_path(parent_dir(path), name),
        })
        .collect()
}

fn og_image_for(path: &str, meta: &ArticleMeta, settings: &Settings) -> Option<String> {
    let base = format!("{}{}", settings.base_url(), settings.root);
    if !meta.thumb.is_empty() {
        let dir = parent_dir(path);
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{dir}/")
        };
        Some(format!("{base}{prefix}{}", meta.thumb))
    } else if !settings.default_thumb.is_empty() {
        Some(format!("{base}{}", settings.default_thumb))
    } else {
        None
    }
}
