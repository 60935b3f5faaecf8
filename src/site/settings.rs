//! Site-wide settings (`_s4g/settings.txt`).

use std::fs;
use std::path::Path;

use super::SiteError;
use super::meta::{self, Field, parse_bool, parse_list, show_list};

pub const SETTINGS_PATH: &str = "_s4g/settings.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub address: String,
    pub name: String,
    pub tagline: String,
    /// Web root prefix, always `/` or `/segment/.../`.
    pub root: String,
    pub show_footer: bool,
    /// Raw HTML.
    pub footer_text: String,
    pub navbar_links: Vec<String>,
    pub default_thumb: String,
    pub author_name: String,
    pub author_uri: String,
    pub author_email: String,
    pub author_twitter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            address: "http://example.com".into(),
            name: String::new(),
            tagline: String::new(),
            root: "/".into(),
            show_footer: true,
            footer_text: String::new(),
            navbar_links: Vec::new(),
            default_thumb: String::new(),
            author_name: String::new(),
            author_uri: String::new(),
            author_email: String::new(),
            author_twitter: String::new(),
        }
    }
}

macro_rules! string_field {
    ($name:literal, $field:ident) => {
        Field {
            name: $name,
            set: |s: &mut Settings, v| {
                s.$field = v.to_string();
                Ok(())
            },
            show: |s: &Settings| s.$field.clone(),
        }
    };
}

static FIELDS: &[Field<Settings>] = &[
    string_field!("Address", address),
    string_field!("Name", name),
    string_field!("Tagline", tagline),
    string_field!("Root", root),
    Field {
        name: "ShowFooter",
        set: |s, v| {
            s.show_footer = parse_bool(v)?;
            Ok(())
        },
        show: |s| s.show_footer.to_string(),
    },
    string_field!("FooterText", footer_text),
    Field {
        name: "NavbarLinks",
        set: |s, v| {
            s.navbar_links = parse_list(v);
            Ok(())
        },
        show: |s| show_list(&s.navbar_links),
    },
    string_field!("DefaultThumb", default_thumb),
    string_field!("AuthorName", author_name),
    string_field!("AuthorURI", author_uri),
    string_field!("AuthorEmail", author_email),
    string_field!("AuthorTwitter", author_twitter),
];

impl Settings {
    /// Settings written by `s4g new`.
    pub fn starter() -> Self {
        Self {
            name: "This is my website".into(),
            tagline: "and it's fine".into(),
            footer_text: "Made with s4g".into(),
            navbar_links: vec!["index.dj".into()],
            author_name: "Scoop Newsman".into(),
            author_uri: "https://example.com/scoop".into(),
            author_email: "scoopidoo@example.com".into(),
            ..Self::default()
        }
    }

    /// Read and normalize `_s4g/settings.txt` under `site_dir`.
    pub fn load(site_dir: &Path) -> Result<Self, SiteError> {
        let text = fs::read_to_string(site_dir.join(SETTINGS_PATH))
            .map_err(|e| SiteError::new(SETTINGS_PATH, format!("cannot read settings: {e}")))?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, SiteError> {
        let mut settings = Self::default();
        meta::unmarshal(SETTINGS_PATH, text, FIELDS, &mut settings)?;
        settings.normalize();
        Ok(settings)
    }

    pub fn to_text(&self) -> String {
        meta::marshal(FIELDS, self)
    }

    fn normalize(&mut self) {
        let trimmed = self.root.trim_matches('/');
        self.root = if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{trimmed}/")
        };

        if !self.author_twitter.is_empty() && !self.author_twitter.starts_with('@') {
            self.author_twitter.insert(0, '@');
        }

        if let Some(rest) = self.default_thumb.strip_prefix('/') {
            self.default_thumb = rest.to_string();
        }
    }

    /// `Address` without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.address.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::parse("").unwrap();
        assert_eq!(s.address, "http://example.com");
        assert_eq!(s.root, "/");
        assert!(s.show_footer);
        assert!(s.navbar_links.is_empty());
    }

    #[test]
    fn test_root_normalization() {
        for (input, expected) in [("", "/"), ("/", "/"), ("blog", "/blog/"), ("/a/b", "/a/b/")] {
            let s = Settings::parse(&format!("Root: {input}\n")).unwrap();
            assert_eq!(s.root, expected, "Root: {input:?}");
        }
    }

    #[test]
    fn test_twitter_and_thumb_normalization() {
        let s = Settings::parse("AuthorTwitter: someone\nDefaultThumb: /img/t.png\n").unwrap();
        assert_eq!(s.author_twitter, "@someone");
        assert_eq!(s.default_thumb, "img/t.png");

        let s = Settings::parse("AuthorTwitter: @already\n").unwrap();
        assert_eq!(s.author_twitter, "@already");
    }

    #[test]
    fn test_invalid_bool_names_field() {
        let err = Settings::parse("Name: x\nShowFooter: nope\n").unwrap_err();
        assert_eq!(err.file, SETTINGS_PATH);
        assert_eq!(err.line, Some(2));
        assert_eq!(err.field.as_deref(), Some("ShowFooter"));
    }

    #[test]
    fn test_starter_round_trips() {
        let starter = Settings::starter();
        let parsed = Settings::parse(&starter.to_text()).unwrap();
        assert_eq!(parsed, starter);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = Settings::load(dir.path()).unwrap_err();
        assert_eq!(err.file, SETTINGS_PATH);
    }
}
