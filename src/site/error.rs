//! User-facing content errors.

use std::fmt;

use crate::utils::html::escape;

/// A mistake in a file the site author wrote.
///
/// Carries enough location to find the problem: the site-relative file and,
/// when known, the 1-based line and column and the metadata field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteError {
    pub file: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
    pub field: Option<String>,
    pub msg: String,
}

impl SiteError {
    pub fn new(file: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line: None,
            column: None,
            field: None,
            msg: msg.into(),
        }
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Overlay fragment: `<p>In file <b>..</b>, line N, field <b>..</b>: msg</p>`
    pub fn to_html(&self) -> String {
        let mut location = format!("In file <b>{}</b>", escape(&self.file));
        if let Some(line) = self.line {
            location.push_str(&format!(", line {line}"));
        }
        if let Some(column) = self.column {
            location.push_str(&format!(", column {column}"));
        }
        if let Some(field) = &self.field {
            location.push_str(&format!(", field <b>{}</b>", escape(field)));
        }
        format!("<p>{location}: {}</p>", escape(&self.msg))
    }
}

impl fmt::Display for SiteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file)?;
        if let Some(line) = self.line {
            write!(f, ":{line}")?;
            if let Some(column) = self.column {
                write!(f, ":{column}")?;
            }
        }
        if let Some(field) = &self.field {
            write!(f, " [{field}]")?;
        }
        write!(f, " {}", self.msg)
    }
}

impl std::error::Error for SiteError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_full() {
        let err = SiteError::new("posts/a.dj", "invalid boolean")
            .with_line(3)
            .with_column(7)
            .with_field("IsDraft");
        assert_eq!(err.to_string(), "posts/a.dj:3:7 [IsDraft] invalid boolean");
    }

    #[test]
    fn test_display_file_only() {
        let err = SiteError::new("_s4g/settings.txt", "not found");
        assert_eq!(err.to_string(), "_s4g/settings.txt not found");
    }

    #[test]
    fn test_to_html_escapes() {
        let err = SiteError::new("a.dj", "\"<x>\" does not exist").with_field("NavbarLinks");
        assert_eq!(
            err.to_html(),
            "<p>In file <b>a.dj</b>, field <b>NavbarLinks</b>: &quot;&lt;x&gt;&quot; does not exist</p>"
        );
    }

    #[test]
    fn test_to_html_with_line() {
        let err = SiteError::new("_s4g/redirects.txt", "bad").with_line(2);
        assert_eq!(err.to_html(), "<p>In file <b>_s4g/redirects.txt</b>, line 2: bad</p>");
    }
}
