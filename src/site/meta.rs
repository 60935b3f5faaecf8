//! Flat `Key: value` metadata.
//!
//! Each schema declares a static [`Field`] table mapping a key to a setter
//! and a printer, so parsing needs no runtime type inspection:
//!
//! ```ignore
//! static FIELDS: &[Field<Article>] = &[
//!     Field { name: "Title", set: |m, v| { m.title = v.to_string(); Ok(()) }, show: |m| m.title.clone() },
//! ];
//! unmarshal("a.dj", text, FIELDS, &mut meta)?;
//! ```

use crate::debug;
use crate::utils::date::DateTimeUtc;

use super::SiteError;

/// Line separating metadata from body.
const SEPARATOR: &str = "---";

/// One entry of a metadata schema.
pub struct Field<T> {
    pub name: &'static str,
    /// Parse `value` and store it on the target.
    pub set: fn(&mut T, &str) -> Result<(), String>,
    /// Render the current value in the form `set` accepts.
    pub show: fn(&T) -> String,
}

/// A content file split at its separator line.
#[derive(Debug, PartialEq, Eq)]
pub struct Split<'a> {
    pub meta: &'a str,
    pub body: &'a str,
}

/// Split `text` at the first line that is `---` (surrounding whitespace
/// ignored). Returns `None` when there is no separator.
pub fn split_metadata(text: &str) -> Option<Split<'_>> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let next = offset + line.len();
        if line.trim() == SEPARATOR {
            return Some(Split {
                meta: &text[..offset],
                body: &text[next..],
            });
        }
        offset = next;
    }
    None
}

/// Apply every `Key: value` line in `meta` to `dest` through `fields`.
///
/// Blank lines and `#` comments are skipped, unknown keys are ignored and
/// a repeated key keeps its last value. The first invalid value aborts
/// with an error naming the file, line and field.
pub fn unmarshal<T>(file: &str, meta: &str, fields: &[Field<T>], dest: &mut T) -> Result<(), SiteError> {
    for (idx, raw) in meta.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key_raw, value)) = line.split_once(':') else {
            debug!("meta"; "{}:{} ignoring line without ':': {:?}", file, idx + 1, line);
            continue;
        };

        let key = key_raw.trim();
        let Some(field) = fields.iter().find(|f| f.name == key) else {
            continue;
        };

        // byte offset of the value inside the untrimmed line
        let value_at = (raw.len() - raw.trim_start().len())
            + key_raw.len()
            + 1
            + (value.len() - value.trim_start().len());
        (field.set)(dest, value.trim()).map_err(|msg| {
            SiteError::new(file, msg)
                .with_line(idx + 1)
                .with_column(raw[..value_at].chars().count() + 1)
                .with_field(field.name)
        })?;
    }
    Ok(())
}

/// Inverse of [`unmarshal`]: one `Key: value` line per field, table order.
pub fn marshal<T>(fields: &[Field<T>], src: &T) -> String {
    fields
        .iter()
        .map(|f| format!("{}: {}\n", f.name, (f.show)(src)))
        .collect()
}

// ============================================================================
// Value parsers
// ============================================================================

pub fn parse_bool(value: &str) -> Result<bool, String> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(format!(
            "invalid boolean: expected true/false, got \"{value}\""
        )),
    }
}

/// Comma separated list, items trimmed. An empty value is an empty list.
pub fn parse_list(value: &str) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }
    value.split(',').map(|s| s.trim().to_string()).collect()
}

pub fn show_list(items: &[String]) -> String {
    items.join(", ")
}

pub fn parse_date(value: &str) -> Result<DateTimeUtc, String> {
    DateTimeUtc::parse(value).ok_or_else(|| {
        format!("invalid date: expected YYYY-MM-DD[ HH:MM[:SS]], got \"{value}\"")
    })
}
