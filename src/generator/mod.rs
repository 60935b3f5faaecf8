//! Output generators used by a rebuild.
//!
//! - **page**: article HTML from theme templates
//! - **feed**: Atom feed (`feed.xml`)
//! - **redirect**: meta-refresh pages from `_s4g/redirects.txt`

pub mod feed;
pub mod page;
pub mod redirect;

/// Site-relative feed location.
pub const FEED_PATH: &str = "feed.xml";
