//! Content processing for served pages.

use crate::embed::serve::{LIVERELOAD_JS, LivereloadVars};
use crate::utils::html::inject_before_body_end;

/// Inject the live-reload script before `</body>` (or append it).
pub fn inject_livereload(body: &[u8]) -> Vec<u8> {
    let script = LIVERELOAD_JS.render(&LivereloadVars);
    inject_before_body_end(body, script.as_bytes())
}
