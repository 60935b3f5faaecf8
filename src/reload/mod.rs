//! Live reload state shared by the build side and the dev server.
//!
//! Two independently synchronized pieces:
//! - [`ReloadRegistry`]: which browser tabs are owed a reload
//! - the current build error, swapped atomically and read by every HTML
//!   request

mod registry;

pub use registry::{PollReply, ReloadRegistry};

use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::build::BuildError;
use crate::debug;
use crate::embed::serve::{ERROR_HTML, ErrorVars};

/// The overlay shown instead of pages while a build error is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPage {
    pub html: String,
    pub text: String,
}

impl ErrorPage {
    pub fn from_error(err: &BuildError) -> Self {
        Self {
            html: err.to_html(),
            text: err.detail(),
        }
    }

    /// Full overlay document (without the reload script).
    pub fn render(&self) -> String {
        ERROR_HTML.render(&ErrorVars {
            html: &self.html,
            text: &self.text,
        })
    }
}

#[derive(Debug, Default)]
pub struct LiveReload {
    registry: ReloadRegistry,
    error: ArcSwapOption<ErrorPage>,
}

impl LiveReload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn poll(&self, token: &str) -> PollReply {
        self.registry.poll(token)
    }

    /// Record the outcome of a rebuild and notify every open tab, so they
    /// either show the fresh pages or the overlay.
    pub fn set_error(&self, error: Option<ErrorPage>) {
        self.error.store(error.map(Arc::new));
        debug!("reload"; "notifying {} tabs", self.registry.len());
        self.registry.trigger();
    }

    pub fn current_error(&self) -> Option<Arc<ErrorPage>> {
        self.error.load_full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::SiteError;

    #[test]
    fn test_set_error_triggers_reload() {
        let live = LiveReload::new();
        live.poll("tab");

        let err = BuildError::from(SiteError::new("a.dj", "broken"));
        live.set_error(Some(ErrorPage::from_error(&err)));

        assert_eq!(live.poll("tab"), PollReply::Reload);
        let page = live.current_error().unwrap();
        assert!(page.html.contains("a.dj"));
        assert!(page.render().contains("broken"));
    }

    #[test]
    fn test_success_clears_error_and_triggers() {
        let live = LiveReload::new();
        live.set_error(Some(ErrorPage {
            html: "<p>x</p>".into(),
            text: "x".into(),
        }));
        live.poll("tab");

        live.set_error(None);
        assert!(live.current_error().is_none());
        assert_eq!(live.poll("tab"), PollReply::Reload);
    }
}
