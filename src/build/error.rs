use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::renderer::RendererError;
use crate::site::SiteError;
use crate::utils::html::escape;

/// Why a rebuild did not complete.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Mistake in the author's files; shown in the browser until fixed.
    #[error(transparent)]
    User(#[from] SiteError),

    #[error("I/O error on `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The renderer is gone or out of sync; the process cannot continue.
    #[error(transparent)]
    Renderer(#[from] RendererError),
}

impl BuildError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Renderer(_))
    }

    /// Single-line description including the underlying cause.
    pub fn detail(&self) -> String {
        match self {
            Self::Io { source, .. } => format!("{self}: {source}"),
            Self::Renderer(e) => match std::error::Error::source(e) {
                Some(source) => format!("{e}: {source}"),
                None => e.to_string(),
            },
            Self::User(e) => e.to_string(),
        }
    }

    /// Fragment for the browser error overlay.
    pub fn to_html(&self) -> String {
        match self {
            Self::User(e) => e.to_html(),
            _ => format!("<p>{}</p>", escape(&self.detail())),
        }
    }
}
