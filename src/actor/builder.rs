//! Build Actor
//!
//! Owns the [`Rebuilder`] (and with it the renderer), so passes run one at
//! a time in arrival order. Each pass runs on the blocking pool and its
//! outcome goes through [`Publisher`].

use std::sync::Arc;

use crossbeam::channel::Sender;
use tokio::sync::mpsc;

use super::messages::BuildMsg;
use crate::build::{BuildError, BuildReport, Rebuilder};
use crate::logger::{status_error, status_success};
use crate::reload::{ErrorPage, LiveReload};
use crate::renderer::Render;
use crate::{debug, log};

/// Makes a pass's outcome visible: terminal status, browser overlay,
/// reload notification and, on success, the site root for the server.
#[derive(Clone)]
pub struct Publisher {
    live: Arc<LiveReload>,
    root_tx: Sender<String>,
}

impl Publisher {
    pub fn new(live: Arc<LiveReload>, root_tx: Sender<String>) -> Self {
        Self { live, root_tx }
    }

    /// Fatal errors end the process.
    pub fn publish(&self, outcome: Result<BuildReport, BuildError>) {
        match outcome {
            Ok(report) => {
                status_success(&report.summary());
                self.live.set_error(None);
                // the supervisor may already be gone during shutdown
                let _ = self.root_tx.send(report.root);
            }
            Err(err) if err.is_fatal() => {
                log!("error"; "{}", err.detail());
                std::process::exit(1);
            }
            Err(err) => {
                status_error("rebuild failed", &err.detail());
                self.live.set_error(Some(ErrorPage::from_error(&err)));
            }
        }
    }
}

pub struct BuildActor<R: Render + Send + 'static> {
    rx: mpsc::Receiver<BuildMsg>,
    rebuilder: Rebuilder<R>,
    publisher: Publisher,
}

impl<R: Render + Send + 'static> BuildActor<R> {
    pub fn new(rx: mpsc::Receiver<BuildMsg>, rebuilder: Rebuilder<R>, publisher: Publisher) -> Self {
        Self {
            rx,
            rebuilder,
            publisher,
        }
    }

    pub async fn run(self) {
        let Self {
            mut rx,
            mut rebuilder,
            publisher,
        } = self;

        while let Some(msg) = rx.recv().await {
            match msg {
                BuildMsg::Rebuild => {
                    debug!("build"; "rebuilding {}", rebuilder.site_dir().display());
                    let joined = tokio::task::spawn_blocking(move || {
                        let outcome = rebuilder.run();
                        (rebuilder, outcome)
                    })
                    .await;

                    match joined {
                        Ok((back, outcome)) => {
                            rebuilder = back;
                            publisher.publish(outcome);
                        }
                        Err(e) => {
                            log!("error"; "rebuild task failed: {}", e);
                            std::process::exit(1);
                        }
                    }
                }
                BuildMsg::Shutdown => break,
            }
        }

        debug!("build"; "stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reload::PollReply;
    use crate::site::SiteError;
    use std::time::Duration;

    fn report(root: &str) -> BuildReport {
        BuildReport {
            root: root.to_string(),
            pages: 1,
            feed_entries: 0,
            redirects: 0,
            pruned: 0,
            elapsed: Duration::from_millis(3),
        }
    }

    #[test]
    fn test_publish_user_error_then_success() {
        let live = Arc::new(LiveReload::new());
        let (root_tx, root_rx) = crossbeam::channel::unbounded();
        let publisher = Publisher::new(Arc::clone(&live), root_tx);
        live.poll("tab");

        publisher.publish(Err(SiteError::new("a.dj", "bad field").into()));
        assert!(live.current_error().unwrap().text.contains("bad field"));
        assert_eq!(live.poll("tab"), PollReply::Reload);
        assert!(root_rx.try_recv().is_err());

        live.poll("tab");
        publisher.publish(Ok(report("/blog/")));
        assert!(live.current_error().is_none());
        assert_eq!(live.poll("tab"), PollReply::Reload);
        assert_eq!(root_rx.try_recv().unwrap(), "/blog/");
    }

    #[test]
    fn test_publish_survives_closed_root_channel() {
        let live = Arc::new(LiveReload::new());
        let (root_tx, root_rx) = crossbeam::channel::unbounded();
        drop(root_rx);

        Publisher::new(Arc::clone(&live), root_tx).publish(Ok(report("/")));
        assert!(live.current_error().is_none());
    }
}
