//! Actor Coordinator - wires up the watch/rebuild actors
//!
//! ```text
//! FsActor --Rebuild (capacity 1)--> BuildActor --> Publisher
//! ```
//!
//! The watcher is attached in [`Coordinator::new`], before the caller runs
//! the initial build; the actors start in [`Coordinator::start`] on their
//! own thread with a small tokio runtime.

use std::path::Path;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::builder::{BuildActor, Publisher};
use super::fs::FsActor;
use super::messages::BuildMsg;
use crate::build::Rebuilder;
use crate::renderer::Render;
use crate::{debug, log};

/// One queued rebuild is enough: anything arriving while it waits is
/// covered by it.
const BUILD_QUEUE: usize = 1;

pub struct Coordinator {
    fs: FsActor,
    build_tx: mpsc::Sender<BuildMsg>,
    build_rx: mpsc::Receiver<BuildMsg>,
}

impl Coordinator {
    /// Attach the watcher now so edits during the initial build are kept.
    pub fn new(site_dir: &Path, debounce: Duration) -> Result<Self> {
        let (build_tx, build_rx) = mpsc::channel(BUILD_QUEUE);
        let fs = FsActor::new(site_dir, debounce, build_tx.clone())
            .map_err(|e| anyhow!("watcher failed: {}", e))?;
        Ok(Self {
            fs,
            build_tx,
            build_rx,
        })
    }

    /// Run the actors on a dedicated thread until `shutdown_rx` fires.
    pub fn start<R: Render + Send + 'static>(
        self,
        rebuilder: Rebuilder<R>,
        publisher: Publisher,
        shutdown_rx: Receiver<()>,
    ) -> Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("actors".into())
            .spawn(move || {
                let rt = match tokio::runtime::Builder::new_multi_thread()
                    .worker_threads(2)
                    .enable_all()
                    .build()
                {
                    Ok(rt) => rt,
                    Err(e) => {
                        log!("error"; "failed to create tokio runtime: {}", e);
                        return;
                    }
                };
                rt.block_on(self.run(rebuilder, publisher, shutdown_rx));
            })
            .context("failed to spawn actor thread")
    }

    async fn run<R: Render + Send + 'static>(
        self,
        rebuilder: Rebuilder<R>,
        publisher: Publisher,
        shutdown_rx: Receiver<()>,
    ) {
        let Self {
            fs,
            build_tx,
            build_rx,
        } = self;

        let builder = BuildActor::new(build_rx, rebuilder, publisher);
        let build_handle = tokio::spawn(builder.run());
        let fs_handle = tokio::spawn(fs.run());
        debug!("actor"; "start");

        loop {
            if shutdown_rx.try_recv().is_ok() {
                debug!("actor"; "shutdown signal received");
                break;
            }
            if fs_handle.is_finished() || build_handle.is_finished() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        fs_handle.abort();
        // a pass in flight finishes; a queued one may be skipped
        let stop = async {
            let _ = build_tx.send(BuildMsg::Shutdown).await;
            let _ = build_handle.await;
        };
        let _ = tokio::time::timeout(Duration::from_millis(500), stop).await;
        debug!("actor"; "stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::theme;
    use crate::reload::{LiveReload, PollReply};
    use crate::renderer::RendererError;
    use crate::site::SETTINGS_PATH;
    use crate::utils::path::normalize_path;
    use std::fs;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Wraps the body in `<p>`; the count is shared with the test.
    struct CountingRenderer {
        calls: Arc<AtomicUsize>,
    }

    impl Render for CountingRenderer {
        fn render(&mut self, body: &str) -> Result<String, RendererError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("<p>{}</p>", body.trim()))
        }
    }

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_edit_rebuilds_once_and_reloads_every_tab() {
        let dir = TempDir::new().unwrap();
        let root = normalize_path(dir.path());
        write(&root, SETTINGS_PATH, "Name: Test\nNavbarLinks: b.dj\n");
        for (name, content) in theme::FILES {
            write(&root, &format!("_s4g/theme/{name}"), content);
        }
        write(&root, "a.dj", "Title: A\nShowInFeed: false\n---\nfirst\n");
        write(&root, "b.dj", "Title: B\nShowInFeed: false\n---\nother\n");

        let coordinator = Coordinator::new(&root, Duration::from_millis(150)).unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut rebuilder = Rebuilder::new(&root, CountingRenderer { calls: Arc::clone(&calls) });
        let live = Arc::new(LiveReload::new());
        let (root_tx, root_rx) = crossbeam::channel::unbounded();
        let publisher = Publisher::new(Arc::clone(&live), root_tx);

        publisher.publish(rebuilder.run());
        assert_eq!(root_rx.try_recv().unwrap(), "/");
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let (stop_tx, stop_rx) = crossbeam::channel::bounded(1);
        let handle = coordinator.start(rebuilder, publisher, stop_rx).unwrap();

        // the initial build's own outputs settle without another pass
        assert!(root_rx.recv_timeout(Duration::from_millis(800)).is_err());

        assert_eq!(live.poll("tab-1"), PollReply::Wait);
        assert_eq!(live.poll("tab-2"), PollReply::Wait);
        calls.store(0, Ordering::SeqCst);

        write(&root, "a.dj", "Title: A\nShowInFeed: false\n---\nsecond\n");

        assert_eq!(root_rx.recv_timeout(Duration::from_secs(5)).unwrap(), "/");
        assert!(root_rx.recv_timeout(Duration::from_millis(800)).is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(fs::read_to_string(root.join("a.html")).unwrap().contains("<p>second</p>"));

        assert_eq!(live.poll("tab-1"), PollReply::Reload);
        assert_eq!(live.poll("tab-1"), PollReply::Wait);
        assert_eq!(live.poll("tab-2"), PollReply::Reload);
        assert_eq!(live.poll("tab-3"), PollReply::Wait);
        assert!(live.current_error().is_none());

        stop_tx.send(()).unwrap();
        handle.join().unwrap();
    }
}
