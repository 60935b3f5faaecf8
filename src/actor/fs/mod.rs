//! FileSystem Actor
//!
//! Watches the site folder and sends one debounced rebuild request per
//! burst of relevant changes.
//!
//! ```text
//! notify thread → bridge thread → FsActor (classify, debounce) → BuildMsg
//! ```
//!
//! The watcher is created before the initial build, so edits made while
//! that build runs are buffered rather than lost.
//!
//! Changed paths are collected per burst. When the burst settles, paths
//! listed in the generated-file manifest are dropped; a burst made only of
//! the rebuild's own outputs sends nothing.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use notify::RecommendedWatcher;
use rustc_hash::FxHashSet;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use super::messages::BuildMsg;
use crate::utils::path::{normalize_path, to_site_path};
use crate::{debug, log};

// Event filtering.
mod classifier;
// Pure timing.
mod debouncer;
// Generated-file tracking.
mod outputs;
// Watched folder registration.
mod watch_set;


pub use debouncer::DEBOUNCE_MS;

use classifier::{ChangeKind, is_relevant};
use debouncer::Debouncer;
use outputs::GeneratedFiles;
use watch_set::WatchSet;

/// FileSystem Actor - watches for file changes
pub struct FsActor {
    site_dir: PathBuf,
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    watcher: RecommendedWatcher,
    watch_set: WatchSet,
    debouncer: Debouncer,
    outputs: GeneratedFiles,
    /// Capacity-1 channel to the BuildActor
    build_tx: mpsc::Sender<BuildMsg>,
}

impl FsActor {
    /// Start watching immediately; events buffer until [`FsActor::run`].
    pub fn new(
        site_dir: &Path,
        debounce: Duration,
        build_tx: mpsc::Sender<BuildMsg>,
    ) -> notify::Result<Self> {
        let site_dir = normalize_path(site_dir);
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        let mut watch_set = WatchSet::new();
        watch_set.register_tree(&mut watcher, &site_dir);
        debug!("watch"; "{} folders under {}", watch_set.len(), site_dir.display());

        let outputs = GeneratedFiles::load(&site_dir);

        Ok(Self {
            site_dir,
            notify_rx,
            watcher,
            watch_set,
            debouncer: Debouncer::new(debounce),
            outputs,
            build_tx,
        })
    }

    /// Run the actor event loop until the BuildActor goes away.
    pub async fn run(self) {
        let Self {
            site_dir,
            notify_rx,
            mut watcher,
            mut watch_set,
            mut debouncer,
            mut outputs,
            build_tx,
        } = self;

        // site paths changed in the current burst
        let mut pending = FxHashSet::default();

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        std::thread::Builder::new()
            .name("watch-bridge".into())
            .spawn(move || {
                while let Ok(result) = notify_rx.recv() {
                    match result {
                        Ok(event) => {
                            if async_tx.blocking_send(event).is_err() {
                                break; // Receiver dropped
                            }
                        }
                        Err(e) => log!("watch"; "notify error: {}", e),
                    }
                }
            })
            .ok();

        loop {
            tokio::select! {
                biased;
                event = async_rx.recv() => {
                    let Some(event) = event else { break };
                    if accept(&site_dir, &event, &mut watcher, &mut watch_set, &mut pending) {
                        debouncer.add_event(Instant::now());
                    }
                }
                _ = tokio::time::sleep(debouncer.sleep_duration(Instant::now())) => {
                    if !debouncer.take_if_ready(Instant::now()) {
                        continue;
                    }
                    outputs.refresh();
                    let changed = pending.drain().filter(|rel: &String| !outputs.covers(rel)).count();
                    if changed == 0 {
                        debug!("watch"; "only generated files changed");
                        continue;
                    }
                    match build_tx.try_send(BuildMsg::Rebuild) {
                        Ok(()) => {}
                        // one rebuild is already queued behind the running one
                        Err(TrySendError::Full(_)) => debug!("watch"; "rebuild already queued"),
                        Err(TrySendError::Closed(_)) => break,
                    }
                }
            }
        }

        debug!("watch"; "stopped (pending: {})", debouncer.is_pending());
    }
}

/// Classify one event, adding its relevant site paths to `pending`;
/// registers new folders as a side effect.
fn accept(
    site_dir: &Path,
    event: &notify::Event,
    watcher: &mut RecommendedWatcher,
    watch_set: &mut WatchSet,
    pending: &mut FxHashSet<String>,
) -> bool {
    let Some(kind) = ChangeKind::from_event(&event.kind) else {
        return false;
    };

    let mut relevant = false;
    for path in &event.paths {
        if !is_relevant(site_dir, path, kind) {
            continue;
        }
        if kind.may_add_dir() && path.is_dir() {
            watch_set.register_tree(watcher, path);
        }
        debug!("watch"; "{} {}", kind.label(), path.display());
        if let Some(rel) = to_site_path(site_dir, path) {
            pending.insert(rel);
        }
        relevant = true;
    }
    relevant
}
