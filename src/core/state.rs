//! Process-wide shutdown state for serve mode.
//!
//! - `SHUTDOWN`: Has shutdown been requested? (Ctrl+C received)
//! - `SERVER`: the listener currently accepting requests, replaced on every
//!   restart so Ctrl+C always unblocks the live one

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock, OnceLock};

use parking_lot::Mutex;
use tiny_http::Server;

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// HTTP server reference for graceful shutdown
static SERVER: LazyLock<Mutex<Option<Arc<Server>>>> = LazyLock::new(|| Mutex::new(None));

/// Shutdown signal senders (actor system, root supervisor)
static SHUTDOWN_TX: OnceLock<Vec<crossbeam::channel::Sender<()>>> = OnceLock::new();

/// Setup the global Ctrl+C handler. Call once at program start
///
/// - Before `register_shutdown()`: exits immediately, nothing to wind down
/// - After: sets the flag, notifies listeners, unblocks the server
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);

        let Some(senders) = SHUTDOWN_TX.get() else {
            std::process::exit(0);
        };
        crate::log!("serve"; "shutting down...");
        for tx in senders {
            let _ = tx.send(());
        }
        if let Some(server) = SERVER.lock().as_ref() {
            server.unblock();
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register who needs to hear about Ctrl+C. Call once when serving starts.
pub fn register_shutdown(senders: Vec<crossbeam::channel::Sender<()>>) {
    let _ = SHUTDOWN_TX.set(senders);
}

/// Make `server` the one Ctrl+C unblocks.
pub fn register_server(server: Arc<Server>) {
    *SERVER.lock() = Some(server);
}

/// Release the stopped server so its address can be bound again.
pub fn unregister_server() {
    SERVER.lock().take();
}

/// Check if shutdown has been requested
///
/// Relaxed: worst case a few more requests are served before stopping
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}
