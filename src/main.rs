//! s4g - watch, rebuild and live-reload a djot static site.

mod actor;
mod build;
mod cli;
mod config;
mod core;
mod embed;
mod generator;
mod logger;
mod reload;
mod renderer;
mod site;
mod utils;

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use crossbeam::channel;

use actor::{Coordinator, Publisher};
use build::Rebuilder;
use cli::serve::DevServer;
use cli::{Cli, Commands, ServeArgs};
use config::DevConfig;
use reload::LiveReload;
use renderer::RendererClient;
use site::Settings;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    match cli.command() {
        Commands::New { folder } => cli::new::new_site(&folder),
        Commands::Serve { args } => serve(&args),
    }
}

// =============================================================================
// Serve Command
// =============================================================================

/// Renderer → watcher → initial rebuild → server → actors, then wait for
/// root changes until Ctrl+C.
fn serve(args: &ServeArgs) -> Result<()> {
    logger::set_verbose(args.verbose);
    let config = DevConfig::load(args)?;

    let command = config.renderer.command();
    let renderer = match RendererClient::start(&command) {
        Ok(renderer) => renderer,
        Err(e) => {
            log!("error"; "{}", e);
            std::process::exit(1);
        }
    };
    log!("renderer"; "started `{}`", command.first().map_or("", String::as_str));

    // watcher first, so edits during the initial build are not lost
    let coordinator = if config.serve.watch {
        Some(Coordinator::new(&config.site_dir, config.debounce())?)
    } else {
        None
    };

    let live = Arc::new(LiveReload::new());
    let (root_tx, root_rx) = channel::unbounded::<String>();
    let publisher = Publisher::new(Arc::clone(&live), root_tx);

    let mut rebuilder = Rebuilder::new(&config.site_dir, renderer);
    publisher.publish(rebuilder.run());
    logger::status_detach();

    // a failed initial build still serves the overlay under the configured root
    let root = root_rx
        .try_recv()
        .ok()
        .or_else(|| Settings::load(&config.site_dir).ok().map(|s| s.root))
        .unwrap_or_else(|| "/".to_string());

    let mut server = DevServer::start(&config, Arc::clone(&live), root)?;

    let (stop_tx, stop_rx) = channel::unbounded::<()>();
    let (actor_stop_tx, actor_stop_rx) = channel::unbounded::<()>();
    core::register_shutdown(vec![stop_tx, actor_stop_tx]);

    let actors = match coordinator {
        Some(coordinator) => Some(coordinator.start(rebuilder, publisher, actor_stop_rx)?),
        None => {
            log!("watch"; "disabled, serving the current build");
            drop(publisher);
            None
        }
    };

    loop {
        channel::select! {
            recv(root_rx) -> root => match root {
                Ok(root) => {
                    server.set_root(root)?;
                }
                // no more rebuilds: only Ctrl+C is left to wait for
                Err(_) => {
                    let _ = stop_rx.recv();
                    break;
                }
            },
            recv(stop_rx) -> _ => break,
        }
    }

    server.shutdown();
    wait_for_shutdown(actors);
    Ok(())
}

/// Wait for actor system to shutdown gracefully (max 2 seconds).
fn wait_for_shutdown(handle: Option<JoinHandle<()>>) {
    let Some(handle) = handle else { return };

    for _ in 0..40 {
        if handle.is_finished() {
            let _ = handle.join();
            return;
        }
        thread::sleep(Duration::from_millis(50));
    }
}
