//! Development server with live reload support.
//!
//! A `tiny_http` listener whose requests run on a rayon pool. The server
//! serves the site folder itself, under the site root (`/` or a prefix
//! like `/blog/`). When a rebuild changes the root, the listener is shut
//! down gracefully and bound again at the same address.

mod content;
mod lifecycle;
mod path;
mod response;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use tiny_http::{Request, Server};

use crate::config::DevConfig;
use crate::embed::serve::CLIENT_ID_HEADER;
use crate::reload::LiveReload;
use crate::{debug, log};
use path::{Route, resolve_path, route};

/// Worker threads per listener.
const REQUEST_THREADS: usize = 4;

/// What request handlers need, fixed for one listener's lifetime.
struct ServeContext {
    site_dir: PathBuf,
    root: String,
    live: Arc<LiveReload>,
}

struct Listener {
    server: Arc<Server>,
    root: String,
    handle: JoinHandle<()>,
}

pub struct DevServer {
    addr: SocketAddr,
    site_dir: PathBuf,
    live: Arc<LiveReload>,
    listener: Option<Listener>,
}

impl DevServer {
    /// Bind (with port retry) and start serving `root`.
    pub fn start(config: &DevConfig, live: Arc<LiveReload>, root: String) -> Result<Self> {
        let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
        let mut dev = Self {
            addr,
            site_dir: config.site_dir.clone(),
            live,
            listener: None,
        };
        dev.listen(server, root)?;
        Ok(dev)
    }

    #[cfg(test)]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn root(&self) -> Option<&str> {
        self.listener.as_ref().map(|l| l.root.as_str())
    }

    /// Restart under `root` unless it is already the active one. Returns
    /// whether a restart happened.
    pub fn set_root(&mut self, root: String) -> Result<bool> {
        if self.root() == Some(root.as_str()) {
            return Ok(false);
        }
        log!("serve"; "root changed to {}, restarting server", root);
        self.stop();
        let server = lifecycle::rebind(self.addr)?;
        self.listen(server, root)?;
        Ok(true)
    }

    /// Stop accepting, finish in-flight requests.
    pub fn shutdown(&mut self) {
        self.stop();
    }

    fn listen(&mut self, server: Server, root: String) -> Result<()> {
        let server = Arc::new(server);
        crate::core::register_server(Arc::clone(&server));

        let ctx = ServeContext {
            site_dir: self.site_dir.clone(),
            root: root.clone(),
            live: Arc::clone(&self.live),
        };
        let loop_server = Arc::clone(&server);
        let handle = thread::Builder::new()
            .name("http".into())
            .spawn(move || run_request_loop(&loop_server, &ctx))
            .context("failed to spawn server thread")?;

        log!("serve"; "http://{}{}", self.addr, root);
        self.listener = Some(Listener {
            server,
            root,
            handle,
        });
        Ok(())
    }

    fn stop(&mut self) {
        let Some(listener) = self.listener.take() else {
            return;
        };
        crate::core::unregister_server();
        listener.server.unblock();
        if listener.handle.join().is_err() {
            log!("serve"; "server thread panicked");
        }
        debug!("serve"; "listener for {} stopped", listener.root);
    }
}

impl Drop for DevServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Serve until the server is unblocked; returns once in-flight requests
/// are done.
fn run_request_loop(server: &Server, ctx: &ServeContext) {
    let pool = match rayon::ThreadPoolBuilder::new()
        .num_threads(REQUEST_THREADS)
        .thread_name(|i| format!("http-worker-{i}"))
        .build()
    {
        Ok(pool) => pool,
        Err(e) => {
            log!("error"; "failed to create request pool: {}", e);
            return;
        }
    };

    pool.scope(|scope| {
        for request in server.incoming_requests() {
            scope.spawn(move |_| {
                if let Err(e) = handle_request(request, ctx) {
                    log!("serve"; "request error: {e}");
                }
            });
        }
    });
}

/// Handle a single HTTP request
fn handle_request(request: Request, ctx: &ServeContext) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    match route(request.url(), &ctx.root) {
        Route::Poll => {
            let token = header_value(&request, CLIENT_ID_HEADER).unwrap_or_default();
            let reply = ctx.live.poll(&token);
            response::respond_poll(request, reply)
        }
        Route::Redirect(location) => response::respond_redirect(request, &location),
        Route::Page(rel) => {
            if let Some(error) = ctx.live.current_error() {
                return response::respond_overlay(request, &error);
            }
            match resolve_path(&rel, &ctx.site_dir) {
                Some(file) if file.is_file() => response::respond_page(request, &file),
                _ => response::respond_not_found(request),
            }
        }
        Route::Static(rel) => match resolve_path(&rel, &ctx.site_dir) {
            Some(file) if file.is_file() => response::respond_file(request, &file),
            Some(_) => {
                // folder without trailing slash
                let location = format!("{}/", request.url().split('?').next().unwrap_or(""));
                response::respond_redirect(request, &location)
            }
            None => response::respond_not_found(request),
        },
    }
}

fn header_value(request: &Request, name: &str) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|h| h.field.as_str().as_str().eq_ignore_ascii_case(name))
        .map(|h| h.value.to_string())
}
