//! HTTP response handlers.

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use tiny_http::{Header, Request, Response, StatusCode};

use super::content::inject_livereload;
use crate::embed::serve::{RELOAD, WAIT};
use crate::reload::{ErrorPage, PollReply};
use crate::utils::mime::types::{HTML, PLAIN};

/// Answer a live-reload poll.
pub fn respond_poll(request: Request, reply: PollReply) -> Result<()> {
    let body = match reply {
        PollReply::Reload => RELOAD,
        PollReply::Wait => WAIT,
    };
    let response = Response::from_string(body);
    let response = with_header(response, "Content-Type", PLAIN);
    let response = with_header(response, "Cache-Control", "no-store");
    request.respond(response)?;
    Ok(())
}

/// 307 to `location`.
pub fn respond_redirect(request: Request, location: &str) -> Result<()> {
    let response = Response::empty(StatusCode(307));
    request.respond(with_header(response, "Location", location))?;
    Ok(())
}

/// HTML page from disk with the live-reload script injected.
pub fn respond_page(request: Request, path: &Path) -> Result<()> {
    let body = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    send_body(request, 200, HTML, inject_livereload(&body))
}

/// Build error overlay, shown in place of any page.
pub fn respond_overlay(request: Request, error: &ErrorPage) -> Result<()> {
    let body = inject_livereload(error.render().as_bytes());
    send_body(request, 200, HTML, body)
}

/// Static file, untouched.
pub fn respond_file(request: Request, path: &Path) -> Result<()> {
    let content_type = crate::utils::mime::from_path(path);
    let body = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    send_body(request, 200, content_type, body)
}

pub fn respond_not_found(request: Request) -> Result<()> {
    send_body(request, 404, PLAIN, b"404 Not Found".to_vec())
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(request, 503, PLAIN, b"503 Service Unavailable".to_vec())
}

fn send_body(request: Request, status: u16, content_type: &str, body: Vec<u8>) -> Result<()> {
    let response = Response::from_data(body).with_status_code(StatusCode(status));
    request.respond(with_header(response, "Content-Type", content_type))?;
    Ok(())
}

/// Header values here are ASCII constants or URL paths; a value that
/// cannot form a header is dropped.
fn with_header<R: Read>(response: Response<R>, key: &str, value: &str) -> Response<R> {
    match Header::from_bytes(key.as_bytes(), value.as_bytes()) {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}
