//! Renderer client: djot to HTML through one long-lived subprocess.
//!
//! The subprocess is started once and reused for every conversion. Each
//! request is one frame on its stdin, each response one frame on its
//! stdout (see [`frame`]). Diagnostic lines on its stderr are forwarded to
//! the log with a `[renderer]` prefix.
//!
//! Conversions are synchronous and take `&mut self`, so at most one request
//! is ever in flight.

pub mod frame;

use std::io::{self, BufRead, BufReader, BufWriter};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::thread::{self, JoinHandle};

use thiserror::Error;

use crate::{debug, log};

/// Renderer failures. All of them are fatal: without a working renderer
/// there is nothing meaningful to serve.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("renderer command is empty")]
    EmptyCommand,

    #[error("failed to start renderer `{program}`")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("renderer {0} pipe unavailable")]
    Pipe(&'static str),

    #[error("failed to send request to renderer")]
    Write(#[source] io::Error),

    #[error("failed to read renderer response")]
    Read(#[source] io::Error),

    #[error("renderer closed its output stream")]
    Closed,

    #[error("renderer `{0}` exited before answering its first request (see its output above)")]
    NoAnswer(String),

    #[error("renderer produced invalid UTF-8")]
    InvalidOutput,
}

/// Markup to HTML conversion.
pub trait Render {
    fn render(&mut self, body: &str) -> Result<String, RendererError>;
}

/// Handle to the running renderer subprocess.
pub struct RendererClient {
    program: String,
    child: Child,
    stdin: BufWriter<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    stderr_drain: Option<JoinHandle<()>>,
}

impl RendererClient {
    /// Launch `command` (program followed by its arguments).
    pub fn spawn(command: &[String]) -> Result<Self, RendererError> {
        let (program, args) = command.split_first().ok_or(RendererError::EmptyCommand)?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RendererError::Launch {
                program: program.clone(),
                source,
            })?;

        let stdin = child.stdin.take().ok_or(RendererError::Pipe("stdin"))?;
        let stdout = child.stdout.take().ok_or(RendererError::Pipe("stdout"))?;
        let stderr = child.stderr.take().ok_or(RendererError::Pipe("stderr"))?;

        let stderr_drain = thread::Builder::new()
            .name("renderer-stderr".into())
            .spawn(move || {
                for line in BufReader::new(stderr).lines() {
                    match line {
                        Ok(line) => log!("renderer"; "{}", line),
                        Err(_) => break,
                    }
                }
            })
            .map_err(|_| RendererError::Pipe("stderr"))?;

        debug!("renderer"; "started `{}` (pid {})", program, child.id());

        Ok(Self {
            program: program.clone(),
            child,
            stdin: BufWriter::new(stdin),
            stdout: BufReader::new(stdout),
            stderr_drain: Some(stderr_drain),
        })
    }

    /// [`spawn`](Self::spawn), then convert an empty document so a renderer
    /// that dies on startup (missing module, wrong interpreter) is reported
    /// before the first build.
    pub fn start(command: &[String]) -> Result<Self, RendererError> {
        let mut client = Self::spawn(command)?;
        match client.render("") {
            Ok(_) => Ok(client),
            Err(RendererError::Closed | RendererError::Write(_) | RendererError::Read(_)) => {
                Err(RendererError::NoAnswer(client.program.clone()))
            }
            Err(e) => Err(e),
        }
    }
}

impl Render for RendererClient {
    fn render(&mut self, body: &str) -> Result<String, RendererError> {
        frame::write_frame(&mut self.stdin, body.as_bytes()).map_err(RendererError::Write)?;
        let response = frame::read_frame(&mut self.stdout)
            .map_err(RendererError::Read)?
            .ok_or(RendererError::Closed)?;
        String::from_utf8(response).map_err(|_| RendererError::InvalidOutput)
    }
}

impl Drop for RendererClient {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        if let Some(handle) = self.stderr_drain.take() {
            let _ = handle.join();
        }
    }
}
