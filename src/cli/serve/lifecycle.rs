//! Listener binding.

use std::net::{IpAddr, SocketAddr};
use std::thread;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tiny_http::Server;

use crate::{debug, log};

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Attempts to re-bind the same address after a restart.
const MAX_REBIND_RETRIES: u32 = 20;
const REBIND_DELAY: Duration = Duration::from_millis(50);

/// Bind to the specified interface and port, with automatic port retry.
pub fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let mut last_err = None;
    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                // port 0 asks the OS to pick
                let addr = server.server_addr().to_ip().unwrap_or(addr);
                return Ok((server, addr));
            }
            Err(e) => last_err = Some(e),
        }
    }
    Err(anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES,
        base_port,
        base_port.saturating_add(MAX_PORT_RETRIES - 1),
        last_err.map(|e| e.to_string()).unwrap_or_default()
    ))
}

/// Bind exactly `addr` again, waiting for the previous listener to close.
pub fn rebind(addr: SocketAddr) -> Result<Server> {
    let mut attempt = 0;
    loop {
        match Server::http(addr) {
            Ok(server) => return Ok(server),
            Err(e) if attempt + 1 < MAX_REBIND_RETRIES => {
                debug!("serve"; "rebind {} failed ({}), retrying", addr, e);
                attempt += 1;
                thread::sleep(REBIND_DELAY);
            }
            Err(e) => return Err(anyhow!("Failed to rebind {}: {}", addr, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_bind_skips_taken_port() {
        let (first, addr) = bind_with_retry(IpAddr::V4(Ipv4Addr::LOCALHOST), 0).unwrap();
        let (_second, next) = bind_with_retry(addr.ip(), addr.port()).unwrap();

        assert_ne!(addr.port(), next.port());
        drop(first);
    }

    #[test]
    fn test_rebind_after_drop() {
        let (server, addr) = bind_with_retry(IpAddr::V4(Ipv4Addr::LOCALHOST), 0).unwrap();
        drop(server);
        let again = rebind(addr).unwrap();
        assert_eq!(again.server_addr().to_ip(), Some(addr));
    }
}
