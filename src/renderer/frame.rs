//! Sentinel-terminated frames over a byte stream.
//!
//! A frame is the payload followed by one `0xFF` byte. `0xFF` never occurs
//! in UTF-8, so text payloads need no escaping or length prefix.

use std::io::{self, BufRead, Write};

pub const SENTINEL: u8 = 0xFF;

/// Write `payload` and its terminator, then flush.
pub fn write_frame<W: Write>(w: &mut W, payload: &[u8]) -> io::Result<()> {
    if let Some(pos) = payload.iter().position(|&b| b == SENTINEL) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("payload contains frame terminator at offset {pos}"),
        ));
    }
    w.write_all(payload)?;
    w.write_all(&[SENTINEL])?;
    w.flush()
}

/// Read the next frame, without its terminator.
///
/// Returns `Ok(None)` on a clean end of stream. A stream that ends in the
/// middle of a frame is `UnexpectedEof`.
pub fn read_frame<R: BufRead>(r: &mut R) -> io::Result<Option<Vec<u8>>> {
    let mut buf = Vec::new();
    let n = r.read_until(SENTINEL, &mut buf)?;
    if n == 0 {
        return Ok(None);
    }
    if buf.pop() != Some(SENTINEL) {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("stream closed after {n} bytes without frame terminator"),
        ));
    }
    Ok(Some(buf))
}
