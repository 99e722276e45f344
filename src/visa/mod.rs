//! VISA transport boundary.
//!
//! The session talks to the instrument through two object-safe traits:
//! [`ResourceManager`] for enumeration/open and [`Instrument`] for the
//! command/query exchange on one open resource. The real backend
//! (`visa-rs`, behind the `visa` cargo feature) and the scripted mock both
//! implement them, so everything above this boundary can be tested without
//! hardware.

use std::io::Read;
use std::time::Duration;

use crate::error::ScopeError;

pub mod mock;
#[cfg(feature = "visa")]
pub mod native;

pub use mock::{MockInstrument, MockResourceManager};
#[cfg(feature = "visa")]
pub use native::{NativeInstrument, NativeResourceManager};

/// Enumerates and opens VISA resources.
pub trait ResourceManager {
    /// List all visible resource address strings.
    fn list_resources(&self) -> Result<Vec<String>, ScopeError>;

    /// Open one resource by address.
    fn open(&self, address: &str) -> Result<Box<dyn Instrument>, ScopeError>;
}

/// One open VISA session: blocking ASCII writes, text queries, and binary
/// block transfers.
pub trait Instrument {
    /// Set the response timeout for subsequent operations.
    fn set_timeout(&mut self, timeout: Duration) -> Result<(), ScopeError>;

    /// Fire-and-forget ASCII command.
    fn write(&mut self, command: &str) -> Result<(), ScopeError>;

    /// ASCII query returning a single-line text response.
    fn query(&mut self, command: &str) -> Result<String, ScopeError>;

    /// Query returning the payload of a binary block response.
    fn query_binary(&mut self, command: &str) -> Result<Vec<u8>, ScopeError>;

    /// Close the session. Further use is an error.
    fn close(&mut self) -> Result<(), ScopeError>;
}

/// Read an IEEE 488.2 definite-length block (`#<n><length><data>`) from a
/// stream, returning the payload.
///
/// Reads exactly the declared number of payload bytes and nothing more.
/// VISA reads carry no end-of-file signal, so reading past the block
/// would stall until the response timeout; stopping at the declared
/// length keeps the transfer bounded. The trailing response terminator
/// stays in the stream.
pub fn read_block<R: Read>(reader: &mut R) -> Result<Vec<u8>, ScopeError> {
    let mut byte = [0u8; 1];
    reader.read_exact(&mut byte)?;
    if byte[0] != b'#' {
        return Err(ScopeError::Parse(
            "binary response missing '#' block header".to_string(),
        ));
    }
    reader.read_exact(&mut byte)?;
    let digit_count = (byte[0] as char)
        .to_digit(10)
        .ok_or_else(|| ScopeError::Parse("invalid block header digit count".to_string()))?
        as usize;
    if digit_count == 0 {
        return Err(ScopeError::Parse(
            "indefinite-length block response not supported".to_string(),
        ));
    }
    let mut length_field = vec![0u8; digit_count];
    reader.read_exact(&mut length_field)?;
    let payload_len: usize = std::str::from_utf8(&length_field)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| ScopeError::Parse("invalid block header length field".to_string()))?;
    let mut payload = vec![0u8; payload_len];
    reader.read_exact(&mut payload)?;
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Yields a scripted block, then fails every read past it the way a
    /// VISA session does when the response is exhausted.
    struct TimesOutAfterBlock {
        data: std::io::Cursor<Vec<u8>>,
    }

    impl Read for TimesOutAfterBlock {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            match self.data.read(buf)? {
                0 => Err(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "response timeout",
                )),
                n => Ok(n),
            }
        }
    }

    #[test]
    fn test_read_block() {
        let mut reader = &b"#15hello\n"[..];
        assert_eq!(read_block(&mut reader).unwrap(), b"hello");
    }

    #[test]
    fn test_read_block_multi_digit_length() {
        let mut block = b"#3100".to_vec();
        block.extend(std::iter::repeat(0xAAu8).take(100));
        let mut reader = &block[..];
        assert_eq!(read_block(&mut reader).unwrap().len(), 100);
    }

    #[test]
    fn test_read_block_leaves_terminator_in_stream() {
        let mut reader = &b"#15hello\n"[..];
        read_block(&mut reader).unwrap();
        assert_eq!(reader, b"\n");
    }

    #[test]
    fn test_read_block_stops_at_declared_length() {
        // No terminator after the payload: any read past the block
        // times out, so the payload must come back without one.
        let mut reader = TimesOutAfterBlock {
            data: std::io::Cursor::new(b"#15hello".to_vec()),
        };
        assert_eq!(read_block(&mut reader).unwrap(), b"hello");
    }

    #[test]
    fn test_read_block_rejects_missing_hash() {
        let mut reader = &b"5hello"[..];
        assert!(read_block(&mut reader).is_err());
    }

    #[test]
    fn test_read_block_rejects_indefinite_length() {
        let mut reader = &b"#0hello\n"[..];
        assert!(read_block(&mut reader).is_err());
    }

    #[test]
    fn test_read_block_rejects_short_payload() {
        let mut reader = &b"#19abc"[..];
        assert!(read_block(&mut reader).is_err());
    }
}
