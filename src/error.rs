use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScopeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Not connected to scope")]
    NotConnected,
    #[error("No oscilloscope found")]
    NoDeviceFound,
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid channel: {0} (valid range 1-4)")]
    InvalidChannel(u8),
}
