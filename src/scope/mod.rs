//! The oscilloscope session: connection lifecycle, discovery, and the
//! per-subsystem operations implemented in the submodules.
//!
//! Every public operation follows the same contract: failures at the
//! transport boundary are logged with the operation's context and turned
//! into a sentinel return (`false`, `None`, or an empty waveform). Nothing
//! here panics, retries, or propagates a transport fault to the caller.

use log::{error, info, warn};

use crate::config::ScopeConfig;
use crate::error::ScopeError;
use crate::visa::{Instrument, ResourceManager};
use crate::waveform::SampleEncoding;

mod acquire;
mod channel;
mod export;
mod trigger;

pub use export::write_waveform_file;

/// A session owning the connection to one oscilloscope.
///
/// Created unconnected; [`connect`](ScopeSession::connect) opens the
/// transport handle, [`disconnect`](ScopeSession::disconnect) closes it.
/// One session serves one instrument; operations are strictly sequential,
/// blocking the calling thread until the device responds or the configured
/// timeout elapses.
///
/// # Examples
///
/// ```
/// use tekscope::{Channel, ScopeConfig, ScopeSession};
/// use tekscope::visa::MockResourceManager;
///
/// let rm = MockResourceManager::new();
/// let mut scope = ScopeSession::new(Box::new(rm), ScopeConfig::default());
/// assert!(!scope.connect(None)); // nothing to detect
/// assert!(scope.acquire_waveform(Channel::CH1).is_empty());
/// ```
pub struct ScopeSession {
    rm: Box<dyn ResourceManager>,
    handle: Option<Box<dyn Instrument>>,
    connected: bool,
    address: Option<String>,
    config: ScopeConfig,
    encoding: SampleEncoding,
}

impl ScopeSession {
    /// Create an unconnected session on top of a resource manager.
    pub fn new(rm: Box<dyn ResourceManager>, config: ScopeConfig) -> Self {
        Self {
            rm,
            handle: None,
            connected: false,
            address: None,
            config,
            encoding: SampleEncoding::default(),
        }
    }

    /// Create an unconnected session over the system VISA library.
    #[cfg(feature = "visa")]
    pub fn native(config: ScopeConfig) -> Result<Self, ScopeError> {
        let rm = crate::visa::NativeResourceManager::new()?;
        Ok(Self::new(Box::new(rm), config))
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Address of the currently connected instrument, if any.
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Scan all visible resources for a matching oscilloscope.
    ///
    /// Each resource is opened, identified with `*IDN?`, and closed again.
    /// A resource qualifies when its identity contains both the configured
    /// vendor and model-family markers (case-insensitive). Per-resource
    /// failures skip that resource; an enumeration failure ends the scan.
    ///
    /// Returns the first qualifying address, or `None`.
    pub fn auto_detect(&self) -> Option<String> {
        match self.try_auto_detect() {
            Ok(address) => address,
            Err(e) => {
                error!("Error during auto-detection: {e}");
                None
            }
        }
    }

    fn try_auto_detect(&self) -> Result<Option<String>, ScopeError> {
        let resources = self.rm.list_resources()?;
        for address in resources {
            let Ok(mut handle) = self.rm.open(&address) else {
                continue;
            };
            let idn = handle.query("*IDN?");
            let _ = handle.close();
            let Ok(idn) = idn else {
                continue;
            };
            if self.identity_matches(&idn) {
                info!("Found {} scope at {address}: {}", self.config.model_marker, idn.trim());
                return Ok(Some(address));
            }
        }
        warn!(
            "No {} {} oscilloscope found",
            self.config.vendor_marker, self.config.model_marker
        );
        Ok(None)
    }

    fn identity_matches(&self, idn: &str) -> bool {
        let idn = idn.to_uppercase();
        idn.contains(&self.config.vendor_marker.to_uppercase())
            && idn.contains(&self.config.model_marker.to_uppercase())
    }

    /// Establish the connection and put the scope into a known state.
    ///
    /// Without an address, discovery runs first; if it finds nothing the
    /// connect fails before opening anything. Otherwise the resource is
    /// opened, the response timeout applied, and the init sequence issued:
    /// `*RST`, `HEADER OFF`, `VERBOSE ON`. A failure at any step closes
    /// the half-open handle and leaves the session disconnected.
    ///
    /// Connecting while already connected closes the existing handle
    /// first.
    pub fn connect(&mut self, address: Option<&str>) -> bool {
        if self.connected {
            self.disconnect();
        }
        let address = match address.map(str::to_string).or_else(|| self.auto_detect()) {
            Some(address) => address,
            None => {
                error!("Failed to connect: {}", ScopeError::NoDeviceFound);
                return false;
            }
        };

        match self.try_connect(&address) {
            Ok(()) => {
                self.connected = true;
                self.address = Some(address.clone());
                info!("Successfully connected to scope at {address}");
                true
            }
            Err(e) => {
                error!("Failed to connect to {address}: {e}");
                false
            }
        }
    }

    fn try_connect(&mut self, address: &str) -> Result<(), ScopeError> {
        let mut handle = self.rm.open(address)?;
        match self.initialize(&mut *handle) {
            Ok(()) => {
                self.handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                if let Err(close_err) = handle.close() {
                    warn!("Error closing half-open session: {close_err}");
                }
                Err(e)
            }
        }
    }

    fn initialize(&self, handle: &mut dyn Instrument) -> Result<(), ScopeError> {
        handle.set_timeout(self.config.timeout())?;
        let idn = handle.query("*IDN?")?;
        if !self.identity_matches(&idn) {
            warn!(
                "Connected device may not be a {} {}: {}",
                self.config.vendor_marker,
                self.config.model_marker,
                idn.trim()
            );
        }
        handle.write("*RST")?;
        handle.write("HEADER OFF")?;
        handle.write("VERBOSE ON")?;
        Ok(())
    }

    /// Close the transport handle. Safe to call repeatedly; a failure
    /// while closing is logged, and the session counts as disconnected
    /// afterwards either way.
    pub fn disconnect(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            match handle.close() {
                Ok(()) => info!("Disconnected from scope"),
                Err(e) => error!("Error disconnecting from scope: {e}"),
            }
        }
        self.connected = false;
        self.address = None;
    }

    /// Connected-precondition check shared by every operation.
    fn handle_mut(&mut self) -> Result<&mut (dyn Instrument + 'static), ScopeError> {
        if !self.connected {
            return Err(ScopeError::NotConnected);
        }
        self.handle.as_deref_mut().ok_or(ScopeError::NotConnected)
    }
}
