//! Scripted in-memory transport for tests and offline development.
//!
//! `MockInstrument` clones share their command log, so a test can keep one
//! handle while the session owns another and still observe every command
//! the session issued.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{Instrument, ResourceManager};
use crate::error::ScopeError;

#[derive(Debug, Default)]
struct MockState {
    commands: Vec<String>,
    closed: bool,
    timeout: Option<Duration>,
}

/// A scripted instrument: canned query responses, canned binary blocks,
/// and an optional command that fails on contact.
#[derive(Debug, Clone, Default)]
pub struct MockInstrument {
    responses: HashMap<String, String>,
    binary: HashMap<String, Vec<u8>>,
    fail_on: Option<String>,
    fail_on_close: bool,
    state: Arc<Mutex<MockState>>,
}

impl MockInstrument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a text response for a query command.
    pub fn with_response(mut self, command: &str, response: &str) -> Self {
        self.responses.insert(command.to_string(), response.to_string());
        self
    }

    /// Script a binary payload for a binary query command.
    pub fn with_binary(mut self, command: &str, payload: Vec<u8>) -> Self {
        self.binary.insert(command.to_string(), payload);
        self
    }

    /// Make exactly this command fail with a transport error.
    pub fn fail_on(mut self, command: &str) -> Self {
        self.fail_on = Some(command.to_string());
        self
    }

    /// Make `close` report a transport error.
    pub fn fail_on_close(mut self) -> Self {
        self.fail_on_close = true;
        self
    }

    /// Every command successfully transmitted so far, in order.
    pub fn commands(&self) -> Vec<String> {
        self.state.lock().unwrap().commands.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.state.lock().unwrap().timeout
    }

    fn check_fail(&self, command: &str) -> Result<(), ScopeError> {
        if self.fail_on.as_deref() == Some(command) {
            return Err(ScopeError::Transport(format!(
                "scripted failure on {command:?}"
            )));
        }
        Ok(())
    }

    fn record(&self, command: &str) {
        self.state.lock().unwrap().commands.push(command.to_string());
    }
}

impl Instrument for MockInstrument {
    fn set_timeout(&mut self, timeout: Duration) -> Result<(), ScopeError> {
        self.state.lock().unwrap().timeout = Some(timeout);
        Ok(())
    }

    fn write(&mut self, command: &str) -> Result<(), ScopeError> {
        self.check_fail(command)?;
        self.record(command);
        Ok(())
    }

    fn query(&mut self, command: &str) -> Result<String, ScopeError> {
        self.check_fail(command)?;
        self.record(command);
        self.responses.get(command).cloned().ok_or_else(|| {
            ScopeError::Transport(format!("no scripted response for {command:?}"))
        })
    }

    fn query_binary(&mut self, command: &str) -> Result<Vec<u8>, ScopeError> {
        self.check_fail(command)?;
        self.record(command);
        self.binary.get(command).cloned().ok_or_else(|| {
            ScopeError::Transport(format!("no scripted binary response for {command:?}"))
        })
    }

    fn close(&mut self) -> Result<(), ScopeError> {
        self.state.lock().unwrap().closed = true;
        if self.fail_on_close {
            return Err(ScopeError::Transport("scripted close failure".to_string()));
        }
        Ok(())
    }
}

/// A scripted resource manager holding mock instruments by address.
#[derive(Debug, Clone, Default)]
pub struct MockResourceManager {
    resources: Vec<String>,
    devices: HashMap<String, MockInstrument>,
    fail_enumeration: bool,
}

impl MockResourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an openable instrument at an address.
    pub fn with_device(mut self, address: &str, instrument: MockInstrument) -> Self {
        self.resources.push(address.to_string());
        self.devices.insert(address.to_string(), instrument);
        self
    }

    /// Register an address that enumerates but fails to open.
    pub fn with_phantom_resource(mut self, address: &str) -> Self {
        self.resources.push(address.to_string());
        self
    }

    /// Make enumeration itself fail.
    pub fn fail_enumeration(mut self) -> Self {
        self.fail_enumeration = true;
        self
    }
}

impl ResourceManager for MockResourceManager {
    fn list_resources(&self) -> Result<Vec<String>, ScopeError> {
        if self.fail_enumeration {
            return Err(ScopeError::Transport(
                "scripted enumeration failure".to_string(),
            ));
        }
        Ok(self.resources.clone())
    }

    fn open(&self, address: &str) -> Result<Box<dyn Instrument>, ScopeError> {
        match self.devices.get(address) {
            Some(instrument) => Ok(Box::new(instrument.clone())),
            None => Err(ScopeError::Transport(format!(
                "cannot open resource {address:?}"
            ))),
        }
    }
}
