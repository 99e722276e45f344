//! `visa-rs` backend for real hardware, available behind the `visa` cargo
//! feature. Requires a VISA implementation (NI-VISA or compatible)
//! installed on the host.

use std::ffi::CString;
use std::io::{BufRead, BufReader, Write};
use std::time::Duration;

use visa_rs::prelude::*;

use super::{read_block, Instrument, ResourceManager};
use crate::error::ScopeError;

fn visa_err(err: visa_rs::Error) -> ScopeError {
    ScopeError::Transport(err.to_string())
}

/// Resource manager backed by the system VISA library.
pub struct NativeResourceManager {
    rm: DefaultRM,
}

impl NativeResourceManager {
    pub fn new() -> Result<Self, ScopeError> {
        let rm = DefaultRM::new().map_err(visa_err)?;
        Ok(Self { rm })
    }
}

impl ResourceManager for NativeResourceManager {
    fn list_resources(&self) -> Result<Vec<String>, ScopeError> {
        let pattern = CString::new("?*::INSTR")
            .map_err(|_| ScopeError::Transport("invalid search pattern".to_string()))?;
        let list = self.rm.find_res_list(&pattern.into()).map_err(visa_err)?;
        let mut addresses = Vec::new();
        for res in list {
            let res = res.map_err(visa_err)?;
            addresses.push(res.to_string_lossy().into_owned());
        }
        Ok(addresses)
    }

    fn open(&self, address: &str) -> Result<Box<dyn Instrument>, ScopeError> {
        let rsc = CString::new(address)
            .map_err(|_| ScopeError::Transport(format!("invalid address {address:?}")))?;
        let session = self
            .rm
            .open(&rsc.into(), AccessMode::NO_LOCK, TIMEOUT_IMMEDIATE)
            .map_err(visa_err)?;
        Ok(Box::new(NativeInstrument {
            session: Some(session),
        }))
    }
}

/// One open VISA session. Commands are newline-terminated on the wire.
pub struct NativeInstrument {
    session: Option<visa_rs::Instrument>,
}

impl NativeInstrument {
    fn session(&mut self) -> Result<&mut visa_rs::Instrument, ScopeError> {
        self.session.as_mut().ok_or(ScopeError::NotConnected)
    }
}

impl Instrument for NativeInstrument {
    fn set_timeout(&mut self, timeout: Duration) -> Result<(), ScopeError> {
        let millis = timeout.as_millis() as u32;
        self.session()?
            .set_attr(AttrTmoValue::new(millis).into())
            .map_err(visa_err)
    }

    fn write(&mut self, command: &str) -> Result<(), ScopeError> {
        let session = self.session()?;
        session.write_all(format!("{command}\n").as_bytes())?;
        Ok(())
    }

    fn query(&mut self, command: &str) -> Result<String, ScopeError> {
        let session = self.session()?;
        session.write_all(format!("{command}\n").as_bytes())?;
        let mut response = String::new();
        let mut reader = BufReader::new(&*session);
        reader.read_line(&mut response)?;
        Ok(response.trim().to_string())
    }

    fn query_binary(&mut self, command: &str) -> Result<Vec<u8>, ScopeError> {
        let session = self.session()?;
        session.write_all(format!("{command}\n").as_bytes())?;
        let mut reader = BufReader::new(&*session);
        read_block(&mut reader)
    }

    fn close(&mut self) -> Result<(), ScopeError> {
        // visa-rs closes the session on drop
        self.session = None;
        Ok(())
    }
}
