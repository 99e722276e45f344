use log::{debug, error};

use super::ScopeSession;
use crate::error::ScopeError;
use crate::types::Channel;
use crate::waveform::{Preamble, Waveform};

impl ScopeSession {
    /// Pull one channel's record and rescale it into physical units.
    ///
    /// Negotiates the transfer via the `DATA:*` commands, queries the
    /// four `WFMPRE` scaling constants, then reads the raw curve and
    /// rescales it with [`Waveform::from_raw`].
    ///
    /// Returns an empty waveform when the session is not connected or any
    /// step fails; a partial waveform is never returned. Callers that
    /// must distinguish "no data" from a genuine zero-length record
    /// should check [`is_connected`](ScopeSession::is_connected) first.
    pub fn acquire_waveform(&mut self, channel: Channel) -> Waveform {
        match self.try_acquire(channel) {
            Ok(waveform) => waveform,
            Err(e) => {
                error!("Error acquiring waveform from {channel}: {e}");
                Waveform::default()
            }
        }
    }

    fn try_acquire(&mut self, channel: Channel) -> Result<Waveform, ScopeError> {
        let encoding = self.encoding;
        let start = self.config.transfer_start;
        let stop = self.config.transfer_stop;
        let handle = self.handle_mut()?;

        handle.write(&format!("DATA:SOURCE {channel}"))?;
        handle.write(&format!("DATA:START {start}"))?;
        handle.write(&format!("DATA:STOP {stop}"))?;
        handle.write(&format!("DATA:WIDTH {}", encoding.width()))?;
        handle.write(&format!("DATA:ENC {}", encoding.scpi_arg()))?;

        let preamble = Preamble {
            x_zero: Preamble::parse_field("XZE", &handle.query("WFMPRE:XZE?")?)?,
            x_increment: Preamble::parse_field("XIN", &handle.query("WFMPRE:XIN?")?)?,
            y_zero: Preamble::parse_field("YZE", &handle.query("WFMPRE:YZE?")?)?,
            y_multiplier: Preamble::parse_field("YMU", &handle.query("WFMPRE:YMU?")?)?,
        };

        let raw = handle.query_binary("CURVE?")?;
        let codes = encoding.decode(&raw);
        debug!("Acquired {} samples from {channel}", codes.len());
        Ok(Waveform::from_raw(&preamble, &codes))
    }
}
