use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Local;
use log::{error, info};

use super::ScopeSession;
use crate::error::ScopeError;
use crate::types::Channel;
use crate::waveform::Waveform;

impl ScopeSession {
    /// Acquire one channel and write the capture to a text file.
    ///
    /// The file is a two-column comma-delimited table, time in seconds and
    /// voltage in millivolts, under a commented header carrying the
    /// acquisition timestamp and channel number. An empty capture writes
    /// no file; the acquisition step has already reported the cause.
    pub fn save_waveform(&mut self, channel: Channel, path: &Path) -> bool {
        let waveform = self.acquire_waveform(channel);
        if waveform.is_empty() {
            return false;
        }

        match write_waveform_file(path, channel, &waveform) {
            Ok(()) => {
                info!("Saved waveform to {}", path.display());
                true
            }
            Err(e) => {
                error!("Error saving waveform: {e}");
                false
            }
        }
    }
}

/// Write a capture as the two-column text table described in
/// [`save_waveform`](ScopeSession::save_waveform), for callers that
/// already hold a waveform.
pub fn write_waveform_file(
    path: &Path,
    channel: Channel,
    waveform: &Waveform,
) -> Result<(), ScopeError> {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let mut out = BufWriter::new(File::create(path)?);

    writeln!(out, "# Time (s),Voltage (mV)")?;
    writeln!(out, "# Acquired: {timestamp}")?;
    writeln!(out, "# Channel: {}", channel.number())?;
    for (time, voltage) in waveform.times.iter().zip(&waveform.voltages) {
        writeln!(out, "{time},{}", voltage * 1000.0)?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::config::ScopeConfig;
    use crate::scope::acquire::tests::acquisition_instrument;
    use crate::scope::tests::connected_session;
    use crate::scope::ScopeSession;
    use crate::types::Channel;
    use crate::visa::MockResourceManager;

    #[test]
    fn test_save_waveform_writes_header_and_millivolt_rows() {
        let (mut session, _instrument) =
            connected_session(acquisition_instrument(vec![0x00, 0x64, 0x80]));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.csv");

        assert!(session.save_waveform(Channel::CH2, &path));

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "# Time (s),Voltage (mV)");
        assert!(lines[1].starts_with("# Acquired: "));
        assert_eq!(lines[2], "# Channel: 2");
        // 10 mV/code scale: codes 0, 100, -128 become 0, 1000, -1280 mV
        assert_eq!(lines[3], "0,0");
        assert_eq!(lines[4], "0.000001,1000");
        assert_eq!(lines[5], "0.000002,-1280");
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn test_save_waveform_empty_capture_writes_no_file() {
        // disconnected session: acquisition yields the empty sentinel
        let rm = MockResourceManager::new();
        let mut session = ScopeSession::new(Box::new(rm), ScopeConfig::default());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.csv");

        assert!(!session.save_waveform(Channel::CH1, &path));
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
