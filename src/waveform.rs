//! Waveform rescaling.
//!
//! The scope reports a curve as raw 8-bit sample codes plus four scaling
//! constants (the waveform preamble). This module turns the two into
//! calibrated time/voltage arrays:
//!
//! ```text
//! time[i]    = i * x_increment + x_zero
//! voltage[i] = raw[i] * y_multiplier + y_zero
//! ```

use crate::error::ScopeError;

/// Sample encoding negotiated with the instrument.
///
/// One value covers both sides of the transfer: it supplies the argument
/// for the `DATA:ENC` command and the matching decode of the `CURVE?`
/// response bytes. Keeping the two together means a format mismatch
/// cannot be introduced by editing only one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleEncoding {
    /// Signed binary, one byte per sample
    #[default]
    SignedBinary,
}

impl SampleEncoding {
    /// Argument string for the `DATA:ENC` command.
    pub fn scpi_arg(&self) -> &'static str {
        match self {
            SampleEncoding::SignedBinary => "RPB",
        }
    }

    /// Bytes per sample for the `DATA:WIDTH` command.
    pub fn width(&self) -> u8 {
        match self {
            SampleEncoding::SignedBinary => 1,
        }
    }

    /// Decode raw curve bytes into sample codes.
    pub fn decode(&self, raw: &[u8]) -> Vec<i8> {
        match self {
            SampleEncoding::SignedBinary => raw.iter().map(|&b| b as i8).collect(),
        }
    }
}

/// The four calibration scalars reported by `WFMPRE:*?` queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preamble {
    /// Time of the first sample in seconds (`WFMPRE:XZE?`)
    pub x_zero: f64,
    /// Seconds per sample (`WFMPRE:XIN?`)
    pub x_increment: f64,
    /// Voltage offset in volts (`WFMPRE:YZE?`)
    pub y_zero: f64,
    /// Volts per sample code (`WFMPRE:YMU?`)
    pub y_multiplier: f64,
}

impl Preamble {
    /// Parse one scalar from the instrument's text response.
    pub fn parse_field(name: &str, response: &str) -> Result<f64, ScopeError> {
        response.trim().parse::<f64>().map_err(|_| {
            ScopeError::Parse(format!("{name}: invalid float response {response:?}"))
        })
    }
}

/// A calibrated capture: index-aligned time and voltage arrays.
///
/// An empty waveform is the "no data" sentinel returned when acquisition
/// fails or the session is not connected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Waveform {
    /// Sample times in seconds
    pub times: Vec<f64>,
    /// Sample voltages in volts
    pub voltages: Vec<f64>,
}

impl Waveform {
    /// Rescale raw sample codes into physical units using the preamble.
    pub fn from_raw(preamble: &Preamble, raw: &[i8]) -> Self {
        let times = (0..raw.len())
            .map(|i| i as f64 * preamble.x_increment + preamble.x_zero)
            .collect();
        let voltages = raw
            .iter()
            .map(|&code| code as f64 * preamble.y_multiplier + preamble.y_zero)
            .collect();
        Self { times, voltages }
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calibration_law() {
        let preamble = Preamble {
            x_zero: -2.5e-3,
            x_increment: 4e-7,
            y_zero: 0.15,
            y_multiplier: 0.02,
        };
        let raw: Vec<i8> = vec![-128, -1, 0, 1, 127, 42];

        let waveform = Waveform::from_raw(&preamble, &raw);

        assert_eq!(waveform.len(), raw.len());
        assert_eq!(waveform.times.len(), waveform.voltages.len());
        for (i, &code) in raw.iter().enumerate() {
            assert_eq!(waveform.times[i], i as f64 * 4e-7 + -2.5e-3);
            assert_eq!(waveform.voltages[i], code as f64 * 0.02 + 0.15);
        }
    }

    #[test]
    fn test_known_capture() {
        // raw [0, 100, -128] with dx=1us, dy=10mV/code
        let preamble = Preamble {
            x_zero: 0.0,
            x_increment: 1e-6,
            y_zero: 0.0,
            y_multiplier: 0.01,
        };
        let waveform = Waveform::from_raw(&preamble, &[0, 100, -128]);

        assert_eq!(waveform.times, vec![0.0, 1e-6, 2e-6]);
        assert_eq!(waveform.voltages, vec![0.0, 1.0, -1.28]);
    }

    #[test]
    fn test_empty_raw_gives_empty_waveform() {
        let preamble = Preamble {
            x_zero: 1.0,
            x_increment: 1.0,
            y_zero: 1.0,
            y_multiplier: 1.0,
        };
        let waveform = Waveform::from_raw(&preamble, &[]);
        assert!(waveform.is_empty());
        assert_eq!(waveform, Waveform::default());
    }

    #[test]
    fn test_signed_binary_decode() {
        let encoding = SampleEncoding::SignedBinary;
        assert_eq!(encoding.decode(&[0x00, 0x64, 0x80, 0xFF]), vec![0, 100, -128, -1]);
        assert_eq!(encoding.scpi_arg(), "RPB");
        assert_eq!(encoding.width(), 1);
    }

    #[test]
    fn test_preamble_field_parse() {
        assert_eq!(Preamble::parse_field("XZE", " -4.0E-6\n").unwrap(), -4.0e-6);
        assert!(Preamble::parse_field("YMU", "garbage").is_err());
    }
}
