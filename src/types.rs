use crate::error::ScopeError;

/// Oscilloscope input channel (1-4).
///
/// Validated at construction so SCPI commands can address the channel
/// without re-checking the range at every call site.
///
/// # Examples
///
/// ```
/// use tekscope::Channel;
///
/// let ch = Channel::new(2)?;
/// assert_eq!(ch.to_string(), "CH2");
/// # Ok::<(), tekscope::ScopeError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Channel(u8);

impl Channel {
    pub const CH1: Channel = Channel(1);
    pub const CH2: Channel = Channel(2);
    pub const CH3: Channel = Channel(3);
    pub const CH4: Channel = Channel(4);

    /// Create a channel, rejecting numbers outside 1-4.
    pub fn new(number: u8) -> Result<Self, ScopeError> {
        match number {
            1..=4 => Ok(Channel(number)),
            _ => Err(ScopeError::InvalidChannel(number)),
        }
    }

    pub fn number(&self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CH{}", self.0)
    }
}

impl TryFrom<u8> for Channel {
    type Error = ScopeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Channel::new(value)
    }
}

/// Vertical coupling mode for a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Coupling {
    Ac,
    #[default]
    Dc,
    Gnd,
}

impl Coupling {
    /// Argument string for the `CH{n}:COUPLING` command.
    pub fn scpi_arg(&self) -> &'static str {
        match self {
            Coupling::Ac => "AC",
            Coupling::Dc => "DC",
            Coupling::Gnd => "GND",
        }
    }
}

/// Channel bandwidth limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Bandwidth {
    #[default]
    Full,
    TwentyMhz,
}

impl Bandwidth {
    /// Argument string for the `CH{n}:BANDWIDTH` command.
    pub fn scpi_arg(&self) -> &'static str {
        match self {
            Bandwidth::Full => "FUL",
            Bandwidth::TwentyMhz => "TWE",
        }
    }
}

/// Edge trigger slope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerSlope {
    #[default]
    Rising,
    Falling,
}

impl TriggerSlope {
    /// Argument string for the `TRIGGER:A:EDGE:SLOPE` command.
    pub fn scpi_arg(&self) -> &'static str {
        match self {
            TriggerSlope::Rising => "RISE",
            TriggerSlope::Falling => "FALL",
        }
    }
}

/// Vertical settings pushed to one channel.
///
/// Write-only: the session transmits these to the instrument and does not
/// retain them. Defaults match the instrument's common bench setup
/// (DC coupling, full bandwidth, zero offset).
///
/// # Examples
///
/// ```
/// use tekscope::{Channel, ChannelConfig, Coupling};
///
/// let config = ChannelConfig::new(Channel::CH1, 0.5)
///     .offset(-0.1)
///     .coupling(Coupling::Ac);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelConfig {
    pub channel: Channel,
    /// Vertical scale in volts per division
    pub scale: f64,
    /// Vertical offset in volts
    pub offset: f64,
    pub coupling: Coupling,
    pub bandwidth: Bandwidth,
}

impl ChannelConfig {
    pub fn new(channel: Channel, scale: f64) -> Self {
        Self {
            channel,
            scale,
            offset: 0.0,
            coupling: Coupling::default(),
            bandwidth: Bandwidth::default(),
        }
    }

    pub fn offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    pub fn coupling(mut self, coupling: Coupling) -> Self {
        self.coupling = coupling;
        self
    }

    pub fn bandwidth(mut self, bandwidth: Bandwidth) -> Self {
        self.bandwidth = bandwidth;
        self
    }
}

/// Edge trigger settings. Write-only, like [`ChannelConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerConfig {
    /// Channel the trigger watches
    pub source: Channel,
    /// Trigger level in volts
    pub level: f64,
    pub slope: TriggerSlope,
}

impl TriggerConfig {
    pub fn new(source: Channel, level: f64) -> Self {
        Self {
            source,
            level,
            slope: TriggerSlope::default(),
        }
    }

    pub fn slope(mut self, slope: TriggerSlope) -> Self {
        self.slope = slope;
        self
    }
}

/// Horizontal timebase settings. Write-only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimebaseConfig {
    /// Time per division in seconds
    pub scale: f64,
    /// Horizontal position in seconds
    pub position: f64,
}

impl TimebaseConfig {
    pub fn new(scale: f64) -> Self {
        Self {
            scale,
            position: 0.0,
        }
    }

    pub fn position(mut self, position: f64) -> Self {
        self.position = position;
        self
    }
}
