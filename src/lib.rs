pub mod config;
pub mod error;
pub mod plotting;
pub mod scope;
pub mod types;
pub mod visa;
pub mod waveform;

pub use config::{load_config, load_config_or_default, ScopeConfig};
pub use error::ScopeError;
pub use plotting::plot_waveform;
pub use scope::{write_waveform_file, ScopeSession};
pub use types::{
    Bandwidth, Channel, ChannelConfig, Coupling, TimebaseConfig, TriggerConfig, TriggerSlope,
};
pub use visa::{Instrument, MockInstrument, MockResourceManager, ResourceManager};
pub use waveform::{Preamble, SampleEncoding, Waveform};
