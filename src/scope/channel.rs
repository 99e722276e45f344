use log::error;

use super::ScopeSession;
use crate::error::ScopeError;
use crate::types::{Channel, ChannelConfig};

impl ScopeSession {
    /// Push vertical settings to one channel and enable it.
    ///
    /// Issues, in order: scale, offset, coupling, bandwidth, channel
    /// select. Each write is fire-and-forget; the instrument sends no
    /// acknowledgment, so success only means the commands were
    /// transmitted. A failure mid-sequence aborts the remaining writes
    /// and returns `false`. Commands already sent are not rolled back,
    /// so partial configuration is possible.
    pub fn configure_channel(&mut self, config: &ChannelConfig) -> bool {
        match self.try_configure_channel(config) {
            Ok(()) => true,
            Err(e) => {
                error!("Error configuring channel {}: {e}", config.channel.number());
                false
            }
        }
    }

    fn try_configure_channel(&mut self, config: &ChannelConfig) -> Result<(), ScopeError> {
        let ch = config.channel;
        let handle = self.handle_mut()?;
        handle.write(&format!("{ch}:SCALE {}", config.scale))?;
        handle.write(&format!("{ch}:OFFSET {}", config.offset))?;
        handle.write(&format!("{ch}:COUPLING {}", config.coupling.scpi_arg()))?;
        handle.write(&format!("{ch}:BANDWIDTH {}", config.bandwidth.scpi_arg()))?;
        handle.write(&format!("SELECT:{ch} ON"))?;
        Ok(())
    }

    /// Run the instrument's auto-setup and block for the configured
    /// settle delay (default 2 s) so auto-ranging can finish before the
    /// next acquisition. The delay is fixed, not a readiness poll; a
    /// slow instrument needs a longer `autoset_settle_ms`.
    pub fn auto_scale(&mut self, channel: Channel) -> bool {
        match self.try_auto_scale() {
            Ok(()) => true,
            Err(e) => {
                error!("Error during auto-scale of {channel}: {e}");
                false
            }
        }
    }

    fn try_auto_scale(&mut self) -> Result<(), ScopeError> {
        let settle = self.config.settle_delay();
        self.handle_mut()?.write("AUTOSET EXECUTE")?;
        std::thread::sleep(settle);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ScopeConfig;
    use crate::scope::tests::{connected_session, scope_instrument};
    use crate::scope::ScopeSession;
    use crate::types::{Bandwidth, Channel, ChannelConfig, Coupling};
    use crate::visa::{MockInstrument, MockResourceManager};

    fn disconnected_session() -> (ScopeSession, MockInstrument) {
        let instrument = scope_instrument();
        let rm = MockResourceManager::new().with_device("GPIB0::1::INSTR", instrument.clone());
        (
            ScopeSession::new(Box::new(rm), ScopeConfig::default()),
            instrument,
        )
    }

    #[test]
    fn test_configure_channel_command_sequence() {
        let (mut session, instrument) = connected_session(scope_instrument());
        let baseline = instrument.commands().len();

        let config = ChannelConfig::new(Channel::CH2, 0.5)
            .offset(-0.25)
            .coupling(Coupling::Ac)
            .bandwidth(Bandwidth::TwentyMhz);
        assert!(session.configure_channel(&config));

        assert_eq!(
            instrument.commands()[baseline..],
            [
                "CH2:SCALE 0.5",
                "CH2:OFFSET -0.25",
                "CH2:COUPLING AC",
                "CH2:BANDWIDTH TWE",
                "SELECT:CH2 ON",
            ]
        );
    }

    #[test]
    fn test_configure_channel_requires_connection() {
        let (mut session, instrument) = disconnected_session();
        let config = ChannelConfig::new(Channel::CH1, 1.0);
        assert!(!session.configure_channel(&config));
        assert!(instrument.commands().is_empty());
    }

    #[test]
    fn test_configure_channel_aborts_after_mid_sequence_failure() {
        let instrument = scope_instrument().fail_on("CH1:COUPLING DC");
        let (mut session, instrument) = connected_session(instrument);
        let baseline = instrument.commands().len();

        let config = ChannelConfig::new(Channel::CH1, 0.1).offset(0.05);
        assert!(!session.configure_channel(&config));

        // the first two writes went out, nothing after the failure
        assert_eq!(
            instrument.commands()[baseline..],
            ["CH1:SCALE 0.1", "CH1:OFFSET 0.05"]
        );
    }

    #[test]
    fn test_auto_scale_sends_autoset() {
        let mut config = ScopeConfig::default();
        config.autoset_settle_ms = 0; // keep the test fast
        let instrument = scope_instrument();
        let rm = MockResourceManager::new().with_device("GPIB0::1::INSTR", instrument.clone());
        let mut session = ScopeSession::new(Box::new(rm), config);
        assert!(session.connect(Some("GPIB0::1::INSTR")));

        assert!(session.auto_scale(Channel::CH1));
        assert_eq!(instrument.commands().last().map(String::as_str), Some("AUTOSET EXECUTE"));
    }

    #[test]
    fn test_auto_scale_requires_connection() {
        let (mut session, instrument) = disconnected_session();
        assert!(!session.auto_scale(Channel::CH1));
        assert!(instrument.commands().is_empty());
    }
}
