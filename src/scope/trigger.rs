use log::error;

use super::ScopeSession;
use crate::error::ScopeError;
use crate::types::{TimebaseConfig, TriggerConfig};

impl ScopeSession {
    /// Push edge trigger settings: level, source channel, slope.
    ///
    /// Same fire-and-forget contract as
    /// [`configure_channel`](ScopeSession::configure_channel): a failure
    /// aborts the remaining writes without rolling back earlier ones.
    pub fn set_trigger(&mut self, config: &TriggerConfig) -> bool {
        match self.try_set_trigger(config) {
            Ok(()) => true,
            Err(e) => {
                error!("Error setting trigger: {e}");
                false
            }
        }
    }

    fn try_set_trigger(&mut self, config: &TriggerConfig) -> Result<(), ScopeError> {
        let handle = self.handle_mut()?;
        handle.write(&format!("TRIGGER:A:LEVEL {}", config.level))?;
        handle.write(&format!("TRIGGER:A:EDGE:SOURCE {}", config.source))?;
        handle.write(&format!("TRIGGER:A:EDGE:SLOPE {}", config.slope.scpi_arg()))?;
        Ok(())
    }

    /// Push horizontal scale and position.
    pub fn set_timebase(&mut self, config: &TimebaseConfig) -> bool {
        match self.try_set_timebase(config) {
            Ok(()) => true,
            Err(e) => {
                error!("Error setting timebase: {e}");
                false
            }
        }
    }

    fn try_set_timebase(&mut self, config: &TimebaseConfig) -> Result<(), ScopeError> {
        let handle = self.handle_mut()?;
        handle.write(&format!("HORIZONTAL:SCALE {}", config.scale))?;
        handle.write(&format!("HORIZONTAL:POSITION {}", config.position))?;
        Ok(())
    }
}
