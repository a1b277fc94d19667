//! Remote configuration and telemetry surfaces.

pub(crate) mod attributes;
pub(crate) mod osclink;
pub(crate) mod statuspage;
pub(crate) mod wireless;

use std::time::Duration;

use crate::config::RunConfiguration;

/// Live numbers reported to whoever is watching.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Telemetry {
    pub hostname: String,
    pub power_mw: u32,
    pub fps: f32,
    pub effect_index: usize,
}

/// Side channel polled once per main loop tick. Implementations must not
/// block for longer than a frame.
pub trait ConfigurationChannel {
    fn poll(&mut self, now: Duration, telemetry: &Telemetry);

    /// Configuration the scheduler should run with right now.
    fn configuration(&self) -> &RunConfiguration;

    /// True while a remote client holds the link.
    fn link_active(&self) -> bool {
        false
    }
}

/// No remote access at all; runs with whatever was loaded at startup.
pub struct LocalChannel {
    config: RunConfiguration,
}

impl LocalChannel {
    pub fn new(config: RunConfiguration) -> LocalChannel {
        LocalChannel { config }
    }
}

impl ConfigurationChannel for LocalChannel {
    fn poll(&mut self, _: Duration, _: &Telemetry) {}

    fn configuration(&self) -> &RunConfiguration {
        &self.config
    }
}
