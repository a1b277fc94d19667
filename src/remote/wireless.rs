//! Attribute-based configuration over a short-range link.

use std::time::Duration;

use crate::config::RunConfiguration;
use crate::error::Result;
use crate::persistence::{PersistedRecord, SettingsStore};
use crate::remote::attributes::{Attribute, AttributeTable, AttributeValue};
use crate::remote::{ConfigurationChannel, Telemetry};

/// Upper bound on link events handled per tick.
const MAX_EVENTS_PER_POLL: usize = 32;

#[derive(Clone, Debug, PartialEq)]
pub enum LinkEvent {
    Connected { peer: String },
    Read(Attribute),
    Write(Attribute, AttributeValue),
    Disconnected,
}

/// The radio stack as seen from the controller.
pub trait RadioLink {
    fn advertise(&mut self, local_name: &str, device_name: &str) -> Result<()>;

    /// Next pending event, without blocking.
    fn poll(&mut self, now: Duration) -> Option<LinkEvent>;

    /// Sends the current value of an attribute to the connected client.
    fn respond(&mut self, attribute: Attribute, value: AttributeValue) -> Result<()>;
}

pub struct WirelessChannel<L: RadioLink, S: SettingsStore> {
    link: L,
    store: S,
    attributes: AttributeTable,
    durable: RunConfiguration,
    connected: bool,
}

impl<L: RadioLink, S: SettingsStore> WirelessChannel<L, S> {
    /// `durable` is what the store held at startup (or the defaults).
    pub fn new(link: L, store: S, durable: RunConfiguration) -> WirelessChannel<L, S> {
        WirelessChannel {
            link,
            store,
            attributes: AttributeTable::new(durable),
            durable,
            connected: false,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn handle(&mut self, event: LinkEvent) {
        match event {
            LinkEvent::Connected { peer } => {
                log::info!("Link connected: {peer}");
                self.connected = true;
            }
            LinkEvent::Read(attribute) => self.respond(attribute),
            LinkEvent::Write(attribute, value) => {
                match self.attributes.write(attribute, value) {
                    Ok(()) => log::info!("{attribute} set to {value:?}"),
                    Err(err) => log::warn!("{err}"),
                }
                self.respond(attribute);
            }
            LinkEvent::Disconnected => {
                log::info!("Link disconnected");
                self.connected = false;
                self.reconcile();
            }
        }
    }

    fn respond(&mut self, attribute: Attribute) {
        let value = self.attributes.read(attribute);
        if let Err(err) = self.link.respond(attribute, value) {
            log::warn!("Cannot answer read of {attribute}: {err}");
        }
    }

    /// Flushes the live attributes to the store if they differ from the last
    /// durable snapshot.
    fn reconcile(&mut self) {
        let live = *self.attributes.snapshot();
        if live == self.durable {
            return;
        }

        log::info!("Writing configuration {live:?}");
        match self.store.write(&PersistedRecord::from(&live)) {
            Ok(()) => self.durable = live,
            Err(err) => log::error!("Cannot persist configuration: {err}"),
        }
    }
}

impl<L: RadioLink, S: SettingsStore> ConfigurationChannel for WirelessChannel<L, S> {
    fn poll(&mut self, now: Duration, _: &Telemetry) {
        for _ in 0..MAX_EVENTS_PER_POLL {
            match self.link.poll(now) {
                Some(event) => self.handle(event),
                None => break,
            }
        }
    }

    fn configuration(&self) -> &RunConfiguration {
        self.attributes.snapshot()
    }

    fn link_active(&self) -> bool {
        self.connected
    }
}
