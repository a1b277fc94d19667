//! Attribute link carried over OSC on UDP.
//!
//! Addresses live under `/lichterkette/`. A message to an attribute address
//! with one argument writes it, without arguments reads it; the answer goes
//! back to the sender on the same address. `connect` and `disconnect` manage
//! the session; `identify` is answered for any sender without opening one.
//! Only one peer holds the link at a time.

use std::collections::VecDeque;
use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use rosc::{decoder, encoder, OscMessage, OscPacket, OscType};

use crate::error::{Error, Result};
use crate::remote::attributes::{Attribute, AttributeValue, SERVICE_UUID};
use crate::remote::wireless::{LinkEvent, RadioLink};

const PREFIX: &str = "/lichterkette/";

pub struct OscLink {
    sock: UdpSocket,
    peer: Option<SocketAddr>,
    last_seen: Duration,
    idle_timeout: Duration,
    names: (String, String),
    pending: VecDeque<LinkEvent>,
}

impl OscLink {
    pub fn bind(listen_addr: SocketAddr, idle_timeout: Duration) -> Result<OscLink> {
        let sock = UdpSocket::bind(listen_addr)?;
        sock.set_nonblocking(true)?;

        Ok(OscLink {
            sock,
            peer: None,
            last_seen: Duration::ZERO,
            idle_timeout,
            names: (String::new(), String::new()),
            pending: VecDeque::new(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.sock.local_addr()?)
    }

    fn send(&self, to: SocketAddr, addr: String, args: Vec<OscType>) -> Result<()> {
        let msg_buf = encoder::encode(&OscPacket::Message(OscMessage { addr, args }))
            .map_err(|err| Error::Osc(format!("{:?}", err)))?;
        self.sock.send_to(&msg_buf, to)?;
        Ok(())
    }

    fn handle_packet(&mut self, from: SocketAddr, packet: OscPacket, now: Duration) {
        match packet {
            OscPacket::Message(msg) => self.handle_message(from, &msg, now),
            OscPacket::Bundle(bundle) => {
                for packet in bundle.content {
                    self.handle_packet(from, packet, now);
                }
            }
        }
    }

    fn handle_message(&mut self, from: SocketAddr, msg: &OscMessage, now: Duration) {
        let Some(command) = msg.addr.strip_prefix(PREFIX) else {
            log::debug!("Ignoring OSC address {} from {from}", msg.addr);
            return;
        };

        if command == "identify" {
            if self.peer == Some(from) {
                self.last_seen = now;
            }
            self.identify(from);
            return;
        }

        match self.peer {
            Some(peer) if peer != from => {
                log::warn!("Ignoring {from}, link is held by {peer}");
                return;
            }
            Some(_) => {}
            None if command == "disconnect" => return,
            None => {
                self.peer = Some(from);
                self.pending.push_back(LinkEvent::Connected {
                    peer: from.to_string(),
                });
            }
        }
        self.last_seen = now;

        match command {
            "connect" => {}
            "disconnect" => {
                self.peer = None;
                self.pending.push_back(LinkEvent::Disconnected);
            }
            name => match Attribute::parse_from_str(name) {
                Some(attribute) => match msg.args.first() {
                    None => self.pending.push_back(LinkEvent::Read(attribute)),
                    Some(arg) => match attribute_value(attribute, arg) {
                        Some(value) => self.pending.push_back(LinkEvent::Write(attribute, value)),
                        None => log::warn!("{} Unexpected OSC parameter: {:?}", msg.addr, arg),
                    },
                },
                None => log::warn!("Unknown attribute {}", msg.addr),
            },
        }
    }

    fn identify(&self, to: SocketAddr) {
        let args = vec![
            OscType::String(self.names.0.clone()),
            OscType::String(self.names.1.clone()),
            OscType::String(SERVICE_UUID.to_string()),
        ];
        if let Err(err) = self.send(to, format!("{PREFIX}identify"), args) {
            log::warn!("Cannot answer identify: {err}");
        }
    }

    fn check_idle(&mut self, now: Duration) -> Option<LinkEvent> {
        let peer = self.peer?;
        if now.saturating_sub(self.last_seen) < self.idle_timeout {
            return None;
        }

        log::info!("{peer} went quiet, dropping link");
        self.peer = None;
        Some(LinkEvent::Disconnected)
    }
}

fn attribute_value(attribute: Attribute, arg: &OscType) -> Option<AttributeValue> {
    let number = match arg {
        OscType::Bool(b) => return Some(AttributeValue::Bool(*b)),
        OscType::Int(i) => *i as i64,
        OscType::Long(l) => *l,
        OscType::Float(f) if f.fract() == 0.0 => *f as i64,
        _ => return None,
    };

    if attribute == Attribute::Run {
        return Some(AttributeValue::Bool(number != 0));
    }
    u32::try_from(number).ok().map(AttributeValue::Unsigned)
}

fn osc_value(value: AttributeValue) -> OscType {
    match value {
        AttributeValue::Bool(b) => OscType::Bool(b),
        AttributeValue::Unsigned(n) => OscType::Int(i32::try_from(n).unwrap_or(i32::MAX)),
    }
}

impl RadioLink for OscLink {
    fn advertise(&mut self, local_name: &str, device_name: &str) -> Result<()> {
        self.names = (local_name.to_string(), device_name.to_string());
        log::info!(
            "Advertising {local_name} ({device_name}) on {}, service {SERVICE_UUID}",
            self.sock.local_addr()?
        );
        for attribute in Attribute::ALL {
            log::debug!("  {} {}", attribute.uuid(), attribute);
        }
        Ok(())
    }

    fn poll(&mut self, now: Duration) -> Option<LinkEvent> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }

        let mut buf = [0u8; decoder::MTU];
        loop {
            match self.sock.recv_from(&mut buf) {
                Ok((size, from)) => {
                    match decoder::decode(&buf[..size]) {
                        Ok(packet) => self.handle_packet(from, packet, now),
                        Err(err) => log::warn!("Malformed OSC packet from {from}: {:?}", err),
                    }
                    if let Some(event) = self.pending.pop_front() {
                        return Some(event);
                    }
                }
                Err(err) if err.kind() == ErrorKind::WouldBlock => break,
                Err(err) => {
                    log::warn!("Error receiving from socket: {err}");
                    break;
                }
            }
        }

        self.check_idle(now)
    }

    fn respond(&mut self, attribute: Attribute, value: AttributeValue) -> Result<()> {
        match self.peer {
            Some(peer) => self.send(
                peer,
                format!("{PREFIX}{attribute}"),
                vec![osc_value(value)],
            ),
            None => Ok(()),
        }
    }
}
