//! Read-only HTTP status page.
//!
//! Clients are served by a small non-blocking state machine polled from the
//! main loop: accept, read until the request header ends (or the client runs
//! out of time), answer with the page, close. Every request gets the same
//! page regardless of method or path.

use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::config::RunConfiguration;
use crate::error::Result;
use crate::remote::{ConfigurationChannel, Telemetry};

const MAX_CLIENTS: usize = 4;
const MAX_REQUEST_BYTES: usize = 2048;
const CLIENT_DEADLINE: Duration = Duration::from_millis(500);
const WRITE_TIMEOUT: Duration = Duration::from_millis(20);

struct Client {
    stream: TcpStream,
    peer: SocketAddr,
    request: Vec<u8>,
    accepted_at: Duration,
}

enum Progress {
    Waiting,
    Ready,
    Closed,
}

impl Client {
    fn read_available(&mut self) -> Progress {
        let mut buf = [0u8; 512];
        loop {
            match self.stream.read(&mut buf) {
                Ok(0) => return Progress::Closed,
                Ok(size) => {
                    self.request.extend_from_slice(&buf[..size]);
                    if header_complete(&self.request) || self.request.len() >= MAX_REQUEST_BYTES {
                        return Progress::Ready;
                    }
                }
                Err(err) if err.kind() == ErrorKind::WouldBlock => return Progress::Waiting,
                Err(err) => {
                    log::debug!("Status client {} failed: {err}", self.peer);
                    return Progress::Closed;
                }
            }
        }
    }

    fn answer(mut self, page: &[u8]) {
        if let Err(err) = send_page(&mut self.stream, page) {
            log::debug!("Cannot answer status client {}: {err}", self.peer);
        }
    }
}

/// The page is small enough to fit the socket buffer, so this write is short.
fn send_page(stream: &mut TcpStream, page: &[u8]) -> std::io::Result<()> {
    stream.set_nonblocking(false)?;
    stream.set_write_timeout(Some(WRITE_TIMEOUT))?;
    stream.write_all(page)?;
    stream.flush()
}

fn header_complete(request: &[u8]) -> bool {
    request.windows(4).any(|w| w == b"\r\n\r\n") || request.windows(2).any(|w| w == b"\n\n")
}

pub struct StatusPage {
    listener: TcpListener,
    clients: Vec<Client>,
}

impl StatusPage {
    pub fn bind(listen_addr: SocketAddr) -> Result<StatusPage> {
        let listener = TcpListener::bind(listen_addr)?;
        listener.set_nonblocking(true)?;
        log::info!("Status page listening on {}", listener.local_addr()?);

        Ok(StatusPage {
            listener,
            clients: Vec::new(),
        })
    }

    /// Keeps trying to bind until it works or `stop` is raised.
    pub fn bind_with_retry(
        listen_addr: SocketAddr,
        backoff: Duration,
        stop: &AtomicBool,
    ) -> Option<StatusPage> {
        while !stop.load(Ordering::Relaxed) {
            match StatusPage::bind(listen_addr) {
                Ok(page) => return Some(page),
                Err(err) => {
                    log::warn!("Cannot listen on {listen_addr}: {err}, retrying in {backoff:?}");
                    std::thread::sleep(backoff);
                }
            }
        }
        None
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn poll(&mut self, now: Duration, telemetry: &Telemetry) {
        self.accept(now);

        let mut page = None;
        let mut i = 0;
        while i < self.clients.len() {
            let progress = self.clients[i].read_available();
            let expired = now.saturating_sub(self.clients[i].accepted_at) >= CLIENT_DEADLINE;

            match progress {
                Progress::Waiting if !expired => {
                    i += 1;
                    continue;
                }
                Progress::Waiting if self.clients[i].request.is_empty() => {
                    let client = self.clients.swap_remove(i);
                    log::debug!("Status client {} timed out", client.peer);
                    continue;
                }
                Progress::Closed if self.clients[i].request.is_empty() => {
                    self.clients.swap_remove(i);
                    continue;
                }
                // Partial requests still get the page once the client stops sending.
                Progress::Waiting | Progress::Closed | Progress::Ready => {}
            }

            let client = self.clients.swap_remove(i);
            let page = page.get_or_insert_with(|| render(telemetry));
            client.answer(page.as_bytes());
        }
    }

    fn accept(&mut self, now: Duration) {
        loop {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    if self.clients.len() >= MAX_CLIENTS {
                        log::debug!("Too many status clients, dropping {peer}");
                        continue;
                    }
                    if let Err(err) = stream.set_nonblocking(true) {
                        log::warn!("Cannot configure status client {peer}: {err}");
                        continue;
                    }
                    self.clients.push(Client {
                        stream,
                        peer,
                        request: Vec::new(),
                        accepted_at: now,
                    });
                }
                Err(err) if err.kind() == ErrorKind::WouldBlock => return,
                Err(err) => {
                    log::warn!("Status page accept failed: {err}");
                    return;
                }
            }
        }
    }
}

/// Full HTTP response carrying the status page.
pub fn render(telemetry: &Telemetry) -> String {
    let body = format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head><meta http-equiv=\"refresh\" content=\"5\"><title>{host}</title></head>\n\
         <body>\n\
         <h1>{host}</h1>\n\
         <p>Estimated power: {power} mW</p>\n\
         <p>Frames per second: {fps:.1}</p>\n\
         <p>Current effect: {effect}</p>\n\
         </body>\n\
         </html>\n",
        host = escape(&telemetry.hostname),
        power = telemetry.power_mw,
        fps = telemetry.fps,
        effect = telemetry.effect_index,
    );

    format!(
        "HTTP/1.1 200 OK\r\n\
         Content-Type: text/html; charset=utf-8\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n\
         {}",
        body.len(),
        body
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Network variant: status page out, configuration fixed for the session.
pub struct StatusChannel {
    page: StatusPage,
    config: RunConfiguration,
}

impl StatusChannel {
    pub fn new(page: StatusPage, config: RunConfiguration) -> StatusChannel {
        StatusChannel { page, config }
    }
}

impl ConfigurationChannel for StatusChannel {
    fn poll(&mut self, now: Duration, telemetry: &Telemetry) {
        self.page.poll(now, telemetry);
    }

    fn configuration(&self) -> &RunConfiguration {
        &self.config
    }
}
