//! Build-time parameters and deployment settings.
//!
//! Everything that describes the strip itself (length, brightness, power
//! budget) is fixed at build time. Where the controller runs and how it talks
//! to the outside world is read from an optional settings file and the
//! command line.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use config_file::FromConfigFile;
use serde::Deserialize;

use crate::error::Result;

/// Largest strip the pixel buffer is ever allocated for.
pub const MAX_PIXELS: usize = 300;
/// Strip length used when no stored configuration is present.
pub const NUMBER_OF_LIGHTS: u32 = 150;
pub const CANDY_STRIPE_WIDTH: u32 = 5;
pub const TRAIN_CAR_LENGTH: u32 = 5;
pub const SECONDS_BETWEEN_EFFECTS: u32 = 5;

/// Global brightness applied by the output stage, out of 255.
pub const BRIGHTNESS: u8 = 128;
/// Power budget the output stage scales brightness down to.
pub const MAX_POWER_MW: u32 = 2500;

/// Layout version of the durable configuration record.
pub const CONFIG_FORMAT_VERSION: i32 = 2;

pub const LINK_LOCAL_NAME: &str = "Lichterkette_001";
pub const LINK_DEVICE_NAME: &str = "Lichterkette";

/// Which configuration surface the controller exposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelKind {
    /// Read/write attributes over the short-range link.
    Wireless,
    /// Read-only HTTP status page.
    StatusPage,
    /// No remote access; stored configuration only.
    None,
}

/// Byte order the strip expects on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorOrder {
    Rgb,
    Grb,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Settings {
    #[serde(default = "default_channel")]
    pub channel: ChannelKind,

    /// OLA daemon OSC input
    #[serde(default = "default_ola_address")]
    pub ola_address: SocketAddr,

    /// First DMX universe; long strips continue on the following ones
    #[serde(default)]
    pub universe: u16,

    #[serde(default = "default_color_order")]
    pub color_order: ColorOrder,

    #[serde(default = "default_link_listen")]
    pub link_listen: SocketAddr,

    #[serde(default = "default_status_listen")]
    pub status_listen: SocketAddr,

    /// Name shown on the status page
    #[serde(default = "default_hostname")]
    pub hostname: String,

    /// Where the durable configuration record lives
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    #[serde(default = "default_frame_rate")]
    pub frame_rate: f32,

    /// Blank the strip when the scheduler switches effects
    #[serde(default = "default_true")]
    pub clear_on_transition: bool,

    /// Freeze effects while a remote client is linked
    #[serde(default = "default_true")]
    pub pause_while_linked: bool,
}

fn default_channel() -> ChannelKind {
    ChannelKind::Wireless
}

fn default_ola_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 7770))
}

fn default_color_order() -> ColorOrder {
    ColorOrder::Grb
}

fn default_link_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8000))
}

fn default_status_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_hostname() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| LINK_DEVICE_NAME.to_lowercase())
}

fn default_store_path() -> PathBuf {
    PathBuf::from("lichterkette.cfg")
}

fn default_frame_rate() -> f32 {
    50.0
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            channel: default_channel(),
            ola_address: default_ola_address(),
            universe: 0,
            color_order: default_color_order(),
            link_listen: default_link_listen(),
            status_listen: default_status_listen(),
            hostname: default_hostname(),
            store_path: default_store_path(),
            frame_rate: default_frame_rate(),
            clear_on_transition: true,
            pause_while_linked: true,
        }
    }
}

impl Settings {
    /// Reads settings from a TOML file.
    pub fn load(path: &Path) -> Result<Settings> {
        let settings = Settings::from_config_file(path)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }
}
