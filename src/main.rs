pub(crate) mod clock;
pub(crate) mod config;
pub(crate) mod effects;
pub(crate) mod error;
pub(crate) mod illuminator;
pub(crate) mod intervaltimer;
pub(crate) mod olaoutput;
pub(crate) mod output;
pub(crate) mod persistence;
pub(crate) mod pixels;
pub(crate) mod power;
pub(crate) mod remote;
pub(crate) mod scheduler;
pub(crate) mod settings;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use crate::clock::SystemClock;
use crate::config::RunConfiguration;
use crate::effects::standard_rotation;
use crate::illuminator::Illuminator;
use crate::olaoutput::OlaOutput;
use crate::output::OutputStage;
use crate::persistence::{load_run_configuration, FileStore};
use crate::pixels::PixelBuffer;
use crate::remote::osclink::OscLink;
use crate::remote::statuspage::{StatusChannel, StatusPage};
use crate::remote::wireless::{RadioLink, WirelessChannel};
use crate::remote::{ConfigurationChannel, LocalChannel};
use crate::scheduler::EffectScheduler;
use crate::settings::{
    ChannelKind, Settings, BRIGHTNESS, LINK_DEVICE_NAME, LINK_LOCAL_NAME, MAX_PIXELS,
    MAX_POWER_MW,
};

const LINK_IDLE_TIMEOUT: Duration = Duration::from_secs(30);
const NETWORK_RETRY_BACKOFF: Duration = Duration::from_secs(5);

#[derive(Parser)]
struct Cli {
    /// Settings file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Remote configuration surface to expose
    #[arg(long, value_enum)]
    channel: Option<ChannelKind>,

    /// Where the durable run configuration is kept
    #[arg(short, long, value_name = "FILE")]
    store: Option<PathBuf>,

    /// OSC address of the OLA daemon
    #[arg(long, value_name = "ADDR")]
    ola: Option<SocketAddr>,
}

fn load_settings(args: &Cli) -> Settings {
    let mut settings = match args.config.as_deref() {
        Some(path) => match Settings::load(path) {
            Ok(settings) => settings,
            Err(err) => {
                log::error!("{err}");
                std::process::exit(1);
            }
        },
        None => Settings::default(),
    };

    if let Some(channel) = args.channel {
        settings.channel = channel;
    }
    if let Some(store) = args.store.as_ref() {
        settings.store_path = store.clone();
    }
    if let Some(ola) = args.ola {
        settings.ola_address = ola;
    }
    settings
}

fn create_channel(
    settings: &Settings,
    store: FileStore,
    config: RunConfiguration,
    stop: &AtomicBool,
) -> Option<Box<dyn ConfigurationChannel>> {
    match settings.channel {
        ChannelKind::Wireless => {
            let link = OscLink::bind(settings.link_listen, LINK_IDLE_TIMEOUT).and_then(|mut link| {
                link.advertise(LINK_LOCAL_NAME, LINK_DEVICE_NAME)?;
                Ok(link)
            });
            match link {
                Ok(link) => Some(Box::new(WirelessChannel::new(link, store, config))),
                Err(err) => {
                    log::warn!("Cannot start attribute link, running without remote configuration: {err}");
                    Some(Box::new(LocalChannel::new(config)))
                }
            }
        }
        ChannelKind::StatusPage => {
            let page = StatusPage::bind_with_retry(settings.status_listen, NETWORK_RETRY_BACKOFF, stop)?;
            Some(Box::new(StatusChannel::new(page, config)))
        }
        ChannelKind::None => Some(Box::new(LocalChannel::new(config))),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Cli::parse();
    let settings = load_settings(&args);

    let stop = Arc::new(AtomicBool::new(false));
    let handler_stop = Arc::clone(&stop);
    if let Err(err) = ctrlc::set_handler(move || handler_stop.store(true, Ordering::Relaxed)) {
        log::warn!("Cannot install Ctrl-C handler: {err}");
    }

    let mut store = FileStore::new(settings.store_path.clone());
    let config = load_run_configuration(&mut store);

    let ola = match OlaOutput::new(settings.ola_address, settings.universe, settings.color_order) {
        Ok(ola) => ola,
        Err(err) => {
            log::error!("Cannot set up OLA output: {err}");
            std::process::exit(1);
        }
    };
    log::info!(
        "Driving {} pixels via OLA at {}, universe {}",
        config.pixel_count.min(MAX_PIXELS as u32),
        settings.ola_address,
        settings.universe
    );

    let Some(channel) = create_channel(&settings, store, config, &stop) else {
        return;
    };

    let scheduler = EffectScheduler::new(
        SystemClock::new(),
        standard_rotation(settings.channel == ChannelKind::Wireless),
        settings.clear_on_transition,
    );
    let mut illuminator = Illuminator::new(
        PixelBuffer::new(config.pixel_count as usize, MAX_PIXELS),
        scheduler,
        OutputStage::new(ola, BRIGHTNESS, MAX_POWER_MW),
        channel,
        settings.hostname.clone(),
        settings.pause_while_linked,
    );

    illuminator.run(settings.frame_rate, &stop);
}
