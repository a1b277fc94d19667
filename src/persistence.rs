//! Durable copy of the run configuration.
//!
//! The record is a fixed 24-byte little-endian block laid out like the C
//! struct older firmware wrote, padding included:
//!
//! ```text
//! 0  version                  i32
//! 4  run                      u8, 3 bytes padding
//! 8  pixel_count              i32
//! 12 stripe_width             i32
//! 16 train_length             i32
//! 20 seconds_between_effects  i32
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use bytemuck::{Pod, Zeroable};

use crate::config::RunConfiguration;
use crate::error::{Error, Result};
use crate::remote::attributes;
use crate::settings::CONFIG_FORMAT_VERSION;

pub const RECORD_LEN: usize = 24;

#[derive(Clone, Copy, Debug, Zeroable, Pod)]
#[repr(C)]
struct StoredRecord {
    version: i32,
    run: u8,
    _padding: [u8; 3],
    pixel_count: i32,
    stripe_width: i32,
    train_length: i32,
    seconds_between_effects: i32,
}

const _: () = assert!(std::mem::size_of::<StoredRecord>() == RECORD_LEN);

impl From<&PersistedRecord> for StoredRecord {
    fn from(record: &PersistedRecord) -> Self {
        Self {
            version: record.version.to_le(),
            run: if record.run { 1 } else { 0 },
            _padding: [0; 3],
            pixel_count: record.pixel_count.to_le(),
            stripe_width: record.stripe_width.to_le(),
            train_length: record.train_length.to_le(),
            seconds_between_effects: record.seconds_between_effects.to_le(),
        }
    }
}

impl From<StoredRecord> for PersistedRecord {
    fn from(stored: StoredRecord) -> Self {
        Self {
            version: i32::from_le(stored.version),
            run: stored.run != 0,
            pixel_count: i32::from_le(stored.pixel_count),
            stripe_width: i32::from_le(stored.stripe_width),
            train_length: i32::from_le(stored.train_length),
            seconds_between_effects: i32::from_le(stored.seconds_between_effects),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PersistedRecord {
    pub version: i32,
    pub run: bool,
    pub pixel_count: i32,
    pub stripe_width: i32,
    pub train_length: i32,
    pub seconds_between_effects: i32,
}

impl PersistedRecord {
    pub fn to_bytes(&self) -> Vec<u8> {
        bytemuck::bytes_of(&StoredRecord::from(self)).to_vec()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<PersistedRecord> {
        bytemuck::try_pod_read_unaligned::<StoredRecord>(bytes)
            .map(PersistedRecord::from)
            .map_err(|_| Error::CorruptRecord {
                expected: RECORD_LEN,
                actual: bytes.len(),
            })
    }

    /// The configuration held by this record, if every field is usable.
    pub fn configuration(&self) -> Option<RunConfiguration> {
        Some(RunConfiguration {
            run: self.run,
            pixel_count: u32::try_from(self.pixel_count).ok()?,
            stripe_width: u32::try_from(self.stripe_width).ok()?,
            train_length: u32::try_from(self.train_length).ok()?,
            seconds_between_effects: u32::try_from(self.seconds_between_effects).ok()?,
        })
    }
}

impl From<&RunConfiguration> for PersistedRecord {
    fn from(config: &RunConfiguration) -> Self {
        let clamp = |v: u32| i32::try_from(v).unwrap_or(i32::MAX);
        PersistedRecord {
            version: CONFIG_FORMAT_VERSION,
            run: config.run,
            pixel_count: clamp(config.pixel_count),
            stripe_width: clamp(config.stripe_width),
            train_length: clamp(config.train_length),
            seconds_between_effects: clamp(config.seconds_between_effects),
        }
    }
}

/// Non-volatile key-value home of the single configuration record.
pub trait SettingsStore {
    /// Returns `None` when nothing has been stored yet.
    fn read(&mut self) -> Result<Option<PersistedRecord>>;
    fn write(&mut self, record: &PersistedRecord) -> Result<()>;
}

pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> FileStore {
        FileStore { path }
    }
}

impl SettingsStore for FileStore {
    fn read(&mut self) -> Result<Option<PersistedRecord>> {
        match fs::read(&self.path) {
            Ok(bytes) => PersistedRecord::from_bytes(&bytes).map(Some),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Error::Store(err)),
        }
    }

    fn write(&mut self, record: &PersistedRecord) -> Result<()> {
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, record.to_bytes()).map_err(Error::Store)?;
        fs::rename(&tmp, &self.path).map_err(Error::Store)
    }
}

/// Store kept in memory, counting writes.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
    pub record: Option<PersistedRecord>,
    pub writes: usize,
}

#[cfg(test)]
impl SettingsStore for MemoryStore {
    fn read(&mut self) -> Result<Option<PersistedRecord>> {
        Ok(self.record)
    }

    fn write(&mut self, record: &PersistedRecord) -> Result<()> {
        self.record = Some(*record);
        self.writes += 1;
        Ok(())
    }
}

/// Reads the stored configuration, falling back to the compiled-in defaults
/// when it is missing, unreadable or from another format version.
pub fn load_run_configuration(store: &mut dyn SettingsStore) -> RunConfiguration {
    let record = match store.read() {
        Ok(Some(record)) => record,
        Ok(None) => {
            log::info!("No stored configuration, using defaults");
            return RunConfiguration::default();
        }
        Err(err) => {
            log::warn!("Cannot read stored configuration, using defaults: {err}");
            return RunConfiguration::default();
        }
    };

    if record.version != CONFIG_FORMAT_VERSION {
        log::info!(
            "Stored configuration has version {}, expected {}; using defaults",
            record.version,
            CONFIG_FORMAT_VERSION
        );
        return RunConfiguration::default();
    }

    let Some(config) = record.configuration() else {
        log::warn!("Stored configuration has negative fields, using defaults");
        return RunConfiguration::default();
    };

    if let Err(err) = attributes::validate(&config) {
        log::warn!("Stored configuration is out of range ({err}), using defaults");
        return RunConfiguration::default();
    }

    log::info!("Loaded stored configuration: {config:?}");
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MAX_PIXELS;

    fn custom() -> RunConfiguration {
        RunConfiguration {
            run: false,
            pixel_count: 60,
            stripe_width: 3,
            train_length: 7,
            seconds_between_effects: 12,
        }
    }

    #[test]
    fn record_layout_matches_c_struct() {
        let bytes = PersistedRecord::from(&custom()).to_bytes();
        assert_eq!(
            bytes,
            [2u8, 0, 0, 0, 0, 0, 0, 0, 60, 0, 0, 0, 3, 0, 0, 0, 7, 0, 0, 0, 12, 0, 0, 0]
        );
        assert_eq!(PersistedRecord::from_bytes(&bytes).unwrap().configuration(), Some(custom()));
    }

    #[test]
    fn matching_version_is_loaded() {
        let mut store = MemoryStore {
            record: Some(PersistedRecord::from(&custom())),
            writes: 0,
        };
        assert_eq!(load_run_configuration(&mut store), custom());
    }

    #[test]
    fn version_mismatch_yields_defaults() {
        let mut record = PersistedRecord::from(&custom());
        record.version = 1;
        let mut store = MemoryStore {
            record: Some(record),
            writes: 0,
        };

        assert_eq!(load_run_configuration(&mut store), RunConfiguration::default());
        assert_eq!(store.writes, 0);
    }

    #[test]
    fn missing_record_yields_defaults() {
        let mut store = MemoryStore::default();
        assert_eq!(load_run_configuration(&mut store), RunConfiguration::default());
    }

    #[test]
    fn negative_fields_yield_defaults() {
        let mut record = PersistedRecord::from(&custom());
        record.train_length = -4;
        let mut store = MemoryStore {
            record: Some(record),
            writes: 0,
        };
        assert_eq!(load_run_configuration(&mut store), RunConfiguration::default());
    }

    #[test]
    fn oversized_strip_yields_defaults() {
        let mut record = PersistedRecord::from(&custom());
        record.pixel_count = 1000;
        let mut store = MemoryStore {
            record: Some(record),
            writes: 0,
        };
        assert_eq!(load_run_configuration(&mut store), RunConfiguration::default());
    }

    #[test]
    fn zero_fields_yield_defaults() {
        for field in 0..4 {
            let mut record = PersistedRecord::from(&custom());
            match field {
                0 => record.pixel_count = 0,
                1 => record.stripe_width = 0,
                2 => record.train_length = 0,
                _ => record.seconds_between_effects = 0,
            }
            let mut store = MemoryStore {
                record: Some(record),
                writes: 0,
            };
            assert_eq!(load_run_configuration(&mut store), RunConfiguration::default());
        }
    }

    #[test]
    fn largest_valid_strip_is_loaded() {
        let config = RunConfiguration {
            pixel_count: MAX_PIXELS as u32,
            ..custom()
        };
        let mut store = MemoryStore {
            record: Some(PersistedRecord::from(&config)),
            writes: 0,
        };
        assert_eq!(load_run_configuration(&mut store), config);
    }

    #[test]
    fn file_store_round_trip_and_corruption() {
        let dir = std::env::temp_dir().join(format!("lichterkette-store-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.bin");
        let mut store = FileStore::new(path.clone());

        assert_eq!(store.read().unwrap(), None);

        store.write(&PersistedRecord::from(&custom())).unwrap();
        assert_eq!(load_run_configuration(&mut store), custom());

        fs::write(&path, [1, 2, 3]).unwrap();
        assert!(matches!(
            store.read(),
            Err(Error::CorruptRecord { expected: 24, actual: 3 })
        ));
        assert_eq!(load_run_configuration(&mut store), RunConfiguration::default());

        fs::remove_dir_all(&dir).unwrap();
    }
}
