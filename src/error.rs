//! Error types shared by the whole controller.

use thiserror::Error;

use crate::remote::attributes::Attribute;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Pixel index past the end of the strip.
    #[error("pixel index {index} out of range for strip of {len}")]
    PixelOutOfRange { index: usize, len: usize },

    /// A remote client wrote a value the attribute does not accept.
    #[error("rejected write to {attribute}: {reason}")]
    InvalidAttribute {
        attribute: Attribute,
        reason: String,
    },

    /// Stored configuration block has the wrong size.
    #[error("corrupt settings record: expected {expected} bytes, got {actual}")]
    CorruptRecord { expected: usize, actual: usize },

    #[error("settings store I/O error: {0}")]
    Store(std::io::Error),

    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),

    /// OSC encoding or decoding failed.
    #[error("OSC error: {0}")]
    Osc(String),

    #[error("cannot load settings file: {0}")]
    SettingsFile(#[from] config_file::ConfigFileError),
}
