//! The five remotely readable and writable run parameters.

use std::fmt;

use crate::config::RunConfiguration;
use crate::error::{Error, Result};
use crate::settings::MAX_PIXELS;

pub const SERVICE_UUID: &str = "81bea2b7-ad1a-493a-bf19-123596b3328b";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attribute {
    Run,
    PixelCount,
    StripeWidth,
    TrainLength,
    SecondsBetweenEffects,
}

impl Attribute {
    pub const ALL: [Attribute; 5] = [
        Attribute::Run,
        Attribute::PixelCount,
        Attribute::StripeWidth,
        Attribute::TrainLength,
        Attribute::SecondsBetweenEffects,
    ];

    pub const fn uuid(self) -> &'static str {
        match self {
            Attribute::Run => "3a6d65bb-ed42-4443-a23b-4225e76f10d8",
            Attribute::PixelCount => "a9497a4a-4735-4b50-b10c-da941ac7b51b",
            Attribute::StripeWidth => "672b85ce-5175-485e-a9e2-739ebae601d9",
            Attribute::TrainLength => "9307a368-8d50-48dd-92e8-9f65bb15f98f",
            Attribute::SecondsBetweenEffects => "f0d754d8-a042-4d39-9cec-5b2243a2de86",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Attribute::Run => "run",
            Attribute::PixelCount => "pixel_count",
            Attribute::StripeWidth => "stripe_width",
            Attribute::TrainLength => "train_length",
            Attribute::SecondsBetweenEffects => "seconds_between_effects",
        }
    }

    pub fn parse_from_str(s: &str) -> Option<Attribute> {
        Attribute::ALL.into_iter().find(|a| a.as_str() == s)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeValue {
    Bool(bool),
    Unsigned(u32),
}

/// Live attribute values as seen by the remote client.
pub struct AttributeTable {
    values: RunConfiguration,
}

impl AttributeTable {
    pub fn new(initial: RunConfiguration) -> AttributeTable {
        AttributeTable { values: initial }
    }

    pub fn read(&self, attribute: Attribute) -> AttributeValue {
        match attribute {
            Attribute::Run => AttributeValue::Bool(self.values.run),
            Attribute::PixelCount => AttributeValue::Unsigned(self.values.pixel_count),
            Attribute::StripeWidth => AttributeValue::Unsigned(self.values.stripe_width),
            Attribute::TrainLength => AttributeValue::Unsigned(self.values.train_length),
            Attribute::SecondsBetweenEffects => {
                AttributeValue::Unsigned(self.values.seconds_between_effects)
            }
        }
    }

    /// Applies a remote write. Invalid values leave the table unchanged.
    pub fn write(&mut self, attribute: Attribute, value: AttributeValue) -> Result<()> {
        let reject = |reason: &str| Error::InvalidAttribute {
            attribute,
            reason: reason.to_string(),
        };

        match (attribute, value) {
            (Attribute::Run, AttributeValue::Bool(run)) => self.values.run = run,
            (Attribute::Run, AttributeValue::Unsigned(_)) => return Err(reject("expected a boolean")),
            (_, AttributeValue::Bool(_)) => return Err(reject("expected an unsigned integer")),
            (_, AttributeValue::Unsigned(0)) => return Err(reject("must be at least 1")),
            (Attribute::PixelCount, AttributeValue::Unsigned(n)) if n as usize > MAX_PIXELS => {
                return Err(reject(&format!("strip supports at most {MAX_PIXELS} pixels")))
            }
            (Attribute::PixelCount, AttributeValue::Unsigned(n)) => self.values.pixel_count = n,
            (Attribute::StripeWidth, AttributeValue::Unsigned(n)) if n as usize > MAX_PIXELS => {
                return Err(reject("wider than the strip"))
            }
            (Attribute::StripeWidth, AttributeValue::Unsigned(n)) => self.values.stripe_width = n,
            (Attribute::TrainLength, AttributeValue::Unsigned(n)) if n as usize > MAX_PIXELS => {
                return Err(reject("longer than the strip"))
            }
            (Attribute::TrainLength, AttributeValue::Unsigned(n)) => self.values.train_length = n,
            (Attribute::SecondsBetweenEffects, AttributeValue::Unsigned(n)) => {
                self.values.seconds_between_effects = n
            }
        }

        Ok(())
    }

    pub fn snapshot(&self) -> &RunConfiguration {
        &self.values
    }
}

/// Checks every field of `config` against the rules remote writes go through.
pub fn validate(config: &RunConfiguration) -> Result<()> {
    let current = AttributeTable::new(*config);
    let mut scratch = AttributeTable::new(RunConfiguration::default());
    for attribute in Attribute::ALL {
        scratch.write(attribute, current.read(attribute))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_reflect_writes() {
        let mut table = AttributeTable::new(RunConfiguration::default());
        table.write(Attribute::Run, AttributeValue::Bool(false)).unwrap();
        table.write(Attribute::TrainLength, AttributeValue::Unsigned(9)).unwrap();

        assert_eq!(table.read(Attribute::Run), AttributeValue::Bool(false));
        assert_eq!(table.read(Attribute::TrainLength), AttributeValue::Unsigned(9));
        assert_eq!(table.snapshot().train_length, 9);
    }

    #[test]
    fn oversized_strip_is_rejected() {
        let mut table = AttributeTable::new(RunConfiguration::default());
        let err = table
            .write(Attribute::PixelCount, AttributeValue::Unsigned(MAX_PIXELS as u32 + 1))
            .unwrap_err();

        assert!(matches!(err, Error::InvalidAttribute { attribute: Attribute::PixelCount, .. }));
        assert_eq!(table.snapshot(), &RunConfiguration::default());

        table
            .write(Attribute::PixelCount, AttributeValue::Unsigned(MAX_PIXELS as u32))
            .unwrap();
        assert_eq!(table.snapshot().pixel_count, MAX_PIXELS as u32);
    }

    #[test]
    fn type_and_zero_checks() {
        let mut table = AttributeTable::new(RunConfiguration::default());
        assert!(table.write(Attribute::Run, AttributeValue::Unsigned(1)).is_err());
        assert!(table.write(Attribute::StripeWidth, AttributeValue::Bool(true)).is_err());
        assert!(table.write(Attribute::StripeWidth, AttributeValue::Unsigned(0)).is_err());
        assert_eq!(table.snapshot(), &RunConfiguration::default());
    }

    #[test]
    fn names_round_trip() {
        for attribute in Attribute::ALL {
            assert_eq!(Attribute::parse_from_str(attribute.as_str()), Some(attribute));
        }
        assert_eq!(Attribute::parse_from_str("brightness"), None);
    }
}
