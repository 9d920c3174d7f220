//! Typed identifier newtypes backed by item names.
//!
//! Sensors, groups and devices are addressed by the names the automation
//! runtime knows them under (e.g. `sensor.bathroom_humidity`), so the
//! identifiers wrap a non-empty string rather than a generated UUID.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Wrap a name, rejecting empty or whitespace-only input.
            ///
            /// # Errors
            ///
            /// Returns [`ValidationError::EmptyId`] if `name` is blank.
            pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
                let name = name.into();
                if name.trim().is_empty() {
                    return Err(ValidationError::EmptyId);
                }
                Ok(Self(name))
            }

            /// Borrow the inner name.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(
    /// Identifier of a single sensor item (e.g. `sensor.shower_humidity`).
    SensorId
);

define_id!(
    /// Identifier of an ordered sensor group (e.g. `bathroom_humidity`).
    GroupId
);

define_id!(
    /// Identifier of a controlled device / actuator (e.g. `switch.excess_humidity_vent`).
    DeviceId
);
