//! Inbound request bodies and device identifiers.

use std::{fmt, num::NonZeroU64, str::FromStr};

use serde::{Deserialize, Deserializer};

use crate::{error::CoreError, operation::Operation};

/// Identifier of a lock device on the hub.
///
/// Always positive. Zero is the wire encoding for "no device" and never
/// becomes a `DeviceId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(NonZeroU64);

impl DeviceId {
    /// Wrap a raw id. Returns `None` for zero.
    #[must_use]
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    /// The raw numeric id.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DeviceId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| CoreError::InvalidDeviceId { value: s.to_owned() })
    }
}

/// JSON body accepted by the create, update and delete endpoints.
///
/// Missing or `null` string fields decode as empty and are rejected by
/// the `into_*` conversions that need them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct KeyCodeRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub code: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub username: String,
    /// `0`, `null` and absent all mean "let the tool pick its default device".
    #[serde(default)]
    pub device_id: Option<u64>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl KeyCodeRequest {
    /// The target device, if one was named.
    #[must_use]
    pub fn device(&self) -> Option<DeviceId> {
        self.device_id.and_then(DeviceId::new)
    }

    /// Validate as a create request.
    ///
    /// # Errors
    /// Returns [`CoreError::MissingField`] if `username` or `code` is blank.
    pub fn into_create(self) -> Result<Operation, CoreError> {
        let device_id = self.device();
        Ok(Operation::Create {
            username: require("username", self.username)?,
            code: require("code", self.code)?,
            device_id,
        })
    }

    /// Validate as an update request.
    ///
    /// # Errors
    /// Returns [`CoreError::MissingField`] if `username` or `code` is blank.
    pub fn into_update(self) -> Result<Operation, CoreError> {
        let device_id = self.device();
        Ok(Operation::Update {
            username: require("username", self.username)?,
            code: require("code", self.code)?,
            device_id,
        })
    }

    /// Validate as a delete request. `code` is ignored.
    ///
    /// # Errors
    /// Returns [`CoreError::MissingField`] if `username` is blank.
    pub fn into_delete(self) -> Result<Operation, CoreError> {
        let device_id = self.device();
        Ok(Operation::Delete {
            username: require("username", self.username)?,
            device_id,
        })
    }
}

/// Reject blank values for a required field.
pub(crate) fn require(field: &'static str, value: String) -> Result<String, CoreError> {
    if value.trim().is_empty() {
        Err(CoreError::MissingField { field })
    } else {
        Ok(value)
    }
}
