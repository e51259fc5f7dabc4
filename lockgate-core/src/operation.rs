//! Validated operations the gateway can ask the lock tool to perform.

use std::fmt;

use crate::{
    error::CoreError,
    request::{require, DeviceId},
};

/// Value passed to the tool's `--action` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Action {
    Create,
    Delete,
    Get,
    Update,
    List,
    ListDevices,
}

impl Action {
    /// The exact action name the tool's argument parser accepts.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Delete => "delete",
            Self::Get => "get",
            Self::Update => "update",
            Self::List => "list",
            Self::ListDevices => "list_devices",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully validated request, ready to be turned into an argument vector.
///
/// Each variant carries exactly the inputs its action needs, so an
/// operation that lacks a required value cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Operation {
    Create { username: String, code: String, device_id: Option<DeviceId> },
    Delete { username: String, device_id: Option<DeviceId> },
    Get { username: String, device_id: Option<DeviceId> },
    Update { username: String, code: String, device_id: Option<DeviceId> },
    ListKeyCodes { device_id: DeviceId },
    ListDevices,
}

impl Operation {
    /// Build a `get` operation from query parameters.
    ///
    /// # Errors
    /// Returns [`CoreError::MissingField`] if `username` is absent or blank,
    /// or [`CoreError::InvalidDeviceId`] if a non-empty `device_id` is not a
    /// positive integer.
    pub fn get(username: Option<String>, device_id: Option<&str>) -> Result<Self, CoreError> {
        let username = require("username", username.unwrap_or_default())?;
        let device_id = match device_id.map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse()?),
        };
        Ok(Self::Get { username, device_id })
    }

    /// Build a `list` operation from the `device_id` query parameter.
    ///
    /// # Errors
    /// Returns [`CoreError::MissingField`] if the parameter is absent or
    /// empty, or [`CoreError::InvalidDeviceId`] if it is not a positive
    /// integer.
    pub fn list_key_codes(device_id: Option<&str>) -> Result<Self, CoreError> {
        match device_id.map(str::trim) {
            None | Some("") => Err(CoreError::MissingField { field: "device_id" }),
            Some(raw) => Ok(Self::ListKeyCodes { device_id: raw.parse()? }),
        }
    }

    /// The tool action this operation maps to.
    #[must_use]
    pub fn action(&self) -> Action {
        match self {
            Self::Create { .. } => Action::Create,
            Self::Delete { .. } => Action::Delete,
            Self::Get { .. } => Action::Get,
            Self::Update { .. } => Action::Update,
            Self::ListKeyCodes { .. } => Action::List,
            Self::ListDevices => Action::ListDevices,
        }
    }
}
