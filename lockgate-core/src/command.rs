//! Argument vector construction for the lock tool.
//!
//! The tool is invoked as
//! `<program> -m <module> --hub-ip <hub> --action <action> [flags...]`.
//! Flag order is part of the tool's contract and must not change.

use std::fmt;

use crate::{operation::Operation, request::DeviceId};

pub const DEFAULT_PROGRAM: &str = "python3";
pub const DEFAULT_MODULE: &str = "hubitat_lock_manager.cli";

const FLAG_MODULE: &str = "-m";
const FLAG_HUB_IP: &str = "--hub-ip";
const FLAG_ACTION: &str = "--action";
const FLAG_USERNAME: &str = "--username";
const FLAG_CODE: &str = "--code";
const FLAG_DEVICE_ID: &str = "--device-id";

/// The fixed part of every invocation: executable, module selector and hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    program: String,
    module: String,
    hub_address: String,
}

impl CommandTemplate {
    #[must_use]
    pub fn new(
        program: impl Into<String>,
        module: impl Into<String>,
        hub_address: impl Into<String>,
    ) -> Self {
        Self { program: program.into(), module: module.into(), hub_address: hub_address.into() }
    }

    /// Template using the default program and module for the given hub.
    #[must_use]
    pub fn with_hub(hub_address: impl Into<String>) -> Self {
        Self::new(DEFAULT_PROGRAM, DEFAULT_MODULE, hub_address)
    }

    /// Build the argument vector for `op`.
    ///
    /// Pure: the same template and operation always produce the same
    /// invocation.
    #[must_use]
    pub fn build(&self, op: &Operation) -> CommandInvocation {
        let mut args = vec![
            FLAG_MODULE.to_owned(),
            self.module.clone(),
            FLAG_HUB_IP.to_owned(),
            self.hub_address.clone(),
            FLAG_ACTION.to_owned(),
            op.action().as_str().to_owned(),
        ];

        match op {
            Operation::Create { username, code, device_id }
            | Operation::Update { username, code, device_id } => {
                push_flag(&mut args, FLAG_USERNAME, username);
                push_flag(&mut args, FLAG_CODE, code);
                push_device(&mut args, *device_id);
            }
            Operation::Delete { username, device_id } | Operation::Get { username, device_id } => {
                push_flag(&mut args, FLAG_USERNAME, username);
                push_device(&mut args, *device_id);
            }
            Operation::ListKeyCodes { device_id } => push_device(&mut args, Some(*device_id)),
            Operation::ListDevices => {}
        }

        CommandInvocation { program: self.program.clone(), args }
    }
}

fn push_flag(args: &mut Vec<String>, flag: &str, value: &str) {
    args.push(flag.to_owned());
    args.push(value.to_owned());
}

fn push_device(args: &mut Vec<String>, device_id: Option<DeviceId>) {
    if let Some(id) = device_id {
        args.push(FLAG_DEVICE_ID.to_owned());
        args.push(id.to_string());
    }
}

/// An executable plus its ordered arguments. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    program: String,
    args: Vec<String>,
}

impl CommandInvocation {
    /// Build an arbitrary invocation. Gateway code goes through
    /// [`CommandTemplate::build`] instead.
    #[must_use]
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { program: program.into(), args: args.into_iter().map(Into::into).collect() }
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Render for logs with the value after `--code` masked.
    #[must_use]
    pub fn redacted(&self) -> Redacted<'_> {
        Redacted(self)
    }
}

/// Display adapter returned by [`CommandInvocation::redacted`].
pub struct Redacted<'a>(&'a CommandInvocation);

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.program)?;
        let mut mask_next = false;
        for arg in &self.0.args {
            if mask_next {
                f.write_str(" ***")?;
            } else {
                write!(f, " {arg}")?;
            }
            mask_next = arg == FLAG_CODE;
        }
        Ok(())
    }
}
