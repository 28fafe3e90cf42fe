// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client commands that act on the project cache rather than on the feedback list.

use crate::errors::ClientCommandParseError;
use camino::Utf8PathBuf;
use feedback_metadata::ProjectChangeMessage;
use indexmap::IndexMap;
use std::{fmt, str::FromStr};
use tracing::debug;

/// A command sent by a client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClientCommand {
    /// Rebuild and retest every cached project.
    RebuildAll,
}

impl ClientCommand {
    /// The name of [`ClientCommand::RebuildAll`].
    pub const REBUILD_ALL: &'static str = "build-test-all";

    /// String representations of all known variants.
    pub fn variants() -> &'static [&'static str] {
        &[Self::REBUILD_ALL]
    }

    /// Returns the name of this command.
    pub fn to_static_str(self) -> &'static str {
        match self {
            ClientCommand::RebuildAll => Self::REBUILD_ALL,
        }
    }

    /// Runs this command against `cache`, publishing through `bus`.
    pub fn execute(self, cache: &mut ProjectCache, bus: &mut impl MessageBus) {
        match self {
            ClientCommand::RebuildAll => rebuild_all(cache, bus),
        }
    }
}

impl FromStr for ClientCommand {
    type Err = ClientCommandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let val = match s {
            Self::REBUILD_ALL => ClientCommand::RebuildAll,
            other => return Err(ClientCommandParseError::new(other)),
        };
        Ok(val)
    }
}

impl fmt::Display for ClientCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_static_str())
    }
}

/// A project known to the cache.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CachedProject {
    rebuild_on_next_run: bool,
}

impl CachedProject {
    /// Creates a new cached project.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks this project to be rebuilt the next time a run starts.
    pub fn mark_rebuild_on_next_run(&mut self) {
        self.rebuild_on_next_run = true;
    }

    /// Returns true if this project will be rebuilt on the next run.
    pub fn rebuild_on_next_run(&self) -> bool {
        self.rebuild_on_next_run
    }
}

/// Known projects, by key, in the order they were added.
///
/// A key may be present without a project if the project couldn't be loaded.
pub type ProjectCache = IndexMap<Utf8PathBuf, Option<CachedProject>>;

/// Publishes notifications to the rest of the system.
pub trait MessageBus {
    /// Publishes a project change notification.
    fn publish(&mut self, message: ProjectChangeMessage);
}

/// Marks every cached project for rebuild, and publishes a single change notification listing
/// them.
///
/// Keys without a project are skipped.
pub fn rebuild_all(cache: &mut ProjectCache, bus: &mut impl MessageBus) {
    let mut message = ProjectChangeMessage::default();
    for (key, project) in cache.iter_mut() {
        let Some(project) = project else {
            debug!(%key, "skipping missing cached project");
            continue;
        };
        project.mark_rebuild_on_next_run();
        message.add_file(key.clone());
    }
    debug!(files = message.files.len(), "publishing rebuild-all change notification");
    bus.publish(message);
}
