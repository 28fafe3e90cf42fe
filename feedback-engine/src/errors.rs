// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by the feedback engine.

use crate::rebuild::ClientCommand;
use camino::Utf8PathBuf;
use config::ConfigError;
use feedback_metadata::MessageKind;
use thiserror::Error;

/// An error that occurred while parsing the config.
#[derive(Debug, Error)]
#[error("failed to parse feedback config at `{config_file}`")]
#[non_exhaustive]
pub struct ConfigParseError {
    config_file: Utf8PathBuf,
    #[source]
    err: ConfigError,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: impl Into<Utf8PathBuf>, err: ConfigError) -> Self {
        Self {
            config_file: config_file.into(),
            err,
        }
    }

    /// Returns the config file that failed to parse.
    pub fn config_file(&self) -> &Utf8PathBuf {
        &self.config_file
    }
}

/// An error returned by a [`FeedbackDisplay`](crate::display::FeedbackDisplay).
#[derive(Debug, Error)]
pub enum DisplayError {
    /// An error occurred while writing to the display's output.
    #[error("error writing to display")]
    Write(#[source] std::io::Error),

    /// The display is no longer accepting updates.
    #[error("display was closed")]
    Closed,
}

/// An error that occurred while handling a single message.
///
/// Returned by [`FeedbackEngine::handle_message`](crate::engine::FeedbackEngine::handle_message).
/// The router reports these to its observer and carries on with the next message.
#[derive(Debug, Error)]
#[error("failed to handle {kind} message")]
pub struct HandleMessageError {
    kind: MessageKind,
    #[source]
    err: DisplayError,
}

impl HandleMessageError {
    pub(crate) fn new(kind: MessageKind, err: DisplayError) -> Self {
        Self { kind, err }
    }

    /// Returns the kind of message that failed.
    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    /// Returns the underlying display error.
    pub fn display_error(&self) -> &DisplayError {
        &self.err
    }
}

/// An error that occurred while handling a control request.
#[derive(Debug, Error)]
#[error("failed to handle `{request}` request")]
pub struct ControlRequestError {
    request: &'static str,
    #[source]
    err: DisplayError,
}

impl ControlRequestError {
    pub(crate) fn new(request: &'static str, err: DisplayError) -> Self {
        Self { request, err }
    }

    /// Returns the name of the request that failed.
    pub fn request(&self) -> &'static str {
        self.request
    }
}

/// The router task has shut down and is no longer accepting messages.
#[derive(Clone, Debug, Error)]
#[error("feedback router is closed")]
#[non_exhaustive]
pub struct RouterClosedError;

/// Error returned while parsing a [`ClientCommand`] value from a string.
#[derive(Clone, Debug, Error)]
#[error(
    "unrecognized client command: {input}\n(known commands: {})",
    ClientCommand::variants().join(", "),
)]
pub struct ClientCommandParseError {
    input: String,
}

impl ClientCommandParseError {
    pub(crate) fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}
