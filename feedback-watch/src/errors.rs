// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::{NO_HEADING_TARGET, StderrStyles};
use camino::Utf8PathBuf;
use feedback_engine::errors::{ClientCommandParseError, ConfigParseError};
use feedback_metadata::FeedbackExitCode;
use owo_colors::OwoColorize;
use std::error::Error;
use thiserror::Error;
use tracing::error;

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

// Note that the #[error()] strings are mostly placeholder messages -- the expected way to print out
// errors is with the display_to_stderr method, which colorizes errors.

/// An error that feedback-watch knows how to report.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("config parse error")]
    ConfigParseError {
        #[from]
        err: ConfigParseError,
    },
    #[error("unknown client command")]
    ClientCommandParseError {
        #[from]
        err: ClientCommandParseError,
    },
    #[error("failed to create async runtime")]
    RuntimeCreateError {
        #[source]
        err: std::io::Error,
    },
    #[error("failed to open input")]
    InputOpenError {
        path: Utf8PathBuf,
        #[source]
        err: std::io::Error,
    },
    #[error("failed to read input")]
    InputReadError {
        #[source]
        err: std::io::Error,
    },
    #[error("failed to write output")]
    WriteOutputError {
        #[source]
        err: std::io::Error,
    },
    #[error("failed to serialize notification")]
    SerializeError {
        #[source]
        err: serde_json::Error,
    },
    #[error("no run completed")]
    NoRunCompleted,
    #[error("run failed")]
    RunFailed,
}

impl ExpectedError {
    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::ConfigParseError { .. }
            | Self::ClientCommandParseError { .. }
            | Self::RuntimeCreateError { .. } => FeedbackExitCode::SETUP_ERROR,
            Self::InputOpenError { .. } | Self::InputReadError { .. } => {
                FeedbackExitCode::INPUT_READ_ERROR
            }
            Self::WriteOutputError { .. } | Self::SerializeError { .. } => {
                FeedbackExitCode::WRITE_OUTPUT_ERROR
            }
            Self::NoRunCompleted => FeedbackExitCode::NO_RUN_COMPLETED,
            Self::RunFailed => FeedbackExitCode::RUN_FAILED,
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match &self {
            Self::ConfigParseError { err } => {
                error!(
                    "failed to parse config at `{}`",
                    err.config_file().style(styles.bold)
                );
                err.source()
            }
            Self::ClientCommandParseError { err } => {
                error!("{err}");
                None
            }
            Self::RuntimeCreateError { err } => {
                error!("failed to create async runtime");
                Some(err as &dyn Error)
            }
            Self::InputOpenError { path, err } => {
                error!("failed to open input `{}`", path.style(styles.bold));
                Some(err as &dyn Error)
            }
            Self::InputReadError { err } => {
                error!("failed to read input");
                Some(err as &dyn Error)
            }
            Self::WriteOutputError { err } => {
                error!("failed to write output");
                Some(err as &dyn Error)
            }
            Self::SerializeError { err } => {
                error!("failed to serialize notification");
                Some(err as &dyn Error)
            }
            Self::NoRunCompleted => {
                error!("input ended before any run completed");
                None
            }
            Self::RunFailed => {
                error!(
                    "the last run had {}",
                    "failures".style(styles.warning_text)
                );
                None
            }
        };

        while let Some(err) = next_error {
            error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}
