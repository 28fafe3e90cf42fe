// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The progress icon and who controls it.
//!
//! Progress is normally driven internally, by run lifecycle messages. An external party (for
//! example an editor running its own long operation) can take over the icon; while it holds it,
//! internal updates are suppressed unless forced. When the external party lets go, the icon returns
//! to the last state set internally.

use camino::Utf8PathBuf;
use tracing::debug;

/// The state shown by the progress icon.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ProgressState {
    /// Nothing to show.
    #[default]
    None,

    /// A run is in progress.
    Progress,

    /// The last run succeeded.
    Green,

    /// The last run failed.
    Red,
}

/// A change to the progress icon, sent to the display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// The picture to show while in progress.
    pub picture: Utf8PathBuf,

    /// The state to show.
    pub state: ProgressState,

    /// Accompanying text.
    pub information: String,
}

/// Tracks the progress icon's state.
#[derive(Clone, Debug)]
pub struct ProgressTracker {
    default_picture: Utf8PathBuf,
    externally_driven: bool,
    last_internal: ProgressState,
}

impl ProgressTracker {
    /// Creates a new tracker. `default_picture` is used whenever a request doesn't name one.
    pub fn new(default_picture: impl Into<Utf8PathBuf>) -> Self {
        Self {
            default_picture: default_picture.into(),
            externally_driven: false,
            last_internal: ProgressState::None,
        }
    }

    /// Returns true if an external party currently controls the icon.
    pub fn is_externally_driven(&self) -> bool {
        self.externally_driven
    }

    /// Returns the last state set by an internal request.
    pub fn last_internal_state(&self) -> ProgressState {
        self.last_internal
    }

    /// Requests an internal update.
    ///
    /// Returns `None` if the icon is externally driven, in which case nothing changes.
    pub fn request(
        &mut self,
        state: ProgressState,
        information: impl Into<String>,
    ) -> Option<ProgressUpdate> {
        if self.externally_driven {
            debug!(?state, "progress is externally driven, suppressing update");
            return None;
        }
        Some(self.apply_internal(state, information.into()))
    }

    /// Forces an internal update, even if the icon is externally driven.
    pub fn force(
        &mut self,
        state: ProgressState,
        information: impl Into<String>,
    ) -> ProgressUpdate {
        self.apply_internal(state, information.into())
    }

    /// Turns external control on or off.
    ///
    /// While on, the icon shows [`ProgressState::Progress`]. Turning it off restores the last
    /// internal state.
    pub fn set_external(
        &mut self,
        on: bool,
        information: impl Into<String>,
        picture: Option<Utf8PathBuf>,
    ) -> ProgressUpdate {
        self.externally_driven = on;
        let state = if on {
            ProgressState::Progress
        } else {
            self.last_internal
        };
        self.make_update(state, information.into(), picture)
    }

    /// Turns external control on or off, showing an explicit state.
    pub fn set_external_state(
        &mut self,
        on: bool,
        information: impl Into<String>,
        state: ProgressState,
    ) -> ProgressUpdate {
        self.externally_driven = on;
        self.make_update(state, information.into(), None)
    }

    fn apply_internal(&mut self, state: ProgressState, information: String) -> ProgressUpdate {
        self.last_internal = state;
        self.make_update(state, information, None)
    }

    fn make_update(
        &self,
        state: ProgressState,
        information: String,
        picture: Option<Utf8PathBuf>,
    ) -> ProgressUpdate {
        ProgressUpdate {
            picture: picture.unwrap_or_else(|| self.default_picture.clone()),
            state,
            information,
        }
    }
}
