// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The interface between the engine and whatever renders its state.
//!
//! The engine owns the canonical [`FeedbackList`](crate::list::FeedbackList). Every change to it is
//! mirrored to a [`FeedbackDisplay`] synchronously, from the router's context, so a display only
//! ever needs to apply the changes it's told about in the order it's told about them. Displays must
//! not call back into the engine.

use crate::{
    errors::DisplayError,
    list::{EntryTag, FeedbackColor, FeedbackEntry},
    progress::ProgressUpdate,
    summary::RunSummary,
};

/// Renders feedback produced by the engine.
pub trait FeedbackDisplay {
    /// An entry was inserted at `index`. Entries previously at `index..` shift down by one.
    fn insert_entry(&mut self, index: usize, entry: &FeedbackEntry) -> Result<(), DisplayError>;

    /// The entry at `index` was removed.
    fn remove_entry(&mut self, index: usize, entry: &FeedbackEntry) -> Result<(), DisplayError>;

    /// All entries were removed.
    fn clear_entries(&mut self) -> Result<(), DisplayError>;

    /// The progress icon changed.
    fn set_progress(&mut self, update: &ProgressUpdate) -> Result<(), DisplayError>;

    /// The run summary changed. `None` clears any summary currently shown.
    fn set_summary(&mut self, summary: Option<&RunSummary>) -> Result<(), DisplayError>;

    /// A status message should be shown.
    fn print_message(&mut self, message: &RunMessage) -> Result<(), DisplayError>;

    /// Returns the tags of the entries the user currently has selected.
    fn selected_tags(&self) -> Vec<EntryTag>;

    /// Replaces the current selection with the entries carrying `tags`.
    fn select_tags(&mut self, tags: &[EntryTag]) -> Result<(), DisplayError>;
}

/// The kind of a [`RunMessage`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMessageKind {
    /// Ordinary progress information.
    Normal,

    /// A run completed successfully.
    Succeeded,

    /// A run completed with failures.
    Failed,
}

/// A status line shown alongside the feedback list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunMessage {
    /// The kind of message.
    pub kind: RunMessageKind,

    /// The message text.
    pub text: String,
}

impl RunMessage {
    /// Creates a new message.
    pub fn new(kind: RunMessageKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Creates a new [`RunMessageKind::Normal`] message.
    pub fn normal(text: impl Into<String>) -> Self {
        Self::new(RunMessageKind::Normal, text)
    }

    /// Returns the color this message should be shown in.
    pub fn color(&self) -> FeedbackColor {
        match self.kind {
            RunMessageKind::Normal => FeedbackColor::Black,
            RunMessageKind::Succeeded => FeedbackColor::Green,
            RunMessageKind::Failed => FeedbackColor::Red,
        }
    }

    /// Returns true if this message should be shown with normal emphasis.
    pub fn is_normal(&self) -> bool {
        self.kind == RunMessageKind::Normal
    }
}
