// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    display::{FeedbackDisplay, RunMessage},
    errors::DisplayError,
    list::{EntryCategory, EntryTag, FeedbackEntry},
    progress::ProgressUpdate,
    summary::RunSummary,
};
use feedback_metadata::{BuildItem, TestItem, TestRunnerKind, TestStatus};

pub(crate) const PROJECT: &str = "app.csproj";
pub(crate) const ASSEMBLY: &str = "bin/app.tests.dll";

pub(crate) fn build_item(file: &str, message: &str) -> BuildItem {
    BuildItem::new(PROJECT, file, message)
}

pub(crate) fn failed_test(name: &str, display_name: &str) -> TestItem {
    TestItem::new(
        ASSEMBLY,
        TestRunnerKind::NUnit,
        name,
        display_name,
        TestStatus::Failed,
    )
}

pub(crate) fn ignored_test(name: &str, display_name: &str) -> TestItem {
    TestItem::new(
        ASSEMBLY,
        TestRunnerKind::NUnit,
        name,
        display_name,
        TestStatus::Ignored,
    )
}

/// A display that mirrors the list it's sent and records everything else.
#[derive(Debug, Default)]
pub(crate) struct RecordingDisplay {
    pub(crate) entries: Vec<FeedbackEntry>,
    pub(crate) progress: Vec<ProgressUpdate>,
    pub(crate) summaries: Vec<Option<RunSummary>>,
    pub(crate) messages: Vec<RunMessage>,
    pub(crate) selected: Vec<EntryTag>,
    pub(crate) clears: usize,
    /// If set, every list mutation fails with `DisplayError::Closed`.
    pub(crate) closed: bool,
    /// If set, inserting an entry with this text fails with `DisplayError::Closed`.
    pub(crate) reject_text: Option<String>,
}

impl RecordingDisplay {
    pub(crate) fn texts(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.text.as_str()).collect()
    }

    pub(crate) fn categories(&self) -> Vec<EntryCategory> {
        self.entries.iter().map(|entry| entry.category).collect()
    }

    pub(crate) fn message_texts(&self) -> Vec<&str> {
        self.messages.iter().map(|m| m.text.as_str()).collect()
    }

    fn check_open(&self) -> Result<(), DisplayError> {
        if self.closed {
            Err(DisplayError::Closed)
        } else {
            Ok(())
        }
    }
}

impl FeedbackDisplay for RecordingDisplay {
    fn insert_entry(&mut self, index: usize, entry: &FeedbackEntry) -> Result<(), DisplayError> {
        self.check_open()?;
        if self.reject_text.as_deref() == Some(entry.text.as_str()) {
            return Err(DisplayError::Closed);
        }
        self.entries.insert(index, entry.clone());
        Ok(())
    }

    fn remove_entry(&mut self, index: usize, entry: &FeedbackEntry) -> Result<(), DisplayError> {
        self.check_open()?;
        let removed = self.entries.remove(index);
        assert_eq!(&removed, entry, "display and list out of sync");
        Ok(())
    }

    fn clear_entries(&mut self) -> Result<(), DisplayError> {
        self.check_open()?;
        self.entries.clear();
        self.clears += 1;
        Ok(())
    }

    fn set_progress(&mut self, update: &ProgressUpdate) -> Result<(), DisplayError> {
        self.progress.push(update.clone());
        Ok(())
    }

    fn set_summary(&mut self, summary: Option<&RunSummary>) -> Result<(), DisplayError> {
        self.summaries.push(summary.cloned());
        Ok(())
    }

    fn print_message(&mut self, message: &RunMessage) -> Result<(), DisplayError> {
        self.messages.push(message.clone());
        Ok(())
    }

    fn selected_tags(&self) -> Vec<EntryTag> {
        self.selected.clone()
    }

    fn select_tags(&mut self, tags: &[EntryTag]) -> Result<(), DisplayError> {
        self.selected = tags.to_vec();
        Ok(())
    }
}
