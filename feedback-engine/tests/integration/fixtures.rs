// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use feedback_engine::{
    config::FeedbackConfig,
    display::{FeedbackDisplay, RunMessage},
    engine::FeedbackEngine,
    errors::{ControlRequestError, DisplayError, HandleMessageError},
    list::{EntryCategory, EntryTag, FeedbackEntry},
    progress::ProgressUpdate,
    router::MessageObserver,
    summary::RunSummary,
};
use feedback_metadata::{BuildItem, MessageKind, TestItem, TestRunnerKind, TestStatus};
use std::sync::{Arc, Mutex};

pub(crate) const PROJECT: &str = "src/app/app.csproj";
pub(crate) const ASSEMBLY: &str = "src/app/bin/Debug/app.tests.dll";

pub(crate) fn error(file: &str, message: &str) -> BuildItem {
    BuildItem::new(PROJECT, file, message)
}

pub(crate) fn test(name: &str, status: TestStatus) -> TestItem {
    TestItem::new(ASSEMBLY, TestRunnerKind::XUnit, name, name, status)
}

pub(crate) fn engine(display: TestDisplay) -> FeedbackEngine<TestDisplay> {
    FeedbackEngine::new(&FeedbackConfig::default_config(), display)
}

/// A display that mirrors the list, optionally refusing entries with a given text.
#[derive(Debug, Default)]
pub(crate) struct TestDisplay {
    pub(crate) entries: Vec<FeedbackEntry>,
    pub(crate) progress: Vec<ProgressUpdate>,
    pub(crate) summaries: Vec<Option<RunSummary>>,
    pub(crate) messages: Vec<RunMessage>,
    pub(crate) reject_text: Option<String>,
}

impl TestDisplay {
    pub(crate) fn texts(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.text.as_str()).collect()
    }

    pub(crate) fn categories(&self) -> Vec<EntryCategory> {
        self.entries.iter().map(|entry| entry.category).collect()
    }
}

impl FeedbackDisplay for TestDisplay {
    fn insert_entry(&mut self, index: usize, entry: &FeedbackEntry) -> Result<(), DisplayError> {
        if self.reject_text.as_deref() == Some(entry.text.as_str()) {
            return Err(DisplayError::Write(std::io::Error::other("rejected entry")));
        }
        self.entries.insert(index, entry.clone());
        Ok(())
    }

    fn remove_entry(&mut self, index: usize, entry: &FeedbackEntry) -> Result<(), DisplayError> {
        let removed = self.entries.remove(index);
        assert_eq!(&removed, entry, "display and list out of sync");
        Ok(())
    }

    fn clear_entries(&mut self) -> Result<(), DisplayError> {
        self.entries.clear();
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
        Vec::new()
    }

    fn select_tags(&mut self, _tags: &[EntryTag]) -> Result<(), DisplayError> {
        Ok(())
    }
}

#[derive(Debug)]
pub(crate) enum Observed {
    Message { kind: MessageKind, ok: bool },
    ControlFailed(&'static str),
}

/// Records outcomes into a shared log, readable after the router task is consumed.
#[derive(Clone, Debug, Default)]
pub(crate) struct RecordingObserver {
    pub(crate) log: Arc<Mutex<Vec<Observed>>>,
}

impl RecordingObserver {
    pub(crate) fn failures(&self) -> Vec<MessageKind> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter_map(|observed| match observed {
                Observed::Message { kind, ok: false } => Some(*kind),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn handled(&self) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|observed| matches!(observed, Observed::Message { .. }))
            .count()
    }
}

impl MessageObserver for RecordingObserver {
    fn message_handled(&mut self, kind: MessageKind, result: Result<(), HandleMessageError>) {
        self.log.lock().unwrap().push(Observed::Message {
            kind,
            ok: result.is_ok(),
        });
    }

    fn control_failed(&mut self, error: ControlRequestError) {
        self.log
            .lock()
            .unwrap()
            .push(Observed::ControlFailed(error.request()));
    }
}
