// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The feedback engine: owner of all mutable feedback state.
//!
//! A [`FeedbackEngine`] is driven one message at a time, either directly through
//! [`FeedbackEngine::handle_message`] or (more commonly) through a
//! [`RouterTask`](crate::router::RouterTask).

use crate::{
    config::{FeedbackConfig, VisibilityConfig},
    display::{FeedbackDisplay, RunMessage, RunMessageKind},
    errors::{ControlRequestError, DisplayError, HandleMessageError},
    helpers::file_name,
    list::{EntryTag, FeedbackList},
    live_status::{apply_tick, status_line},
    navigation::{NavigationTarget, SourceNavigator, navigate, resolve},
    progress::{ProgressState, ProgressTracker, ProgressUpdate},
    reconciler::apply_delta,
    selection::SelectionSnapshot,
    summary::RunSummary,
};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, FixedOffset, Local};
use debug_ignore::DebugIgnore;
use feedback_metadata::{
    BuildRunResult, CacheDelta, FeedbackMessage, InformationType, LiveStatusTick, RunInfo,
    RunReport, TestRunnerKind,
};
use tracing::debug;

/// The state of a run in flight, from its start message to its finish message.
#[derive(Clone, Debug)]
pub struct RunSession {
    started_at: DateTime<FixedOffset>,
    messages_handled: usize,
}

impl RunSession {
    fn new() -> Self {
        Self {
            started_at: Local::now().fixed_offset(),
            messages_handled: 0,
        }
    }

    /// Returns the time the run started.
    pub fn started_at(&self) -> DateTime<FixedOffset> {
        self.started_at
    }

    /// Returns the number of messages handled since the run started.
    pub fn messages_handled(&self) -> usize {
        self.messages_handled
    }
}

/// Applies feedback messages and control requests, mirroring every change to a display.
#[derive_where::derive_where(Debug)]
pub struct FeedbackEngine<D> {
    display: DebugIgnore<D>,
    visibility: VisibilityConfig,
    show_run_information: bool,
    can_go_to_types: bool,
    list: FeedbackList,
    session: Option<RunSession>,
    progress: ProgressTracker,
    last_summary: Option<RunSummary>,
}

impl<D: FeedbackDisplay> FeedbackEngine<D> {
    /// Creates a new engine rendering to `display`.
    pub fn new(config: &FeedbackConfig, display: D) -> Self {
        Self {
            display: DebugIgnore(display),
            visibility: config.visibility,
            show_run_information: config.show_run_information,
            can_go_to_types: config.can_go_to_types,
            list: FeedbackList::new(),
            session: None,
            progress: ProgressTracker::new(config.progress_picture.clone()),
            last_summary: None,
        }
    }

    /// Returns the current list.
    pub fn list(&self) -> &FeedbackList {
        &self.list
    }

    /// Returns the display.
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Consumes the engine, returning its display.
    pub fn into_display(self) -> D {
        self.display.0
    }

    /// Returns the current visibility configuration.
    pub fn visibility(&self) -> &VisibilityConfig {
        &self.visibility
    }

    /// Returns the session for the run in flight, if any.
    pub fn session(&self) -> Option<&RunSession> {
        self.session.as_ref()
    }

    /// Returns the progress tracker.
    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    /// Returns the summary of the last completed run, if it's still being shown.
    pub fn last_summary(&self) -> Option<&RunSummary> {
        self.last_summary.as_ref()
    }

    /// Applies a single message.
    ///
    /// On error, the message may have been partially mirrored to the display. The engine's own
    /// state remains consistent and later messages can still be applied.
    pub fn handle_message(&mut self, message: FeedbackMessage) -> Result<(), HandleMessageError> {
        let kind = message.kind();
        debug!(%kind, "handling message");
        if let Some(session) = &mut self.session {
            session.messages_handled += 1;
        }

        let res = match message {
            FeedbackMessage::Delta(delta) => self.on_delta(delta),
            FeedbackMessage::LiveStatus(tick) => self.on_live_status(tick),
            FeedbackMessage::RunStarted => self.on_run_started(),
            FeedbackMessage::RunFinished { report } => self.on_run_finished(report),
            FeedbackMessage::RunInfo(info) => self.on_run_info(info),
            FeedbackMessage::BuildRunResult(result) => self.on_build_run_result(result),
        };
        res.map_err(|err| HandleMessageError::new(kind, err))
    }

    /// Replaces the visibility configuration, and clears the list.
    ///
    /// Entries hidden by the old configuration are not brought back; the list is repopulated as
    /// new deltas arrive.
    pub fn set_visibility(
        &mut self,
        visibility: VisibilityConfig,
    ) -> Result<(), ControlRequestError> {
        debug!(?visibility, "setting visibility");
        self.visibility = visibility;
        self.list
            .edit(&mut *self.display, |edit| edit.clear())
            .map_err(|err| ControlRequestError::new("set-visibility", err))
    }

    /// Turns detailed run information on or off.
    pub fn set_show_run_information(&mut self, show: bool) {
        self.show_run_information = show;
    }

    /// Removes every entry.
    pub fn clear_list(&mut self) -> Result<(), ControlRequestError> {
        self.list
            .edit(&mut *self.display, |edit| edit.clear())
            .map_err(|err| ControlRequestError::new("clear-list", err))
    }

    /// Removes build entries owned by `project`, or every build entry if `project` is `None`.
    pub fn clear_builds(&mut self, project: Option<&Utf8Path>) -> Result<(), ControlRequestError> {
        self.clear_builds_impl(project)
            .map_err(|err| ControlRequestError::new("clear-builds", err))
    }

    /// Hands the progress icon to (or takes it back from) an external party.
    ///
    /// While on, the icon shows progress, with `picture` if provided. Turning it off restores the
    /// last state set internally.
    pub fn set_external_progress(
        &mut self,
        on: bool,
        information: impl Into<String>,
        picture: Option<Utf8PathBuf>,
    ) -> Result<(), ControlRequestError> {
        let update = self.progress.set_external(on, information, picture);
        self.show_progress(&update)
            .map_err(|err| ControlRequestError::new("set-external-progress", err))
    }

    /// Like [`Self::set_external_progress`], but shows an explicit state.
    pub fn set_external_progress_state(
        &mut self,
        on: bool,
        information: impl Into<String>,
        state: ProgressState,
    ) -> Result<(), ControlRequestError> {
        let update = self.progress.set_external_state(on, information, state);
        self.show_progress(&update)
            .map_err(|err| ControlRequestError::new("set-external-progress-state", err))
    }

    /// Returns where "go to source" leads for `tag`.
    pub fn navigation_target(&self, tag: &EntryTag) -> Option<NavigationTarget> {
        resolve(tag, self.can_go_to_types)
    }

    /// Navigates to the source of `tag`. Returns true if navigation happened.
    pub fn go_to_source(&self, tag: &EntryTag, navigator: &mut impl SourceNavigator) -> bool {
        navigate(tag, self.can_go_to_types, navigator)
    }

    // ---
    // Message handlers
    // ---

    fn on_delta(&mut self, delta: CacheDelta) -> Result<(), DisplayError> {
        let visibility = self.visibility;
        let outcome = self.preserving_selection(|list, display| {
            apply_delta(list, delta, &visibility, display)
        })?;
        debug!(
            added = outcome.added,
            removed = outcome.removed,
            duplicates = outcome.duplicates,
            "applied delta"
        );
        Ok(())
    }

    fn on_live_status(&mut self, tick: LiveStatusTick) -> Result<(), DisplayError> {
        if self.session.is_none() {
            debug!("no run in flight, discarding live status");
            return Ok(());
        }

        self.display
            .print_message(&RunMessage::normal(status_line(&tick)))?;

        if self.visibility.show_failing_tests {
            let LiveStatusTick {
                failed_tests,
                failed_but_now_passing,
                ..
            } = tick;
            let outcome = self.preserving_selection(|list, display| {
                apply_tick(list, failed_tests, failed_but_now_passing, display)
            })?;
            debug!(
                failing = outcome.failing,
                now_passing = outcome.now_passing,
                "applied live status"
            );
        }
        Ok(())
    }

    fn on_run_started(&mut self) -> Result<(), DisplayError> {
        let text = if self.show_run_information {
            "Detected file changes..."
        } else {
            "processing changes..."
        };
        self.display.print_message(&RunMessage::normal(text))?;

        self.last_summary = None;
        self.display.set_summary(None)?;

        // Entries from placeholder runners never outlive the run that produced them.
        let removed = self.preserving_selection(|list, display| {
            list.edit(display, |edit| edit.remove_runner(TestRunnerKind::Any))
        })?;
        if removed > 0 {
            debug!(removed, "removed placeholder runner entries");
        }

        let update = self
            .progress
            .force(ProgressState::Progress, "processing changes...");
        self.show_progress(&update)?;

        if self.session.replace(RunSession::new()).is_some() {
            debug!("run started while another was in flight, replacing session");
        }
        Ok(())
    }

    fn on_run_finished(&mut self, report: RunReport) -> Result<(), DisplayError> {
        if let Some(session) = self.session.take() {
            let elapsed = Local::now().fixed_offset() - session.started_at;
            debug!(
                elapsed_ms = elapsed.num_milliseconds(),
                messages = session.messages_handled,
                "run finished"
            );
        }

        if report.aborted && !self.show_run_information {
            debug!("run aborted, not showing summary");
            return Ok(());
        }

        let summary = RunSummary::from_report(&report);
        let (state, kind) = if summary.succeeded() {
            (ProgressState::Green, RunMessageKind::Succeeded)
        } else {
            (ProgressState::Red, RunMessageKind::Failed)
        };

        let update = self.progress.force(state, "");
        self.show_progress(&update)?;
        self.display
            .print_message(&RunMessage::new(kind, summary.text()))?;
        self.display.set_summary(Some(&summary))?;
        self.last_summary = Some(summary);
        Ok(())
    }

    fn on_run_info(&mut self, info: RunInfo) -> Result<(), DisplayError> {
        if self.session.is_none() {
            debug!(info_type = ?info.info_type, "no run in flight, discarding run info");
            return Ok(());
        }

        let text = match info.info_type {
            InformationType::Build if self.show_run_information => {
                format!("building {}", file_name(&info.project))
            }
            InformationType::TestRun => "testing...".to_owned(),
            InformationType::PreProcessing if self.show_run_information => {
                "locating affected tests".to_owned()
            }
            InformationType::Build | InformationType::PreProcessing => return Ok(()),
        };

        if let Some(update) = self.progress.request(ProgressState::Progress, text.clone()) {
            self.show_progress(&update)?;
        }
        self.display.print_message(&RunMessage::normal(text))
    }

    fn on_build_run_result(&mut self, result: BuildRunResult) -> Result<(), DisplayError> {
        if result.errors.is_empty() {
            self.clear_builds_impl(Some(&result.project))?;
        }
        Ok(())
    }

    // ---
    // Helpers
    // ---

    fn clear_builds_impl(&mut self, project: Option<&Utf8Path>) -> Result<(), DisplayError> {
        let removed =
            self.preserving_selection(|list, display| {
                list.edit(display, |edit| edit.remove_builds(project))
            })?;
        debug!(?project, removed, "cleared builds");
        Ok(())
    }

    fn show_progress(&mut self, update: &ProgressUpdate) -> Result<(), DisplayError> {
        debug!(state = ?update.state, information = %update.information, "updating progress");
        self.display.set_progress(update)
    }

    fn preserving_selection<T>(
        &mut self,
        f: impl FnOnce(&mut FeedbackList, &mut D) -> Result<T, DisplayError>,
    ) -> Result<T, DisplayError> {
        let snapshot = SelectionSnapshot::capture(&*self.display);
        let out = f(&mut self.list, &mut *self.display)?;
        snapshot.restore(&self.list, &mut *self.display)?;
        Ok(out)
    }
}
