// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The message router: the single point through which all feedback flows.
//!
//! Producers hold cloneable [`FeedbackRouter`] handles and may send from any task or thread. A
//! single [`RouterTask`] owns the [`FeedbackEngine`] and applies messages and control requests to
//! it strictly one at a time, in arrival order. A failure handling one message is reported to the
//! task's [`MessageObserver`] and does not stop the loop.

use crate::{
    config::VisibilityConfig,
    display::FeedbackDisplay,
    engine::FeedbackEngine,
    errors::{ControlRequestError, HandleMessageError, RouterClosedError},
    list::EntryTag,
    navigation::NavigationTarget,
    progress::ProgressState,
};
use camino::Utf8PathBuf;
use debug_ignore::DebugIgnore;
use feedback_metadata::{FeedbackMessage, MessageKind};
use std::error::Error;
use swrite::{SWrite, swrite};
use tokio::sync::{
    mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel},
    oneshot,
};
use tracing::{debug, warn};

/// Creates a router task owning `engine`, along with a handle to send to it.
///
/// The task must be driven with [`RouterTask::run`]. It finishes once every handle has been
/// dropped.
pub fn feedback_router<D, O>(
    engine: FeedbackEngine<D>,
    observer: O,
) -> (FeedbackRouter, RouterTask<D, O>)
where
    D: FeedbackDisplay,
    O: MessageObserver,
{
    let (sender, receiver) = unbounded_channel();
    let router = FeedbackRouter { sender };
    let task = RouterTask {
        engine,
        observer: DebugIgnore(observer),
        receiver,
    };
    (router, task)
}

/// Receives the outcome of every message handled by a [`RouterTask`].
pub trait MessageObserver {
    /// Called after each message is handled.
    fn message_handled(&mut self, kind: MessageKind, result: Result<(), HandleMessageError>);

    /// Called when a control request fails.
    fn control_failed(&mut self, error: ControlRequestError);
}

/// A [`MessageObserver`] that logs failures through `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogObserver;

impl MessageObserver for LogObserver {
    fn message_handled(&mut self, kind: MessageKind, result: Result<(), HandleMessageError>) {
        match result {
            Ok(()) => debug!(%kind, "message handled"),
            Err(err) => warn!("{}", error_chain(&err)),
        }
    }

    fn control_failed(&mut self, error: ControlRequestError) {
        warn!("{}", error_chain(&error));
    }
}

fn error_chain(err: &dyn Error) -> String {
    let mut s = String::with_capacity(128);
    swrite!(s, "{err}");
    let mut next_error = err.source();
    while let Some(err) = next_error {
        swrite!(s, "\n  caused by: {err}");
        next_error = err.source();
    }
    s
}

/// A handle to a [`RouterTask`].
///
/// Cloning the handle is cheap; all clones feed the same task.
#[derive(Clone, Debug)]
pub struct FeedbackRouter {
    sender: UnboundedSender<RouterEvent>,
}

impl FeedbackRouter {
    /// Queues a message for the engine.
    pub fn send(&self, message: FeedbackMessage) -> Result<(), RouterClosedError> {
        self.send_event(RouterEvent::Message(message))
    }

    /// Replaces the visibility configuration. This clears the list.
    pub fn set_visibility(&self, visibility: VisibilityConfig) -> Result<(), RouterClosedError> {
        self.control(ControlRequest::SetVisibility(visibility))
    }

    /// Turns detailed run information on or off.
    pub fn set_show_run_information(&self, show: bool) -> Result<(), RouterClosedError> {
        self.control(ControlRequest::SetShowRunInformation(show))
    }

    /// Removes every entry.
    pub fn clear_list(&self) -> Result<(), RouterClosedError> {
        self.control(ControlRequest::ClearList)
    }

    /// Removes build entries owned by `project`, or every build entry if `project` is `None`.
    pub fn clear_builds(&self, project: Option<Utf8PathBuf>) -> Result<(), RouterClosedError> {
        self.control(ControlRequest::ClearBuilds(project))
    }

    /// Hands the progress icon to (or takes it back from) an external party.
    pub fn set_external_progress(
        &self,
        on: bool,
        information: impl Into<String>,
        picture: Option<Utf8PathBuf>,
    ) -> Result<(), RouterClosedError> {
        self.control(ControlRequest::SetExternalProgress {
            on,
            information: information.into(),
            picture,
        })
    }

    /// Hands the progress icon to (or takes it back from) an external party, showing `state`.
    pub fn set_external_progress_state(
        &self,
        on: bool,
        information: impl Into<String>,
        state: ProgressState,
    ) -> Result<(), RouterClosedError> {
        self.control(ControlRequest::SetExternalProgressState {
            on,
            information: information.into(),
            state,
        })
    }

    /// Looks up where "go to source" leads for `tag`.
    ///
    /// The lookup is queued behind every message sent before it.
    pub async fn navigation_target(
        &self,
        tag: EntryTag,
    ) -> Result<Option<NavigationTarget>, RouterClosedError> {
        let (reply, receiver) = oneshot::channel();
        self.control(ControlRequest::NavigationTarget { tag, reply })?;
        receiver.await.map_err(|_| RouterClosedError)
    }

    fn control(&self, request: ControlRequest) -> Result<(), RouterClosedError> {
        self.send_event(RouterEvent::Control(request))
    }

    fn send_event(&self, event: RouterEvent) -> Result<(), RouterClosedError> {
        self.sender.send(event).map_err(|_| RouterClosedError)
    }
}

#[derive(Debug)]
enum RouterEvent {
    Message(FeedbackMessage),
    Control(ControlRequest),
}

#[derive(Debug)]
enum ControlRequest {
    SetVisibility(VisibilityConfig),
    SetShowRunInformation(bool),
    ClearList,
    ClearBuilds(Option<Utf8PathBuf>),
    SetExternalProgress {
        on: bool,
        information: String,
        picture: Option<Utf8PathBuf>,
    },
    SetExternalProgressState {
        on: bool,
        information: String,
        state: ProgressState,
    },
    NavigationTarget {
        tag: EntryTag,
        reply: oneshot::Sender<Option<NavigationTarget>>,
    },
}

/// The task that owns a [`FeedbackEngine`] and applies everything sent to it.
#[derive_where::derive_where(Debug)]
pub struct RouterTask<D, O> {
    engine: FeedbackEngine<D>,
    observer: DebugIgnore<O>,
    receiver: UnboundedReceiver<RouterEvent>,
}

impl<D, O> RouterTask<D, O>
where
    D: FeedbackDisplay,
    O: MessageObserver,
{
    /// Runs the task until every [`FeedbackRouter`] handle has been dropped, then returns the
    /// engine.
    pub async fn run(mut self) -> FeedbackEngine<D> {
        while let Some(event) = self.receiver.recv().await {
            match event {
                RouterEvent::Message(message) => {
                    let kind = message.kind();
                    let result = self.engine.handle_message(message);
                    self.observer.message_handled(kind, result);
                }
                RouterEvent::Control(request) => self.handle_control(request),
            }
        }
        debug!("all router handles dropped, shutting down");
        self.engine
    }

    fn handle_control(&mut self, request: ControlRequest) {
        let res = match request {
            ControlRequest::SetVisibility(visibility) => self.engine.set_visibility(visibility),
            ControlRequest::SetShowRunInformation(show) => {
                self.engine.set_show_run_information(show);
                Ok(())
            }
            ControlRequest::ClearList => self.engine.clear_list(),
            ControlRequest::ClearBuilds(project) => self.engine.clear_builds(project.as_deref()),
            ControlRequest::SetExternalProgress {
                on,
                information,
                picture,
            } => self.engine.set_external_progress(on, information, picture),
            ControlRequest::SetExternalProgressState {
                on,
                information,
                state,
            } => self
                .engine
                .set_external_progress_state(on, information, state),
            ControlRequest::NavigationTarget { tag, reply } => {
                // The requester may have stopped waiting.
                _ = reply.send(self.engine.navigation_target(&tag));
                Ok(())
            }
        };

        if let Err(error) = res {
            self.observer.control_failed(error);
        }
    }
}
