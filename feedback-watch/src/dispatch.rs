// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Top-level application and command routing.

use crate::{
    ExpectedError, Result,
    display::ConsoleDisplay,
    output::{OutputContext, OutputOpts},
};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Subcommand};
use feedback_engine::{
    config::FeedbackConfig,
    engine::FeedbackEngine,
    rebuild::{CachedProject, ClientCommand, MessageBus, ProjectCache},
    router::{FeedbackRouter, LogObserver, feedback_router},
};
use feedback_metadata::{FeedbackExitCode, FeedbackMessage, ProjectChangeMessage};
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

/// Watch a stream of build and test feedback.
///
/// Messages are read as JSON lines, one message per line, for example
/// `{"type": "run-started"}`.
#[derive(Debug, clap::Parser)]
#[command(
    version,
    styles = crate::output::help_styles(),
    max_term_width = 100,
)]
pub struct FeedbackWatchApp {
    #[clap(flatten)]
    output: OutputOpts,

    #[clap(subcommand)]
    command: Command,
}

impl FeedbackWatchApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app.
    ///
    /// Returns the exit code.
    pub fn exec(self, output: OutputContext) -> Result<i32> {
        match self.command {
            Command::Watch(opts) => opts.exec(output),
            Command::Client(opts) => opts.exec(),
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Read feedback messages and show the live list as it changes
    Watch(WatchOpts),

    /// Run a client command against a set of cached projects
    ///
    /// The resulting change notification is written to stdout as a JSON line.
    Client(ClientOpts),
}

#[derive(Debug, Args)]
struct WatchOpts {
    /// File to read messages from, or `-` for standard input
    #[arg(long, short, value_name = "PATH", default_value = "-")]
    input: Utf8PathBuf,

    /// Config file, merged over the defaults
    #[arg(long, value_name = "PATH", env = "FEEDBACK_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Exit successfully even if the input ends before any run completes
    #[arg(long)]
    allow_no_run: bool,
}

impl WatchOpts {
    fn exec(self, output: OutputContext) -> Result<i32> {
        let config = FeedbackConfig::from_sources(self.config.as_deref())?;
        let display = ConsoleDisplay::new(io::stdout(), output.should_colorize_stdout());
        let engine = FeedbackEngine::new(&config, display);
        let (router, task) = feedback_router(engine, LogObserver);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| ExpectedError::RuntimeCreateError { err })?;

        let input = self.input;
        // The reader owns the only router handle, so the task finishes once the input does.
        let (engine, read_res) =
            runtime.block_on(async { tokio::join!(task.run(), read_messages(&input, router)) });
        let stats = read_res?;
        debug!(?stats, "finished reading input");
        if stats.skipped > 0 {
            warn!(
                "skipped {} invalid {} out of {}",
                stats.skipped,
                if stats.skipped == 1 { "line" } else { "lines" },
                stats.lines,
            );
        }

        let succeeded = engine.last_summary().map(|summary| summary.succeeded());
        engine
            .into_display()
            .finish()
            .map_err(|err| ExpectedError::WriteOutputError { err })?;

        match succeeded {
            Some(true) => Ok(FeedbackExitCode::OK),
            Some(false) => Err(ExpectedError::RunFailed),
            None if self.allow_no_run => {
                info!("input ended before any run completed");
                Ok(FeedbackExitCode::OK)
            }
            None => Err(ExpectedError::NoRunCompleted),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct ReadStats {
    lines: usize,
    sent: usize,
    skipped: usize,
}

async fn read_messages(input: &Utf8Path, router: FeedbackRouter) -> Result<ReadStats> {
    if input.as_str() == "-" {
        read_from(BufReader::new(tokio::io::stdin()), router).await
    } else {
        let file = tokio::fs::File::open(input)
            .await
            .map_err(|err| ExpectedError::InputOpenError {
                path: input.to_owned(),
                err,
            })?;
        read_from(BufReader::new(file), router).await
    }
}

/// Sends every message in `reader` to `router`. Lines that don't parse are skipped with a warning.
async fn read_from<R>(reader: R, router: FeedbackRouter) -> Result<ReadStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut stats = ReadStats::default();

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|err| ExpectedError::InputReadError { err })?
    {
        stats.lines += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<FeedbackMessage>(line) {
            Ok(message) => {
                if router.send(message).is_err() {
                    warn!("feedback router closed, ignoring the rest of the input");
                    break;
                }
                stats.sent += 1;
            }
            Err(err) => {
                warn!("skipping line {}: {err}", stats.lines);
                stats.skipped += 1;
            }
        }
    }

    Ok(stats)
}

#[derive(Debug, Args)]
struct ClientOpts {
    /// The command to run (known commands: build-test-all)
    #[arg(value_name = "COMMAND")]
    command: String,

    /// A cached project key; may be passed more than once
    #[arg(long = "project", value_name = "PATH")]
    projects: Vec<Utf8PathBuf>,
}

impl ClientOpts {
    fn exec(self) -> Result<i32> {
        let command: ClientCommand = self.command.parse()?;
        let mut cache: ProjectCache = self
            .projects
            .into_iter()
            .map(|project| (project, Some(CachedProject::new())))
            .collect();

        let mut stdout = io::stdout().lock();
        run_client_command(command, &mut cache, &mut stdout)?;
        Ok(FeedbackExitCode::OK)
    }
}

#[derive(Debug, Default)]
struct CollectingBus {
    published: Vec<ProjectChangeMessage>,
}

impl MessageBus for CollectingBus {
    fn publish(&mut self, message: ProjectChangeMessage) {
        self.published.push(message);
    }
}

fn run_client_command(
    command: ClientCommand,
    cache: &mut ProjectCache,
    writer: &mut impl Write,
) -> Result<()> {
    debug!(%command, projects = cache.len(), "running client command");
    let mut bus = CollectingBus::default();
    command.execute(cache, &mut bus);

    for message in &bus.published {
        serde_json::to_writer(&mut *writer, message)
            .map_err(|err| ExpectedError::SerializeError { err })?;
        writeln!(writer).map_err(|err| ExpectedError::WriteOutputError { err })?;
    }
    writer
        .flush()
        .map_err(|err| ExpectedError::WriteOutputError { err })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, Parser};
    use feedback_engine::list::EntryCategory;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_app_is_valid() {
        FeedbackWatchApp::command().debug_assert();
    }

    #[test]
    fn test_parse_args() {
        let app = FeedbackWatchApp::try_parse_from([
            "feedback-watch",
            "--color",
            "never",
            "watch",
            "--input",
            "messages.jsonl",
            "--allow-no-run",
        ])
        .expect("valid arguments");
        let Command::Watch(opts) = app.command else {
            panic!("expected watch command");
        };
        assert_eq!(opts.input.as_str(), "messages.jsonl");
        assert!(opts.allow_no_run);
    }

    #[tokio::test]
    async fn test_read_from_skips_invalid_lines() {
        let input = indoc! {r#"
            {"type": "run-started"}

            {"type": "delta", "errors-to-add": [{"project": "app.csproj", "file": "a.cs", "message": "E1"}]}
            not json
            {"type": "run-finished", "report": {"projects-built": 1, "builds-failed": 1}}
        "#};

        let display = ConsoleDisplay::new(Vec::new(), false);
        let engine = FeedbackEngine::new(&FeedbackConfig::default_config(), display);
        let (router, task) = feedback_router(engine, LogObserver);

        let (engine, stats) = tokio::join!(task.run(), read_from(input.as_bytes(), router));
        let stats = stats.expect("input is readable");
        assert_eq!(
            stats,
            ReadStats {
                lines: 5,
                sent: 3,
                skipped: 1,
            }
        );
        assert_eq!(engine.list().count(EntryCategory::BuildError), 1);
        assert_eq!(engine.last_summary().map(|s| s.succeeded()), Some(false));
    }

    #[tokio::test]
    async fn test_read_messages_from_file() {
        let dir = camino_tempfile::Utf8TempDir::new().expect("created temp dir");
        let path = dir.path().join("messages.jsonl");
        std::fs::write(&path, "{\"type\": \"run-started\"}\n").expect("wrote input");

        let display = ConsoleDisplay::new(Vec::new(), false);
        let engine = FeedbackEngine::new(&FeedbackConfig::default_config(), display);
        let (router, task) = feedback_router(engine, LogObserver);

        let err = read_messages(&dir.path().join("missing.jsonl"), router.clone())
            .await
            .expect_err("input is missing");
        assert_eq!(
            err.process_exit_code(),
            FeedbackExitCode::INPUT_READ_ERROR
        );

        let (engine, stats) = tokio::join!(task.run(), read_messages(&path, router));
        let stats = stats.expect("input is readable");
        assert_eq!((stats.lines, stats.sent), (1, 1));
        assert!(engine.session().is_some(), "run started");
    }

    #[test]
    fn test_client_command_output() {
        let mut cache = ProjectCache::new();
        cache.insert("src/a/a.csproj".into(), Some(CachedProject::new()));
        cache.insert("src/b/b.csproj".into(), None);

        let mut output = Vec::new();
        run_client_command(ClientCommand::RebuildAll, &mut cache, &mut output)
            .expect("writing to a Vec succeeds");
        assert_eq!(
            String::from_utf8(output).expect("valid UTF-8"),
            "{\"files\":[{\"path\":\"src/a/a.csproj\"}]}\n"
        );
    }

    #[test]
    fn test_unknown_client_command() {
        let opts = ClientOpts {
            command: "build-everything".to_owned(),
            projects: Vec::new(),
        };
        let err = opts.exec().expect_err("unknown command");
        assert_eq!(err.process_exit_code(), FeedbackExitCode::SETUP_ERROR);
    }
}
