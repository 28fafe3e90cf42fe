// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests driving the engine through the router.

mod fixtures;

use crate::fixtures::*;
use color_eyre::eyre::{Result, ensure};
use feedback_engine::{
    config::VisibilityConfig,
    display::RunMessageKind,
    list::{EntryCategory, EntryTag},
    navigation::{CodePosition, NavigationTarget},
    progress::ProgressState,
    router::feedback_router,
};
use feedback_metadata::{
    CacheDelta, FeedbackMessage, LiveStatusTick, MessageKind, RunReport, TestStatus,
};
use pretty_assertions::assert_eq;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_producers_keep_blocks_ordered() -> Result<()> {
    let observer = RecordingObserver::default();
    let (router, task) = feedback_router(engine(TestDisplay::default()), observer.clone());
    let task = tokio::spawn(task.run());

    let mut producers = Vec::new();
    for producer in 0..4 {
        let router = router.clone();
        producers.push(tokio::spawn(async move {
            for n in 0..10 {
                let delta = match (producer + n) % 4 {
                    0 => CacheDelta {
                        errors_to_add: vec![error("a.cs", &format!("E{producer}-{n}"))],
                        ..CacheDelta::default()
                    },
                    1 => CacheDelta {
                        failed_to_add: vec![test(&format!("F{producer}-{n}"), TestStatus::Failed)],
                        ..CacheDelta::default()
                    },
                    2 => CacheDelta {
                        warnings_to_add: vec![error("a.cs", &format!("W{producer}-{n}"))],
                        ..CacheDelta::default()
                    },
                    _ => CacheDelta {
                        ignored_to_add: vec![test(
                            &format!("I{producer}-{n}"),
                            TestStatus::Ignored,
                        )],
                        ..CacheDelta::default()
                    },
                };
                router.send(FeedbackMessage::Delta(delta))?;
                tokio::task::yield_now().await;
            }
            Ok::<_, color_eyre::eyre::Report>(())
        }));
    }
    drop(router);
    for producer in producers {
        producer.await??;
    }

    let engine = task.await?;
    let display = engine.display();
    assert_eq!(observer.handled(), 40);
    assert!(observer.failures().is_empty());
    assert_eq!(display.entries.len(), 40);
    ensure!(
        display.categories().is_sorted(),
        "categories are partitioned: {:?}",
        display.categories()
    );
    for category in EntryCategory::ALL {
        assert_eq!(engine.list().count(category), 10, "{category}");
    }
    assert_eq!(display.entries, engine.list().entries());
    Ok(())
}

#[tokio::test]
async fn test_failed_message_does_not_stop_router() -> Result<()> {
    let observer = RecordingObserver::default();
    let display = TestDisplay {
        reject_text: Some("E1, bad.cs".to_owned()),
        ..TestDisplay::default()
    };
    let (router, task) = feedback_router(engine(display), observer.clone());

    router.send(FeedbackMessage::Delta(CacheDelta {
        errors_to_add: vec![error("ok.cs", "E0"), error("bad.cs", "E1")],
        ..CacheDelta::default()
    }))?;
    router.send(FeedbackMessage::Delta(CacheDelta {
        errors_to_add: vec![error("good.cs", "E2")],
        ..CacheDelta::default()
    }))?;
    drop(router);

    let engine = task.run().await;
    assert_eq!(observer.failures(), vec![MessageKind::Delta]);
    assert_eq!(observer.handled(), 2);
    assert_eq!(engine.display().texts(), vec!["E2, good.cs"]);
    // The rejected delta was taken back as a whole, so the list matches the display.
    assert_eq!(engine.display().entries, engine.list().entries());
    Ok(())
}

#[tokio::test]
async fn test_run_with_flaky_test() -> Result<()> {
    let observer = RecordingObserver::default();
    let (router, task) = feedback_router(engine(TestDisplay::default()), observer.clone());
    let flaky = test("Ns.Flaky", TestStatus::Failed);
    let mut passing = flaky.clone();
    passing.status = TestStatus::Passed;

    let messages = vec![
        FeedbackMessage::RunStarted,
        FeedbackMessage::LiveStatus(LiveStatusTick {
            current_assembly: ASSEMBLY.into(),
            current_test: "Ns.Flaky".to_owned(),
            tests_completed: 1,
            total_tests: 0,
            failed_tests: vec![flaky],
            ..LiveStatusTick::default()
        }),
        FeedbackMessage::LiveStatus(LiveStatusTick {
            current_assembly: ASSEMBLY.into(),
            tests_completed: 2,
            failed_but_now_passing: vec![passing],
            ..LiveStatusTick::default()
        }),
        FeedbackMessage::RunFinished {
            report: RunReport {
                projects_built: 3,
                builds_succeeded: 3,
                tests_ran: 10,
                tests_passed: 10,
                ..RunReport::default()
            },
        },
    ];
    for message in messages {
        router.send(message)?;
    }
    drop(router);

    let engine = task.run().await;
    let display = engine.display();
    assert!(observer.failures().is_empty());
    assert!(engine.list().is_empty(), "flaky test left no entry");
    assert_eq!(
        display
            .messages
            .iter()
            .map(|m| (m.kind, m.text.as_str()))
            .collect::<Vec<_>>(),
        vec![
            (RunMessageKind::Normal, "Detected file changes..."),
            (
                RunMessageKind::Normal,
                "testing Ns.Flaky in app.tests (1 tests completed)"
            ),
            (RunMessageKind::Normal, "testing app.tests (2 tests completed)"),
            (
                RunMessageKind::Succeeded,
                "Ran 3 build(s) (3 succeeded, 0 failed) and 10 test(s) (10 passed, 0 failed, 0 ignored)"
            ),
        ]
    );
    assert_eq!(
        display.progress.iter().map(|p| p.state).collect::<Vec<_>>(),
        vec![ProgressState::Progress, ProgressState::Green]
    );
    let summary = engine.last_summary().expect("summary was published");
    assert!(summary.succeeded());
    assert_eq!(display.summaries.last(), Some(&Some(summary.clone())));
    Ok(())
}

#[tokio::test]
async fn test_control_requests_are_ordered_with_messages() -> Result<()> {
    let observer = RecordingObserver::default();
    let (router, task) = feedback_router(engine(TestDisplay::default()), observer.clone());
    let task = tokio::spawn(task.run());

    let item = error("src/a.cs", "E1").at(7, 3);
    router.send(FeedbackMessage::Delta(CacheDelta {
        errors_to_add: vec![item.clone()],
        warnings_to_add: vec![error("src/b.cs", "W1")],
        ..CacheDelta::default()
    }))?;
    let target = router.navigation_target(EntryTag::Build(item)).await?;
    assert_eq!(
        target,
        Some(NavigationTarget::Reference(CodePosition {
            file: "src/a.cs".into(),
            line: 7,
            column: 3,
        }))
    );

    router.set_external_progress(true, "editor busy", None)?;
    router.set_visibility(VisibilityConfig {
        show_warnings: false,
        ..VisibilityConfig::default()
    })?;
    router.send(FeedbackMessage::Delta(CacheDelta {
        warnings_to_add: vec![error("src/b.cs", "W2")],
        failed_to_add: vec![test("Ns.A", TestStatus::Failed)],
        ..CacheDelta::default()
    }))?;
    drop(router);

    let engine = task.await?;
    assert_eq!(engine.display().texts(), vec!["Failed -> (XUnit) Ns.A"]);
    assert!(engine.progress().is_externally_driven());
    Ok(())
}
