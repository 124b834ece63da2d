//! End-to-end pipeline tests with fake collaborators and a fake ffmpeg.

#![cfg(unix)]

mod common;

use common::{FakePlanner, Harness};
use momentum_pipeline::{ErrorKind, InputError, PipelineError, PipelineEvent, PlanningError};
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// One audio track, two analyzed videos and a two-shot plan produce one file.
#[tokio::test]
async fn test_full_run_renders_output() {
    let h = Harness::new();
    let files = vec![h.touch("a.wav"), h.touch("v1.mp4"), h.touch("v2.mp4")];

    let output = h
        .orchestrator(vec![0.5, 1.0, 1.5])
        .run_pipeline(&files)
        .await
        .expect("pipeline should succeed");

    assert_eq!(output, h.output());
    assert!(output.exists());
    assert_eq!(h.workspace_entries(), 0);
    assert_eq!(h.analyzer_calls(), 2);
    assert_eq!(h.planner_calls(), 1);

    // two clips, one concat, one mux
    let calls = h.ffmpeg_calls();
    assert_eq!(calls.len(), 4);
    assert!(calls[0].contains("drawtext"));
    assert!(calls[3].ends_with(&*output.to_string_lossy()));
}

/// A missing input fails before anything is analyzed.
#[tokio::test]
async fn test_missing_video_is_input_error() {
    let h = Harness::new();
    let files = vec![h.touch("a.wav"), h.media.path().join("v1.mp4")];

    let err = h
        .orchestrator(vec![])
        .run_pipeline(&files)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Input(InputError::MissingFile(_))));
    assert_eq!(err.kind(), ErrorKind::MissingFile);
    assert_eq!(h.analyzer_calls(), 0);
    assert!(h.ffmpeg_calls().is_empty());
}

#[tokio::test]
async fn test_audio_and_video_both_required() {
    let h = Harness::new();
    let audio = h.touch("a.mp3");
    let video = h.touch("v1.mov");

    let err = h
        .orchestrator(vec![])
        .run_pipeline(&[audio])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoVideoFound);
    assert!(err.user_message().starts_with("Input Error:"));

    let err = h
        .orchestrator(vec![])
        .run_pipeline(&[video])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoAudioFound);
}

/// Extra audio files are ignored rather than rejected.
#[tokio::test]
async fn test_second_audio_ignored() {
    let h = Harness::new();
    let files = vec![h.touch("a.wav"), h.touch("b.mp3"), h.touch("v1.mp4")];

    let output = h.orchestrator(vec![]).run_pipeline(&files).await.unwrap();

    assert!(output.exists());
    let mux = h.ffmpeg_calls().pop().unwrap();
    assert!(mux.contains("a.wav"));
    assert!(!mux.contains("b.mp3"));
}

/// A failing video is dropped; the rest still make it into the cut.
#[tokio::test]
async fn test_failed_video_omitted() {
    let h = Harness::new();
    let files = vec![
        h.touch("a.wav"),
        h.touch("v1.mp4"),
        h.touch("broken.mp4"),
        h.touch("v2.mp4"),
    ];

    h.orchestrator(vec![0.5]).run_pipeline(&files).await.unwrap();

    assert_eq!(h.analyzer_calls(), 3);
    let calls = h.ffmpeg_calls();
    assert_eq!(calls.len(), 4);
    assert!(calls.iter().all(|c| !c.contains("broken.mp4")));
}

/// With nothing analyzed, planning stops before any model request.
#[tokio::test]
async fn test_all_videos_failing_skips_planning() {
    let h = Harness::new();
    let files = vec![h.touch("a.wav"), h.touch("broken1.mp4"), h.touch("broken2.mp4")];

    let err = h.orchestrator(vec![]).run_pipeline(&files).await.unwrap_err();

    assert!(matches!(err, PipelineError::Planning(PlanningError::EmptyInput)));
    assert_eq!(h.planner_calls(), 0);
    assert!(h.ffmpeg_calls().is_empty());
}

#[tokio::test]
async fn test_invalid_plan_stops_before_render() {
    let h = Harness::with_planner(FakePlanner::replying(r#"{"shots": []}"#));
    let files = vec![h.touch("a.wav"), h.touch("v1.mp4")];

    let err = h.orchestrator(vec![]).run_pipeline(&files).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidPlan);
    assert!(h.ffmpeg_calls().is_empty());
    assert_eq!(h.workspace_entries(), 0);
}

/// Shots pointing at files that no longer exist leave nothing to render.
#[tokio::test]
async fn test_plan_with_missing_sources_is_render_error() {
    let h = Harness::with_planner(FakePlanner::replying(
        r#"{"shots": [{"source_video": "/nonexistent/v9.mp4", "start_time": 0.0, "end_time": 1.0}]}"#,
    ));
    let files = vec![h.touch("a.wav"), h.touch("v1.mp4")];

    let err = h.orchestrator(vec![]).run_pipeline(&files).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NoValidClips);
    assert!(err.user_message().starts_with("Render Error:"));
    assert_eq!(h.workspace_entries(), 0);
}

#[tokio::test]
async fn test_events_follow_run() {
    let h = Harness::new();
    let files = vec![h.touch("a.wav"), h.touch("v1.mp4"), h.touch("broken.mp4")];
    let (tx, mut rx) = mpsc::channel(32);

    let output = h
        .orchestrator(vec![0.5, 1.0])
        .with_events(tx)
        .run_pipeline(&files)
        .await
        .unwrap();

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }

    assert!(matches!(events[0], PipelineEvent::Started { .. }));
    assert!(events.contains(&PipelineEvent::AnalysisComplete {
        analyzed: 1,
        failed: 1,
        beats: 2,
    }));
    assert!(events.contains(&PipelineEvent::PlanReady { shots: 1 }));
    assert!(events.contains(&PipelineEvent::RenderStarted));
    assert_eq!(events.last(), Some(&PipelineEvent::Finished { output }));
}

#[tokio::test]
async fn test_failure_event_carries_user_message() {
    let h = Harness::new();
    let (tx, mut rx) = mpsc::channel(32);

    let _ = h
        .orchestrator(vec![])
        .with_events(tx)
        .run_pipeline(&[h.touch("v1.mp4")])
        .await;

    let mut last = None;
    while let Ok(event) = rx.try_recv() {
        last = Some(event);
    }
    match last {
        Some(PipelineEvent::Failed { kind, message }) => {
            assert_eq!(kind, ErrorKind::NoAudioFound);
            assert!(message.starts_with("Input Error:"));
        }
        other => panic!("unexpected last event: {:?}", other),
    }
}

/// A run cancelled up front does no work.
#[tokio::test]
async fn test_cancelled_before_start() {
    let h = Harness::new();
    let files = vec![h.touch("a.wav"), h.touch("v1.mp4")];
    let (_tx, rx) = watch::channel(true);

    let err = h
        .orchestrator(vec![])
        .run_pipeline_with_cancel(&files, Some(rx))
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Cancelled));
    assert_eq!(h.analyzer_calls(), 0);
}

/// Cancelling mid-analysis abandons the stuck analysis and never plans.
#[tokio::test]
async fn test_cancel_during_analysis() {
    let h = Harness::new();
    let files = vec![h.touch("a.wav"), h.touch("stuck.mp4")];
    let (tx, rx) = watch::channel(false);

    let orchestrator = h.orchestrator(vec![]);
    let run = orchestrator.run_pipeline_with_cancel(&files, Some(rx));
    let cancel = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(true).unwrap();
    };

    let (result, ()) = tokio::time::timeout(Duration::from_secs(5), async {
        tokio::join!(run, cancel)
    })
    .await
    .expect("cancelled run should finish promptly");

    assert_eq!(result.unwrap_err().kind(), ErrorKind::Cancelled);
    assert_eq!(h.planner_calls(), 0);
    assert_eq!(h.workspace_entries(), 0);
}
