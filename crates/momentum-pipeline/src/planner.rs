//! Edit plan acquisition and validation.

use momentum_ai::{strip_code_fences, AiError, PlanGenerator};
use momentum_models::{AnalysisBundle, EditDecisionList};
use std::sync::Arc;

use crate::error::PlanningError;
use crate::logging::RunLogger;

/// Asks the model for an edit plan and checks it before anyone renders it.
#[derive(Clone)]
pub struct Planner {
    generator: Arc<dyn PlanGenerator>,
}

impl Planner {
    pub fn new(generator: Arc<dyn PlanGenerator>) -> Self {
        Self { generator }
    }

    /// One model request, no retry at this layer.
    pub async fn plan(
        &self,
        bundle: &AnalysisBundle,
        goal: &str,
        features: &[String],
        logger: &RunLogger,
    ) -> Result<EditDecisionList, PlanningError> {
        if !bundle.has_videos() {
            return Err(PlanningError::EmptyInput);
        }

        logger.log_progress(&format!(
            "Requesting edit plan for {} videos and {} beats",
            bundle.videos.len(),
            bundle.audio.beat_timestamps.len()
        ));

        let raw = self
            .generator
            .generate_plan(bundle, goal, features)
            .await
            .map_err(map_ai_error)?;

        let edl = parse_plan(&raw).map_err(|e| {
            logger.log_error(&format!("Rejected edit plan: {}", e));
            e
        })?;

        for (index, shot) in edl.unknown_sources(|p| bundle.videos.contains_key(p)) {
            logger.log_warning(&format!(
                "Shot {} references unanalyzed source {}",
                index,
                shot.source_video.display()
            ));
        }

        logger.log_progress(&format!(
            "Edit plan ready: {} shots, {:.2}s",
            edl.len(),
            edl.total_duration()
        ));
        Ok(edl)
    }
}

/// Parse and validate raw model output, tolerating a surrounding code fence.
pub fn parse_plan(raw: &str) -> Result<EditDecisionList, PlanningError> {
    let body = strip_code_fences(raw);
    if body.is_empty() {
        return Err(PlanningError::InvalidResponse("empty response".to_string()));
    }
    let edl: EditDecisionList = serde_json::from_str(body)
        .map_err(|e| PlanningError::InvalidResponse(e.to_string()))?;
    edl.validate()
        .map_err(|e| PlanningError::InvalidResponse(e.to_string()))?;
    Ok(edl)
}

fn map_ai_error(err: AiError) -> PlanningError {
    match err {
        AiError::EmptyInput(_) => PlanningError::EmptyInput,
        AiError::EmptyResponse => PlanningError::InvalidResponse("empty response".to_string()),
        AiError::InvalidResponse(message) => PlanningError::InvalidResponse(message),
        AiError::Json(e) => PlanningError::InvalidResponse(e.to_string()),
        other => PlanningError::Transport(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use momentum_ai::AiResult;
    use momentum_models::{AudioAnalysis, SceneAnalysis, Transition};
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Reply {
        Text(&'static str),
        Status(u16),
    }

    struct Generator {
        reply: Reply,
        calls: AtomicUsize,
    }

    impl Generator {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl PlanGenerator for Generator {
        async fn generate_plan(
            &self,
            _bundle: &AnalysisBundle,
            _goal: &str,
            _features: &[String],
        ) -> AiResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                Reply::Text(text) => Ok(text.to_string()),
                Reply::Status(status) => Err(AiError::RequestFailed {
                    status,
                    body: "unavailable".into(),
                }),
            }
        }
    }

    fn bundle() -> AnalysisBundle {
        let mut videos = BTreeMap::new();
        videos.insert(
            PathBuf::from("/m/v1.mp4"),
            SceneAnalysis {
                description: "surfer".into(),
                key_moment_timestamp: 2.0,
            },
        );
        AnalysisBundle::new(AudioAnalysis::from_beats([0.5, 1.0]), videos)
    }

    async fn plan_with(
        generator: Arc<Generator>,
        bundle: &AnalysisBundle,
    ) -> Result<EditDecisionList, PlanningError> {
        let features = vec!["dynamic cuts".to_string()];
        Planner::new(generator)
            .plan(bundle, "goal", &features, &RunLogger::new("planner"))
            .await
    }

    #[tokio::test]
    async fn test_empty_bundle_makes_no_request() {
        let generator = Generator::new(Reply::Text("{}"));
        let empty = AnalysisBundle::new(AudioAnalysis::from_beats([0.5]), BTreeMap::new());

        let err = plan_with(Arc::clone(&generator), &empty).await.unwrap_err();
        assert!(matches!(err, PlanningError::EmptyInput));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fenced_plan_accepted() {
        let generator = Generator::new(Reply::Text(
            "```json\n{\"shots\":[{\"source_video\":\"/m/v1.mp4\",\"start_time\":0.0,\"end_time\":2.5}]}\n```",
        ));

        let edl = plan_with(Arc::clone(&generator), &bundle()).await.unwrap();
        assert_eq!(edl.len(), 1);
        assert_eq!(edl.shots[0].transition_to_next, Transition::HardCut);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_source_kept() {
        let generator = Generator::new(Reply::Text(
            r#"{"shots":[{"source_video":"/m/other.mp4","start_time":1.0,"end_time":2.0}]}"#,
        ));

        let edl = plan_with(generator, &bundle()).await.unwrap();
        assert_eq!(edl.shots[0].source_video, PathBuf::from("/m/other.mp4"));
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let err = plan_with(Generator::new(Reply::Status(503)), &bundle())
            .await
            .unwrap_err();
        assert!(matches!(err, PlanningError::Transport(_)));
    }

    #[test]
    fn test_parse_plan_rejects_invalid() {
        let cases = [
            "",
            "```json\n```",
            "not json",
            r#"{"shots":[]}"#,
            r#"{"shots":[{"source_video":"/m/v1.mp4","start_time":-1.0,"end_time":2.0}]}"#,
            r#"{"shots":[{"source_video":"/m/v1.mp4","start_time":3.0,"end_time":2.0}]}"#,
            r#"{"shots":[{"source_video":"/m/v1.mp4","start_time":0.0}]}"#,
            r#"{"shots":[{"source_video":"/m/v1.mp4","start_time":0.0,"end_time":1.0,"text_overlay":{"text":"Hi","font_size":0}}]}"#,
        ];
        for raw in cases {
            assert!(
                matches!(parse_plan(raw), Err(PlanningError::InvalidResponse(_))),
                "accepted: {raw}"
            );
        }
    }
}
