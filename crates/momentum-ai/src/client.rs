//! Gemini REST client.

use async_trait::async_trait;
use momentum_models::{AnalysisBundle, SceneAnalysis};
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::GeminiConfig;
use crate::error::{AiError, AiResult};
use crate::prompt::{build_plan_prompt, strip_code_fences, SCENE_ANALYSIS_PROMPT};
use crate::traits::{ContentAnalyzer, PlanGenerator};
use crate::types::{GenerateContentRequest, GenerateContentResponse, Part};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini client serving both the analysis and planning roles.
pub struct GeminiClient {
    http: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new client.
    pub fn new(config: GeminiConfig) -> AiResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(AiError::Network)?;

        info!(model = %config.model, "Gemini client initialized");
        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> AiResult<Self> {
        Self::new(GeminiConfig::from_env()?)
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Send one request and return the first candidate's text.
    async fn generate(&self, parts: Vec<Part>) -> AiResult<String> {
        let url = self.config.endpoint();
        let request = GenerateContentRequest::json(parts);

        let response = self.with_retry(|| self.send(&url, &request)).await?;
        response.text().ok_or(AiError::EmptyResponse)
    }

    async fn send(
        &self,
        url: &str,
        request: &GenerateContentRequest,
    ) -> AiResult<GenerateContentResponse> {
        let response = self
            .http
            .post(url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AiError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            AiError::invalid_response(format!("Failed to parse Gemini response: {}", e))
        })
    }

    /// Execute with retry logic.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> AiResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = AiResult<T>>,
    {
        let mut attempt = 0u32;
        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = self.config.retry_base_delay * 2u32.pow(attempt);
                    warn!(
                        "Gemini request failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl ContentAnalyzer for GeminiClient {
    async fn analyze_frames(&self, frames: &[Vec<u8>]) -> AiResult<SceneAnalysis> {
        if frames.is_empty() {
            return Err(AiError::EmptyInput("no frames provided for analysis".to_string()));
        }

        debug!(frames = frames.len(), "Sending frames for scene analysis");
        let mut parts = Vec::with_capacity(frames.len() + 1);
        parts.push(Part::text(SCENE_ANALYSIS_PROMPT));
        parts.extend(frames.iter().map(|frame| Part::jpeg(frame)));

        let text = self.generate(parts).await?;
        let cleaned = strip_code_fences(&text);
        if cleaned.is_empty() {
            return Err(AiError::EmptyResponse);
        }

        let analysis: SceneAnalysis = serde_json::from_str(cleaned).map_err(|e| {
            AiError::invalid_response(format!("scene analysis was not valid JSON: {}", e))
        })?;
        analysis
            .validate()
            .map_err(|e| AiError::invalid_response(format!("scene analysis rejected: {}", e)))?;
        Ok(analysis)
    }
}

#[async_trait]
impl PlanGenerator for GeminiClient {
    async fn generate_plan(
        &self,
        bundle: &AnalysisBundle,
        goal: &str,
        features: &[String],
    ) -> AiResult<String> {
        let prompt = build_plan_prompt(bundle, goal, features);
        debug!(
            videos = bundle.videos.len(),
            prompt_chars = prompt.len(),
            "Requesting edit plan"
        );
        self.generate(vec![Part::text(prompt)]).await
    }
}
