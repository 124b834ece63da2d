//! Prompt construction and response cleanup.

use momentum_models::{AnalysisBundle, EditDecisionList};
use serde_json::{json, Map, Value};

pub const SCENE_ANALYSIS_PROMPT: &str = "You are a film scene analyst. I will provide you with several frames from a video clip. \
Your job is to identify the most visually interesting or action-packed moment. \
Also, provide a brief, one-sentence description of the clip's content. \
Return ONLY a JSON object with two keys: 'description' and 'key_moment_timestamp', \
where 'key_moment_timestamp' is the estimated time in seconds of the most interesting moment \
relative to the start of the clip (which is at 0 seconds).";

/// Planning prompt embedding the analyses, the brief and the EDL schema.
pub fn build_plan_prompt(bundle: &AnalysisBundle, goal: &str, features: &[String]) -> String {
    let video_analyses: Map<String, Value> = bundle
        .videos
        .iter()
        .map(|(path, analysis)| {
            (
                path.display().to_string(),
                json!({
                    "description": analysis.description,
                    "key_moment_timestamp": analysis.key_moment_timestamp,
                }),
            )
        })
        .collect();

    let input = json!({
        "video_analyses": video_analyses,
        "audio_analysis": { "beat_timestamps": bundle.audio.beat_timestamps },
        "video_goal": goal,
        "key_features": features,
    });

    let input = serde_json::to_string_pretty(&input).unwrap_or_else(|_| input.to_string());
    let schema = EditDecisionList::json_schema();
    let schema = serde_json::to_string_pretty(&schema).unwrap_or_else(|_| schema.to_string());

    format!(
        r#"You are a professional video editor and creative director. Your task is to create a dynamic, engaging video based on the provided media analysis and creative brief. You must generate a JSON object that represents an Edit Decision List (EDL).

--- INPUT DATA ---
{input}

--- CREATIVE TASK ---
1. Create a sequence of shots (`shots`) for the final video timeline.
2. Each shot must have a `source_video` path from the `video_analyses` input.
3. Select `start_time` and `end_time` for each shot to create a compelling narrative. Try to use the `key_moment_timestamp` from the analysis for important shots.
4. Make cuts that align with the `beat_timestamps` in the `audio_analysis` for a rhythmic feel.
5. The total video duration should be reasonable for social media (e.g., 15-60 seconds).
6. If specified in `key_features`, add `text_overlay` to some shots. Be creative with the text, making it short and impactful. Position it thoughtfully.

--- OUTPUT FORMAT ---
You must return ONLY a single, valid JSON object that conforms to the following JSON Schema. Do not include any other text or explanations.
{schema}"#
    )
}

/// Strip an optional surrounding markdown code fence (```` ```json ```` or ```` ``` ````).
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```JSON"))
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}
