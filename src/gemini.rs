use std::time::Duration;

use log::{debug, warn};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::VideoAnalysis;
use crate::error::{Error, Result};
use crate::interpret::{GroundingChunk, interpret};

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const SAFETY_FINISH_REASON: &str = "SAFETY";

/// Settings for one generation call
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub base_url: String,
    pub timeout: Option<Duration>,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

impl GeminiSettings {
    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

/// Text and citations pulled out of a generation response
#[derive(Debug, Default)]
pub struct Generation {
    pub text: String,
    pub chunks: Vec<GroundingChunk>,
}

/// Build an HTTP client honoring the configured timeout
pub fn build_client(settings: &GeminiSettings) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = settings.timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(|e| Error::General(e.to_string()))
}

/// Ask the generation service about a video and interpret its answer.
///
/// `reference` is the raw string the user supplied, passed through to the
/// prompt unchanged.
pub async fn analyze(client: &reqwest::Client, reference: &str, settings: &GeminiSettings) -> Result<VideoAnalysis> {
    let generation = generate(client, reference, settings).await.inspect_err(|e| {
        warn!("Gemini analysis error: {e}");
    })?;
    interpret(&generation.text, &generation.chunks)
}

/// Issue the grounded generation request and decode the reply.
pub async fn generate(client: &reqwest::Client, reference: &str, settings: &GeminiSettings) -> Result<Generation> {
    let api_key = settings
        .api_key
        .as_deref()
        .filter(|k| !k.is_empty())
        .ok_or(Error::Unauthorized)?;

    debug!("Requesting analysis via Gemini model {}", settings.model);

    let body = request_body(reference, settings.temperature);

    let resp = client
        .post(settings.endpoint())
        .header("x-goog-api-key", api_key)
        .header("Content-Type", "application/json")
        .json(&body)
        .send()
        .await
        .map_err(|e| Error::General(e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        debug!("Gemini API returned {status}: {body}");
        return Err(classify_status(status, &body));
    }

    let json: serde_json::Value = resp.json().await.map_err(|e| Error::General(e.to_string()))?;
    extract_generation(json)
}

fn prompt(reference: &str) -> String {
    format!(
        "I have a YouTube video at this URL: {reference}.\n\
         \n\
         Using Google Search grounding, find out what this video is about (title, creator, and content).\n\
         Then, provide the following in a structured format:\n\
         1. A concise summary of the video's content.\n\
         2. 3-5 key takeaways or points mentioned.\n\
         3. Additional context or recent news about this creator or the topic.\n\
         \n\
         Return the data in a clear, readable format."
    )
}

fn request_body(reference: &str, temperature: f32) -> serde_json::Value {
    serde_json::json!({
        "contents": [
            {
                "role": "user",
                "parts": [{ "text": prompt(reference) }]
            }
        ],
        "tools": [{ "google_search": {} }],
        "generationConfig": {
            "temperature": temperature
        }
    })
}

fn classify_status(status: StatusCode, body: &str) -> Error {
    match status {
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimited,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Unauthorized,
        _ => Error::General(format!("Gemini API returned {status}: {body}")),
    }
}

fn extract_generation(json: serde_json::Value) -> Result<Generation> {
    let resp: GenerateContentResponse =
        serde_json::from_value(json).map_err(|e| Error::General(format!("unexpected Gemini response format: {e}")))?;

    let Some(candidate) = resp.candidates.into_iter().next() else {
        return Err(Error::EmptyResponse);
    };

    if candidate.finish_reason.as_deref() == Some(SAFETY_FINISH_REASON) {
        return Err(Error::SafetyBlock);
    }

    let text = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect::<Vec<_>>().join(""))
        .unwrap_or_default();

    let chunks = candidate
        .grounding_metadata
        .map(|m| m.grounding_chunks)
        .unwrap_or_default();

    Ok(Generation { text, chunks })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        let settings = GeminiSettings {
            base_url: "http://localhost:8080/".to_string(),
            model: "gemini-test".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.endpoint(), "http://localhost:8080/v1beta/models/gemini-test:generateContent");
    }

    #[test]
    fn test_request_body() {
        let body = request_body("https://youtu.be/abc123", 0.7);
        let text = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.contains("https://youtu.be/abc123"));
        assert!(text.contains("Google Search grounding"));
        assert!(body["tools"][0].get("google_search").is_some());
        let temp = body["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temp - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status(StatusCode::TOO_MANY_REQUESTS, ""), Error::RateLimited);
        assert_eq!(classify_status(StatusCode::UNAUTHORIZED, ""), Error::Unauthorized);
        assert_eq!(classify_status(StatusCode::FORBIDDEN, ""), Error::Unauthorized);
        assert!(matches!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR, "oops"),
            Error::General(_)
        ));
    }

    #[test]
    fn test_extract_generation() {
        let json = serde_json::json!({
            "candidates": [
                {
                    "content": {
                        "parts": [
                            { "text": "1. Summary.\n" },
                            { "text": "2. - Point" }
                        ]
                    },
                    "finishReason": "STOP",
                    "groundingMetadata": {
                        "groundingChunks": [
                            { "web": { "uri": "https://a.example", "title": "A" } },
                            { "retrievedContext": { "uri": "gs://bucket" } }
                        ]
                    }
                }
            ]
        });
        let generation = extract_generation(json).unwrap();
        assert_eq!(generation.text, "1. Summary.\n2. - Point");
        assert_eq!(generation.chunks.len(), 2);
        assert!(generation.chunks[1].web.is_none());
    }

    #[test]
    fn test_extract_generation_safety() {
        let json = serde_json::json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        });
        assert_eq!(extract_generation(json).unwrap_err(), Error::SafetyBlock);
    }

    #[test]
    fn test_extract_generation_no_candidates() {
        let json = serde_json::json!({ "candidates": [] });
        assert_eq!(extract_generation(json).unwrap_err(), Error::EmptyResponse);
        let json = serde_json::json!({});
        assert_eq!(extract_generation(json).unwrap_err(), Error::EmptyResponse);
    }

    #[test]
    fn test_extract_generation_missing_content() {
        let json = serde_json::json!({
            "candidates": [{ "finishReason": "STOP" }]
        });
        let generation = extract_generation(json).unwrap();
        assert!(generation.text.is_empty());
        assert!(generation.chunks.is_empty());
    }

    #[test]
    fn test_extract_generation_bad_shape() {
        let json = serde_json::json!({ "candidates": "nope" });
        assert!(matches!(extract_generation(json), Err(Error::General(_))));
    }

    #[tokio::test]
    async fn test_missing_api_key_is_unauthorized() {
        let client = reqwest::Client::new();
        let settings = GeminiSettings::default();
        let err = analyze(&client, "https://youtu.be/abc123", &settings).await.unwrap_err();
        assert_eq!(err, Error::Unauthorized);
    }
}
