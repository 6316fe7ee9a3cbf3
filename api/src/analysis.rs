//! AI review of an executed request.
//!
//! `AnalysisClient::try_analyze` is the fallible call. `AnalysisClient::analyze`
//! is what the orchestrator uses: apart from a missing credential, every
//! failure turns into `Suggestion::fallback()`.

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{
    domain::{request::Request, response::Response, suggestion::Suggestion},
    error::MissingCredential,
};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_AI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_BODY_BUDGET: usize = 5000;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    MissingCredential(#[from] MissingCredential),
    #[error("reasoning service request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("reasoning service answered {status}: {body}")]
    Service { status: u16, body: String },
    #[error("reasoning service returned no content")]
    EmptyResponse,
    #[error("malformed suggestion: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A hosted model that answers a prompt with text shaped by `schema`.
#[async_trait]
pub trait ReasoningService: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        schema: &Value,
        model: &str,
        credential: &SecretString,
    ) -> Result<String, AnalysisError>;
}

pub struct AnalysisClient {
    service: Arc<dyn ReasoningService>,
    model: String,
    body_budget: usize,
}

impl AnalysisClient {
    pub fn new(service: Arc<dyn ReasoningService>, model: &str) -> Self {
        Self {
            service,
            model: model.to_string(),
            body_budget: DEFAULT_BODY_BUDGET,
        }
    }

    pub fn with_body_budget(mut self, body_budget: usize) -> Self {
        self.body_budget = body_budget;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Reviews the pair, substituting the fallback suggestion for any failure
    /// other than a missing credential.
    pub async fn analyze(
        &self,
        request: &Request,
        response: &Response,
        credential: &SecretString,
    ) -> Result<Suggestion, MissingCredential> {
        match self.try_analyze(request, response, credential).await {
            Ok(suggestion) => Ok(suggestion),
            Err(AnalysisError::MissingCredential(e)) => Err(e),
            Err(e) => {
                warn!("analysis of {} {} failed: {}", request.method, request.url, e);
                Ok(Suggestion::fallback())
            }
        }
    }

    pub async fn try_analyze(
        &self,
        request: &Request,
        response: &Response,
        credential: &SecretString,
    ) -> Result<Suggestion, AnalysisError> {
        if credential.expose_secret().trim().is_empty() {
            return Err(MissingCredential.into());
        }
        let prompt = build_prompt(request, response, self.body_budget);
        info!("requesting analysis of {} {} from {}", request.method, request.url, self.model);
        let text = self
            .service
            .generate(&prompt, &suggestion_schema(), &self.model, credential)
            .await?;
        parse_suggestion(&text)
    }
}

/// Builds the prompt for one transaction. The same pair always yields the
/// same prompt; the response body is cut to `body_budget` characters.
pub fn build_prompt(request: &Request, response: &Response, body_budget: usize) -> String {
    let headers = serde_json::to_string(&request.headers.0).unwrap_or_default();
    let params = serde_json::to_string(&request.params.0).unwrap_or_default();
    let body = serde_json::to_string(&response.body).unwrap_or_default();
    let body: String = body.chars().take(body_budget).collect();
    format!(
        "You are reviewing a single HTTP API call as an experienced backend engineer.\n\
         \n\
         REQUEST\n\
         Method: {method}\n\
         URL: {url}\n\
         Headers: {headers}\n\
         Query parameters: {params}\n\
         Body: {req_body}\n\
         \n\
         RESPONSE\n\
         Status: {status} {status_text}\n\
         Time: {time}ms\n\
         Size: {size} bytes\n\
         Body: {body}\n\
         \n\
         Answer with a JSON object holding:\n\
         - \"documentation\": a short summary of what the endpoint appears to do\n\
         - \"improvements\": performance or best-practice suggestions, as a list of strings\n\
         - \"security\": security suggestions, as a list of strings\n\
         - \"schemaUpdates\": schema or validation changes worth making\n\
         - \"codeSnippet\": a JavaScript fetch call reproducing the request\n\
         \n\
         Return only the JSON object.",
        method = request.method,
        url = request.url,
        headers = headers,
        params = params,
        req_body = request.body,
        status = response.status_code,
        status_text = response.status_text,
        time = response.time_ms,
        size = response.size_bytes,
        body = body,
    )
}

/// Output schema sent along with the prompt.
pub fn suggestion_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "documentation": { "type": "STRING" },
            "improvements": { "type": "ARRAY", "items": { "type": "STRING" } },
            "security": { "type": "ARRAY", "items": { "type": "STRING" } },
            "schemaUpdates": { "type": "STRING" },
            "codeSnippet": { "type": "STRING" }
        },
        "required": ["documentation", "improvements", "security", "schemaUpdates", "codeSnippet"]
    })
}

/// Parses model output, tolerating a surrounding markdown code fence.
pub fn parse_suggestion(text: &str) -> Result<Suggestion, AnalysisError> {
    let mut text = text.trim();
    if let Some(inner) = text.strip_prefix("```") {
        let inner = inner.strip_prefix("json").unwrap_or(inner);
        text = inner.strip_suffix("```").unwrap_or(inner).trim();
    }
    if text.is_empty() {
        return Err(AnalysisError::EmptyResponse);
    }
    Ok(serde_json::from_str(text)?)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
}

#[derive(Deserialize, Default)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Google Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiService {
    client: reqwest::Client,
    base_url: String,
}

impl GeminiService {
    pub fn new() -> Self {
        Self::new_with_base_url(DEFAULT_AI_BASE_URL)
    }

    pub fn new_with_base_url(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for GeminiService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReasoningService for GeminiService {
    async fn generate(
        &self,
        prompt: &str,
        schema: &Value,
        model: &str,
        credential: &SecretString,
    ) -> Result<String, AnalysisError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: schema,
            },
        };
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", credential.expose_secret())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        debug!("reasoning service returned {} characters", text.len());
        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyResponse);
        }
        Ok(text)
    }
}
