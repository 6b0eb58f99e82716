//! Widget generation through an OpenAI-compatible chat completions API
//!
//! The generator is fail-soft at its outer edge: [`WidgetGenerator::generate`]
//! never returns an error. Any failure (missing credentials, transport,
//! HTTP status, unusable model output) becomes an `insight` widget carrying
//! a readable message so the preview always has something to show.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;
use widget_engine::catalog;
use widget_engine::types::is_layout_object;
use widget_engine::WidgetPayload;

use crate::config::GenerationConfig;

/// Which model tier to generate with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelChoice {
    #[default]
    Fast,
    Thorough,
}

impl ModelChoice {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "fast" => Some(Self::Fast),
            "thorough" => Some(Self::Thorough),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Thorough => "thorough",
        }
    }
}

/// Errors that can occur while generating a widget
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("No API key configured (set {0})")]
    MissingCredentials(&'static str),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Model response was not a widget: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        GenerationError::Http(e.to_string())
    }
}

/// Produces a widget payload from a natural-language prompt
#[async_trait]
pub trait WidgetGenerator: Send + Sync {
    /// Attempt a generation, reporting failures as errors
    async fn try_generate(
        &self,
        prompt: &str,
        model: ModelChoice,
    ) -> Result<Value, GenerationError>;

    /// Generate a payload, converting any failure into an insight widget
    async fn generate(&self, prompt: &str, model: ModelChoice) -> Value {
        match self.try_generate(prompt, model).await {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("Widget generation failed, using fallback: {}", e);
                fallback_payload(&e.to_string())
            }
        }
    }
}

/// The insight widget shown when generation fails
pub fn fallback_payload(message: &str) -> Value {
    let mut props = Map::new();
    props.insert("title".to_string(), json!("Generation failed"));
    props.insert("message".to_string(), json!(message));
    props.insert("tone".to_string(), json!("warning"));
    WidgetPayload::new("insight", props).into()
}

/// System prompt listing every catalog type and its purpose
pub fn system_prompt() -> String {
    let mut prompt = String::from(
        "You design widgets for a fitness coaching app. Reply with a single JSON \
         object and nothing else.\n\
         A widget is {\"type\": <type>, \"props\": {...}, \"thought\": <optional reasoning>}.\n\
         Several widgets may be combined in a layout: {\"type\": \"stack\"|\"grid\"|\"single\", \
         \"direction\": \"vertical\"|\"horizontal\", \"gap\": <number>, \"columns\": 1-12, \
         \"widgets\": [...]}.\n\nAvailable widget types:\n",
    );
    for schema in catalog::schemas() {
        prompt.push_str(&format!("- {}: {}\n", schema.kind, schema.description));
    }
    prompt
}

/// Pull the JSON object out of a model reply
///
/// Accepts bare JSON, fenced code blocks and prose around a single object.
pub fn extract_json(reply: &str) -> Result<Value, GenerationError> {
    let trimmed = reply.trim();
    let body = strip_fence(trimmed).unwrap_or(trimmed);

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return Ok(value);
    }

    let start = body.find('{');
    let end = body.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if start < end => serde_json::from_str(&body[start..=end])
            .map_err(|e| GenerationError::MalformedResponse(e.to_string())),
        _ => Err(GenerationError::MalformedResponse(
            "no JSON object in reply".to_string(),
        )),
    }
}

fn strip_fence(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("```")?;
    let rest = rest.split_once('\n').map(|(_, body)| body)?;
    let end = rest.rfind("```")?;
    Some(rest[..end].trim())
}

/// Check the decoded value has the shape of a payload root
fn ensure_payload(value: Value) -> Result<Value, GenerationError> {
    match value.as_object() {
        Some(object) if is_layout_object(object) => Ok(value),
        Some(object) if object.contains_key("type") => {
            serde_json::from_value::<WidgetPayload>(value.clone()).map_err(|e| {
                GenerationError::MalformedResponse(format!("not a widget: {}", e))
            })?;
            Ok(value)
        }
        Some(_) => Err(GenerationError::MalformedResponse(
            "object has neither `type` nor `widgets`".to_string(),
        )),
        None => Err(GenerationError::MalformedResponse(
            "reply is not a JSON object".to_string(),
        )),
    }
}

/// Generator backed by an OpenAI-compatible HTTP endpoint
pub struct HttpGenerator {
    config: GenerationConfig,
    http_client: reqwest::Client,
}

impl HttpGenerator {
    pub fn new(config: GenerationConfig) -> Result<Self, GenerationError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            config,
            http_client,
        })
    }

    fn model_name(&self, model: ModelChoice) -> &str {
        match model {
            ModelChoice::Fast => &self.config.fast_model,
            ModelChoice::Thorough => &self.config.thorough_model,
        }
    }

    fn request_body(&self, prompt: &str, model: ModelChoice) -> Value {
        json!({
            "model": self.model_name(model),
            "messages": [
                { "role": "system", "content": system_prompt() },
                { "role": "user", "content": prompt }
            ],
            "temperature": 0.4,
            "stream": false
        })
    }
}

#[async_trait]
impl WidgetGenerator for HttpGenerator {
    async fn try_generate(
        &self,
        prompt: &str,
        model: ModelChoice,
    ) -> Result<Value, GenerationError> {
        let api_key = self
            .config
            .resolved_api_key()
            .ok_or(GenerationError::MissingCredentials(crate::config::API_KEY_ENV))?;

        let url = format!(
            "{}/chat/completions",
            self.config.endpoint.trim_end_matches('/')
        );
        log::debug!(
            "Generating widget with {} model via {}",
            model.as_str(),
            url
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(api_key)
            .json(&self.request_body(prompt, model))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api { status, body });
        }

        let json: Value = response.json().await?;
        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                GenerationError::MalformedResponse("missing message content".to_string())
            })?;

        let payload = ensure_payload(extract_json(content)?)?;
        log::info!("Generated widget ({} chars of model output)", content.len());
        Ok(payload)
    }
}

/// Generator that replays a fixed payload, useful offline and in tests
pub struct StaticGenerator {
    payload: Map<String, Value>,
}

impl StaticGenerator {
    pub fn new(payload: Map<String, Value>) -> Self {
        Self { payload }
    }
}

#[async_trait]
impl WidgetGenerator for StaticGenerator {
    async fn try_generate(
        &self,
        _prompt: &str,
        _model: ModelChoice,
    ) -> Result<Value, GenerationError> {
        ensure_payload(Value::Object(self.payload.clone()))
    }
}
