use crate::error::GeminiAgentError;
use crate::types::{
    Diagnosis, DiagnoseRequest, GenerateContentResponse, ModelInfo, ModelList,
};
use crate::Result;
use serde_json::{json, Value};
use std::time::Duration;

// ---------------------------------------------------------------------------
// GeminiConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_base: String,
    pub api_key: String,
    /// Substring used to auto-select a model from the listing.
    pub name_hint: String,
    /// Model id retried once when the selected model fails with a quota or
    /// server error.
    pub fallback: Option<String>,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            api_key: api_key.into(),
            name_hint: "flash".to_string(),
            fallback: None,
            timeout: Duration::from_secs(60),
        }
    }
}

// ---------------------------------------------------------------------------
// GeminiClient
// ---------------------------------------------------------------------------

pub struct GeminiClient {
    client: reqwest::blocking::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(GeminiAgentError::MissingApiKey);
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    fn models_url(&self) -> String {
        format!("{}/models", self.config.api_base.trim_end_matches('/'))
    }

    fn generate_url(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            model
        )
    }

    // ---------------------------------------------------------------------------
    // Model selection
    // ---------------------------------------------------------------------------

    /// Models exposed by the endpoint that can serve `generateContent`.
    pub fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let response = self
            .client
            .get(self.models_url())
            .query(&[("key", self.config.api_key.as_str())])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeminiAgentError::HttpStatus {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        let list: ModelList = response.json()?;
        Ok(list
            .models
            .into_iter()
            .filter(ModelInfo::supports_generate_content)
            .collect())
    }

    /// Pick the model whose name contains the configured hint, else the
    /// first one listed.
    pub fn pick_model(&self, models: &[ModelInfo]) -> Result<String> {
        let hint = self.config.name_hint.as_str();
        models
            .iter()
            .find(|m| m.short_name().contains(hint))
            .or_else(|| models.first())
            .map(|m| m.short_name().to_string())
            .ok_or(GeminiAgentError::NoModels)
    }

    // ---------------------------------------------------------------------------
    // Generation
    // ---------------------------------------------------------------------------

    /// One `generateContent` call. Returns the concatenated text parts of
    /// the first candidate.
    pub fn generate(&self, model: &str, request: &DiagnoseRequest) -> Result<String> {
        let body = build_generate_body(request);
        let response = self
            .client
            .post(self.generate_url(model))
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeminiAgentError::HttpStatus {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        let raw = response.text()?;
        parse_generate_response(&raw)
    }

    /// Auto-select a model and run the request, retrying once against the
    /// configured fallback model on quota or server failures.
    pub fn diagnose(&self, request: &DiagnoseRequest) -> Result<Diagnosis> {
        let models = self.list_models()?;
        let model = self.pick_model(&models)?;

        match self.generate(&model, request) {
            Ok(text) => Ok(Diagnosis { model, text }),
            Err(e) if e.is_retryable() => {
                let Some(fallback) = self.config.fallback.clone() else {
                    return Err(e);
                };
                if fallback == model {
                    return Err(e);
                }
                tracing::warn!(error = %e, %model, %fallback, "retrying with fallback model");
                let text = self.generate(&fallback, request)?;
                Ok(Diagnosis {
                    model: fallback,
                    text,
                })
            }
            Err(e) => Err(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Body construction / response parsing
// ---------------------------------------------------------------------------

fn build_generate_body(request: &DiagnoseRequest) -> Value {
    let mut parts = vec![json!({ "text": request.prompt })];
    if let Some(image) = &request.image {
        parts.push(json!({
            "inlineData": {
                "mimeType": image.mime_type,
                "data": image.data,
            }
        }));
    }
    json!({
        "contents": [{
            "role": "user",
            "parts": parts,
        }]
    })
}

fn parse_generate_response(raw: &str) -> Result<String> {
    let parsed: GenerateContentResponse = serde_json::from_str(raw)?;
    let candidate = parsed
        .candidates
        .and_then(|mut c| if c.is_empty() { None } else { Some(c.remove(0)) })
        .ok_or_else(|| {
            GeminiAgentError::InvalidResponse("response contained no candidates".to_string())
        })?;

    let parts = candidate
        .content
        .and_then(|content| content.parts)
        .unwrap_or_default();

    let text: Vec<String> = parts.into_iter().filter_map(|p| p.text).collect();
    if text.is_empty() {
        return Err(GeminiAgentError::InvalidResponse(
            "candidate contained no text parts".to_string(),
        ));
    }
    Ok(text.join(""))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
