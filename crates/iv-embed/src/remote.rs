//! JSON inference endpoint client.
//!
//! Request body: `{"inputImage": "<base64>"}` or `{"inputText": "..."}` plus
//! `{"embeddingConfig": {"outputEmbeddingLength": N}}`. Response body carries
//! the vector under `embedding`; other fields are ignored.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use iv_core::EmbeddingConfig;

use crate::error::{EmbedError, Result};
use crate::traits::{check_dimension, read_image, EmbedInput, Embedder};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EmbedRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_text: Option<&'a str>,
    pub embedding_config: OutputConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OutputConfig {
    pub output_embedding_length: usize,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Option<Vec<f32>>,
}

/// Embedder backed by a remote multimodal model.
pub struct RemoteEmbedder {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    dimension: usize,
    api_key: Option<String>,
}

impl RemoteEmbedder {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, dimension: usize, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            dimension,
            api_key: None,
        })
    }

    /// Send `Authorization: Bearer <key>` with every request.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        let mut embedder = Self::new(
            config.endpoint.clone(),
            config.model.clone(),
            config.dimension,
            Duration::from_secs(config.timeout_secs.max(1)),
        )?;
        if let Some(var) = &config.api_key_env {
            match std::env::var(var) {
                Ok(key) if !key.is_empty() => embedder = embedder.with_api_key(key),
                _ => warn!(var = %var, "api key variable not set, sending unauthenticated requests"),
            }
        }
        Ok(embedder)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn invoke(&self, body: &EmbedRequest<'_>) -> Result<Vec<f32>> {
        let mut req = self.client.post(&self.endpoint).json(body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(EmbedError::Service {
                status: status.as_u16(),
                body: text,
            });
        }
        let vector = parse_response(&text)?;
        check_dimension(&vector, self.dimension)?;
        Ok(vector)
    }
}

/// Build the request body for one input. Image bytes are base64 encoded.
pub(crate) fn request_body<'a>(input: &'a EmbedInput, image_bytes: Option<&[u8]>, dimension: usize) -> EmbedRequest<'a> {
    let embedding_config = OutputConfig {
        output_embedding_length: dimension,
    };
    match input {
        EmbedInput::Image(_) => EmbedRequest {
            input_image: Some(BASE64.encode(image_bytes.unwrap_or_default())),
            input_text: None,
            embedding_config,
        },
        EmbedInput::Text(text) => EmbedRequest {
            input_image: None,
            input_text: Some(text.as_str()),
            embedding_config,
        },
    }
}

pub(crate) fn parse_response(body: &str) -> Result<Vec<f32>> {
    let parsed: EmbedResponse =
        serde_json::from_str(body).map_err(|e| EmbedError::InvalidResponse(e.to_string()))?;
    parsed
        .embedding
        .ok_or_else(|| EmbedError::InvalidResponse("missing `embedding` field".into()))
}

#[async_trait]
impl Embedder for RemoteEmbedder {
    async fn embed(&self, input: &EmbedInput) -> Result<Vec<f32>> {
        let bytes = match input {
            EmbedInput::Image(path) => Some(read_image(path).await?),
            EmbedInput::Text(_) => None,
        };
        let body = request_body(input, bytes.as_deref(), self.dimension);
        debug!(model = %self.model, endpoint = %self.endpoint, "requesting embedding");
        self.invoke(&body).await
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.model
    }
}
