use crate::config::GeminiSettings;
use crate::provider::{ImageGenerator, ProviderError, TextGenerator};
use async_trait::async_trait;
use base64::Engine;
use bytes::Bytes;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info};

// Short preview of a large payload for logging
pub(crate) fn preview(data: &str) -> String {
    match data.char_indices().nth(50) {
        Some((cut, _)) => format!("{}...[{} chars total]", &data[..cut], data.len()),
        None => data.to_string(),
    }
}

pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    text_model: String,
    image_model: String,
}

impl GeminiClient {
    /// Provider calls carry no client-side timeout; they fail only when the
    /// request itself errors.
    pub fn new(settings: &GeminiSettings) -> Self {
        Self {
            client: Client::new(),
            api_key: settings.api_key.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            text_model: settings.text_model.clone(),
            image_model: settings.image_model.clone(),
        }
    }

    fn url(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}?key={}", self.base_url, model, method, self.api_key)
    }

    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<String, ProviderError> {
        debug!("🔗 Making request to: {}", url.replace(&self.api_key, "***"));

        let response = self.client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        let status = response.status();
        let response_text = response.text().await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        if !status.is_success() {
            error!("❌ Gemini API error {}: {}", status, response_text);
            return Err(ProviderError::Api(format!("status={} body={}", status, response_text)));
        }
        Ok(response_text)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate_text(&self, system: &str, prompt: &str) -> Result<String, ProviderError> {
        info!(model = %self.text_model, prompt_len = prompt.len(), "Generating text with Gemini API...");

        let payload = json!({
            "systemInstruction": {
                "parts": [{"text": system}]
            },
            "contents": [{
                "role": "user",
                "parts": [{"text": prompt}]
            }]
        });

        let url = self.url(&self.text_model, "generateContent");
        let response_text = self.post_json(&url, &payload).await?;
        let text = extract_text(&response_text)?;
        info!("✅ Text generated ({} chars)", text.len());
        Ok(text)
    }
}

#[async_trait]
impl ImageGenerator for GeminiClient {
    async fn generate_images(&self, prompt: &str, count: u32) -> Result<Vec<Bytes>, ProviderError> {
        info!(model = %self.image_model, count, "Generating image with Imagen API...");

        let payload = json!({
            "instances": [{"prompt": prompt}],
            "parameters": {"sampleCount": count}
        });

        let url = self.url(&self.image_model, "predict");
        let response_text = self.post_json(&url, &payload).await?;
        let images = extract_images(&response_text)?;
        info!("🖼️ Received {} image(s)", images.len());
        Ok(images)
    }
}

// --- Response Parsing Helpers ---

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate { #[serde(default)] content: Content }

#[derive(Debug, Deserialize, Default)]
struct Content { #[serde(default)] parts: Vec<Part> }

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    Other(serde_json::Value),
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    #[serde(rename = "bytesBase64Encoded", default)]
    bytes_base64_encoded: Option<String>,
    #[serde(rename = "mimeType", default)]
    mime_type: Option<String>,
}

/// First text part of the first candidate that has one.
fn extract_text(response_text: &str) -> Result<String, ProviderError> {
    let parsed: GeminiResponse = serde_json::from_str(response_text)
        .map_err(|e| ProviderError::InvalidResponse(format!("parse error: {}", e)))?;

    for candidate in &parsed.candidates {
        for part in &candidate.content.parts {
            if let Part::Text { text } = part {
                return Ok(text.trim().to_string());
            }
        }
    }
    Err(ProviderError::InvalidResponse("No text content found in response".to_string()))
}

/// Decodes every prediction carrying image bytes; predictions without bytes
/// (e.g. filtered by safety settings) are skipped.
fn extract_images(response_text: &str) -> Result<Vec<Bytes>, ProviderError> {
    let parsed: PredictResponse = serde_json::from_str(response_text)
        .map_err(|e| ProviderError::InvalidResponse(format!("parse error: {}", e)))?;

    let mut images = Vec::new();
    for prediction in parsed.predictions {
        let Some(data) = prediction.bytes_base64_encoded else { continue };
        debug!(
            "🎯 Found image data with mime type {}: {}",
            prediction.mime_type.as_deref().unwrap_or("unknown"),
            preview(&data)
        );
        let raw = base64::engine::general_purpose::STANDARD
            .decode(data.as_bytes())
            .map_err(|e| ProviderError::InvalidResponse(format!("bad image encoding: {}", e)))?;
        images.push(Bytes::from(raw));
    }
    Ok(images)
}
