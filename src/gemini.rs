use async_trait::async_trait;
use serde_json::json;
use serde::Deserialize;
use reqwest::Client;
use tracing::{info, error};

use crate::config::GeminiConfig;
use crate::models::ImageResult;
use crate::provider::{ImageGenerator, ProviderError, TextGenerator};

// Helper function to truncate base64 data in JSON for cleaner logging
fn truncate_base64_in_json(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                if key == "data" {
                    if let serde_json::Value::String(s) = val {
                        if s.len() > 100 && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '=') {
                            *val = serde_json::Value::String(format!("{}...[truncated {} chars]", &s[..50], s.len() - 50));
                        }
                    }
                } else {
                    truncate_base64_in_json(val);
                }
            }
        }
        serde_json::Value::Array(arr) => {
            for val in arr.iter_mut() {
                truncate_base64_in_json(val);
            }
        }
        _ => {}
    }
}

fn log_preview(response_text: &str) -> String {
    if response_text.len() <= 1000 {
        return response_text.to_string();
    }
    match serde_json::from_str::<serde_json::Value>(response_text) {
        Ok(mut json_value) => {
            truncate_base64_in_json(&mut json_value);
            json_value.to_string()
        }
        Err(_) => format!("{}...", response_text.chars().take(1000).collect::<String>()),
    }
}

pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    text_model: String,
    image_model: String,
    project_id: Option<String>,
}

impl GeminiClient {
    pub fn new(api_key: String, config: &GeminiConfig) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
            project_id: config.project_id.clone(),
        }
    }

    async fn generate_content(&self, model: &str, request_body: serde_json::Value) -> Result<GeminiResponse, ProviderError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        info!("🔗 Making request to: {}", url);

        let mut request = self.client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body);
        if let Some(project) = &self.project_id {
            request = request.header("x-goog-user-project", project);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.without_url().to_string()))?;

        let status = response.status();
        info!("📥 Response status: {}", status);

        let response_text = response.text().await
            .map_err(|e| ProviderError::Http(e.without_url().to_string()))?;

        if !status.is_success() {
            error!("❌ API Error response: {}", response_text);
            return Err(ProviderError::Status { status: status.as_u16(), body: response_text });
        }

        info!("📥 Raw Gemini API response: {}", log_preview(&response_text));

        serde_json::from_str(&response_text)
            .map_err(|e| ProviderError::Other(format!("parse error: {}", e)))
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate_text(&self, prompt: &str) -> Result<String, ProviderError> {
        info!("Generating text with Gemini model {}...", self.text_model);

        let payload = json!({
            "contents": [{
                "parts": [{"text": prompt}]
            }]
        });

        let parsed = self.generate_content(&self.text_model, payload).await?;
        extract_first_text(&parsed)
            .ok_or_else(|| ProviderError::Other("No text content found in response".to_string()))
    }
}

#[async_trait]
impl ImageGenerator for GeminiClient {
    async fn generate_image(&self, prompt: &str) -> Result<ImageResult, ProviderError> {
        info!("Generating image with Gemini model {}...", self.image_model);

        let payload = json!({
            "contents": [{
                "parts": [{"text": prompt}]
            }],
            "generationConfig": {
                "responseModalities": ["TEXT", "IMAGE"],
                "candidateCount": 1
            }
        });

        let parsed = self.generate_content(&self.image_model, payload).await?;
        let image_data = extract_first_image_b64(&parsed)
            .ok_or_else(|| ProviderError::Other("no image data in response".into()))?;

        let image_type = if image_data.starts_with("PHN2Zyg") {
            "SVG"
        } else if image_data.starts_with("iVBORw0KGgo") {
            "PNG"
        } else if image_data.starts_with("/9j/") {
            "JPEG"
        } else {
            "Unknown"
        };
        info!("🖼️ Extracted {} image from API response ({} chars)", image_type, image_data.len());
        Ok(ImageResult::ImageBase64(image_data))
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
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData
    },
    Text { text: String },
    #[allow(dead_code)]
    Other(serde_json::Value)
}

#[derive(Debug, Deserialize)]
struct InlineData {
    data: String,
    #[serde(rename = "mimeType")]
    mime_type: String,
}

fn extract_first_text(resp: &GeminiResponse) -> Option<String> {
    let candidate = resp.candidates.first()?;
    candidate.content.parts.iter().find_map(|part| match part {
        Part::Text { text } => Some(text.trim().to_string()),
        _ => None,
    })
}

fn extract_first_image_b64(resp: &GeminiResponse) -> Option<String> {
    for c in &resp.candidates {
        for p in &c.content.parts {
            if let Part::Inline { inline_data } = p {
                info!("🎯 Found image data with mime type: {}", inline_data.mime_type);
                return Some(inline_data.data.clone());
            }
        }
    }
    info!("⚠️ No inline image data found in response structure");
    None
}
