use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::config::OpenAiConfig;
use crate::models::ImageResult;
use crate::provider::{ImageGenerator, ProviderError};

/// DALL-E image generation over the OpenAI images endpoint. Returns hosted URLs.
pub struct DalleClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl DalleClient {
    pub fn new(api_key: String, config: &OpenAiConfig) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.image_model.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    #[serde(default)]
    url: Option<String>,
}

#[async_trait]
impl ImageGenerator for DalleClient {
    async fn generate_image(&self, prompt: &str) -> Result<ImageResult, ProviderError> {
        let url = format!("{}/images/generations", self.base_url);
        info!("🔗 Requesting {} image from: {}", self.model, url);

        let request_body = json!({
            "model": self.model,
            "prompt": prompt,
            "n": 1,
            "size": "1024x1024",
            "quality": "hd"
        });

        let response = self.client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.without_url().to_string()))?;

        let status = response.status();
        info!("📥 Response status: {}", status);

        let response_text = response.text().await
            .map_err(|e| ProviderError::Http(e.without_url().to_string()))?;

        if !status.is_success() {
            error!("❌ Image API error response: {}", response_text);
            return Err(ProviderError::Status { status: status.as_u16(), body: response_text });
        }

        let parsed: ImagesResponse = serde_json::from_str(&response_text)
            .map_err(|e| ProviderError::Other(format!("parse error: {}", e)))?;

        let image_url = parsed.data.into_iter().next().and_then(|d| d.url)
            .ok_or_else(|| ProviderError::Other("No image URL received from DALL-E API".into()))?;

        info!("✅ Image generated: {}", image_url);
        Ok(ImageResult::ImageUrl(image_url))
    }
}
