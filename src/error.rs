use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use serde_with::skip_serializing_none;
use thiserror::Error;

use crate::provider::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipeline {
    Content,
    Image,
}

impl Pipeline {
    fn failure_title(&self) -> &'static str {
        match self {
            Pipeline::Content => "Failed to generate AI content.",
            Pipeline::Image => "Failed to generate image.",
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{1} is not configured in environment variables.")]
    MissingCredential(Pipeline, &'static str),
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
    #[error("{source}")]
    Provider { pipeline: Pipeline, #[source] source: ProviderError },
    #[error("{0}")]
    Unknown(String),
}

#[skip_serializing_none]
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub details: String,
    pub raw: Option<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFields(_) | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Provider { pipeline: Pipeline::Image, source } => match source.status_code() {
                Some(400) => StatusCode::BAD_REQUEST,
                Some(401) => StatusCode::UNAUTHORIZED,
                Some(429) => StatusCode::TOO_MANY_REQUESTS,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> ErrorBody {
        match self {
            ApiError::MissingCredential(pipeline, _) => ErrorBody {
                error: pipeline.failure_title().to_string(),
                details: self.to_string(),
                raw: None,
            },
            ApiError::Unknown(msg) => ErrorBody {
                error: "An unknown server error occurred.".to_string(),
                details: msg.clone(),
                raw: None,
            },
            ApiError::MissingFields(_) => ErrorBody {
                error: "Incomplete request: missing required fields.".to_string(),
                details: self.to_string(),
                raw: None,
            },
            ApiError::InvalidBody(msg) => ErrorBody {
                error: "Invalid request body.".to_string(),
                details: msg.clone(),
                raw: None,
            },
            ApiError::Provider { pipeline: Pipeline::Content, source } => ErrorBody {
                error: Pipeline::Content.failure_title().to_string(),
                details: source.to_string(),
                raw: None,
            },
            ApiError::Provider { pipeline: Pipeline::Image, source } => ErrorBody {
                error: Pipeline::Image.failure_title().to_string(),
                details: image_failure_hint(source),
                raw: Some(source.to_string()),
            },
        }
    }
}

fn image_failure_hint(source: &ProviderError) -> String {
    match source.status_code() {
        Some(400) => "Bad request - check your prompt and API key. Common issues: prompt too long, content policy violation, or insufficient credits.".to_string(),
        Some(401) => "Invalid API key. Please check your image provider API key configuration.".to_string(),
        Some(429) => "Rate limit exceeded or insufficient credits. Please check your image provider account balance.".to_string(),
        _ => source.to_string(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("❌ Request failed ({}): {}", status, self);
        } else {
            tracing::warn!("⚠️ Request rejected ({}): {}", status, self);
        }
        (status, Json(self.body())).into_response()
    }
}
