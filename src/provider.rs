use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::ImageResult;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("status={status} body={body}")] Status { status: u16, body: String },
    #[error("HTTP error: {0}")] Http(String),
    #[error("{0}")] Other(String),
}

impl ProviderError {
    /// HTTP status returned by the provider, when it answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ProviderError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, prompt: &str) -> Result<String, ProviderError>;
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate_image(&self, prompt: &str) -> Result<ImageResult, ProviderError>;
}

/// A provider that is either usable or known to lack its credential.
pub enum ProviderSlot<T: ?Sized> {
    Ready(Arc<T>),
    Missing(&'static str),
}

impl<T: ?Sized> Clone for ProviderSlot<T> {
    fn clone(&self) -> Self {
        match self {
            ProviderSlot::Ready(p) => ProviderSlot::Ready(Arc::clone(p)),
            ProviderSlot::Missing(name) => ProviderSlot::Missing(*name),
        }
    }
}
