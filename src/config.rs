use std::env;
use std::str::FromStr;

use thiserror::Error;

pub const TEXT_CREDENTIAL: &str = "GOOGLE_API_KEY";
pub const DALLE_CREDENTIAL: &str = "OPENAI_API_KEY";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} is not configured in environment variables.")]
    MissingCredential(&'static str),
    #[error("invalid value {value:?} for {name}: {reason}")]
    Invalid { name: &'static str, value: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageMode {
    Dalle,
    Gemini,
    Placeholder,
}

impl FromStr for ImageMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dalle" | "dall-e" | "openai" => Ok(ImageMode::Dalle),
            "gemini" => Ok(ImageMode::Gemini),
            "placeholder" | "demo" => Ok(ImageMode::Placeholder),
            other => Err(format!("expected dalle, gemini or placeholder, got {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
    pub project_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub image_model: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub google_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub gemini: GeminiConfig,
    pub openai: OpenAiConfig,
    pub image_mode: ImageMode,
    pub port: u16,
    pub defer_credential_check: bool,
}

fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn var_or(name: &str, default: &str) -> String {
    var(name).unwrap_or_else(|| default.to_string())
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match var(name) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
            value,
        }),
    }
}

impl Config {
    /// Reads configuration from the process environment. Credentials may be
    /// absent here; see [`Config::require_credentials`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            google_api_key: var(TEXT_CREDENTIAL),
            openai_api_key: var(DALLE_CREDENTIAL),
            gemini: GeminiConfig {
                base_url: var_or("GEMINI_API_BASE", "https://generativelanguage.googleapis.com/v1beta"),
                text_model: var_or("GEMINI_TEXT_MODEL", "gemini-1.5-pro-latest"),
                image_model: var_or("GEMINI_IMAGE_MODEL", "gemini-2.5-flash-image-preview"),
                project_id: var("GOOGLE_CLOUD_PROJECT"),
            },
            openai: OpenAiConfig {
                base_url: var_or("OPENAI_API_BASE", "https://api.openai.com/v1"),
                image_model: var_or("OPENAI_IMAGE_MODEL", "dall-e-3"),
            },
            image_mode: parse_var("IMAGE_PROVIDER", ImageMode::Dalle)?,
            port: parse_var("PORT", 8080u16)?,
            defer_credential_check: parse_var("DEFER_CREDENTIAL_CHECK", false)?,
        })
    }

    /// Credential the image pipeline needs in the configured mode, if any.
    pub fn image_credential(&self) -> Option<(&'static str, Option<&str>)> {
        match self.image_mode {
            ImageMode::Dalle => Some((DALLE_CREDENTIAL, self.openai_api_key.as_deref())),
            ImageMode::Gemini => Some((TEXT_CREDENTIAL, self.google_api_key.as_deref())),
            ImageMode::Placeholder => None,
        }
    }

    /// Fails when a provider the server will route to has no credential.
    pub fn require_credentials(&self) -> Result<(), ConfigError> {
        if self.google_api_key.is_none() {
            return Err(ConfigError::MissingCredential(TEXT_CREDENTIAL));
        }
        if let Some((name, None)) = self.image_credential() {
            return Err(ConfigError::MissingCredential(name));
        }
        Ok(())
    }
}
