use serde::{Serialize, Deserialize};

use crate::error::ApiError;

pub const DEFAULT_STYLE: &str = "Photorealistic";
pub const DEFAULT_COLOR: &str = "Vibrant";
pub const DEFAULT_BACKGROUND: &str = "Studio Backdrop";

/// Raw `/api/generate` body. Every field is optional here so that a missing
/// field is reported as a validation error instead of a body rejection.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    #[serde(default)]
    pub new_item_name: Option<String>,
    #[serde(default)]
    pub item_description: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub strategic_input: Option<String>, // the current bestseller
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub new_item_name: String,
    pub item_description: String,
    pub price: String,
    pub strategic_input: String,
}

impl ProductDraft {
    pub fn validate(self) -> Result<ProductInput, ApiError> {
        let mut missing = Vec::new();
        let mut take = |value: Option<String>, name: &'static str| match value {
            Some(v) if !v.is_empty() => v,
            _ => { missing.push(name); String::new() }
        };
        let input = ProductInput {
            new_item_name: take(self.new_item_name, "newItemName"),
            item_description: take(self.item_description, "itemDescription"),
            price: take(self.price, "price"),
            strategic_input: take(self.strategic_input, "strategicInput"),
        };
        if missing.is_empty() { Ok(input) } else { Err(ApiError::MissingFields(missing)) }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LaunchPromotion {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SocialPost {
    pub title: String,
    pub caption: String,
    pub hashtags: String,
    pub image_prompt: String,
}

/// The launch promotion plus the three platform posts. Every field is
/// required on decode, so a reply missing a section never becomes a pack.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentPack {
    pub launch_promotion: LaunchPromotion,
    pub instagram_post: SocialPost,
    pub facebook_post: SocialPost,
    pub upsell_post: SocialPost,
}

/// Where a content pack came from. Reported in the `x-content-source`
/// header; the body shape is identical for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackSource {
    Provider,
    Fallback,
}

impl PackSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackSource::Provider => "provider",
            PackSource::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedPack {
    pub pack: ContentPack,
    pub source: PackSource,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ImageDraft {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub background: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ImageRequest {
    pub prompt: String,
    pub style: String,
    pub color: String,
    pub background: String,
}

impl ImageDraft {
    pub fn validate(self) -> Result<ImageRequest, ApiError> {
        let prompt = match self.prompt {
            Some(p) if !p.trim().is_empty() => p,
            _ => return Err(ApiError::MissingFields(vec!["prompt"])),
        };
        Ok(ImageRequest {
            prompt,
            style: or_default(self.style, DEFAULT_STYLE),
            color: or_default(self.color, DEFAULT_COLOR),
            background: or_default(self.background, DEFAULT_BACKGROUND),
        })
    }
}

fn or_default(value: Option<String>, default: &str) -> String {
    value.filter(|v| !v.trim().is_empty()).unwrap_or_else(|| default.to_string())
}

/// Serializes as `{"imageUrl": ..}` or `{"imageBase64": ..}`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum ImageResult {
    ImageUrl(String),
    ImageBase64(String),
}
