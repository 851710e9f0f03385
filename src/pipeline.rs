use tracing::info;

use crate::error::{ApiError, Pipeline};
use crate::models::{GeneratedPack, ImageDraft, ImageResult, ProductDraft};
use crate::pack::resolve_pack;
use crate::prompt::{enrich_image_prompt, render_content_prompt};
use crate::provider::{ImageGenerator, ProviderSlot, TextGenerator};

/// Validates the draft, renders the prompt, calls the text provider once and
/// turns its reply into a content pack. Credential and field checks run
/// before the provider is touched.
pub async fn generate_content_pack(
    text: &ProviderSlot<dyn TextGenerator>,
    draft: ProductDraft,
) -> Result<GeneratedPack, ApiError> {
    let provider = match text {
        ProviderSlot::Ready(provider) => provider,
        ProviderSlot::Missing(name) => return Err(ApiError::MissingCredential(Pipeline::Content, *name)),
    };
    let input = draft.validate()?;

    info!("🚀 Generating content pack for: {}", input.new_item_name);
    let prompt = render_content_prompt(&input);

    let raw = provider
        .generate_text(&prompt)
        .await
        .map_err(|source| ApiError::Provider { pipeline: Pipeline::Content, source })?;

    let (pack, source) = resolve_pack(&raw, &input);
    info!("✅ Content pack ready for '{}' (source: {})", input.new_item_name, source.as_str());
    Ok(GeneratedPack { pack, source })
}

pub async fn generate_image(
    image: &ProviderSlot<dyn ImageGenerator>,
    draft: ImageDraft,
) -> Result<ImageResult, ApiError> {
    let provider = match image {
        ProviderSlot::Ready(provider) => provider,
        ProviderSlot::Missing(name) => return Err(ApiError::MissingCredential(Pipeline::Image, *name)),
    };
    let request = draft.validate()?;

    let prompt = enrich_image_prompt(&request);
    info!("🎯 Generating image with prompt: {}", prompt.chars().take(120).collect::<String>());

    provider
        .generate_image(&prompt)
        .await
        .map_err(|source| ApiError::Provider { pipeline: Pipeline::Image, source })
}
