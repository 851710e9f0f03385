use tracing::{info, warn};

use crate::extract::clean_provider_text;
use crate::models::{ContentPack, LaunchPromotion, PackSource, ProductInput, SocialPost};
use crate::prompt::{FACEBOOK_TITLE, INSTAGRAM_TITLE, LAUNCH_PROMOTION_TITLE, UPSELL_TITLE};

const CAPTION_DESCRIPTION_CHARS: usize = 100;

/// Strict decode: every section and every leaf must be present as a string.
pub fn decode_pack(cleaned: &str) -> Result<ContentPack, serde_json::Error> {
    serde_json::from_str(cleaned)
}

/// First 100 characters of `text`, with `...` appended only when cut.
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Template pack built from the request alone. Used when the provider reply
/// cannot be decoded; callers see the same shape either way.
pub fn fallback_pack(input: &ProductInput) -> ContentPack {
    let ProductInput { new_item_name: name, item_description: description, price, strategic_input: bestseller } = input;
    let short_description = truncate_chars(description, CAPTION_DESCRIPTION_CHARS);

    ContentPack {
        launch_promotion: LaunchPromotion {
            title: LAUNCH_PROMOTION_TITLE.to_string(),
            content: format!("Launch {name} with a strategic promotion connecting to your bestselling {bestseller} for maximum impact."),
        },
        instagram_post: SocialPost {
            title: INSTAGRAM_TITLE.to_string(),
            caption: format!("🚀 Introducing {name}! {short_description} Now available for {price}! #NewLaunch #FoodLover"),
            hashtags: "#foodie #newmenu #delicious #instafood".to_string(),
            image_prompt: format!("Professional food photography of {name} with dramatic studio lighting, appetizing composition, high-end restaurant presentation"),
        },
        facebook_post: SocialPost {
            title: FACEBOOK_TITLE.to_string(),
            caption: format!("Exciting news! We're thrilled to introduce {name} to our menu. {description} Available now for {price}. What's your favorite flavor combination?"),
            hashtags: "#newmenu #foodexperience #community".to_string(),
            image_prompt: format!("Lifestyle photo of {name} being enjoyed in a social setting with soft natural lighting"),
        },
        upsell_post: SocialPost {
            title: UPSELL_TITLE.to_string(),
            caption: format!("Perfect combo alert! Try our new {name} alongside our popular {bestseller} for the ultimate experience. Limited time offer!"),
            hashtags: "#combo #bestseller #limitedtime".to_string(),
            image_prompt: format!("Split composition showing {name} and {bestseller} side by side with professional food styling"),
        },
    }
}

/// Cleans and decodes a provider reply, falling back to the template pack.
/// Decode failures are logged here and never surface to the caller.
pub fn resolve_pack(raw: &str, input: &ProductInput) -> (ContentPack, PackSource) {
    let cleaned = clean_provider_text(raw);
    match decode_pack(&cleaned) {
        Ok(pack) => {
            info!("✅ Decoded content pack from provider reply ({} chars)", raw.len());
            (pack, PackSource::Provider)
        }
        Err(e) => {
            warn!("⚠️ Content pack decode failed: {}", e);
            warn!("Raw response: {}", raw);
            warn!("Cleaned text: {}", cleaned);
            info!("🔄 Falling back to template content pack for '{}'", input.new_item_name);
            (fallback_pack(input), PackSource::Fallback)
        }
    }
}
