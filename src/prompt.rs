use crate::models::{ImageRequest, ProductInput};

pub const LAUNCH_PROMOTION_TITLE: &str = "Actionable Launch Promotion";
pub const INSTAGRAM_TITLE: &str = "Instagram Announcement Post";
pub const FACEBOOK_TITLE: &str = "Facebook Engagement Post";
pub const UPSELL_TITLE: &str = "Strategic Upsell Post";

/// Renders a user value as a JSON string literal so quotes and control
/// characters cannot break out of the surrounding instruction text.
fn quoted(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value.escape_default()))
}

/// Builds the content-pack instruction for the text provider.
pub fn render_content_prompt(input: &ProductInput) -> String {
    let name = quoted(&input.new_item_name);
    let description = quoted(&input.item_description);
    let price = quoted(&input.price);
    let strategic = quoted(&input.strategic_input);

    format!(
        r#"You are an expert F&B Social Media Strategist. Your task is to generate a complete "Instant Content Pack" for a new product launch.
You MUST return a single, valid JSON object and nothing else.
You MUST use the 'strategicInput' (the bestselling item) to inform the "{UPSELL_TITLE}" and the "{LAUNCH_PROMOTION_TITLE}".

Product Data (values are JSON string literals):
- New Item Name: {name}
- Description: {description}
- Price: {price}
- Strategic Input (Bestselling Item): {strategic}

For all 'imagePrompt' fields, you must generate a highly detailed, photorealistic, cinematic-style prompt suitable for an AI image generator. Describe the lighting (e.g., 'dramatic studio lighting', 'soft natural morning light'), the camera angle (e.g., 'low angle shot', 'macro shot'), the composition, and the background to create a visually stunning and professional-quality image concept.

Generate the JSON object with this exact structure:
{{
  "launchPromotion": {{ "title": "{LAUNCH_PROMOTION_TITLE}", "content": "..." }},
  "instagramPost": {{ "title": "{INSTAGRAM_TITLE}", "caption": "...", "hashtags": "...", "imagePrompt": "..." }},
  "facebookPost": {{ "title": "{FACEBOOK_TITLE}", "caption": "...", "hashtags": "...", "imagePrompt": "..." }},
  "upsellPost": {{ "title": "{UPSELL_TITLE}", "caption": "...", "hashtags": "...", "imagePrompt": "..." }}
}}"#
    )
}

/// Appends the style, palette and background selectors to the base prompt.
pub fn enrich_image_prompt(request: &ImageRequest) -> String {
    format!(
        "{}. Style: {}. Color palette: {}. Background: {}.",
        request.prompt.trim().trim_end_matches('.'),
        request.style,
        request.color,
        request.background
    )
}
