use async_trait::async_trait;
use base64::Engine;
use tracing::info;

use crate::models::ImageResult;
use crate::provider::{ImageGenerator, ProviderError};

const PALETTE: [&str; 5] = [
    "#F97316", // orange
    "#EF4444", // red
    "#10B981", // green
    "#3B82F6", // blue
    "#8B5CF6", // purple
];
const LINE_CHARS: usize = 48;
const MAX_LINES: usize = 6;

/// Demo image provider: renders the prompt into an SVG card, no network.
#[derive(Debug, Default, Clone)]
pub struct PlaceholderImages;

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if c.is_control() => out.push(' '),
            c => out.push(c),
        }
    }
    out
}

/// Greedy word wrap, capped at `MAX_LINES` with an ellipsis on the last line.
fn wrap(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = current.chars().count() + word.chars().count() + usize::from(!current.is_empty());
        if needed > LINE_CHARS && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word.chars().take(LINE_CHARS).collect::<String>());
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.len() > MAX_LINES {
        lines.truncate(MAX_LINES);
        if let Some(last) = lines.last_mut() {
            last.push_str(" …");
        }
    }
    lines
}

pub fn render_placeholder_svg(prompt: &str) -> String {
    let color = PALETTE[prompt.len() % PALETTE.len()];
    let lines = wrap(prompt);
    let first_y = 260 - (lines.len() as i32 * 12);
    let caption: String = lines
        .iter()
        .enumerate()
        .map(|(i, line)| format!(
            r#"<tspan x="256" y="{}">{}</tspan>"#,
            first_y + i as i32 * 24,
            escape_xml(line)
        ))
        .collect();

    format!(r#"<svg width="512" height="512" xmlns="http://www.w3.org/2000/svg">
    <defs>
        <linearGradient id="grad" x1="0%" y1="0%" x2="100%" y2="100%">
            <stop offset="0%" style="stop-color:{color};stop-opacity:1" />
            <stop offset="100%" style="stop-color:{color};stop-opacity:0.6" />
        </linearGradient>
    </defs>
    <rect width="512" height="512" fill="url(#grad)" />
    <text x="256" y="80" font-family="Arial, sans-serif" font-size="24" font-weight="bold" text-anchor="middle" fill="white">📸 Image Preview</text>
    <text font-family="Arial, sans-serif" font-size="16" text-anchor="middle" fill="white">{caption}</text>
    <text x="256" y="470" font-family="Arial, sans-serif" font-size="12" text-anchor="middle" fill="white" opacity="0.8">Placeholder - no image provider configured</text>
</svg>"#)
}

#[async_trait]
impl ImageGenerator for PlaceholderImages {
    async fn generate_image(&self, prompt: &str) -> Result<ImageResult, ProviderError> {
        info!("Using placeholder mode - no real images generated");
        let svg = render_placeholder_svg(prompt);
        let encoded = base64::engine::general_purpose::STANDARD.encode(svg.as_bytes());
        info!("📦 Generated placeholder image ({} chars)", encoded.len());
        Ok(ImageResult::ImageBase64(encoded))
    }
}
