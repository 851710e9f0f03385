/// Isolates the JSON object in a provider reply.
///
/// Removes code-fence markers (tagged or not), trims, then keeps the span from
/// the first `{` to the last `}`. When no ordered brace pair exists the trimmed
/// text is returned unchanged. A best-effort heuristic: it assumes one
/// top-level object with any commentary strictly outside its braces.
pub fn clean_provider_text(raw: &str) -> String {
    let unfenced = raw.replace("```json", "").replace("```", "");
    let trimmed = unfenced.trim();

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if end > start => trimmed[start..=end].to_string(),
        _ => trimmed.to_string(),
    }
}
