//! Vendor endpoint URLs. Pure string work, no I/O.

pub fn strip_trailing_slash(base: &str) -> &str {
    base.trim_end_matches('/')
}

/// OpenAI-compatible chat completions endpoint.
pub fn build_endpoint(base: &str) -> String {
    format!("{}/v1/chat/completions", strip_trailing_slash(base))
}

/// Gemini `generateContent`; the key travels in the query string.
pub fn build_gemini_endpoint(base: &str, model: &str, api_key: &str) -> String {
    format!(
        "{}/v1beta/models/{}:generateContent?key={}",
        strip_trailing_slash(base),
        urlencoding::encode(model),
        urlencoding::encode(api_key)
    )
}

pub fn build_anthropic_endpoint(base: &str) -> String {
    format!("{}/v1/messages", strip_trailing_slash(base))
}

/// Keeps the first 7 and last 4 characters. Short keys are fully hidden.
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() < 10 {
        return "***".to_string();
    }
    let head: String = chars[..7].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// Replaces the `key=` query value so Gemini URLs can be logged.
pub fn mask_url_key(url: &str) -> String {
    let Some(start) = url.find("key=").map(|i| i + "key=".len()) else {
        return url.to_string();
    };
    let end = url[start..].find('&').map(|i| start + i).unwrap_or(url.len());
    let key = urlencoding::decode(&url[start..end])
        .map(|k| k.into_owned())
        .unwrap_or_else(|_| url[start..end].to_string());
    format!("{}{}{}", &url[..start], mask_api_key(&key), &url[end..])
}
