use crate::ProbeError;

pub const HTML_HINT: &str = "The response looks like a web page; check your API URL.";

/// Response body and declared content type of a failed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPayload {
    pub text: String,
    pub content_type: String,
}

impl RawPayload {
    pub fn looks_like_html(&self) -> bool {
        if self.content_type.to_ascii_lowercase().contains("text/html") {
            return true;
        }
        let head = self.text.trim_start().to_ascii_lowercase();
        ["<!doctype", "<html", "<head", "<body"]
            .iter()
            .any(|tag| head.starts_with(tag))
    }

    /// Pretty JSON when declared and parseable, otherwise the body verbatim.
    pub fn panel_text(&self) -> String {
        if self.content_type.to_ascii_lowercase().contains("application/json") {
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(&self.text) {
                if let Ok(pretty) = serde_json::to_string_pretty(&value) {
                    return pretty;
                }
            }
        }
        self.text.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNotice {
    pub message: String,
    pub status: Option<u16>,
    pub raw: Option<RawPayload>,
}

impl ErrorNotice {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            raw: None,
        }
    }

    pub fn from_error(err: &ProbeError) -> Self {
        Self {
            message: format!("Error: {err}"),
            status: err.status(),
            raw: err.raw_payload().filter(|raw| !raw.text.is_empty()),
        }
    }

    pub fn hint(&self) -> Option<&'static str> {
        self.raw
            .as_ref()
            .filter(|raw| raw.looks_like_html())
            .map(|_| HTML_HINT)
    }

    /// Body of the collapsible "raw response" panel.
    pub fn panel(&self) -> Option<String> {
        self.raw.as_ref().map(RawPayload::panel_text)
    }
}
