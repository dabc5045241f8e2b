use std::fmt;
use std::str::FromStr;

use serde_json::{json, Value};

use crate::ProbeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vendor {
    OpenAiCompatible,
    Anthropic,
    Gemini,
}

/// Gemini tools that run server-side; nothing is simulated locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinTool {
    GoogleSearch,
    UrlContext,
}

impl BuiltinTool {
    pub fn stanza(self) -> Value {
        match self {
            BuiltinTool::GoogleSearch => json!({ "googleSearch": {} }),
            BuiltinTool::UrlContext => json!({ "urlContext": {} }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scenario {
    #[default]
    OpenAiTools,
    AnthropicTools,
    GeminiTools,
    GeminiSearch,
    GeminiUrlContext,
}

impl Scenario {
    pub const ALL: [Scenario; 5] = [
        Scenario::OpenAiTools,
        Scenario::AnthropicTools,
        Scenario::GeminiTools,
        Scenario::GeminiSearch,
        Scenario::GeminiUrlContext,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Scenario::OpenAiTools => "openai_tools",
            Scenario::AnthropicTools => "anthropic_tools",
            Scenario::GeminiTools => "gemini_tools",
            Scenario::GeminiSearch => "gemini_search",
            Scenario::GeminiUrlContext => "gemini_url_context",
        }
    }

    pub fn vendor(self) -> Vendor {
        match self {
            Scenario::OpenAiTools => Vendor::OpenAiCompatible,
            Scenario::AnthropicTools => Vendor::Anthropic,
            Scenario::GeminiTools | Scenario::GeminiSearch | Scenario::GeminiUrlContext => {
                Vendor::Gemini
            }
        }
    }

    /// `Some` for the single-step Gemini scenarios.
    pub fn builtin_tool(self) -> Option<BuiltinTool> {
        match self {
            Scenario::GeminiSearch => Some(BuiltinTool::GoogleSearch),
            Scenario::GeminiUrlContext => Some(BuiltinTool::UrlContext),
            _ => None,
        }
    }

    pub fn default_message(self) -> &'static str {
        match self {
            Scenario::OpenAiTools | Scenario::AnthropicTools | Scenario::GeminiTools => {
                "What is the current time?"
            }
            Scenario::GeminiSearch => "Search for the latest Gemini flagship model.",
            Scenario::GeminiUrlContext => {
                "What are the features of this tool? https://ai.google.dev/gemini-api/docs/url-context"
            }
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Scenario {
    type Err = ProbeError;

    /// Accepts `openai_tools` as well as `openai-tools`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_").to_ascii_lowercase();
        Scenario::ALL
            .into_iter()
            .find(|sc| sc.id() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Scenario::ALL.iter().map(|sc| sc.id()).collect();
                ProbeError::Validation(format!(
                    "unknown scenario '{s}', expected one of: {}",
                    known.join(", ")
                ))
            })
    }
}
