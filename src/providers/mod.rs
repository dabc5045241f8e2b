pub mod anthropic;
pub mod gemini;
pub mod openai;

pub use anthropic::AnthropicAdapter;
pub use gemini::GeminiAdapter;
pub use openai::OpenAiAdapter;

use serde_json::{json, Value};

use crate::scenario::Vendor;
use crate::settings::Connection;
use crate::{ProbeError, Tool};

/// A tool call the model asked for, pulled out of a vendor response.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub id: Option<String>,
    pub name: String,
    pub args: Value,
    /// The vendor's own block, echoed back where the follow-up needs it.
    pub raw: Value,
}

/// Everything that differs between vendors in the tool-call round trip.
/// Implementations are pure: they build and read JSON, the orchestrator does
/// the sending.
pub trait VendorAdapter: Send + Sync {
    fn vendor_name(&self) -> &'static str;

    fn endpoint(&self, conn: &Connection) -> String;

    fn auth_headers(&self, conn: &Connection) -> Vec<(&'static str, String)>;

    /// The user turn as the vendor expects it inside the conversation.
    fn user_turn(&self, user_text: &str) -> Value;

    fn first_request(&self, model: &str, user_text: &str, tools: &[&dyn Tool]) -> Value;

    /// The assistant turn of a response, for display and for the follow-up.
    fn assistant_turn(&self, response: &Value) -> Result<Option<Value>, ProbeError>;

    fn detect_invocation(&self, response: &Value) -> Result<Option<Invocation>, ProbeError>;

    fn tool_result_turn(&self, invocation: &Invocation, result: &Value) -> Value;

    fn followup_request(
        &self,
        model: &str,
        user_text: &str,
        tools: &[&dyn Tool],
        assistant_turn: &Value,
        invocation: &Invocation,
        result: &Value,
    ) -> Value;

    fn final_answer(&self, response: &Value) -> Option<Value>;
}

pub fn adapter_for(vendor: Vendor) -> Box<dyn VendorAdapter> {
    match vendor {
        Vendor::OpenAiCompatible => Box::new(OpenAiAdapter),
        Vendor::Anthropic => Box::new(AnthropicAdapter),
        Vendor::Gemini => Box::new(GeminiAdapter),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tool declarations, one shape per vendor
// ─────────────────────────────────────────────────────────────────────────────

pub(crate) fn build_openai_tools(tools: &[&dyn Tool]) -> Vec<Value> {
    tools
        .iter()
        .map(|t| {
            json!({
                "type": "function",
                "function": {
                    "name": t.name(),
                    "description": t.description(),
                    "parameters": t.parameters_schema(),
                }
            })
        })
        .collect()
}

pub(crate) fn build_anthropic_tools(tools: &[&dyn Tool]) -> Vec<Value> {
    tools
        .iter()
        .map(|t| {
            json!({
                "name": t.name(),
                "description": t.description(),
                "input_schema": t.parameters_schema(),
            })
        })
        .collect()
}

pub(crate) fn build_gemini_declarations(tools: &[&dyn Tool]) -> Vec<Value> {
    tools
        .iter()
        .map(|t| {
            json!({
                "name": t.name(),
                "description": t.description(),
                "parameters": t.parameters_schema(),
            })
        })
        .collect()
}

/// `value[field][0]`, if `field` is a non-empty array.
pub(crate) fn first_of<'a>(value: &'a Value, field: &str) -> Option<&'a Value> {
    value
        .get(field)
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
}

pub(crate) fn str_field(value: &Value, field: &str) -> Option<String> {
    value.get(field).and_then(|v| v.as_str()).map(str::to_string)
}
