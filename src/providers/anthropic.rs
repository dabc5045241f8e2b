/// Anthropic Messages API (`/v1/messages`).
/// Tool calls come back as `tool_use` content blocks and results go out as a
/// user turn holding a `tool_result` block.
use serde_json::{json, Value};

use super::{build_anthropic_tools, str_field, Invocation, VendorAdapter};
use crate::endpoint::build_anthropic_endpoint;
use crate::settings::Connection;
use crate::{ProbeError, Tool};

pub const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const MAX_TOKENS: u32 = 256;

#[derive(Debug, Default, Clone, Copy)]
pub struct AnthropicAdapter;

impl AnthropicAdapter {
    /// The `content` array, or the whole body when there is none.
    fn content_or_body(response: &Value) -> Value {
        match response.get("content") {
            Some(content @ Value::Array(_)) => content.clone(),
            _ => response.clone(),
        }
    }
}

impl VendorAdapter for AnthropicAdapter {
    fn vendor_name(&self) -> &'static str {
        "Anthropic"
    }

    fn endpoint(&self, conn: &Connection) -> String {
        build_anthropic_endpoint(&conn.url)
    }

    fn auth_headers(&self, conn: &Connection) -> Vec<(&'static str, String)> {
        vec![
            ("x-api-key", conn.key.clone()),
            ("anthropic-version", ANTHROPIC_VERSION.to_string()),
        ]
    }

    fn user_turn(&self, user_text: &str) -> Value {
        json!({ "role": "user", "content": user_text })
    }

    fn first_request(&self, model: &str, user_text: &str, tools: &[&dyn Tool]) -> Value {
        json!({
            "model": model,
            "max_tokens": MAX_TOKENS,
            "messages": [self.user_turn(user_text)],
            "tools": build_anthropic_tools(tools),
        })
    }

    fn assistant_turn(&self, response: &Value) -> Result<Option<Value>, ProbeError> {
        Ok(Some(Self::content_or_body(response)))
    }

    fn detect_invocation(&self, response: &Value) -> Result<Option<Invocation>, ProbeError> {
        let tool_use = response
            .get("content")
            .and_then(|v| v.as_array())
            .and_then(|blocks| {
                blocks
                    .iter()
                    .find(|b| b.get("type").and_then(|t| t.as_str()) == Some("tool_use"))
            });
        Ok(tool_use.map(|block| Invocation {
            id: str_field(block, "id"),
            name: str_field(block, "name").unwrap_or_default(),
            args: block.get("input").cloned().unwrap_or_else(|| json!({})),
            raw: block.clone(),
        }))
    }

    fn tool_result_turn(&self, invocation: &Invocation, result: &Value) -> Value {
        json!({
            "role": "user",
            "content": [{
                "type": "tool_result",
                "tool_use_id": invocation.id,
                "content": result.to_string(),
            }]
        })
    }

    fn followup_request(
        &self,
        model: &str,
        user_text: &str,
        tools: &[&dyn Tool],
        _assistant_turn: &Value,
        invocation: &Invocation,
        result: &Value,
    ) -> Value {
        // Only the tool_use block is replayed as the assistant turn.
        json!({
            "model": model,
            "max_tokens": MAX_TOKENS,
            "messages": [
                self.user_turn(user_text),
                { "role": "assistant", "content": [invocation.raw] },
                self.tool_result_turn(invocation, result),
            ],
            "tools": build_anthropic_tools(tools),
        })
    }

    fn final_answer(&self, response: &Value) -> Option<Value> {
        Some(Self::content_or_body(response))
    }
}
