/// Google Gemini `generateContent`. The API key rides in the query string,
/// function calls are `functionCall` parts and results go back as a
/// `function` turn with a `functionResponse` part.
use serde_json::{json, Value};

use super::{build_gemini_declarations, first_of, str_field, Invocation, VendorAdapter};
use crate::endpoint::build_gemini_endpoint;
use crate::scenario::BuiltinTool;
use crate::settings::Connection;
use crate::{ProbeError, Tool, CURRENT_TIME_TOOL};

pub const SYSTEM_INSTRUCTION: &str = "You are a helpful assistant.";

#[derive(Debug, Default, Clone, Copy)]
pub struct GeminiAdapter;

impl GeminiAdapter {
    /// Single-step request using a server-side tool (search, URL context).
    pub fn builtin_request(&self, user_text: &str, tool: BuiltinTool) -> Value {
        json!({
            "tools": [tool.stanza()],
            "contents": [self.user_turn(user_text)],
        })
    }

    fn candidate_content(response: &Value) -> Option<&Value> {
        first_of(response, "candidates").and_then(|c| c.get("content"))
    }
}

impl VendorAdapter for GeminiAdapter {
    fn vendor_name(&self) -> &'static str {
        "Gemini"
    }

    fn endpoint(&self, conn: &Connection) -> String {
        build_gemini_endpoint(&conn.url, &conn.model, &conn.key)
    }

    fn auth_headers(&self, _conn: &Connection) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    fn user_turn(&self, user_text: &str) -> Value {
        json!({ "role": "user", "parts": [{ "text": user_text }] })
    }

    fn first_request(&self, _model: &str, user_text: &str, tools: &[&dyn Tool]) -> Value {
        json!({
            "systemInstruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
            "tools": [{ "functionDeclarations": build_gemini_declarations(tools) }],
            "toolConfig": { "functionCallingConfig": { "mode": "AUTO" } },
            "contents": [self.user_turn(user_text)],
        })
    }

    fn assistant_turn(&self, response: &Value) -> Result<Option<Value>, ProbeError> {
        Ok(Self::candidate_content(response).cloned())
    }

    fn detect_invocation(&self, response: &Value) -> Result<Option<Invocation>, ProbeError> {
        let call = Self::candidate_content(response)
            .and_then(|content| content.get("parts"))
            .and_then(|parts| parts.as_array())
            .and_then(|parts| parts.iter().find_map(|p| p.get("functionCall")));
        Ok(call.map(|fc| Invocation {
            id: str_field(fc, "id"),
            name: str_field(fc, "name")
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| CURRENT_TIME_TOOL.to_string()),
            args: fc.get("args").cloned().unwrap_or_else(|| json!({})),
            raw: fc.clone(),
        }))
    }

    fn tool_result_turn(&self, invocation: &Invocation, result: &Value) -> Value {
        json!({
            "role": "function",
            "parts": [{
                "functionResponse": {
                    "name": invocation.name,
                    "response": result,
                }
            }]
        })
    }

    fn followup_request(
        &self,
        _model: &str,
        user_text: &str,
        _tools: &[&dyn Tool],
        assistant_turn: &Value,
        invocation: &Invocation,
        result: &Value,
    ) -> Value {
        json!({
            "contents": [
                self.user_turn(user_text),
                assistant_turn,
                self.tool_result_turn(invocation, result),
            ]
        })
    }

    fn final_answer(&self, response: &Value) -> Option<Value> {
        Self::candidate_content(response).cloned()
    }
}
