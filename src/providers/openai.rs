/// OpenAI-compatible chat completions (`/v1/chat/completions`).
/// Works against api.openai.com and any gateway speaking the same shape.
use serde_json::{json, Value};

use super::{build_openai_tools, first_of, str_field, Invocation, VendorAdapter};
use crate::endpoint::build_endpoint;
use crate::settings::Connection;
use crate::{ProbeError, Tool};

#[derive(Debug, Default, Clone, Copy)]
pub struct OpenAiAdapter;

impl OpenAiAdapter {
    fn message(response: &Value) -> Result<&Value, ProbeError> {
        let choice = first_of(response, "choices")
            .ok_or_else(|| ProbeError::MissingField("response has no choices".into()))?;
        choice
            .get("message")
            .ok_or_else(|| ProbeError::MissingField("choices[0] has no message".into()))
    }
}

impl VendorAdapter for OpenAiAdapter {
    fn vendor_name(&self) -> &'static str {
        "OpenAI-compatible"
    }

    fn endpoint(&self, conn: &Connection) -> String {
        build_endpoint(&conn.url)
    }

    fn auth_headers(&self, conn: &Connection) -> Vec<(&'static str, String)> {
        vec![("Authorization", format!("Bearer {}", conn.key))]
    }

    fn user_turn(&self, user_text: &str) -> Value {
        json!({ "role": "user", "content": user_text })
    }

    fn first_request(&self, model: &str, user_text: &str, tools: &[&dyn Tool]) -> Value {
        json!({
            "model": model,
            "messages": [self.user_turn(user_text)],
            "tools": build_openai_tools(tools),
            "tool_choice": "auto",
        })
    }

    fn assistant_turn(&self, response: &Value) -> Result<Option<Value>, ProbeError> {
        Self::message(response).map(|m| Some(m.clone()))
    }

    fn detect_invocation(&self, response: &Value) -> Result<Option<Invocation>, ProbeError> {
        let message = Self::message(response)?;
        let Some(call) = first_of(message, "tool_calls") else {
            return Ok(None);
        };
        let function = call
            .get("function")
            .ok_or_else(|| ProbeError::MissingField("tool call has no function".into()))?;
        let name = str_field(function, "name").unwrap_or_default();
        // Arguments arrive as a JSON string; keep the text if it does not parse.
        let args = match function.get("arguments") {
            Some(Value::String(s)) => {
                serde_json::from_str(s).unwrap_or_else(|_| Value::String(s.clone()))
            }
            Some(other) => other.clone(),
            None => json!({}),
        };
        Ok(Some(Invocation {
            id: str_field(call, "id"),
            name,
            args,
            raw: call.clone(),
        }))
    }

    fn tool_result_turn(&self, invocation: &Invocation, result: &Value) -> Value {
        let mut turn = json!({
            "role": "tool",
            "content": result.to_string(),
        });
        if let Some(id) = &invocation.id {
            turn["tool_call_id"] = json!(id);
        }
        turn
    }

    fn followup_request(
        &self,
        model: &str,
        user_text: &str,
        _tools: &[&dyn Tool],
        assistant_turn: &Value,
        invocation: &Invocation,
        result: &Value,
    ) -> Value {
        json!({
            "model": model,
            "messages": [
                self.user_turn(user_text),
                assistant_turn,
                self.tool_result_turn(invocation, result),
            ],
        })
    }

    fn final_answer(&self, response: &Value) -> Option<Value> {
        Self::message(response).ok().cloned()
    }
}
