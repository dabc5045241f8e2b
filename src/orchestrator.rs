//! Drives one scenario: ask the model, look for a tool call, answer it with a
//! simulated result and ask again. Every request, response and turn is pushed
//! to the transcript as it happens.

use serde_json::Value;

use crate::endpoint::mask_url_key;
use crate::notice::ErrorNotice;
use crate::providers::{adapter_for, GeminiAdapter, VendorAdapter};
use crate::scenario::{BuiltinTool, Scenario};
use crate::settings::Connection;
use crate::transcript::Transcript;
use crate::transport::Transport;
use crate::{CurrentTimeTool, ProbeError, Role, Tool};

pub const NO_INVOCATION_NOTICE: &str =
    "No tool call was triggered: the model may not have understood the request, or the API misbehaved.";

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed { final_answer: Option<Value> },
    /// Step 1 came back without a tool call. Not a failure.
    NoInvocation,
    Failed(ErrorNotice),
}

impl RunOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, RunOutcome::Failed(_))
    }
}

pub struct Orchestrator<T: Transport> {
    transport: T,
    tool: Box<dyn Tool>,
}

impl<T: Transport> Orchestrator<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            tool: Box::new(CurrentTimeTool),
        }
    }

    /// Replaces the simulated tool that answers step 1's invocation.
    pub fn with_tool(mut self, tool: impl Tool) -> Self {
        self.tool = Box::new(tool);
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Runs `scenario` and renders any fault as a single error entry.
    pub async fn execute(
        &self,
        scenario: Scenario,
        conn: &Connection,
        user_text: &str,
        transcript: &mut Transcript,
    ) -> RunOutcome {
        match self.run(scenario, conn, user_text, transcript).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(
                    scenario = %scenario,
                    error = %err,
                    status = ?err.status(),
                    "scenario run failed"
                );
                let notice = ErrorNotice::from_error(&err);
                transcript.push_error(notice.clone());
                RunOutcome::Failed(notice)
            }
        }
    }

    #[tracing::instrument(level = "info", skip_all, fields(scenario = %scenario, model = %conn.model))]
    pub async fn run(
        &self,
        scenario: Scenario,
        conn: &Connection,
        user_text: &str,
        transcript: &mut Transcript,
    ) -> Result<RunOutcome, ProbeError> {
        let user_text = match user_text.trim() {
            "" => scenario.default_message(),
            text => text,
        };
        match scenario.builtin_tool() {
            Some(builtin) => self.run_builtin(builtin, conn, user_text, transcript).await,
            None => {
                let adapter = adapter_for(scenario.vendor());
                self.run_round_trip(adapter.as_ref(), conn, user_text, transcript)
                    .await
            }
        }
    }

    async fn run_round_trip(
        &self,
        adapter: &dyn VendorAdapter,
        conn: &Connection,
        user_text: &str,
        transcript: &mut Transcript,
    ) -> Result<RunOutcome, ProbeError> {
        let tools: [&dyn Tool; 1] = [self.tool.as_ref()];
        let url = adapter.endpoint(conn);
        let headers = adapter.auth_headers(conn);

        tracing::info!(vendor = adapter.vendor_name(), "step 1: request with tool declaration");
        let request1 = adapter.first_request(&conn.model, user_text, &tools);
        transcript.push_block("Request #1", request1.clone());
        transcript.push_message(Role::User, "Message #1", adapter.user_turn(user_text));

        let response1 = self.send(&url, &headers, &request1).await?;
        transcript.push_block("Response #1", response1.clone());

        let assistant_turn = adapter.assistant_turn(&response1)?;
        if let Some(turn) = &assistant_turn {
            transcript.push_message(Role::Assistant, "Message #2", turn.clone());
        }

        let Some(invocation) = adapter.detect_invocation(&response1)? else {
            tracing::warn!(vendor = adapter.vendor_name(), "no tool call in step 1 response");
            transcript.push_info(NO_INVOCATION_NOTICE);
            return Ok(RunOutcome::NoInvocation);
        };
        tracing::info!(tool = %invocation.name, id = ?invocation.id, "tool call detected");

        let result = self.tool.execute(invocation.args.clone()).await?;
        transcript.push_message(Role::Tool, "Message #3 (tool result)", result.clone());

        tracing::info!(vendor = adapter.vendor_name(), "step 2: request with tool result");
        let assistant_turn = assistant_turn.unwrap_or(Value::Null);
        let request2 = adapter.followup_request(
            &conn.model,
            user_text,
            &tools,
            &assistant_turn,
            &invocation,
            &result,
        );
        transcript.push_block("Request #2", request2.clone());

        let response2 = self.send(&url, &headers, &request2).await?;
        transcript.push_block("Response #2", response2.clone());

        let final_answer = adapter.final_answer(&response2);
        if let Some(answer) = &final_answer {
            transcript.push_message(Role::Assistant, "Message #4 (final answer)", answer.clone());
        }
        Ok(RunOutcome::Completed { final_answer })
    }

    async fn run_builtin(
        &self,
        builtin: BuiltinTool,
        conn: &Connection,
        user_text: &str,
        transcript: &mut Transcript,
    ) -> Result<RunOutcome, ProbeError> {
        let adapter = GeminiAdapter;
        let url = adapter.endpoint(conn);
        let request = adapter.builtin_request(user_text, builtin);
        tracing::info!(tool = ?builtin, "single request with built-in tool");
        transcript.push_block("Request #1", request.clone());
        transcript.push_message(Role::User, "Message", adapter.user_turn(user_text));

        let response = self.send(&url, &adapter.auth_headers(conn), &request).await?;
        transcript.push_block("Response #1", response.clone());

        let final_answer = adapter.final_answer(&response);
        if let Some(answer) = &final_answer {
            transcript.push_message(Role::Assistant, "Answer", answer.clone());
        }
        Ok(RunOutcome::Completed { final_answer })
    }

    async fn send(
        &self,
        url: &str,
        headers: &[(&'static str, String)],
        body: &Value,
    ) -> Result<Value, ProbeError> {
        tracing::debug!(url = %mask_url_key(url), "sending request");
        self.transport.post_json(url, headers, body).await?.into_json()
    }
}
