//! Exercise the tool-calling round trip of OpenAI-compatible, Anthropic and
//! Gemini endpoints and keep every request and response around for inspection.

pub mod command;
pub mod config_store;
pub mod endpoint;
pub mod notice;
pub mod orchestrator;
pub mod providers;
pub mod render;
pub mod scenario;
pub mod session;
pub mod settings;
pub mod transcript;
pub mod transport;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use thiserror::Error;

pub use command::Command;
pub use config_store::{ConfigFields, ConfigStore, DefaultChange, DeleteGuard, DeleteStep, StoredConfig};
pub use notice::{ErrorNotice, RawPayload};
pub use orchestrator::{Orchestrator, RunOutcome};
pub use providers::{Invocation, VendorAdapter};
pub use scenario::{Scenario, Vendor};
pub use session::{Session, UiEffects};
pub use settings::{Connection, SystemDefaults};
pub use transcript::{Transcript, TranscriptEntry, TranscriptListener};
pub use transport::{Exchange, HttpTransport, Transport};

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status}")]
    Http {
        status: u16,
        content_type: String,
        body: String,
    },

    #[error("response is not JSON")]
    NotJson { content_type: String, body: String },

    #[error("unexpected response shape: {0}")]
    MissingField(String),

    #[error("{0}")]
    Validation(String),

    #[error("a request is already in flight")]
    Busy,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProbeError {
    /// HTTP status carried by the fault, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProbeError::Http { status, .. } => Some(*status),
            ProbeError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Raw response body kept for the error panel.
    pub fn raw_payload(&self) -> Option<RawPayload> {
        match self {
            ProbeError::Http { content_type, body, .. } | ProbeError::NotJson { content_type, body } => {
                Some(RawPayload {
                    text: body.clone(),
                    content_type: content_type.clone(),
                })
            }
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::Tool => write!(f, "tool"),
        }
    }
}

#[async_trait]
pub trait Tool: Send + Sync + 'static {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn parameters_schema(&self) -> Value;
    async fn execute(&self, args: Value) -> Result<Value, ProbeError>;
}

pub const CURRENT_TIME_TOOL: &str = "get_current_time";

/// Simulated `get_current_time`: answers with the local wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct CurrentTimeTool;

#[async_trait]
impl Tool for CurrentTimeTool {
    fn name(&self) -> &'static str {
        CURRENT_TIME_TOOL
    }

    fn description(&self) -> &'static str {
        "Get the current date and time"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn execute(&self, _args: Value) -> Result<Value, ProbeError> {
        let now = chrono::Local::now().naive_local();
        Ok(json!({ "current_time": format_timestamp(&now) }))
    }
}

/// `2025/01/15 Wednesday 14:30:05`, 24-hour clock.
pub fn format_timestamp(at: &NaiveDateTime) -> String {
    at.format("%Y/%m/%d %A %H:%M:%S").to_string()
}
