//! Plain-text presentation of transcript entries and stored configurations.

use std::io::Write;

use serde_json::Value;

use crate::config_store::StoredConfig;
use crate::endpoint::mask_api_key;
use crate::notice::ErrorNotice;
use crate::settings::Connection;
use crate::transcript::{TranscriptEntry, TranscriptListener};

fn pretty(payload: &Value) -> String {
    match payload {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| format!("{prefix}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_error(notice: &ErrorNotice) -> String {
    let mut out = format!("[error] {}", notice.message);
    if let Some(hint) = notice.hint() {
        out.push_str(&format!("\n  {hint}"));
    }
    if let Some(panel) = notice.panel() {
        out.push_str("\n  raw response:\n");
        out.push_str(&indent(&panel, "    "));
    }
    out
}

pub fn render_entry(entry: &TranscriptEntry) -> String {
    match entry {
        TranscriptEntry::Block { title, payload } => {
            format!("=== {title} ===\n{}", pretty(payload))
        }
        TranscriptEntry::Message { role, label, payload } => {
            format!("--- {role} · {label} ---\n{}", pretty(payload))
        }
        TranscriptEntry::Info(text) => format!("[info] {text}"),
        TranscriptEntry::Error(notice) => render_error(notice),
    }
}

pub fn render_configs(configs: &[StoredConfig]) -> String {
    if configs.is_empty() {
        return "no saved configurations".to_string();
    }
    configs
        .iter()
        .enumerate()
        .map(|(i, c)| {
            format!(
                "{i:>3} {} {}  {}  model={}  key={}",
                if c.is_default { "*" } else { " " },
                c.name,
                c.url,
                c.model,
                mask_api_key(&c.key)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_form(form: &Connection, user_input: &str, scenario: &str) -> String {
    format!(
        "scenario: {scenario}\nurl:      {}\nkey:      {}\nmodel:    {}\nmessage:  {user_input}",
        form.url,
        mask_api_key(&form.key),
        form.model
    )
}

/// Prints each entry the moment it is appended, so the newest one is always
/// the last thing on screen.
pub struct TerminalRenderer<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write + Send> TranscriptListener for TerminalRenderer<W> {
    fn on_append(&mut self, entry: &TranscriptEntry) {
        // Terminal output is best effort.
        let _ = writeln!(self.out, "{}\n", render_entry(entry));
        let _ = self.out.flush();
    }

    fn on_pending(&mut self, pending: bool) {
        if pending {
            let _ = writeln!(self.out, "(waiting for response...)\n");
            let _ = self.out.flush();
        }
    }
}
