//! The controller behind every front end: form state, the active scenario,
//! the edit cursor, the pending flag, the transcript and the config store,
//! all driven through [`Command`]s.

use std::time::Instant;

use async_trait::async_trait;

use crate::command::{Command, FormField};
use crate::config_store::{ConfigStore, DefaultChange, DeleteGuard, DeleteStep, KeyValueStorage, StoredConfig};
use crate::orchestrator::{Orchestrator, RunOutcome};
use crate::scenario::Scenario;
use crate::settings::{Connection, SystemDefaults};
use crate::transcript::Transcript;
use crate::transport::Transport;
use crate::ProbeError;

/// Blocking prompts the core asks the front end to show.
#[async_trait]
pub trait UiEffects: Send + Sync {
    async fn alert(&self, message: &str);
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Ran(RunOutcome),
    ScenarioSelected(Scenario),
    Cleared,
    FieldSet(FormField),
    Editing(StoredConfig),
    EditCancelled,
    Saved(usize),
    DeleteArmed(usize),
    Deleted(StoredConfig),
    DefaultChanged(DefaultChange),
    Applied(usize),
    /// A validation fault was shown to the user; nothing changed.
    Rejected(String),
}

pub struct Session<S: KeyValueStorage, T: Transport> {
    pub form: Connection,
    pub user_input: String,
    pub scenario: Scenario,
    pub editing_index: Option<usize>,
    pub transcript: Transcript,
    pending: bool,
    store: ConfigStore<S>,
    delete_guard: DeleteGuard,
    orchestrator: Orchestrator<T>,
    defaults: SystemDefaults,
    effects: Box<dyn UiEffects>,
}

impl<S: KeyValueStorage, T: Transport> Session<S, T> {
    /// The form starts from the stored default configuration, if any.
    pub fn new(
        store: ConfigStore<S>,
        orchestrator: Orchestrator<T>,
        defaults: SystemDefaults,
        effects: impl UiEffects + 'static,
    ) -> Self {
        let form = Connection::initial(store.default_config().as_ref(), &defaults);
        let scenario = Scenario::default();
        Self {
            form,
            user_input: scenario.default_message().to_string(),
            scenario,
            editing_index: None,
            transcript: Transcript::new(),
            pending: false,
            store,
            delete_guard: DeleteGuard::default(),
            orchestrator,
            defaults,
            effects: Box::new(effects),
        }
    }

    pub fn pending(&self) -> bool {
        self.pending
    }

    pub fn store(&self) -> &ConfigStore<S> {
        &self.store
    }

    pub fn defaults(&self) -> &SystemDefaults {
        &self.defaults
    }

    pub fn armed_delete(&self) -> Option<usize> {
        self.delete_guard.armed_index(Instant::now())
    }

    /// Validation faults are alerted and reported as [`Outcome::Rejected`];
    /// anything else is returned as an error.
    pub async fn dispatch(&mut self, command: Command) -> Result<Outcome, ProbeError> {
        tracing::debug!(?command, "dispatch");
        match self.apply(command).await {
            Err(ProbeError::Validation(message)) => {
                tracing::warn!(%message, "command rejected");
                self.effects.alert(&message).await;
                Ok(Outcome::Rejected(message))
            }
            other => other,
        }
    }

    async fn apply(&mut self, command: Command) -> Result<Outcome, ProbeError> {
        match command {
            Command::Submit(message) => self.submit(message).await,
            Command::SelectScenario(scenario) => {
                self.scenario = scenario;
                self.user_input = scenario.default_message().to_string();
                self.transcript.clear();
                Ok(Outcome::ScenarioSelected(scenario))
            }
            Command::Clear => {
                self.transcript.clear();
                Ok(Outcome::Cleared)
            }
            Command::SetField(field, value) => {
                match field {
                    FormField::Url => self.form.url = value,
                    FormField::Key => self.form.key = value,
                    FormField::Model => self.form.model = value,
                    FormField::Message => self.user_input = value,
                }
                Ok(Outcome::FieldSet(field))
            }
            Command::EditConfig(index) => {
                let cfg = self.store.get(index).ok_or_else(|| no_config(index))?;
                self.editing_index = Some(index);
                Ok(Outcome::Editing(cfg))
            }
            Command::CancelEdit => {
                self.editing_index = None;
                Ok(Outcome::EditCancelled)
            }
            Command::SaveConfig(fields) => {
                let index = self.store.upsert(self.editing_index, &fields)?;
                self.editing_index = None;
                Ok(Outcome::Saved(index))
            }
            Command::SaveConfigAsDefault(fields) => {
                let index = self.store.upsert_default(self.editing_index, &fields)?;
                self.editing_index = None;
                if let Some(cfg) = self.store.get(index) {
                    self.form = Connection::from_config(&cfg, &self.defaults);
                }
                Ok(Outcome::Saved(index))
            }
            Command::DeleteConfig(index) => {
                if self.store.get(index).is_none() {
                    return Err(no_config(index));
                }
                match self.delete_guard.activate(index, Instant::now()) {
                    DeleteStep::Armed => Ok(Outcome::DeleteArmed(index)),
                    DeleteStep::Confirmed => {
                        let removed = self.store.remove(index)?;
                        self.editing_index = None;
                        Ok(Outcome::Deleted(removed))
                    }
                }
            }
            Command::StarConfig(index) => {
                let change = self.store.set_default(index)?;
                match change {
                    DefaultChange::Set(i) => {
                        if let Some(cfg) = self.store.get(i) {
                            self.form = Connection::from_config(&cfg, &self.defaults);
                        }
                        self.effects.alert("Set as the default configuration.").await;
                    }
                    DefaultChange::Cleared => {
                        self.form = Connection::from_defaults(&self.defaults);
                        self.effects
                            .alert("Default cleared; system defaults restored.")
                            .await;
                    }
                }
                Ok(Outcome::DefaultChanged(change))
            }
            Command::ApplyConfig(index) => {
                let cfg = self.store.get(index).ok_or_else(|| no_config(index))?;
                self.form = Connection::from_config(&cfg, &self.defaults);
                tracing::info!(index, name = %cfg.name, "configuration applied");
                Ok(Outcome::Applied(index))
            }
        }
    }

    async fn submit(&mut self, message: Option<String>) -> Result<Outcome, ProbeError> {
        if self.pending {
            return Err(ProbeError::Busy);
        }
        if let Some(message) = message {
            self.user_input = message;
        }
        let conn = self.form.validated(&self.defaults)?;

        self.transcript.clear();
        self.set_pending(true);
        let outcome = self
            .orchestrator
            .execute(self.scenario, &conn, &self.user_input, &mut self.transcript)
            .await;
        self.set_pending(false);
        Ok(Outcome::Ran(outcome))
    }

    fn set_pending(&mut self, pending: bool) {
        self.pending = pending;
        self.transcript.announce_pending(pending);
    }
}

fn no_config(index: usize) -> ProbeError {
    ProbeError::Validation(format!("no configuration at index {index}"))
}
