use crate::config_store::StoredConfig;
use crate::endpoint::mask_api_key;
use crate::ProbeError;

pub const DEFAULT_API_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";

pub const ENV_API_URL: &str = "TOOLCALL_PROBE_API_URL";
pub const ENV_API_KEY: &str = "TOOLCALL_PROBE_API_KEY";
pub const ENV_MODEL: &str = "TOOLCALL_PROBE_MODEL";

/// Fallback connection values, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemDefaults {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
}

impl Default for SystemDefaults {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl SystemDefaults {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Empty override values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let pick = |key: &str, fallback: String| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(fallback)
        };
        let base = Self::default();
        let defaults = Self {
            api_url: pick(ENV_API_URL, base.api_url),
            api_key: pick(ENV_API_KEY, base.api_key),
            model: pick(ENV_MODEL, base.model),
        };
        tracing::debug!(
            api_url = %defaults.api_url,
            api_key = %mask_api_key(&defaults.api_key),
            model = %defaults.model,
            "system defaults resolved"
        );
        defaults
    }
}

/// The URL, key and model a run talks to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Connection {
    pub url: String,
    pub key: String,
    pub model: String,
}

impl Connection {
    pub fn from_defaults(defaults: &SystemDefaults) -> Self {
        Self {
            url: defaults.api_url.clone(),
            key: defaults.api_key.clone(),
            model: defaults.model.clone(),
        }
    }

    /// Stored values win; blank fields fall back to the system defaults.
    pub fn from_config(cfg: &StoredConfig, defaults: &SystemDefaults) -> Self {
        let or = |v: &str, fallback: &str| {
            if v.is_empty() {
                fallback.to_string()
            } else {
                v.to_string()
            }
        };
        Self {
            url: or(&cfg.url, &defaults.api_url),
            key: or(&cfg.key, &defaults.api_key),
            model: or(&cfg.model, &defaults.model),
        }
    }

    /// Startup form contents: the stored default if there is one.
    pub fn initial(stored_default: Option<&StoredConfig>, defaults: &SystemDefaults) -> Self {
        match stored_default {
            Some(cfg) => {
                tracing::info!(name = %cfg.name, "applying stored default configuration");
                Self::from_config(cfg, defaults)
            }
            None => Self::from_defaults(defaults),
        }
    }

    /// Trims every field and checks URL and key are present.
    pub fn validated(&self, defaults: &SystemDefaults) -> Result<Connection, ProbeError> {
        let url = self.url.trim();
        let key = self.key.trim();
        if url.is_empty() || key.is_empty() {
            return Err(ProbeError::Validation(
                "Please fill in the API URL and API Key.".into(),
            ));
        }
        let model = match self.model.trim() {
            "" => defaults.model.clone(),
            m => m.to_string(),
        };
        Ok(Connection {
            url: url.to_string(),
            key: key.to_string(),
            model,
        })
    }
}
