use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Which model backs the workers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelMode {
    /// Online when credentials are present, offline otherwise.
    #[default]
    Auto,
    Online,
    Offline,
}

impl std::fmt::Display for ModelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelMode::Auto => write!(f, "auto"),
            ModelMode::Online => write!(f, "online"),
            ModelMode::Offline => write!(f, "offline"),
        }
    }
}

impl std::str::FromStr for ModelMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ModelMode::Auto),
            "online" | "openrouter" => Ok(ModelMode::Online),
            "offline" => Ok(ModelMode::Offline),
            _ => Err(format!("unknown model mode: {s}")),
        }
    }
}

/// Model endpoint settings, resolved once at startup.
#[derive(Clone, PartialEq)]
pub struct ModelSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub supervisor_model: Option<String>,
    pub customer_model: Option<String>,
    pub classifier_model: Option<String>,
    pub temperature: f32,
}

impl std::fmt::Debug for ModelSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<REDACTED>"))
            .field("base_url", &self.base_url)
            .field("supervisor_model", &self.supervisor_model)
            .field("customer_model", &self.customer_model)
            .field("classifier_model", &self.classifier_model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl ModelSettings {
    /// Online use needs a key plus supervisor and customer models.
    pub fn enabled(&self) -> bool {
        self.api_key.is_some() && self.supervisor_model.is_some() && self.customer_model.is_some()
    }

    /// Build settings from a variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let first = |keys: &[&str]| keys.iter().find_map(|k| get(*k));

        let default_model = first(&["OPENROUTER_MODEL", "OPENAI_MODEL"]);
        let supervisor_model = get("OPENROUTER_SUPERVISOR_MODEL").or_else(|| default_model.clone());
        let customer_model = get("OPENROUTER_CUSTOMER_MODEL").or(default_model);
        let classifier_model =
            get("OPENROUTER_CLASSIFIER_MODEL").or_else(|| supervisor_model.clone());
        let temperature = get("OPENROUTER_TEMPERATURE")
            .and_then(|t| t.trim().parse::<f32>().ok())
            .unwrap_or(0.0);

        Self {
            api_key: first(&["OPENROUTER_API_KEY", "OPENAI_API_KEY"]),
            base_url: first(&["OPENROUTER_BASE_URL", "OPENAI_BASE_URL"])
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            supervisor_model,
            customer_model,
            classifier_model,
            temperature,
        }
    }

    /// Resolve settings from the process environment overlaid on
    /// `<base_dir>/.env`. Variables already in the environment win; the
    /// `.env` file never modifies the process environment.
    pub fn load(base_dir: &Path) -> Result<Self> {
        let file_vars = read_dotenv(&base_dir.join(".env"))?;
        Ok(Self::from_lookup(|key| match std::env::var(key) {
            Ok(value) => Some(value),
            Err(_) => file_vars.get(key).cloned(),
        }))
    }
}

fn read_dotenv(path: &Path) -> Result<HashMap<String, String>> {
    let mut vars = HashMap::new();
    if !path.exists() {
        return Ok(vars);
    }
    let iter = dotenvy::from_path_iter(path).map_err(|e| BridgeError::ConfigParse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    for item in iter {
        let (key, value) = item.map_err(|e| BridgeError::ConfigParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        vars.insert(key, value);
    }
    Ok(vars)
}
