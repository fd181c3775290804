use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::classifier::{KeywordSignal, ResolutionPolicy};
use crate::error::{BridgeError, Result};

/// Top-level runtime configuration (`scopebridge.yml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Route resolution and bridge keywords.
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Limits for the agent tool loop.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Sandbox directory names under the base directory.
    #[serde(default)]
    pub scopes: ScopeNames,

    /// Online model client settings.
    #[serde(default)]
    pub model: ModelClientConfig,
}

impl RuntimeConfig {
    /// Load config from a YAML file. Returns default if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&contents).map_err(|e| BridgeError::ConfigParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load config from the base directory. Checks `scopebridge.yml`.
    pub fn load_project(base_dir: &Path) -> Result<Self> {
        Self::load_from(&super::config_path(base_dir))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub policy: ResolutionPolicy,

    /// Customer-documentation indicator phrases.
    #[serde(default = "KeywordSignal::default_keywords")]
    pub bridge_keywords: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            policy: ResolutionPolicy::default(),
            bridge_keywords: KeywordSignal::default_keywords(),
        }
    }
}

impl ClassifierConfig {
    pub fn signal(&self) -> Result<KeywordSignal> {
        KeywordSignal::new(self.bridge_keywords.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Model calls allowed per run. Default: 25.
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

fn default_max_steps() -> usize {
    25
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeNames {
    #[serde(default = "default_admin_scope")]
    pub admin: String,
    #[serde(default = "default_customer_scope")]
    pub customer: String,
}

fn default_admin_scope() -> String {
    "admin".into()
}
fn default_customer_scope() -> String {
    "docs".into()
}

impl Default for ScopeNames {
    fn default() -> Self {
        Self {
            admin: default_admin_scope(),
            customer: default_customer_scope(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelClientConfig {
    /// Request timeout in seconds. Default: 60.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    60
}

impl Default for ModelClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
        }
    }
}
