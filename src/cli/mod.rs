pub mod repl;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::runtime::Runtime;

/// Which side of the system a CLI session talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CliMode {
    /// Admin turns, routed through the supervisor.
    Admin,
    /// Customer-facing user turns.
    User,
}

impl CliMode {
    pub fn prompt(&self) -> &'static str {
        match self {
            CliMode::Admin => "admin> ",
            CliMode::User => "user> ",
        }
    }
}

/// Run one turn in `mode`.
pub async fn run_turn(runtime: &Runtime, mode: CliMode, text: &str) -> Result<String> {
    match mode {
        CliMode::Admin => runtime.run_admin_turn(text).await,
        CliMode::User => runtime.run_user_turn(text).await,
    }
}
